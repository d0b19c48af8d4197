//! Type-erased values for the polymorphic "with type" paths.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A value that can travel through [`DynValue`]: comparable and hashable
/// through a trait object.
///
/// Implement it for your own `Eq + Hash` types with [`impl_typed_value!`](crate::impl_typed_value).
pub trait TypedValue: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn eq_dyn(&self, other: &dyn TypedValue) -> bool;

    fn hash_dyn(&self, state: &mut dyn Hasher);

    /// Name of the concrete Rust type, for diagnostics.
    fn rust_type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Implements [`TypedValue`] for types that are `Eq + Hash + Debug + Send + Sync`.
///
/// ```
/// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// struct Colour(String);
///
/// json_tree::impl_typed_value!(Colour);
/// ```
#[macro_export]
macro_rules! impl_typed_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::marshall::TypedValue for $ty {
                fn as_any(&self) -> &dyn ::std::any::Any {
                    self
                }

                fn eq_dyn(&self, other: &dyn $crate::marshall::TypedValue) -> bool {
                    other
                        .as_any()
                        .downcast_ref::<$ty>()
                        .is_some_and(|other| self == other)
                }

                fn hash_dyn(&self, mut state: &mut dyn ::std::hash::Hasher) {
                    ::std::hash::Hash::hash(self, &mut state)
                }
            }
        )+
    };
}

impl_typed_value!(bool, char, i8, i16, i32, i64, i128, u8, u16, u32, u64, String);

// Floats compare and hash by bit pattern so equal values always hash equally.
macro_rules! impl_typed_float {
    ($($ty:ty),+) => {
        $(
            impl TypedValue for $ty {
                fn as_any(&self) -> &dyn Any {
                    self
                }

                fn eq_dyn(&self, other: &dyn TypedValue) -> bool {
                    other
                        .as_any()
                        .downcast_ref::<$ty>()
                        .is_some_and(|other| self.to_bits() == other.to_bits())
                }

                fn hash_dyn(&self, mut state: &mut dyn Hasher) {
                    self.to_bits().hash(&mut state)
                }
            }
        )+
    };
}

impl_typed_float!(f32, f64);

/// A shared handle to a value of some registered type.
///
/// Produced by with-type unmarshalling, where the concrete type is only known
/// from the document's type tag.
///
/// ```
/// use json_tree::marshall::DynValue;
///
/// let value = DynValue::new(42_i64);
/// assert_eq!(value.downcast_ref::<i64>(), Some(&42));
/// assert!(value.downcast_ref::<i32>().is_none());
/// ```
#[derive(Clone)]
pub struct DynValue(Arc<dyn TypedValue>);

impl DynValue {
    pub fn new<T: TypedValue>(value: T) -> Self {
        DynValue(Arc::new(value))
    }

    pub fn is<T: TypedValue>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    pub fn downcast_ref<T: TypedValue>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn downcast<T: TypedValue + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    pub fn as_typed(&self) -> &dyn TypedValue {
        &*self.0
    }

    /// `TypeId` of the wrapped value, not of the handle.
    pub fn value_type_id(&self) -> TypeId {
        self.0.as_any().type_id()
    }

    pub fn value_type_name(&self) -> &'static str {
        self.0.rust_type_name()
    }
}

impl<T: TypedValue> From<T> for DynValue {
    fn from(value: T) -> Self {
        DynValue::new(value)
    }
}

impl PartialEq for DynValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.eq_dyn(&*other.0)
    }
}

impl Eq for DynValue {}

impl Hash for DynValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value_type_id().hash(state);
        self.0.hash_dyn(state);
    }
}

impl fmt::Debug for DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}
