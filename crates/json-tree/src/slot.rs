//! Addressing children: array positions by `usize`, object properties by key.

use crate::name::NodeName;

/// A child address accepted by [`Node::get`](crate::Node::get),
/// [`Node::set`](crate::Node::set) and [`Node::remove`](crate::Node::remove).
///
/// Implemented for `usize` (array elements) and string-like keys (object
/// properties). Sealed; the set of address kinds is closed.
pub trait Slot: private::Sealed {
    #[doc(hidden)]
    fn key(&self) -> SlotKey<'_>;
}

#[doc(hidden)]
#[derive(Debug, Clone, Copy)]
pub enum SlotKey<'a> {
    Index(usize),
    Property(&'a str),
}

impl Slot for usize {
    fn key(&self) -> SlotKey<'_> {
        SlotKey::Index(*self)
    }
}

impl Slot for str {
    fn key(&self) -> SlotKey<'_> {
        SlotKey::Property(self)
    }
}

impl Slot for String {
    fn key(&self) -> SlotKey<'_> {
        SlotKey::Property(self)
    }
}

impl Slot for NodeName {
    fn key(&self) -> SlotKey<'_> {
        SlotKey::Property(self.as_str())
    }
}

impl<T: Slot + ?Sized> Slot for &T {
    fn key(&self) -> SlotKey<'_> {
        (**self).key()
    }
}

mod private {
    pub trait Sealed {}
    impl Sealed for usize {}
    impl Sealed for str {}
    impl Sealed for String {}
    impl Sealed for crate::name::NodeName {}
    impl<T: Sealed + ?Sized> Sealed for &T {}
}
