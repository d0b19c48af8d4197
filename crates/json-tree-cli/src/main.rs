//! `jtree` CLI: canonicalise JSON and work with type-tagged documents.
//!
//! ## Usage
//!
//! ```sh
//! # Re-emit JSON in canonical form (stdin -> stdout)
//! echo '{"a":1,"b":[true,null]}' | jtree canonical
//!
//! # Pretty-print from file to file
//! jtree canonical --pretty -i in.json -o out.json
//!
//! # Decode a type-tagged value
//! echo '{"type":"long","value":"42"}' | jtree decode
//!
//! # Encode a scalar with its type tag
//! jtree encode --type locale en_au
//!
//! # List registered type names
//! jtree types
//! ```

use std::io::{self, Read};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use json_tree::marshall::{
    basic_registry, DynValue, Locale, MarshallContext, StringName, TypeRegistry,
    UnmarshallContext,
};
use json_tree::Node;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "jtree",
    version,
    about = "Canonical JSON and type-tagged value tool"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse JSON and re-emit it in canonical form
    Canonical {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Indent the output instead of using the canonical single line
        #[arg(long)]
        pretty: bool,
    },
    /// Decode a type-tagged document and print its type and value
    Decode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Encode a scalar given as text, with its type tag
    Encode {
        /// Registered type name, e.g. "long" or "locale"
        #[arg(short = 't', long = "type")]
        type_name: String,
        /// The value, as text
        value: String,
    },
    /// List the registered type names
    Types,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let registry = basic_registry().context("Failed to build the type registry")?;
    debug!(types = registry.len(), "registry ready");

    match cli.command {
        Commands::Canonical {
            input,
            output,
            pretty,
        } => {
            let text = read_input(input.as_deref())?;
            let node = Node::parse(&text).context("Failed to parse JSON")?;
            let rendered = if pretty {
                serde_json::to_string_pretty(&node)?
            } else {
                node.to_text()
            };
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Decode { input } => {
            let text = read_input(input.as_deref())?;
            let node = Node::parse(&text).context("Failed to parse JSON")?;
            println!("{}", decode(&registry, &node)?);
        }
        Commands::Encode { type_name, value } => {
            let value = parse_scalar(&type_name, &value)?;
            let node = MarshallContext::new(registry)
                .marshall_with_type_dyn(&value)
                .with_context(|| format!("Failed to encode {type_name}"))?;
            println!("{node}");
        }
        Commands::Types => {
            for name in registry.type_names() {
                println!("{name}");
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

/// Renders `<type-name>: <value>`, or `null`.
fn decode(registry: &Arc<TypeRegistry>, node: &Node) -> Result<String> {
    let value = UnmarshallContext::new(Arc::clone(registry))
        .unmarshall_with_type(node)
        .context("Failed to decode typed value")?;
    Ok(match value {
        None => "null".to_string(),
        Some(value) => {
            let type_name = registry
                .type_name_for(value.value_type_id())
                .unwrap_or_else(|| value.value_type_name());
            format!("{type_name}: {value:?}")
        }
    })
}

/// Parses `text` into the Rust type registered as `type_name`.
fn parse_scalar(type_name: &str, text: &str) -> Result<DynValue> {
    fn parse<T>(type_name: &str, text: &str) -> Result<DynValue>
    where
        T: std::str::FromStr + json_tree::marshall::TypedValue,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let value = text
            .parse::<T>()
            .with_context(|| format!("Invalid {type_name}: {text:?}"))?;
        Ok(DynValue::new(value))
    }

    match type_name {
        "boolean" => parse::<bool>(type_name, text),
        "double" => parse::<f64>(type_name, text),
        "float" => parse::<f32>(type_name, text),
        "byte" => parse::<i8>(type_name, text),
        "short" => parse::<i16>(type_name, text),
        "int" => parse::<i32>(type_name, text),
        "long" => parse::<i64>(type_name, text),
        "big-integer" => parse::<i128>(type_name, text),
        "character" => parse::<char>(type_name, text),
        "locale" => parse::<Locale>(type_name, text),
        "string" => Ok(DynValue::new(text.to_string())),
        "string-name" => Ok(DynValue::new(StringName::new(text))),
        other => bail!(
            "Unsupported type: '{}'. Scalar types: boolean, double, float, byte, short, int, long, big-integer, character, locale, string, string-name",
            other
        ),
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
