//! Decodes one KI frame read from a file and prints the rendered result as
//! JSON. A minimal smoke-test harness, not the full capture tool.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ki_protocol::{DmlSchemaRegistry, Dispatcher, PropertyObjectRegistry, render};

/// Decode a single captured KI frame and print it as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Raw bytes of one captured frame.
    #[arg(long)]
    frame: PathBuf,

    /// Directory of DML service XML files (optional: unknown messages
    /// decode to an error record without one).
    #[arg(long)]
    dml_schema: Option<PathBuf>,

    /// PO typedef JSON document (optional: property objects fail to
    /// resolve without one).
    #[arg(long)]
    po_typedefs: Option<PathBuf>,

    /// Downgrade per-frame decode errors to a record instead of failing.
    #[arg(long)]
    silence_decode_errors: bool,

    /// Drop protocol/message descriptions from the rendered output.
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let dml_schema = match args.dml_schema {
        Some(path) => DmlSchemaRegistry::load_dir(&path)
            .with_context(|| format!("loading DML schema from {}", path.display()))?,
        None => DmlSchemaRegistry::empty(),
    };
    let po_registry = match args.po_typedefs {
        Some(path) => PropertyObjectRegistry::load(&path)
            .with_context(|| format!("loading PO typedefs from {}", path.display()))?,
        None => PropertyObjectRegistry::empty(),
    };

    let bytes = fs::read(&args.frame)
        .with_context(|| format!("reading frame {}", args.frame.display()))?;

    let dispatcher = Dispatcher::new(dml_schema, po_registry, args.silence_decode_errors);
    let record = dispatcher
        .decode(&bytes)
        .with_context(|| format!("decoding {}", args.frame.display()))?;

    let rendered = render(&record, args.compact);
    println!("{}", serde_json::to_string_pretty(&rendered)?);
    Ok(())
}
