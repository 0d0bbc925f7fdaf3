//! Lists the services and messages a DML schema directory resolves to,
//! mainly useful for sanity-checking a freshly exported schema dump.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ki_protocol::DmlSchemaRegistry;

/// Load a directory of DML service XML files and print what was found.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory containing one XML file per DML service.
    dir: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let schema = DmlSchemaRegistry::load_dir(&args.dir)
        .with_context(|| format!("loading DML schema from {}", args.dir.display()))?;

    for protocol_id in 0u8..=255 {
        let Some(service) = schema.service(protocol_id) else {
            continue;
        };
        println!(
            "protocol {protocol_id} \"{}\" (v{})",
            service.protocol_type, service.version
        );
        let mut messages: Vec<_> = service.messages.values().collect();
        messages.sort_by_key(|m| m.msg_id);
        for message in messages {
            println!(
                "  msg {:>3} {:<32} fields={}",
                message.msg_id,
                message.name,
                message.fields.len()
            );
        }
    }

    Ok(())
}
