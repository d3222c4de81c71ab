use std::path::PathBuf;

use clap::Parser;
use miette::Result;
use proto3_lines::{file::File, FieldValue, Message, Model};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
pub struct Args {
    /// The source file(s) to parse
    #[clap(value_name = "PROTO_FILES", required = true, value_parser)]
    files: Vec<PathBuf>,
    /// If set, only checks that the files parse and prints nothing on success.
    #[clap(short, long)]
    quiet: bool,
}

pub fn main() -> Result<()> {
    miette::set_panic_hook();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    for path in args.files {
        let file = File::open(&path)?;
        tracing::info!(path = %path.display(), "parsed file");

        if !args.quiet {
            println!("{}:", path.display());
            print_summary(file.model());
        }
    }
    Ok(())
}

fn print_summary(model: &Model) {
    println!("  syntax: {}", model.syntax());
    println!("  package: {}", model.package_name());
    for import in model.imports() {
        println!("  import: {}", import);
    }
    for (name, value) in model.options() {
        println!("  option: {} = {}", name, value);
    }
    for service in model.services() {
        println!("  service {}", service.name());
        for rpc in service.rpcs() {
            println!(
                "    rpc {}({}) returns ({})",
                rpc.name(),
                rpc.request(),
                rpc.response()
            );
        }
    }
    for message in model.messages() {
        print_message(message, 1);
    }
}

fn print_message(message: &Message, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{}message {}", indent, message.name());
    for (name, value) in message.fields() {
        match value {
            FieldValue::Scalar(field) => println!("{}  {} {}", indent, field, name),
            FieldValue::Message(nested) => print_message(nested, depth + 1),
        }
    }
}
