//! docbind command-line tool
//!
//! Runs documents through the binder against a set of class schemas:
//!
//!   docbind --schemas schemas.json normalize --type Person person.json
//!   docbind --schemas schemas.json token --type Person 42
//!
//! Nothing is persisted: every document decodes detached.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docbind_cli::{build_binder, describe_token, load_schemas, normalize, resolve_config};
use docbind_model::Document;
use std::io::Read;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "docbind")]
#[command(about = "Bind JSON documents to schema-described objects")]
struct Args {
    /// JSON file holding an array of class schemas
    #[arg(short, long)]
    schemas: PathBuf,

    /// Binder configuration file
    #[arg(short, long, default_value = "docbind.toml")]
    config: PathBuf,

    /// Override the configured maximum nesting depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Lift the nesting depth bound entirely
    #[arg(long, conflicts_with = "max_depth")]
    unbounded_depth: bool,

    /// Reject object graphs with cycles
    #[arg(long)]
    cycle_guard: bool,

    /// Pretty-print output documents
    #[arg(long)]
    pretty: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a document (or a list of them) and encode it back
    Normalize {
        /// Declared type of the document
        #[arg(short = 't', long = "type")]
        type_name: String,

        /// Only encode these fields, in this order
        #[arg(short, long, value_delimiter = ',')]
        fields: Vec<String>,

        /// Input file; standard input when omitted
        input: Option<PathBuf>,
    },
    /// Parse an identity token for a type
    Token {
        #[arg(short = 't', long = "type")]
        type_name: String,

        token: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let registry = load_schemas(&args.schemas)?;
    let config = resolve_config(&args.config, args.max_depth, args.unbounded_depth, args.cycle_guard);
    info!(max_depth = ?config.max_depth, cycle_guard = config.cycle_guard, "Binder configured");
    let binder = build_binder(registry, config);

    let output = match args.command {
        Command::Normalize {
            type_name,
            fields,
            input,
        } => {
            let document = read_document(input.as_ref())?;
            normalize(&binder, &document, &type_name, &fields)?
        }
        Command::Token { type_name, token } => describe_token(&binder, &type_name, &token)?,
    };

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");
    Ok(())
}

fn read_document(input: Option<&PathBuf>) -> Result<Document> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read standard input")?;
            text
        }
    };
    serde_json::from_str(&text).context("input is not valid JSON")
}
