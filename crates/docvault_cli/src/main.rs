//! Command line front-end for the document store.
//!
//! # Responsibility
//! - Drive the invoice API boundary against a SQLite file.
//! - Print response envelopes as JSON and map failures to a non-zero exit.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use docvault_core::db::open_db;
use docvault_core::{
    core_version, init_logging, invoice_create, invoice_show, ConnectionScope, CoreConfig,
    Document, DocumentStatus, InvoiceRecord, Item, ResponseEnvelope,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "docvault")]
#[command(about = "Create and inspect invoice documents", long_about = None)]
struct Cli {
    /// SQLite database file (defaults to DOCVAULT_DB_PATH or a temp file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files (defaults to DOCVAULT_LOG_DIR)
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error (defaults to DOCVAULT_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the core version
    Version,
    /// Invoice operations
    Invoice {
        #[command(subcommand)]
        command: InvoiceCommands,
    },
}

#[derive(Subcommand)]
enum InvoiceCommands {
    /// Create a new invoice with its line items
    Create {
        /// Line item as CODE:TITLE:UNIT_PRICE[:QUANTITY[:CURRENCY]]
        #[arg(long = "item", value_parser = parse_item_spec)]
        items: Vec<(Item, u32)>,

        /// draft|issued|paid|cancelled
        #[arg(long, default_value = "draft", value_parser = parse_status)]
        status: DocumentStatus,

        /// Issue date in unix epoch milliseconds
        #[arg(long)]
        issued_at: Option<i64>,

        /// Due date in unix epoch milliseconds
        #[arg(long)]
        due_at: Option<i64>,

        #[arg(long)]
        provider: Option<i64>,

        #[arg(long)]
        receiver: Option<i64>,

        /// Row id of the receipt settling this invoice
        #[arg(long)]
        receipt: Option<i64>,
    },
    /// Show an invoice by document id
    Show { document_id: i64 },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = resolve_config(&cli);

    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            bail!("logging init failed: {err}");
        }
    }

    let envelope = match cli.command {
        Commands::Version => {
            println!("docvault_core version={}", core_version());
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Invoice { command } => run_invoice_command(command, &config.db_path)?,
    };

    print_envelope(&envelope)?;
    Ok(if envelope.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_invoice_command(
    command: InvoiceCommands,
    db_path: &Path,
) -> anyhow::Result<ResponseEnvelope> {
    let envelope = match command {
        InvoiceCommands::Show { document_id } => {
            invoice_show(ConnectionScope::Open(db_path), document_id)
        }
        InvoiceCommands::Create {
            items,
            status,
            issued_at,
            due_at,
            provider,
            receiver,
            receipt,
        } => {
            let mut invoice = InvoiceRecord::with_document(Document {
                status,
                issued_at,
                due_at,
                provider_institution_id: provider,
                receiver_institution_id: receiver,
                ..Document::new()
            });
            invoice.set_receipt_entry_id(receipt);
            for (item, quantity) in items {
                invoice.add_item(item, quantity);
            }

            let mut conn = open_db(db_path)
                .with_context(|| format!("failed to open database `{}`", db_path.display()))?;
            invoice_create(&mut conn, &mut invoice)
        }
    };
    Ok(envelope)
}

fn resolve_config(cli: &Cli) -> CoreConfig {
    let mut config = CoreConfig::from_env();
    if let Some(db) = cli.db.clone() {
        config.db_path = db;
    }
    if let Some(log_dir) = cli.log_dir.clone() {
        config.log_dir = Some(log_dir);
    }
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level;
    }
    config
}

fn print_envelope(envelope: &ResponseEnvelope) -> anyhow::Result<()> {
    println!("{}", render_envelope(envelope)?);
    Ok(())
}

fn render_envelope(envelope: &ResponseEnvelope) -> anyhow::Result<String> {
    serde_json::to_string_pretty(&envelope.to_json()).context("failed to render response")
}

fn parse_status(value: &str) -> Result<DocumentStatus, String> {
    DocumentStatus::parse(&value.trim().to_ascii_lowercase())
        .ok_or_else(|| format!("unknown status `{value}`; expected draft|issued|paid|cancelled"))
}

/// Parses `CODE:TITLE:UNIT_PRICE[:QUANTITY[:CURRENCY]]`; quantity defaults to 1.
fn parse_item_spec(value: &str) -> Result<(Item, u32), String> {
    let parts: Vec<&str> = value.split(':').collect();
    if !(3..=5).contains(&parts.len()) {
        return Err(format!(
            "item `{value}` must look like CODE:TITLE:UNIT_PRICE[:QUANTITY[:CURRENCY]]"
        ));
    }

    let unit_price = parts[2]
        .trim()
        .parse::<i64>()
        .map_err(|err| format!("invalid unit price `{}`: {err}", parts[2]))?;
    let quantity = match parts.get(3) {
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|err| format!("invalid quantity `{raw}`: {err}"))?,
        None => 1,
    };

    let mut item = Item::new(parts[0].trim(), parts[1].trim(), unit_price);
    if let Some(currency) = parts.get(4) {
        item = item.with_currency(currency.trim());
    }
    Ok((item, quantity))
}
