//! pdfdesk-ui - command-line front end for the document controller
//!
//! Each invocation loads the document list, runs one command through the
//! controller, flushes pending writes and prints any alerts raised.

use anyhow::Result;
use clap::{Parser, Subcommand};
use pdfdesk_common::config::ClientConfig;
use pdfdesk_common::events::UiEvent;
use pdfdesk_common::{Record, RecordId, SelectionFilter};
use pdfdesk_ui::upload::PendingFile;
use pdfdesk_ui::DocumentController;
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pdfdesk-ui", version, about = "Manage and query stored PDF documents")]
struct Cli {
    /// Base URL of the document service (overrides PDFDESK_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List documents, optionally only selected (true) or unselected (false) ones
    List {
        #[arg(long)]
        selected: Option<bool>,
    },
    /// Rename a document
    Rename { id: RecordId, name: String },
    /// Mark a document as selected (or unselected with --off)
    Select {
        id: RecordId,
        #[arg(long)]
        off: bool,
    },
    /// Upload a PDF file
    Upload { path: PathBuf },
    /// Delete a document
    Delete { id: RecordId },
    /// Ask a question about the first selected document
    Ask { question: String },
    /// Print a viewing link for a document
    View { id: RecordId },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ClientConfig::resolve(cli.api_url.as_deref(), cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting pdfdesk-ui v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let controller = DocumentController::connect(&config)?;
    let mut alerts = controller.subscribe();

    let outcome = run(&controller, cli.command).await;
    controller.flush_writes().await;
    print_alerts(&mut alerts);

    outcome
}

async fn run(controller: &DocumentController, command: Command) -> Result<()> {
    match command {
        Command::List { selected } => {
            let filter = SelectionFilter::from_query(selected);
            let records = controller.set_filter(filter).await?;
            print_records(&records);
        }
        Command::Rename { id, name } => {
            controller.init().await?;
            let record = controller.rename(id, name).await?;
            print_records(std::slice::from_ref(&record));
        }
        Command::Select { id, off } => {
            controller.init().await?;
            let record = controller.set_selected(id, !off).await?;
            print_records(std::slice::from_ref(&record));
        }
        Command::Upload { path } => {
            controller.init().await?;
            controller.select_file(PendingFile::from_path(&path).await?);
            let record = controller.upload().await?;
            print_records(std::slice::from_ref(&record));
        }
        Command::Delete { id } => {
            controller.init().await?;
            controller.delete(id).await?;
            println!("Deleted {}", id);
        }
        Command::Ask { question } => {
            controller.init().await?;
            let answer = controller.ask(&question).await?;
            println!("{}", answer);
        }
        Command::View { id } => {
            controller.init().await?;
            let link = controller.viewer_url(id).await?;
            println!("{}", link.url());
        }
    }
    Ok(())
}

fn print_records(records: &[Record]) {
    for record in records {
        let mark = if record.selected { "x" } else { " " };
        println!("{:>6}  [{}]  {}", record.id.0, mark, record.name);
    }
}

fn print_alerts(rx: &mut broadcast::Receiver<UiEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            UiEvent::Alert { message, .. } => eprintln!("! {}", message),
            UiEvent::WriteFailed { id, message, .. } => {
                eprintln!("! Changes to {} were not saved: {}", id, message)
            }
            _ => {}
        }
    }
}
