// ABOUTME: Entry point for the folio binary.
// ABOUTME: Parses CLI arguments, initializes tracing, bootstraps the editor, and runs one command.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use folio_app::{Editor, FolioConfig};
use ulid::Ulid;

/// Outline editor for chapters, subchapters, diagrams, and documents.
#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the outline tree and the attachments of the current selection
    Show,

    /// Write the outline as Markdown
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Append a new chapter and select it
    AddChapter,

    /// Append a new subchapter to the selected chapter and select it
    AddSubchapter,

    /// Select a chapter, or a subchapter of the selected chapter
    Select {
        id: Ulid,

        /// Treat the id as a subchapter of the selected chapter
        #[arg(short, long)]
        sub: bool,
    },

    /// Set the title and description of the current selection
    Rename {
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Flip a chapter between expanded and collapsed
    Toggle { id: Ulid },

    /// Expand every chapter
    ExpandAll,

    /// Collapse every chapter
    CollapseAll,

    /// Attach a diagram to the current selection
    AddDiagram {
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,

        #[command(flatten)]
        source: commands::SourceArgs,
    },

    /// Change a diagram of the current selection
    UpdateDiagram {
        id: Ulid,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[command(flatten)]
        source: commands::SourceArgs,
    },

    /// Attach a document to the current selection
    AddDocument {
        title: String,

        /// File to attach
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Document date (YYYY-MM-DD, default: today)
        #[arg(long, conflicts_with = "no_date")]
        date: Option<NaiveDate>,

        /// Leave the document undated
        #[arg(long)]
        no_date: bool,

        /// Declared media type (default: guessed from the extension)
        #[arg(long = "type")]
        media_type: Option<String>,

        /// Stored file name (default: the file's own name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Change a document of the current selection; omit --file to keep the stored file
    UpdateDocument {
        id: Ulid,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// New document date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_date")]
        date: Option<NaiveDate>,

        /// Remove the document date
        #[arg(long)]
        clear_date: bool,

        /// Replacement file
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[arg(long = "type", requires = "file")]
        media_type: Option<String>,

        #[arg(long, requires = "file")]
        name: Option<String>,
    },

    /// Show a diagram of the current selection
    OpenDiagram {
        id: Ulid,

        /// Write image bytes to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show a document of the current selection
    OpenDocument {
        id: Ulid,

        /// Write the document bytes to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Delete a chapter and everything in it
    DeleteChapter {
        id: Ulid,

        #[arg(short, long)]
        yes: bool,
    },

    /// Delete a subchapter of the selected chapter
    DeleteSubchapter {
        id: Ulid,

        #[arg(short, long)]
        yes: bool,
    },

    /// Delete a diagram of the current selection
    DeleteDiagram {
        id: Ulid,

        #[arg(short, long)]
        yes: bool,
    },

    /// Delete a document of the current selection
    DeleteDocument {
        id: Ulid,

        #[arg(short, long)]
        yes: bool,
    },

    /// Write the outline snapshot now
    Save,

    /// Reload the outline from the snapshot
    Reload,

    /// Erase everything and restore the default chapters
    Reset {
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("folio=info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match FolioConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!("folio home: {}", config.home.display());

    let mut editor = Editor::bootstrap(&config).await;

    match commands::run(&mut editor, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
