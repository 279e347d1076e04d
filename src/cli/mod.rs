//! CLI surface for the knowledge-base tool.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use crate::models::OutputFormat;

/// Ask questions of your own documents, with citations.
#[derive(Debug, Parser)]
#[command(name = "kbask")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(
        long,
        short = 'f',
        global = true,
        help = "Output format: text, json, or markdown"
    )]
    pub format: Option<OutputFormat>,

    #[arg(long, short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add documents to the knowledge base
    Ingest(commands::IngestArgs),

    /// Ask a question answered from the knowledge base
    Ask(commands::AskArgs),

    /// Retrieve matching chunks without composing an answer
    Search(commands::SearchArgs),

    /// Show knowledge-base status
    Status,

    /// Browse stored chunks
    List(commands::ListArgs),

    /// Delete every stored document and chunk
    Clear(commands::ClearArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::ConfigCommand),
}
