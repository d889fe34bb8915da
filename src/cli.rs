use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ytsum::{SummaryLength, SummaryStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Details,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Collection {
    History,
    Favorites,
}

#[derive(Parser)]
#[command(
    name = "ytsum",
    about = "YouTube video summarizer client",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Show request details and storage locations
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Summarize a video and save it to history
    Summarize {
        /// YouTube video URL (reads URLs from stdin if omitted)
        url: Option<String>,

        /// Summary length [default: from config, else medium]
        #[arg(short, long, value_enum)]
        length: Option<SummaryLength>,

        /// Summary style [default: from config, else paragraph]
        #[arg(short, long, value_enum)]
        style: Option<SummaryStyle>,

        /// Output format: text (default), details, json
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Also write the summary text to this file (several URLs are appended in order)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Mark the new summary as a favorite
        #[arg(long)]
        favorite: bool,

        /// Summarization backend base URL
        #[arg(long)]
        backend: Option<String>,
    },

    /// List past summaries, newest first
    History {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List favorite summaries
    Favorites {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Toggle the favorite mark on a summary
    Favorite {
        /// Summary ID as shown by `history`
        id: String,
    },

    /// Show one summary in full
    Show {
        /// Summary ID as shown by `history` or `favorites`
        id: String,

        /// Output format: text, details (default), json
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Details)]
        format: OutputFormat,
    },

    /// Delete all history or all favorites
    Clear {
        #[arg(value_enum)]
        collection: Collection,
    },
}
