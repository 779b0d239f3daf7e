//! CLI module for Kanal.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Kanal - YouTube Channel Transcript Search
///
/// A local-first CLI tool for indexing YouTube channels and searching their
/// transcripts semantically. The name "Kanal" comes from the
/// Norwegian/Scandinavian word for "channel."
#[derive(Parser, Debug)]
#[command(name = "kanal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Kanal and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Add a YouTube channel and index all its videos
    Add {
        /// YouTube channel URL (e.g., https://www.youtube.com/@channelname)
        url: String,

        /// Force re-indexing of videos that are already indexed
        #[arg(short, long)]
        force: bool,
    },

    /// Index or re-index a single video
    IndexVideo {
        /// YouTube video ID (e.g., dQw4w9WgXcQ)
        video_id: String,

        /// Force re-indexing even if already indexed
        #[arg(short, long)]
        force: bool,
    },

    /// Index a video from a speech-to-text result file
    Import {
        /// YouTube video ID the transcript belongs to
        video_id: String,

        /// Path to a JSON file with { text, words: [{ text, start, end }] }
        file: String,
    },

    /// Search across all indexed content
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// List indexed channels
    List {
        /// Show videos for each channel
        #[arg(short, long)]
        verbose: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
