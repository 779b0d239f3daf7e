//! Kanal - YouTube Channel Transcript Search
//!
//! A local-first CLI tool for indexing the transcripts of entire YouTube
//! channels and searching them semantically.
//!
//! The name "Kanal" comes from the Norwegian/Scandinavian word for "channel."
//!
//! # Overview
//!
//! Kanal allows you to:
//! - Index every video of a YouTube channel from its caption files
//! - Collapse the rolling, self-repeating text of auto-generated captions
//! - Build a searchable vector database of token-bounded transcript chunks
//! - Search across all indexed channels and jump to the exact timestamp
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `source` - YouTube metadata and caption fetching (via yt-dlp)
//! - `transcript` - Caption parsing, deduplication, and normalization
//! - `chunking` - Token-bounded chunking with overlap
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `search` - Result ranking and display formatting
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use kanal::config::Settings;
//! use kanal::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     // Index every video of a channel
//!     let report = orchestrator
//!         .add_channel("https://www.youtube.com/@somechannel", false, |_, _, _| {})
//!         .await?;
//!     println!("Indexed {} videos", report.indexed);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod orchestrator;
pub mod search;
pub mod source;
pub mod transcript;
pub mod vector_store;

pub use error::{KanalError, Result};
