//! Error types for Kanal.

use thiserror::Error;

/// Library-level error type for Kanal operations.
#[derive(Error, Debug)]
pub enum KanalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid timestamp format: {0}")]
    TimestampFormat(String),

    #[error("Unrecognized subtitle format: {0}")]
    FormatUnrecognized(String),

    #[error("Source error: {0}")]
    Source(String),

    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Subtitle download failed: {0}")]
    SubtitleDownload(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Kanal operations.
pub type Result<T> = std::result::Result<T, KanalError>;
