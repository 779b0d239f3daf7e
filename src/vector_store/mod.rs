//! Vector store abstraction for Kanal.
//!
//! Provides a trait-based interface for different vector database backends.
//! The store keeps channel and video provenance alongside embedded chunks,
//! and answers nearest-neighbor queries with candidates ready for ranking.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::chunking::Chunk;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An indexed YouTube channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Channel ID.
    pub id: String,
    /// Channel name.
    pub name: String,
    /// Channel URL.
    pub url: String,
    /// When the channel was last indexed.
    pub indexed_at: DateTime<Utc>,
}

/// An indexed video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Video ID.
    pub id: String,
    /// Channel this video belongs to.
    pub channel_id: String,
    /// Video title.
    pub title: String,
    /// Video description.
    pub description: String,
    /// Duration in seconds.
    pub duration_seconds: u32,
    /// Publication date (if known).
    pub published_at: Option<DateTime<Utc>>,
    /// Thumbnail URL (if known).
    pub thumbnail_url: Option<String>,
    /// Where the transcript came from ("subtitles" or "speech_to_text").
    pub transcript_source: String,
}

/// A persisted transcript chunk with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Unique chunk ID.
    pub id: Uuid,
    /// Video this chunk belongs to.
    pub video_id: String,
    /// Zero-based position of this chunk within its transcript.
    pub seq: i32,
    /// Start time in seconds.
    pub start_time: f64,
    /// End time in seconds.
    pub end_time: f64,
    /// Chunk text (title-prefixed, as produced by the chunker).
    pub text: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this chunk was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl ChunkRecord {
    /// Create a record from a chunk and its embedding.
    pub fn new(video_id: String, chunk: &Chunk, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            video_id,
            seq: chunk.seq,
            start_time: chunk.start_time,
            end_time: chunk.end_time,
            text: chunk.text.clone(),
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// How a backend reports the closeness of a candidate to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Relevance {
    /// Cosine distance: lower is closer.
    Distance(f32),
    /// Similarity score: higher is closer.
    Score(f32),
}

impl Relevance {
    /// Derive a similarity score.
    ///
    /// Cosine distances invert to `1 - distance` (clamped into [0, 1]);
    /// similarity scores pass through unchanged.
    pub fn score(&self) -> f32 {
        match self {
            Relevance::Distance(distance) => (1.0 - distance).clamp(0.0, 1.0),
            Relevance::Score(score) => *score,
        }
    }
}

/// A nearest-neighbor candidate, joined with its provenance metadata.
///
/// This is the shape the ranker consumes: the raw relevance as the backend
/// reported it, plus everything needed to render a result.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// ID of the matched chunk.
    pub chunk_id: Uuid,
    /// Closeness as reported by the backend.
    pub relevance: Relevance,
    /// Stored chunk text.
    pub text: String,
    /// Start time in seconds.
    pub start_time: f64,
    /// End time in seconds.
    pub end_time: f64,
    /// Video ID.
    pub video_id: String,
    /// Video title.
    pub video_title: String,
    /// Channel ID.
    pub channel_id: String,
    /// Channel name.
    pub channel_name: String,
}

/// Row counts for the whole store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreStats {
    pub channels: usize,
    pub videos: usize,
    pub chunks: usize,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or update a channel.
    async fn upsert_channel(&self, channel: &ChannelRecord) -> Result<()>;

    /// Get a channel by ID.
    async fn get_channel(&self, channel_id: &str) -> Result<Option<ChannelRecord>>;

    /// List all indexed channels, most recently indexed first.
    async fn list_channels(&self) -> Result<Vec<ChannelRecord>>;

    /// Insert or update a video.
    async fn upsert_video(&self, video: &VideoRecord) -> Result<()>;

    /// Get a video by ID.
    async fn get_video(&self, video_id: &str) -> Result<Option<VideoRecord>>;

    /// List videos, optionally filtered by channel.
    async fn list_videos(&self, channel_id: Option<&str>) -> Result<Vec<VideoRecord>>;

    /// Check if a video is already indexed.
    async fn is_video_indexed(&self, video_id: &str) -> Result<bool>;

    /// Bulk insert chunks with embeddings.
    async fn insert_chunks(&self, chunks: &[ChunkRecord]) -> Result<usize>;

    /// Delete all chunks for a video.
    async fn delete_video_chunks(&self, video_id: &str) -> Result<usize>;

    /// Return the top-K candidates for a query embedding.
    async fn nearest_neighbors(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<Candidate>>;

    /// Get store-wide row counts.
    async fn stats(&self) -> Result<StoreStats>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_chunk_record_from_chunk() {
        let chunk = Chunk {
            text: "Title | some text".to_string(),
            start_time: 3.0,
            end_time: 9.0,
            seq: 2,
        };

        let record = ChunkRecord::new("video1".to_string(), &chunk, vec![0.1, 0.2]);
        assert_eq!(record.video_id, "video1");
        assert_eq!(record.seq, 2);
        assert_eq!(record.text, "Title | some text");
        assert_eq!(record.embedding, vec![0.1, 0.2]);
    }
}
