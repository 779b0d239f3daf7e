//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{
    cosine_similarity, Candidate, ChannelRecord, ChunkRecord, Relevance, StoreStats, VectorStore,
    VideoRecord,
};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector store.
#[derive(Default)]
pub struct MemoryVectorStore {
    channels: RwLock<HashMap<String, ChannelRecord>>,
    videos: RwLock<HashMap<String, VideoRecord>>,
    chunks: RwLock<HashMap<String, ChunkRecord>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert_channel(&self, channel: &ChannelRecord) -> Result<()> {
        let mut channels = self.channels.write().unwrap();
        channels.insert(channel.id.clone(), channel.clone());
        Ok(())
    }

    async fn get_channel(&self, channel_id: &str) -> Result<Option<ChannelRecord>> {
        let channels = self.channels.read().unwrap();
        Ok(channels.get(channel_id).cloned())
    }

    async fn list_channels(&self) -> Result<Vec<ChannelRecord>> {
        let channels = self.channels.read().unwrap();
        let mut result: Vec<ChannelRecord> = channels.values().cloned().collect();
        result.sort_by(|a, b| b.indexed_at.cmp(&a.indexed_at));
        Ok(result)
    }

    async fn upsert_video(&self, video: &VideoRecord) -> Result<()> {
        let mut videos = self.videos.write().unwrap();
        videos.insert(video.id.clone(), video.clone());
        Ok(())
    }

    async fn get_video(&self, video_id: &str) -> Result<Option<VideoRecord>> {
        let videos = self.videos.read().unwrap();
        Ok(videos.get(video_id).cloned())
    }

    async fn list_videos(&self, channel_id: Option<&str>) -> Result<Vec<VideoRecord>> {
        let videos = self.videos.read().unwrap();
        let mut result: Vec<VideoRecord> = videos
            .values()
            .filter(|v| channel_id.map_or(true, |c| v.channel_id == c))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(result)
    }

    async fn is_video_indexed(&self, video_id: &str) -> Result<bool> {
        let videos = self.videos.read().unwrap();
        Ok(videos.contains_key(video_id))
    }

    async fn insert_chunks(&self, chunks: &[ChunkRecord]) -> Result<usize> {
        let mut store = self.chunks.write().unwrap();
        for chunk in chunks {
            store.insert(chunk.id.to_string(), chunk.clone());
        }
        Ok(chunks.len())
    }

    async fn delete_video_chunks(&self, video_id: &str) -> Result<usize> {
        let mut chunks = self.chunks.write().unwrap();
        let initial_len = chunks.len();
        chunks.retain(|_, chunk| chunk.video_id != video_id);
        Ok(initial_len - chunks.len())
    }

    async fn nearest_neighbors(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<Candidate>> {
        let chunks = self.chunks.read().unwrap();
        let videos = self.videos.read().unwrap();
        let channels = self.channels.read().unwrap();

        let mut candidates: Vec<Candidate> = chunks
            .values()
            .filter_map(|chunk| {
                let video = videos.get(&chunk.video_id)?;
                let channel = channels.get(&video.channel_id)?;
                let score = cosine_similarity(query_embedding, &chunk.embedding);
                Some(Candidate {
                    chunk_id: chunk.id,
                    relevance: Relevance::Score(score),
                    text: chunk.text.clone(),
                    start_time: chunk.start_time,
                    end_time: chunk.end_time,
                    video_id: video.id.clone(),
                    video_title: video.title.clone(),
                    channel_id: channel.id.clone(),
                    channel_name: channel.name.clone(),
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.relevance
                .score()
                .partial_cmp(&a.relevance.score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(limit);

        Ok(candidates)
    }

    async fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            channels: self.channels.read().unwrap().len(),
            videos: self.videos.read().unwrap().len(),
            chunks: self.chunks.read().unwrap().len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::Chunk;
    use chrono::Utc;

    #[tokio::test]
    async fn test_memory_vector_store() {
        let store = MemoryVectorStore::new();

        store
            .upsert_channel(&ChannelRecord {
                id: "UC1".to_string(),
                name: "Channel".to_string(),
                url: "https://www.youtube.com/@c".to_string(),
                indexed_at: Utc::now(),
            })
            .await
            .unwrap();

        store
            .upsert_video(&VideoRecord {
                id: "vid1".to_string(),
                channel_id: "UC1".to_string(),
                title: "Video".to_string(),
                description: String::new(),
                duration_seconds: 60,
                published_at: None,
                thumbnail_url: None,
                transcript_source: "subtitles".to_string(),
            })
            .await
            .unwrap();

        let records: Vec<ChunkRecord> = [(0, vec![1.0, 0.0]), (1, vec![0.0, 1.0])]
            .into_iter()
            .map(|(seq, embedding)| {
                ChunkRecord::new(
                    "vid1".to_string(),
                    &Chunk {
                        text: format!("Video | part {}", seq),
                        start_time: 0.0,
                        end_time: 10.0,
                        seq,
                    },
                    embedding,
                )
            })
            .collect();
        store.insert_chunks(&records).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.channels, 1);
        assert_eq!(stats.videos, 1);
        assert_eq!(stats.chunks, 2);

        let candidates = store.nearest_neighbors(&[1.0, 0.0], 10).await.unwrap();
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].text.contains("part 0"));

        let deleted = store.delete_video_chunks("vid1").await.unwrap();
        assert_eq!(deleted, 2);
    }
}
