//! Pipeline orchestrator for Kanal.
//!
//! Coordinates the whole process from caption download to indexing, and
//! query-time search. All collaborators are constructed once here and passed
//! by reference; the transform pipeline itself is pure and synchronous.

use crate::chunking::{TokenChunker, Tokenizer, WordTokenizer};
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{KanalError, Result};
use crate::search::{self, SearchResult};
use crate::source::{ChannelInfo, VideoInfo, YoutubeSource};
use crate::transcript::{
    normalize_segments, parse_file, segments_from_words, Segment, SttResult,
};
use crate::vector_store::{
    ChannelRecord, ChunkRecord, SqliteVectorStore, VectorStore, VideoRecord,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The main orchestrator for the Kanal pipeline.
pub struct Orchestrator {
    settings: Settings,
    source: YoutubeSource,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    tokenizer: Arc<dyn Tokenizer>,
}

impl Orchestrator {
    /// Create a new orchestrator with default components.
    pub fn new(settings: Settings) -> Result<Self> {
        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));

        let vector_store = Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?);

        Ok(Self {
            settings,
            source: YoutubeSource::new(),
            embedder,
            vector_store,
            tokenizer: Arc::new(WordTokenizer),
        })
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        tokenizer: Arc<dyn Tokenizer>,
    ) -> Self {
        Self {
            settings,
            source: YoutubeSource::new(),
            embedder,
            vector_store,
            tokenizer,
        }
    }

    /// Get a reference to the vector store.
    pub fn vector_store(&self) -> Arc<dyn VectorStore> {
        self.vector_store.clone()
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Index every video of a channel.
    ///
    /// Videos are processed one at a time; a failure on one video is counted
    /// and logged but does not abort the rest.
    #[instrument(skip(self, progress), fields(url = %channel_url))]
    pub async fn add_channel(
        &self,
        channel_url: &str,
        force: bool,
        mut progress: impl FnMut(usize, usize, &str),
    ) -> Result<ChannelReport> {
        let channel = self.source.fetch_channel(channel_url).await?;
        info!("Indexing channel '{}' ({})", channel.name, channel.id);

        self.upsert_channel(&channel).await?;

        let video_ids = self.source.list_videos(&channel.url).await?;
        let total = video_ids.len();

        let mut report = ChannelReport {
            channel_id: channel.id.clone(),
            channel_name: channel.name.clone(),
            total,
            ..ChannelReport::default()
        };

        for (i, video_id) in video_ids.iter().enumerate() {
            progress(i + 1, total, video_id);

            if !force && self.vector_store.is_video_indexed(video_id).await? {
                report.skipped += 1;
                continue;
            }

            match self.index_video(video_id, force).await {
                Ok(result) => match result.outcome {
                    IndexOutcome::Indexed => report.indexed += 1,
                    IndexOutcome::AlreadyIndexed => report.skipped += 1,
                    IndexOutcome::MissingCaptions => report.missing_captions += 1,
                },
                Err(e) => {
                    warn!("Failed to index {}: {}", video_id, e);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Index a single video from its captions.
    #[instrument(skip(self))]
    pub async fn index_video(&self, video_id: &str, force: bool) -> Result<IndexResult> {
        if !force && self.vector_store.is_video_indexed(video_id).await? {
            info!("Video {} is already indexed, skipping", video_id);
            return Ok(IndexResult {
                video_id: video_id.to_string(),
                title: String::new(),
                chunks_indexed: 0,
                outcome: IndexOutcome::AlreadyIndexed,
            });
        }

        let video = self.source.fetch_video(video_id).await?;
        self.ensure_channel(&video).await?;

        // Captions land in a scratch directory that is removed on drop.
        let scratch = tempfile::tempdir()?;
        let Some(subtitle_path) = self
            .source
            .download_subtitles(video_id, scratch.path())
            .await?
        else {
            return Ok(IndexResult {
                video_id: video_id.to_string(),
                title: video.title,
                chunks_indexed: 0,
                outcome: IndexOutcome::MissingCaptions,
            });
        };

        let segments = parse_file(&subtitle_path)?;
        self.index_segments(video, segments, "subtitles").await
    }

    /// Index a video from an externally produced speech-to-text result.
    ///
    /// The alternative upstream input for videos without captions: callers
    /// run their own speech-to-text and hand the word-level result here.
    #[instrument(skip(self, stt))]
    pub async fn import_transcript(&self, video_id: &str, stt: &SttResult) -> Result<IndexResult> {
        let video = self.source.fetch_video(video_id).await?;
        self.ensure_channel(&video).await?;

        let segments = segments_from_words(stt);
        self.index_segments(video, segments, "speech_to_text").await
    }

    /// Search all indexed content.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedder.embed(query).await?;

        let candidates = self
            .vector_store
            .nearest_neighbors(&query_embedding, limit)
            .await?;

        Ok(search::rank(candidates))
    }

    /// Normalize, chunk, embed, and store a segment stream.
    async fn index_segments(
        &self,
        video: VideoInfo,
        segments: Vec<Segment>,
        transcript_source: &str,
    ) -> Result<IndexResult> {
        let segments = normalize_segments(segments, &self.settings.normalize);

        let chunker = TokenChunker::new(self.settings.chunking.clone());
        let chunks = chunker.chunk(&segments, &video.title, self.tokenizer.as_ref());

        if chunks.is_empty() {
            return Err(KanalError::InvalidInput(format!(
                "No transcript text for video {}",
                video.id
            )));
        }

        info!("Embedding {} chunks for '{}'", chunks.len(), video.title);
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        self.vector_store
            .upsert_video(&VideoRecord {
                id: video.id.clone(),
                channel_id: video.channel_id.clone().unwrap_or_default(),
                title: video.title.clone(),
                description: video.description.clone().unwrap_or_default(),
                duration_seconds: video.duration_seconds.unwrap_or(0),
                published_at: video.published_at,
                thumbnail_url: video.thumbnail_url.clone(),
                transcript_source: transcript_source.to_string(),
            })
            .await?;

        // Replace any chunks from an earlier run of this video.
        self.vector_store.delete_video_chunks(&video.id).await?;

        let records: Vec<ChunkRecord> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| ChunkRecord::new(video.id.clone(), chunk, embedding))
            .collect();

        let indexed = self.vector_store.insert_chunks(&records).await?;

        Ok(IndexResult {
            video_id: video.id,
            title: video.title,
            chunks_indexed: indexed,
            outcome: IndexOutcome::Indexed,
        })
    }

    async fn upsert_channel(&self, channel: &ChannelInfo) -> Result<()> {
        self.vector_store
            .upsert_channel(&ChannelRecord {
                id: channel.id.clone(),
                name: channel.name.clone(),
                url: channel.url.clone(),
                indexed_at: Utc::now(),
            })
            .await
    }

    /// Make sure the video's channel has a row, fetching it if needed.
    async fn ensure_channel(&self, video: &VideoInfo) -> Result<()> {
        let Some(channel_id) = video.channel_id.as_deref() else {
            return Err(KanalError::InvalidInput(format!(
                "Could not determine channel for video {}",
                video.id
            )));
        };

        if self.vector_store.get_channel(channel_id).await?.is_some() {
            return Ok(());
        }

        let channel_url = format!("https://www.youtube.com/channel/{}", channel_id);
        let channel = match self.source.fetch_channel(&channel_url).await {
            Ok(channel) => channel,
            Err(e) => {
                // Keep provenance usable even when the channel lookup fails.
                warn!("Channel lookup failed for {}: {}", channel_id, e);
                ChannelInfo {
                    id: channel_id.to_string(),
                    name: "Unknown Channel".to_string(),
                    url: channel_url,
                }
            }
        };

        self.upsert_channel(&channel).await
    }
}

/// Outcome of indexing one video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    /// Chunks were embedded and stored.
    Indexed,
    /// The video was already in the store and `force` was not set.
    AlreadyIndexed,
    /// The video has no captions in any preferred language.
    MissingCaptions,
}

/// Result of indexing one video.
#[derive(Debug)]
pub struct IndexResult {
    /// Video ID.
    pub video_id: String,
    /// Title.
    pub title: String,
    /// Number of chunks stored.
    pub chunks_indexed: usize,
    /// What happened.
    pub outcome: IndexOutcome,
}

/// Summary of a channel indexing run.
#[derive(Debug, Default)]
pub struct ChannelReport {
    /// Channel ID.
    pub channel_id: String,
    /// Channel name.
    pub channel_name: String,
    /// Total videos found on the channel.
    pub total: usize,
    /// Videos newly indexed.
    pub indexed: usize,
    /// Videos skipped because they were already indexed.
    pub skipped: usize,
    /// Videos without captions.
    pub missing_captions: usize,
    /// Videos that failed outright.
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::Chunk;
    use crate::vector_store::MemoryVectorStore;
    use async_trait::async_trait;

    /// Embedder that maps any text to a fixed direction, so similarity is
    /// exercised without a network call.
    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    async fn seeded_store() -> Arc<MemoryVectorStore> {
        let store = Arc::new(MemoryVectorStore::new());

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
                title: "My Video".to_string(),
                description: String::new(),
                duration_seconds: 300,
                published_at: None,
                thumbnail_url: None,
                transcript_source: "subtitles".to_string(),
            })
            .await
            .unwrap();

        store
            .insert_chunks(&[
                ChunkRecord::new(
                    "vid1".to_string(),
                    &Chunk {
                        text: "My Video | near match".to_string(),
                        start_time: 65.0,
                        end_time: 90.0,
                        seq: 0,
                    },
                    vec![1.0, 0.0],
                ),
                ChunkRecord::new(
                    "vid1".to_string(),
                    &Chunk {
                        text: "My Video | far match".to_string(),
                        start_time: 90.0,
                        end_time: 120.0,
                        seq: 1,
                    },
                    vec![0.0, 1.0],
                ),
            ])
            .await
            .unwrap();

        store
    }

    #[tokio::test]
    async fn test_search_ranks_and_formats_results() {
        let store = seeded_store().await;
        let orchestrator = Orchestrator::with_components(
            Settings::default(),
            Arc::new(StubEmbedder),
            store,
            Arc::new(WordTokenizer),
        );

        let results = orchestrator.search("anything", 10).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "near match");
        assert_eq!(results[0].timestamp, "1:05");
        assert_eq!(results[0].url, "https://youtube.com/watch?v=vid1&t=65");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_search_empty_store() {
        let orchestrator = Orchestrator::with_components(
            Settings::default(),
            Arc::new(StubEmbedder),
            Arc::new(MemoryVectorStore::new()),
            Arc::new(WordTokenizer),
        );

        let results = orchestrator.search("anything", 10).await.unwrap();
        assert!(results.is_empty());
    }
}
