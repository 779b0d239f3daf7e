//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! For production use cases with large datasets, consider the sqlite-vec
//! extension or a dedicated vector database; backends that report cosine
//! distances slot in through [`Relevance::Distance`].

use super::{
    cosine_similarity, Candidate, ChannelRecord, ChunkRecord, Relevance, StoreStats, VectorStore,
    VideoRecord,
};
use crate::error::{KanalError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS channels (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    indexed_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS videos (
    id TEXT PRIMARY KEY,
    channel_id TEXT NOT NULL REFERENCES channels(id),
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    duration_seconds INTEGER NOT NULL,
    published_at TEXT,
    thumbnail_url TEXT,
    transcript_source TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chunks (
    id TEXT PRIMARY KEY,
    video_id TEXT NOT NULL REFERENCES videos(id),
    seq INTEGER NOT NULL,
    start_time REAL NOT NULL,
    end_time REAL NOT NULL,
    text TEXT NOT NULL,
    embedding BLOB NOT NULL,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chunks_video_id ON chunks(video_id);
CREATE INDEX IF NOT EXISTS idx_videos_channel_id ON videos(channel_id);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Create a new SQLite vector store.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| KanalError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn parse_datetime(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn row_to_video(row: &rusqlite::Row<'_>) -> rusqlite::Result<VideoRecord> {
        let published_at: Option<String> = row.get(5)?;
        Ok(VideoRecord {
            id: row.get(0)?,
            channel_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            duration_seconds: row.get(4)?,
            published_at: published_at.and_then(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            }),
            thumbnail_url: row.get(6)?,
            transcript_source: row.get(7)?,
        })
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, channel))]
    async fn upsert_channel(&self, channel: &ChannelRecord) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO channels (id, name, url, indexed_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                url = excluded.url,
                indexed_at = excluded.indexed_at
            "#,
            params![
                channel.id,
                channel.name,
                channel.url,
                channel.indexed_at.to_rfc3339(),
            ],
        )?;

        debug!("Upserted channel {}", channel.id);
        Ok(())
    }

    async fn get_channel(&self, channel_id: &str) -> Result<Option<ChannelRecord>> {
        let conn = self.lock()?;

        let channel = conn.query_row(
            "SELECT id, name, url, indexed_at FROM channels WHERE id = ?1",
            params![channel_id],
            |row| {
                let indexed_at: String = row.get(3)?;
                Ok(ChannelRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    url: row.get(2)?,
                    indexed_at: Self::parse_datetime(&indexed_at),
                })
            },
        );

        match channel {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_channels(&self) -> Result<Vec<ChannelRecord>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT id, name, url, indexed_at FROM channels ORDER BY indexed_at DESC",
        )?;

        let channels = stmt.query_map([], |row| {
            let indexed_at: String = row.get(3)?;
            Ok(ChannelRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                url: row.get(2)?,
                indexed_at: Self::parse_datetime(&indexed_at),
            })
        })?;

        Ok(channels.filter_map(|c| c.ok()).collect())
    }

    #[instrument(skip(self, video))]
    async fn upsert_video(&self, video: &VideoRecord) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO videos
            (id, channel_id, title, description, duration_seconds, published_at,
             thumbnail_url, transcript_source)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                channel_id = excluded.channel_id,
                title = excluded.title,
                description = excluded.description,
                duration_seconds = excluded.duration_seconds,
                published_at = excluded.published_at,
                thumbnail_url = excluded.thumbnail_url,
                transcript_source = excluded.transcript_source
            "#,
            params![
                video.id,
                video.channel_id,
                video.title,
                video.description,
                video.duration_seconds,
                video.published_at.map(|dt| dt.to_rfc3339()),
                video.thumbnail_url,
                video.transcript_source,
            ],
        )?;

        debug!("Upserted video {}", video.id);
        Ok(())
    }

    async fn get_video(&self, video_id: &str) -> Result<Option<VideoRecord>> {
        let conn = self.lock()?;

        let video = conn.query_row(
            r#"
            SELECT id, channel_id, title, description, duration_seconds,
                   published_at, thumbnail_url, transcript_source
            FROM videos WHERE id = ?1
            "#,
            params![video_id],
            Self::row_to_video,
        );

        match video {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_videos(&self, channel_id: Option<&str>) -> Result<Vec<VideoRecord>> {
        let conn = self.lock()?;

        let mut videos = Vec::new();
        match channel_id {
            Some(channel_id) => {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, channel_id, title, description, duration_seconds,
                           published_at, thumbnail_url, transcript_source
                    FROM videos WHERE channel_id = ?1
                    ORDER BY published_at DESC
                    "#,
                )?;
                let rows = stmt.query_map(params![channel_id], Self::row_to_video)?;
                videos.extend(rows.filter_map(|v| v.ok()));
            }
            None => {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, channel_id, title, description, duration_seconds,
                           published_at, thumbnail_url, transcript_source
                    FROM videos
                    ORDER BY published_at DESC
                    "#,
                )?;
                let rows = stmt.query_map([], Self::row_to_video)?;
                videos.extend(rows.filter_map(|v| v.ok()));
            }
        }

        Ok(videos)
    }

    async fn is_video_indexed(&self, video_id: &str) -> Result<bool> {
        let conn = self.lock()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM videos WHERE id = ?1",
            params![video_id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    #[instrument(skip(self, chunks))]
    async fn insert_chunks(&self, chunks: &[ChunkRecord]) -> Result<usize> {
        let conn = self.lock()?;

        let tx = conn.unchecked_transaction()?;

        for chunk in chunks {
            let embedding_bytes = Self::embedding_to_bytes(&chunk.embedding);

            tx.execute(
                r#"
                INSERT OR REPLACE INTO chunks
                (id, video_id, seq, start_time, end_time, text, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    chunk.id.to_string(),
                    chunk.video_id,
                    chunk.seq,
                    chunk.start_time,
                    chunk.end_time,
                    chunk.text,
                    embedding_bytes,
                    chunk.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Inserted {} chunks", chunks.len());
        Ok(chunks.len())
    }

    #[instrument(skip(self))]
    async fn delete_video_chunks(&self, video_id: &str) -> Result<usize> {
        let conn = self.lock()?;

        let deleted = conn.execute("DELETE FROM chunks WHERE video_id = ?1", params![video_id])?;

        debug!("Deleted {} chunks for video {}", deleted, video_id);
        Ok(deleted)
    }

    #[instrument(skip(self, query_embedding))]
    async fn nearest_neighbors(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<Candidate>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT chunks.id, chunks.text, chunks.start_time, chunks.end_time,
                   chunks.embedding, chunks.video_id, videos.title,
                   videos.channel_id, channels.name
            FROM chunks
            JOIN videos ON videos.id = chunks.video_id
            JOIN channels ON channels.id = videos.channel_id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let id_str: String = row.get(0)?;
            let embedding_bytes: Vec<u8> = row.get(4)?;
            Ok((
                id_str,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, f64>(3)?,
                Self::bytes_to_embedding(&embedding_bytes),
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?;

        let mut candidates: Vec<Candidate> = rows
            .filter_map(|r| r.ok())
            .map(
                |(id, text, start_time, end_time, embedding, video_id, video_title, channel_id, channel_name)| {
                    let score = cosine_similarity(query_embedding, &embedding);
                    Candidate {
                        chunk_id: uuid::Uuid::parse_str(&id).unwrap_or_default(),
                        relevance: Relevance::Score(score),
                        text,
                        start_time,
                        end_time,
                        video_id,
                        video_title,
                        channel_id,
                        channel_name,
                    }
                },
            )
            .collect();

        // Closest first
        candidates.sort_by(|a, b| {
            b.relevance
                .score()
                .partial_cmp(&a.relevance.score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(limit);

        debug!("Found {} candidates", candidates.len());
        Ok(candidates)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let conn = self.lock()?;

        let channels: i64 = conn.query_row("SELECT COUNT(*) FROM channels", [], |r| r.get(0))?;
        let videos: i64 = conn.query_row("SELECT COUNT(*) FROM videos", [], |r| r.get(0))?;
        let chunks: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |r| r.get(0))?;

        Ok(StoreStats {
            channels: channels as usize,
            videos: videos as usize,
            chunks: chunks as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::Chunk;

    fn sample_channel() -> ChannelRecord {
        ChannelRecord {
            id: "UC123".to_string(),
            name: "Test Channel".to_string(),
            url: "https://www.youtube.com/@test".to_string(),
            indexed_at: Utc::now(),
        }
    }

    fn sample_video(id: &str) -> VideoRecord {
        VideoRecord {
            id: id.to_string(),
            channel_id: "UC123".to_string(),
            title: "Test Video".to_string(),
            description: String::new(),
            duration_seconds: 120,
            published_at: None,
            thumbnail_url: None,
            transcript_source: "subtitles".to_string(),
        }
    }

    fn sample_chunk(video_id: &str, seq: i32, embedding: Vec<f32>) -> ChunkRecord {
        ChunkRecord::new(
            video_id.to_string(),
            &Chunk {
                text: format!("Test Video | chunk {}", seq),
                start_time: seq as f64 * 10.0,
                end_time: (seq + 1) as f64 * 10.0,
                seq,
            },
            embedding,
        )
    }

    #[tokio::test]
    async fn test_channel_and_video_round_trip() {
        let store = SqliteVectorStore::in_memory().unwrap();

        store.upsert_channel(&sample_channel()).await.unwrap();
        store.upsert_video(&sample_video("vid1")).await.unwrap();

        let channel = store.get_channel("UC123").await.unwrap().unwrap();
        assert_eq!(channel.name, "Test Channel");

        assert!(store.is_video_indexed("vid1").await.unwrap());
        assert!(!store.is_video_indexed("vid2").await.unwrap());

        let videos = store.list_videos(Some("UC123")).await.unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].transcript_source, "subtitles");
    }

    #[tokio::test]
    async fn test_nearest_neighbors_orders_by_similarity() {
        let store = SqliteVectorStore::in_memory().unwrap();

        store.upsert_channel(&sample_channel()).await.unwrap();
        store.upsert_video(&sample_video("vid1")).await.unwrap();
        store
            .insert_chunks(&[
                sample_chunk("vid1", 0, vec![1.0, 0.0, 0.0]),
                sample_chunk("vid1", 1, vec![0.0, 1.0, 0.0]),
                sample_chunk("vid1", 2, vec![0.9, 0.1, 0.0]),
            ])
            .await
            .unwrap();

        let candidates = store
            .nearest_neighbors(&[1.0, 0.0, 0.0], 2)
            .await
            .unwrap();

        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].text.contains("chunk 0"));
        assert!(candidates[1].text.contains("chunk 2"));
        assert_eq!(candidates[0].video_title, "Test Video");
        assert_eq!(candidates[0].channel_name, "Test Channel");
        assert!(matches!(candidates[0].relevance, Relevance::Score(s) if s > 0.99));
    }

    #[tokio::test]
    async fn test_delete_video_chunks() {
        let store = SqliteVectorStore::in_memory().unwrap();

        store.upsert_channel(&sample_channel()).await.unwrap();
        store.upsert_video(&sample_video("vid1")).await.unwrap();
        store
            .insert_chunks(&[sample_chunk("vid1", 0, vec![1.0, 0.0, 0.0])])
            .await
            .unwrap();

        assert_eq!(store.stats().await.unwrap().chunks, 1);
        let deleted = store.delete_video_chunks("vid1").await.unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(store.stats().await.unwrap().chunks, 0);
    }
}
