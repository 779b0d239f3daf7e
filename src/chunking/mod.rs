//! Token-bounded transcript chunking with overlap.
//!
//! Groups normalized segments into chunks that fit a token budget, carrying
//! a short tail of each chunk into the next so retrieval recall survives
//! chunk boundaries.

mod tokenizer;

pub use tokenizer::{Tokenizer, WordTokenizer};

use crate::transcript::Segment;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A token-budget-bounded chunk of transcript text.
///
/// This is the unit that gets embedded and indexed. `text` carries a
/// `"{title} | "` prefix so the title contributes to the embedding;
/// `start_time`/`end_time` span the first/last contained segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text, prefixed with the video title.
    pub text: String,
    /// Start time of the first contained segment, in seconds.
    pub start_time: f64,
    /// End time of the last contained segment, in seconds.
    pub end_time: f64,
    /// Zero-based position of this chunk within its transcript.
    pub seq: i32,
}

/// Configuration for token-bounded chunking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target token count per chunk.
    pub target_tokens: usize,
    /// Fraction of the target carried over between adjacent chunks.
    pub overlap_pct: f64,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_tokens: 800,
            overlap_pct: 0.15,
        }
    }
}

impl ChunkingConfig {
    /// Token budget reserved at the tail of a closed chunk and carried into
    /// the next one.
    pub fn overlap_budget(&self) -> usize {
        (self.target_tokens as f64 * self.overlap_pct) as usize
    }
}

/// Token-bounded chunker.
///
/// Deterministic: identical inputs (segments, title, config, tokenizer)
/// always yield identical chunk boundaries.
pub struct TokenChunker {
    config: ChunkingConfig,
}

impl TokenChunker {
    /// Create a new chunker with the given configuration.
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    /// Split normalized segments into overlapping, token-bounded chunks.
    ///
    /// Segments are packed while the running token total stays within the
    /// target. A single segment larger than the whole target is emitted
    /// alone, never split. When a chunk closes, segments are walked backward
    /// from its tail until the overlap budget is reached (always keeping at
    /// least one), and those seed the next chunk.
    pub fn chunk(&self, segments: &[Segment], title: &str, tokenizer: &dyn Tokenizer) -> Vec<Chunk> {
        if segments.is_empty() {
            return Vec::new();
        }

        let target = self.config.target_tokens;
        let overlap_budget = self.config.overlap_budget();

        let mut chunks = Vec::new();
        let mut seq: i32 = 0;

        // Indices into `segments` forming the chunk under construction.
        let mut current: Vec<usize> = Vec::new();
        let mut current_tokens = 0usize;

        let mut i = 0;
        while i < segments.len() {
            let segment_tokens = tokenizer.count_tokens(&segments[i].text);

            // A segment that alone exceeds the target becomes its own chunk.
            if segment_tokens > target && current.is_empty() {
                chunks.push(build_chunk(segments, &[i], title, seq));
                seq += 1;
                i += 1;
                continue;
            }

            if current_tokens + segment_tokens > target && !current.is_empty() {
                chunks.push(build_chunk(segments, &current, title, seq));
                seq += 1;

                // Walk backward through the closed chunk, carrying trailing
                // segments until the overlap budget is spent. At least one
                // trailing segment is always carried.
                let mut carried: Vec<usize> = Vec::new();
                let mut carried_tokens = 0usize;
                for &idx in current.iter().rev() {
                    let tokens = tokenizer.count_tokens(&segments[idx].text);
                    if carried_tokens + tokens <= overlap_budget {
                        carried.insert(0, idx);
                        carried_tokens += tokens;
                    } else {
                        if carried.is_empty() {
                            carried.insert(0, idx);
                            carried_tokens += tokens;
                        }
                        break;
                    }
                }

                current = carried;
                current_tokens = carried_tokens;
            }

            current.push(i);
            current_tokens += segment_tokens;
            i += 1;
        }

        if !current.is_empty() {
            chunks.push(build_chunk(segments, &current, title, seq));
        }

        debug!("Chunked {} segments into {} chunks", segments.len(), chunks.len());
        chunks
    }
}

/// Close a chunk over the given segment indices.
fn build_chunk(segments: &[Segment], indices: &[usize], title: &str, seq: i32) -> Chunk {
    let joined = indices
        .iter()
        .map(|&i| segments[i].text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    Chunk {
        text: format!("{} | {}", title, joined),
        start_time: segments[indices[0]].start_time,
        end_time: segments[indices[indices.len() - 1]].end_time,
        seq,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed-rate tokenizer: two tokens per whitespace word.
    struct TwoPerWord;

    impl Tokenizer for TwoPerWord {
        fn count_tokens(&self, text: &str) -> usize {
            text.split_whitespace().count() * 2
        }
    }

    fn seg(text: &str, start: f64, end: f64) -> Segment {
        Segment::new(text.to_string(), start, end)
    }

    fn one_word_segments(n: usize) -> Vec<Segment> {
        (0..n)
            .map(|i| seg(&format!("w{}", i), i as f64, (i + 1) as f64))
            .collect()
    }

    #[test]
    fn test_overlap_carries_tail_into_next_chunk() {
        // target=10, overlap 0.2 -> budget 2; each segment is 2 tokens, so
        // five segments fill a chunk and exactly one trails into the next.
        let config = ChunkingConfig {
            target_tokens: 10,
            overlap_pct: 0.2,
        };
        let chunker = TokenChunker::new(config);
        let segments = one_word_segments(6);

        let chunks = chunker.chunk(&segments, "Video", &TwoPerWord);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "Video | w0 w1 w2 w3 w4");
        assert_eq!(chunks[0].start_time, 0.0);
        assert_eq!(chunks[0].end_time, 5.0);
        assert_eq!(chunks[0].seq, 0);
        // The carried segment reappears at the head of the next chunk.
        assert_eq!(chunks[1].text, "Video | w4 w5");
        assert_eq!(chunks[1].start_time, 4.0);
        assert_eq!(chunks[1].end_time, 6.0);
        assert_eq!(chunks[1].seq, 1);
    }

    #[test]
    fn test_oversized_segment_emitted_alone() {
        let config = ChunkingConfig {
            target_tokens: 10,
            overlap_pct: 0.2,
        };
        let chunker = TokenChunker::new(config);

        // 25 words -> 50 tokens with the stub tokenizer. First in the input,
        // so the chunk under construction is empty when it arrives.
        let big = (0..25).map(|i| format!("x{}", i)).collect::<Vec<_>>().join(" ");
        let segments = vec![seg(&big, 0.0, 2.0), seg("a", 2.0, 3.0), seg("b", 3.0, 4.0)];

        let chunks = chunker.chunk(&segments, "T", &TwoPerWord);

        // The oversized segment stands alone and seq stays contiguous.
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].text.starts_with("T | x0"));
        assert!(!chunks[0].text.contains(" a"));
        assert_eq!(chunks[1].text, "T | a b");
        let seqs: Vec<i32> = chunks.iter().map(|c| c.seq).collect();
        assert_eq!(seqs, [0, 1]);
    }

    #[test]
    fn test_oversized_segment_only_input() {
        let config = ChunkingConfig {
            target_tokens: 10,
            overlap_pct: 0.2,
        };
        let chunker = TokenChunker::new(config);
        let big = (0..25).map(|i| format!("x{}", i)).collect::<Vec<_>>().join(" ");

        let chunks = chunker.chunk(&[seg(&big, 0.0, 9.0)], "T", &TwoPerWord);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].seq, 0);
        assert_eq!(chunks[0].end_time, 9.0);
    }

    #[test]
    fn test_short_input_yields_single_chunk() {
        let chunker = TokenChunker::new(ChunkingConfig::default());
        let chunks = chunker.chunk(&one_word_segments(3), "Video", &TwoPerWord);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Video | w0 w1 w2");
    }

    #[test]
    fn test_deterministic_boundaries() {
        let config = ChunkingConfig {
            target_tokens: 10,
            overlap_pct: 0.2,
        };
        let segments = one_word_segments(20);

        let a = TokenChunker::new(config.clone()).chunk(&segments, "V", &TwoPerWord);
        let b = TokenChunker::new(config).chunk(&segments, "V", &TwoPerWord);

        assert_eq!(a.len(), b.len());
        for (left, right) in a.iter().zip(&b) {
            assert_eq!(left.text, right.text);
            assert_eq!(left.start_time, right.start_time);
            assert_eq!(left.end_time, right.end_time);
            assert_eq!(left.seq, right.seq);
        }
    }

    #[test]
    fn test_empty_input() {
        let chunker = TokenChunker::new(ChunkingConfig::default());
        assert!(chunker.chunk(&[], "Video", &WordTokenizer).is_empty());
    }

    #[test]
    fn test_overlap_budget_rounds_down() {
        let config = ChunkingConfig {
            target_tokens: 10,
            overlap_pct: 0.15,
        };
        assert_eq!(config.overlap_budget(), 1);
    }
}
