//! Transcript processing for Kanal.
//!
//! Turns raw caption files or word-level speech-to-text output into a clean,
//! time-aligned segment stream, ready for chunking.
//!
//! # Pipeline
//!
//! - `subtitle` - parses WebVTT and SRT caption files into raw segments.
//! - `dedup` - collapses the rolling, self-repeating text of auto-generated
//!   captions (WebVTT streams only).
//! - `normalize` - cleans text, repairs degenerate time ranges, and merges
//!   very short segments forward into their neighbors.
//! - `words` - groups word-level speech-to-text output into sentence segments.

mod dedup;
mod normalize;
mod subtitle;
mod words;

pub use dedup::collapse_rolling;
pub use normalize::{normalize_segments, NormalizeConfig};
pub use subtitle::{detect_format, parse_file, parse_srt, parse_vtt, SubtitleFormat};
pub use words::{segments_from_words, SttResult, SttWord};

use serde::{Deserialize, Serialize};

/// A single time-coded span of transcript text.
///
/// Segments are transient: they are produced and consumed within a single
/// parse -> dedup -> normalize -> chunk call chain and never persisted
/// directly. After normalization, `start_time < end_time` holds and `text`
/// is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Transcribed text content.
    pub text: String,
    /// Start time in seconds.
    pub start_time: f64,
    /// End time in seconds.
    pub end_time: f64,
}

impl Segment {
    /// Create a new segment.
    pub fn new(text: String, start_time: f64, end_time: f64) -> Self {
        Self {
            text,
            start_time,
            end_time,
        }
    }

    /// Duration of this segment in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_duration() {
        let segment = Segment::new("hello".to_string(), 1.5, 4.0);
        assert_eq!(segment.duration(), 2.5);
    }
}
