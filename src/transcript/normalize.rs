//! Transcript normalization.
//!
//! Cleans segment text, repairs degenerate time ranges, and merges very
//! short segments forward into their neighbors.

use super::Segment;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters for normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Segments shorter than this (in seconds) are merged into the next
    /// segment when close enough. Zero disables merging.
    pub min_duration: f64,
    /// Maximum gap (in seconds) to the next segment for a short segment to
    /// still be merged into it.
    pub merge_threshold: f64,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            min_duration: 0.5,
            merge_threshold: 1.0,
        }
    }
}

/// Normalize a raw segment stream.
///
/// - Collapses internal whitespace runs to single spaces and trims; segments
///   left empty are dropped.
/// - Repairs time ranges: inverted ranges are swapped, zero-length ranges get
///   a 0.1 s floor so no zero-length chunk can appear downstream.
/// - Merges short segments forward per [`NormalizeConfig`]. Merging cascades:
///   a freshly merged segment that is still short keeps absorbing. The final
///   accumulated segment is always emitted, even if still short.
///
/// Order is preserved; merging never reorders.
pub fn normalize_segments(segments: Vec<Segment>, config: &NormalizeConfig) -> Vec<Segment> {
    let whitespace = Regex::new(r"\s+").expect("valid regex");

    let mut cleaned = Vec::with_capacity(segments.len());
    for segment in segments {
        let text = whitespace.replace_all(segment.text.trim(), " ").to_string();
        if text.is_empty() {
            continue;
        }

        let mut start_time = segment.start_time;
        let mut end_time = segment.end_time;
        if start_time > end_time {
            std::mem::swap(&mut start_time, &mut end_time);
        } else if start_time == end_time {
            end_time = start_time + 0.1;
        }

        cleaned.push(Segment::new(text, start_time, end_time));
    }

    if config.min_duration > 0.0 {
        cleaned = merge_short_segments(cleaned, config);
    }

    debug!("Normalized to {} segments", cleaned.len());
    cleaned
}

/// Merge segments shorter than `min_duration` into the following segment,
/// provided the gap between them is within `merge_threshold`.
fn merge_short_segments(segments: Vec<Segment>, config: &NormalizeConfig) -> Vec<Segment> {
    let mut iter = segments.into_iter();
    let Some(mut current) = iter.next() else {
        return Vec::new();
    };

    let mut merged = Vec::new();
    for next in iter {
        let gap = next.start_time - current.end_time;

        if current.duration() < config.min_duration && gap <= config.merge_threshold {
            current.text.push(' ');
            current.text.push_str(&next.text);
            current.end_time = next.end_time;
        } else {
            merged.push(std::mem::replace(&mut current, next));
        }
    }
    merged.push(current);

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str, start: f64, end: f64) -> Segment {
        Segment::new(text.to_string(), start, end)
    }

    #[test]
    fn test_zero_length_range_gets_floor() {
        let out = normalize_segments(vec![seg("a", 5.0, 5.0)], &NormalizeConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].start_time, 5.0);
        assert_eq!(out[0].end_time, 5.1);
    }

    #[test]
    fn test_inverted_range_swapped() {
        let out = normalize_segments(vec![seg("a", 10.0, 3.0)], &NormalizeConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].start_time, 3.0);
        assert_eq!(out[0].end_time, 10.0);
    }

    #[test]
    fn test_whitespace_collapsed_and_empties_dropped() {
        let out = normalize_segments(
            vec![seg("  a \t b\n c ", 0.0, 1.0), seg("   ", 1.0, 2.0)],
            &NormalizeConfig::default(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "a b c");
    }

    #[test]
    fn test_short_segment_merges_forward() {
        let out = normalize_segments(
            vec![seg("a", 0.0, 0.2), seg("b", 0.3, 5.0)],
            &NormalizeConfig::default(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "a b");
        assert_eq!(out[0].start_time, 0.0);
        assert_eq!(out[0].end_time, 5.0);
    }

    #[test]
    fn test_merge_cascades() {
        // a+b is still short after the first merge and keeps absorbing.
        let out = normalize_segments(
            vec![
                seg("a", 0.0, 0.1),
                seg("b", 0.1, 0.2),
                seg("c", 0.2, 5.0),
            ],
            &NormalizeConfig::default(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "a b c");
        assert_eq!(out[0].end_time, 5.0);
    }

    #[test]
    fn test_wide_gap_blocks_merge() {
        let out = normalize_segments(
            vec![seg("a", 0.0, 0.2), seg("b", 2.0, 5.0)],
            &NormalizeConfig::default(),
        );
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_trailing_short_segment_kept() {
        let out = normalize_segments(
            vec![seg("a", 0.0, 5.0), seg("b", 5.0, 5.2)],
            &NormalizeConfig::default(),
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].text, "b");
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize_segments(Vec::new(), &NormalizeConfig::default()).is_empty());
    }
}
