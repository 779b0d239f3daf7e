//! Search result ranking and display formatting.
//!
//! The nearest-neighbor lookup itself is the vector store's job; this module
//! post-processes its candidates: derives similarity scores, strips internal
//! text markers, formats timestamps, builds watch links, and sorts.

use crate::vector_store::Candidate;
use serde::Serialize;

/// A ranked, display-ready search result. Built fresh per query and never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// Chunk text with title markers stripped.
    pub text: String,
    /// Video ID.
    pub video_id: String,
    /// Video title.
    pub video_title: String,
    /// Channel name.
    pub channel_name: String,
    /// Start time in seconds.
    pub start_time: f64,
    /// End time in seconds.
    pub end_time: f64,
    /// Start time formatted for display.
    pub timestamp: String,
    /// Watch URL jumping to the start time.
    pub url: String,
    /// Similarity score in [0, 1]; higher is better.
    pub score: f32,
}

/// Rank candidates into display-ready results, best first.
///
/// Read-only: candidates are consumed, nothing in the store is touched.
pub fn rank(candidates: Vec<Candidate>) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = candidates
        .into_iter()
        .map(|candidate| {
            let score = candidate.relevance.score();
            let text = display_text(&candidate.text, &candidate.video_title);

            SearchResult {
                text,
                timestamp: format_timestamp(candidate.start_time),
                url: watch_url(&candidate.video_id, candidate.start_time),
                video_id: candidate.video_id,
                video_title: candidate.video_title,
                channel_name: candidate.channel_name,
                start_time: candidate.start_time,
                end_time: candidate.end_time,
                score,
            }
        })
        .collect();

    // Stable sort keeps the store's order for equal scores.
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    results
}

/// Strip internal title markers from stored chunk text.
///
/// Older rows carry a `"{title}: "` prefix; chunker-produced rows carry
/// `"{title} | "`. Either way the title is display chrome, not content.
fn display_text(stored: &str, video_title: &str) -> String {
    let title_prefix = format!("{}: ", video_title);
    if let Some(stripped) = stored.strip_prefix(&title_prefix) {
        return stripped.to_string();
    }

    if let Some(pos) = stored.find('|') {
        return stored[pos + 1..].trim().to_string();
    }

    stored.to_string()
}

/// Format seconds for display: `H:MM:SS` from one hour up, else `M:SS`.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Canonical watch URL with an integer-rounded start-time parameter.
pub fn watch_url(video_id: &str, start_time: f64) -> String {
    format!(
        "https://youtube.com/watch?v={}&t={}",
        video_id,
        start_time.round() as i64
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::Relevance;
    use uuid::Uuid;

    fn candidate(relevance: Relevance, text: &str, title: &str) -> Candidate {
        Candidate {
            chunk_id: Uuid::new_v4(),
            relevance,
            text: text.to_string(),
            start_time: 65.0,
            end_time: 90.0,
            video_id: "vid123".to_string(),
            video_title: title.to_string(),
            channel_id: "UC1".to_string(),
            channel_name: "Channel".to_string(),
        }
    }

    #[test]
    fn test_rank_orders_by_derived_score() {
        let candidates = vec![
            candidate(Relevance::Distance(0.1), "a", "T"),
            candidate(Relevance::Distance(0.4), "b", "T"),
            candidate(Relevance::Distance(0.05), "c", "T"),
        ];

        let results = rank(candidates);
        let scores: Vec<f32> = results.iter().map(|r| r.score).collect();
        assert!((scores[0] - 0.95).abs() < 1e-6);
        assert!((scores[1] - 0.9).abs() < 1e-6);
        assert!((scores[2] - 0.6).abs() < 1e-6);
        assert_eq!(results[0].text, "c");
    }

    #[test]
    fn test_similarity_scores_pass_through() {
        let results = rank(vec![candidate(Relevance::Score(0.42), "a", "T")]);
        assert_eq!(results[0].score, 0.42);
    }

    #[test]
    fn test_distance_score_clamped() {
        assert_eq!(Relevance::Distance(1.7).score(), 0.0);
        assert_eq!(Relevance::Distance(-0.5).score(), 1.0);
    }

    #[test]
    fn test_title_pipe_prefix_stripped() {
        let results = rank(vec![candidate(
            Relevance::Score(1.0),
            "My Video | actual content",
            "My Video",
        )]);
        assert_eq!(results[0].text, "actual content");
    }

    #[test]
    fn test_title_colon_prefix_stripped() {
        let results = rank(vec![candidate(
            Relevance::Score(1.0),
            "My Video: actual content",
            "My Video",
        )]);
        assert_eq!(results[0].text, "actual content");
    }

    #[test]
    fn test_unmarked_text_untouched() {
        let results = rank(vec![candidate(Relevance::Score(1.0), "plain text", "T")]);
        assert_eq!(results[0].text, "plain text");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(65.0), "1:05");
        assert_eq!(format_timestamp(3661.0), "1:01:01");
        assert_eq!(format_timestamp(0.0), "0:00");
        assert_eq!(format_timestamp(3600.0), "1:00:00");
    }

    #[test]
    fn test_watch_url_rounds_start_time() {
        assert_eq!(
            watch_url("vid123", 65.6),
            "https://youtube.com/watch?v=vid123&t=66"
        );
    }

    #[test]
    fn test_rank_empty_input() {
        assert!(rank(Vec::new()).is_empty());
    }

    #[test]
    fn test_result_timestamp_and_url() {
        let results = rank(vec![candidate(Relevance::Score(0.9), "a", "T")]);
        assert_eq!(results[0].timestamp, "1:05");
        assert_eq!(results[0].url, "https://youtube.com/watch?v=vid123&t=65");
    }
}
