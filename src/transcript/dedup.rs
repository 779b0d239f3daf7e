//! Rolling-caption deduplication.
//!
//! Auto-generated live captions scroll: each cue re-emits previously shown
//! text plus a few new trailing words. This pass collapses that stream into
//! discrete new-text segments.

use super::Segment;
use tracing::debug;

/// Collapse scrolling/duplicate captions into discrete new-text segments.
///
/// Single stateful pass over the input, O(total text length). For each
/// segment, the previous segment's *original* text is stripped from the
/// front (or, failing that, everything up to and including its first
/// occurrence is dropped); only a non-empty remainder is emitted, keeping the
/// segment's original time range. Ordering is preserved and the output may be
/// shorter than the input.
///
/// Re-running this pass on its own output is a no-op.
pub fn collapse_rolling(segments: Vec<Segment>) -> Vec<Segment> {
    let mut output = Vec::with_capacity(segments.len());
    let mut prev_text = String::new();

    for segment in segments {
        let remainder = if let Some(stripped) = segment.text.strip_prefix(&prev_text) {
            stripped.trim().to_string()
        } else if let Some(pos) = segment.text.find(&prev_text) {
            segment.text[pos + prev_text.len()..].trim().to_string()
        } else {
            segment.text.clone()
        };

        if !remainder.is_empty() {
            output.push(Segment::new(remainder, segment.start_time, segment.end_time));
        }

        // Advance on the original, unstripped text even when nothing was
        // emitted, so the next cue is compared against what was shown.
        prev_text = segment.text;
    }

    debug!("Collapsed rolling captions: {} segments out", output.len());
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str, start: f64, end: f64) -> Segment {
        Segment::new(text.to_string(), start, end)
    }

    #[test]
    fn test_collapse_rolling_prefix_growth() {
        let segments = vec![
            seg("hello", 0.0, 1.0),
            seg("hello world", 1.0, 2.0),
            seg("hello world today", 2.0, 3.0),
        ];

        let collapsed = collapse_rolling(segments);
        let texts: Vec<&str> = collapsed.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["hello", "world", "today"]);
        assert_eq!(collapsed[1].start_time, 1.0);
        assert_eq!(collapsed[1].end_time, 2.0);
    }

    #[test]
    fn test_collapse_rolling_idempotent() {
        let segments = vec![
            seg("hello", 0.0, 1.0),
            seg("hello world", 1.0, 2.0),
            seg("hello world today", 2.0, 3.0),
        ];

        let once = collapse_rolling(segments);
        let twice = collapse_rolling(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_collapse_rolling_contains_anywhere() {
        // Previous text reappears mid-cue; keep only what follows it.
        let segments = vec![
            seg("world", 0.0, 1.0),
            seg("hello world again", 1.0, 2.0),
        ];

        let collapsed = collapse_rolling(segments);
        let texts: Vec<&str> = collapsed.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["world", "again"]);
    }

    #[test]
    fn test_collapse_rolling_unrelated_text_passes_through() {
        let segments = vec![
            seg("first thing", 0.0, 1.0),
            seg("completely different", 1.0, 2.0),
        ];

        let collapsed = collapse_rolling(segments);
        assert_eq!(collapsed.len(), 2);
        assert_eq!(collapsed[1].text, "completely different");
    }

    #[test]
    fn test_collapse_rolling_exact_repeat_dropped() {
        let segments = vec![
            seg("same line", 0.0, 1.0),
            seg("same line", 1.0, 2.0),
            seg("same line plus", 2.0, 3.0),
        ];

        let collapsed = collapse_rolling(segments);
        let texts: Vec<&str> = collapsed.iter().map(|s| s.text.as_str()).collect();
        // The exact repeat is dropped, but prev_text still advances past it.
        assert_eq!(texts, ["same line", "plus"]);
    }

    #[test]
    fn test_collapse_rolling_empty_input() {
        assert!(collapse_rolling(Vec::new()).is_empty());
    }
}
