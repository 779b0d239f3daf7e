//! Sentence grouping for word-level speech-to-text output.

use super::Segment;
use serde::{Deserialize, Serialize};

/// A single word with timing from a speech-to-text provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttWord {
    /// The word text.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
}

/// A speech-to-text result: full text plus optional word-level timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttResult {
    /// Full transcript text.
    #[serde(default)]
    pub text: String,
    /// Word-level timestamps, when the provider supplies them.
    #[serde(default)]
    pub words: Vec<SttWord>,
}

/// Group word-level timestamps into sentence segments.
///
/// Words accumulate until one ends in `.`, `!`, or `?`; a trailing partial
/// sentence is flushed with the last word's end time. Without word-level
/// data the full text becomes one segment with a `0-0` time range (repaired
/// later by the normalizer).
pub fn segments_from_words(result: &SttResult) -> Vec<Segment> {
    if result.words.is_empty() {
        let text = result.text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        return vec![Segment::new(text.to_string(), 0.0, 0.0)];
    }

    let mut segments = Vec::new();
    let mut sentence_words: Vec<&str> = Vec::new();
    let mut sentence_start: Option<f64> = None;

    for word in &result.words {
        if sentence_start.is_none() {
            sentence_start = Some(word.start);
        }
        sentence_words.push(word.text.as_str());

        if word.text.ends_with(['.', '!', '?']) {
            let text = sentence_words.join(" ").trim().to_string();
            if !text.is_empty() {
                segments.push(Segment::new(text, sentence_start.unwrap_or(0.0), word.end));
            }
            sentence_words.clear();
            sentence_start = None;
        }
    }

    // Flush the incomplete sentence at the end, if any.
    if !sentence_words.is_empty() {
        let text = sentence_words.join(" ").trim().to_string();
        if !text.is_empty() {
            let end = result.words.last().map(|w| w.end).unwrap_or(0.0);
            segments.push(Segment::new(text, sentence_start.unwrap_or(0.0), end));
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, start: f64, end: f64) -> SttWord {
        SttWord {
            text: text.to_string(),
            start,
            end,
        }
    }

    #[test]
    fn test_sentences_split_on_terminal_punctuation() {
        let result = SttResult {
            text: String::new(),
            words: vec![
                word("Hello", 0.0, 0.5),
                word("there.", 0.5, 1.0),
                word("How", 1.2, 1.5),
                word("are", 1.5, 1.8),
                word("you?", 1.8, 2.2),
            ],
        };

        let segments = segments_from_words(&result);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Hello there.");
        assert_eq!(segments[0].start_time, 0.0);
        assert_eq!(segments[0].end_time, 1.0);
        assert_eq!(segments[1].text, "How are you?");
        assert_eq!(segments[1].start_time, 1.2);
        assert_eq!(segments[1].end_time, 2.2);
    }

    #[test]
    fn test_trailing_partial_sentence_flushed() {
        let result = SttResult {
            text: String::new(),
            words: vec![
                word("Done.", 0.0, 0.5),
                word("and", 0.6, 0.8),
                word("then", 0.8, 1.1),
            ],
        };

        let segments = segments_from_words(&result);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].text, "and then");
        assert_eq!(segments[1].end_time, 1.1);
    }

    #[test]
    fn test_no_words_falls_back_to_full_text() {
        let result = SttResult {
            text: "  just a blob of text  ".to_string(),
            words: Vec::new(),
        };

        let segments = segments_from_words(&result);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "just a blob of text");
        assert_eq!(segments[0].start_time, 0.0);
        assert_eq!(segments[0].end_time, 0.0);
    }

    #[test]
    fn test_empty_result() {
        let result = SttResult {
            text: String::new(),
            words: Vec::new(),
        };
        assert!(segments_from_words(&result).is_empty());
    }
}
