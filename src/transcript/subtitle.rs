//! Caption file parsing (WebVTT and SRT).
//!
//! Both grammars are parsed into raw, source-ordered segments. Timestamp
//! handling is strict: a malformed timestamp aborts the whole file, since it
//! signals corruption rather than isolated noise.

use super::{collapse_rolling, Segment};
use crate::error::{KanalError, Result};
use regex::Regex;
use std::path::Path;
use tracing::debug;

/// Supported caption formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    /// WebVTT (`.vtt`), including YouTube's auto-generated rolling captions.
    Vtt,
    /// SubRip (`.srt`).
    Srt,
}

/// Detect the caption format from a file-name suffix and/or content.
///
/// The suffix wins when it is unambiguous. Otherwise the content is sniffed:
/// a leading `WEBVTT` marker, or a numeric sequence line immediately followed
/// by an SRT timestamp.
pub fn detect_format(path: Option<&Path>, content: &str) -> Result<SubtitleFormat> {
    if let Some(path) = path {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("vtt") => return Ok(SubtitleFormat::Vtt),
            Some("srt") => return Ok(SubtitleFormat::Srt),
            _ => {}
        }
    }

    if content.trim_start().starts_with("WEBVTT") {
        return Ok(SubtitleFormat::Vtt);
    }

    let srt_pattern =
        Regex::new(r"(?m)^\d+\s*\r?\n\d{2}:\d{2}:\d{2},\d{3}").expect("valid regex");
    if srt_pattern.is_match(content) {
        return Ok(SubtitleFormat::Srt);
    }

    Err(KanalError::FormatUnrecognized(
        path.map(|p| p.display().to_string())
            .unwrap_or_else(|| "expected WebVTT or SRT content".to_string()),
    ))
}

/// Read a caption file, detect its format, and parse it.
///
/// WebVTT streams additionally go through the rolling-caption deduplicator,
/// since auto-generated captions re-emit previously shown text.
pub fn parse_file(path: &Path) -> Result<Vec<Segment>> {
    let content = std::fs::read_to_string(path)?;

    match detect_format(Some(path), &content)? {
        SubtitleFormat::Vtt => {
            let segments = parse_vtt(&content)?;
            Ok(collapse_rolling(segments))
        }
        SubtitleFormat::Srt => parse_srt(&content),
    }
}

/// Parse WebVTT content into raw segments.
///
/// Grammar: an optional `WEBVTT` header and metadata block (skipped until the
/// first line containing `-->`), then repeating cues: an optional
/// cue-identifier line, a timestamp line `start --> end`, and text lines
/// until a blank line or the next timestamp line.
///
/// Auto-generated captions interleave two kinds of text lines: lines with
/// inline per-word timing markers (`<00:00:01.500>`) carry genuinely new
/// text, while plain lines repeat what an earlier cue already showed. Once a
/// marked line has been collected for a cue, plain lines are skipped.
pub fn parse_vtt(content: &str) -> Result<Vec<Segment>> {
    let timing = Regex::new(r"^([\d:.]+)\s*-->\s*([\d:.]+)").expect("valid regex");
    let word_marker = Regex::new(r"<\d{1,2}:\d{2}:\d{2}\.\d{3}>").expect("valid regex");
    let tag = Regex::new(r"<[^>]+>").expect("valid regex");

    let lines: Vec<&str> = content.lines().collect();
    let mut segments = Vec::new();

    // Skip the header and any metadata before the first timestamp line.
    let mut i = 0;
    while i < lines.len() && !lines[i].contains("-->") {
        i += 1;
    }

    while i < lines.len() {
        let line = lines[i].trim();

        if !line.contains("-->") {
            // Blank separator or cue identifier.
            i += 1;
            continue;
        }

        let caps = timing
            .captures(line)
            .ok_or_else(|| KanalError::TimestampFormat(line.to_string()))?;
        let start_time = parse_vtt_timestamp(&caps[1])?;
        let end_time = parse_vtt_timestamp(&caps[2])?;

        let mut text_lines: Vec<String> = Vec::new();
        let mut saw_marked_line = false;

        i += 1;
        while i < lines.len() {
            let text_line = lines[i];
            if text_line.trim().is_empty() {
                break;
            }
            if text_line.contains("-->") {
                // Next cue starts without a blank separator; leave the line
                // for the outer loop.
                break;
            }

            let marked = word_marker.is_match(text_line);
            if marked || !saw_marked_line {
                let clean = tag.replace_all(text_line, "");
                let clean = clean.trim();
                if !clean.is_empty() {
                    text_lines.push(clean.to_string());
                }
            }
            saw_marked_line = saw_marked_line || marked;
            i += 1;
        }

        let text = text_lines.join(" ").trim().to_string();
        if !text.is_empty() {
            segments.push(Segment::new(text, start_time, end_time));
        }
    }

    debug!("Parsed {} VTT cues", segments.len());
    Ok(segments)
}

/// Parse SRT content into raw segments.
///
/// Grammar: blocks separated by blank lines. Within a block, the first line
/// containing `-->` is the timestamp line; every following line is cue text,
/// joined with spaces. Both `<...>` and `{...}` markup is stripped.
pub fn parse_srt(content: &str) -> Result<Vec<Segment>> {
    let timing = Regex::new(r"^([\d:,]+)\s*-->\s*([\d:,]+)").expect("valid regex");
    let tag = Regex::new(r"<[^>]+>").expect("valid regex");
    let brace = Regex::new(r"\{[^}]+\}").expect("valid regex");

    let mut segments = Vec::new();

    for block in content.trim().split("\n\n") {
        let lines: Vec<&str> = block.trim().lines().collect();
        if lines.len() < 2 {
            continue;
        }

        let Some(timestamp_idx) = lines.iter().position(|l| l.contains("-->")) else {
            continue;
        };

        let timestamp_line = lines[timestamp_idx].trim();
        let caps = timing
            .captures(timestamp_line)
            .ok_or_else(|| KanalError::TimestampFormat(timestamp_line.to_string()))?;
        let start_time = parse_srt_timestamp(&caps[1])?;
        let end_time = parse_srt_timestamp(&caps[2])?;

        let text = lines[timestamp_idx + 1..].join(" ");
        let text = tag.replace_all(&text, "");
        let text = brace.replace_all(&text, "");
        let text = text.trim();

        if !text.is_empty() {
            segments.push(Segment::new(text.to_string(), start_time, end_time));
        }
    }

    debug!("Parsed {} SRT blocks", segments.len());
    Ok(segments)
}

/// Parse a WebVTT timestamp (`H:MM:SS.mmm` or `MM:SS.mmm`) to seconds.
fn parse_vtt_timestamp(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    let parts: Vec<&str> = trimmed.split(':').collect();

    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => ("0", *m, *s),
        _ => return Err(KanalError::TimestampFormat(raw.to_string())),
    };

    let hours: u32 = hours
        .parse()
        .map_err(|_| KanalError::TimestampFormat(raw.to_string()))?;
    let minutes: u32 = minutes
        .parse()
        .map_err(|_| KanalError::TimestampFormat(raw.to_string()))?;
    let seconds: f64 = seconds
        .parse()
        .map_err(|_| KanalError::TimestampFormat(raw.to_string()))?;

    Ok(f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + seconds)
}

/// Parse an SRT timestamp (`H:MM:SS,mmm`, comma decimal separator) to seconds.
fn parse_srt_timestamp(raw: &str) -> Result<f64> {
    let normalized = raw.trim().replace(',', ".");
    let parts: Vec<&str> = normalized.split(':').collect();

    if parts.len() != 3 {
        return Err(KanalError::TimestampFormat(raw.to_string()));
    }

    let hours: u32 = parts[0]
        .parse()
        .map_err(|_| KanalError::TimestampFormat(raw.to_string()))?;
    let minutes: u32 = parts[1]
        .parse()
        .map_err(|_| KanalError::TimestampFormat(raw.to_string()))?;
    let seconds: f64 = parts[2]
        .parse()
        .map_err(|_| KanalError::TimestampFormat(raw.to_string()))?;

    Ok(f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + seconds)
}
