//! YouTube source implementation backed by yt-dlp.

use super::{ChannelInfo, VideoInfo};
use crate::error::{KanalError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};
use url::Url;

/// Subtitle languages tried in order of preference.
const SUBTITLE_LANGS: [&str; 3] = ["en", "en-US", "en-GB"];

/// YouTube metadata and caption source.
pub struct YoutubeSource;

impl YoutubeSource {
    pub fn new() -> Self {
        Self
    }

    /// Fetch channel information from a channel URL.
    #[instrument(skip(self))]
    pub async fn fetch_channel(&self, channel_url: &str) -> Result<ChannelInfo> {
        Url::parse(channel_url)
            .map_err(|e| KanalError::InvalidInput(format!("Invalid channel URL: {}", e)))?;

        // One flat entry is enough to resolve the channel itself.
        let json = run_ytdlp_json(
            &[
                "--dump-single-json",
                "--flat-playlist",
                "--playlist-end",
                "1",
                channel_url,
            ],
            |stderr| KanalError::ChannelNotFound(format!("{}: {}", channel_url, stderr)),
        )
        .await?;

        let id = json["channel_id"]
            .as_str()
            .or_else(|| json["uploader_id"].as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                KanalError::ChannelNotFound(format!("No channel ID for URL: {}", channel_url))
            })?;

        let name = json["channel"]
            .as_str()
            .or_else(|| json["uploader"].as_str())
            .or_else(|| json["title"].as_str())
            .unwrap_or("Unknown Channel")
            .to_string();

        let url = json["channel_url"]
            .as_str()
            .or_else(|| json["uploader_url"].as_str())
            .unwrap_or(channel_url)
            .to_string();

        Ok(ChannelInfo { id, name, url })
    }

    /// List all video IDs of a channel, newest first.
    #[instrument(skip(self))]
    pub async fn list_videos(&self, channel_url: &str) -> Result<Vec<String>> {
        // The videos tab, not the channel landing page.
        let url = if channel_url.contains("/videos") {
            channel_url.to_string()
        } else {
            format!("{}/videos", channel_url.trim_end_matches('/'))
        };

        let output = run_ytdlp(
            &[
                "--dump-json",
                "--flat-playlist",
                "--no-warnings",
                "--ignore-errors",
                &url,
            ],
            |stderr| KanalError::ChannelNotFound(format!("{}: {}", url, stderr)),
        )
        .await?;

        let mut video_ids = Vec::new();
        for line in output.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if let Ok(entry) = serde_json::from_str::<serde_json::Value>(line) {
                if let Some(id) = entry["id"].as_str() {
                    video_ids.push(id.to_string());
                }
            }
        }

        info!("Found {} videos for {}", video_ids.len(), url);
        Ok(video_ids)
    }

    /// Fetch metadata for a single video.
    #[instrument(skip(self))]
    pub async fn fetch_video(&self, video_id: &str) -> Result<VideoInfo> {
        let url = watch_page(video_id);

        let json = run_ytdlp_json(
            &["--dump-json", "--no-download", "--no-warnings", &url],
            |stderr| KanalError::VideoNotFound(format!("{}: {}", video_id, stderr)),
        )
        .await?;

        let published_at = json["upload_date"].as_str().and_then(|date_str| {
            // yt-dlp returns the upload date as YYYYMMDD
            chrono::NaiveDate::parse_from_str(date_str, "%Y%m%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        });

        Ok(VideoInfo {
            id: json["id"].as_str().unwrap_or(video_id).to_string(),
            title: json["title"].as_str().unwrap_or("Unknown Title").to_string(),
            description: json["description"].as_str().map(|s| s.to_string()),
            duration_seconds: json["duration"].as_f64().map(|d| d as u32),
            published_at,
            thumbnail_url: json["thumbnail"].as_str().map(|s| s.to_string()),
            channel_id: json["channel_id"].as_str().map(|s| s.to_string()),
        })
    }

    /// Download captions for a video into `output_dir`.
    ///
    /// Manually written captions win over auto-generated ones. Returns `None`
    /// when the video has no captions in any preferred language - a common
    /// case, not an error.
    #[instrument(skip(self, output_dir))]
    pub async fn download_subtitles(
        &self,
        video_id: &str,
        output_dir: &Path,
    ) -> Result<Option<PathBuf>> {
        std::fs::create_dir_all(output_dir)?;

        let url = watch_page(video_id);
        let template = output_dir.join(format!("{}.%(ext)s", video_id));
        let template = template.to_string_lossy().to_string();
        let langs = SUBTITLE_LANGS.join(",");

        // First pass: manual captions only.
        run_ytdlp(
            &[
                "--skip-download",
                "--write-subs",
                "--sub-langs",
                &langs,
                "--sub-format",
                "vtt/srt/best",
                "--no-warnings",
                "--output",
                &template,
                &url,
            ],
            |stderr| KanalError::SubtitleDownload(format!("{}: {}", video_id, stderr)),
        )
        .await?;

        if let Some(path) = find_subtitle_file(output_dir, video_id) {
            debug!("Found manual captions at {:?}", path);
            return Ok(Some(path));
        }

        // Fall back to auto-generated captions.
        run_ytdlp(
            &[
                "--skip-download",
                "--write-auto-subs",
                "--sub-langs",
                &langs,
                "--sub-format",
                "vtt/srt/best",
                "--no-warnings",
                "--output",
                &template,
                &url,
            ],
            |stderr| KanalError::SubtitleDownload(format!("{}: {}", video_id, stderr)),
        )
        .await?;

        if let Some(path) = find_subtitle_file(output_dir, video_id) {
            debug!("Found auto-generated captions at {:?}", path);
            return Ok(Some(path));
        }

        info!("No captions available for {}", video_id);
        Ok(None)
    }
}

impl Default for YoutubeSource {
    fn default() -> Self {
        Self::new()
    }
}

fn watch_page(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Locate a downloaded caption file, with or without a language-code infix.
fn find_subtitle_file(dir: &Path, video_id: &str) -> Option<PathBuf> {
    for ext in ["vtt", "srt"] {
        for lang in SUBTITLE_LANGS {
            let candidate = dir.join(format!("{}.{}.{}", video_id, lang, ext));
            if candidate.exists() {
                return Some(candidate);
            }
        }
        let candidate = dir.join(format!("{}.{}", video_id, ext));
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

/// Run yt-dlp and return its stdout as a string.
async fn run_ytdlp(
    args: &[&str],
    on_failure: impl FnOnce(&str) -> KanalError,
) -> Result<String> {
    let result = Command::new("yt-dlp")
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(KanalError::ToolNotFound("yt-dlp".into()));
        }
        Err(e) => {
            return Err(KanalError::ToolFailed(format!("yt-dlp execution failed: {e}")));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(on_failure(stderr.trim()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Run yt-dlp and parse its stdout as a single JSON document.
async fn run_ytdlp_json(
    args: &[&str],
    on_failure: impl FnOnce(&str) -> KanalError,
) -> Result<serde_json::Value> {
    let stdout = run_ytdlp(args, on_failure).await?;
    serde_json::from_str(&stdout)
        .map_err(|e| KanalError::Source(format!("Failed to parse yt-dlp output: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_page() {
        assert_eq!(
            watch_page("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_find_subtitle_file_prefers_language_infix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vid1.en.vtt"), "WEBVTT\n").unwrap();
        std::fs::write(dir.path().join("vid1.srt"), "1\n").unwrap();

        let found = find_subtitle_file(dir.path(), "vid1").unwrap();
        assert_eq!(found, dir.path().join("vid1.en.vtt"));
    }

    #[test]
    fn test_find_subtitle_file_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_subtitle_file(dir.path(), "vid1").is_none());
    }
}
