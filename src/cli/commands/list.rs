//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::search::format_timestamp;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(verbose: bool, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let store = orchestrator.vector_store();

    let channels = store.list_channels().await?;

    if channels.is_empty() {
        Output::info("No channels indexed yet. Use 'kanal add <url>' to add one.");
        return Ok(());
    }

    Output::header(&format!("Indexed Channels ({})", channels.len()));
    println!();

    for channel in &channels {
        let videos = store.list_videos(Some(&channel.id)).await?;
        Output::channel_info(&channel.name, &channel.id, videos.len());

        if verbose {
            for video in &videos {
                let duration = if video.duration_seconds > 0 {
                    format_timestamp(f64::from(video.duration_seconds))
                } else {
                    "N/A".to_string()
                };
                Output::video_info(&video.title, &video.id, &duration, &video.transcript_source);
            }
        }
    }

    let stats = store.stats().await?;
    println!();
    Output::kv("Total videos", &stats.videos.to_string());
    Output::kv("Total chunks", &stats.chunks.to_string());

    Ok(())
}
