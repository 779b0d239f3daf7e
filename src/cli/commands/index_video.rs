//! Index-video command - index or re-index a single video.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{IndexOutcome, Orchestrator};
use anyhow::Result;

/// Run the index-video command.
pub async fn run_index_video(video_id: &str, force: bool, settings: Settings) -> Result<()> {
    preflight::check(Operation::Index)?;

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner(&format!("Indexing {}...", video_id));
    let result = orchestrator.index_video(video_id, force).await;
    spinner.finish_and_clear();

    match result {
        Ok(result) => {
            match result.outcome {
                IndexOutcome::Indexed => {
                    Output::success(&format!(
                        "Indexed '{}' ({} chunks)",
                        result.title, result.chunks_indexed
                    ));
                }
                IndexOutcome::AlreadyIndexed => {
                    Output::warning("Video is already indexed. Use --force to re-index.");
                }
                IndexOutcome::MissingCaptions => {
                    Output::warning(&format!(
                        "'{}' has no captions. Index it with 'kanal import' \
                         from a speech-to-text result.",
                        result.title
                    ));
                }
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to index video: {}", e));
            Err(e.into())
        }
    }
}
