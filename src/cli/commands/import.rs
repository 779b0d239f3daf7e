//! Import command - index a video from a speech-to-text result file.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::transcript::SttResult;
use anyhow::Result;

/// Run the import command.
pub async fn run_import(video_id: &str, file: &str, settings: Settings) -> Result<()> {
    preflight::check(Operation::Import)?;

    let content = std::fs::read_to_string(file)?;
    let stt: SttResult = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Could not parse {} as a speech-to-text result: {}", file, e))?;

    if stt.words.is_empty() && stt.text.trim().is_empty() {
        Output::error("The transcript file contains no text.");
        return Err(anyhow::anyhow!("empty transcript"));
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner(&format!("Importing transcript for {}...", video_id));
    let result = orchestrator.import_transcript(video_id, &stt).await;
    spinner.finish_and_clear();

    match result {
        Ok(result) => {
            Output::success(&format!(
                "Imported '{}' ({} chunks)",
                result.title, result.chunks_indexed
            ));
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to import transcript: {}", e));
            Err(e.into())
        }
    }
}
