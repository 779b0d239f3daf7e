//! Add command - index every video of a channel.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the add command.
pub async fn run_add(url: &str, force: bool, settings: Settings) -> Result<()> {
    preflight::check(Operation::Index)?;

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Fetching channel information...");
    let report = orchestrator
        .add_channel(url, force, |current, total, video_id| {
            spinner.set_message(format!("[{}/{}] Indexing {}...", current, total, video_id));
        })
        .await;
    spinner.finish_and_clear();

    match report {
        Ok(report) => {
            Output::success(&format!(
                "Channel '{}' indexed ({} videos found)",
                report.channel_name, report.total
            ));
            Output::kv("Indexed", &report.indexed.to_string());
            Output::kv("Skipped (already indexed)", &report.skipped.to_string());
            Output::kv("No captions", &report.missing_captions.to_string());
            Output::kv("Failed", &report.failed.to_string());

            if report.missing_captions > 0 {
                println!();
                Output::info(
                    "Videos without captions can be indexed with 'kanal import' \
                     from a speech-to-text result.",
                );
            }

            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to index channel: {}", e));
            Err(e.into())
        }
    }
}
