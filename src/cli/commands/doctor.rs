//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Kanal Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    // Check external tools
    println!("{}", style("External Tools").bold());
    let tool_check = check_ytdlp();
    tool_check.print();
    checks.push(tool_check);

    println!();

    // Check API keys
    println!("{}", style("API Configuration").bold());
    let api_check = check_openai_api_key();
    api_check.print();
    checks.push(api_check);

    println!();

    // Check directories and database
    println!("{}", style("Storage").bold());
    let storage_checks = check_storage(settings);
    for check in &storage_checks {
        check.print();
    }
    checks.extend(storage_checks);

    println!();

    // Check configuration
    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Kanal.",
            errors
        ));
    } else if warnings > 0 {
        Output::warning(&format!("{} warning(s) found. Kanal may not work fully.", warnings));
    } else {
        Output::success("All checks passed!");
    }

    Ok(())
}

fn check_ytdlp() -> CheckResult {
    match Command::new("yt-dlp").arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            CheckResult::ok("yt-dlp", &version)
        }
        Ok(_) => CheckResult::error(
            "yt-dlp",
            "installed but not working",
            "Try reinstalling: pip install -U yt-dlp",
        ),
        Err(_) => CheckResult::error(
            "yt-dlp",
            "not found",
            "Install with: pip install yt-dlp (or brew install yt-dlp)",
        ),
    }
}

fn check_openai_api_key() -> CheckResult {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => CheckResult::ok("OPENAI_API_KEY", "configured"),
        _ => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set it with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

fn check_storage(settings: &Settings) -> Vec<CheckResult> {
    let mut checks = Vec::new();

    let data_dir = settings.data_dir();
    if data_dir.exists() {
        checks.push(CheckResult::ok(
            "data directory",
            &data_dir.display().to_string(),
        ));
    } else {
        checks.push(CheckResult::warning(
            "data directory",
            "does not exist yet",
            "Run 'kanal init' or it will be created on first use",
        ));
    }

    let db_path = settings.sqlite_path();
    if db_path.exists() {
        checks.push(CheckResult::ok("database", &db_path.display().to_string()));
    } else {
        checks.push(CheckResult::warning(
            "database",
            "not created yet",
            "It will be created when you index your first channel",
        ));
    }

    checks
}

fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("config file", &config_path.display().to_string())
    } else {
        CheckResult::warning(
            "config file",
            "using defaults (no file)",
            "Run 'kanal init' or 'kanal config edit' to create one",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_constructors() {
        let ok = CheckResult::ok("thing", "fine");
        assert_eq!(ok.status, CheckStatus::Ok);
        assert!(ok.hint.is_none());

        let warn = CheckResult::warning("thing", "meh", "do this");
        assert_eq!(warn.status, CheckStatus::Warning);
        assert_eq!(warn.hint.as_deref(), Some("do this"));

        let err = CheckResult::error("thing", "bad", "fix it");
        assert_eq!(err.status, CheckStatus::Error);
    }
}
