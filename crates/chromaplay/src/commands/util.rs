//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use chromaplay_core::{ApiClient, ClientOptions, ConnectionUpdate};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Build a client and probe the server, failing on an unreachable or
/// rejecting server.
pub async fn connect(
    options: ClientOptions,
    update: ConnectionUpdate,
    profile_name: &str,
) -> Result<ApiClient, CliError> {
    let url = options.url.to_string();
    let client = ApiClient::new(options)?;
    let result = client.connect(update).await;
    if !result.success {
        return Err(CliError::from_connect(&result, &url, profile_name));
    }
    Ok(client)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, refuses instead of blocking.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON in {}: {e}", path.display()),
    })
}

/// Spinner on stderr while a request is in flight. Hidden unless stderr is
/// a terminal and the output is meant for humans.
pub fn spinner(global: &GlobalOpts, message: &str) -> ProgressBar {
    if global.quiet || global.format() != OutputFormat::Table || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn yes_flag_skips_the_prompt() {
        assert!(confirm("Really?", "reset", true).unwrap());
    }

    #[test]
    fn read_json_file_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, "{ nope").unwrap();

        let err = read_json_file(&path).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref reason, .. } if reason.contains("params.json")));

        std::fs::write(&path, r#"{"name":"docs"}"#).unwrap();
        assert_eq!(read_json_file(&path).unwrap()["name"], "docs");
    }
}
