//! # Configuration
//!
//! Everything the run needs, read once at startup from GitHub Actions
//! environment variables (or flags, for local use) and threaded explicitly
//! into the components.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;

/// Check-run name used when none is configured
pub const DEFAULT_CHECK_NAME: &str = "lintcheck";

/// Runtime configuration for a single lint run
#[derive(Debug, Clone, Parser)]
#[command(name = "lintcheck")]
#[command(about = "Runs ESLint over changed files and annotates a GitHub check run")]
#[command(version)]
pub struct Config {
    /// GitHub access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Commit sha that triggered the run
    #[arg(long = "sha", env = "GITHUB_SHA")]
    pub head_sha: String,

    /// Workspace root the repository is checked out into
    #[arg(long, env = "GITHUB_WORKSPACE")]
    pub workspace: PathBuf,

    /// Repository in owner/repo format
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: String,

    /// Name of the triggering workflow event
    #[arg(long, env = "GITHUB_EVENT_NAME", default_value = "push")]
    pub event_name: String,

    /// Path to the workflow event payload JSON
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    /// Reuse an in-progress check run with this name instead of creating one
    #[arg(long, env = "INPUT_CHECK_NAME")]
    pub check_name: Option<String>,

    /// Lint the default target even when a changed-file list is available
    #[arg(long, env = "INPUT_LINT_ALL", value_parser = parse_flag, default_value = "false")]
    pub lint_all: bool,

    /// Path linted when there is no explicit file list
    #[arg(long, env = "INPUT_DEFAULT_TARGET", default_value = ".")]
    pub default_target: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Split `owner/repo` into its parts
    ///
    /// # Errors
    ///
    /// Returns an error if the repository is not in `owner/repo` format.
    pub fn repo_parts(&self) -> Result<(&str, &str)> {
        self.repository
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "Invalid repository '{}' (expected owner/repo)",
                    self.repository
                )
            })
    }

    /// The check-run name to create or reuse
    #[must_use]
    pub fn check_run_name(&self) -> &str {
        self.check_name.as_deref().unwrap_or(DEFAULT_CHECK_NAME)
    }
}

/// Action inputs arrive as strings; accept the usual boolean spellings
fn parse_flag(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(format!("invalid boolean value '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(repository: &str) -> Config {
        Config {
            token: "t".to_string(),
            head_sha: "abc123".to_string(),
            workspace: "/workspace".into(),
            repository: repository.to_string(),
            event_name: "push".to_string(),
            event_path: None,
            check_name: None,
            lint_all: false,
            default_target: ".".to_string(),
            verbose: false,
        }
    }

    #[test]
    fn repo_parts_splits_owner_and_repo() {
        let config = config("5dlabs/lintcheck");
        assert_eq!(config.repo_parts().unwrap(), ("5dlabs", "lintcheck"));
    }

    #[test]
    fn repo_parts_rejects_malformed_values() {
        assert!(config("no-slash").repo_parts().is_err());
        assert!(config("/repo").repo_parts().is_err());
        assert!(config("owner/").repo_parts().is_err());
    }

    #[test]
    fn check_run_name_defaults() {
        let mut config = config("o/r");
        assert_eq!(config.check_run_name(), DEFAULT_CHECK_NAME);
        config.check_name = Some("eslint".to_string());
        assert_eq!(config.check_run_name(), "eslint");
    }

    #[test]
    fn flag_parsing_accepts_boolean_ish_spellings() {
        for truthy in ["true", "TRUE", "1", "yes", "on"] {
            assert!(parse_flag(truthy).unwrap());
        }
        for falsy in ["false", "0", "no", "off", ""] {
            assert!(!parse_flag(falsy).unwrap());
        }
        assert!(parse_flag("maybe").is_err());
    }
}
