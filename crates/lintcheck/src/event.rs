//! # Trigger Event
//!
//! The event that started the run, as a tagged variant: a pull request with
//! its number, or a push with its commit sha. File selection dispatches on
//! this instead of branching on ambient environment state.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;

/// The CI event that triggered this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// A pull-request event with a valid identifying number
    PullRequest { number: u64 },
    /// A direct push to a branch
    Push { head_sha: String },
}

/// Relevant slice of the workflow event payload
#[derive(Debug, Deserialize)]
struct EventPayload {
    pull_request: Option<PullRequestRef>,
    number: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PullRequestRef {
    number: u64,
}

impl Trigger {
    /// Determine the trigger from the event name and payload file
    ///
    /// Anything that is not a pull-request event with a readable number is
    /// treated as a push of the configured commit sha.
    #[must_use]
    pub fn detect(config: &Config) -> Self {
        let push = Self::Push {
            head_sha: config.head_sha.clone(),
        };

        // Exact match: pull_request_review and friends also carry a PR
        // number but are not lint triggers.
        if !matches!(
            config.event_name.as_str(),
            "pull_request" | "pull_request_target"
        ) {
            return push;
        }

        let Some(event_path) = config.event_path.as_deref() else {
            warn!("Pull request event without a payload path, treating as push");
            return push;
        };

        match pull_request_number(event_path) {
            Some(number) => {
                debug!(number, "Detected pull request trigger");
                Self::PullRequest { number }
            }
            None => {
                warn!(path = %event_path.display(), "No pull request number in event payload, treating as push");
                push
            }
        }
    }
}

fn pull_request_number(event_path: &Path) -> Option<u64> {
    let raw = std::fs::read_to_string(event_path).ok()?;
    let payload: EventPayload = serde_json::from_str(&raw).ok()?;
    payload
        .pull_request
        .map(|pr| pr.number)
        .or(payload.number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config(event_name: &str, event_path: Option<std::path::PathBuf>) -> Config {
        Config {
            token: "t".to_string(),
            head_sha: "abc123".to_string(),
            workspace: "/workspace".into(),
            repository: "5dlabs/lintcheck".to_string(),
            event_name: event_name.to_string(),
            event_path,
            check_name: None,
            lint_all: false,
            default_target: ".".to_string(),
            verbose: false,
        }
    }

    fn payload_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn push_event_uses_configured_sha() {
        let trigger = Trigger::detect(&config("push", None));
        assert_eq!(
            trigger,
            Trigger::Push {
                head_sha: "abc123".to_string()
            }
        );
    }

    #[test]
    fn pull_request_event_reads_number_from_payload() {
        let file = payload_file(r#"{"pull_request": {"number": 42}}"#);
        let trigger = Trigger::detect(&config("pull_request", Some(file.path().into())));
        assert_eq!(trigger, Trigger::PullRequest { number: 42 });
    }

    #[test]
    fn top_level_number_is_a_fallback() {
        let file = payload_file(r#"{"number": 7}"#);
        let trigger = Trigger::detect(&config("pull_request_target", Some(file.path().into())));
        assert_eq!(trigger, Trigger::PullRequest { number: 7 });
    }

    #[test]
    fn pull_request_review_events_are_treated_as_push() {
        let file = payload_file(r#"{"pull_request": {"number": 42}}"#);
        for event in ["pull_request_review", "pull_request_review_comment"] {
            let trigger = Trigger::detect(&config(event, Some(file.path().into())));
            assert!(matches!(trigger, Trigger::Push { .. }));
        }
    }

    #[test]
    fn payload_without_number_degrades_to_push() {
        let file = payload_file(r#"{"action": "opened"}"#);
        let trigger = Trigger::detect(&config("pull_request", Some(file.path().into())));
        assert!(matches!(trigger, Trigger::Push { .. }));
    }

    #[test]
    fn unreadable_payload_degrades_to_push() {
        let trigger = Trigger::detect(&config(
            "pull_request",
            Some("/nonexistent/event.json".into()),
        ));
        assert!(matches!(trigger, Trigger::Push { .. }));
    }
}
