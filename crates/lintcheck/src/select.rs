//! # File Selector
//!
//! Decides which files to lint for the triggering event: the pull request's
//! changed files, the push commit's changed files, or the default target when
//! no usable file list can be obtained.

use tracing::debug;

use crate::degrade::attempt_or;
use crate::event::Trigger;
use crate::github::{ChangeStatus, ChangedFile, ChecksClient};

/// Path extensions eligible for linting
pub const LINTABLE_EXTENSIONS: [&str; 2] = [".ts", ".js"];

/// Ambient type-declaration files are never linted
pub const DECLARATION_SUFFIX: &str = ".d.ts";

/// Outcome of file selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Lint exactly these paths
    Files(Vec<String>),
    /// No usable file list; lint the configured default target
    DefaultTarget,
}

/// A selection plus the commit the findings belong to
///
/// For pull requests the host reports the PR's most recent commit, which is
/// the sha the check run should attach to (the triggering sha is the
/// synthetic merge commit). Absent when the query failed or the trigger was
/// a push, where the triggering sha already is the commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected {
    /// The files to lint
    pub selection: Selection,
    /// PR head commit oid, when the pull-request query succeeded
    pub head_sha: Option<String>,
}

/// Selects candidate files from the host's changed-file metadata
pub struct FileSelector<'a> {
    client: &'a ChecksClient,
}

impl<'a> FileSelector<'a> {
    /// Create a selector backed by the given client
    pub fn new(client: &'a ChecksClient) -> Self {
        Self { client }
    }

    /// Produce the file selection for a trigger event
    ///
    /// Metadata-retrieval failures degrade to [`Selection::DefaultTarget`];
    /// they are never propagated.
    pub async fn select(&self, trigger: &Trigger) -> Selected {
        match trigger {
            Trigger::PullRequest { number } => {
                // Token may lack PR read permission; degrade to a push with
                // no explicit file list.
                let fetched = attempt_or(
                    async {
                        self.client
                            .pull_request_files(*number)
                            .await
                            .map(|(files, head_sha)| {
                                debug!(number, sha = %head_sha, "Selecting from pull request files");
                                Some((files, head_sha))
                            })
                    },
                    None,
                    "Fetching pull request files",
                )
                .await;

                match fetched {
                    Some((files, head_sha)) => Selected {
                        selection: Selection::Files(filter_pull_request(files)),
                        head_sha: Some(head_sha),
                    },
                    None => Selected {
                        selection: Selection::DefaultTarget,
                        head_sha: None,
                    },
                }
            }
            Trigger::Push { head_sha } => {
                let files = attempt_or(
                    async {
                        self.client
                            .commit_files(head_sha)
                            .await
                            .map(Some)
                    },
                    None,
                    "Fetching commit files",
                )
                .await;

                let selection = match files {
                    Some(files) => Selection::Files(filter_push(files)),
                    None => Selection::DefaultTarget,
                };
                Selected {
                    selection,
                    head_sha: None,
                }
            }
        }
    }
}

fn is_lintable(path: &str) -> bool {
    !path.ends_with(DECLARATION_SUFFIX)
        && LINTABLE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Filter pull-request files: extension whitelist minus declaration files
#[must_use]
pub fn filter_pull_request(files: Vec<ChangedFile>) -> Vec<String> {
    files
        .into_iter()
        .filter(|f| is_lintable(&f.path))
        .map(|f| f.path)
        .collect()
}

/// Filter push files: as for pull requests, additionally dropping entries
/// with status `Removed` or `Changed`
///
/// Dropping `Changed` discards most modified-in-place files on this path;
/// the upstream behavior is preserved as-is.
#[must_use]
pub fn filter_push(files: Vec<ChangedFile>) -> Vec<String> {
    files
        .into_iter()
        .filter(|f| !matches!(f.status, ChangeStatus::Removed | ChangeStatus::Changed))
        .filter(|f| is_lintable(&f.path))
        .map(|f| f.path)
        .collect()
}
