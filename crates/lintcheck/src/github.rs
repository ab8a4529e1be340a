//! # GitHub Checks API Client
//!
//! The network surface of the tool: changed-file metadata (GraphQL for pull
//! requests, REST for single commits) and the check-run lifecycle
//! (find-in-progress, create, update with annotations).

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::report::{Annotation, Conclusion, Report};

const GITHUB_API_URL: &str = "https://api.github.com";

/// GitHub caps annotations at 50 per check-run update call.
const MAX_ANNOTATIONS_PER_UPDATE: usize = 50;

/// Errors from the GitHub API surface
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected GraphQL response: {0}")]
    Graph(String),
}

/// How a file changed in the triggering commit or pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    #[serde(alias = "ADDED")]
    Added,
    #[serde(alias = "MODIFIED")]
    Modified,
    #[serde(alias = "DELETED")]
    Removed,
    #[serde(alias = "RENAMED")]
    Renamed,
    #[serde(alias = "CHANGED")]
    Changed,
    #[serde(other)]
    Unknown,
}

/// One changed file as reported by the host
///
/// Deserializes from both the REST commit shape (`filename`/`status`) and the
/// GraphQL pull-request shape (`path`/`changeType`).
#[derive(Debug, Clone, Deserialize)]
pub struct ChangedFile {
    #[serde(alias = "filename")]
    pub path: String,

    #[serde(alias = "status", alias = "changeType", default = "unknown_status")]
    pub status: ChangeStatus,
}

fn unknown_status() -> ChangeStatus {
    ChangeStatus::Unknown
}

/// Client for the check-run and changed-file operations
#[derive(Debug, Clone)]
pub struct ChecksClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    owner: String,
    repo: String,
}

impl ChecksClient {
    /// Create a client against api.github.com
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Result<Self, GitHubError> {
        Self::with_base_url(token, owner, repo, GITHUB_API_URL)
    }

    /// Create a client against a custom base URL (for tests)
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_base_url(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("lintcheck/1.0"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
        })
    }

    /// Fetch a pull request's changed files (first 100) and head commit sha
    ///
    /// # Errors
    ///
    /// Returns an error when the query fails or the response shape is not the
    /// expected pull-request payload (e.g. the token cannot read the PR).
    pub async fn pull_request_files(
        &self,
        number: u64,
    ) -> Result<(Vec<ChangedFile>, String), GitHubError> {
        let query = r"query($owner: String!, $repo: String!, $number: Int!) {
            repository(owner: $owner, name: $repo) {
                pullRequest(number: $number) {
                    files(first: 100) { nodes { path changeType } }
                    commits(last: 1) { nodes { commit { oid } } }
                }
            }
        }";

        let body = serde_json::json!({
            "query": query,
            "variables": {
                "owner": self.owner,
                "repo": self.repo,
                "number": number,
            },
        });

        let response = self
            .client
            .post(format!("{}/graphql", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GitHubError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: GraphQlEnvelope = response.json().await?;
        if let Some(errors) = envelope.errors {
            let joined = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(GitHubError::Graph(joined));
        }

        let pr = envelope
            .data
            .and_then(|d| d.repository)
            .and_then(|r| r.pull_request)
            .ok_or_else(|| GitHubError::Graph("pull request not found".to_string()))?;

        let head_sha = pr
            .commits
            .nodes
            .into_iter()
            .next()
            .map(|n| n.commit.oid)
            .ok_or_else(|| GitHubError::Graph("pull request has no commits".to_string()))?;

        debug!(
            number,
            files = pr.files.nodes.len(),
            sha = %head_sha,
            "Fetched pull request files"
        );
        Ok((pr.files.nodes, head_sha))
    }

    /// Fetch the changed files of a single commit
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn commit_files(&self, git_ref: &str) -> Result<Vec<ChangedFile>, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/commits/{git_ref}",
            self.base_url, self.owner, self.repo
        );

        let commit: CommitResponse = self.get_json(&url).await?;
        debug!(git_ref, files = commit.files.len(), "Fetched commit files");
        Ok(commit.files)
    }

    /// Find an in-progress check run by name for a commit
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn find_in_progress_check_run(
        &self,
        git_ref: &str,
        name: &str,
    ) -> Result<Option<u64>, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/commits/{git_ref}/check-runs?status=in_progress",
            self.base_url, self.owner, self.repo
        );

        let response: CheckRunsResponse = self.get_json(&url).await?;
        let id = response
            .check_runs
            .into_iter()
            .find(|run| run.name == name)
            .map(|run| run.id);

        debug!(git_ref, name, ?id, "Looked up in-progress check run");
        Ok(id)
    }

    /// Create a new in-progress check run for a commit
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn create_check_run(&self, name: &str, head_sha: &str) -> Result<u64, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/check-runs",
            self.base_url, self.owner, self.repo
        );

        let body = serde_json::json!({
            "name": name,
            "head_sha": head_sha,
            "status": "in_progress",
        });

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GitHubError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let created: CheckRunId = response.json().await?;
        debug!(name, head_sha, id = created.id, "Created check run");
        Ok(created.id)
    }

    /// Complete a check run, with annotations sent in batches of at most 50
    ///
    /// Intermediate batches only attach output; the final batch flips the run
    /// to `completed` with the report's conclusion.
    ///
    /// # Errors
    ///
    /// Returns an error if any update call fails.
    pub async fn publish_report(
        &self,
        check_run_id: u64,
        title: &str,
        report: &Report,
    ) -> Result<(), GitHubError> {
        let mut batches: Vec<&[Annotation]> = report
            .annotations
            .chunks(MAX_ANNOTATIONS_PER_UPDATE)
            .collect();
        if batches.is_empty() {
            batches.push(&[]);
        }
        let last = batches.len() - 1;

        for (i, batch) in batches.iter().enumerate() {
            let mut body = serde_json::json!({
                "output": {
                    "title": title,
                    "summary": report.summary,
                    "annotations": batch,
                },
            });
            if i == last {
                body["status"] = serde_json::json!("completed");
                body["conclusion"] = serde_json::json!(report.conclusion);
            }
            self.patch_check_run(check_run_id, &body).await?;
        }

        debug!(
            check_run_id,
            annotations = report.annotations.len(),
            conclusion = %report.conclusion,
            "Published report"
        );
        Ok(())
    }

    /// Mark a check run completed with the given conclusion and no output
    ///
    /// Used when the lint engine itself fails and there is no report.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn complete_check_run(
        &self,
        check_run_id: u64,
        conclusion: Conclusion,
    ) -> Result<(), GitHubError> {
        let body = serde_json::json!({
            "status": "completed",
            "conclusion": conclusion,
        });
        self.patch_check_run(check_run_id, &body).await
    }

    async fn patch_check_run(
        &self,
        check_run_id: u64,
        body: &serde_json::Value,
    ) -> Result<(), GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/check-runs/{check_run_id}",
            self.base_url, self.owner, self.repo
        );

        let response = self
            .client
            .patch(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GitHubError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, GitHubError> {
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GitHubError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlEnvelope {
    data: Option<GraphQlData>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlData {
    repository: Option<GraphQlRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRepository {
    pull_request: Option<GraphQlPullRequest>,
}

#[derive(Debug, Deserialize)]
struct GraphQlPullRequest {
    files: GraphQlFiles,
    commits: GraphQlCommits,
}

#[derive(Debug, Deserialize)]
struct GraphQlFiles {
    nodes: Vec<ChangedFile>,
}

#[derive(Debug, Deserialize)]
struct GraphQlCommits {
    nodes: Vec<GraphQlCommitNode>,
}

#[derive(Debug, Deserialize)]
struct GraphQlCommitNode {
    commit: GraphQlCommit,
}

#[derive(Debug, Deserialize)]
struct GraphQlCommit {
    oid: String,
}

/// Commit API response, reduced to the changed-file list
#[derive(Debug, Deserialize)]
struct CommitResponse {
    #[serde(default)]
    files: Vec<ChangedFile>,
}

#[derive(Debug, Deserialize)]
struct CheckRunsResponse {
    check_runs: Vec<CheckRunSummary>,
}

#[derive(Debug, Deserialize)]
struct CheckRunSummary {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CheckRunId {
    id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_status_parses_rest_spellings() {
        let file: ChangedFile =
            serde_json::from_str(r#"{"filename": "src/a.ts", "status": "modified"}"#).unwrap();
        assert_eq!(file.path, "src/a.ts");
        assert_eq!(file.status, ChangeStatus::Modified);
    }

    #[test]
    fn change_status_parses_graphql_spellings() {
        let file: ChangedFile =
            serde_json::from_str(r#"{"path": "src/a.ts", "changeType": "DELETED"}"#).unwrap();
        assert_eq!(file.status, ChangeStatus::Removed);
    }

    #[test]
    fn change_status_folds_unknown_values() {
        let file: ChangedFile =
            serde_json::from_str(r#"{"filename": "src/a.ts", "status": "copied"}"#).unwrap();
        assert_eq!(file.status, ChangeStatus::Unknown);
    }

    #[test]
    fn missing_status_defaults_to_unknown() {
        let file: ChangedFile = serde_json::from_str(r#"{"path": "src/a.ts"}"#).unwrap();
        assert_eq!(file.status, ChangeStatus::Unknown);
    }
}
