//! # Lint Engine
//!
//! Invokes ESLint over the selected files and parses its JSON formatter
//! output. The engine is behind a trait so the translator and runner can be
//! exercised without a Node toolchain.

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::select::Selection;

/// Lint finding importance as ESLint encodes it: 0 off, 1 warning, 2 error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Rule disabled; findings at this level are informational only
    Off,
    /// Should be fixed, does not fail the run
    Warning,
    /// Fails the run
    Error,
}

impl Severity {
    /// Decode the numeric severity from the wire format
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Warning,
            2 => Self::Error,
            _ => Self::Off,
        }
    }
}

/// One lint finding within a file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintMessage {
    /// Starting line
    #[serde(default = "default_position")]
    pub line: u32,

    /// Ending line, absent for single-point findings
    #[serde(default)]
    pub end_line: Option<u32>,

    /// Starting column
    #[serde(default = "default_position")]
    pub column: u32,

    /// Ending column, absent for single-point findings
    #[serde(default)]
    pub end_column: Option<u32>,

    /// Numeric severity: 0 off, 1 warning, 2 error
    pub severity: u8,

    /// Rule identifier (e.g., `no-unused-vars`), absent for parse errors
    #[serde(default)]
    pub rule_id: Option<String>,

    /// The finding message
    pub message: String,
}

fn default_position() -> u32 {
    1
}

/// Per-file lint result
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResult {
    /// Absolute path as reported by the engine
    pub file_path: String,

    /// Findings in engine order
    pub messages: Vec<LintMessage>,

    /// Error-severity finding count for this file
    #[serde(default)]
    pub error_count: u64,

    /// Warning-severity finding count for this file
    #[serde(default)]
    pub warning_count: u64,
}

/// Aggregated engine output across all linted files
#[derive(Debug, Clone)]
pub struct LintOutput {
    /// Per-file results in engine order
    pub files: Vec<FileResult>,

    /// Total error-severity findings
    pub error_count: u64,

    /// Total warning-severity findings
    pub warning_count: u64,
}

impl LintOutput {
    /// Aggregate per-file results into a run-level output
    #[must_use]
    pub fn from_files(files: Vec<FileResult>) -> Self {
        let error_count = files.iter().map(|f| f.error_count).sum();
        let warning_count = files.iter().map(|f| f.warning_count).sum();
        Self {
            files,
            error_count,
            warning_count,
        }
    }
}

/// A lint engine that can be executed over a file selection
#[async_trait]
pub trait LintEngine {
    /// Lint the selection and return structured results
    ///
    /// Findings are results, not errors; an `Err` means the invocation
    /// itself failed and the run cannot continue.
    async fn execute(&self, selection: &Selection) -> Result<LintOutput>;
}

/// ESLint invoked as a subprocess with the JSON formatter
#[derive(Debug, Clone)]
pub struct EslintEngine {
    workspace_root: PathBuf,
    default_target: String,
}

impl EslintEngine {
    /// Create an engine rooted at the workspace directory
    pub fn new(workspace_root: impl Into<PathBuf>, default_target: impl Into<String>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            default_target: default_target.into(),
        }
    }
}

#[async_trait]
impl LintEngine for EslintEngine {
    async fn execute(&self, selection: &Selection) -> Result<LintOutput> {
        // A selection can legitimately be empty (the change touched no
        // lintable files). ESLint given zero patterns either errors out or
        // lints the whole directory; neither is wanted.
        if matches!(selection, Selection::Files(files) if files.is_empty()) {
            debug!("No lintable files selected, skipping eslint");
            return Ok(LintOutput::from_files(Vec::new()));
        }

        let mut cmd = Command::new("npx");
        cmd.args([
            "--no-install",
            "eslint",
            "--format",
            "json",
            "--ext",
            ".ts,.js",
            "--ignore-path",
            ".gitignore",
        ]);

        match selection {
            Selection::Files(files) => {
                cmd.args(files);
            }
            Selection::DefaultTarget => {
                cmd.arg(&self.default_target);
            }
        }

        debug!(workspace = %self.workspace_root.display(), "Invoking eslint");

        let output = cmd
            .current_dir(&self.workspace_root)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("Failed to execute eslint")?;

        // ESLint exits 1 when there are error-severity findings; that is a
        // normal lint result as long as stdout carries the JSON report.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let files: Vec<FileResult> = serde_json::from_str(stdout.trim()).with_context(|| {
            let stderr = String::from_utf8_lossy(&output.stderr);
            format!(
                "Failed to parse eslint output (exit status {}): {}",
                output.status,
                stderr.trim()
            )
        })?;

        Ok(LintOutput::from_files(files))
    }
}
