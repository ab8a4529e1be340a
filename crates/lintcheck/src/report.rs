//! # Lint Result Translator
//!
//! Turns the lint engine's structured output into a check-run report:
//! a pass/fail conclusion, a summary line, and one annotation per finding.
//! Also emits one console log line per file and per message so the findings
//! are visible in plain CI logs without opening the check run.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::lint::{LintEngine, LintOutput, Severity};
use crate::select::Selection;

/// Base URL for ESLint rule documentation, linked from annotations.
pub const ESLINT_DOCS_URL: &str = "https://eslint.org/docs/latest/rules";

/// Annotation severity level as GitHub's check-run API understands it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationLevel {
    /// Informational notice
    Notice,
    /// Warning that should be addressed
    Warning,
    /// Failure that blocks the check
    Failure,
}

impl std::fmt::Display for AnnotationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Notice => write!(f, "notice"),
            Self::Warning => write!(f, "warning"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

impl AnnotationLevel {
    /// Map a lint severity to an annotation level
    #[must_use]
    pub fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Off => Self::Notice,
            Severity::Warning => Self::Warning,
            Severity::Error => Self::Failure,
        }
    }
}

/// Overall outcome of a lint run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conclusion {
    /// No error-severity findings
    Success,
    /// At least one error-severity finding
    Failure,
}

impl std::fmt::Display for Conclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// A single inline annotation attached to a file/line range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    /// Path relative to the workspace root (e.g., `src/server.ts`)
    pub path: String,

    /// Starting line number
    pub start_line: u32,

    /// Ending line number (equals `start_line` for single-point findings)
    pub end_line: u32,

    /// Starting column
    pub start_column: u32,

    /// Ending column (equals `start_column` for single-point findings)
    pub end_column: u32,

    /// Severity level
    #[serde(rename = "annotation_level")]
    pub level: AnnotationLevel,

    /// Short title, the rule id when one is present
    pub title: String,

    /// The finding message, with a rule docs link appended when available
    pub message: String,
}

/// Final output of a single lint run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Pass/fail outcome
    pub conclusion: Conclusion,

    /// Human-readable error/warning count line
    pub summary: String,

    /// All annotations, in file-then-message order as the engine returned them
    pub annotations: Vec<Annotation>,
}

/// Runs the lint engine over a selection and normalizes its output
pub struct Translator<'a, E: LintEngine> {
    engine: &'a E,
    workspace_root: PathBuf,
}

impl<'a, E: LintEngine> Translator<'a, E> {
    /// Create a translator for the given engine and workspace root
    pub fn new(engine: &'a E, workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            workspace_root: workspace_root.into(),
        }
    }

    /// Lint the selection and build a report
    ///
    /// # Errors
    ///
    /// Returns an error when the lint engine invocation itself fails. That
    /// error is fatal to the run; lint findings are not errors.
    pub async fn run(&self, selection: &Selection) -> Result<Report> {
        let output = self.engine.execute(selection).await?;
        Ok(self.translate(&output))
    }

    /// Normalize engine output into a report
    #[must_use]
    pub fn translate(&self, output: &LintOutput) -> Report {
        let mut annotations = Vec::new();

        for file in &output.files {
            let path = self.relative_path(&file.file_path);
            info!(file = %path, findings = file.messages.len(), "Linted file");

            for msg in &file.messages {
                let severity = Severity::from_code(msg.severity);
                let end_line = msg.end_line.unwrap_or(msg.line);
                let end_column = msg.end_column.unwrap_or(msg.column);

                let message = match &msg.rule_id {
                    Some(rule) => {
                        format!("{}\n{ESLINT_DOCS_URL}/{rule}", msg.message)
                    }
                    None => msg.message.clone(),
                };

                match severity {
                    Severity::Error => {
                        error!(file = %path, line = msg.line, rule = msg.rule_id.as_deref().unwrap_or("-"), "{}", msg.message);
                    }
                    Severity::Warning => {
                        warn!(file = %path, line = msg.line, rule = msg.rule_id.as_deref().unwrap_or("-"), "{}", msg.message);
                    }
                    Severity::Off => {}
                }

                annotations.push(Annotation {
                    path: path.clone(),
                    start_line: msg.line,
                    end_line,
                    start_column: msg.column,
                    end_column,
                    level: AnnotationLevel::from_severity(severity),
                    title: msg.rule_id.clone().unwrap_or_else(|| "eslint".to_string()),
                    message,
                });
            }
        }

        let conclusion = if output.error_count > 0 {
            Conclusion::Failure
        } else {
            Conclusion::Success
        };

        Report {
            conclusion,
            summary: format!(
                "{} error(s), {} warning(s) found",
                output.error_count, output.warning_count
            ),
            annotations,
        }
    }

    /// Strip the workspace-root prefix from an absolute engine path
    fn relative_path(&self, file_path: &str) -> String {
        Path::new(file_path)
            .strip_prefix(&self.workspace_root)
            .map_or_else(
                |_| file_path.to_string(),
                |p| p.to_string_lossy().into_owned(),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::{FileResult, LintMessage};
    use async_trait::async_trait;

    struct FixedEngine {
        output: LintOutput,
    }

    #[async_trait]
    impl LintEngine for FixedEngine {
        async fn execute(&self, _selection: &Selection) -> Result<LintOutput> {
            Ok(LintOutput {
                files: self.output.files.clone(),
                error_count: self.output.error_count,
                warning_count: self.output.warning_count,
            })
        }
    }

    fn message(severity: u8) -> LintMessage {
        LintMessage {
            line: 4,
            end_line: None,
            column: 7,
            end_column: None,
            severity,
            rule_id: Some("semi".to_string()),
            message: "Missing semicolon.".to_string(),
        }
    }

    fn translator_output(messages: Vec<LintMessage>, errors: u64, warnings: u64) -> LintOutput {
        LintOutput {
            files: vec![FileResult {
                file_path: "/workspace/src/index.ts".to_string(),
                messages,
                error_count: errors,
                warning_count: warnings,
            }],
            error_count: errors,
            warning_count: warnings,
        }
    }

    fn idle_engine() -> FixedEngine {
        FixedEngine {
            output: LintOutput {
                files: Vec::new(),
                error_count: 0,
                warning_count: 0,
            },
        }
    }

    #[test]
    fn severity_maps_to_annotation_level() {
        assert_eq!(
            AnnotationLevel::from_severity(Severity::from_code(0)),
            AnnotationLevel::Notice
        );
        assert_eq!(
            AnnotationLevel::from_severity(Severity::from_code(1)),
            AnnotationLevel::Warning
        );
        assert_eq!(
            AnnotationLevel::from_severity(Severity::from_code(2)),
            AnnotationLevel::Failure
        );
    }

    #[test]
    fn out_of_range_severity_folds_to_notice() {
        assert_eq!(
            AnnotationLevel::from_severity(Severity::from_code(9)),
            AnnotationLevel::Notice
        );
    }

    #[test]
    fn conclusion_is_failure_iff_errors() {
        let engine = idle_engine();
        let t = Translator::new(&engine, "/workspace");
        for (errors, warnings, expected) in [
            (0, 0, Conclusion::Success),
            (0, 2, Conclusion::Success),
            (1, 0, Conclusion::Failure),
            (3, 5, Conclusion::Failure),
        ] {
            let report = t.translate(&translator_output(Vec::new(), errors, warnings));
            assert_eq!(report.conclusion, expected);
        }
    }

    #[test]
    fn summary_counts_errors_and_warnings() {
        let engine = idle_engine();
        let t = Translator::new(&engine, "/workspace");
        let report = t.translate(&translator_output(Vec::new(), 0, 2));
        assert_eq!(report.conclusion, Conclusion::Success);
        assert_eq!(report.summary, "0 error(s), 2 warning(s) found");
    }

    #[test]
    fn end_positions_default_to_start_positions() {
        let engine = idle_engine();
        let t = Translator::new(&engine, "/workspace");
        let report = t.translate(&translator_output(vec![message(2)], 1, 0));
        let ann = &report.annotations[0];
        assert_eq!(ann.start_line, 4);
        assert_eq!(ann.end_line, 4);
        assert_eq!(ann.start_column, 7);
        assert_eq!(ann.end_column, 7);
    }

    #[test]
    fn explicit_end_positions_are_kept() {
        let engine = idle_engine();
        let t = Translator::new(&engine, "/workspace");
        let mut msg = message(1);
        msg.end_line = Some(6);
        msg.end_column = Some(12);
        let report = t.translate(&translator_output(vec![msg], 0, 1));
        let ann = &report.annotations[0];
        assert_eq!(ann.end_line, 6);
        assert_eq!(ann.end_column, 12);
        assert_eq!(ann.level, AnnotationLevel::Warning);
    }

    #[test]
    fn workspace_prefix_is_stripped() {
        let engine = idle_engine();
        let t = Translator::new(&engine, "/workspace");
        let report = t.translate(&translator_output(vec![message(2)], 1, 0));
        assert_eq!(report.annotations[0].path, "src/index.ts");
    }

    #[test]
    fn docs_link_appended_when_rule_id_present() {
        let engine = idle_engine();
        let t = Translator::new(&engine, "/workspace");
        let report = t.translate(&translator_output(vec![message(2)], 1, 0));
        assert!(report.annotations[0]
            .message
            .ends_with("https://eslint.org/docs/latest/rules/semi"));
        assert_eq!(report.annotations[0].title, "semi");
    }

    #[test]
    fn no_docs_link_without_rule_id() {
        let engine = idle_engine();
        let t = Translator::new(&engine, "/workspace");
        let mut msg = message(2);
        msg.rule_id = None;
        msg.message = "Parsing error: unexpected token".to_string();
        let report = t.translate(&translator_output(vec![msg], 1, 0));
        assert_eq!(
            report.annotations[0].message,
            "Parsing error: unexpected token"
        );
        assert_eq!(report.annotations[0].title, "eslint");
    }
}
