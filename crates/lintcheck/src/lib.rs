//! # lintcheck
//!
//! CI glue that runs ESLint over the files changed by a pull request or push
//! and reports the findings back to GitHub as check-run annotations.
//!
//! The flow is linear: decide the file list from the trigger event, invoke
//! the linter, translate its output into a report, and publish the report to
//! the check run. Host API failures degrade to best-effort defaults; only a
//! failed lint invocation aborts the run.

pub mod config;
pub mod degrade;
pub mod event;
pub mod github;
pub mod lint;
pub mod report;
pub mod run;
pub mod select;

pub use config::Config;
pub use event::Trigger;
pub use github::{ChangeStatus, ChangedFile, ChecksClient, GitHubError};
pub use lint::{EslintEngine, LintEngine, LintOutput, Severity};
pub use report::{Annotation, AnnotationLevel, Conclusion, Report, Translator};
pub use select::{FileSelector, Selected, Selection};
