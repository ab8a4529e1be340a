//! # Run Orchestration
//!
//! The linear flow of one lint run: select files, resolve a check run at the
//! effective commit, lint, translate, publish. Host API failures degrade;
//! only a lint engine invocation failure aborts the run.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::degrade::attempt_or;
use crate::event::Trigger;
use crate::github::ChecksClient;
use crate::lint::{EslintEngine, LintEngine};
use crate::report::{Conclusion, Report, Translator};
use crate::select::{FileSelector, Selection};

/// Execute a full lint run and return its conclusion
///
/// # Errors
///
/// Returns an error only when the lint engine invocation fails; the active
/// check run (if any) has already been marked failed by then.
pub async fn run(config: &Config) -> Result<Conclusion> {
    let (owner, repo) = config.repo_parts()?;
    let client = ChecksClient::new(&config.token, owner, repo)
        .context("Failed to create GitHub client")?;
    let engine = EslintEngine::new(&config.workspace, &config.default_target);
    run_with(config, &client, &engine).await
}

/// Run against an explicit client and engine (the testable core of [`run`])
///
/// # Errors
///
/// Returns an error only when the lint engine invocation fails.
pub async fn run_with<E: LintEngine>(
    config: &Config,
    client: &ChecksClient,
    engine: &E,
) -> Result<Conclusion> {
    let trigger = Trigger::detect(config);

    // Selection first: on the PR path it also yields the PR's most recent
    // commit, which is where the check run must attach (the triggering sha
    // is the synthetic merge commit).
    let selected = FileSelector::new(client).select(&trigger).await;
    let head_sha = selected.head_sha.as_deref().unwrap_or(&config.head_sha);
    let check_run_id = resolve_check_run(client, config, head_sha).await;

    let selection = if config.lint_all {
        info!("Lint-all requested, selecting default target");
        Selection::DefaultTarget
    } else {
        selected.selection
    };

    if let Selection::Files(files) = &selection {
        info!(count = files.len(), "Selected changed files for linting");
    }

    let translator = Translator::new(engine, &config.workspace);

    let report = match translator.run(&selection).await {
        Ok(report) => report,
        Err(e) => {
            if let Some(id) = check_run_id {
                attempt_or(
                    client.complete_check_run(id, Conclusion::Failure),
                    (),
                    "Marking check run failed",
                )
                .await;
            }
            return Err(e);
        }
    };

    publish(client, config, check_run_id, &report).await;

    info!(conclusion = %report.conclusion, "{}", report.summary);
    Ok(report.conclusion)
}

/// Reuse a named in-progress check run, or create a fresh one
///
/// Either operation may fail on a restricted token; the run then proceeds
/// without a check run and only logs findings.
async fn resolve_check_run(
    client: &ChecksClient,
    config: &Config,
    head_sha: &str,
) -> Option<u64> {
    if let Some(name) = &config.check_name {
        let found = attempt_or(
            client.find_in_progress_check_run(head_sha, name),
            None,
            "Listing in-progress check runs",
        )
        .await;

        if let Some(id) = found {
            info!(name, id, "Reusing in-progress check run");
            return Some(id);
        }
        warn!(name, "No in-progress check run with that name, creating one");
    }

    attempt_or(
        async {
            client
                .create_check_run(config.check_run_name(), head_sha)
                .await
                .map(Some)
        },
        None,
        "Creating check run",
    )
    .await
}

async fn publish(
    client: &ChecksClient,
    config: &Config,
    check_run_id: Option<u64>,
    report: &Report,
) {
    let Some(id) = check_run_id else {
        warn!("No check run available, findings reported in logs only");
        return;
    };

    attempt_or(
        client.publish_report(id, config.check_run_name(), report),
        (),
        "Updating check run",
    )
    .await;
}
