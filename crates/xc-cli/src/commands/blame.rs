use std::path::Path;

use xc_assistant::adapter::AssistantAdapter;
use xc_assistant::prompt::{blame_prompt, RecentChange};
use xc_core::history::default_provider;

use super::spinner;

/// Run the `blame-smart` subcommand: investigate a free-form question,
/// grounded in the most recent change to `path` when one is given.
pub async fn run(
    adapter: &dyn AssistantAdapter,
    workdir: &Path,
    question: &str,
    path: Option<&str>,
) -> anyhow::Result<()> {
    println!("Investigating: {question}\n");

    let recent = path.and_then(|p| recent_change(workdir, p));
    if path.is_some() && recent.is_none() {
        println!("(no committed change found to ground the question; asking anyway)\n");
    }

    let prompt = blame_prompt(question, recent.as_ref());

    let bar = spinner(format!("Asking {}...", adapter.binary_name()));
    let response = adapter.ask(&prompt).await;
    bar.finish_and_clear();

    println!("{}", response?);
    Ok(())
}

/// The newest commit touching `path` plus its patch. Both lookups are
/// context enrichment: failures degrade to "no context" with a warning.
fn recent_change(workdir: &Path, path: &str) -> Option<RecentChange> {
    let provider = default_provider();

    match provider.log(workdir, path, Some(1)) {
        Ok(commits) => {
            let commit = commits.into_iter().next()?;
            let patch = match provider.show_patch(workdir, &commit.id, path) {
                Ok(patch) => patch,
                Err(err) => {
                    tracing::warn!(path, error = %err, "patch unavailable");
                    String::new()
                }
            };
            Some(RecentChange { commit, patch })
        }
        Err(err) => {
            tracing::warn!(path, error = %err, "history unavailable for blame context");
            None
        }
    }
}
