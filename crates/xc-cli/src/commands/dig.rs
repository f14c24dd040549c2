use std::path::{Path, PathBuf};

use xc_assistant::adapter::AssistantAdapter;
use xc_assistant::prompt::dig_prompt;
use xc_core::history::default_provider;
use xc_core::remote::{RemoteSpec, TempCheckout};
use xc_core::source::{read_target, SourceError};

use super::spinner;

/// Run the `dig` subcommand: slurp the target, optionally attach history,
/// and ask the assistant for a code-archaeology read.
///
/// `target` is a local path or a remote `owner/repo[:subpath]` spec. An
/// existing local path always wins; only targets missing from disk are
/// interpreted as remote specs.
pub async fn run(
    adapter: &dyn AssistantAdapter,
    target: &str,
    roast: bool,
    archaeology: bool,
    prompt_commits: usize,
) -> anyhow::Result<()> {
    println!("Excavating {target}...\n");

    // Held for the whole call so the temp clone outlives every read;
    // dropping it (on any exit path) removes the checkout.
    let mut checkout: Option<TempCheckout> = None;

    let local = Path::new(target);
    let (history_root, history_path, read_path): (PathBuf, String, PathBuf) = if local.exists() {
        (
            std::env::current_dir()?,
            target.to_string(),
            local.to_path_buf(),
        )
    } else if let Some(spec) = RemoteSpec::parse(target) {
        let bar = spinner(format!("Cloning {}...", spec.slug()));
        let cloned = TempCheckout::clone_shallow(spec);
        bar.finish_and_clear();
        let cloned = cloned?;

        let read_path = cloned.target_dir();
        let history_path = cloned
            .spec()
            .subpath
            .clone()
            .unwrap_or_else(|| ".".to_string());
        let root = cloned.path().to_path_buf();
        checkout = Some(cloned);
        (root, history_path, read_path)
    } else {
        return Err(SourceError::NotFound(target.to_string()).into());
    };

    let content = read_target(&read_path)?;
    if content.trim().is_empty() {
        println!("No readable files found in target path.");
        return Ok(());
    }

    let history_json = if archaeology {
        let provider = default_provider();
        match provider.log(&history_root, &history_path, Some(prompt_commits)) {
            Ok(commits) if !commits.is_empty() => Some(serde_json::to_string_pretty(&commits)?),
            Ok(_) => {
                tracing::info!(target, "no commit history for target");
                None
            }
            Err(err) => {
                // Archaeology is enrichment for dig; keep digging without it.
                tracing::warn!(target, error = %err, "git history unavailable");
                None
            }
        }
    } else {
        None
    };

    let prompt = dig_prompt(&content, history_json.as_deref(), roast);

    let bar = spinner(format!("Asking {}...", adapter.binary_name()));
    let response = adapter.ask(&prompt).await;
    bar.finish_and_clear();

    println!("{}", response?);
    drop(checkout);
    Ok(())
}
