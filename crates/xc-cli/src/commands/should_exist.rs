use std::path::{Path, PathBuf};

use xc_assistant::adapter::AssistantAdapter;
use xc_assistant::prompt::existence_prompt;
use xc_core::relic::{LifecycleRecord, LifecycleStatus, RelicEngine, RelicError};
use xc_core::usage::find_usages;

use super::spinner;

/// Local verdict derived from the lifecycle record and the usage scan.
#[derive(Debug, PartialEq, Eq)]
pub struct Verdict {
    pub label: &'static str,
    pub confidence: u8,
    pub reasons: Vec<String>,
}

/// Combine lifecycle and usage evidence into a keep/delete verdict.
///
/// The usage side is a textual heuristic, so confidence stays deliberately
/// modest everywhere except the cases git itself answers.
pub fn assess(record: &LifecycleRecord, usages: &[PathBuf]) -> Verdict {
    match record.status {
        LifecycleStatus::NeverTracked => Verdict {
            label: "UNKNOWN",
            confidence: 0,
            reasons: vec!["file has never been committed".into()],
        },
        LifecycleStatus::Deleted => {
            let mut reasons = Vec::new();
            if let Some(deletion) = &record.deletion_commit {
                reasons.push(format!(
                    "already deleted in {} \"{}\"",
                    deletion.short_id(),
                    deletion.message
                ));
            }
            Verdict {
                label: "ALREADY DELETED",
                confidence: 95,
                reasons,
            }
        }
        LifecycleStatus::Alive => {
            let never_modified = match (&record.first_seen, &record.last_seen) {
                (Some(first), Some(last)) => first.id == last.id,
                _ => false,
            };

            if usages.is_empty() {
                let mut reasons = vec!["no imports or references found by textual scan".into()];
                let confidence = if never_modified {
                    reasons.push("never modified since creation".into());
                    40
                } else {
                    30
                };
                Verdict {
                    label: "LIKELY DEAD",
                    confidence,
                    reasons,
                }
            } else {
                let confidence = (50 + 10 * usages.len()).min(90) as u8;
                Verdict {
                    label: "IN USE",
                    confidence,
                    reasons: vec![format!("referenced by {} file(s)", usages.len())],
                }
            }
        }
    }
}

/// Run the `should-this-exist` subcommand.
pub async fn run(
    adapter: Option<&dyn AssistantAdapter>,
    workdir: &Path,
    path: &str,
    roast: bool,
    explain: bool,
) -> anyhow::Result<()> {
    println!("Evaluating {path}...\n");

    let engine = RelicEngine::with_default_provider(workdir);
    let record = match engine.analyze_lifecycle(path) {
        Ok(record) => record,
        Err(RelicError::IncompleteHistory) => {
            println!("warning: history for {path} is incomplete; no verdict produced");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let usages = if record.status == LifecycleStatus::Alive {
        match find_usages(&workdir.join(path), workdir) {
            Ok(usages) => usages,
            Err(err) => {
                // The scan is enrichment; a failed scan is not a failed verdict.
                tracing::warn!(path, error = %err, "usage scan failed");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let verdict = assess(&record, &usages);
    println!("Verdict: {}", verdict.label);
    println!("Confidence: {}%", verdict.confidence);
    for reason in &verdict.reasons {
        println!("- {reason}");
    }

    if roast && verdict.label == "LIKELY DEAD" {
        println!("\nThis file is giving strong 'left here after a refactor' energy.");
    }

    if explain {
        if let Some(adapter) = adapter {
            let record_json = serde_json::to_string_pretty(&record)?;
            let usage_names: Vec<String> =
                usages.iter().map(|p| p.display().to_string()).collect();
            let prompt = existence_prompt(path, &record_json, &usage_names, roast);

            let bar = spinner(format!("Asking {}...", adapter.binary_name()));
            let response = adapter.ask(&prompt).await;
            bar.finish_and_clear();
            println!("\n{}", response?);
        }
    }

    Ok(())
}
