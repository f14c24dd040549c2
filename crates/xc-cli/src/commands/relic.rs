use std::path::Path;

use xc_core::relic::{LifecycleRecord, LifecycleStatus, RelicEngine, RelicError};

/// Run the `relic` subcommand: classify the lifecycle of `path` and print
/// a human-readable account of its life (and death).
pub fn run(workdir: &Path, path: &str) -> anyhow::Result<()> {
    let engine = RelicEngine::with_default_provider(workdir);

    let record = match engine.analyze_lifecycle(path) {
        Ok(record) => record,
        Err(RelicError::IncompleteHistory) => {
            // A warning, not a failure: abort gracefully with no record.
            println!("warning: history for {path} is incomplete; no record produced");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    print!("{}", render_record(path, &record));
    Ok(())
}

fn format_day(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// Render a lifecycle record for the terminal.
pub fn render_record(path: &str, record: &LifecycleRecord) -> String {
    let mut out = format!("Relic analysis: {path}\n\n");

    match record.status {
        LifecycleStatus::NeverTracked => {
            out.push_str("This path was never committed.\n");
            out.push_str("Commit it once to begin its archaeological record.\n");
            return out;
        }
        LifecycleStatus::Alive => out.push_str("Status: alive\n"),
        LifecycleStatus::Deleted => out.push_str("Status: deleted\n"),
    }

    if let (Some(first), Some(last)) = (&record.first_seen, &record.last_seen) {
        let until = match record.status {
            LifecycleStatus::Alive => "present".to_string(),
            _ => format_day(last.timestamp),
        };
        out.push_str(&format!(
            "Lived: {} -> {}\n",
            format_day(first.timestamp),
            until
        ));
    }

    if let Some(deletion) = &record.deletion_commit {
        out.push_str(&format!(
            "\nDeleted in commit:\n- {} \"{}\" ({})\n",
            deletion.short_id(),
            deletion.message,
            deletion.author
        ));

        if !record.related_paths.is_empty() {
            out.push_str("\nFiles changed alongside the deletion:\n");
            for related in &record.related_paths {
                out.push_str(&format!("- {related}\n"));
            }
        }
    }

    out
}
