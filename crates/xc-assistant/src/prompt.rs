//! Prompt templates for the assistant.
//!
//! Pure string assembly: every dynamic field is embedded verbatim between
//! the BEGIN/END markers, and nothing here touches the filesystem or git.

use xc_core::history::Commit;

/// The most recent change to a path, used to ground a blame question.
#[derive(Debug, Clone)]
pub struct RecentChange {
    pub commit: Commit,
    pub patch: String,
}

const ROAST_LINE: &str = "Be slightly sarcastic but still helpful.";

/// Code-archaeology prompt for `dig`.
pub fn dig_prompt(content: &str, history_json: Option<&str>, roast: bool) -> String {
    let mut prompt = String::from(
        "You are a senior engineer performing code archaeology.\n\n\
         Your job:\n\
         - Explain what this code does\n\
         - Why it likely exists\n\
         - How it evolved over time\n\
         - What problem it was reacting to\n\
         - Call out red flags, legacy scars, or design smells\n",
    );

    if roast {
        prompt.push('\n');
        prompt.push_str(ROAST_LINE);
        prompt.push('\n');
    }

    if let Some(history) = history_json {
        prompt.push_str("\n--- GIT HISTORY ---\n");
        prompt.push_str(history);
        prompt.push('\n');
    }

    prompt.push_str("\n--- BEGIN ---\n");
    prompt.push_str(content);
    prompt.push_str("\n--- END ---\n");
    prompt
}

/// Keep-or-delete prompt for `should-this-exist --explain`.
pub fn existence_prompt(
    path: &str,
    record_json: &str,
    usages: &[String],
    roast: bool,
) -> String {
    let mut prompt = format!(
        "You are a senior engineer deciding whether a file still needs to exist.\n\n\
         File: {path}\n",
    );

    if roast {
        prompt.push('\n');
        prompt.push_str(ROAST_LINE);
        prompt.push('\n');
    }

    prompt.push_str("\nVersion-control lifecycle:\n--- BEGIN ---\n");
    prompt.push_str(record_json);
    prompt.push_str("\n--- END ---\n");

    if usages.is_empty() {
        prompt.push_str("\nNo referencing files were found by a textual import scan.\n");
    } else {
        prompt.push_str("\nFiles referencing it (textual import scan):\n");
        for usage in usages {
            prompt.push_str("- ");
            prompt.push_str(usage);
            prompt.push('\n');
        }
    }

    prompt.push_str(
        "\nGive a keep/delete verdict with a confidence figure and your reasoning.\n",
    );
    prompt
}

/// Investigation prompt for `blame-smart`.
pub fn blame_prompt(question: &str, recent: Option<&RecentChange>) -> String {
    let mut prompt = format!(
        "You are a senior engineer investigating why something behaves the way it does.\n\n\
         Question: {question}\n",
    );

    if let Some(recent) = recent {
        prompt.push_str(&format!(
            "\nMost recent change to the file in question:\n\
             commit {} by {}: {}\n\
             --- BEGIN ---\n",
            recent.commit.short_id(),
            recent.commit.author,
            recent.commit.message,
        ));
        prompt.push_str(&recent.patch);
        prompt.push_str("\n--- END ---\n");
    }

    prompt.push_str("\nExplain the likely cause and what to check next.\n");
    prompt
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
