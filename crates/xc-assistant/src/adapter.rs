use std::process::Stdio;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from invoking the external assistant CLI.
///
/// The assistant is an opaque collaborator: any failure here is an
/// invocation failure to report to the user, not something the tool
/// models further.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// The assistant binary could not be launched (missing from PATH, not
    /// executable).
    #[error("could not launch {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The assistant ran but exited non-zero.
    #[error("{binary} failed ({status}): {stderr}")]
    NonZero {
        binary: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    /// The configured transport timeout elapsed.
    #[error("assistant timed out after {0:?}")]
    Timeout(Duration),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Unrecognized `assistant.command` value in the config.
    #[error("unknown assistant command: {0} (expected copilot, claude, or gemini)")]
    UnknownKind(String),
}

// ---------------------------------------------------------------------------
// AssistantKind
// ---------------------------------------------------------------------------

/// Which assistant CLI to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantKind {
    Copilot,
    Claude,
    Gemini,
}

impl FromStr for AssistantKind {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "copilot" => Ok(Self::Copilot),
            "claude" => Ok(Self::Claude),
            "gemini" => Ok(Self::Gemini),
            other => Err(AssistantError::UnknownKind(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// AssistantAdapter trait
// ---------------------------------------------------------------------------

/// Adapter that knows how to ask one specific assistant CLI a question in
/// non-interactive prompt mode.
#[async_trait]
pub trait AssistantAdapter: Send + Sync {
    /// Which CLI this adapter handles.
    fn kind(&self) -> AssistantKind;

    /// The binary name / path for the CLI tool.
    fn binary_name(&self) -> &str;

    /// Arguments that are always passed before the prompt.
    fn default_args(&self) -> Vec<String>;

    /// Send one prompt, return the assistant's trimmed stdout.
    async fn ask(&self, prompt: &str) -> Result<String, AssistantError>;
}

/// Shared spawn-and-capture path for all adapters: `binary [args..] -p <prompt>`.
async fn run_prompt(
    binary: &str,
    args: &[String],
    prompt: &str,
    timeout: Option<Duration>,
) -> Result<String, AssistantError> {
    let mut command = Command::new(binary);
    command
        .args(args)
        .arg("-p")
        .arg(prompt)
        .stdin(Stdio::null())
        .kill_on_drop(true);

    tracing::debug!(binary, args = ?args, prompt_len = prompt.len(), "asking assistant");

    let pending = command.output();
    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, pending)
            .await
            .map_err(|_| AssistantError::Timeout(limit))?,
        None => pending.await,
    }
    .map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AssistantError::Spawn {
                binary: binary.to_string(),
                source: e,
            }
        } else {
            AssistantError::Io(e)
        }
    })?;

    if !output.status.success() {
        return Err(AssistantError::NonZero {
            binary: binary.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

// ---------------------------------------------------------------------------
// Copilot adapter
// ---------------------------------------------------------------------------

/// GitHub Copilot via `gh copilot -p <prompt>`.
pub struct CopilotAdapter {
    binary: String,
    extra_args: Vec<String>,
    timeout: Option<Duration>,
}

impl CopilotAdapter {
    pub fn new(extra_args: Vec<String>, timeout: Option<Duration>) -> Self {
        Self {
            binary: "gh".to_string(),
            extra_args,
            timeout,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }
}

#[async_trait]
impl AssistantAdapter for CopilotAdapter {
    fn kind(&self) -> AssistantKind {
        AssistantKind::Copilot
    }

    fn binary_name(&self) -> &str {
        &self.binary
    }

    fn default_args(&self) -> Vec<String> {
        let mut args = vec!["copilot".to_string()];
        args.extend(self.extra_args.iter().cloned());
        args
    }

    async fn ask(&self, prompt: &str) -> Result<String, AssistantError> {
        run_prompt(&self.binary, &self.default_args(), prompt, self.timeout).await
    }
}

// ---------------------------------------------------------------------------
// Claude adapter
// ---------------------------------------------------------------------------

/// Claude Code via `claude -p <prompt>`.
pub struct ClaudeAdapter {
    binary: String,
    extra_args: Vec<String>,
    timeout: Option<Duration>,
}

impl ClaudeAdapter {
    pub fn new(extra_args: Vec<String>, timeout: Option<Duration>) -> Self {
        Self {
            binary: "claude".to_string(),
            extra_args,
            timeout,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }
}

#[async_trait]
impl AssistantAdapter for ClaudeAdapter {
    fn kind(&self) -> AssistantKind {
        AssistantKind::Claude
    }

    fn binary_name(&self) -> &str {
        &self.binary
    }

    fn default_args(&self) -> Vec<String> {
        self.extra_args.clone()
    }

    async fn ask(&self, prompt: &str) -> Result<String, AssistantError> {
        run_prompt(&self.binary, &self.default_args(), prompt, self.timeout).await
    }
}

// ---------------------------------------------------------------------------
// Gemini adapter
// ---------------------------------------------------------------------------

/// Gemini CLI via `gemini -p <prompt>`.
pub struct GeminiAdapter {
    binary: String,
    extra_args: Vec<String>,
    timeout: Option<Duration>,
}

impl GeminiAdapter {
    pub fn new(extra_args: Vec<String>, timeout: Option<Duration>) -> Self {
        Self {
            binary: "gemini".to_string(),
            extra_args,
            timeout,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }
}

#[async_trait]
impl AssistantAdapter for GeminiAdapter {
    fn kind(&self) -> AssistantKind {
        AssistantKind::Gemini
    }

    fn binary_name(&self) -> &str {
        &self.binary
    }

    fn default_args(&self) -> Vec<String> {
        self.extra_args.clone()
    }

    async fn ask(&self, prompt: &str) -> Result<String, AssistantError> {
        run_prompt(&self.binary, &self.default_args(), prompt, self.timeout).await
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Build the adapter for a configured assistant kind.
pub fn adapter_for(
    kind: AssistantKind,
    extra_args: Vec<String>,
    timeout: Option<Duration>,
) -> Box<dyn AssistantAdapter> {
    match kind {
        AssistantKind::Copilot => Box::new(CopilotAdapter::new(extra_args, timeout)),
        AssistantKind::Claude => Box::new(ClaudeAdapter::new(extra_args, timeout)),
        AssistantKind::Gemini => Box::new(GeminiAdapter::new(extra_args, timeout)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_known_commands() {
        assert_eq!(AssistantKind::from_str("copilot").unwrap(), AssistantKind::Copilot);
        assert_eq!(AssistantKind::from_str("Claude").unwrap(), AssistantKind::Claude);
        assert_eq!(AssistantKind::from_str(" gemini ").unwrap(), AssistantKind::Gemini);
    }

    #[test]
    fn kind_rejects_unknown_commands() {
        let err = AssistantKind::from_str("chatbot9000").unwrap_err();
        assert!(matches!(err, AssistantError::UnknownKind(_)));
    }

    #[test]
    fn copilot_invokes_through_gh() {
        let adapter = CopilotAdapter::new(vec!["--model".into(), "latest".into()], None);
        assert_eq!(adapter.binary_name(), "gh");
        assert_eq!(adapter.default_args(), vec!["copilot", "--model", "latest"]);
    }

    #[test]
    fn factory_matches_kind() {
        for kind in [AssistantKind::Copilot, AssistantKind::Claude, AssistantKind::Gemini] {
            let adapter = adapter_for(kind, Vec::new(), None);
            assert_eq!(adapter.kind(), kind);
        }
    }

    #[cfg(unix)]
    mod stub_binary {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::path::PathBuf;

        fn write_stub(dir: &std::path::Path, name: &str, script: &str) -> PathBuf {
            let path = dir.join(name);
            std::fs::write(&path, script).unwrap();
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            path
        }

        #[tokio::test]
        async fn ask_returns_trimmed_stdout() {
            let tmp = tempfile::tempdir().unwrap();
            let stub = write_stub(tmp.path(), "claude", "#!/bin/sh\necho '  the answer  '\n");

            let adapter =
                ClaudeAdapter::new(Vec::new(), None).with_binary(stub.display().to_string());
            let answer = adapter.ask("why?").await.unwrap();
            assert_eq!(answer, "the answer");
        }

        #[tokio::test]
        async fn ask_passes_prompt_after_dash_p() {
            let tmp = tempfile::tempdir().unwrap();
            let stub = write_stub(tmp.path(), "gemini", "#!/bin/sh\nprintf '%s|' \"$@\"\n");

            let adapter =
                GeminiAdapter::new(Vec::new(), None).with_binary(stub.display().to_string());
            let answer = adapter.ask("what is this repo").await.unwrap();
            assert_eq!(answer, "-p|what is this repo|");
        }

        #[tokio::test]
        async fn missing_binary_is_spawn_error() {
            let adapter =
                ClaudeAdapter::new(Vec::new(), None).with_binary("/no/such/assistant-binary");
            let err = adapter.ask("hello").await.unwrap_err();
            assert!(matches!(err, AssistantError::Spawn { .. }));
        }

        #[tokio::test]
        async fn nonzero_exit_carries_stderr() {
            let tmp = tempfile::tempdir().unwrap();
            let stub = write_stub(
                tmp.path(),
                "claude",
                "#!/bin/sh\necho 'quota exceeded' >&2\nexit 3\n",
            );

            let adapter =
                ClaudeAdapter::new(Vec::new(), None).with_binary(stub.display().to_string());
            let err = adapter.ask("hello").await.unwrap_err();
            match err {
                AssistantError::NonZero { stderr, .. } => assert_eq!(stderr, "quota exceeded"),
                other => panic!("expected NonZero, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn slow_assistant_times_out() {
            let tmp = tempfile::tempdir().unwrap();
            let stub = write_stub(tmp.path(), "claude", "#!/bin/sh\nsleep 5\n");

            let adapter = ClaudeAdapter::new(Vec::new(), Some(Duration::from_millis(100)))
                .with_binary(stub.display().to_string());
            let err = adapter.ask("hello").await.unwrap_err();
            assert!(matches!(err, AssistantError::Timeout(_)));
        }
    }
}
