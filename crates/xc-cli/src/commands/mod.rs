pub mod blame;
pub mod dig;
pub mod relic;
pub mod should_exist;

use std::str::FromStr;
use std::time::Duration;

use xc_assistant::adapter::{adapter_for, AssistantAdapter, AssistantKind};
use xc_core::config::AssistantConfig;

/// Build the configured assistant adapter.
pub fn assistant_from_config(
    config: &AssistantConfig,
) -> anyhow::Result<Box<dyn AssistantAdapter>> {
    let kind = AssistantKind::from_str(&config.command)?;
    let timeout = config.timeout_secs.map(Duration::from_secs);
    Ok(adapter_for(kind, config.extra_args.clone(), timeout))
}

/// Spinner shown while a slow collaborator (clone, assistant) works.
pub fn spinner(message: impl Into<String>) -> indicatif::ProgressBar {
    let bar = indicatif::ProgressBar::new_spinner();
    bar.set_message(message.into());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}
