use tracing_subscriber::{fmt, EnvFilter};

/// Initialize human-readable logging for the CLI.
///
/// Honours `RUST_LOG` when set, otherwise falls back to `default_level`
/// (e.g. "warn", "xc_core=debug,warn"). Safe to call more than once --
/// subsequent calls are no-ops.
pub fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_is_a_noop() {
        init_logging("warn");
        init_logging("debug");
    }
}
