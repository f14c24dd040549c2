//! External code-reasoning assistant integration: per-CLI adapters that
//! spawn the assistant binary in non-interactive prompt mode, and the
//! prompt templates fed to it.

pub mod adapter;
pub mod prompt;
