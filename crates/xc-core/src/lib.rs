pub mod config;
pub mod history;
pub mod logging;
pub mod relic;
pub mod remote;
pub mod source;
pub mod usage;

#[cfg(feature = "libgit2")]
pub mod git2_history;

#[cfg(test)]
pub(crate) mod test_fixtures;
