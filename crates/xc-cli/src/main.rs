mod commands;

use clap::{Parser, Subcommand};

use xc_core::config::Config;
use xc_core::history::HistoryError;
use xc_core::relic::RelicError;
use xc_core::remote::RemoteError;
use xc_core::source::SourceError;

/// excavate CLI -- understand any codebase you didn't write.
#[derive(Parser)]
#[command(name = "xc", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Excavate context, intent, and risk from a file, folder, or GitHub repo.
    Dig {
        /// Local path, or a remote `owner/repo[:subpath]` target.
        target: String,
        /// Enable gentle roast mode.
        #[arg(long)]
        roast: bool,
        /// Include git history and evolution context.
        #[arg(long)]
        archaeology: bool,
    },

    /// Trace the life and death of a file.
    Relic {
        /// Path relative to the repository root.
        path: String,
    },

    /// Determine whether a file or module is still needed.
    ShouldThisExist {
        path: String,
        /// Enable gentle roast mode.
        #[arg(long)]
        roast: bool,
        /// Ask the assistant for a prose explanation of the verdict.
        #[arg(long)]
        explain: bool,
    },

    /// Investigate why something behaves the way it does.
    BlameSmart {
        question: String,
        /// File to ground the investigation in.
        #[arg(long)]
        path: Option<String>,
    },
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load()?;
    let workdir = std::env::current_dir()?;

    match cli.command {
        Commands::Dig {
            target,
            roast,
            archaeology,
        } => {
            let adapter = commands::assistant_from_config(&config.assistant)?;
            commands::dig::run(
                adapter.as_ref(),
                &target,
                roast,
                archaeology,
                config.history.prompt_commits,
            )
            .await
        }
        Commands::Relic { path } => commands::relic::run(&workdir, &path),
        Commands::ShouldThisExist {
            path,
            roast,
            explain,
        } => {
            let adapter = if explain {
                Some(commands::assistant_from_config(&config.assistant)?)
            } else {
                None
            };
            commands::should_exist::run(adapter.as_deref(), &workdir, &path, roast, explain).await
        }
        Commands::BlameSmart { question, path } => {
            let adapter = commands::assistant_from_config(&config.assistant)?;
            commands::blame::run(adapter.as_ref(), &workdir, &question, path.as_deref()).await
        }
    }
}

/// Distinct exit codes per error kind: 2 when history could not be
/// queried, 3 when the target does not exist or could not be fetched,
/// 1 for everything else (including assistant invocation failures).
fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(relic) = err.downcast_ref::<RelicError>() {
        return match relic {
            RelicError::HistoryUnavailable(_) => 2,
            RelicError::IncompleteHistory => 1,
        };
    }
    if err.downcast_ref::<HistoryError>().is_some() {
        return 2;
    }
    if let Some(source) = err.downcast_ref::<SourceError>() {
        return match source {
            SourceError::NotFound(_) => 3,
            _ => 1,
        };
    }
    if let Some(remote) = err.downcast_ref::<RemoteError>() {
        return match remote {
            RemoteError::CloneFailed(_) => 3,
            _ => 1,
        };
    }
    1
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    xc_core::logging::init_logging("warn");

    match run(cli).await {
        Ok(()) => {}
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(exit_code_for(&err));
        }
    }
}
