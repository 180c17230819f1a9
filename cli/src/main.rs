use bosswatch_cli::{commands, logging};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bosswatch", version, about = "Boss spawn data sync client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch current spawn snapshots and print a per-map summary
    Fetch {
        /// Bypass the cache and re-fetch even when fresh
        #[arg(short, long)]
        force: bool,
    },
    /// Diff the previous snapshot against the current cached one
    Diff {
        /// Submit resulting records to the change log store
        #[arg(long)]
        submit: bool,
    },
    /// Print the change feed, newest first
    Changes {
        /// Only records strictly after this epoch-millis cursor
        #[arg(long)]
        since: Option<i64>,
    },
    /// Periodically refresh, diff, and submit detected changes
    Watch {
        /// Seconds between refresh attempts (minimum 30)
        #[arg(short, long, default_value_t = 300)]
        interval: u64,
    },
    /// Print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let _guard = logging::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fetch { force } => commands::fetch(force).await,
        Commands::Diff { submit } => commands::diff(submit).await,
        Commands::Changes { since } => commands::changes(since).await,
        Commands::Watch { interval } => commands::watch(interval).await,
        Commands::Config => commands::show_config(),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::ExitCode::FAILURE
        }
    }
}
