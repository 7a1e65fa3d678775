mod activate;
mod config;
mod run;
mod status;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "autoblock",
    about = "Schedule automatic start and stop of SelfControl"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the schedule config file if needed and open it in an editor
    Config,
    /// Compile the schedule and (re)install the launchd job that drives it
    Activate,
    /// Remove the installed launchd job; a running block keeps running
    Deactivate,
    /// Evaluate the schedule right now; launchd fires this at every trigger
    #[command(hide = true)]
    Run,
    /// Show the compiled triggers and whether a block covers this instant
    Status,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config => config::run_config(),
        Commands::Activate => activate::run_activate(),
        Commands::Deactivate => activate::run_deactivate(),
        Commands::Run => run::run_now(),
        Commands::Status => status::run_status(),
    }
}
