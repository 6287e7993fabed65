use clap::{Parser, Subcommand};
use muriell_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "muriell-cli", version, about = "Muriell focus accountability CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reputation stats and mood
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Daily habits
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Record a violation reported by an external watcher
    Violation,
    /// Feed one activity classification into the session
    Observe {
        /// productive, wasted, neutral or nsfw
        status: muriell_core::ActivityStatus,
        /// Site the activity was seen on
        #[arg(long)]
        site: Option<String>,
    },
    /// Per-site usage log
    Usage,
    /// Accountability check-in
    Checkin {
        /// Keep running and check in on the configured interval
        #[arg(long)]
        watch: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_logging(&config);

    let result = match cli.command {
        Commands::Stats { action } => commands::stats::run(action, &config).await,
        Commands::Task { action } => commands::task::run(action, &config).await,
        Commands::Habit { action } => commands::habit::run(action, &config).await,
        Commands::Violation => commands::activity::violation(&config).await,
        Commands::Observe { status, site } => {
            commands::activity::observe(status, site, &config).await
        }
        Commands::Usage => commands::activity::usage(&config).await,
        Commands::Checkin { watch } => commands::checkin::run(watch, &config).await,
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
