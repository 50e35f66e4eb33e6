use clap::{Parser, Subcommand};

mod commands;
mod notifier;

#[derive(Parser)]
#[command(name = "focusquest-cli", version, about = "FocusQuest CLI")]
struct Cli {
    /// User to act for (defaults to `default_user` from the config)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record finished pomodoros and tasks
    Activity {
        #[command(subcommand)]
        action: commands::activity::ActivityAction,
    },
    /// XP, level and title
    Progress {
        #[command(subcommand)]
        action: commands::progress::ProgressAction,
    },
    /// Achievement catalog and unlocks
    Achievements {
        #[command(subcommand)]
        action: commands::achievements::AchievementsAction,
    },
    /// Daily statistics and streaks
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// User data management
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable.
    let log_level = if cli.verbose { "debug" } else { "warn" };
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new(log_level)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let user = cli.user.as_deref();
    let result = match cli.command {
        Commands::Activity { action } => commands::activity::run(action, user),
        Commands::Progress { action } => commands::progress::run(action, user),
        Commands::Achievements { action } => commands::achievements::run(action, user),
        Commands::Stats { action } => commands::stats::run(action, user),
        Commands::Config { action } => commands::config::run(action),
        Commands::Data { action } => commands::data::run(action, user),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
