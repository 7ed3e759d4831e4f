use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "workout-cli", version, about = "Workout Exporter CLI")]
struct Cli {
    /// Fixed UTC offset for day boundaries and timestamps (e.g. +08:00).
    /// Overrides the configured time zone.
    #[arg(long, global = true, allow_hyphen_values = true)]
    utc_offset: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export workouts to CSV
    Export(commands::export::ExportArgs),
    /// Build the activity heatmap
    Heatmap(commands::heatmap::HeatmapArgs),
    /// Print the export label for an activity code or name
    Classify {
        /// Raw activity code (e.g. 37) or label (e.g. running)
        value: String,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("workout_core=debug,workout_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let offset = cli.utc_offset.as_deref();
    let result = match cli.command {
        Commands::Export(args) => commands::export::run(args, offset),
        Commands::Heatmap(args) => commands::heatmap::run(args, offset),
        Commands::Classify { value } => commands::classify::run(&value),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
