use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "timetile-cli", version, about = "Timetile CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Activity log, stored as fragments
    Log {
        #[command(subcommand)]
        action: commands::log::LogAction,
    },
    /// Split one activity into fragments
    Fragment(commands::fragment::FragmentArgs),
    /// Tile a range into fixed-size intervals
    Partition(commands::partition::PartitionArgs),
    /// Render a range hour by hour into display blocks
    Render(commands::render::RenderArgs),
    /// Cut free time along a grid
    Empty(commands::empty::EmptyArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("TIMETILE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Log { action } => commands::log::run(action),
        Commands::Fragment(args) => commands::fragment::run(args),
        Commands::Partition(args) => commands::partition::run(args),
        Commands::Render(args) => commands::render::run(args),
        Commands::Empty(args) => commands::empty::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
