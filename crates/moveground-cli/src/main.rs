use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// Used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "warn,session=info,import=info";

#[derive(Parser)]
#[command(name = "moveground")]
#[command(about = "Moveground - build, format and share Move code through the playground service", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to <config dir>/moveground/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Build/format/share service URL, overriding the config file
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a Move file and print its output
    Build {
        file: PathBuf,
        /// Run the module's #[test] functions
        #[arg(long)]
        test: bool,
    },
    /// Format a Move file
    Format {
        file: PathBuf,
        /// Write the result back instead of printing it
        #[arg(long)]
        write: bool,
    },
    /// Share a Move file and print the links
    Share { file: PathBuf },
    /// Print the code a playground URL refers to (#fragment or ?share_id=)
    Import { url: String },
    /// Print the layout chosen for each container width
    Layout {
        #[arg(required = true, allow_negative_numbers = true)]
        widths: Vec<f64>,
    },
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let env = || commands::Environment::load(cli.config.as_deref(), cli.api_url.as_deref());

    match cli.command {
        Commands::Build { file, test } => commands::build::run(&env()?, &file, test).await?,
        Commands::Format { file, write } => commands::format::run(&env()?, &file, write).await?,
        Commands::Share { file } => commands::share::run(&env()?, &file).await?,
        Commands::Import { url } => commands::import::run(&env()?, &url).await?,
        Commands::Layout { widths } => commands::layout::run(&widths),
    }

    Ok(())
}
