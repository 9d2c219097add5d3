use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use exch_rates::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for exch_rates::AppCommand {
    fn from(cmd: Commands) -> exch_rates::AppCommand {
        match cmd {
            Commands::Serve => exch_rates::AppCommand::Serve,
            Commands::Query { currency_code } => exch_rates::AppCommand::Query { currency_code },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Serve GET /exchangeRate/{currencyCode}
    Serve,
    /// Print the ratio of one currency to the base currency
    Query {
        /// Target currency code, e.g. EUR
        currency_code: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => exch_rates::cli::setup::setup(),
        Some(cmd) => exch_rates::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
