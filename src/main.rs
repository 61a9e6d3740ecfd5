use anyhow::Result;
use clap::{Parser, Subcommand};
use fxconv::core::log::init_logging;

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

impl From<Commands> for fxconv::AppCommand {
    fn from(cmd: Commands) -> fxconv::AppCommand {
        match cmd {
            Commands::Convert { from, to, amount } => {
                fxconv::AppCommand::Convert { from, to, amount }
            }
            Commands::Currencies => fxconv::AppCommand::Currencies,
            Commands::Rates { base } => fxconv::AppCommand::Rates { base },
            Commands::Interactive => fxconv::AppCommand::Interactive,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between two currencies
    Convert {
        /// Source currency code, e.g. USD
        from: String,
        /// Target currency code, e.g. EUR
        to: String,
        /// Amount to convert
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },
    /// List supported currencies
    Currencies,
    /// Show all rates for a base currency
    Rates {
        #[arg(default_value = "USD")]
        base: String,
    },
    /// Start the interactive menu (default)
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxconv::cli::setup::setup(),
        Some(cmd) => fxconv::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            fxconv::run_command(fxconv::AppCommand::Interactive, cli.config_path.as_deref()).await
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
