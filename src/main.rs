use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxform::core::CurrencyCode;
use fxform::core::conversion::DEFAULT_AMOUNT;
use fxform::core::log::init_logging;

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

impl From<Commands> for fxform::AppCommand {
    fn from(cmd: Commands) -> fxform::AppCommand {
        match cmd {
            Commands::Serve { bind } => fxform::AppCommand::Serve { bind },
            Commands::Convert { currency, amount } => {
                fxform::AppCommand::Convert { currency, amount }
            }
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Serve the conversion form over HTTP
    Serve {
        /// Address to listen on, overrides the configured one
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Convert a USD amount in the terminal
    Convert {
        /// Target currency (CNY or JPY)
        #[arg(long)]
        currency: CurrencyCode,
        /// Amount in USD
        #[arg(long, default_value_t = DEFAULT_AMOUNT, allow_negative_numbers = true)]
        amount: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let serving = matches!(cli.command, Some(Commands::Serve { .. }));
    init_logging(cli.verbose, serving);

    let result = match cli.command {
        Some(Commands::Setup) => fxform::cli::setup::setup(),
        Some(cmd) => fxform::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
