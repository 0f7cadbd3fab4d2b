use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use trendwatch_api::{AppConfig, AppState, ProviderKind};
use trendwatch_core::AliasTable;
use trendwatch_engine::TrendOutcome;

#[derive(Parser)]
#[command(name = "trendwatch")]
#[command(about = "Daily and weekly 21-period moving average streaks for market tickers")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Path to a TOML config file
    #[arg(short, long, env = "TRENDWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Read history from `{symbol}_{daily|weekly}.csv` files in this directory
    /// instead of Yahoo Finance
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long, env = "HOST")]
        host: Option<String>,

        /// Listening port
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Origin allowed to call /api/* (repeatable, or comma-separated)
        #[arg(long = "origin", env = "TRENDWATCH_ALLOWED_ORIGINS", value_delimiter = ',')]
        origins: Vec<String>,

        /// Answer 422/502 for failures instead of always 200
        #[arg(long)]
        strict_status: bool,
    },

    /// Evaluate tickers once and print their streaks
    Check {
        /// Ticker aliases or provider symbols (e.g. SPX, Bitcoin, GME).
        /// Every alias in the table when omitted.
        names: Vec<String>,
    },

    /// List the alias table
    Aliases,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    match cli.log_format {
        LogFormat::Text => fmt().with_env_filter(filter).with_target(false).init(),
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init(),
    }

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.provider.kind = ProviderKind::Csv;
        config.provider.data_dir = dir;
    }

    match cli.command {
        Commands::Serve {
            host,
            port,
            origins,
            strict_status,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let origins: Vec<String> = origins
                .into_iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
            if !origins.is_empty() {
                config.server.allowed_origins = origins;
            }
            config.server.strict_status |= strict_status;
            config.validate()?;

            trendwatch_api::start_server(&config).await?;
        }
        Commands::Check { names } => {
            check_tickers(&config, names).await?;
        }
        Commands::Aliases => {
            let state = AppState::from_config(&config)?;
            println!("{:<12} SYMBOL", "ALIAS");
            for (alias, symbol) in state.aliases.iter() {
                println!("{:<12} {}", alias, symbol);
            }
        }
    }

    Ok(())
}

/// Names given on the command line, or every alias when none were.
fn tickers_to_check(names: Vec<String>, aliases: &AliasTable) -> Vec<String> {
    if !names.is_empty() {
        return names;
    }
    aliases.iter().map(|(alias, _)| alias.to_string()).collect()
}

async fn check_tickers(config: &AppConfig, names: Vec<String>) -> Result<()> {
    let state = AppState::from_config(config)?;
    let names = tickers_to_check(names, &state.aliases);
    if names.is_empty() {
        anyhow::bail!("No tickers to check");
    }
    tracing::info!(
        provider = state.evaluator.provider_name(),
        tickers = names.len(),
        "Checking tickers"
    );

    let sep = "=".repeat(60);
    println!("\n{sep}");
    println!(
        "  {:<12} {:<12} {:>10} {:>11}",
        "TICKER", "SYMBOL", "DAYS", "WEEKS"
    );
    println!("{sep}");

    let mut failures = 0usize;
    for name in &names {
        let symbol = state.aliases.resolve(name);
        match state.evaluator.evaluate(symbol).await {
            TrendOutcome::Success(report) => println!(
                "  {:<12} {:<12} {:>+10} {:>+11}",
                name, symbol, report.days_above, report.weeks_above
            ),
            TrendOutcome::Failure(failure) => {
                failures += 1;
                println!("  {:<12} {:<12} {}", name, symbol, failure.message);
            }
        }
    }
    println!("{sep}\n");

    if failures == names.len() {
        anyhow::bail!("No valid data received for any ticker");
    }
    Ok(())
}
