use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::analyze::AnalyzeArgs;

#[derive(Parser)]
#[command(name = "dsa")]
#[command(about = "Dividend scalping analyzer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest buy-before-ex-date / sell-N-sessions-after for one ticker
    Analyze {
        /// Ticker symbol (passed to the provider as-is)
        #[arg(long)]
        ticker: String,

        /// Longest holding period to simulate, in sessions from the ex session
        #[arg(long)]
        max_days: Option<u32>,

        /// Ex-date alignment policy (strict | forward-roll)
        #[arg(long)]
        alignment: Option<String>,

        /// Ranking rule for the optimal day (mean_net_gain | median_net_gain | cumulative_net_gain)
        #[arg(long)]
        ranking: Option<String>,

        /// Lookback window in years
        #[arg(long)]
        lookback_years: Option<u32>,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<PathBuf>,

        /// Fail instead of warning on config keys the analyzer does not read
        #[arg(long, default_value_t = false)]
        strict_config: bool,

        /// Price CSV (date,close). Selects the CSV provider.
        #[arg(long, requires = "dividends_csv")]
        prices_csv: Option<PathBuf>,

        /// Dividend CSV (date,amount). Selects the CSV provider.
        #[arg(long, requires = "prices_csv")]
        dividends_csv: Option<PathBuf>,

        /// Output format (text | json | csv)
        #[arg(long, default_value = "text")]
        format: String,

        /// Write the rendered output here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Last date of the lookback window (YYYY-MM-DD). Defaults to today (UTC).
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> overrides)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn init_tracing() {
    // stdout carries the command output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Analyze {
            ticker,
            max_days,
            alignment,
            ranking,
            lookback_years,
            config_paths,
            strict_config,
            prices_csv,
            dividends_csv,
            format,
            out,
            as_of,
        } => {
            commands::analyze::run_analyze(AnalyzeArgs {
                ticker,
                max_days,
                alignment,
                ranking,
                lookback_years,
                config_paths,
                strict_config,
                prices_csv,
                dividends_csv,
                format,
                out,
                as_of,
            })
            .await?;
        }

        Commands::ConfigHash { paths } => {
            let loaded = dsa_config::load_layered_yaml(&paths)?;
            let unused =
                dsa_config::report_unused_keys(&loaded.config_json, dsa_config::UnusedKeyPolicy::Warn)?;
            println!("config_hash={}", loaded.config_hash);
            println!("unused_keys={}", unused.unused_leaf_pointers.len());
            println!("{}", loaded.canonical_json);
        }
    }

    Ok(())
}
