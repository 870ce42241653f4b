//! `dsa analyze`: config -> provider -> engine -> report.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use dsa_backtest::{ScalpRequest, ScalpRun};
use dsa_config::{
    load_layered_yaml, report_unused_keys, AnalyzerSettings, LoadedConfig, ProviderSource,
    UnusedKeyPolicy,
};
use dsa_md::{CsvHistoryProvider, HistoryProvider, YahooChartProvider};
use dsa_report::{write_analysis, Analysis, ExportFormat, UNAVAILABLE_MESSAGE};

use super::{parse_alignment, parse_as_of, parse_format, parse_ranking};

pub struct AnalyzeArgs {
    pub ticker: String,
    pub max_days: Option<u32>,
    pub alignment: Option<String>,
    pub ranking: Option<String>,
    pub lookback_years: Option<u32>,
    pub config_paths: Vec<PathBuf>,
    pub strict_config: bool,
    pub prices_csv: Option<PathBuf>,
    pub dividends_csv: Option<PathBuf>,
    pub format: String,
    pub out: Option<PathBuf>,
    pub as_of: Option<String>,
}

pub async fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let ticker = args.ticker.trim().to_string();
    if ticker.is_empty() {
        anyhow::bail!("--ticker must not be empty");
    }
    let format = parse_format(&args.format)?;
    let as_of = parse_as_of(args.as_of.as_deref())?;

    let loaded = load_layered_yaml(&args.config_paths)?;
    let policy = if args.strict_config {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let unused = report_unused_keys(&loaded.config_json, policy)?;
    if !unused.is_clean() {
        tracing::warn!(
            count = unused.unused_leaf_pointers.len(),
            keys = ?unused.unused_leaf_pointers,
            "config contains keys the analyzer does not read"
        );
    }

    let settings = resolve_settings(&loaded, &args)?;
    let provider = build_provider(&settings)?;

    let req = ScalpRequest {
        ticker: ticker.clone(),
        as_of,
        window: settings.lookback(),
        price_field: settings.price_field()?,
    };
    let run = dsa_backtest::run(provider.as_ref(), &req, &settings.scalp_config())
        .await
        .with_context(|| format!("analyze failed for {}", ticker))?;

    print_header(&run, &loaded, &settings);

    let analysis = Analysis::build(
        ticker,
        &run.report,
        settings.report.ranking.rule(),
        settings.report.fallback_years,
    );

    let message_in_output = format == ExportFormat::Text && args.out.is_none();
    if analysis.is_unavailable() && !message_in_output {
        println!("{}", UNAVAILABLE_MESSAGE);
    }

    match &args.out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("create output failed: {}", path.display()))?;
            write_analysis(&analysis, format, BufWriter::new(file))
                .with_context(|| format!("write output failed: {}", path.display()))?;
            println!("out_path={}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            writeln!(lock)?;
            write_analysis(&analysis, format, &mut lock).context("write output failed")?;
        }
    }

    Ok(())
}

/// Config values first, then CLI flags on top.
fn resolve_settings(loaded: &LoadedConfig, args: &AnalyzeArgs) -> Result<AnalyzerSettings> {
    let mut settings = AnalyzerSettings::from_config_json(&loaded.config_json)?;

    if let Some(n) = args.max_days {
        settings.backtest.max_days = n;
    }
    if let Some(a) = &args.alignment {
        settings.backtest.alignment = parse_alignment(a)?;
    }
    if let Some(r) = &args.ranking {
        settings.report.ranking = parse_ranking(r)?;
    }
    if let Some(y) = args.lookback_years {
        settings.provider.lookback_years = y;
    }
    if let (Some(p), Some(d)) = (&args.prices_csv, &args.dividends_csv) {
        settings.provider.source = ProviderSource::Csv;
        settings.provider.prices_csv = Some(p.clone());
        settings.provider.dividends_csv = Some(d.clone());
    }

    settings.validate()?;
    Ok(settings)
}

fn build_provider(settings: &AnalyzerSettings) -> Result<Box<dyn HistoryProvider>> {
    let p = &settings.provider;
    match p.source {
        ProviderSource::Yahoo => {
            let yahoo = YahooChartProvider::new_with_base_url(p.base_url.clone(), settings.timeout())
                .context("yahoo provider init failed")?;
            Ok(Box::new(yahoo))
        }
        ProviderSource::Csv => {
            let (prices, dividends) = p
                .prices_csv
                .as_ref()
                .zip(p.dividends_csv.as_ref())
                .context("csv provider needs prices_csv and dividends_csv")?;
            Ok(Box::new(CsvHistoryProvider::new(prices, dividends)))
        }
    }
}

fn print_header(run: &ScalpRun, loaded: &LoadedConfig, settings: &AnalyzerSettings) {
    let d = &run.report.diagnostics;
    println!("ticker={}", run.ticker);
    println!("source={}", run.source);
    println!("window_start={} window_end={}", run.window_start, run.window_end);
    println!("config_hash={}", loaded.config_hash);
    println!(
        "max_days={} alignment={} ranking={}",
        settings.backtest.max_days,
        settings.backtest.alignment,
        settings.report.ranking.as_str()
    );
    println!("rows={}", run.report.records.len());
    println!(
        "events_seen={} events_aligned={} rolled_forward={} skipped_not_in_calendar={} skipped_no_prior_session={} truncated_events={}",
        d.events_seen,
        d.events_aligned,
        d.rolled_forward,
        d.skipped_not_in_calendar,
        d.skipped_no_prior_session,
        d.truncated_events
    );
    if let Some(q) = &run.quality {
        println!(
            "raw_closes={} null_closes_dropped={} duplicate_sessions_collapsed={} raw_dividends={}",
            q.raw_closes, q.null_closes_dropped, q.duplicate_sessions_collapsed, q.raw_dividends
        );
    }
    match &run.report.data_unavailable {
        Some(reason) => println!("data_unavailable=true reason=\"{}\"", reason),
        None => println!("data_unavailable=false"),
    }
}
