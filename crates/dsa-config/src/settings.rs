//! Typed analyzer settings read from the merged config JSON.
//!
//! Every field has a default, so an empty config is valid. Unknown keys inside
//! a known section are rejected here; unknown top-level sections are left to
//! [`crate::report_unused_keys`].

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use dsa_backtest::{AlignmentPolicy, ScalpConfig, DEFAULT_MAX_DAYS};
use dsa_md::{LookbackWindow, PriceField, YAHOO_BASE_URL};
use dsa_report::{RankingKind, DEFAULT_FALLBACK_YEARS};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    pub backtest: BacktestSettings,
    pub provider: ProviderSettings,
    pub report: ReportSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BacktestSettings {
    pub max_days: u32,
    pub alignment: AlignmentPolicy,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            max_days: DEFAULT_MAX_DAYS,
            alignment: AlignmentPolicy::Strict,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderSource {
    #[default]
    Yahoo,
    Csv,
}

impl ProviderSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderSource::Yahoo => "yahoo",
            ProviderSource::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderSettings {
    pub source: ProviderSource,
    pub base_url: String,
    pub lookback_years: u32,
    /// `close` or `adj_close`.
    pub price_field: String,
    pub timeout_secs: u64,
    /// Required when `source: csv`.
    pub prices_csv: Option<PathBuf>,
    pub dividends_csv: Option<PathBuf>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            source: ProviderSource::Yahoo,
            base_url: YAHOO_BASE_URL.to_string(),
            lookback_years: 5,
            price_field: PriceField::AdjClose.as_str().to_string(),
            timeout_secs: 30,
            prices_csv: None,
            dividends_csv: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSettings {
    pub ranking: RankingKind,
    pub fallback_years: u32,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            ranking: RankingKind::MeanNetGain,
            fallback_years: DEFAULT_FALLBACK_YEARS,
        }
    }
}

impl AnalyzerSettings {
    /// Deserialize and validate. Missing sections and fields take defaults.
    pub fn from_config_json(config_json: &Value) -> Result<Self> {
        let settings: AnalyzerSettings = serde_json::from_value(config_json.clone())
            .context("invalid analyzer settings")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.backtest.max_days == 0 {
            bail!("backtest.max_days must be >= 1");
        }
        if self.provider.lookback_years == 0 {
            bail!("provider.lookback_years must be >= 1");
        }
        if self.provider.timeout_secs == 0 {
            bail!("provider.timeout_secs must be >= 1");
        }
        if self.report.fallback_years == 0 {
            bail!("report.fallback_years must be >= 1");
        }
        self.price_field()?;
        if self.provider.source == ProviderSource::Csv
            && (self.provider.prices_csv.is_none() || self.provider.dividends_csv.is_none())
        {
            bail!("provider.source=csv requires provider.prices_csv and provider.dividends_csv");
        }
        Ok(())
    }

    pub fn scalp_config(&self) -> ScalpConfig {
        ScalpConfig {
            max_days: self.backtest.max_days,
            alignment: self.backtest.alignment,
        }
    }

    pub fn price_field(&self) -> Result<PriceField> {
        PriceField::parse(&self.provider.price_field).context("invalid provider.price_field")
    }

    pub fn lookback(&self) -> LookbackWindow {
        LookbackWindow::new(self.provider.lookback_years)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }
}
