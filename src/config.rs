use crate::models::{ScopeFilter, SummaryMode};
use std::time::Duration;

// -----------------------------------------------
// CLASSIFICATION THRESHOLDS
// -----------------------------------------------
/// Premium at or above this marks a large trade.
pub const LARGE_TRADE_THRESHOLD: f64 = 1_000_000.0;

/// Stealth rank assigned to spread text outside the known table (lowest priority).
pub const STEALTH_SENTINEL_RANK: u8 = 99;

/// Ranks counted as aggressive for the high-conviction flag (Above Ask, Askish).
pub const AGGRESSIVE_STEALTH_MAX_RANK: u8 = 2;

// -----------------------------------------------
// MARKET-CAP BANDS (row stock price, USD)
// -----------------------------------------------
pub const SMALL_CAP_MAX_PRICE: f64 = 20.0;
pub const LARGE_CAP_MIN_PRICE: f64 = 100.0;

// -----------------------------------------------
// SELECTION LIMITS
// -----------------------------------------------
pub const DEFAULT_TOP_TICKERS: usize = 3;
pub const LONG_TERM_TOP_TICKERS: usize = 5;
pub const TOP_TRADES_PER_TICKER: usize = 3;

/// Minimum days to expiration for the Long Term scope.
pub const LONG_TERM_MIN_DAYS: i64 = 60;

// -----------------------------------------------
// SUMMARY SERVICE
// -----------------------------------------------
pub const SUMMARY_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const SUMMARY_MODEL: &str = "gpt-4o-mini";
pub const SUMMARY_API_KEY_ENV: &str = "OMEN_API_KEY";

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

// -----------------------------------------------
// RETRY CONFIG
// -----------------------------------------------
pub const RETRY_BASE_DELAY_MS: u64 = 200;
pub const RETRY_FACTOR: u64 = 3;
pub const RETRY_MAX_DELAY_SECS: u64 = 5;
pub const RETRY_MAX_ATTEMPTS: usize = 2;

/// Options selected for one scan run.
///
/// The pipeline is a pure function of (rows, config, today); everything the
/// surface layer collects lands here instead of in ambient state.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub scope: ScopeFilter,
    /// Normalized ticker allowlist, only honored when scope is Targeted.
    pub allowlist: Vec<String>,
    pub summary_mode: SummaryMode,
    /// Fraction of total premium within which call/put sums count as Neutral.
    /// 0.0 keeps the two-way classification.
    pub neutral_margin: f64,
    pub trades_per_ticker: usize,
    /// Credential for the text-generation service (AI summary mode).
    pub api_key: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scope: ScopeFilter::FullMarket,
            allowlist: Vec::new(),
            summary_mode: SummaryMode::Standard,
            neutral_margin: 0.0,
            trades_per_ticker: TOP_TRADES_PER_TICKER,
            api_key: None,
        }
    }
}

impl ScanConfig {
    /// Number of tickers the report keeps for this scope.
    pub fn top_ticker_count(&self) -> usize {
        match self.scope {
            ScopeFilter::LongTerm => LONG_TERM_TOP_TICKERS,
            _ => DEFAULT_TOP_TICKERS,
        }
    }

    /// Parse a raw "nvda, tsla" allowlist string into normalized symbols.
    pub fn with_allowlist(mut self, raw: &str) -> Self {
        self.allowlist = raw
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }
}
