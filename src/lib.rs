pub mod aggregate;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod processor;
pub mod rank;
pub mod report;
pub mod scan;
pub mod summary;

// Re-exports for convenience
pub use aggregate::{TickerAggregate, aggregate_by_ticker, overall_bias};
pub use config::ScanConfig;
pub use error::ScanError;
pub use ingest::{IngestResult, read_trades};
pub use models::{CapBucket, ContractType, ScopeFilter, Sentiment, SummaryMode, TradeRecord};
pub use processor::{ScoredTrade, classify_trades, sentiment_from_spread, stealth_rank};
pub use rank::{apply_scope_filter, rank_tickers, select_top_trades};
pub use report::{format_premium, render_json, render_report};
pub use scan::{Diagnostics, ScanOutcome, TickerSection, run_scan};
pub use summary::{SummaryClient, fallback_summary};
