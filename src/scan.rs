use crate::aggregate::{TickerAggregate, aggregate_by_ticker, overall_bias};
use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::models::{Sentiment, TradeRecord};
use crate::processor::{ScoredTrade, classify_trades};
use crate::rank::{apply_scope_filter, rank_tickers, select_top_trades};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// One selected ticker with its top trades, in report order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerSection {
    pub aggregate: TickerAggregate,
    pub top_trades: Vec<ScoredTrade>,
}

/// Counters for what the pipeline kept and dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub rows_scanned: usize,
    pub rows_after_filter: usize,
    pub tickers_seen: usize,
    pub tickers_selected: usize,
}

/// The ranked result of one scan run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub sections: Vec<TickerSection>,
    /// Overall call/put bias across every row that survived the filter.
    pub verdict: Sentiment,
    pub diagnostics: Diagnostics,
}

/// Run the full scoring pipeline.
///
/// Pure function of (rows, config, today): scope filter, per-row
/// classification, per-ticker aggregation, ranking, top-trade selection.
/// An empty post-filter set aborts the run; no partial report is produced.
pub fn run_scan(
    rows: Vec<TradeRecord>,
    config: &ScanConfig,
    today: NaiveDate,
) -> Result<ScanOutcome, ScanError> {
    let rows_scanned = rows.len();

    let filtered = apply_scope_filter(rows, config, today);
    if filtered.is_empty() {
        return Err(ScanError::NoRows(format!(
            "no trades match the {} scope",
            config.scope.label()
        )));
    }
    let rows_after_filter = filtered.len();

    let trades = classify_trades(filtered);
    let verdict = overall_bias(&trades, config.neutral_margin);

    let aggregates = aggregate_by_ticker(&trades, config.neutral_margin);
    let tickers_seen = aggregates.len();

    let mut ranked = rank_tickers(aggregates);
    ranked.truncate(config.top_ticker_count());

    let sections: Vec<TickerSection> = ranked
        .into_iter()
        .map(|aggregate| {
            let ticker_trades: Vec<ScoredTrade> = trades
                .iter()
                .filter(|t| t.base.symbol == aggregate.symbol)
                .cloned()
                .collect();
            let top_trades = select_top_trades(&ticker_trades, config.trades_per_ticker);
            TickerSection { aggregate, top_trades }
        })
        .collect();

    info!(
        rows_scanned,
        rows_after_filter,
        tickers_seen,
        tickers_selected = sections.len(),
        "scan complete"
    );

    Ok(ScanOutcome {
        diagnostics: Diagnostics {
            rows_scanned,
            rows_after_filter,
            tickers_seen,
            tickers_selected: sections.len(),
        },
        sections,
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContractType, ScopeFilter};

    fn row(index: usize, symbol: &str, premium: f64) -> TradeRecord {
        TradeRecord {
            symbol: symbol.to_string(),
            stock_last: Some(50.0),
            strike: "100".to_string(),
            contract_type: ContractType::Call,
            expiration: NaiveDate::from_ymd_opt(2026, 1, 16),
            premium_text: String::new(),
            premium_value: premium,
            trade_spread: Some("Above Ask".to_string()),
            flags: None,
            alerts: None,
            trade_size: None,
            open_interest: None,
            row_index: index,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
    }

    #[test]
    fn test_scan_ranks_by_aggregate_premium() {
        let rows = vec![
            row(0, "AAA", 2_000_000.0),
            row(1, "AAA", 500_000.0),
            row(2, "AAA", 100_000.0),
            row(3, "BBB", 1_000_000.0),
            row(4, "BBB", 1_000_000.0),
        ];

        let outcome = run_scan(rows, &ScanConfig::default(), today()).unwrap();
        let order: Vec<&str> = outcome
            .sections
            .iter()
            .map(|s| s.aggregate.symbol.as_str())
            .collect();
        assert_eq!(order, vec!["AAA", "BBB"]);
        assert_eq!(outcome.sections[0].aggregate.total_premium, 2_600_000.0);
        assert_eq!(outcome.sections[1].aggregate.total_premium, 2_000_000.0);

        // AAA's biggest trade leads its top list.
        assert_eq!(outcome.sections[0].top_trades[0].base.row_index, 0);
    }

    #[test]
    fn test_scan_is_deterministic() {
        let rows = || {
            vec![
                row(0, "AAA", 1_000_000.0),
                row(1, "BBB", 1_000_000.0),
                row(2, "CCC", 1_000_000.0),
                row(3, "DDD", 900_000.0),
            ]
        };

        let first = run_scan(rows(), &ScanConfig::default(), today()).unwrap();
        let second = run_scan(rows(), &ScanConfig::default(), today()).unwrap();

        let order = |o: &ScanOutcome| -> Vec<String> {
            o.sections.iter().map(|s| s.aggregate.symbol.clone()).collect()
        };
        assert_eq!(order(&first), order(&second));
        assert_eq!(order(&first), vec!["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn test_empty_filter_result_aborts() {
        let config = ScanConfig {
            scope: ScopeFilter::Targeted,
            ..ScanConfig::default()
        }
        .with_allowlist("ZZZZ");

        let err = run_scan(vec![row(0, "AAA", 1.0)], &config, today()).unwrap_err();
        assert!(matches!(err, ScanError::NoRows(_)));
    }
}
