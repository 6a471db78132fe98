use crate::aggregate::TickerAggregate;
use crate::config::{LARGE_CAP_MIN_PRICE, LONG_TERM_MIN_DAYS, SMALL_CAP_MAX_PRICE, ScanConfig};
use crate::models::{ScopeFilter, TradeRecord};
use crate::processor::ScoredTrade;
use chrono::{Duration, NaiveDate};

/// Apply the selected scope to the raw rows, before classification and
/// aggregation. Rows missing the field a scope inspects never match it.
pub fn apply_scope_filter(
    rows: Vec<TradeRecord>,
    config: &ScanConfig,
    today: NaiveDate,
) -> Vec<TradeRecord> {
    let horizon = today + Duration::days(LONG_TERM_MIN_DAYS);

    rows.into_iter()
        .filter(|row| match config.scope {
            ScopeFilter::FullMarket => true,
            ScopeFilter::SmallCap => row
                .stock_last
                .is_some_and(|p| p < SMALL_CAP_MAX_PRICE),
            ScopeFilter::MidCap => row
                .stock_last
                .is_some_and(|p| (SMALL_CAP_MAX_PRICE..=LARGE_CAP_MIN_PRICE).contains(&p)),
            ScopeFilter::LargeCap => row.stock_last.is_some_and(|p| p > LARGE_CAP_MIN_PRICE),
            ScopeFilter::LongTerm => row.expiration.is_some_and(|d| d >= horizon),
            ScopeFilter::Targeted => config.allowlist.iter().any(|s| s == &row.symbol),
        })
        .collect()
}

/// Stable descending sort by aggregate premium; first-seen order breaks ties.
pub fn rank_tickers(mut aggregates: Vec<TickerAggregate>) -> Vec<TickerAggregate> {
    aggregates.sort_by(|a, b| b.total_premium.total_cmp(&a.total_premium));
    aggregates
}

/// Composite priority for one trade, ascending: stealth tier dominates
/// (rank 1, most aggressive, first), premium breaks ties within a tier.
///
/// A single-float `rank * 1e6 + premium` composite cannot stay lexicographic
/// once premiums cross $1M, so the key is an explicit pair; premium is
/// negated cents so larger trades sort earlier.
pub fn priority_key(trade: &ScoredTrade) -> (u8, i64) {
    (trade.stealth_rank, -(trade.base.premium_value * 100.0) as i64)
}

/// Select the top-k trades for one ticker by priority order.
pub fn select_top_trades(ticker_trades: &[ScoredTrade], k: usize) -> Vec<ScoredTrade> {
    let mut sorted: Vec<ScoredTrade> = ticker_trades.to_vec();
    sorted.sort_by_key(priority_key);
    sorted.truncate(k);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContractType;
    use crate::processor::classify_trades;

    fn row(
        index: usize,
        symbol: &str,
        premium: f64,
        spread: Option<&str>,
        price: Option<f64>,
        expiration: Option<NaiveDate>,
    ) -> TradeRecord {
        TradeRecord {
            symbol: symbol.to_string(),
            stock_last: price,
            strike: "100".to_string(),
            contract_type: ContractType::Call,
            expiration,
            premium_text: String::new(),
            premium_value: premium,
            trade_spread: spread.map(str::to_string),
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
    fn test_cap_scope_boundaries_are_exclusive() {
        let config = |scope| ScanConfig { scope, ..ScanConfig::default() };
        let rows = || {
            vec![
                row(0, "AAA", 1.0, None, Some(20.0), None),
                row(1, "BBB", 1.0, None, Some(100.0), None),
                row(2, "CCC", 1.0, None, Some(19.99), None),
                row(3, "DDD", 1.0, None, Some(100.01), None),
                row(4, "EEE", 1.0, None, None, None),
            ]
        };

        let small = apply_scope_filter(rows(), &config(ScopeFilter::SmallCap), today());
        assert_eq!(symbols(&small), vec!["CCC"]);

        // Exactly 20 and exactly 100 both land in Mid Cap.
        let mid = apply_scope_filter(rows(), &config(ScopeFilter::MidCap), today());
        assert_eq!(symbols(&mid), vec!["AAA", "BBB"]);

        let large = apply_scope_filter(rows(), &config(ScopeFilter::LargeCap), today());
        assert_eq!(symbols(&large), vec!["DDD"]);
    }

    fn symbols(rows: &[TradeRecord]) -> Vec<&str> {
        rows.iter().map(|r| r.symbol.as_str()).collect()
    }

    #[test]
    fn test_long_term_scope_uses_sixty_day_horizon() {
        let config = ScanConfig { scope: ScopeFilter::LongTerm, ..ScanConfig::default() };
        let rows = vec![
            row(0, "NEAR", 1.0, None, None, NaiveDate::from_ymd_opt(2026, 9, 1)),
            row(1, "SHORT", 1.0, None, None, NaiveDate::from_ymd_opt(2026, 10, 4)),
            // 2026-10-05 is exactly today + 60 days and counts as long term.
            row(2, "EDGE", 1.0, None, None, NaiveDate::from_ymd_opt(2026, 10, 5)),
            row(3, "FAR", 1.0, None, None, NaiveDate::from_ymd_opt(2027, 1, 15)),
            row(4, "NODATE", 1.0, None, None, None),
        ];

        let kept = apply_scope_filter(rows, &config, today());
        assert_eq!(symbols(&kept), vec!["EDGE", "FAR"]);
    }

    #[test]
    fn test_targeted_scope_matches_case_insensitively() {
        let config = ScanConfig {
            scope: ScopeFilter::Targeted,
            ..ScanConfig::default()
        }
        .with_allowlist("nvda, tsla");

        let rows = vec![
            row(0, "NVDA", 1.0, None, None, None),
            row(1, "TSLA", 1.0, None, None, None),
            row(2, "AAPL", 1.0, None, None, None),
        ];

        let kept = apply_scope_filter(rows, &config, today());
        assert_eq!(symbols(&kept), vec!["NVDA", "TSLA"]);
    }

    #[test]
    fn test_top_trades_prefer_aggressive_tier_over_premium() {
        let trades = classify_trades(vec![
            row(0, "AAA", 2_000_000.0, Some("Askish"), None, None),
            row(1, "AAA", 500_000.0, Some("Above Ask"), None, None),
            row(2, "AAA", 900_000.0, Some("At Bid"), None, None),
            row(3, "AAA", 3_000_000.0, None, None, None),
        ]);

        let top = select_top_trades(&trades, 3);
        // Rank 1 beats the bigger rank-2 trade; the unranked row is last out.
        assert_eq!(top[0].base.row_index, 1);
        assert_eq!(top[1].base.row_index, 0);
        assert_eq!(top[2].base.row_index, 2);
    }

    #[test]
    fn test_top_trades_tiebreak_by_premium_within_tier() {
        let trades = classify_trades(vec![
            row(0, "AAA", 100_000.0, Some("Above Ask"), None, None),
            row(1, "AAA", 800_000.0, Some("Above Ask"), None, None),
        ]);

        let top = select_top_trades(&trades, 2);
        assert_eq!(top[0].base.row_index, 1);
        assert_eq!(top[1].base.row_index, 0);
    }

    #[test]
    fn test_ticker_ranking_is_stable_on_ties() {
        let trades = classify_trades(vec![
            row(0, "AAA", 1_000_000.0, None, None, None),
            row(1, "BBB", 1_000_000.0, None, None, None),
            row(2, "CCC", 2_000_000.0, None, None, None),
        ]);

        let ranked = rank_tickers(crate::aggregate::aggregate_by_ticker(&trades, 0.0));
        let order: Vec<&str> = ranked.iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(order, vec!["CCC", "AAA", "BBB"]);
    }
}
