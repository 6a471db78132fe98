use crate::config::{LARGE_CAP_MIN_PRICE, SMALL_CAP_MAX_PRICE};
use crate::models::{CapBucket, ContractType, Sentiment};
use crate::processor::ScoredTrade;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-ticker rollup of the classified rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerAggregate {
    pub symbol: String,
    pub total_premium: f64,
    /// First non-null stock price observed in original row order.
    pub stock_price: Option<f64>,
    pub cap_bucket: CapBucket,
    /// "Sweep" if any row was sweep-flagged, else "Block Trade".
    pub trade_type: String,
    /// Distinct spread descriptors holding the ticker's best stealth rank,
    /// ordered by summed premium descending.
    pub stealth_summary: String,
    pub alert: String,
    pub bias: Sentiment,
    /// Index of the ticker's first row, used for stable tie-breaks.
    pub first_seen: usize,
}

/// Group classified rows by symbol, in first-seen order.
pub fn aggregate_by_ticker(trades: &[ScoredTrade], neutral_margin: f64) -> Vec<TickerAggregate> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&ScoredTrade>> = HashMap::new();

    for trade in trades {
        let symbol = trade.base.symbol.as_str();
        if !groups.contains_key(symbol) {
            order.push(symbol);
        }
        groups.entry(symbol).or_default().push(trade);
    }

    order
        .into_iter()
        .map(|symbol| build_aggregate(symbol, &groups[symbol], neutral_margin))
        .collect()
}

fn build_aggregate(symbol: &str, rows: &[&ScoredTrade], neutral_margin: f64) -> TickerAggregate {
    let total_premium: f64 = rows.iter().map(|t| t.base.premium_value).sum();
    let stock_price = rows.iter().find_map(|t| t.base.stock_last);
    let trade_type = if rows.iter().any(|t| t.is_sweep) {
        "Sweep".to_string()
    } else {
        "Block Trade".to_string()
    };

    TickerAggregate {
        symbol: symbol.to_string(),
        total_premium,
        stock_price,
        cap_bucket: cap_bucket(stock_price),
        trade_type,
        stealth_summary: stealth_summary(rows),
        alert: alert_label(rows),
        bias: bias_of(rows, neutral_margin),
        first_seen: rows.iter().map(|t| t.base.row_index).min().unwrap_or(0),
    }
}

/// Market-cap bucket from the representative stock price.
pub fn cap_bucket(price: Option<f64>) -> CapBucket {
    match price {
        Some(p) if p < SMALL_CAP_MAX_PRICE => CapBucket::Small,
        Some(p) if p > LARGE_CAP_MIN_PRICE => CapBucket::Large,
        Some(_) => CapBucket::Mid,
        None => CapBucket::Unknown,
    }
}

/// Distinct spread strings at the ticker's best (lowest) stealth rank,
/// joined by comma in descending order of each spread's summed premium.
fn stealth_summary(rows: &[&ScoredTrade]) -> String {
    // (first-seen order preserved for deterministic output on premium ties)
    let mut spreads: Vec<(String, u8, f64)> = Vec::new();
    for trade in rows {
        let Some(spread) = trade.base.trade_spread.as_deref() else {
            continue;
        };
        match spreads.iter_mut().find(|(text, _, _)| text == spread) {
            Some((_, _, premium)) => *premium += trade.base.premium_value,
            None => spreads.push((spread.to_string(), trade.stealth_rank, trade.base.premium_value)),
        }
    }

    let Some(best_rank) = spreads.iter().map(|&(_, rank, _)| rank).min() else {
        return "None".to_string();
    };

    let mut top: Vec<(String, f64)> = spreads
        .into_iter()
        .filter(|&(_, rank, _)| rank == best_rank)
        .map(|(text, _, premium)| (text, premium))
        .collect();
    top.sort_by(|a, b| b.1.total_cmp(&a.1));

    top.into_iter()
        .map(|(text, _)| text)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Alert label by priority: High Conviction > Large Trade > Repeater > None.
fn alert_label(rows: &[&ScoredTrade]) -> String {
    if rows.iter().any(|t| t.is_high_conviction) {
        return "High Conviction".to_string();
    }
    if rows.iter().any(|t| t.is_large_trade) {
        return "Large Trade".to_string();
    }

    // Cite the repeater group with the highest summed premium.
    // (first-seen order so premium ties resolve deterministically)
    let mut repeat_groups: Vec<((&str, Option<chrono::NaiveDate>), f64)> = Vec::new();
    for trade in rows.iter().filter(|t| t.is_repeater) {
        let key = (trade.base.strike.as_str(), trade.base.expiration);
        match repeat_groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, premium)) => *premium += trade.base.premium_value,
            None => repeat_groups.push((key, trade.base.premium_value)),
        }
    }

    let top = repeat_groups
        .into_iter()
        .reduce(|best, next| if next.1 > best.1 { next } else { best });

    match top {
        Some(((strike, expiration), _)) => {
            let expiry = expiration
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "unknown expiry".to_string());
            format!("Repeater {} {}", strike, expiry)
        }
        None => "None".to_string(),
    }
}

fn bias_of(rows: &[&ScoredTrade], neutral_margin: f64) -> Sentiment {
    let call_sum: f64 = premium_sum(rows, ContractType::Call);
    let put_sum: f64 = premium_sum(rows, ContractType::Put);
    classify_bias(call_sum, put_sum, neutral_margin)
}

/// Overall bullish/bearish verdict over a set of classified rows.
pub fn overall_bias(trades: &[ScoredTrade], neutral_margin: f64) -> Sentiment {
    let refs: Vec<&ScoredTrade> = trades.iter().collect();
    bias_of(&refs, neutral_margin)
}

fn premium_sum(rows: &[&ScoredTrade], side: ContractType) -> f64 {
    rows.iter()
        .filter(|t| t.base.contract_type == side)
        .map(|t| t.base.premium_value)
        .sum()
}

fn classify_bias(call_sum: f64, put_sum: f64, neutral_margin: f64) -> Sentiment {
    let total = call_sum + put_sum;
    if neutral_margin > 0.0 && total > 0.0 && (call_sum - put_sum).abs() <= neutral_margin * total {
        return Sentiment::Neutral;
    }
    if call_sum >= put_sum {
        Sentiment::Bullish
    } else {
        Sentiment::Bearish
    }
}
