use crate::config::{AGGRESSIVE_STEALTH_MAX_RANK, LARGE_TRADE_THRESHOLD, STEALTH_SENTINEL_RANK};
use crate::models::{ContractType, Sentiment, TradeRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fixed stealth-weight table; rank 1 is the most aggressive signal.
const STEALTH_TABLE: &[(&str, u8)] = &[
    ("above ask", 1),
    ("askish", 2),
    ("at bid", 3),
    ("bidish", 4),
];

/// Trade record enriched with per-row classification signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredTrade {
    #[serde(flatten)]
    pub base: TradeRecord,

    pub stealth_rank: u8,
    pub sentiment: Sentiment,
    pub is_sweep: bool,
    pub is_block: bool,
    pub is_large_trade: bool,
    pub is_repeater: bool,
    pub is_high_conviction: bool,
}

/// Classify every row.
///
/// The repeater signal needs the full row set, so contract groups are counted
/// in a pre-pass before the per-row mapping.
pub fn classify_trades(rows: Vec<TradeRecord>) -> Vec<ScoredTrade> {
    let group_counts = count_contract_groups(&rows);

    rows.into_iter()
        .map(|row| {
            let stealth = stealth_rank(row.trade_spread.as_deref());
            let sentiment = sentiment_from_spread(row.trade_spread.as_deref());
            let sweep = is_sweep(row.flags.as_deref());
            let block = is_block(row.flags.as_deref());
            let large = row.premium_value >= LARGE_TRADE_THRESHOLD;
            let repeater = group_counts
                .get(&contract_key(&row))
                .is_some_and(|&count| count >= 2);

            ScoredTrade {
                stealth_rank: stealth,
                sentiment,
                is_sweep: sweep,
                is_block: block,
                is_large_trade: large,
                is_repeater: repeater,
                is_high_conviction: large && stealth <= AGGRESSIVE_STEALTH_MAX_RANK && repeater,
                base: row,
            }
        })
        .collect()
}

/// Identity of one contract: same symbol, strike, expiration, and type.
pub type ContractKey = (String, String, Option<NaiveDate>, ContractType);

pub fn contract_key(row: &TradeRecord) -> ContractKey {
    (
        row.symbol.clone(),
        row.strike.clone(),
        row.expiration,
        row.contract_type,
    )
}

fn count_contract_groups(rows: &[TradeRecord]) -> HashMap<ContractKey, usize> {
    let mut counts = HashMap::new();
    for row in rows {
        *counts.entry(contract_key(row)).or_insert(0) += 1;
    }
    counts
}

/// Look up the stealth tier for a spread descriptor; unknown or missing → 99.
pub fn stealth_rank(spread: Option<&str>) -> u8 {
    let Some(text) = spread else {
        return STEALTH_SENTINEL_RANK;
    };
    let lowered = text.trim().to_lowercase();

    STEALTH_TABLE
        .iter()
        .find(|(label, _)| lowered == *label)
        .map(|&(_, rank)| rank)
        .unwrap_or(STEALTH_SENTINEL_RANK)
}

/// Keyword sentiment from the spread descriptor.
///
/// The specific labels are matched before the bare "ask" keyword so they are
/// not shadowed by it.
pub fn sentiment_from_spread(spread: Option<&str>) -> Sentiment {
    let Some(text) = spread else {
        return Sentiment::Neutral;
    };
    let lowered = text.to_lowercase();

    if lowered.contains("above ask") {
        Sentiment::AggressiveBullish
    } else if lowered.contains("bidish") {
        Sentiment::Bearish
    } else if lowered.contains("at bid") {
        Sentiment::AggressiveBearish
    } else if lowered.contains("ask") {
        Sentiment::Bullish
    } else {
        Sentiment::Neutral
    }
}

pub fn is_sweep(flags: Option<&str>) -> bool {
    flags.is_some_and(|f| f.to_lowercase().contains("sweep"))
}

pub fn is_block(flags: Option<&str>) -> bool {
    flags.is_some_and(|f| f.to_lowercase().contains("block"))
}
