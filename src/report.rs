use crate::processor::ScoredTrade;
use crate::scan::ScanOutcome;
use std::collections::HashMap;

/// Markers for the top trades, keyed by position in the selected list.
pub const TRADE_MARKERS: [&str; 3] = ["🏆", "🔥", "⚡"];

/// Format a dollar amount back into flow shorthand: "$2.6M", "$500K", "$750".
pub fn format_premium(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();

    if magnitude >= 1_000_000.0 {
        format!("{}${}M", sign, trim_decimal(magnitude / 1_000_000.0))
    } else if magnitude >= 1_000.0 {
        format!("{}${}K", sign, trim_decimal(magnitude / 1_000.0))
    } else {
        format!("{}${}", sign, trim_decimal(magnitude))
    }
}

fn trim_decimal(value: f64) -> String {
    let text = format!("{:.1}", value);
    text.strip_suffix(".0").map(str::to_string).unwrap_or(text)
}

/// One display line for a selected trade: strike, type, expiration, spread,
/// formatted premium.
pub fn trade_line(trade: &ScoredTrade) -> String {
    let expiry = trade
        .base
        .expiration
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "no expiry".to_string());
    let spread = trade.base.trade_spread.as_deref().unwrap_or("Unranked");

    format!(
        "{} {} {} {} {}",
        trade.base.strike,
        trade.base.contract_type.label(),
        expiry,
        spread,
        format_premium(trade.base.premium_value),
    )
}

/// Render the full plain-text report.
///
/// `narratives` maps symbol to its summary paragraph; a missing entry renders
/// the section without one.
pub fn render_report(outcome: &ScanOutcome, narratives: &HashMap<String, String>) -> String {
    let mut text = String::new();

    text.push_str("# OMEN Smart Money Scanner\n\n");

    for section in &outcome.sections {
        let agg = &section.aggregate;

        // Header: symbol, cap bucket, representative price.
        let header = match agg.stock_price {
            Some(price) => format!("{} - {} (${:.2})", agg.symbol, agg.cap_bucket.label(), price),
            None => format!("{} - {}", agg.symbol, agg.cap_bucket.label()),
        };
        text.push_str(&format!("## {}\n", header));

        text.push_str(&format!("Total Premium: {}\n", format_premium(agg.total_premium)));
        text.push_str(&format!("Trade Type: {}\n", agg.trade_type));
        text.push_str(&format!("Sentiment: {}\n", agg.bias.label()));
        text.push_str(&format!("Stealth: {}\n", agg.stealth_summary));
        text.push_str(&format!("Alerts: {}\n", agg.alert));

        text.push_str("\nTop Trades:\n");
        for (position, trade) in section.top_trades.iter().enumerate() {
            let marker = TRADE_MARKERS[position % TRADE_MARKERS.len()];
            text.push_str(&format!("  {} {}\n", marker, trade_line(trade)));
        }

        if let Some(narrative) = narratives.get(&agg.symbol) {
            text.push_str(&format!("\n{}\n", narrative));
        }
        text.push('\n');
    }

    text.push_str(&format!("Overall Verdict: {}\n", outcome.verdict.label()));
    text
}

/// Machine-readable dump of the same outcome.
pub fn render_json(outcome: &ScanOutcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(outcome)
}
