use crate::config::{
    self, HTTP_TIMEOUT, RETRY_BASE_DELAY_MS, RETRY_FACTOR, RETRY_MAX_ATTEMPTS,
    RETRY_MAX_DELAY_SECS, ScanConfig,
};
use crate::models::SummaryMode;
use crate::report::{format_premium, trade_line};
use crate::scan::TickerSection;
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::warn;

// -----------------------------------------------
// NARRATIVE CLIENT
// -----------------------------------------------
/// Client for the optional AI-authored ticker narrative.
///
/// Failure is never a run-level failure: any HTTP error, timeout, or
/// malformed response degrades to the deterministic template.
pub struct SummaryClient {
    client: Client,
    mode: SummaryMode,
    api_key: Option<String>,
}

impl SummaryClient {
    pub fn new(config: &ScanConfig) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(HTTP_TIMEOUT)
                .build()
                .context("Failed to build summary HTTP client")?,
            mode: config.summary_mode,
            api_key: config.api_key.clone(),
        })
    }

    /// Produce the narrative paragraph for one ticker section.
    pub async fn narrative(&self, section: &TickerSection) -> String {
        let key = match (self.mode, self.api_key.as_deref()) {
            (SummaryMode::Standard, _) => return fallback_summary(section),
            (SummaryMode::Ai, None) => {
                warn!(
                    symbol = %section.aggregate.symbol,
                    "AI summary requested without an API key, using template"
                );
                return fallback_summary(section);
            }
            (SummaryMode::Ai, Some(key)) => key,
        };

        match self.generate(section, key).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    symbol = %section.aggregate.symbol,
                    error = %e,
                    "summary generation failed, using template"
                );
                fallback_summary(section)
            }
        }
    }

    async fn generate(&self, section: &TickerSection, api_key: &str) -> Result<String> {
        let prompt = build_prompt(section);

        let backoff = ExponentialBackoff::from_millis(RETRY_BASE_DELAY_MS)
            .factor(RETRY_FACTOR)
            .max_delay(Duration::from_secs(RETRY_MAX_DELAY_SECS))
            .take(RETRY_MAX_ATTEMPTS);

        Retry::spawn(backoff, || async {
            let res = self
                .client
                .post(config::SUMMARY_API_URL)
                .bearer_auth(api_key)
                .json(&serde_json::json!({
                    "model": config::SUMMARY_MODEL,
                    "messages": [{ "role": "user", "content": prompt.as_str() }],
                    "max_tokens": 200,
                }))
                .send()
                .await
                .context("Request send failed")?;

            let status = res.status();
            if !status.is_success() {
                let body = res.text().await.unwrap_or_default();
                let preview: String = body.chars().take(200).collect();
                anyhow::bail!("Summary service error {}: {}", status, preview);
            }

            let body: serde_json::Value = res.json().await.context("Failed to read body")?;
            body["choices"][0]["message"]["content"]
                .as_str()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| anyhow::anyhow!("Summary response had no content"))
        })
        .await
    }
}

/// Structured prompt for the text-generation service.
fn build_prompt(section: &TickerSection) -> String {
    let agg = &section.aggregate;
    let trades: Vec<String> = section
        .top_trades
        .iter()
        .map(|t| format!("- {}", trade_line(t)))
        .collect();

    format!(
        "Write a two-sentence options-flow note for {symbol}.\n\
         Trade type: {trade_type}. Sentiment: {bias}. Stealth: {stealth}. \
         Alerts: {alert}. Total premium: {premium}.\n\
         Top trades:\n{trades}",
        symbol = agg.symbol,
        trade_type = agg.trade_type,
        bias = agg.bias.label(),
        stealth = agg.stealth_summary,
        alert = agg.alert,
        premium = format_premium(agg.total_premium),
        trades = trades.join("\n"),
    )
}

/// Deterministic template used in Standard mode and whenever the service
/// call degrades.
pub fn fallback_summary(section: &TickerSection) -> String {
    let agg = &section.aggregate;
    let alert_clause = match agg.alert.as_str() {
        "None" => String::new(),
        alert => format!(" Alert: {}.", alert),
    };

    format!(
        "{symbol} drew {premium} in {bias} {trade_type} flow across {count} highlighted trade(s), led by {stealth} positioning.{alert_clause}",
        symbol = agg.symbol,
        premium = format_premium(agg.total_premium),
        bias = agg.bias.label(),
        trade_type = agg.trade_type,
        count = section.top_trades.len(),
        stealth = agg.stealth_summary,
        alert_clause = alert_clause,
    )
}
