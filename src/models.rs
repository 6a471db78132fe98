use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractType {
    Call,
    Put,
}

impl ContractType {
    /// Case-insensitive parse; anything that is neither a call nor a put is
    /// rejected so it never lands in the bias sums.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "call" | "calls" | "c" => Some(Self::Call),
            "put" | "puts" | "p" => Some(Self::Put),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Call => "CALL",
            Self::Put => "PUT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    AggressiveBullish,
    Bullish,
    Neutral,
    Bearish,
    AggressiveBearish,
}

impl Sentiment {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AggressiveBullish => "Aggressive Bullish",
            Self::Bullish => "Bullish",
            Self::Neutral => "Neutral",
            Self::Bearish => "Bearish",
            Self::AggressiveBearish => "Aggressive Bearish",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapBucket {
    Small,
    Mid,
    Large,
    Unknown,
}

impl CapBucket {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Small => "Small Cap",
            Self::Mid => "Mid Cap",
            Self::Large => "Large Cap",
            Self::Unknown => "Unknown Cap",
        }
    }
}

/// Pre-aggregation row filter selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum ScopeFilter {
    FullMarket,
    SmallCap,
    MidCap,
    LargeCap,
    LongTerm,
    Targeted,
}

impl ScopeFilter {
    pub fn label(&self) -> &'static str {
        match self {
            Self::FullMarket => "Full Market",
            Self::SmallCap => "Small Cap",
            Self::MidCap => "Mid Cap",
            Self::LargeCap => "Large Cap",
            Self::LongTerm => "Long Term",
            Self::Targeted => "Targeted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum SummaryMode {
    Standard,
    Ai,
}

/// One parsed input row, after value normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub symbol: String,
    pub stock_last: Option<f64>,
    pub strike: String,
    pub contract_type: ContractType,
    pub expiration: Option<NaiveDate>,
    pub premium_text: String,
    pub premium_value: f64,
    pub trade_spread: Option<String>,
    pub flags: Option<String>,
    pub alerts: Option<String>,
    pub trade_size: Option<f64>,
    pub open_interest: Option<f64>,
    /// Position in the original file, used for stable ordering.
    pub row_index: usize,
}
