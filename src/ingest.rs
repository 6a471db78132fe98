use crate::error::ScanError;
use crate::models::{ContractType, TradeRecord};
use crate::normalize::{
    normalize_column_name, normalize_price, normalize_symbol, parse_expiration, try_parse_premium,
};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

// -----------------------------------------------
// COLUMN ALIASES (ordered, first match wins)
// -----------------------------------------------
const SYMBOL_ALIASES: &[&str] = &["ticker", "underlying", "symbol"];
const PREMIUM_ALIASES: &[&str] = &["premium", "prems", "total_premium"];
const CONTRACT_ALIASES: &[&str] = &["call_or_put", "put_call", "call_put", "put/call", "contract_type", "type", "cp"];
const STRIKE_ALIASES: &[&str] = &["strike", "strike_price"];
const EXPIRATION_ALIASES: &[&str] = &["expiration_date", "expiration", "expiry", "expiry_date", "exp_date"];

const SPREAD_ALIASES: &[&str] = &["trade_spread", "spread"];
const FLAGS_ALIASES: &[&str] = &["flags", "flag", "trade_type"];
const ALERTS_ALIASES: &[&str] = &["alerts", "alert"];
const SIZE_ALIASES: &[&str] = &["trade_size", "size", "quantity", "qty"];
const OI_ALIASES: &[&str] = &["open_interest", "oi"];
const STOCK_LAST_ALIASES: &[&str] = &["stock_last", "stock_price", "underlying_price", "last", "price"];

/// Parsed input plus row-level recovery counts.
#[derive(Debug)]
pub struct IngestResult {
    pub rows: Vec<TradeRecord>,
    /// Rows dropped for an empty symbol or an unrecognized call/put value.
    pub skipped_rows: usize,
    /// Rows whose premium text failed to parse and defaulted to 0.
    pub defaulted_premiums: usize,
}

/// Positions of the logical fields inside the header row.
struct ColumnMap {
    symbol: usize,
    premium: usize,
    contract: usize,
    strike: usize,
    expiration: usize,
    spread: Option<usize>,
    flags: Option<usize>,
    alerts: Option<usize>,
    size: Option<usize>,
    open_interest: Option<usize>,
    stock_last: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &StringRecord) -> Result<Self, ScanError> {
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (normalize_column_name(name), i))
            .collect();

        let required = |field: &'static str, aliases: &'static [&'static str]| {
            aliases
                .iter()
                .find_map(|alias| index.get(*alias).copied())
                .ok_or(ScanError::MissingColumn { field, aliases })
        };
        let optional = |aliases: &[&str]| {
            aliases.iter().find_map(|alias| index.get(*alias).copied())
        };

        Ok(Self {
            symbol: required("symbol", SYMBOL_ALIASES)?,
            premium: required("premium", PREMIUM_ALIASES)?,
            contract: required("call/put", CONTRACT_ALIASES)?,
            strike: required("strike", STRIKE_ALIASES)?,
            expiration: required("expiration", EXPIRATION_ALIASES)?,
            spread: optional(SPREAD_ALIASES),
            flags: optional(FLAGS_ALIASES),
            alerts: optional(ALERTS_ALIASES),
            size: optional(SIZE_ALIASES),
            open_interest: optional(OI_ALIASES),
            stock_last: optional(STOCK_LAST_ALIASES),
        })
    }
}

/// Read a delimited trade export into normalized records.
///
/// Tab-separated files are detected by extension; everything else is read as
/// comma-separated. Missing required columns abort the run; malformed row
/// values recover to the documented defaults.
pub fn read_trades(path: &Path) -> Result<IngestResult, ScanError> {
    let delimiter = match path.extension().and_then(|e| e.to_str()) {
        Some("tsv") => b'\t',
        _ => b',',
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)?;

    let columns = ColumnMap::resolve(reader.headers()?)?;

    let mut rows = Vec::new();
    let mut skipped_rows = 0usize;
    let mut defaulted_premiums = 0usize;

    for (row_index, record) in reader.records().enumerate() {
        let record = record?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");
        let optional_cell = |idx: Option<usize>| {
            idx.map(cell).filter(|v| !v.is_empty()).map(str::to_string)
        };

        let symbol = normalize_symbol(cell(columns.symbol));
        if symbol.is_empty() {
            warn!(row = row_index, "skipping row without a symbol");
            skipped_rows += 1;
            continue;
        }

        let Some(contract_type) = ContractType::parse(cell(columns.contract)) else {
            warn!(
                row = row_index,
                value = cell(columns.contract),
                "skipping row with unrecognized call/put value"
            );
            skipped_rows += 1;
            continue;
        };

        let premium_text = cell(columns.premium).to_string();
        let premium_value = match try_parse_premium(&premium_text) {
            Some(value) => value,
            None => {
                debug!(row = row_index, text = %premium_text, "premium defaulted to 0");
                defaulted_premiums += 1;
                0.0
            }
        };

        rows.push(TradeRecord {
            symbol,
            stock_last: columns.stock_last.map(cell).and_then(normalize_price),
            strike: cell(columns.strike).to_string(),
            contract_type,
            expiration: parse_expiration(cell(columns.expiration)),
            premium_text,
            premium_value,
            trade_spread: optional_cell(columns.spread),
            flags: optional_cell(columns.flags),
            alerts: optional_cell(columns.alerts),
            trade_size: columns.size.map(cell).and_then(normalize_price),
            open_interest: columns.open_interest.map(cell).and_then(normalize_price),
            row_index,
        });
    }

    if rows.is_empty() {
        return Err(ScanError::NoRows(
            "the file contained no parseable trade rows".to_string(),
        ));
    }

    info!(
        rows = rows.len(),
        skipped = skipped_rows,
        defaulted_premiums,
        "ingested trade export"
    );

    Ok(IngestResult { rows, skipped_rows, defaulted_premiums })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_reads_canonical_export() {
        let file = write_csv(
            "Ticker,Stock Last,Strike,Call or Put,Expiration Date,Premium,Trade Spread,Flags\n\
             nvda,135.50,140,CALL,2026-01-16,$2.1M,Above Ask,sweep\n\
             tsla,,250,put,2026-02-20,500K,At Bid,block\n",
        );

        let result = read_trades(file.path()).unwrap();
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.skipped_rows, 0);

        let first = &result.rows[0];
        assert_eq!(first.symbol, "NVDA");
        assert_eq!(first.stock_last, Some(135.5));
        assert_eq!(first.premium_value, 2_100_000.0);
        assert_eq!(first.trade_spread.as_deref(), Some("Above Ask"));
        assert_eq!(first.contract_type, ContractType::Call);

        let second = &result.rows[1];
        assert_eq!(second.symbol, "TSLA");
        assert_eq!(second.stock_last, None);
        assert_eq!(second.contract_type, ContractType::Put);
    }

    #[test]
    fn test_header_alias_fallback() {
        let file = write_csv(
            "Underlying,Strike,Put/Call,Expiry,Prems\n\
             AAPL,200,C,2026-03-20,1.5m\n",
        );

        let result = read_trades(file.path()).unwrap();
        assert_eq!(result.rows[0].symbol, "AAPL");
        assert_eq!(result.rows[0].premium_value, 1_500_000.0);
        assert_eq!(result.rows[0].contract_type, ContractType::Call);
    }

    #[test]
    fn test_missing_required_column_is_reported() {
        let file = write_csv("Strike,Type,Expiry,Premium\n100,C,2026-01-16,1K\n");

        let err = read_trades(file.path()).unwrap_err();
        match err {
            ScanError::MissingColumn { field, aliases } => {
                assert_eq!(field, "symbol");
                assert!(aliases.contains(&"ticker"));
                assert!(aliases.contains(&"underlying"));
            }
            other => panic!("expected MissingColumn, got {other}"),
        }
    }

    #[test]
    fn test_row_level_recovery() {
        let file = write_csv(
            "Ticker,Strike,Type,Expiration,Premium\n\
             AAA,100,CALL,someday,N/A\n\
             BBB,90,STRADDLE,2026-01-16,1K\n\
             ,80,PUT,2026-01-16,1K\n",
        );

        let result = read_trades(file.path()).unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.skipped_rows, 2);
        assert_eq!(result.defaulted_premiums, 1);

        let row = &result.rows[0];
        assert_eq!(row.premium_value, 0.0);
        assert_eq!(row.expiration, None);
    }

    #[test]
    fn test_empty_file_is_a_run_level_error() {
        let file = write_csv("Ticker,Strike,Type,Expiration,Premium\n");
        assert!(matches!(read_trades(file.path()), Err(ScanError::NoRows(_))));
    }
}
