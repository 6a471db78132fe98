use chrono::NaiveDate;

/// Parse a free-text premium amount ("$500K", "1.2m", "350,000") into dollars.
///
/// Strips `$` and `,`, trims, lowercases, then accepts a float literal with an
/// optional single trailing `k`/`m` suffix. Any failure returns 0.0 — row-level
/// parse failures are recovered silently, never reported upward.
pub fn parse_premium(text: &str) -> f64 {
    try_parse_premium(text).unwrap_or(0.0)
}

/// Fallible variant of [`parse_premium`], used where the caller wants to
/// count defaulted rows.
pub fn try_parse_premium(text: &str) -> Option<f64> {
    let cleaned = text.replace('$', "").replace(',', "").trim().to_lowercase();
    if cleaned.is_empty() {
        return None;
    }

    let (literal, multiplier) = match cleaned.strip_suffix('k') {
        Some(rest) => (rest, 1_000.0),
        None => match cleaned.strip_suffix('m') {
            Some(rest) => (rest, 1_000_000.0),
            None => (cleaned.as_str(), 1.0),
        },
    };

    literal
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v * multiplier)
}

/// Upper-case and trim a ticker symbol.
pub fn normalize_symbol(text: &str) -> String {
    text.trim().to_uppercase()
}

/// Parse a price string; unparseable input is None, not zero.
pub fn normalize_price(text: &str) -> Option<f64> {
    let cleaned = text.replace('$', "").replace(',', "");
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%d-%b-%Y"];

/// Parse an expiration date across the formats seen in flow exports.
pub fn parse_expiration(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Normalize a header cell: trim, lowercase, spaces/hyphens to underscore.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace([' ', '-'], "_")
}
