use std::fmt;

#[derive(Debug)]
pub enum ScanError {
    Io(String),
    Csv(String),
    MissingColumn { field: &'static str, aliases: &'static [&'static str] },
    NoRows(String),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScanError::Io(msg) => write!(f, "File error: {}", msg),
            ScanError::Csv(msg) => write!(f, "Unreadable file format: {}", msg),
            ScanError::MissingColumn { field, aliases } => write!(
                f,
                "Missing required column for '{}' (accepted headers: {})",
                field,
                aliases.join(", ")
            ),
            ScanError::NoRows(msg) => write!(f, "No usable rows: {}", msg),
        }
    }
}

impl std::error::Error for ScanError {}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::Io(err.to_string())
    }
}

impl From<csv::Error> for ScanError {
    fn from(err: csv::Error) -> Self {
        ScanError::Csv(err.to_string())
    }
}
