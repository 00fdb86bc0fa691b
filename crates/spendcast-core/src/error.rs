//! Error types for Spendcast

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("No valid rows to analyze ({raw_rows} rows read, none with a valid date and amount)")]
    NoValidRows { raw_rows: usize },

    #[error("Cannot forecast from an empty monthly series")]
    EmptySeries,

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Timed out after {0} seconds")]
    Timeout(u64),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the error was caused by the submitted data rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Schema { .. } | Error::NoValidRows { .. } | Error::EmptySeries | Error::Csv(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_lists_missing_columns() {
        let err = Error::Schema {
            missing: vec!["amount".to_string(), "expense_type".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Missing required columns: amount, expense_type"
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn test_computation_error_is_server_side() {
        let err = Error::Computation("non-finite total".into());
        assert!(!err.is_client_error());
    }
}
