//! CSV import and record validation for expense exports

use std::io::Read;

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ByteRecord, ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::Transaction;

/// Columns every export must carry, in reporting order
pub const REQUIRED_COLUMNS: [&str; 5] = ["date", "category", "concept", "amount", "expense_type"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Why a row was left out of the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    InvalidDate(String),
    InvalidAmount(String),
    /// A grouping column (category, expense type) is not valid UTF-8
    InvalidEncoding(&'static str),
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate(v) => write!(f, "invalid date {:?}", v),
            Self::InvalidAmount(v) => write!(f, "invalid amount {:?}", v),
            Self::InvalidEncoding(column) => write!(f, "{} is not valid UTF-8", column),
        }
    }
}

/// A data-quality warning: one input row that did not survive validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRow {
    /// 1-based data row number (header excluded)
    pub row: usize,
    pub reason: DropReason,
}

/// Transactions that survived validation plus what was dropped
#[derive(Debug, Clone, Default)]
pub struct ValidatedBatch {
    pub transactions: Vec<Transaction>,
    pub raw_rows: usize,
    pub dropped: Vec<DroppedRow>,
}

/// Column positions of the required fields in a given header
struct ColumnIndex {
    date: usize,
    category: usize,
    concept: usize,
    amount: usize,
    expense_type: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| position(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::Schema { missing });
        }

        // All present, checked above
        let idx = |name: &str| position(name).unwrap_or_default();
        Ok(Self {
            date: idx("date"),
            category: idx("category"),
            concept: idx("concept"),
            amount: idx("amount"),
            expense_type: idx("expense_type"),
        })
    }
}

/// Parse an expense CSV and validate its rows
///
/// Fails with `Error::Schema` when required columns are absent and with
/// `Error::NoValidRows` when every row was dropped. Rows with an unparseable
/// date or amount, or a category or expense type that is not UTF-8, are
/// dropped and reported in `ValidatedBatch::dropped`. The header must be UTF-8.
pub fn parse_csv<R: Read>(reader: R) -> Result<ValidatedBatch> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    debug!("CSV columns: {:?}", headers.iter().collect::<Vec<_>>());
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut batch = ValidatedBatch::default();

    for (i, result) in rdr.byte_records().enumerate() {
        let record = result?;
        let row = i + 1;
        batch.raw_rows += 1;

        match validate_record(&record, &columns) {
            Ok(tx) => batch.transactions.push(tx),
            Err(reason) => {
                debug!(row, %reason, "Dropping row");
                batch.dropped.push(DroppedRow { row, reason });
            }
        }
    }

    if !batch.dropped.is_empty() {
        warn!(
            "Dropped {} of {} rows with an invalid date, amount or encoding",
            batch.dropped.len(),
            batch.raw_rows
        );
    }

    if batch.transactions.is_empty() {
        return Err(Error::NoValidRows {
            raw_rows: batch.raw_rows,
        });
    }

    info!("Validated {} transactions", batch.transactions.len());
    Ok(batch)
}

fn validate_record(
    record: &ByteRecord,
    columns: &ColumnIndex,
) -> std::result::Result<Transaction, DropReason> {
    let raw = |i: usize| record.get(i).unwrap_or_default();
    let lossy = |i: usize| String::from_utf8_lossy(raw(i));
    let strict = |i: usize, column: &'static str| {
        std::str::from_utf8(raw(i))
            .map(str::to_string)
            .map_err(|_| DropReason::InvalidEncoding(column))
    };

    let amount_str = lossy(columns.amount);
    let amount =
        parse_amount(&amount_str).ok_or_else(|| DropReason::InvalidAmount(amount_str.into()))?;

    let date_str = lossy(columns.date);
    let date = parse_date(&date_str).ok_or_else(|| DropReason::InvalidDate(date_str.into()))?;

    Ok(Transaction {
        date,
        category: strict(columns.category, "category")?,
        concept: lossy(columns.concept).into_owned(),
        amount,
        expense_type: strict(columns.expense_type, "expense_type")?,
    })
}

/// Parse a locale-agnostic decimal amount
///
/// Empty, non-numeric and non-finite values (NaN, inf) are rejected.
pub fn parse_amount(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a calendar date in any of the supported layouts
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}
