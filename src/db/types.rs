//! Query result types for row-dump.
//!
//! Defines the structures used to represent query results from the database.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use ipnetwork::IpNetwork;
use rust_decimal::Decimal;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Represents the result of executing a SQL query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Column metadata for the result set.
    pub columns: Vec<ColumnInfo>,

    /// Rows of data, in the order the server returned them.
    pub rows: Vec<Row>,

    /// Time taken to execute the query.
    pub execution_time: Duration,

    /// Number of rows in the result.
    pub row_count: usize,
}

impl QueryResult {
    /// Creates a query result with the given columns and rows.
    pub fn with_data(columns: Vec<ColumnInfo>, rows: Vec<Row>) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            execution_time: Duration::ZERO,
            row_count,
        }
    }
}

/// Metadata about a column in a result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// Column data type.
    pub data_type: String,
}

impl ColumnInfo {
    /// Creates a new column info with the given name and type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// Represents a single value from a database query.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer (up to i64).
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Exact numeric, also used for MONEY.
    Decimal(Decimal),

    /// Text/string value.
    String(String),

    /// Binary data.
    Bytes(Vec<u8>),

    /// Calendar date without a time zone.
    Date(NaiveDate),

    /// Time of day without a time zone.
    Time(NaiveTime),

    /// Time of day with a UTC offset.
    TimeTz(NaiveTime, FixedOffset),

    /// Timestamp without a time zone.
    Timestamp(NaiveDateTime),

    /// Timestamp with a time zone, normalized to UTC.
    TimestampTz(DateTime<Utc>),

    /// Interval.
    Interval(Interval),

    /// UUID value.
    Uuid(Uuid),

    /// INET or CIDR address.
    Inet(IpNetwork),

    /// JSON or JSONB document.
    Json(serde_json::Value),

    /// One-dimensional array.
    Array(Vec<Value>),

    /// A non-NULL value whose Postgres type has no decoder; holds the type name.
    Unsupported(String),
}

/// A Postgres interval, kept in its three independent units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interval {
    pub months: i32,
    pub days: i32,
    pub microseconds: i64,
}

impl fmt::Display for Interval {
    /// Formats like Postgres' default `postgres` interval style,
    /// e.g. `1 year 2 mons 3 days 04:05:06.5`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        let years = self.months / 12;
        let mons = self.months % 12;
        for (n, unit) in [(years, "year"), (mons, "mon"), (self.days, "day")] {
            if n != 0 {
                let plural = if n.abs() == 1 { "" } else { "s" };
                parts.push(format!("{n} {unit}{plural}"));
            }
        }

        if self.microseconds != 0 || parts.is_empty() {
            let sign = if self.microseconds < 0 { "-" } else { "" };
            let total = self.microseconds.unsigned_abs();
            let hours = total / 3_600_000_000;
            let minutes = total / 60_000_000 % 60;
            let seconds = total / 1_000_000 % 60;
            let micros = total % 1_000_000;

            let mut clock = format!("{sign}{hours:02}:{minutes:02}:{seconds:02}");
            if micros != 0 {
                let frac = format!("{micros:06}");
                clock.push('.');
                clock.push_str(frac.trim_end_matches('0'));
            }
            parts.push(clock);
        }

        f.write_str(&parts.join(" "))
    }
}

// Conversion implementations for common types
impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}
