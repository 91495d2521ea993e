//! PostgreSQL database client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `DatabaseClient` trait
//! over a single sqlx connection.

use crate::config::ConnectionConfig;
use crate::db::{ColumnInfo, DatabaseClient, Interval, QueryResult, Row, Value};
use crate::error::{DumpError, Result};
use async_trait::async_trait;
use ipnetwork::IpNetwork;
use rust_decimal::Decimal;
use sqlx::postgres::types::{PgInterval, PgMoney, PgTimeTz};
use sqlx::postgres::{PgConnection, PgDatabaseError, PgRow};
use sqlx::{Column as SqlxColumn, Connection, Postgres, Row as SqlxRow, TypeInfo, ValueRef};
use std::time::Instant;
use tracing::{debug, warn};

/// MONEY is scaled by the server's `lc_monetary`; two digits covers the common locales.
const MONEY_FRACTION_DIGITS: u32 = 2;

/// PostgreSQL database client holding one session.
#[derive(Debug)]
pub struct PostgresClient {
    /// `None` once the session has been closed.
    conn: Option<PgConnection>,
}

impl PostgresClient {
    /// Opens a single connection. There is no pool and no retry; the first
    /// failure is returned.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        debug!("Connecting to {}", config.display_string());

        let options = config.connect_options();
        if options.get_options().is_some() {
            warn!("PGOPTIONS is set in the environment and will be sent to the server");
        }

        let conn = PgConnection::connect_with(&options)
            .await
            .map_err(|e| map_connection_error(e, config))?;

        debug!("Successfully connected to database");
        Ok(Self { conn: Some(conn) })
    }
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| DumpError::internal("Query issued on a closed connection"))?;

        let start = Instant::now();

        let result: Vec<PgRow> = sqlx::query(sql)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| DumpError::query(format_query_error(e)))?;

        let execution_time = start.elapsed();

        let columns: Vec<ColumnInfo> = result
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                    .collect()
            })
            .unwrap_or_default();

        let rows: Vec<Row> = result.iter().map(convert_row).collect();
        let row_count = rows.len();

        debug!("Query returned {} rows in {:?}", row_count, execution_time);

        Ok(QueryResult {
            columns,
            rows,
            execution_time,
            row_count,
        })
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close()
                .await
                .map_err(|e| DumpError::connection(format!("Failed to close connection: {e}")))?;
            debug!("Connection closed");
        }
        Ok(())
    }
}

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a PgRow to our Value type.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => decode::<bool>(row, index, type_name, Value::Bool),
        "INT2" | "SMALLINT" => decode::<i16>(row, index, type_name, |v| Value::Int(v as i64)),
        "INT4" | "INT" | "INTEGER" => {
            decode::<i32>(row, index, type_name, |v| Value::Int(v as i64))
        }
        "INT8" | "BIGINT" => decode::<i64>(row, index, type_name, Value::Int),
        "FLOAT4" | "REAL" => decode::<f32>(row, index, type_name, |v| Value::Float(v as f64)),
        "FLOAT8" | "DOUBLE PRECISION" => decode::<f64>(row, index, type_name, Value::Float),
        "NUMERIC" => decode::<Decimal>(row, index, type_name, Value::Decimal),
        "MONEY" => decode::<PgMoney>(row, index, type_name, |v| {
            Value::Decimal(v.to_decimal(MONEY_FRACTION_DIGITS))
        }),
        "BYTEA" => decode::<Vec<u8>>(row, index, type_name, Value::Bytes),
        "DATE" => decode::<chrono::NaiveDate>(row, index, type_name, Value::Date),
        "TIME" => decode::<chrono::NaiveTime>(row, index, type_name, Value::Time),
        "TIMETZ" => decode::<PgTimeTz>(row, index, type_name, |v| {
            Value::TimeTz(v.time, v.offset)
        }),
        "TIMESTAMP" => decode::<chrono::NaiveDateTime>(row, index, type_name, Value::Timestamp),
        "TIMESTAMPTZ" => decode::<chrono::DateTime<chrono::Utc>>(
            row,
            index,
            type_name,
            Value::TimestampTz,
        ),
        "INTERVAL" => decode::<PgInterval>(row, index, type_name, |v| {
            Value::Interval(Interval {
                months: v.months,
                days: v.days,
                microseconds: v.microseconds,
            })
        }),
        "UUID" => decode::<uuid::Uuid>(row, index, type_name, Value::Uuid),
        "INET" | "CIDR" => decode::<IpNetwork>(row, index, type_name, Value::Inet),
        "JSON" | "JSONB" => decode::<serde_json::Value>(row, index, type_name, Value::Json),

        "BOOL[]" => decode_array::<bool>(row, index, type_name, Value::Bool),
        "INT2[]" => decode_array::<i16>(row, index, type_name, |v| Value::Int(v as i64)),
        "INT4[]" => decode_array::<i32>(row, index, type_name, |v| Value::Int(v as i64)),
        "INT8[]" => decode_array::<i64>(row, index, type_name, Value::Int),
        "FLOAT4[]" => decode_array::<f32>(row, index, type_name, |v| Value::Float(v as f64)),
        "FLOAT8[]" => decode_array::<f64>(row, index, type_name, Value::Float),
        "NUMERIC[]" => decode_array::<Decimal>(row, index, type_name, Value::Decimal),
        "TEXT[]" | "VARCHAR[]" | "BPCHAR[]" | "NAME[]" => {
            decode_array::<String>(row, index, type_name, Value::String)
        }
        "DATE[]" => decode_array::<chrono::NaiveDate>(row, index, type_name, Value::Date),
        "TIMESTAMP[]" => {
            decode_array::<chrono::NaiveDateTime>(row, index, type_name, Value::Timestamp)
        }
        "TIMESTAMPTZ[]" => decode_array::<chrono::DateTime<chrono::Utc>>(
            row,
            index,
            type_name,
            Value::TimestampTz,
        ),
        "UUID[]" => decode_array::<uuid::Uuid>(row, index, type_name, Value::Uuid),
        "INET[]" | "CIDR[]" => decode_array::<IpNetwork>(row, index, type_name, Value::Inet),
        "JSONB[]" | "JSON[]" => {
            decode_array::<serde_json::Value>(row, index, type_name, Value::Json)
        }

        // For all other types, try to get as string
        _ => {
            let is_null = row
                .try_get_raw(index)
                .map(|raw| raw.is_null())
                .unwrap_or(false);
            if is_null {
                Value::Null
            } else {
                decode::<String>(row, index, type_name, Value::String)
            }
        }
    }
}

/// Decodes one column, falling back to `Value::Unsupported` when sqlx cannot
/// decode the wire value as `T`.
fn decode<'r, T>(
    row: &'r PgRow,
    index: usize,
    type_name: &str,
    wrap: impl FnOnce(T) -> Value,
) -> Value
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    match row.try_get::<Option<T>, _>(index) {
        Ok(Some(v)) => wrap(v),
        Ok(None) => Value::Null,
        Err(e) => {
            debug!("Cannot decode column {} ({}): {}", index, type_name, e);
            Value::Unsupported(type_name.to_string())
        }
    }
}

/// Decodes a one-dimensional array column element by element.
///
/// NULL elements become `Value::Null`; multi-dimensional arrays are unsupported.
fn decode_array<'r, T>(
    row: &'r PgRow,
    index: usize,
    type_name: &str,
    wrap: impl Fn(T) -> Value,
) -> Value
where
    Vec<Option<T>>: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    decode::<Vec<Option<T>>>(row, index, type_name, |items| {
        Value::Array(
            items
                .into_iter()
                .map(|item| item.map(&wrap).unwrap_or(Value::Null))
                .collect(),
        )
    })
}

/// Maps sqlx connection errors to categorized messages.
///
/// The library's own message is always kept so no diagnostic detail is lost.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> DumpError {
    let host = &config.host;
    let port = config.port;

    let message = match &error {
        sqlx::Error::Io(e) => {
            format!("Cannot connect to {host}:{port}: {e}")
        }
        sqlx::Error::Tls(e) => {
            format!("TLS negotiation with {host}:{port} failed: {e}")
        }
        sqlx::Error::Database(db_error) => match db_error.code().as_deref() {
            Some("28P01") | Some("28000") => format!(
                "Authentication failed for user '{}': {}",
                config.user,
                db_error.message()
            ),
            Some("3D000") => format!(
                "Database '{}' does not exist: {}",
                config.database,
                db_error.message()
            ),
            _ => db_error.message().to_string(),
        },
        other => other.to_string(),
    };

    warn!("Connection to {} failed", config.display_string());
    DumpError::connection(message)
}

/// Formats a query error with the server's detail and hint, if available.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR: ");
    result.push_str(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<PgDatabaseError>() {
        let fields = [
            ("DETAIL", pg_error.detail()),
            ("HINT", pg_error.hint()),
            ("TABLE", pg_error.table()),
            ("COLUMN", pg_error.column()),
            ("CONSTRAINT", pg_error.constraint()),
        ];

        for (label, value) in fields {
            if let Some(value) = value {
                result.push_str("\n  ");
                result.push_str(label);
                result.push_str(": ");
                result.push_str(value);
            }
        }
    }

    result
}
