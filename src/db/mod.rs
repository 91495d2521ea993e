//! Database abstraction layer for row-dump.
//!
//! Provides a trait-based interface for database operations so the dumper can
//! run against Postgres or an in-memory test double.

mod mock;
mod postgres;
mod types;

pub use mock::{FailingDatabaseClient, MockDatabaseClient};
pub use postgres::PostgresClient;
pub use types::{ColumnInfo, Interval, QueryResult, Row, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Creates a database client for the given configuration.
///
/// This is the central factory function for database connections.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
    let client = PostgresClient::connect(config).await?;
    Ok(Box::new(client))
}

/// Trait defining the interface for database clients.
///
/// A client owns exactly one session. All operations are async and return
/// Results with DumpError.
#[async_trait]
pub trait DatabaseClient: Send {
    /// Executes a SQL query and returns the fully materialized results.
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult>;

    /// Closes the database connection. Closing twice is a no-op.
    async fn close(&mut self) -> Result<()>;
}
