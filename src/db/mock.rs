//! Mock database clients for testing.
//!
//! Provides in-memory implementations so the dumper can be exercised without
//! a running server.

use super::{DatabaseClient, QueryResult};
use crate::error::{DumpError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A mock database client that returns a predefined result for every query.
///
/// Executed statements and close calls are recorded so tests can inspect them
/// after the client has been handed off.
#[derive(Debug, Default)]
pub struct MockDatabaseClient {
    result: QueryResult,
    queries: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
    closed: bool,
}

impl MockDatabaseClient {
    /// Creates a new mock client that returns an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new mock client that returns the given result.
    pub fn with_result(result: QueryResult) -> Self {
        Self {
            result,
            ..Self::default()
        }
    }

    /// Returns a handle to the list of executed SQL statements.
    pub fn queries(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.queries)
    }

    /// Returns a handle to the number of times the session was actually closed.
    pub fn close_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closes)
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult> {
        if self.closed {
            return Err(DumpError::internal("Query issued on a closed connection"));
        }
        self.queries
            .lock()
            .map_err(|_| DumpError::internal("Mock query log poisoned"))?
            .push(sql.to_string());
        Ok(self.result.clone())
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// A mock database client whose queries always fail.
#[derive(Debug, Clone)]
pub struct FailingDatabaseClient {
    message: String,
}

impl FailingDatabaseClient {
    /// Creates a failing client that reports the given query error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute_query(&mut self, _sql: &str) -> Result<QueryResult> {
        Err(DumpError::query(self.message.clone()))
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
