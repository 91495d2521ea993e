//! Integration tests for row-dump.
//!
//! Tests that talk to a server require a running PostgreSQL database.
//! Set DATABASE_URL environment variable to run them.

pub mod binary_test;
pub mod connection_test;
pub mod dump_test;
