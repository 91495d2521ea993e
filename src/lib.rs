//! row-dump: print every row of a Postgres `users` table.
//!
//! This library exposes the core modules for use in the binary and in
//! integration tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod dumper;
pub mod error;
pub mod logging;
pub mod render;
