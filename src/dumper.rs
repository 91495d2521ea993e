//! The row dumper.
//!
//! A single linear procedure: wait, connect, query `users`, print every row,
//! close. Any failure aborts the run before anything reaches the output.

use crate::config::{ConnectionConfig, DumpOptions};
use crate::db::{self, DatabaseClient, QueryResult};
use crate::error::Result;
use crate::render::RowDisplay;
use std::fmt;
use std::future::Future;
use std::io::Write;
use tracing::{debug, info};

/// The query the dumper runs.
pub const USERS_QUERY: &str = "SELECT * FROM users";

/// Header printed before the rows.
pub const HEADER: &str = "Users in the database:";

/// Stages of a dump run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Sleeping,
    Connecting,
    Querying,
    Printing,
    Closing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Sleeping => "sleeping",
            Self::Connecting => "connecting",
            Self::Querying => "querying",
            Self::Printing => "printing",
            Self::Closing => "closing",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Settings for one dump run.
#[derive(Debug, Clone, Default)]
pub struct DumpSettings {
    pub connection: ConnectionConfig,
    pub options: DumpOptions,
}

/// Dumps the `users` table to a writer.
#[derive(Debug)]
pub struct RowDumper {
    settings: DumpSettings,
    stage: Stage,
}

impl RowDumper {
    pub fn new(settings: DumpSettings) -> Self {
        Self {
            settings,
            stage: Stage::Start,
        }
    }

    /// The last stage this dumper entered.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Runs the dump against Postgres, returning the number of rows printed.
    pub async fn run<W: Write>(&mut self, out: &mut W) -> Result<usize> {
        self.run_with(
            |config| async move { db::connect(&config).await },
            out,
        )
        .await
    }

    /// Runs the dump with the given connector.
    ///
    /// The connector is called only after the startup delay has elapsed.
    pub async fn run_with<W, F, Fut>(&mut self, connect: F, out: &mut W) -> Result<usize>
    where
        W: Write,
        F: FnOnce(ConnectionConfig) -> Fut,
        Fut: Future<Output = Result<Box<dyn DatabaseClient>>>,
    {
        self.enter(Stage::Sleeping);
        let delay = self.settings.options.startup_delay();
        debug!("Waiting {:?} before connecting", delay);
        tokio::time::sleep(delay).await;

        self.enter(Stage::Connecting);
        info!("Connecting to {}", self.settings.connection.display_string());
        let mut client = connect(self.settings.connection.clone()).await?;

        self.enter(Stage::Querying);
        let result = client.execute_query(USERS_QUERY).await?;

        self.enter(Stage::Printing);
        let printed = print_rows(&result, out)?;
        info!("Printed {} rows in {:?}", printed, result.execution_time);

        self.enter(Stage::Closing);
        client.close().await?;

        self.enter(Stage::Done);
        Ok(printed)
    }

    fn enter(&mut self, stage: Stage) {
        debug!("{} -> {}", self.stage, stage);
        self.stage = stage;
    }
}

/// Prints the header and one tuple line per row, returning the row count.
pub fn print_rows<W: Write>(result: &QueryResult, out: &mut W) -> Result<usize> {
    writeln!(out, "{HEADER}")?;
    for row in &result.rows {
        writeln!(out, "{}", RowDisplay(row))?;
    }
    out.flush()?;
    Ok(result.rows.len())
}
