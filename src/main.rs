//! row-dump - print every row of a Postgres `users` table.

use pg_row_dump::cli::Cli;
use pg_row_dump::dumper::RowDumper;
use pg_row_dump::error::{DumpError, Result};
use pg_row_dump::logging;
use tracing::error;

fn main() {
    logging::init_stderr_logging();

    if let Err(e) = run() {
        let diagnostic = e.diagnostic();
        error!("{}", diagnostic);
        // The log line is filtered out under RUST_LOG=off; stderr always gets the diagnostic.
        eprintln!("{diagnostic}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let settings = cli.resolve_settings()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| DumpError::internal(format!("Failed to start runtime: {e}")))?;

    runtime.block_on(async {
        let mut dumper = RowDumper::new(settings);
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        dumper.run(&mut out).await.map(|_| ())
    })
}
