//! End-to-end dump tests against a live server.
//!
//! Each test creates its own `users` table in a temporary schema so the
//! output is deterministic.

use pg_row_dump::config::{ConnectionConfig, DumpOptions};
use pg_row_dump::db::{DatabaseClient, PostgresClient};
use pg_row_dump::dumper::{DumpSettings, RowDumper, Stage};
use pg_row_dump::error::DumpError;
use pretty_assertions::assert_eq;

fn get_test_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

fn settings_for(connection: ConnectionConfig) -> DumpSettings {
    DumpSettings {
        connection,
        options: DumpOptions {
            startup_delay_secs: 0,
        },
    }
}

/// Connects and points the session at a fresh schema holding a `users` table.
async fn seeded_client(
    config: ConnectionConfig,
    schema: &'static str,
) -> pg_row_dump::error::Result<Box<dyn DatabaseClient>> {
    let mut client = PostgresClient::connect(&config).await?;
    for sql in [
        format!("DROP SCHEMA IF EXISTS {schema} CASCADE"),
        format!("CREATE SCHEMA {schema}"),
        format!("SET search_path TO {schema}"),
        "CREATE TABLE users (id int4 PRIMARY KEY, name text)".to_string(),
        "INSERT INTO users VALUES (1, 'alice'), (2, 'bob')".to_string(),
    ] {
        client.execute_query(&sql).await?;
    }
    Ok(Box::new(client))
}

#[tokio::test]
async fn test_dump_users_table() {
    let Some(url) = get_test_database_url() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let config = ConnectionConfig::from_connection_string(&url).unwrap();

    let mut dumper = RowDumper::new(settings_for(config));
    let mut out = Vec::new();
    let printed = dumper
        .run_with(|cfg| seeded_client(cfg, "row_dump_it_users"), &mut out)
        .await
        .unwrap();

    assert_eq!(printed, 2);
    assert_eq!(dumper.stage(), Stage::Done);

    let text = String::from_utf8(out).unwrap();
    let mut lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.remove(0), "Users in the database:");
    // Without ORDER BY the server may return rows in any order.
    lines.sort();
    assert_eq!(lines, vec!["(1, 'alice')", "(2, 'bob')"]);
}

#[tokio::test]
async fn test_dump_missing_table_is_query_error() {
    let Some(url) = get_test_database_url() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let config = ConnectionConfig::from_connection_string(&url).unwrap();

    let mut dumper = RowDumper::new(settings_for(config));
    let mut out = Vec::new();
    let err = dumper
        .run_with(
            |cfg| async move {
                let mut client = PostgresClient::connect(&cfg).await?;
                client
                    .execute_query("SET search_path TO row_dump_it_nowhere")
                    .await?;
                Ok(Box::new(client) as Box<dyn DatabaseClient>)
            },
            &mut out,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DumpError::Query(_)));
    assert!(out.is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn test_dump_unreachable_host_prints_nothing() {
    let config = ConnectionConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        ..ConnectionConfig::default()
    };

    let mut dumper = RowDumper::new(settings_for(config));
    let mut out = Vec::new();
    let err = dumper.run(&mut out).await.unwrap_err();

    assert!(matches!(err, DumpError::Connection(_)));
    assert_eq!(dumper.stage(), Stage::Connecting);
    assert!(out.is_empty());
}
