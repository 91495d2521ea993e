//! Connection integration tests.
//!
//! Tests database connectivity and error handling.

use pg_row_dump::config::ConnectionConfig;
use pg_row_dump::db::{DatabaseClient, PostgresClient};
use pg_row_dump::error::DumpError;

/// Helper to get test database URL from environment.
fn get_test_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

#[tokio::test]
async fn test_connect_with_valid_credentials() {
    let Some(url) = get_test_database_url() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let config = ConnectionConfig::from_connection_string(&url).unwrap();

    let mut client = PostgresClient::connect(&config).await.unwrap();
    client.close().await.unwrap();
}

#[tokio::test(flavor = "current_thread")]
async fn test_connect_with_invalid_host() {
    let config = ConnectionConfig {
        host: "invalid.host.that.does.not.exist.local".to_string(),
        ..ConnectionConfig::default()
    };

    let err = PostgresClient::connect(&config).await.unwrap_err();

    assert!(matches!(err, DumpError::Connection(_)));
    assert_eq!(err.category(), "Connection Error");
}

#[tokio::test(flavor = "current_thread")]
async fn test_connect_with_refused_port() {
    // Port 1 on loopback is never a Postgres server.
    let config = ConnectionConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        ..ConnectionConfig::default()
    };

    let err = PostgresClient::connect(&config).await.unwrap_err();
    assert!(matches!(err, DumpError::Connection(_)));
    assert!(
        err.to_string().contains("127.0.0.1:1"),
        "Expected host and port in error, got: {err}"
    );
}

#[tokio::test]
async fn test_connect_with_wrong_password() {
    let Some(url) = get_test_database_url() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let mut config = ConnectionConfig::from_connection_string(&url).unwrap();
    config.password = "definitely-not-the-password".to_string();

    match PostgresClient::connect(&config).await {
        Err(err) => assert!(matches!(err, DumpError::Connection(_))),
        // Servers using trust authentication accept any password.
        Ok(mut client) => client.close().await.unwrap(),
    }
}
