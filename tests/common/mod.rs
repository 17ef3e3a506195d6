#![allow(dead_code)]

use std::sync::{Arc, Once};
use std::time::Duration;

use async_trait::async_trait;
use clembot_api::{
    app_with_state,
    middleware::BOT_MASTER,
    models::AppState,
    services::{
        database::{DatabaseConnection, DatabaseConnector, PgConnector, ProbeError},
        jwt::JwtService,
    },
};
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub const TEST_JWT_SECRET: &[u8] = b"integration-test-secret";

pub fn init_tracing_once() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("clembot_api=debug")
            .with_test_writer()
            .init();
    });
}

/// A running server plus the handles tests need to poke at it.
pub struct TestApp {
    /// Format: `http://127.0.0.1:8492`
    pub address: String,
    /// Signs tokens the server will accept
    pub jwt: JwtService,
    /// Cancelling simulates the start of a graceful shutdown
    pub shutdown: CancellationToken,
}

impl TestApp {
    pub fn operator_token(&self) -> String {
        self.jwt
            .create_access_token("clembot", &[BOT_MASTER])
            .expect("Failed to sign operator token")
    }

    pub fn user_token(&self) -> String {
        self.jwt
            .create_access_token("regular-user", &[])
            .expect("Failed to sign user token")
    }
}

/// Spawns the application on a random port against the given connector.
pub async fn spawn_app(database: Arc<dyn DatabaseConnector>) -> TestApp {
    spawn_app_with_timeout(database, Duration::from_secs(2)).await
}

pub async fn spawn_app_with_pool(pool: PgPool) -> TestApp {
    spawn_app(Arc::new(PgConnector::new(pool))).await
}

pub async fn spawn_app_with_timeout(
    database: Arc<dyn DatabaseConnector>,
    readiness_timeout: Duration,
) -> TestApp {
    init_tracing_once();

    let shutdown = CancellationToken::new();
    let state = Arc::new(AppState::new(
        database,
        JwtService::from_secret(TEST_JWT_SECRET),
        readiness_timeout,
        shutdown.clone(),
    ));

    // Randomly choose an available port
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port at localhost");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app_with_state(state)).await.unwrap();
    });

    let address = format!("http://127.0.0.1:{port}");

    // Wait for server to be ready
    let client = reqwest::Client::new();
    for _ in 0..10 {
        if client.get(format!("{address}/livez")).send().await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    TestApp {
        address,
        jwt: JwtService::from_secret(TEST_JWT_SECRET),
        shutdown,
    }
}

/// A pool pointing at a port nothing listens on.
pub fn unreachable_pool() -> PgPool {
    let options = PgConnectOptions::new()
        .host("127.0.0.1")
        .port(1)
        .username("nobody")
        .database("nowhere");

    PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(500))
        .connect_lazy_with(options)
}

/// Connector whose `open` never completes.
pub struct HangingConnector;

#[async_trait]
impl DatabaseConnector for HangingConnector {
    async fn open(&self) -> Result<Box<dyn DatabaseConnection>, ProbeError> {
        std::future::pending().await
    }
}

/// Connector whose `open` fails immediately with the produced error.
pub struct FailingConnector {
    pub make_error: fn() -> ProbeError,
}

#[async_trait]
impl DatabaseConnector for FailingConnector {
    async fn open(&self) -> Result<Box<dyn DatabaseConnection>, ProbeError> {
        Err((self.make_error)())
    }
}
