//! # Database Connectivity
//!
//! The readiness probe only needs to know whether a database connection can be
//! opened and closed again. This module defines that capability as a trait so
//! the HTTP layer never depends on a concrete driver, plus the PostgreSQL
//! implementation backed by the application's [`PgPool`].
//!
//! ## Resource Handling
//!
//! A connection handed out by [`DatabaseConnector::open`] is wrapped in a
//! [`ConnectionLease`]. The lease releases the handle when it is dropped, so a
//! probe that times out or is cancelled mid-flight never leaks a connection.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, pool::PoolConnection};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};

/// Reasons a readiness probe can fail.
///
/// The `Display` text of every variant is safe to hand to unauthenticated
/// callers: driver errors are reduced to a fixed category and the full error
/// is only reachable through [`std::error::Error::source`].
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("database connection timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("readiness probe cancelled")]
    Cancelled,

    #[error("database unreachable: {}", driver_failure_kind(.0))]
    Unreachable(#[source] sqlx::Error),
}

/// Short, non-sensitive label for a driver error.
fn driver_failure_kind(e: &sqlx::Error) -> &'static str {
    match e {
        sqlx::Error::Io(_) => "i/o error",
        sqlx::Error::Tls(_) => "tls error",
        sqlx::Error::Protocol(_) => "protocol error",
        sqlx::Error::Database(_) => "database error",
        sqlx::Error::Configuration(_) => "configuration error",
        sqlx::Error::PoolTimedOut => "pool timed out",
        sqlx::Error::PoolClosed => "pool closed",
        sqlx::Error::WorkerCrashed => "driver worker crashed",
        _ => "driver error",
    }
}

/// Something that can open a connection to the backing database.
#[async_trait]
pub trait DatabaseConnector: Send + Sync {
    /// Opens a connection. Cancelling the returned future must not leak it.
    async fn open(&self) -> Result<Box<dyn DatabaseConnection>, ProbeError>;
}

/// An open connection returned by a [`DatabaseConnector`].
///
/// Dropping the box releases the connection; [`close`](Self::close) is the
/// orderly variant of the same thing.
#[async_trait]
pub trait DatabaseConnection: Send {
    async fn close(self: Box<Self>) -> Result<(), ProbeError>;
}

/// [`DatabaseConnector`] backed by the shared PostgreSQL pool.
///
/// Opening a connection acquires one from the pool, which either establishes a
/// fresh connection or pings an idle one. Closing hands it back to the pool.
#[derive(Clone)]
pub struct PgConnector {
    pool: PgPool,
}

impl PgConnector {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatabaseConnector for PgConnector {
    async fn open(&self) -> Result<Box<dyn DatabaseConnection>, ProbeError> {
        let conn = self.pool.acquire().await.map_err(ProbeError::Unreachable)?;
        Ok(Box::new(PooledConnection(conn)))
    }
}

struct PooledConnection(PoolConnection<Postgres>);

#[async_trait]
impl DatabaseConnection for PooledConnection {
    async fn close(self: Box<Self>) -> Result<(), ProbeError> {
        // returning to the pool happens in PoolConnection's Drop
        drop(self.0);
        Ok(())
    }
}

/// Scoped ownership of an open connection.
///
/// Call [`close`](Self::close) on the happy path. Any other exit (an early
/// return, a timeout, a dropped request future) releases the connection
/// through `Drop`.
pub struct ConnectionLease {
    conn: Option<Box<dyn DatabaseConnection>>,
}

impl ConnectionLease {
    pub fn new(conn: Box<dyn DatabaseConnection>) -> Self {
        Self { conn: Some(conn) }
    }

    pub async fn close(mut self) -> Result<(), ProbeError> {
        match self.conn.take() {
            Some(conn) => conn.close().await,
            None => Ok(()),
        }
    }
}

impl Drop for ConnectionLease {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            debug!("Releasing database connection that was not closed explicitly");
            drop(conn);
        }
    }
}

/// Opens a connection and closes it again.
///
/// The round trip is abandoned with [`ProbeError::Timeout`] once `timeout`
/// elapses, or with [`ProbeError::Cancelled`] as soon as `cancel` fires. In
/// both cases the in-flight future is dropped, which releases any connection
/// it was holding.
#[instrument(skip_all, fields(timeout_ms = timeout.as_millis() as u64))]
pub async fn probe_connection(
    connector: &dyn DatabaseConnector,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<(), ProbeError> {
    let round_trip = async {
        let lease = ConnectionLease::new(connector.open().await?);
        trace!("Database connection opened");
        lease.close().await?;
        trace!("Database connection closed");
        Ok::<(), ProbeError>(())
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ProbeError::Cancelled),
        result = tokio::time::timeout(timeout, round_trip) => {
            result.unwrap_or_else(|_| Err(ProbeError::Timeout(timeout)))
        }
    }
}
