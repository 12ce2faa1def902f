//! Centralized configuration (environment variables + defaults).
//!
//! Call `dotenv::dotenv().ok()` before reading so a local `.env` file is honoured.

use anyhow::Context;
use std::net::SocketAddr;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://database.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// SQLite database URL. The file is created on first open.
pub fn database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Address the HTTP server listens on.
pub fn bind_addr() -> anyhow::Result<SocketAddr> {
    let raw = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    parse_bind_addr(&raw)
}

/// Upper bound of the connection pool.
pub fn max_connections() -> anyhow::Result<u32> {
    match std::env::var("DB_MAX_CONNECTIONS") {
        Ok(raw) => parse_max_connections(&raw),
        Err(_) => Ok(DEFAULT_MAX_CONNECTIONS),
    }
}

fn parse_bind_addr(raw: &str) -> anyhow::Result<SocketAddr> {
    raw.trim()
        .parse::<SocketAddr>()
        .with_context(|| format!("BIND_ADDR must be a socket address like 0.0.0.0:3000, got '{}'", raw))
}

fn parse_max_connections(raw: &str) -> anyhow::Result<u32> {
    let n = raw
        .trim()
        .parse::<u32>()
        .with_context(|| format!("DB_MAX_CONNECTIONS must be a valid u32, got '{}'", raw))?;
    Ok(n.max(1))
}
