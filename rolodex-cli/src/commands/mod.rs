//! Subcommands

pub mod migrate;
pub mod serve;

pub use migrate::run_migrate;
pub use serve::run_serve;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use rolodex_server::db::{create_pool_with_options, PgPool, PoolConfig};

/// Database connection options shared by every command
#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Database URL (falls back to DATABASE_URL, also read from .env)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Maximum pooled connections
    #[arg(long, env = "ROLODEX_MAX_CONNECTIONS", default_value_t = 10)]
    pub max_connections: u32,

    /// Seconds to wait for a free connection before failing the request
    #[arg(long, env = "ROLODEX_ACQUIRE_TIMEOUT", default_value_t = 30)]
    pub acquire_timeout: u64,
}

impl DatabaseArgs {
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_secs(self.acquire_timeout),
        }
    }

    /// Connect the pool; the caller owns it and closes it on exit.
    pub async fn connect(&self) -> Result<PgPool> {
        create_pool_with_options(&self.database_url, self.pool_config())
            .await
            .context("Failed to create database pool")
    }
}
