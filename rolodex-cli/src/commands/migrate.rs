//! Schema migration command

use anyhow::{Context, Result};
use clap::Parser;

use rolodex_server::db::migrations;

use super::DatabaseArgs;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,
}

/// Create any missing tables and exit
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let pool = args.db.connect().await?;
    let result = migrations::run(&pool)
        .await
        .context("Failed to run migrations");
    pool.close().await;
    result
}
