//! rolodex CLI - runs the person/contacts HTTP service
//!
//! - `serve`: HTTP API over PostgreSQL
//! - `migrate`: create the schema and exit
//!
//! Settings come from flags, then environment variables, then a `.env` file
//! in the working directory.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "rolodex",
    author,
    version,
    about = "Person records with contact lists, served over HTTP"
)]
struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create missing database tables and exit
    Migrate(commands::migrate::MigrateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init(&TracingConfig { debug: cli.debug }).ok();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::Migrate(args) => commands::run_migrate(args).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from([
            "rolodex",
            "serve",
            "--database-url",
            "postgres://localhost/rolodex",
        ])
        .unwrap();

        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.bind.port(), 3000);
        assert_eq!(args.request_timeout, 30);
        assert!(!args.skip_migrations);
        assert_eq!(args.db.pool_config().max_connections, 10);
    }

    #[test]
    fn serve_overrides() {
        let cli = Cli::try_parse_from([
            "rolodex",
            "--debug",
            "serve",
            "--bind",
            "0.0.0.0:8080",
            "--database-url",
            "postgres://db/rolodex",
            "--max-connections",
            "3",
            "--acquire-timeout",
            "5",
            "--cors-permissive",
        ])
        .unwrap();

        assert!(cli.debug);
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.bind.port(), 8080);
        assert!(args.cors_permissive);
        let pool = args.db.pool_config();
        assert_eq!(pool.max_connections, 3);
        assert_eq!(pool.acquire_timeout.as_secs(), 5);
    }
}
