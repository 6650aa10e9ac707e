//! Database layer - connection pool, migrations and repositories
//!
//! # Design Principles
//!
//! - Connection pool injected by the caller - no global handle
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - Transactions for multi-step writes, rolled back on drop

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{create_pool_with_options, PoolConfig};
pub use sqlx::PgPool;
pub use repos::*;
