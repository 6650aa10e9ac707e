//! rolodex-server: persons and their contact lists over HTTP
//!
//! - [`models`]: validated inputs (`NewPerson`, `PersonPatch`) and pagination
//! - [`db`]: pool, migrations, and the transactional person repository
//! - [`http`]: axum router, extractors, and error mapping

pub mod db;
pub mod http;
pub mod models;

pub use db::{create_pool_with_options, DbError, PersonRepo, PoolConfig};
pub use http::{build_router, run_server, ServerConfig};
