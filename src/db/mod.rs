//! Post store: the SQLite table the ingest bot fills and the parser reads.
//!
//! - `model`: row types.
//! - `repo`: pool setup, migrations and queries.

pub mod model;
pub mod repo;

pub use repo::*;

pub use model::{NewPost, StoredPost};
