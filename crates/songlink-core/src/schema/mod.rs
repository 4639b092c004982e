//! SQLite schema, migrations, and row codecs.

pub(crate) mod codec;
pub mod db;
pub mod migrations;

pub use db::{Database, StoreCounts};
