pub mod artist;
pub mod backfill;
pub mod bind;
pub mod config;
pub mod relabel;
pub mod status;
pub mod triage;
pub mod unlink;

use anyhow::{Context, Result};
use songlink_anisong::Config;
use songlink_core::schema::Database;

pub use artist::run_artist_add;
pub use backfill::run_backfill;
pub use bind::run_bind;
pub use relabel::run_relabel;
pub use status::show_status;
pub use triage::run_triage;
pub use unlink::run_unlink;

/// Open the configured database, creating its directory if needed.
pub fn open_database(config: &Config) -> Result<Database> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create database directory")?;
    }
    log::debug!("Opening database {}", config.database_path.display());
    Database::open(&config.database_path).with_context(|| {
        format!(
            "Failed to open database at {}",
            config.database_path.display()
        )
    })
}
