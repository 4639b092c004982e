use anyhow::Result;
use songlink_anisong::ingest::bind_song;
use songlink_anisong::{AnisongClient, Config};
use songlink_core::model::TrackId;

use crate::prompt::StdinOperator;

pub async fn run_bind(config: &Config, track_id: String) -> Result<()> {
    let db = super::open_database(config)?;
    let catalog = AnisongClient::new(config)?;
    let track = TrackId::new(track_id.trim());

    match bind_song(&db, &catalog, &mut StdinOperator, &track).await? {
        Some(outcome) => {
            println!("\n✓ Track {} bound to group {}", track, outcome.group_id);
        }
        None => println!("Nothing was changed"),
    }

    Ok(())
}
