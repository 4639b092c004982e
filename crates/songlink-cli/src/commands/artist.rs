use anyhow::Result;
use songlink_anisong::ingest::add_artist;
use songlink_anisong::{AnisongClient, Config};

use crate::prompt::StdinOperator;

pub async fn run_artist_add(config: &Config, name: &str, spotify_id: &str) -> Result<()> {
    let db = super::open_database(config)?;
    let catalog = AnisongClient::new(config)?;

    if let Some(artist) = add_artist(&db, &catalog, &mut StdinOperator, name, spotify_id).await? {
        println!(
            "✓ Stored artist {} ({}) with Spotify artist {}",
            artist.id,
            artist.names.join(", "),
            spotify_id
        );
    }

    Ok(())
}
