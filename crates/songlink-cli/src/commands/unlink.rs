use anyhow::Result;
use songlink_anisong::Config;
use songlink_core::model::TrackId;
use songlink_core::{Operator, UnlinkOutcome};

use crate::prompt::StdinOperator;

/// Remove a track's link after the operator confirms the track.
pub fn run_unlink(config: &Config, track_id: String) -> Result<()> {
    let db = super::open_database(config)?;
    let track = TrackId::new(track_id.trim());
    let mut operator = StdinOperator;

    if !operator.confirm(&format!("Correct link? : {}\n", track.url()))? {
        println!("Did nothing");
        return Ok(());
    }

    match db.unlink_track(&track)? {
        UnlinkOutcome::NotFound => println!("No link found for track {}", track),
        UnlinkOutcome::Removed {
            group_ids,
            anime_deleted,
        } => {
            println!(
                "✓ Removed link to groups {:?} and {} anime rows",
                group_ids, anime_deleted
            );
        }
    }

    Ok(())
}
