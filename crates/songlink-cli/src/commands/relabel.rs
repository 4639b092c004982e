use anyhow::Result;
use songlink_anisong::Config;
use songlink_core::model::AnnSongId;
use songlink_core::triage::relabel_song;

use crate::prompt::StdinOperator;

pub fn run_relabel(config: &Config, ann_song_id: i64) -> Result<()> {
    let db = super::open_database(config)?;
    let mut operator = StdinOperator;

    if let Some((anilist_id, updated)) =
        relabel_song(&db, AnnSongId::new(ann_song_id), &mut operator)?
    {
        println!("✓ Set AniList id {} on {} rows", anilist_id, updated);
    }

    Ok(())
}
