use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{AnnId, AnnSongId, ArtistId, GroupId, TrackId};

/// One denormalized catalog row: an anime, one of its songs, and the
/// song's credits.
///
/// Rows are keyed by (`ann_id`, `ann_song_id`). `song_group_id` stays
/// empty until the row has been reconciled to a [`SongGroup`].
///
/// [`SongGroup`]: crate::model::SongGroup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeRecord {
    pub ann_id: AnnId,
    pub ann_song_id: AnnSongId,
    pub title_eng: String,
    pub title_jpn: String,

    /// Song slot within the anime, e.g. "Opening 1" or "Insert Song".
    pub song_type: String,
    pub song_name: String,

    pub artist_names: Vec<String>,
    pub artist_ids: Vec<ArtistId>,
    pub composer_ids: Vec<ArtistId>,
    pub arranger_ids: Vec<ArtistId>,

    /// Track the row was originally imported from, if any.
    pub spotify_id: Option<TrackId>,

    pub mal_id: Option<i64>,
    pub anilist_id: Option<i64>,
    pub anidb_id: Option<i64>,
    pub kitsu_id: Option<i64>,

    pub song_group_id: Option<GroupId>,
    pub last_updated: DateTime<Utc>,
}

impl AnimeRecord {
    #[must_use]
    pub fn new(
        ann_id: AnnId,
        ann_song_id: AnnSongId,
        title_eng: impl Into<String>,
        song_name: impl Into<String>,
        artist_ids: Vec<ArtistId>,
    ) -> Self {
        let title_eng = title_eng.into();
        Self {
            ann_id,
            ann_song_id,
            title_jpn: title_eng.clone(),
            title_eng,
            song_type: String::new(),
            song_name: song_name.into(),
            artist_names: Vec::new(),
            artist_ids,
            composer_ids: Vec::new(),
            arranger_ids: Vec::new(),
            spotify_id: None,
            mal_id: None,
            anilist_id: None,
            anidb_id: None,
            kitsu_id: None,
            song_group_id: None,
            last_updated: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_song_type(mut self, song_type: impl Into<String>) -> Self {
        self.song_type = song_type.into();
        self
    }

    #[must_use]
    pub fn with_spotify_id(mut self, spotify_id: TrackId) -> Self {
        self.spotify_id = Some(spotify_id);
        self
    }

    #[must_use]
    pub fn with_anilist_id(mut self, anilist_id: i64) -> Self {
        self.anilist_id = Some(anilist_id);
        self
    }

    /// Human-readable label used in operator confirmations.
    #[must_use]
    pub fn display_title(&self) -> String {
        if self.song_type.is_empty() {
            self.title_eng.clone()
        } else {
            format!("{} ({})", self.title_eng, self.song_type)
        }
    }
}
