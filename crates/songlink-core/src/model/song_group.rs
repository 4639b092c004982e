use serde::{Deserialize, Serialize};

use crate::model::ids::{ArtistId, GroupId, TrackId};

/// A canonical song: one row per distinct (title, artist id list).
///
/// The artist id list is ordered and the order is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongGroup {
    pub group_id: GroupId,
    pub song_title: String,
    pub artist_ids: Vec<ArtistId>,
}

/// A Spotify track bound to a song group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupLink {
    pub spotify_id: TrackId,
    pub group_id: GroupId,
}
