//! Song-group reconciliation.
//!
//! A song group is the canonical identity of a song: every Spotify track and
//! every catalog row believed to be the same recording points at one group.
//! Groups are keyed by the exact pair (song title, artist id list). The list
//! is compared in order, with no sorting, so callers must pass the ids in the
//! order the catalog reports them.

use rusqlite::OptionalExtension;

use crate::error::{Error, Result};
use crate::model::{ArtistId, GroupId, SongGroup};
use crate::schema::codec::{encode_list, json_column};
use crate::schema::Database;

impl Database {
    /// Return the group for `(song_title, artist_ids)`, creating it if absent.
    ///
    /// The insert relies on the `UNIQUE(song_title, artist_ids)` constraint
    /// and `ON CONFLICT DO NOTHING`, so two calls can never produce two
    /// groups for one key.
    pub fn resolve_group(&self, song_title: &str, artist_ids: &[ArtistId]) -> Result<GroupId> {
        let encoded = encode_list(artist_ids)?;

        self.atomically(|db| {
            let inserted = db.conn().execute(
                "INSERT INTO song_groups (song_title, artist_ids) VALUES (?1, ?2)
                 ON CONFLICT(song_title, artist_ids) DO NOTHING",
                rusqlite::params![song_title, encoded],
            )?;

            let group_id: GroupId = db.conn().query_row(
                "SELECT group_id FROM song_groups WHERE song_title = ?1 AND artist_ids = ?2",
                rusqlite::params![song_title, encoded],
                |row| row.get(0),
            )?;

            if inserted > 0 {
                log::info!(
                    "Created song group {} for \"{}\" {}",
                    group_id,
                    song_title,
                    encoded
                );
            } else {
                log::debug!(
                    "Reusing song group {} for \"{}\" {}",
                    group_id,
                    song_title,
                    encoded
                );
            }

            Ok(group_id)
        })
    }

    /// Exact-match lookup without creating anything.
    pub fn find_group(&self, song_title: &str, artist_ids: &[ArtistId]) -> Result<Option<SongGroup>> {
        let group = self
            .conn()
            .query_row(
                "SELECT group_id, song_title, artist_ids FROM song_groups
                 WHERE song_title = ?1 AND artist_ids = ?2",
                rusqlite::params![song_title, encode_list(artist_ids)?],
                row_to_group,
            )
            .optional()?;
        Ok(group)
    }

    pub fn get_group(&self, group_id: GroupId) -> Result<SongGroup> {
        self.conn()
            .query_row(
                "SELECT group_id, song_title, artist_ids FROM song_groups WHERE group_id = ?1",
                [group_id],
                row_to_group,
            )
            .optional()?
            .ok_or_else(|| Error::not_found("song group", group_id))
    }
}

fn row_to_group(row: &rusqlite::Row) -> rusqlite::Result<SongGroup> {
    Ok(SongGroup {
        group_id: row.get(0)?,
        song_title: row.get(1)?,
        artist_ids: json_column(row, 2)?,
    })
}
