//! Linking Spotify tracks and catalog rows to song groups.
//!
//! Many tracks and many anime rows may point at one group. Every operation
//! that writes to more than one table runs inside [`Database::atomically`].

use rusqlite::OptionalExtension;

use crate::error::Result;
use crate::model::{AnimeRecord, ArtistId, GroupId, GroupLink, TrackId};
use crate::schema::codec::encode_list;
use crate::schema::db::ANIME_COLUMNS;
use crate::schema::Database;

/// Result of [`Database::unlink_track`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlinkOutcome {
    /// No link existed for the track; nothing was deleted.
    NotFound,
    /// The link rows were removed along with every anime row of their groups.
    Removed {
        group_ids: Vec<GroupId>,
        anime_deleted: usize,
    },
}

/// Result of [`Database::bind_track`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindOutcome {
    pub group_id: GroupId,
    /// The group the track was already linked to, if any. A pre-existing
    /// link is never overwritten.
    pub previous_group: Option<GroupId>,
    /// Display titles of the anime rows stamped with `group_id`.
    pub titles: Vec<String>,
}

/// Counters reported by [`Database::backfill_groups`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillSummary {
    /// Rows that received a group.
    pub assigned: usize,
    /// Rows whose group came from their track's existing link.
    pub from_existing_link: usize,
    /// New track links created along the way.
    pub links_created: usize,
}

impl Database {
    /// Bind a track to a group. Re-linking an already linked track is a no-op.
    pub fn link_track(&self, track_id: &TrackId, group_id: GroupId) -> Result<()> {
        let inserted = self.conn().execute(
            "INSERT INTO song_group_links (spotify_id, group_id) VALUES (?1, ?2)
             ON CONFLICT(spotify_id) DO NOTHING",
            rusqlite::params![track_id, group_id],
        )?;

        if inserted > 0 {
            log::info!("Linked track {} to group {}", track_id, group_id);
        } else if let Some(existing) = self.group_for_track(track_id)? {
            if existing == group_id {
                log::debug!("Track {} already linked to group {}", track_id, group_id);
            } else {
                log::warn!(
                    "Track {} stays linked to group {}; ignored link to group {}",
                    track_id,
                    existing,
                    group_id
                );
            }
        }
        Ok(())
    }

    pub fn group_for_track(&self, track_id: &TrackId) -> Result<Option<GroupId>> {
        let group_id = self
            .conn()
            .query_row(
                "SELECT group_id FROM song_group_links WHERE spotify_id = ?1",
                [track_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(group_id)
    }

    /// Every track bound to `group_id`, ordered by track id.
    pub fn links_in_group(&self, group_id: GroupId) -> Result<Vec<GroupLink>> {
        let mut stmt = self.conn().prepare(
            "SELECT spotify_id, group_id FROM song_group_links
             WHERE group_id = ?1 ORDER BY spotify_id",
        )?;
        let links = stmt
            .query_map([group_id], |row| {
                Ok(GroupLink {
                    spotify_id: row.get(0)?,
                    group_id: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(links)
    }

    /// Stamp `group_id` on every anime row with this exact song signature.
    ///
    /// Returns the display titles of the touched rows, sorted. No match is
    /// not an error.
    pub fn update_anime_group(
        &self,
        song_name: &str,
        artist_ids: &[ArtistId],
        group_id: GroupId,
    ) -> Result<Vec<String>> {
        let encoded = encode_list(artist_ids)?;

        self.atomically(|db| {
            let updated = db.conn().execute(
                "UPDATE animes SET song_group_id = ?1 WHERE song_name = ?2 AND artist_ids = ?3",
                rusqlite::params![group_id, song_name, encoded],
            )?;

            let rows = db.query_animes(
                &format!(
                    "SELECT {ANIME_COLUMNS} FROM animes
                     WHERE song_name = ?1 AND artist_ids = ?2
                     ORDER BY title_eng, ann_id"
                ),
                rusqlite::params![song_name, encoded],
            )?;

            log::info!(
                "Assigned group {} to {} anime rows for \"{}\"",
                group_id,
                updated,
                song_name
            );
            Ok(rows.iter().map(AnimeRecord::display_title).collect())
        })
    }

    /// Remove a track's link and every anime row of the groups it pointed at.
    ///
    /// When no link exists nothing is deleted and [`UnlinkOutcome::NotFound`]
    /// is returned.
    pub fn unlink_track(&self, track_id: &TrackId) -> Result<UnlinkOutcome> {
        self.atomically(|db| {
            let mut stmt = db
                .conn()
                .prepare("SELECT group_id FROM song_group_links WHERE spotify_id = ?1")?;
            let group_ids = stmt
                .query_map([track_id], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<GroupId>>>()?;

            if group_ids.is_empty() {
                log::info!("No link found for track {}", track_id);
                return Ok(UnlinkOutcome::NotFound);
            }

            db.conn().execute(
                "DELETE FROM song_group_links WHERE spotify_id = ?1",
                [track_id],
            )?;

            let mut anime_deleted = 0;
            for group_id in &group_ids {
                anime_deleted += db
                    .conn()
                    .execute("DELETE FROM animes WHERE song_group_id = ?1", [group_id])?;
            }

            log::info!(
                "Unlinked track {} from groups {:?}, deleted {} anime rows",
                track_id,
                group_ids,
                anime_deleted
            );
            Ok(UnlinkOutcome::Removed {
                group_ids,
                anime_deleted,
            })
        })
    }

    /// Resolve the group for a song, link the track to it, and stamp the
    /// matching anime rows, all in one atomic unit.
    pub fn bind_track(
        &self,
        track_id: &TrackId,
        song_title: &str,
        artist_ids: &[ArtistId],
    ) -> Result<BindOutcome> {
        self.atomically(|db| {
            let group_id = db.resolve_group(song_title, artist_ids)?;
            let previous_group = db.group_for_track(track_id)?;
            db.link_track(track_id, group_id)?;
            let titles = db.update_anime_group(song_title, artist_ids, group_id)?;
            Ok(BindOutcome {
                group_id,
                previous_group,
                titles,
            })
        })
    }

    /// Give every ungrouped anime row a group.
    ///
    /// A row whose track is already linked joins that link's group. Any other
    /// row resolves the group from its song name and artist ids, and its
    /// track (if it has one) is linked to that group. Each row commits on
    /// its own, so an interrupted backfill keeps the rows already done.
    pub fn backfill_groups(&self) -> Result<BackfillSummary> {
        let mut summary = BackfillSummary::default();

        for anime in self.list_ungrouped_animes()? {
            self.atomically(|db| {
                let linked = match &anime.spotify_id {
                    Some(track_id) => db.group_for_track(track_id)?,
                    None => None,
                };

                let group_id = if let Some(group_id) = linked {
                    summary.from_existing_link += 1;
                    group_id
                } else {
                    let group_id = db.resolve_group(&anime.song_name, &anime.artist_ids)?;
                    if let Some(track_id) = &anime.spotify_id {
                        db.link_track(track_id, group_id)?;
                        summary.links_created += 1;
                    }
                    group_id
                };

                db.conn().execute(
                    "UPDATE animes SET song_group_id = ?1 WHERE ann_id = ?2 AND ann_song_id = ?3",
                    rusqlite::params![group_id, anime.ann_id, anime.ann_song_id],
                )?;
                summary.assigned += 1;
                Ok(())
            })?;
        }

        log::info!(
            "Backfill assigned {} rows ({} via existing links, {} new links)",
            summary.assigned,
            summary.from_existing_link,
            summary.links_created
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnId, AnnSongId};

    fn ids(raw: &[i64]) -> Vec<ArtistId> {
        raw.iter().copied().map(ArtistId::new).collect()
    }

    fn anime(ann_id: i64, ann_song_id: i64, title: &str, song: &str, artists: &[i64]) -> AnimeRecord {
        AnimeRecord::new(
            AnnId::new(ann_id),
            AnnSongId::new(ann_song_id),
            title,
            song,
            ids(artists),
        )
    }

    fn link_count(db: &Database, track: &str) -> i64 {
        db.conn()
            .query_row(
                "SELECT COUNT(*) FROM song_group_links WHERE spotify_id = ?1",
                [track],
                |row| row.get(0),
            )
            .unwrap()
    }

    fn anime_count(db: &Database) -> i64 {
        db.conn()
            .query_row("SELECT COUNT(*) FROM animes", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_link_track_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let group = db.resolve_group("Renai Circulation", &ids(&[101])).unwrap();
        let track = TrackId::new("trk1");

        db.link_track(&track, group).unwrap();
        db.link_track(&track, group).unwrap();

        assert_eq!(link_count(&db, "trk1"), 1);
        assert_eq!(db.group_for_track(&track).unwrap(), Some(group));
    }

    #[test]
    fn test_link_track_keeps_first_group() {
        let db = Database::open_in_memory().unwrap();
        let first = db.resolve_group("Renai Circulation", &ids(&[101])).unwrap();
        let second = db.resolve_group("Staple Stable", &ids(&[101])).unwrap();
        let track = TrackId::new("trk1");

        db.link_track(&track, first).unwrap();
        db.link_track(&track, second).unwrap();

        assert_eq!(db.group_for_track(&track).unwrap(), Some(first));
    }

    #[test]
    fn test_many_tracks_share_a_group() {
        let db = Database::open_in_memory().unwrap();
        let group = db.resolve_group("Renai Circulation", &ids(&[101])).unwrap();

        db.link_track(&TrackId::new("trk1"), group).unwrap();
        db.link_track(&TrackId::new("trk2"), group).unwrap();

        let tracks: Vec<TrackId> = db
            .links_in_group(group)
            .unwrap()
            .into_iter()
            .map(|link| link.spotify_id)
            .collect();
        assert_eq!(tracks, vec![TrackId::new("trk1"), TrackId::new("trk2")]);
    }

    #[test]
    fn test_update_anime_group_with_no_match() {
        let db = Database::open_in_memory().unwrap();
        let group = db.resolve_group("Renai Circulation", &ids(&[101])).unwrap();

        let titles = db
            .update_anime_group("Renai Circulation", &ids(&[101]), group)
            .unwrap();

        assert!(titles.is_empty());
    }

    #[test]
    fn test_update_anime_group_matches_exact_signature() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_anime(&anime(1, 10, "Bakemonogatari", "Renai Circulation", &[101, 102]))
            .unwrap();
        db.upsert_anime(&anime(2, 11, "Monogatari Series", "Renai Circulation", &[101, 102]))
            .unwrap();
        db.upsert_anime(&anime(3, 12, "Reordered", "Renai Circulation", &[102, 101]))
            .unwrap();
        db.upsert_anime(&anime(4, 13, "Other Song", "Staple Stable", &[101, 102]))
            .unwrap();
        let group = db.resolve_group("Renai Circulation", &ids(&[101, 102])).unwrap();

        let titles = db
            .update_anime_group("Renai Circulation", &ids(&[101, 102]), group)
            .unwrap();

        assert_eq!(titles, vec!["Bakemonogatari", "Monogatari Series"]);
        assert_eq!(db.animes_in_group(group).unwrap().len(), 2);
        assert_eq!(db.list_ungrouped_animes().unwrap().len(), 2);
    }

    #[test]
    fn test_update_anime_group_returns_display_titles() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_anime(
            &anime(2, 11, "Monogatari Series Second Season", "Renai Circulation", &[101])
                .with_song_type("Ending 2"),
        )
        .unwrap();
        db.upsert_anime(
            &anime(1, 10, "Bakemonogatari", "Renai Circulation", &[101]).with_song_type("Opening 4"),
        )
        .unwrap();
        let group = db.resolve_group("Renai Circulation", &ids(&[101])).unwrap();

        let titles = db
            .update_anime_group("Renai Circulation", &ids(&[101]), group)
            .unwrap();

        assert_eq!(
            titles,
            vec![
                "Bakemonogatari (Opening 4)",
                "Monogatari Series Second Season (Ending 2)",
            ]
        );
    }

    #[test]
    fn test_unlink_cascades_to_group_rows_only() {
        let db = Database::open_in_memory().unwrap();
        let target = db.resolve_group("Renai Circulation", &ids(&[101])).unwrap();
        let other = db.resolve_group("Staple Stable", &ids(&[101])).unwrap();
        db.upsert_anime(&anime(1, 10, "Bakemonogatari", "Renai Circulation", &[101]))
            .unwrap();
        db.upsert_anime(&anime(2, 11, "Nisemonogatari", "Renai Circulation", &[101]))
            .unwrap();
        db.upsert_anime(&anime(3, 12, "Nisemonogatari", "Staple Stable", &[101]))
            .unwrap();
        db.update_anime_group("Renai Circulation", &ids(&[101]), target)
            .unwrap();
        db.update_anime_group("Staple Stable", &ids(&[101]), other)
            .unwrap();
        db.link_track(&TrackId::new("trk1"), target).unwrap();
        db.link_track(&TrackId::new("trk2"), other).unwrap();

        let outcome = db.unlink_track(&TrackId::new("trk1")).unwrap();

        assert_eq!(
            outcome,
            UnlinkOutcome::Removed {
                group_ids: vec![target],
                anime_deleted: 2,
            }
        );
        assert_eq!(link_count(&db, "trk1"), 0);
        assert_eq!(link_count(&db, "trk2"), 1);
        assert!(db.animes_in_group(target).unwrap().is_empty());
        assert_eq!(db.animes_in_group(other).unwrap().len(), 1);
    }

    #[test]
    fn test_unlink_unknown_track_deletes_nothing() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_anime(&anime(1, 10, "Bakemonogatari", "Renai Circulation", &[101]))
            .unwrap();

        let outcome = db.unlink_track(&TrackId::new("missing")).unwrap();

        assert_eq!(outcome, UnlinkOutcome::NotFound);
        assert_eq!(anime_count(&db), 1);
    }

    #[test]
    fn test_end_to_end_resolve_link_update() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_anime(&anime(1, 10, "Bakemonogatari", "Renai Circulation", &[101, 102]))
            .unwrap();
        db.upsert_anime(&anime(2, 11, "Monogatari Series Second Season", "Renai Circulation", &[101, 102]))
            .unwrap();

        let group = db.resolve_group("Renai Circulation", &ids(&[101, 102])).unwrap();
        let track = TrackId::new("5P8lyudWE7HQxb4ludLbEm");
        db.link_track(&track, group).unwrap();
        let titles = db
            .update_anime_group("Renai Circulation", &ids(&[101, 102]), group)
            .unwrap();

        assert_eq!(link_count(&db, "5P8lyudWE7HQxb4ludLbEm"), 1);
        assert_eq!(
            titles,
            vec!["Bakemonogatari", "Monogatari Series Second Season"]
        );
        assert!(db
            .animes_in_group(group)
            .unwrap()
            .iter()
            .all(|a| a.song_group_id == Some(group)));
    }

    #[test]
    fn test_bind_track_reports_previous_group() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_anime(&anime(1, 10, "Bakemonogatari", "Renai Circulation", &[101]))
            .unwrap();
        let track = TrackId::new("trk1");

        let first = db.bind_track(&track, "Renai Circulation", &ids(&[101])).unwrap();
        let again = db.bind_track(&track, "Renai Circulation", &ids(&[101])).unwrap();

        assert_eq!(first.previous_group, None);
        assert_eq!(first.titles, vec!["Bakemonogatari"]);
        assert_eq!(again.group_id, first.group_id);
        assert_eq!(again.previous_group, Some(first.group_id));
    }

    #[test]
    fn test_bind_track_rolls_back_on_failure() {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute_batch("DROP TABLE animes")
            .unwrap();

        let result = db.bind_track(&TrackId::new("trk1"), "Renai Circulation", &ids(&[101]));

        assert!(result.is_err());
        assert_eq!(link_count(&db, "trk1"), 0);
        assert!(db.find_group("Renai Circulation", &ids(&[101])).unwrap().is_none());
    }

    #[test]
    fn test_backfill_groups() {
        let db = Database::open_in_memory().unwrap();
        let existing = db.resolve_group("Renai Circulation", &ids(&[101])).unwrap();
        db.link_track(&TrackId::new("linked"), existing).unwrap();

        db.upsert_anime(
            &anime(1, 10, "Bakemonogatari", "Renai Circulation", &[101])
                .with_spotify_id(TrackId::new("linked")),
        )
        .unwrap();
        db.upsert_anime(
            &anime(2, 11, "Nisemonogatari", "Staple Stable", &[101])
                .with_spotify_id(TrackId::new("fresh")),
        )
        .unwrap();
        db.upsert_anime(&anime(3, 12, "Nekomonogatari", "Staple Stable", &[101]))
            .unwrap();

        let summary = db.backfill_groups().unwrap();

        assert_eq!(
            summary,
            BackfillSummary {
                assigned: 3,
                from_existing_link: 1,
                links_created: 1,
            }
        );
        assert!(db.list_ungrouped_animes().unwrap().is_empty());
        let staple = db.find_group("Staple Stable", &ids(&[101])).unwrap().unwrap();
        assert_eq!(db.animes_in_group(staple.group_id).unwrap().len(), 2);
        assert_eq!(
            db.group_for_track(&TrackId::new("fresh")).unwrap(),
            Some(staple.group_id)
        );
        assert_eq!(db.backfill_groups().unwrap(), BackfillSummary::default());
    }
}
