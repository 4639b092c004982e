use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{
    AnimeRecord, AnnSongId, Artist, ArtistId, GroupId, NewReport, Report, ReportId,
};

use super::codec::{
    encode_list, encode_optional_list, encode_timestamp, json_column, optional_json_column,
    timestamp_column,
};
use super::migrations::MIGRATIONS;

const SAVEPOINT: &str = "songlink_op";

/// A database connection with CRUD methods for catalog entities.
///
/// One handle is opened per command invocation and passed by reference into
/// every operation.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

/// Row counts shown by `songlink status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub artists: u64,
    pub song_groups: u64,
    pub group_links: u64,
    pub animes: u64,
    pub ungrouped_animes: u64,
    pub pending_reports: u64,
}

impl Database {
    /// Open (or create) a database at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `op` as one atomic unit.
    ///
    /// Every write made by `op` commits together when it returns `Ok`, and
    /// none of them survive when it returns `Err`. Calls nest: an inner
    /// `atomically` only becomes durable when the outermost one commits.
    pub fn atomically<T>(&self, op: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        self.conn.execute_batch(&format!("SAVEPOINT {SAVEPOINT}"))?;
        let result = op(self).and_then(|value| {
            self.conn.execute_batch(&format!("RELEASE {SAVEPOINT}"))?;
            Ok(value)
        });
        if result.is_err() {
            if let Err(e) = self
                .conn
                .execute_batch(&format!("ROLLBACK TO {SAVEPOINT}; RELEASE {SAVEPOINT}"))
            {
                log::error!("Rollback failed: {}", e);
            }
        }
        result
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }

    pub fn counts(&self) -> Result<StoreCounts> {
        let count = |sql: &str| -> Result<u64> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n.unsigned_abs())
        };

        Ok(StoreCounts {
            artists: count("SELECT COUNT(*) FROM artists")?,
            song_groups: count("SELECT COUNT(*) FROM song_groups")?,
            group_links: count("SELECT COUNT(*) FROM song_group_links")?,
            animes: count("SELECT COUNT(*) FROM animes")?,
            ungrouped_animes: count("SELECT COUNT(*) FROM animes WHERE song_group_id IS NULL")?,
            pending_reports: count("SELECT COUNT(*) FROM reports")?,
        })
    }
}

// Artist CRUD
impl Database {
    /// Insert an artist, or merge it into the existing row for its id.
    ///
    /// Names are replaced. Relation lists are replaced only when the incoming
    /// record carries them, so a sparse record never erases known relations.
    pub fn upsert_artist(&self, artist: &Artist) -> Result<()> {
        self.conn.execute(
            "INSERT INTO artists (ann_id, names, group_ids, member_ids)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(ann_id) DO UPDATE SET
                names = excluded.names,
                group_ids = COALESCE(excluded.group_ids, artists.group_ids),
                member_ids = COALESCE(excluded.member_ids, artists.member_ids)",
            rusqlite::params![
                artist.id,
                encode_list(&artist.names)?,
                encode_optional_list(artist.group_ids.as_deref())?,
                encode_optional_list(artist.member_ids.as_deref())?,
            ],
        )?;
        Ok(())
    }

    pub fn get_artist(&self, id: ArtistId) -> Result<Artist> {
        self.conn
            .query_row(
                "SELECT ann_id, names, group_ids, member_ids FROM artists WHERE ann_id = ?1",
                [id],
                row_to_artist,
            )
            .optional()?
            .ok_or_else(|| Error::not_found("artist", id))
    }

    /// Record a Spotify artist id for a stored artist. Repeats are ignored.
    pub fn add_artist_link(&self, id: ArtistId, spotify_artist_id: &str) -> Result<()> {
        let inserted = self.conn.execute(
            "INSERT INTO artist_links (ann_id, spotify_id) VALUES (?1, ?2)
             ON CONFLICT DO NOTHING",
            rusqlite::params![id, spotify_artist_id],
        )?;
        if inserted == 0 {
            log::debug!("Artist {} already linked to {}", id, spotify_artist_id);
        }
        Ok(())
    }

    pub fn artist_links(&self, id: ArtistId) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT spotify_id FROM artist_links WHERE ann_id = ?1 ORDER BY spotify_id",
        )?;
        let links = stmt
            .query_map([id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(links)
    }

    /// Resolve an artist's groups and members against the artists table.
    ///
    /// Ids with no stored row are skipped.
    pub fn artist_relations(&self, artist: &Artist) -> Result<(Vec<Artist>, Vec<Artist>)> {
        let resolve = |ids: Option<&Vec<ArtistId>>| -> Result<Vec<Artist>> {
            let mut found = Vec::new();
            for id in ids.into_iter().flatten() {
                match self.get_artist(*id) {
                    Ok(related) => found.push(related),
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e),
                }
            }
            Ok(found)
        };
        Ok((
            resolve(artist.group_ids.as_ref())?,
            resolve(artist.member_ids.as_ref())?,
        ))
    }
}

fn row_to_artist(row: &rusqlite::Row) -> rusqlite::Result<Artist> {
    Ok(Artist {
        id: row.get(0)?,
        names: json_column(row, 1)?,
        group_ids: optional_json_column(row, 2)?,
        member_ids: optional_json_column(row, 3)?,
    })
}

pub(crate) const ANIME_COLUMNS: &str = "ann_id, ann_song_id, title_eng, title_jpn, song_type, song_name,
    artist_names, artist_ids, composer_ids, arranger_ids, spotify_id,
    mal_id, anilist_id, anidb_id, kitsu_id, song_group_id, last_updated";

// Anime CRUD
impl Database {
    /// Insert an anime row, or refresh the catalog fields of an existing one.
    ///
    /// An existing group assignment is kept when the incoming row has none.
    /// The AniList id and the importing track are never replaced once set,
    /// and a row whose AniList id was changed locally keeps its
    /// `last_updated` so it stays marked stale.
    pub fn upsert_anime(&self, anime: &AnimeRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO animes (
                ann_id, ann_song_id, title_eng, title_jpn, song_type, song_name,
                artist_names, artist_ids, composer_ids, arranger_ids, spotify_id,
                mal_id, anilist_id, anidb_id, kitsu_id, song_group_id, last_updated
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            ON CONFLICT(ann_id, ann_song_id) DO UPDATE SET
                title_eng = excluded.title_eng,
                title_jpn = excluded.title_jpn,
                song_type = excluded.song_type,
                song_name = excluded.song_name,
                artist_names = excluded.artist_names,
                artist_ids = excluded.artist_ids,
                composer_ids = excluded.composer_ids,
                arranger_ids = excluded.arranger_ids,
                spotify_id = COALESCE(animes.spotify_id, excluded.spotify_id),
                mal_id = excluded.mal_id,
                anilist_id = COALESCE(animes.anilist_id, excluded.anilist_id),
                anidb_id = excluded.anidb_id,
                kitsu_id = excluded.kitsu_id,
                song_group_id = COALESCE(excluded.song_group_id, animes.song_group_id),
                last_updated = CASE
                    WHEN animes.anilist_id IS NULL OR animes.anilist_id = excluded.anilist_id
                    THEN excluded.last_updated
                    ELSE animes.last_updated
                END",
            rusqlite::params![
                anime.ann_id,
                anime.ann_song_id,
                anime.title_eng,
                anime.title_jpn,
                anime.song_type,
                anime.song_name,
                encode_list(&anime.artist_names)?,
                encode_list(&anime.artist_ids)?,
                encode_list(&anime.composer_ids)?,
                encode_list(&anime.arranger_ids)?,
                anime.spotify_id,
                anime.mal_id,
                anime.anilist_id,
                anime.anidb_id,
                anime.kitsu_id,
                anime.song_group_id,
                encode_timestamp(&anime.last_updated),
            ],
        )?;
        Ok(())
    }

    /// All rows for one catalog song, ordered by anime title.
    pub fn animes_for_song(&self, ann_song_id: AnnSongId) -> Result<Vec<AnimeRecord>> {
        self.query_animes(
            &format!(
                "SELECT {ANIME_COLUMNS} FROM animes WHERE ann_song_id = ?1
                 ORDER BY title_eng, ann_id"
            ),
            [ann_song_id],
        )
    }

    pub fn animes_in_group(&self, group_id: GroupId) -> Result<Vec<AnimeRecord>> {
        self.query_animes(
            &format!(
                "SELECT {ANIME_COLUMNS} FROM animes WHERE song_group_id = ?1
                 ORDER BY title_eng, ann_id"
            ),
            [group_id],
        )
    }

    /// Rows not yet reconciled to a song group, in import key order.
    pub fn list_ungrouped_animes(&self) -> Result<Vec<AnimeRecord>> {
        self.query_animes(
            &format!(
                "SELECT {ANIME_COLUMNS} FROM animes WHERE song_group_id IS NULL
                 ORDER BY ann_id, ann_song_id"
            ),
            [],
        )
    }

    /// Point every row of a catalog song at a new AniList entry.
    ///
    /// `last_updated` is reset to the Unix epoch so the next refresh pass
    /// re-fetches the AniList metadata for those rows.
    pub fn set_anilist_id(&self, ann_song_id: AnnSongId, anilist_id: i64) -> Result<usize> {
        let stale = encode_timestamp(&DateTime::<Utc>::UNIX_EPOCH);
        let updated = self.conn.execute(
            "UPDATE animes SET anilist_id = ?1, last_updated = ?2 WHERE ann_song_id = ?3",
            rusqlite::params![anilist_id, stale, ann_song_id],
        )?;
        Ok(updated)
    }

    pub(crate) fn query_animes<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<AnimeRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let animes = stmt
            .query_map(params, row_to_anime)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(animes)
    }
}

fn row_to_anime(row: &rusqlite::Row) -> rusqlite::Result<AnimeRecord> {
    Ok(AnimeRecord {
        ann_id: row.get(0)?,
        ann_song_id: row.get(1)?,
        title_eng: row.get(2)?,
        title_jpn: row.get(3)?,
        song_type: row.get(4)?,
        song_name: row.get(5)?,
        artist_names: json_column(row, 6)?,
        artist_ids: json_column(row, 7)?,
        composer_ids: json_column(row, 8)?,
        arranger_ids: json_column(row, 9)?,
        spotify_id: row.get(10)?,
        mal_id: row.get(11)?,
        anilist_id: row.get(12)?,
        anidb_id: row.get(13)?,
        kitsu_id: row.get(14)?,
        song_group_id: row.get(15)?,
        last_updated: timestamp_column(row, 16)?,
    })
}

// Report CRUD
impl Database {
    pub fn insert_report(&self, report: &NewReport) -> Result<ReportId> {
        self.conn.execute(
            "INSERT INTO reports (spotify_id, ann_song_id, reason, user_name, user_mail, date_added)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                report.spotify_id,
                report.ann_song_id,
                report.reason,
                report.user_name,
                report.user_mail,
                encode_timestamp(&report.date_added),
            ],
        )?;
        Ok(ReportId::new(self.conn.last_insert_rowid()))
    }

    /// Pending reports, oldest submission first.
    pub fn list_pending_reports(&self) -> Result<Vec<Report>> {
        let mut stmt = self.conn.prepare(
            "SELECT report_id, spotify_id, ann_song_id, reason, user_name, user_mail, date_added
             FROM reports
             ORDER BY date_added, report_id",
        )?;
        let reports = stmt
            .query_map([], row_to_report)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(reports)
    }

    pub fn get_report(&self, id: ReportId) -> Result<Report> {
        self.conn
            .query_row(
                "SELECT report_id, spotify_id, ann_song_id, reason, user_name, user_mail, date_added
                 FROM reports WHERE report_id = ?1",
                [id],
                row_to_report,
            )
            .optional()?
            .ok_or_else(|| Error::not_found("report", id))
    }

    /// Delete a report. Returns `false` when it was already gone.
    pub fn delete_report(&self, id: ReportId) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM reports WHERE report_id = ?1", [id])?;
        Ok(deleted > 0)
    }
}

fn row_to_report(row: &rusqlite::Row) -> rusqlite::Result<Report> {
    Ok(Report {
        report_id: row.get(0)?,
        spotify_id: row.get(1)?,
        ann_song_id: row.get(2)?,
        reason: row.get(3)?,
        user_name: row.get(4)?,
        user_mail: row.get(5)?,
        date_added: timestamp_column(row, 6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnId, TrackId};
    use chrono::Duration;

    fn sample_anime(ann_id: i64, ann_song_id: i64) -> AnimeRecord {
        AnimeRecord::new(
            AnnId::new(ann_id),
            AnnSongId::new(ann_song_id),
            "Bakemonogatari",
            "Renai Circulation",
            vec![ArtistId::new(101), ArtistId::new(102)],
        )
    }

    #[test]
    fn test_database_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_reopen_does_not_reapply_migrations() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("songlink.db");
        drop(Database::open(&path).unwrap());
        let db = Database::open(&path).unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_artist_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let artist = Artist::new(ArtistId::new(7), vec!["Aoi Koga".to_string()])
            .with_groups(vec![ArtistId::new(900)]);

        db.upsert_artist(&artist).unwrap();

        assert_eq!(db.get_artist(ArtistId::new(7)).unwrap(), artist);
    }

    #[test]
    fn test_upsert_artist_keeps_known_relations() {
        let db = Database::open_in_memory().unwrap();
        let full = Artist::new(ArtistId::new(7), vec!["Aoi Koga".to_string()])
            .with_groups(vec![ArtistId::new(900)]);
        db.upsert_artist(&full).unwrap();

        let sparse = Artist::new(
            ArtistId::new(7),
            vec!["Aoi Koga".to_string(), "古賀葵".to_string()],
        );
        db.upsert_artist(&sparse).unwrap();

        let merged = db.get_artist(ArtistId::new(7)).unwrap();
        assert_eq!(merged.names.len(), 2);
        assert_eq!(merged.group_ids, Some(vec![ArtistId::new(900)]));
    }

    #[test]
    fn test_get_missing_artist_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let err = db.get_artist(ArtistId::new(1)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_artist_relations_resolve_by_id() {
        let db = Database::open_in_memory().unwrap();
        let group = Artist::new(ArtistId::new(900), vec!["Kessoku Band".to_string()])
            .with_members(vec![ArtistId::new(7), ArtistId::new(8)]);
        let member = Artist::new(ArtistId::new(7), vec!["Aoi Koga".to_string()])
            .with_groups(vec![ArtistId::new(900)]);
        db.upsert_artist(&group).unwrap();
        db.upsert_artist(&member).unwrap();

        let (groups, members) = db.artist_relations(&group).unwrap();
        assert!(groups.is_empty());
        // Member 8 was never stored.
        assert_eq!(members, vec![member.clone()]);

        let (groups, _) = db.artist_relations(&member).unwrap();
        assert_eq!(groups[0].primary_name(), "Kessoku Band");
    }

    #[test]
    fn test_artist_links_are_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_artist(&Artist::new(ArtistId::new(7), vec!["Aoi Koga".to_string()]))
            .unwrap();

        db.add_artist_link(ArtistId::new(7), "2uTf3MjHEyidMXyrIh5QzR")
            .unwrap();
        db.add_artist_link(ArtistId::new(7), "2uTf3MjHEyidMXyrIh5QzR")
            .unwrap();

        assert_eq!(
            db.artist_links(ArtistId::new(7)).unwrap(),
            vec!["2uTf3MjHEyidMXyrIh5QzR".to_string()]
        );
    }

    #[test]
    fn test_anime_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let anime = sample_anime(10, 20)
            .with_song_type("Opening 4")
            .with_spotify_id(TrackId::new("5P8lyudWE7HQxb4ludLbEm"))
            .with_anilist_id(5081);

        db.upsert_anime(&anime).unwrap();

        let stored = db.animes_for_song(AnnSongId::new(20)).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].artist_ids, anime.artist_ids);
        assert_eq!(stored[0].anilist_id, Some(5081));
        assert_eq!(stored[0].spotify_id, anime.spotify_id);
        assert_eq!(stored[0].last_updated.timestamp(), anime.last_updated.timestamp());
    }

    #[test]
    fn test_set_anilist_id_marks_rows_stale() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_anime(&sample_anime(10, 20)).unwrap();
        db.upsert_anime(&sample_anime(11, 20)).unwrap();
        db.upsert_anime(&sample_anime(12, 21)).unwrap();

        let updated = db.set_anilist_id(AnnSongId::new(20), 5081).unwrap();

        assert_eq!(updated, 2);
        let rows = db.animes_for_song(AnnSongId::new(20)).unwrap();
        assert!(rows.iter().all(|r| r.anilist_id == Some(5081)));
        assert!(rows.iter().all(|r| r.last_updated == DateTime::<Utc>::UNIX_EPOCH));
        let other = db.animes_for_song(AnnSongId::new(21)).unwrap();
        assert_eq!(other[0].anilist_id, None);
    }

    #[test]
    fn test_upsert_keeps_local_anilist_id_and_track() {
        let db = Database::open_in_memory().unwrap();
        let first = sample_anime(10, 20)
            .with_spotify_id(TrackId::new("trk1"))
            .with_anilist_id(5081);
        db.upsert_anime(&first).unwrap();
        db.set_anilist_id(AnnSongId::new(20), 21355).unwrap();

        let refreshed = sample_anime(10, 20)
            .with_song_type("Opening 4")
            .with_spotify_id(TrackId::new("trk2"))
            .with_anilist_id(5081);
        db.upsert_anime(&refreshed).unwrap();

        let rows = db.animes_for_song(AnnSongId::new(20)).unwrap();
        assert_eq!(rows[0].song_type, "Opening 4");
        assert_eq!(rows[0].anilist_id, Some(21355));
        assert_eq!(rows[0].spotify_id, Some(TrackId::new("trk1")));
        assert_eq!(rows[0].last_updated, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_upsert_fills_missing_anilist_id() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_anime(&sample_anime(10, 20)).unwrap();

        let refreshed = sample_anime(10, 20).with_anilist_id(5081);
        db.upsert_anime(&refreshed).unwrap();

        let rows = db.animes_for_song(AnnSongId::new(20)).unwrap();
        assert_eq!(rows[0].anilist_id, Some(5081));
        assert_eq!(rows[0].last_updated.timestamp(), refreshed.last_updated.timestamp());
    }

    #[test]
    fn test_reports_are_listed_oldest_first() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        let newer = NewReport::new(TrackId::new("b"), AnnSongId::new(2), "wrong song")
            .added_at(now);
        let older = NewReport::new(TrackId::new("a"), AnnSongId::new(1), "wrong artist")
            .from_user("mika", "mika@example.com")
            .added_at(now - Duration::days(1));

        db.insert_report(&newer).unwrap();
        let older_id = db.insert_report(&older).unwrap();

        let reports = db.list_pending_reports().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].report_id, older_id);
        assert_eq!(reports[0].user_name, "mika");
        assert_eq!(reports[1].spotify_id, TrackId::new("b"));
    }

    #[test]
    fn test_delete_report() {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .insert_report(&NewReport::new(TrackId::new("a"), AnnSongId::new(1), "dup"))
            .unwrap();

        assert!(db.delete_report(id).unwrap());
        assert!(!db.delete_report(id).unwrap());
        assert!(db.get_report(id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_atomically_rolls_back_on_error() {
        let db = Database::open_in_memory().unwrap();

        let result: Result<()> = db.atomically(|db| {
            db.upsert_anime(&sample_anime(10, 20))?;
            Err(Error::InvalidInput("abort".to_string()))
        });

        assert!(result.is_err());
        assert!(db.animes_for_song(AnnSongId::new(20)).unwrap().is_empty());
    }

    #[test]
    fn test_atomically_nests() {
        let db = Database::open_in_memory().unwrap();

        db.atomically(|db| {
            db.upsert_anime(&sample_anime(10, 20))?;
            db.atomically(|db| db.upsert_anime(&sample_anime(11, 20)))
        })
        .unwrap();

        assert_eq!(db.animes_for_song(AnnSongId::new(20)).unwrap().len(), 2);
    }

    #[test]
    fn test_counts() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_anime(&sample_anime(10, 20)).unwrap();
        db.insert_report(&NewReport::new(TrackId::new("a"), AnnSongId::new(20), "x"))
            .unwrap();

        let counts = db.counts().unwrap();
        assert_eq!(counts.animes, 1);
        assert_eq!(counts.ungrouped_animes, 1);
        assert_eq!(counts.pending_reports, 1);
        assert_eq!(counts.song_groups, 0);
    }
}
