/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Catalog artists, flattened: relations are id lists into this table
CREATE TABLE IF NOT EXISTS artists (
    ann_id INTEGER PRIMARY KEY,
    names TEXT NOT NULL,
    group_ids TEXT,
    member_ids TEXT
);

-- Spotify artist ids known for a catalog artist
CREATE TABLE IF NOT EXISTS artist_links (
    ann_id INTEGER NOT NULL REFERENCES artists(ann_id),
    spotify_id TEXT NOT NULL,
    PRIMARY KEY (ann_id, spotify_id)
);

-- Canonical songs. artist_ids is the JSON array text, so order is part of the key
CREATE TABLE IF NOT EXISTS song_groups (
    group_id INTEGER PRIMARY KEY AUTOINCREMENT,
    song_title TEXT NOT NULL,
    artist_ids TEXT NOT NULL,
    UNIQUE (song_title, artist_ids)
);

-- Spotify tracks bound to a song group
CREATE TABLE IF NOT EXISTS song_group_links (
    spotify_id TEXT PRIMARY KEY,
    group_id INTEGER NOT NULL REFERENCES song_groups(group_id)
);

CREATE INDEX IF NOT EXISTS idx_song_group_links_group_id ON song_group_links(group_id);

-- Denormalized anime/song rows
CREATE TABLE IF NOT EXISTS animes (
    ann_id INTEGER NOT NULL,
    ann_song_id INTEGER NOT NULL,
    title_eng TEXT NOT NULL,
    title_jpn TEXT NOT NULL,
    song_type TEXT NOT NULL,
    song_name TEXT NOT NULL,
    artist_names TEXT NOT NULL,
    artist_ids TEXT NOT NULL,
    composer_ids TEXT NOT NULL,
    arranger_ids TEXT NOT NULL,
    spotify_id TEXT,
    mal_id INTEGER,
    anilist_id INTEGER,
    anidb_id INTEGER,
    kitsu_id INTEGER,
    song_group_id INTEGER REFERENCES song_groups(group_id),
    last_updated TEXT NOT NULL,
    PRIMARY KEY (ann_id, ann_song_id)
);

CREATE INDEX IF NOT EXISTS idx_animes_song ON animes(song_name, artist_ids);
CREATE INDEX IF NOT EXISTS idx_animes_ann_song_id ON animes(ann_song_id);
CREATE INDEX IF NOT EXISTS idx_animes_song_group_id ON animes(song_group_id);

-- User-submitted correction reports
CREATE TABLE IF NOT EXISTS reports (
    report_id INTEGER PRIMARY KEY AUTOINCREMENT,
    spotify_id TEXT NOT NULL,
    ann_song_id INTEGER NOT NULL,
    reason TEXT NOT NULL,
    user_name TEXT NOT NULL DEFAULT '',
    user_mail TEXT NOT NULL DEFAULT '',
    date_added TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reports_date_added ON reports(date_added);
"#;

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: MIGRATION_001,
}];
