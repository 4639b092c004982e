//! Pulling catalog entries into the local store.
//!
//! The two interactive flows here walk the operator through choosing a
//! catalog entry before anything is written. All writes of one flow commit
//! together.

use chrono::Utc;

use songlink_core::link::BindOutcome;
use songlink_core::model::{AnimeRecord, Artist, ArtistId, TrackId};
use songlink_core::schema::Database;
use songlink_core::Operator;

use crate::client::SongCatalog;
use crate::error::CatalogResult;
use crate::types::{CatalogArtist, SongEntry};

/// Flatten a catalog artist and everything nested under it into core
/// artists, outermost first.
pub fn flatten_artist(artist: &CatalogArtist) -> Vec<Artist> {
    let mut out = Vec::new();
    collect_artist(artist, &mut out);
    out
}

fn collect_artist(artist: &CatalogArtist, out: &mut Vec<Artist>) {
    let ids = |list: &Option<Vec<CatalogArtist>>| {
        list.as_ref()
            .map(|related| related.iter().map(|a| a.id).collect::<Vec<ArtistId>>())
    };

    out.push(Artist {
        id: artist.id,
        names: artist.names.clone(),
        group_ids: ids(&artist.groups),
        member_ids: ids(&artist.members),
    });

    for related in artist
        .groups
        .iter()
        .chain(artist.members.iter())
        .flatten()
    {
        collect_artist(related, out);
    }
}

impl SongEntry {
    /// The local row for this entry.
    pub fn to_anime_record(&self) -> AnimeRecord {
        AnimeRecord {
            ann_id: self.ann_id,
            ann_song_id: self.ann_song_id,
            title_eng: self.anime_en_name.clone(),
            title_jpn: self.anime_jp_name.clone(),
            song_type: self.song_type.clone(),
            song_name: self.song_name.clone(),
            artist_names: self.artist_names(),
            artist_ids: self.artist_ids(),
            composer_ids: self.composers.iter().map(|a| a.id).collect(),
            arranger_ids: self.arrangers.iter().map(|a| a.id).collect(),
            spotify_id: None,
            mal_id: self.linked_ids.myanimelist,
            anilist_id: self.linked_ids.anilist,
            anidb_id: self.linked_ids.anidb,
            kitsu_id: self.linked_ids.kitsu,
            song_group_id: None,
            last_updated: Utc::now(),
        }
    }
}

/// Upsert every credited artist of `entry` and its anime row.
pub fn store_entry(
    db: &Database,
    entry: &SongEntry,
    track_id: Option<&TrackId>,
) -> songlink_core::Result<()> {
    for credited in entry
        .artists
        .iter()
        .chain(&entry.composers)
        .chain(&entry.arrangers)
    {
        for artist in flatten_artist(credited) {
            db.upsert_artist(&artist)?;
        }
    }

    let mut record = entry.to_anime_record();
    record.spotify_id = track_id.cloned();
    db.upsert_anime(&record)?;
    Ok(())
}

/// Store `entries` and bind `track_id` to the group of
/// (`song_name`, `artist_ids`), as one atomic unit.
pub fn bind_entries(
    db: &Database,
    track_id: &TrackId,
    song_name: &str,
    artist_ids: &[ArtistId],
    entries: &[SongEntry],
) -> CatalogResult<BindOutcome> {
    let outcome = db.atomically(|db| {
        for entry in entries {
            store_entry(db, entry, Some(track_id))?;
        }
        db.bind_track(track_id, song_name, artist_ids)
    })?;
    Ok(outcome)
}

/// Interactively bind a Spotify track to its catalog song.
///
/// The operator confirms the track, names the song, and picks the matching
/// entry from an exact-name search. Every catalog entry for that exact song
/// and artist list is then stored and stamped with the song's group.
/// `Ok(None)` means the operator stopped before anything was written.
pub async fn bind_song(
    db: &Database,
    catalog: &dyn SongCatalog,
    operator: &mut dyn Operator,
    track_id: &TrackId,
) -> CatalogResult<Option<BindOutcome>> {
    let prompt = format!("Does this link to the correct song?\n{}\n", track_id.url());
    if !operator.confirm(&prompt)? {
        operator.say("Did nothing");
        return Ok(None);
    }

    let song_name = operator.ask("Please write the anime song name\n")?;
    let song_name = song_name.trim();
    if song_name.is_empty() {
        operator.say("No song name given");
        return Ok(None);
    }

    let candidates = catalog.search_song_name(song_name).await?;
    let mut chosen = None;
    for entry in candidates {
        let prompt = format!(
            "Is this the correct song?\n{}\n{:?}\n",
            entry.song_name,
            entry
                .artists
                .iter()
                .map(|a| a.names.clone())
                .collect::<Vec<_>>()
        );
        if operator.confirm(&prompt)? {
            chosen = Some(entry);
            break;
        }
    }
    let Some(chosen) = chosen else {
        operator.say("Couldn't find the song");
        return Ok(None);
    };

    let artist_ids = chosen.artist_ids();
    let mut entries = catalog.exact_song(&chosen.song_name, &artist_ids).await?;
    if !entries
        .iter()
        .any(|entry| entry.identity() == chosen.identity())
    {
        entries.push(chosen.clone());
    }
    log::info!(
        "Binding track {} to \"{}\" with {} catalog entries",
        track_id,
        chosen.song_name,
        entries.len()
    );

    let outcome = bind_entries(db, track_id, &chosen.song_name, &artist_ids, &entries)?;

    if let Some(previous) = outcome.previous_group {
        if previous != outcome.group_id {
            operator.say(&format!(
                "Track was already linked to group {}; the link was kept",
                previous
            ));
        }
    }
    operator.say(&format!(
        "Group {} now covers:\n{}",
        outcome.group_id,
        outcome.titles.join("\n")
    ));
    Ok(Some(outcome))
}

/// Interactively register a catalog artist and its Spotify artist id.
///
/// The catalog is searched for songs crediting an artist named exactly
/// `artist_name`; the first credited artist carrying that name is offered
/// for confirmation.
pub async fn add_artist(
    db: &Database,
    catalog: &dyn SongCatalog,
    operator: &mut dyn Operator,
    artist_name: &str,
    spotify_artist_id: &str,
) -> CatalogResult<Option<Artist>> {
    let entries = catalog.search_artist_name(artist_name).await?;
    let found = entries
        .iter()
        .flat_map(|entry| entry.artists.iter())
        .find(|artist| artist.has_name(artist_name))
        .cloned();

    let Some(found) = found else {
        operator.say("Couldn't find the artist");
        return Ok(None);
    };

    let prompt = format!(
        "Is this the correct artist? {:?}\nDoes this link to the artist?\nhttps://open.spotify.com/artist/{}\n",
        found.names, spotify_artist_id
    );
    if !operator.confirm(&prompt)? {
        operator.say("Did nothing");
        return Ok(None);
    }

    let flattened = flatten_artist(&found);
    db.atomically(|db| {
        for artist in &flattened {
            db.upsert_artist(artist)?;
        }
        db.add_artist_link(found.id, spotify_artist_id)
    })?;

    log::info!(
        "Stored artist {} ({}) linked to {}",
        found.id,
        found.primary_name(),
        spotify_artist_id
    );
    Ok(Some(db.get_artist(found.id)?))
}
