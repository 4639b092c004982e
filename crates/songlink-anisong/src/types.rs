//! AnisongDB request and response types.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use songlink_core::model::{AnnId, AnnSongId, ArtistId};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// A text filter on one field of a search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchFilter {
    pub search: String,
    pub partial_match: bool,
    /// How far a group is decomposed when matching artists (0 = not at all).
    pub group_granularity: u32,
    /// How many artists outside the searched group a song may credit.
    pub max_other_artist: u32,
    /// Whether composer searches also match arrangers.
    pub arrangement: bool,
}

impl SearchFilter {
    /// A filter that only matches the text exactly.
    pub fn exact(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            partial_match: false,
            group_granularity: 0,
            max_other_artist: 99,
            arrangement: true,
        }
    }

    pub fn partial(search: impl Into<String>) -> Self {
        Self {
            partial_match: true,
            ..Self::exact(search)
        }
    }
}

/// Which kinds of song slots a search returns. Everything is included by
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct SongKinds {
    pub opening_filter: bool,
    pub ending_filter: bool,
    pub insert_filter: bool,
    pub normal_broadcast: bool,
    pub dub: bool,
    pub rebroadcast: bool,
    pub standard: bool,
    pub instrumental: bool,
    pub chanting: bool,
    pub character: bool,
}

impl Default for SongKinds {
    fn default() -> Self {
        Self {
            opening_filter: true,
            ending_filter: true,
            insert_filter: true,
            normal_broadcast: true,
            dub: true,
            rebroadcast: true,
            standard: true,
            instrumental: true,
            chanting: true,
            character: true,
        }
    }
}

/// Body of `POST /search_request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub anime_search_filter: Option<SearchFilter>,
    pub song_name_search_filter: Option<SearchFilter>,
    pub artist_search_filter: Option<SearchFilter>,
    pub composer_search_filter: Option<SearchFilter>,
    pub and_logic: bool,
    pub ignore_duplicate: bool,
    #[serde(flatten)]
    pub kinds: SongKinds,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            anime_search_filter: None,
            song_name_search_filter: None,
            artist_search_filter: None,
            composer_search_filter: None,
            and_logic: true,
            ignore_duplicate: false,
            kinds: SongKinds::default(),
        }
    }
}

impl SearchRequest {
    pub fn by_song_name(filter: SearchFilter) -> Self {
        Self {
            song_name_search_filter: Some(filter),
            ..Self::default()
        }
    }

    pub fn by_artist_name(filter: SearchFilter) -> Self {
        Self {
            artist_search_filter: Some(filter),
            ..Self::default()
        }
    }
}

/// Body of `POST /artist_ids_request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistIdSearchRequest {
    pub artist_ids: Vec<ArtistId>,
    pub group_granularity: u32,
    pub max_other_artist: u32,
    pub ignore_duplicate: bool,
    #[serde(flatten)]
    pub kinds: SongKinds,
}

impl ArtistIdSearchRequest {
    /// Songs crediting exactly these artists and nobody else.
    pub fn every_artist(artist_ids: Vec<ArtistId>) -> Self {
        Self {
            artist_ids,
            group_granularity: 99,
            max_other_artist: 0,
            ignore_duplicate: false,
            kinds: SongKinds::default(),
        }
    }

    /// Songs crediting this artist alongside anyone else.
    pub fn any_with(artist_id: ArtistId) -> Self {
        Self {
            max_other_artist: 99,
            ..Self::every_artist(vec![artist_id])
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// An artist as the catalog returns it, with nested groups and members.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogArtist {
    pub id: ArtistId,
    pub names: Vec<String>,
    #[serde(default)]
    pub line_up_id: Option<i64>,
    #[serde(default)]
    pub groups: Option<Vec<CatalogArtist>>,
    #[serde(default)]
    pub members: Option<Vec<CatalogArtist>>,
}

impl CatalogArtist {
    pub fn has_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// First listed name, or an empty string.
    pub fn primary_name(&self) -> &str {
        self.names.first().map_or("", String::as_str)
    }
}

/// Ids of the anime on other list sites.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct LinkedIds {
    #[serde(default)]
    pub myanimelist: Option<i64>,
    #[serde(default)]
    pub anidb: Option<i64>,
    #[serde(default)]
    pub anilist: Option<i64>,
    #[serde(default)]
    pub kitsu: Option<i64>,
}

/// One anime/song/artist combination from the catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongEntry {
    pub ann_id: AnnId,
    pub ann_song_id: AnnSongId,
    #[serde(rename = "animeENName")]
    pub anime_en_name: String,
    #[serde(rename = "animeJPName")]
    pub anime_jp_name: String,
    #[serde(default)]
    pub anime_alt_name: Option<Vec<String>>,
    #[serde(default)]
    pub anime_vintage: Option<String>,
    #[serde(rename = "linked_ids", default)]
    pub linked_ids: LinkedIds,
    #[serde(default)]
    pub anime_type: Option<String>,
    #[serde(default)]
    pub anime_category: Option<String>,
    pub song_type: String,
    pub song_name: String,
    #[serde(default)]
    pub song_artist: String,
    #[serde(default)]
    pub song_composer: String,
    #[serde(default)]
    pub song_arranger: String,
    #[serde(default)]
    pub song_difficulty: Option<f64>,
    #[serde(default)]
    pub song_category: Option<String>,
    #[serde(default)]
    pub song_length: Option<f64>,
    #[serde(default)]
    pub is_dub: Option<bool>,
    #[serde(default)]
    pub is_rebroadcast: Option<bool>,
    #[serde(rename = "HQ", default)]
    pub hq: Option<String>,
    #[serde(rename = "MQ", default)]
    pub mq: Option<String>,
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(default)]
    pub artists: Vec<CatalogArtist>,
    #[serde(default)]
    pub composers: Vec<CatalogArtist>,
    #[serde(default)]
    pub arrangers: Vec<CatalogArtist>,
}

impl SongEntry {
    /// Credited artist ids in the order the catalog lists them.
    pub fn artist_ids(&self) -> Vec<ArtistId> {
        self.artists.iter().map(|a| a.id).collect()
    }

    pub fn artist_names(&self) -> Vec<String> {
        self.artists
            .iter()
            .map(|a| a.primary_name().to_string())
            .collect()
    }

    /// Identity used to collapse duplicate search results.
    pub fn identity(&self) -> (AnnId, AnnSongId, &str) {
        (self.ann_id, self.ann_song_id, self.song_type.as_str())
    }
}

/// Drop repeated entries, keeping the first occurrence of each
/// (anime, song, song type) triple.
pub fn dedup_entries(entries: Vec<SongEntry>) -> Vec<SongEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| {
            seen.insert((entry.ann_id, entry.ann_song_id, entry.song_type.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry_json(ann_id: i64, ann_song_id: i64, song_type: &str) -> serde_json::Value {
        json!({
            "annId": ann_id,
            "annSongId": ann_song_id,
            "animeENName": "Bakemonogatari",
            "animeJPName": "Bakemonogatari",
            "animeAltName": null,
            "animeVintage": "Summer 2009",
            "linked_ids": {"myanimelist": 5081, "anidb": 6327, "anilist": 5081, "kitsu": null},
            "animeType": "TV",
            "animeCategory": null,
            "songType": song_type,
            "songName": "Renai Circulation",
            "songArtist": "Kana Hanazawa",
            "songComposer": "kz",
            "songArranger": "kz",
            "songDifficulty": 61.2,
            "songCategory": "Standard",
            "songLength": 254.9,
            "isDub": false,
            "isRebroadcast": false,
            "HQ": null,
            "MQ": null,
            "audio": null,
            "artists": [{
                "id": 101,
                "names": ["Kana Hanazawa", "Sengoku Nadeko"],
                "line_up_id": null,
                "groups": null,
                "members": null
            }],
            "composers": [{"id": 900, "names": ["kz"], "line_up_id": null, "groups": null, "members": null}],
            "arrangers": []
        })
    }

    #[test]
    fn test_song_entry_deserializes() {
        let entry: SongEntry = serde_json::from_value(entry_json(1, 10, "Opening 4")).unwrap();

        assert_eq!(entry.ann_id, AnnId::new(1));
        assert_eq!(entry.ann_song_id, AnnSongId::new(10));
        assert_eq!(entry.anime_en_name, "Bakemonogatari");
        assert_eq!(entry.linked_ids.anilist, Some(5081));
        assert_eq!(entry.linked_ids.kitsu, None);
        assert_eq!(entry.artist_ids(), vec![ArtistId::new(101)]);
        assert_eq!(entry.artist_names(), vec!["Kana Hanazawa".to_string()]);
        assert_eq!(entry.composers[0].id, ArtistId::new(900));
    }

    #[test]
    fn test_nested_artists_deserialize() {
        let artist: CatalogArtist = serde_json::from_value(json!({
            "id": 7,
            "names": ["ClariS"],
            "line_up_id": 2,
            "groups": null,
            "members": [
                {"id": 8, "names": ["Clara"], "line_up_id": null, "groups": null, "members": null},
                {"id": 9, "names": ["Alice"], "line_up_id": null, "groups": null, "members": null}
            ]
        }))
        .unwrap();

        let members = artist.members.unwrap();
        assert_eq!(members.len(), 2);
        assert!(members[1].has_name("Alice"));
        assert!(artist.groups.is_none());
    }

    #[test]
    fn test_dedup_keeps_first_of_each_identity() {
        let entries: Vec<SongEntry> = vec![
            serde_json::from_value(entry_json(1, 10, "Opening 4")).unwrap(),
            serde_json::from_value(entry_json(1, 10, "Opening 4")).unwrap(),
            serde_json::from_value(entry_json(1, 10, "Insert Song")).unwrap(),
            serde_json::from_value(entry_json(2, 10, "Opening 4")).unwrap(),
        ];

        let unique = dedup_entries(entries);

        let identities: Vec<_> = unique.iter().map(SongEntry::identity).collect();
        assert_eq!(
            identities,
            vec![
                (AnnId::new(1), AnnSongId::new(10), "Opening 4"),
                (AnnId::new(1), AnnSongId::new(10), "Insert Song"),
                (AnnId::new(2), AnnSongId::new(10), "Opening 4"),
            ]
        );
    }

    #[test]
    fn test_search_request_shape() {
        let request = SearchRequest::by_song_name(SearchFilter::exact("Renai Circulation"));
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["song_name_search_filter"]["search"], "Renai Circulation");
        assert_eq!(body["song_name_search_filter"]["partial_match"], false);
        assert!(body["artist_search_filter"].is_null());
        assert_eq!(body["opening_filter"], true);
        assert_eq!(body["and_logic"], true);
    }

    #[test]
    fn test_every_artist_request_excludes_others() {
        let request = ArtistIdSearchRequest::every_artist(vec![ArtistId::new(101), ArtistId::new(102)]);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["artist_ids"], json!([101, 102]));
        assert_eq!(body["max_other_artist"], 0);
        assert_eq!(
            serde_json::to_value(ArtistIdSearchRequest::any_with(ArtistId::new(101))).unwrap()
                ["max_other_artist"],
            99
        );
    }
}
