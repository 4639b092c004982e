use serde::{Deserialize, Serialize};

use crate::model::ids::ArtistId;

/// A catalog artist (person or group).
///
/// Group membership is self-referential in the catalog: an artist can belong
/// to groups and a group has members. Both directions are kept as id lists
/// resolved against the `artists` table, never as nested artists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,

    /// Display names, most common first.
    pub names: Vec<String>,

    /// Groups this artist is a member of.
    pub group_ids: Option<Vec<ArtistId>>,

    /// Members, when this artist is a group.
    pub member_ids: Option<Vec<ArtistId>>,
}

impl Artist {
    #[must_use]
    pub fn new(id: ArtistId, names: Vec<String>) -> Self {
        Self {
            id,
            names,
            group_ids: None,
            member_ids: None,
        }
    }

    #[must_use]
    pub fn with_groups(mut self, group_ids: Vec<ArtistId>) -> Self {
        self.group_ids = Some(group_ids);
        self
    }

    #[must_use]
    pub fn with_members(mut self, member_ids: Vec<ArtistId>) -> Self {
        self.member_ids = Some(member_ids);
        self
    }

    /// The first listed name, or an empty string for a nameless record.
    #[must_use]
    pub fn primary_name(&self) -> &str {
        self.names.first().map_or("", String::as_str)
    }

    /// Exact, case-sensitive name match against any of the artist's names.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}
