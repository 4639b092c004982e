use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{AnnSongId, ReportId, TrackId};

/// A correction request raised by an end user against a track binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub report_id: ReportId,
    pub spotify_id: TrackId,
    pub ann_song_id: AnnSongId,
    pub reason: String,
    pub user_name: String,
    pub user_mail: String,
    pub date_added: DateTime<Utc>,
}

/// A report as submitted, before the store assigns it an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReport {
    pub spotify_id: TrackId,
    pub ann_song_id: AnnSongId,
    pub reason: String,
    pub user_name: String,
    pub user_mail: String,
    pub date_added: DateTime<Utc>,
}

impl NewReport {
    #[must_use]
    pub fn new(spotify_id: TrackId, ann_song_id: AnnSongId, reason: impl Into<String>) -> Self {
        Self {
            spotify_id,
            ann_song_id,
            reason: reason.into(),
            user_name: String::new(),
            user_mail: String::new(),
            date_added: Utc::now(),
        }
    }

    #[must_use]
    pub fn from_user(mut self, name: impl Into<String>, mail: impl Into<String>) -> Self {
        self.user_name = name.into();
        self.user_mail = mail.into();
        self
    }

    #[must_use]
    pub fn added_at(mut self, date_added: DateTime<Utc>) -> Self {
        self.date_added = date_added;
        self
    }
}
