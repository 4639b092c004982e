pub mod anime;
pub mod artist;
pub mod ids;
pub mod report;
pub mod song_group;

pub use anime::AnimeRecord;
pub use artist::Artist;
pub use ids::{AnnId, AnnSongId, ArtistId, GroupId, ReportId, TrackId};
pub use report::{NewReport, Report};
pub use song_group::{GroupLink, SongGroup};
