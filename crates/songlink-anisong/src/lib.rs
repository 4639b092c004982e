//! AnisongDB catalog access for songlink.
//!
//! Wraps the AnisongDB search API behind the [`SongCatalog`] trait and
//! provides the interactive flows that pull catalog entries into the local
//! store: binding a Spotify track to a song and registering an artist.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod client;
pub mod config;
pub mod error;
pub mod ingest;
pub mod resilience;
pub mod types;

pub use client::{AnisongClient, SongCatalog};
pub use config::Config;
pub use error::{CatalogError, CatalogResult};
pub use types::{ArtistIdSearchRequest, CatalogArtist, SearchFilter, SearchRequest, SongEntry};
