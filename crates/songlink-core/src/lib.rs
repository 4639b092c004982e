//! Core domain model for songlink.
//!
//! This crate defines the catalog data model (artists, anime rows, song
//! groups, track links, reports), the SQLite schema, and the three
//! operations everything else is built on: resolving a canonical song
//! group, linking tracks and anime rows to it, and triaging user reports.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod link;
pub mod model;
pub mod operator;
pub mod reconcile;
pub mod schema;
pub mod triage;

pub use error::{Error, Result};
pub use link::UnlinkOutcome;
pub use operator::Operator;
pub use triage::{TriageAction, TriageOutcome, TriageSummary};
