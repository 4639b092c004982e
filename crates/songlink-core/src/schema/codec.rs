//! Column encodings shared by the row mappers.
//!
//! Id and name lists are stored as compact JSON array text. Because
//! `serde_json` output for a `Vec` is deterministic, two lists compare equal
//! as text exactly when they hold the same ids in the same order.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

pub(crate) fn encode_list<T: Serialize>(values: &[T]) -> Result<String> {
    Ok(serde_json::to_string(values)?)
}

pub(crate) fn encode_optional_list<T: Serialize>(values: Option<&[T]>) -> Result<Option<String>> {
    values.map(encode_list).transpose()
}

/// Decode a JSON column inside a row mapper.
pub(crate) fn json_column<T: DeserializeOwned>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn optional_json_column<T: DeserializeOwned>(
    row: &rusqlite::Row,
    idx: usize,
) -> rusqlite::Result<Option<T>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| {
        serde_json::from_str(&t)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

/// Fixed-width UTC timestamps, so text ordering matches time ordering.
pub(crate) fn encode_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn timestamp_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
