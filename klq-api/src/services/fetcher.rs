//! Dataset fetcher: transport + decode + normalization + caching
//!
//! Records travel base64-encoded with embedded line breaks. Two lyric
//! schemas exist in the wild: nested `{"lyrics":{"lines":[...]}}` and flat
//! `{"lyrics":[{"text":...},...]}`. Normalization tolerates both plus
//! missing fields, always producing a well-formed `SongRecord` (empty lines
//! when absent). Only successfully decoded records are cached, keyed by
//! their dataset path; failures are re-fetched next time.

use crate::models::SongRecord;
use crate::services::DatasetClient;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use klq_common::{Cache, Coordinate, Error, Result};
use serde_json::Value;
use std::sync::Arc;

/// Fetches and normalizes one song record per coordinate
pub struct RecordFetcher {
    client: DatasetClient,
    cache: Arc<Cache>,
}

impl RecordFetcher {
    pub fn new(client: DatasetClient, cache: Arc<Cache>) -> Self {
        Self { client, cache }
    }

    /// Fetch the record at a coordinate, from cache when possible.
    ///
    /// `RemoteUnavailable` for a non-success host status (including the
    /// common sparse-dataset 404), `MalformedRecord` when the payload cannot
    /// be decoded. An existing record with no lyric lines is not an error;
    /// it decodes to a record with empty `lines`.
    pub async fn fetch(&self, coord: Coordinate) -> Result<SongRecord> {
        let path = coord.path();
        let key = format!("record:{}", path);

        if let Some(record) = self.cache.get_as::<SongRecord>(&key).await {
            return Ok(record);
        }

        let content = self.client.fetch_content(&path).await?;
        let record = decode_record(coord, &content)?;
        self.cache.set_as(&key, &record).await;
        Ok(record)
    }
}

/// Decode a base64 content blob into a normalized record
fn decode_record(coord: Coordinate, content: &str) -> Result<SongRecord> {
    // The host wraps base64 with embedded line breaks
    let cleaned: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(cleaned)
        .map_err(|e| Error::MalformedRecord(format!("invalid base64: {}", e)))?;
    let raw: Value = serde_json::from_slice(&bytes)
        .map_err(|e| Error::MalformedRecord(format!("invalid record JSON: {}", e)))?;
    Ok(normalize_record(coord, &raw))
}

/// Normalize a raw record into a well-formed `SongRecord`. Never fails:
/// absent or oddly typed fields fall back to the coordinate's values and
/// empty strings.
fn normalize_record(coord: Coordinate, raw: &Value) -> SongRecord {
    let genre = match string_field(raw, "genre") {
        g if g.is_empty() => string_field(raw, "genreName"),
        g => g,
    };

    SongRecord {
        year: numeric_field(raw, "year").unwrap_or(coord.year as u64) as u16,
        month: numeric_field(raw, "month").unwrap_or(coord.month as u64) as u8,
        rank: numeric_field(raw, "rank").unwrap_or(coord.rank as u64) as u16,
        title: string_field(raw, "title"),
        artist: string_field(raw, "artist"),
        genre,
        lines: extract_lines(raw),
    }
}

/// Lyric lines: nested schema first, then the flat text-object schema,
/// else empty
fn extract_lines(raw: &Value) -> Vec<String> {
    if let Some(lines) = raw.pointer("/lyrics/lines").and_then(Value::as_array) {
        return lines
            .iter()
            .filter_map(|l| l.as_str().map(str::to_string))
            .collect();
    }
    if let Some(items) = raw.get("lyrics").and_then(Value::as_array) {
        return items
            .iter()
            .filter_map(|item| {
                item.get("text")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .collect();
    }
    Vec::new()
}

/// String coercion: strings pass through, numbers stringify, anything else
/// is empty
fn string_field(raw: &Value, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Numeric coercion: numbers pass through, numeric strings parse, anything
/// else is absent
fn numeric_field(raw: &Value, key: &str) -> Option<u64> {
    match raw.get(key) {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}
