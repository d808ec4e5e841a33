//! Data model for the quiz pipeline

use klq_common::Coordinate;
use serde::{Deserialize, Serialize};

/// One normalized chart record as produced by the dataset fetcher.
///
/// Always well-formed: missing source fields normalize to empty strings and
/// an empty `lines` sequence rather than a decode failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongRecord {
    pub year: u16,
    pub month: u8,
    pub rank: u16,
    pub title: String,
    pub artist: String,
    /// Empty string when the source record carries no genre
    pub genre: String,
    /// Ordered lyric lines in the source language
    pub lines: Vec<String>,
}

impl SongRecord {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.year, self.month, self.rank)
    }
}

/// Externally visible quiz result.
///
/// The three line sequences are parallel: same length, same order, indexed
/// by source line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizPayload {
    pub year: u16,
    pub month: u8,
    pub rank: u16,
    pub title: String,
    pub artist: String,
    pub genre: String,
    /// Shareable opaque coordinate code
    pub code: String,
    pub lyrics_ko_lines: Vec<String>,
    pub lyrics_ja_lines: Vec<String>,
    pub lyrics_ja_ruby_lines: Vec<String>,
}
