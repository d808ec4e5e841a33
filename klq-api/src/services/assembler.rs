//! Response assembly
//!
//! Packs a sampled record plus its translated lines into the final quiz
//! payload: metadata, the shareable coordinate code, and three parallel
//! line sequences of equal length (source, translated, annotated).

use crate::models::{QuizPayload, SongRecord};
use crate::services::RubyAnnotator;

pub async fn assemble(
    record: SongRecord,
    translated: Vec<String>,
    annotator: &RubyAnnotator,
) -> QuizPayload {
    debug_assert_eq!(record.lines.len(), translated.len());

    let ruby = annotator.annotate_lines(&translated).await;
    let code = record.coordinate().encode();

    QuizPayload {
        year: record.year,
        month: record.month,
        rank: record.rank,
        title: record.title,
        artist: record.artist,
        genre: record.genre,
        code,
        lyrics_ko_lines: record.lines,
        lyrics_ja_lines: translated,
        lyrics_ja_ruby_lines: ruby,
    }
}
