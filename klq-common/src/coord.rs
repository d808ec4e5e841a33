//! Chart coordinate and its opaque-code codec
//!
//! A coordinate is a (year, month, rank) triple identifying a candidate
//! dataset slot. Not every coordinate resolves to an existing record; the
//! dataset is sparse and callers treat absence as a normal miss.

use serde::{Deserialize, Serialize};

/// (year, month, rank) triple addressing one chart slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub year: u16,
    /// Calendar month, 1-12
    pub month: u8,
    /// Chart rank, 1-100 in the live dataset (codec tolerates up to 999)
    pub rank: u16,
}

impl Coordinate {
    pub fn new(year: u16, month: u8, rank: u16) -> Self {
        Self { year, month, rank }
    }

    /// Dataset path for this coordinate, following the dataset's own naming
    /// convention: 2-digit zero-padded month directory, unpadded rank file.
    pub fn path(&self) -> String {
        format!("{}/{:02}/{}.json", self.year, self.month, self.rank)
    }

    /// Encode into the shareable 9-digit opaque code:
    /// 4-digit year, 2-digit month, 3-digit rank.
    pub fn encode(&self) -> String {
        format!("{:04}{:02}{:03}", self.year, self.month, self.rank)
    }

    /// Decode an opaque code back into a coordinate.
    ///
    /// Non-digit characters are ignored, so lightly mangled codes (spaces,
    /// dashes) still parse. Returns `None` for anything with fewer than 9
    /// digits or with a zero field; never panics.
    pub fn decode(code: &str) -> Option<Self> {
        let digits: String = code.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() < 9 {
            return None;
        }
        let year: u16 = digits[0..4].parse().ok()?;
        let month: u8 = digits[4..6].parse().ok()?;
        let rank: u16 = digits[6..9].parse().ok()?;
        if year == 0 || month == 0 || rank == 0 {
            return None;
        }
        Some(Self { year, month, rank })
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02} #{}", self.year, self.month, self.rank)
    }
}
