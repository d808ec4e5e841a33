//! Rejection sampling over the sparse coordinate space
//!
//! The dataset is sparse and uneven: most coordinates resolve to nothing.
//! Rather than maintain an index of valid coordinates, each strategy draws
//! random candidates and rejects misses until a populated record turns up or
//! a bounded retry budget runs out. Fetch failures inside the loops are
//! normal misses, logged and retried with a new coordinate; only exhaustion
//! surfaces to the caller, as `NoCandidateFound`.

use crate::models::SongRecord;
use crate::services::RecordFetcher;
use klq_common::{Coordinate, Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, warn};

/// Retry budgets for the three strategies. Defaults cap the month scan well
/// below exhaustive to bound latency under moderate sparsity; tests inject
/// their own to make outcomes deterministic.
#[derive(Debug, Clone, Copy)]
pub struct SamplerBudgets {
    /// Distinct ranks tried within one month (out of 100)
    pub month_attempts: usize,
    /// (year, month) draws for the global random strategy
    pub random_attempts: usize,
    /// (year, month) draws for the genre strategy; larger because the genre
    /// filter further thins the acceptance probability
    pub genre_attempts: usize,
}

impl Default for SamplerBudgets {
    fn default() -> Self {
        Self {
            month_attempts: 50,
            random_attempts: 120,
            genre_attempts: 350,
        }
    }
}

/// Outcome of probing one candidate coordinate
enum Attempt {
    /// A populated record (at least one lyric line)
    Hit(SongRecord),
    /// Absent, empty, malformed, or unreachable; try another coordinate
    Miss,
}

/// Random song selection over the chart coordinate space
pub struct Sampler {
    fetcher: Arc<RecordFetcher>,
    year_min: u16,
    year_max: u16,
    budgets: SamplerBudgets,
}

impl Sampler {
    pub fn new(fetcher: Arc<RecordFetcher>, year_min: u16, year_max: u16) -> Self {
        Self::with_budgets(fetcher, year_min, year_max, SamplerBudgets::default())
    }

    pub fn with_budgets(
        fetcher: Arc<RecordFetcher>,
        year_min: u16,
        year_max: u16,
        budgets: SamplerBudgets,
    ) -> Self {
        Self {
            fetcher,
            year_min,
            year_max,
            budgets,
        }
    }

    /// Pick a populated record within one month: random ranks in [1,100]
    /// without replacement, first record with at least one line wins.
    pub async fn by_month(&self, year: u16, month: u8) -> Result<SongRecord> {
        let mut ranks: Vec<u16> = (1..=100).collect();
        ranks.shuffle(&mut rand::thread_rng());

        for rank in ranks.into_iter().take(self.budgets.month_attempts) {
            let coord = Coordinate::new(year, month, rank);
            if let Attempt::Hit(record) = self.attempt(coord).await {
                debug!(%coord, "Sampler hit");
                return Ok(record);
            }
        }

        warn!(
            year,
            month,
            attempts = self.budgets.month_attempts,
            "Month sampling exhausted"
        );
        Err(Error::NoCandidateFound(format!(
            "no populated record in {}-{:02} after {} ranks",
            year, month, self.budgets.month_attempts
        )))
    }

    /// Pick a populated record anywhere in the configured year range
    pub async fn random(&self) -> Result<SongRecord> {
        for _ in 0..self.budgets.random_attempts {
            let (year, month) = self.random_month();
            if let Ok(record) = self.by_month(year, month).await {
                return Ok(record);
            }
        }

        warn!(
            attempts = self.budgets.random_attempts,
            "Random sampling exhausted"
        );
        Err(Error::NoCandidateFound(format!(
            "no populated record after {} month draws",
            self.budgets.random_attempts
        )))
    }

    /// Like `random`, but candidates must match the genre query:
    /// case-insensitive substring containment over normalized genre text.
    pub async fn by_genre(&self, genre_query: &str) -> Result<SongRecord> {
        let query = normalize_genre(genre_query);

        for _ in 0..self.budgets.genre_attempts {
            let (year, month) = self.random_month();
            match self.by_month(year, month).await {
                Ok(record) if normalize_genre(&record.genre).contains(&query) => {
                    return Ok(record);
                }
                Ok(record) => {
                    debug!(genre = %record.genre, query = %genre_query, "Genre mismatch, rejecting");
                }
                Err(_) => {}
            }
        }

        warn!(
            query = %genre_query,
            attempts = self.budgets.genre_attempts,
            "Genre sampling exhausted"
        );
        Err(Error::NoCandidateFound(format!(
            "no record matching genre '{}' after {} month draws",
            genre_query, self.budgets.genre_attempts
        )))
    }

    /// Probe one coordinate. Fetch failures and empty records are misses,
    /// never escalated.
    async fn attempt(&self, coord: Coordinate) -> Attempt {
        match self.fetcher.fetch(coord).await {
            Ok(record) if !record.lines.is_empty() => Attempt::Hit(record),
            Ok(_) => {
                debug!(%coord, "Record has no lines, rejecting");
                Attempt::Miss
            }
            Err(e) => {
                debug!(%coord, error = %e, "Fetch miss");
                Attempt::Miss
            }
        }
    }

    fn random_month(&self) -> (u16, u8) {
        let mut rng = rand::thread_rng();
        (
            rng.gen_range(self.year_min..=self.year_max),
            rng.gen_range(1..=12),
        )
    }
}

/// Lowercase and strip non-alphanumeric characters (Unicode-aware) so that
/// e.g. "K-Pop", "k pop" and "kpop" all normalize to "kpop". Substring
/// containment after normalization is intentional breadth: "pop" matches
/// "k-pop" and "pop-rock" alike.
fn normalize_genre(genre: &str) -> String {
    genre
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}
