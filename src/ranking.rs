//! Bounded high-score list persisted as plain text, one `name,score` per line.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const MAX_RANKING_RECORDS: usize = 10;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("failed to read ranking file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write ranking file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RankingEntry {
    pub score: u32,
    pub player: String,
}

impl RankingEntry {
    pub fn new(score: u32, player: impl Into<String>) -> Self {
        Self {
            score,
            player: sanitize_player(&player.into()),
        }
    }

    fn parse(line: &str) -> Option<Self> {
        let (player, score) = line.split_once(',')?;
        let score = score.trim().parse().ok()?;
        Some(Self {
            score,
            player: player.to_string(),
        })
    }
}

/// The file format has no quoting, so separators cannot appear in names.
fn sanitize_player(player: &str) -> String {
    player
        .chars()
        .map(|c| match c {
            ',' | '\n' | '\r' => '_',
            c => c,
        })
        .collect()
}

/// Where finished games report their score.
pub trait RankingStore {
    fn add_record(&mut self, entry: RankingEntry) -> Result<(), RankingError>;

    /// Records, best first.
    fn records(&self) -> &[RankingEntry];

    fn best_score(&self) -> Option<u32> {
        self.records().first().map(|entry| entry.score)
    }
}

/// Inserts `entry` keeping the list sorted by descending score and capped.
/// Ties keep the earlier record ahead.
fn insert_sorted(records: &mut Vec<RankingEntry>, entry: RankingEntry) {
    records.push(entry);
    records.sort_by(|a, b| b.score.cmp(&a.score));
    records.truncate(MAX_RANKING_RECORDS);
}

// ============================================================================
// File-backed ranking
// ============================================================================

pub struct RankingList {
    path: PathBuf,
    records: Vec<RankingEntry>,
}

impl RankingList {
    /// Loads the list from `path`. A missing or malformed file yields an
    /// empty list.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RankingError> {
        let path = path.into();
        let records = match fs::read_to_string(&path) {
            Ok(contents) => parse_records(&contents).unwrap_or_default(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(RankingError::Read { path, source }),
        };
        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes a sibling `.tmp` file and renames it over the ranking.
    fn write(&self) -> Result<(), RankingError> {
        let contents: String = self
            .records
            .iter()
            .map(|entry| format!("{},{}\n", entry.player, entry.score))
            .collect();

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let write_err = |source: io::Error| RankingError::Write {
            path: self.path.clone(),
            source,
        };
        fs::write(&tmp, contents).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)
    }
}

fn parse_records(contents: &str) -> Option<Vec<RankingEntry>> {
    let mut records = Vec::new();
    for line in contents.lines().filter(|line| !line.trim().is_empty()) {
        insert_sorted(&mut records, RankingEntry::parse(line)?);
    }
    Some(records)
}

impl RankingStore for RankingList {
    fn add_record(&mut self, entry: RankingEntry) -> Result<(), RankingError> {
        insert_sorted(&mut self.records, entry);
        self.write()
    }

    fn records(&self) -> &[RankingEntry] {
        &self.records
    }
}

// ============================================================================
// In-memory ranking
// ============================================================================

/// Ranking that is never persisted.
#[derive(Default)]
pub struct MemoryRanking {
    records: Vec<RankingEntry>,
}

impl MemoryRanking {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RankingStore for MemoryRanking {
    fn add_record(&mut self, entry: RankingEntry) -> Result<(), RankingError> {
        insert_sorted(&mut self.records, entry);
        Ok(())
    }

    fn records(&self) -> &[RankingEntry] {
        &self.records
    }
}
