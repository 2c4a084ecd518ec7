//! Top-N high score list
//!
//! Stored as plain text, one score per line, highest first.

use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard {
    /// Sorted descending
    scores: Vec<u32>,
    capacity: usize,
}

impl Leaderboard {
    pub fn new(capacity: usize) -> Self {
        Self {
            scores: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn best(&self) -> Option<u32> {
        self.scores.first().copied()
    }

    /// Insert a score ahead of the first strictly lower one. Returns its
    /// 0-based rank, or `None` if it did not make the list.
    pub fn insert(&mut self, score: u32) -> Option<usize> {
        let rank = self.scores.partition_point(|&existing| existing >= score);
        if rank >= self.capacity {
            return None;
        }
        self.scores.insert(rank, score);
        self.scores.truncate(self.capacity);
        Some(rank)
    }

    /// Parse newline-delimited scores. Lines that are not unsigned integers
    /// are skipped.
    pub fn parse(contents: &str, capacity: usize) -> Self {
        let mut scores: Vec<u32> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(|line| match line.parse() {
                Ok(score) => Some(score),
                Err(e) => {
                    tracing::warn!("Skipping leaderboard entry {:?}: {}", line, e);
                    None
                }
            })
            .collect();
        scores.sort_unstable_by(|a, b| b.cmp(a));
        scores.truncate(capacity);
        Self { scores, capacity }
    }

    /// Render as file contents
    pub fn to_text(&self) -> String {
        self.scores.iter().map(|score| format!("{}\n", score)).collect()
    }

    /// Load from disk. A missing file is an empty list.
    pub fn load(path: &Path, capacity: usize) -> io::Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Self::parse(&contents, capacity)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No leaderboard at {}, starting empty", path.display());
                Ok(Self::new(capacity))
            }
            Err(e) => Err(e),
        }
    }

    /// Write to disk, creating parent directories as needed
    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, self.to_text())
    }
}
