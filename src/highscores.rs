//! High score leaderboard
//!
//! Tracks the best score plus the top finished runs, persisted as JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::settings::{ConfigError, read_json, write_json};
use crate::sim::GameMode;

/// Maximum number of runs to keep
pub const MAX_RUNS: usize = 10;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub score: u64,
    pub mode: GameMode,
    /// Furthest level reached (1-based)
    pub level: u32,
}

/// Best score and run leaderboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub best: u64,
    pub runs: Vec<RunRecord>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the best score if `score` beats it. Returns true on a new best.
    pub fn observe(&mut self, score: u64) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }

    /// Check if a score earns a leaderboard slot
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.runs.len() < MAX_RUNS {
            return true;
        }
        self.runs.last().map(|r| score > r.score).unwrap_or(true)
    }

    /// Record a finished run. Returns the rank achieved (1-indexed).
    pub fn add_run(&mut self, record: RunRecord) -> Option<usize> {
        self.observe(record.score);
        if !self.qualifies(record.score) {
            return None;
        }

        // Sorted descending by score
        let pos = self.runs.iter().position(|r| record.score > r.score);
        let rank = match pos {
            Some(i) => {
                self.runs.insert(i, record);
                i + 1
            }
            None => {
                self.runs.push(record);
                self.runs.len()
            }
        };
        self.runs.truncate(MAX_RUNS);
        Some(rank)
    }

    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match read_json::<ScoreBoard>(path) {
            Ok(board) => {
                log::info!("Loaded {} runs, best {}", board.runs.len(), board.best);
                board
            }
            Err(e) => {
                log::info!("No high scores found, starting fresh ({e})");
                Self::new()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_json(path.as_ref(), self)?;
        log::info!("High scores saved ({} runs)", self.runs.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(score: u64) -> RunRecord {
        RunRecord {
            score,
            mode: GameMode::Endless,
            level: 1,
        }
    }

    #[test]
    fn test_runs_sorted_and_ranked() {
        let mut board = ScoreBoard::new();
        assert_eq!(board.add_run(run(10)), Some(1));
        assert_eq!(board.add_run(run(30)), Some(1));
        assert_eq!(board.add_run(run(20)), Some(2));
        assert_eq!(board.add_run(run(0)), None);

        let scores: Vec<u64> = board.runs.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![30, 20, 10]);
        assert_eq!(board.best, 30);
    }

    #[test]
    fn test_leaderboard_is_capped() {
        let mut board = ScoreBoard::new();
        for score in 1..=15 {
            board.add_run(run(score));
        }
        assert_eq!(board.runs.len(), MAX_RUNS);
        assert!(!board.qualifies(5));
        assert_eq!(board.runs.last().map(|r| r.score), Some(6));
    }

    #[test]
    fn test_observe_only_raises() {
        let mut board = ScoreBoard::new();
        assert!(board.observe(4));
        assert!(!board.observe(3));
        assert_eq!(board.best, 4);
    }

    #[test]
    fn test_board_persists() {
        let path = std::env::temp_dir().join(format!("lantern_scores_{}.json", std::process::id()));
        let mut board = ScoreBoard::new();
        board.add_run(run(12));
        board.save(&path).unwrap();

        assert_eq!(ScoreBoard::load(&path), board);
        let _ = std::fs::remove_file(path);
        assert_eq!(ScoreBoard::load("/nonexistent/scores.json"), ScoreBoard::new());
    }
}
