//! Local leaderboard and run summaries
//!
//! The leaderboard is persisted to LocalStorage and keeps the top 10 runs. A
//! [`RunSummary`] is the payload the host hands to the score service.

use serde::{Deserialize, Serialize};

use crate::sim::{World, achievements};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Level reached
    pub level: u32,
    /// Engine time survived (ms)
    pub survived_ms: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// What a finished (or abandoned) run amounted to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub level: u32,
    /// Difficulty tier reached
    pub difficulty: u32,
    pub time_spent_secs: u64,
    pub items_collected: u64,
    /// Names of unlocked achievements
    pub achievements: Vec<String>,
}

impl RunSummary {
    pub fn from_world(world: &World) -> Self {
        let p = &world.progression;
        Self {
            score: p.score,
            level: p.level,
            difficulty: p.difficulty,
            time_spent_secs: world.time_ms / 1000,
            items_collected: p.items_collected,
            achievements: achievements::unlocked_names(world),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "energy_quest_highscores";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Record a finished run. Returns the rank achieved (1-indexed) or None.
    pub fn record(&mut self, run: &RunSummary, timestamp: f64) -> Option<usize> {
        if !self.qualifies(run.score) {
            return None;
        }

        let entry = HighScoreEntry {
            score: run.score,
            level: run.level,
            survived_ms: run.time_spent_secs * 1000,
            timestamp,
        };

        // Sorted descending by score; ties keep the older run first
        let rank = match self.entries.iter().position(|e| run.score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    return scores;
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// `m:ss` for a survival time
pub fn format_duration(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn run(score: u64) -> RunSummary {
        RunSummary {
            score,
            level: 1,
            difficulty: 1,
            time_spent_secs: 30,
            items_collected: 0,
            achievements: Vec::new(),
        }
    }

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert!(scores.qualifies(5));
    }

    #[test]
    fn test_sorted_and_truncated() {
        let mut scores = HighScores::new();
        for s in 1..=12 {
            scores.record(&run(s * 10), s as f64);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(120));
        assert_eq!(scores.entries.last().map(|e| e.score), Some(30));
        assert!(!scores.qualifies(25));
        assert_eq!(scores.record(&run(55), 0.0), Some(8));
        assert_eq!(scores.entries[7].survived_ms, 30_000);
    }

    #[test]
    fn test_summary_from_world() {
        let mut world = World::new(EngineConfig::default(), 4);
        world.progression.score = 12;
        world.progression.level = 2;
        world.progression.items_collected = 6;
        world.time_ms = 61_500;
        world.achievements[0].unlocked = true;

        let summary = RunSummary::from_world(&world);

        assert_eq!(summary.score, 12);
        assert_eq!(summary.time_spent_secs, 61);
        assert_eq!(summary.achievements, vec!["First Energy".to_string()]);
        let json = summary.to_json().unwrap();
        assert!(json.contains("\"items_collected\":6"));
        let back: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(125), "2:05");
    }
}
