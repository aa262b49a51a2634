//! Persistent player progress
//!
//! Best score, the coin wallet and per-level completion survive across
//! runs. Stored as plain JSON; a missing or corrupt file starts fresh
//! with a warning rather than failing.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Completion record for one level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u32,
    pub unlocked: bool,
    /// Best star rating achieved (0 = never cleared)
    pub stars: u8,
}

/// Cross-run player progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub best_score: u32,
    /// Coin wallet; run pickups and level rewards accumulate here
    pub coins: u32,
    /// Last level the player was on; where a new session resumes
    pub current_level: u32,
    pub levels: Vec<LevelProgress>,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Progress {
    /// Fresh progress: only level 1 unlocked, nothing cleared
    pub fn new(total_levels: u32) -> Self {
        let levels = (1..=total_levels.max(1))
            .map(|level| LevelProgress {
                level,
                unlocked: level == 1,
                stars: 0,
            })
            .collect();
        Self {
            best_score: 0,
            coins: 0,
            current_level: 1,
            levels,
        }
    }

    /// Record a run score; returns true when it is a new best
    pub fn record_score(&mut self, score: u32) -> bool {
        if score > self.best_score {
            self.best_score = score;
            log::info!("new best score: {score}");
            return true;
        }
        false
    }

    pub fn add_coins(&mut self, amount: u32) {
        self.coins += amount;
    }

    pub fn is_unlocked(&self, level: u32) -> bool {
        self.levels
            .iter()
            .any(|l| l.level == level && l.unlocked)
    }

    pub fn stars_for(&self, level: u32) -> u8 {
        self.levels
            .iter()
            .find(|l| l.level == level)
            .map(|l| l.stars)
            .unwrap_or(0)
    }

    fn entry_mut(&mut self, level: u32) -> &mut LevelProgress {
        if let Some(i) = self.levels.iter().position(|l| l.level == level) {
            return &mut self.levels[i];
        }
        self.levels.push(LevelProgress {
            level,
            unlocked: false,
            stars: 0,
        });
        self.levels.last_mut().unwrap()
    }

    /// Record a cleared level: the star rating only ever improves, the
    /// coin reward is banked and the next level unlocks.
    pub fn complete_level(&mut self, level: u32, stars: u8, coin_reward: u32) {
        let entry = self.entry_mut(level);
        entry.unlocked = true;
        if stars > entry.stars {
            entry.stars = stars;
        }
        self.add_coins(coin_reward);

        let next = self.entry_mut(level + 1);
        next.unlocked = true;
        self.current_level = level + 1;
        log::info!("level {level} cleared with {stars} stars, level {} unlocked", level + 1);
    }

    /// Load progress from disk, starting fresh on any failure
    pub fn load(path: &Path, total_levels: u32) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<Progress>(&json) {
                Ok(progress) => {
                    log::info!(
                        "loaded progress: best {} / level {}",
                        progress.best_score,
                        progress.current_level
                    );
                    progress
                }
                Err(err) => {
                    log::warn!("{}: corrupt progress ({err}), starting fresh", path.display());
                    Self::new(total_levels)
                }
            },
            Err(err) => {
                log::info!("{}: {err}, starting fresh", path.display());
                Self::new(total_levels)
            }
        }
    }

    /// Save progress to disk; failures are logged, never fatal
    pub fn save(&self, path: &Path) {
        let json = match serde_json::to_string_pretty(self) {
            Ok(json) => json,
            Err(err) => {
                log::error!("progress serialization failed: {err}");
                return;
            }
        };
        if let Err(err) = std::fs::write(path, json) {
            log::error!("{}: saving progress failed: {err}", path.display());
        } else {
            log::debug!("progress saved to {}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_progress_unlocks_only_level_one() {
        let p = Progress::new(3);
        assert!(p.is_unlocked(1));
        assert!(!p.is_unlocked(2));
        assert!(!p.is_unlocked(3));
        assert_eq!(p.best_score, 0);
    }

    #[test]
    fn test_best_score_only_improves() {
        let mut p = Progress::new(3);
        assert!(p.record_score(10));
        assert!(!p.record_score(5));
        assert!(!p.record_score(10));
        assert!(p.record_score(11));
        assert_eq!(p.best_score, 11);
    }

    #[test]
    fn test_complete_level_unlocks_next_and_banks_reward() {
        let mut p = Progress::new(3);
        p.complete_level(1, 2, 100);
        assert!(p.is_unlocked(2));
        assert_eq!(p.stars_for(1), 2);
        assert_eq!(p.coins, 100);
        assert_eq!(p.current_level, 2);
    }

    #[test]
    fn test_stars_never_regress() {
        let mut p = Progress::new(3);
        p.complete_level(1, 3, 0);
        p.complete_level(1, 1, 0);
        assert_eq!(p.stars_for(1), 3);
    }

    #[test]
    fn test_completing_past_table_extends_levels() {
        let mut p = Progress::new(2);
        p.complete_level(2, 1, 50);
        assert!(p.is_unlocked(3));
        assert_eq!(p.current_level, 3);
    }

    #[test]
    fn test_missing_file_starts_fresh() {
        let p = Progress::load(Path::new("/nonexistent/progress.json"), 3);
        assert_eq!(p.best_score, 0);
        assert!(p.is_unlocked(1));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = std::env::temp_dir().join("critter-hop-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("progress.json");

        let mut p = Progress::new(3);
        p.record_score(42);
        p.complete_level(1, 3, 100);
        p.save(&path);

        let loaded = Progress::load(&path, 3);
        assert_eq!(loaded.best_score, 42);
        assert_eq!(loaded.stars_for(1), 3);
        assert_eq!(loaded.coins, 100);

        std::fs::remove_file(&path).ok();
    }
}
