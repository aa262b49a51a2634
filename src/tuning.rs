//! Data-driven per-level balance
//!
//! The level config provider is an external collaborator: the sim
//! consumes a [`LevelTuning`] snapshot but never owns the table. A
//! missing or corrupt table degrades to hardcoded defaults with a
//! warning; it never aborts the game (the only fatal case is the host
//! refusing to enter play without any config at all).

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Configuration for one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelTuning {
    pub level: u32,
    pub name: String,
    /// Score needed to clear the level
    pub target_score: u32,
    /// Coin wallet reward on clearing
    pub coin_reward: u32,
    pub platform_speed: f32,
    pub gap_min: f32,
    pub gap_max: f32,
    /// Fraction of a piece's width counted as a safe landing
    pub safe_zone_ratio: f32,
    /// Speed gained per second while playing (0 = constant)
    pub speed_increase_rate: f32,
    pub coin_chance: f32,
    pub heart_chance: f32,
    pub trap_chance: f32,
}

impl Default for LevelTuning {
    fn default() -> Self {
        Self {
            level: 1,
            name: "Level 1".to_string(),
            target_score: 50,
            coin_reward: 100,
            platform_speed: DEFAULT_PLATFORM_SPEED,
            gap_min: DEFAULT_GAP_MIN,
            gap_max: DEFAULT_GAP_MAX,
            safe_zone_ratio: DEFAULT_SAFE_ZONE_RATIO,
            speed_increase_rate: 0.0,
            coin_chance: 0.2,
            heart_chance: 0.15,
            trap_chance: 0.1,
        }
    }
}

impl LevelTuning {
    /// Gap range with ordering enforced
    pub fn gap_range(&self) -> (f32, f32) {
        (self.gap_min, self.gap_max.max(self.gap_min))
    }

    /// Clamp fields into sane ranges (mirrors the table validation)
    pub fn sanitize(mut self) -> Self {
        self.level = self.level.max(1);
        self.target_score = self.target_score.max(1);
        self.platform_speed = self.platform_speed.max(0.5);
        self.gap_min = self.gap_min.max(0.1);
        self.gap_max = self.gap_max.max(self.gap_min);
        self.safe_zone_ratio = self.safe_zone_ratio.clamp(0.5, 0.9);
        self.coin_chance = self.coin_chance.clamp(0.0, 1.0);
        self.heart_chance = self.heart_chance.clamp(0.0, 1.0);
        self.trap_chance = self.trap_chance.clamp(0.0, 1.0);
        self
    }
}

/// Ordered level list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelTable {
    pub levels: Vec<LevelTuning>,
}

impl LevelTable {
    /// Built-in table used when no external config is supplied
    pub fn builtin() -> Self {
        let base = LevelTuning::default();
        let levels = vec![
            base.clone(),
            LevelTuning {
                level: 2,
                name: "Level 2".to_string(),
                target_score: 75,
                coin_reward: 150,
                platform_speed: 2.5,
                trap_chance: 0.12,
                ..base.clone()
            },
            LevelTuning {
                level: 3,
                name: "Level 3".to_string(),
                target_score: 100,
                coin_reward: 200,
                platform_speed: 3.0,
                gap_min: 0.7,
                gap_max: 1.8,
                safe_zone_ratio: 0.6,
                speed_increase_rate: 0.01,
                trap_chance: 0.15,
                ..base
            },
        ];
        Self { levels }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut table: LevelTable = serde_json::from_str(json)?;
        table.levels = table.levels.into_iter().map(LevelTuning::sanitize).collect();
        Ok(table)
    }

    /// Load a table from disk, falling back to the built-in one
    pub fn load(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(table) if !table.levels.is_empty() => {
                    log::info!("loaded {} levels from {}", table.levels.len(), path.display());
                    table
                }
                Ok(_) => {
                    log::warn!("{}: empty level table, using built-in levels", path.display());
                    Self::builtin()
                }
                Err(err) => {
                    log::warn!("{}: invalid level table ({err}), using built-in levels", path.display());
                    Self::builtin()
                }
            },
            Err(err) => {
                log::warn!("{}: {err}, using built-in levels", path.display());
                Self::builtin()
            }
        }
    }

    pub fn total(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Tuning for a 1-based level number. Unknown levels fall back to the
    /// defaults with a warning rather than failing.
    pub fn get(&self, level: u32) -> LevelTuning {
        self.levels
            .iter()
            .find(|l| l.level == level)
            .cloned()
            .unwrap_or_else(|| {
                log::warn!("no tuning for level {level}, using defaults");
                LevelTuning {
                    level,
                    ..LevelTuning::default()
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_levels_ordered() {
        let table = LevelTable::builtin();
        assert!(table.total() >= 3);
        for (i, l) in table.levels.iter().enumerate() {
            assert_eq!(l.level, i as u32 + 1);
        }
    }

    #[test]
    fn test_missing_level_falls_back_to_defaults() {
        let table = LevelTable::builtin();
        let tuning = table.get(99);
        assert_eq!(tuning.level, 99);
        assert_eq!(tuning.platform_speed, DEFAULT_PLATFORM_SPEED);
        assert_eq!(tuning.safe_zone_ratio, DEFAULT_SAFE_ZONE_RATIO);
    }

    #[test]
    fn test_from_json_sanitizes() {
        let json = r#"{"levels":[{"level":1,"platform_speed":0.0,"gap_min":2.0,"gap_max":1.0,"safe_zone_ratio":1.5}]}"#;
        let table = LevelTable::from_json(json).unwrap();
        let l = &table.levels[0];
        assert_eq!(l.platform_speed, 0.5);
        assert!(l.gap_max >= l.gap_min);
        assert_eq!(l.safe_zone_ratio, 0.9);
    }

    #[test]
    fn test_bad_json_falls_back() {
        let path = std::path::Path::new("/nonexistent/levels.json");
        let table = LevelTable::load(path);
        assert_eq!(table.total(), LevelTable::builtin().total());
    }
}
