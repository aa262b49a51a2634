//! Game state and core trackers
//!
//! Everything the sim needs to advance a run lives here. Score, health
//! and checkpoint are explicitly constructed services owned by the state
//! and written only by their designated owners: the orchestrator writes
//! health; safe landings and boundary revives write the checkpoint.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::piece::{Piece, PieceRef};
use super::platform::Platform;
use super::player::Player;
use super::spawner::Spawner;
use super::timer::TimerQueue;
use crate::consts::*;
use crate::tuning::LevelTuning;

/// Top-level game state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Level loaded, waiting for the first jump
    Ready,
    Playing,
    /// Platforms frozen while the player descends onto a revive target
    FrozenForRevive,
    /// Terminal for the attempt
    GameOver,
    /// Terminal for the attempt
    Won,
}

impl GamePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Won)
    }
}

/// Non-negative score accumulator
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScoreTracker {
    score: u32,
}

impl ScoreTracker {
    pub fn get(&self) -> u32 {
        self.score
    }

    /// Add and return the new total
    pub fn add(&mut self, value: u32) -> u32 {
        self.score += value;
        self.score
    }

    pub fn reset(&mut self) {
        self.score = 0;
    }
}

/// Lives plus the cumulative loss counter the star rating reads
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthTracker {
    current: u32,
    max: u32,
    /// Lives lost this attempt; drives the star rating
    lost: u32,
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self {
            current: START_HEALTH,
            max: MAX_HEALTH,
            lost: 0,
        }
    }
}

impl HealthTracker {
    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn lost(&self) -> u32 {
        self.lost
    }

    /// Add lives from a heart pickup. Returns false (and consumes
    /// nothing) when already at max.
    pub fn add(&mut self, amount: u32) -> bool {
        if self.current >= self.max {
            return false;
        }
        self.current = (self.current + amount).min(self.max);
        true
    }

    /// Lose lives. Returns true while the player is still alive; false
    /// exactly when the post-decrement value is 0.
    pub fn lose(&mut self, amount: u32) -> bool {
        self.current = self.current.saturating_sub(amount);
        self.lost += amount;
        self.current > 0
    }

    /// Drain remaining lives on a terminal loss without counting toward
    /// the star rating
    pub fn deplete(&mut self) {
        self.current = 0;
    }

    pub fn reset(&mut self) {
        self.current = START_HEALTH;
        self.lost = 0;
    }

    /// Star rating: 0 lost -> 3, 1 lost -> 2, 2+ lost -> 1
    pub fn stars(&self) -> u8 {
        match self.lost {
            0 => 3,
            1 => 2,
            _ => 1,
        }
    }
}

/// Most recent safely-landed piece; the revive target
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CheckpointStore {
    piece: Option<PieceRef>,
}

impl CheckpointStore {
    pub fn set(&mut self, piece: PieceRef) {
        self.piece = Some(piece);
        log::debug!("checkpoint set to {piece:?}");
    }

    pub fn get(&self) -> Option<PieceRef> {
        self.piece
    }

    pub fn is(&self, piece: PieceRef) -> bool {
        self.piece == Some(piece)
    }

    /// Does the checkpoint pin any piece of this platform?
    pub fn pins_platform(&self, platform: u32) -> bool {
        self.piece.is_some_and(|p| p.platform == platform)
    }

    pub fn clear(&mut self) {
        self.piece = None;
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Seconds since the run was created
    pub time: f32,
    /// Revive-in-progress guard: the next landing skips evaluation
    pub reviving: bool,
    /// Boundary volume re-arm countdown
    pub boundary_cooldown: f32,
    /// 1-based level number this run plays
    pub level: u32,
    /// Snapshot of the level configuration this run was built with
    pub tuning: LevelTuning,
    pub score: ScoreTracker,
    /// Coins collected this run
    pub coins: u32,
    pub health: HealthTracker,
    pub checkpoint: CheckpointStore,
    pub player: Player,
    /// Sorted by id (spawn order) for deterministic iteration
    pub platforms: Vec<Platform>,
    pub spawner: Spawner,
    pub timers: TimerQueue,
    /// Outbound events for the host, drained each frame
    pub events: Vec<GameEvent>,
    pub(crate) next_platform_id: u32,
    pub(crate) next_piece_id: u32,
}

impl GameState {
    /// Create a run for `level` with the given seed. The player starts in
    /// freefall just above the base platform, which hosts the initial
    /// checkpoint.
    pub fn new(seed: u64, level: u32, tuning: LevelTuning) -> Self {
        let mut next_piece_id = 0;
        let base = Platform::base(0, &mut next_piece_id, tuning.safe_zone_ratio);
        let base_ref = PieceRef {
            platform: base.id,
            piece: base.pieces[0].id,
        };

        let mut checkpoint = CheckpointStore::default();
        checkpoint.piece = Some(base_ref);

        log::info!("new run: level {level} seed {seed}");

        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Ready,
            time: 0.0,
            reviving: false,
            boundary_cooldown: 0.0,
            level,
            tuning,
            score: ScoreTracker::default(),
            coins: 0,
            health: HealthTracker::default(),
            checkpoint,
            player: Player::new(Vec3::new(0.0, REVIVE_DROP_HEIGHT, 0.0)),
            platforms: vec![base],
            spawner: Spawner::default(),
            timers: TimerQueue::new(),
            events: Vec::new(),
            next_platform_id: 1,
            next_piece_id,
        }
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand the queued events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn next_platform_id(&mut self) -> u32 {
        let id = self.next_platform_id;
        self.next_platform_id += 1;
        id
    }

    pub fn piece_id_counter(&mut self) -> &mut u32 {
        &mut self.next_piece_id
    }

    pub fn platform(&self, id: u32) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    pub fn platform_mut(&mut self, id: u32) -> Option<&mut Platform> {
        self.platforms.iter_mut().find(|p| p.id == id)
    }

    pub fn piece(&self, piece: PieceRef) -> Option<&Piece> {
        self.platform(piece.platform)?.piece(piece.piece)
    }

    pub fn piece_mut(&mut self, piece: PieceRef) -> Option<&mut Piece> {
        self.platform_mut(piece.platform)?.piece_mut(piece.piece)
    }

    /// World-space center of a live (non-falling) piece
    pub fn piece_world_pos(&self, piece: PieceRef) -> Option<Vec3> {
        let platform = self.platform(piece.platform)?;
        if platform.falling.is_some() {
            return None;
        }
        let p = platform.piece(piece.piece)?;
        Some(Vec3::new(platform.world_piece_x(p), 0.0, platform.z))
    }

    /// Reset to a Playing-ready state on retry: health, checkpoint,
    /// score, reviving flag, platforms and player all reinitialized.
    pub fn reset(&mut self) {
        let seed = self.seed;
        let level = self.level;
        let tuning = self.tuning.clone();
        *self = Self::new(seed, level, tuning);
        log::info!("game state reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_score_accumulates() {
        let mut score = ScoreTracker::default();
        let values = [1, 5, 2, 9];
        for v in values {
            score.add(v);
        }
        assert_eq!(score.get(), values.iter().sum::<u32>());
        score.reset();
        assert_eq!(score.get(), 0);
    }

    #[test]
    fn test_health_scenario_three_misses() {
        let mut health = HealthTracker::default();
        assert_eq!(health.current(), 3);
        assert!(health.lose(1));
        assert!(health.lose(1));
        // Third loss reaches 0: not alive
        assert!(!health.lose(1));
        assert_eq!(health.current(), 0);
        assert_eq!(health.lost(), 3);
    }

    #[test]
    fn test_health_add_rejected_at_max() {
        let mut health = HealthTracker::default();
        assert!(!health.add(1));
        health.lose(1);
        assert!(health.add(1));
        assert_eq!(health.current(), 3);
    }

    #[test]
    fn test_star_mapping() {
        let cases = [(0u32, 3u8), (1, 2), (2, 1), (5, 1)];
        for (lost, expected) in cases {
            let mut health = HealthTracker::default();
            for _ in 0..lost {
                health.lose(1);
            }
            assert_eq!(health.stars(), expected, "lost={lost}");
        }
    }

    #[test]
    fn test_initial_checkpoint_is_base_piece() {
        let state = GameState::new(7, 1, LevelTuning::default());
        let cp = state.checkpoint.get().unwrap();
        let base = state.platform(cp.platform).unwrap();
        assert!(base.is_base);
        assert!(base.piece(cp.piece).is_some());
        assert_eq!(state.phase, GamePhase::Ready);
    }

    #[test]
    fn test_reset_reinitializes_attempt() {
        let mut state = GameState::new(7, 1, LevelTuning::default());
        state.score.add(10);
        state.health.lose(2);
        state.reviving = true;
        state.reset();
        assert_eq!(state.score.get(), 0);
        assert_eq!(state.health.current(), START_HEALTH);
        assert!(!state.reviving);
        assert!(state.checkpoint.get().is_some());
    }

    proptest! {
        /// Health stays in [0, max] regardless of call order
        #[test]
        fn prop_health_clamped(ops in proptest::collection::vec(any::<bool>(), 0..64)) {
            let mut health = HealthTracker::default();
            for add in ops {
                if add {
                    health.add(1);
                } else {
                    health.lose(1);
                }
                prop_assert!(health.current() <= health.max());
            }
        }
    }
}
