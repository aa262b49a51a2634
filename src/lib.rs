//! Critter Hop - gameplay core for an endless platform-hopping game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (pieces, platforms, player, game state)
//! - `tuning`: Data-driven per-level balance
//! - `progress`: Persisted best score / level unlocks / star ratings
//!
//! Rendering, audio playback, UI and the physics engine are external
//! collaborators: the sim consumes contact reports and emits [`sim::GameEvent`]s.

pub mod progress;
pub mod sim;
pub mod tuning;

pub use progress::Progress;
pub use tuning::{LevelTable, LevelTuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Fallback platform scroll speed when level config is unavailable
    pub const DEFAULT_PLATFORM_SPEED: f32 = 2.0;
    /// Fallback gap range between pieces on a conveyor
    pub const DEFAULT_GAP_MIN: f32 = 0.5;
    pub const DEFAULT_GAP_MAX: f32 = 1.5;
    /// Fallback fraction of a piece's width that counts as a safe landing
    pub const DEFAULT_SAFE_ZONE_RATIO: f32 = 0.7;

    /// Unscaled piece half-width along the conveyor axis
    pub const PIECE_HALF_WIDTH: f32 = 0.5;
    /// Piece half-depth along the travel axis (landing tolerance in z)
    pub const PIECE_HALF_DEPTH: f32 = 1.5;
    /// Piece scale at score 0
    pub const INITIAL_PIECE_SCALE: f32 = 3.0;
    /// Scale lost per point of score
    pub const SCALE_DECREASE_RATE: f32 = 0.1;
    /// Pieces never shrink below this scale
    pub const MIN_PIECE_SCALE: f32 = 1.0;
    /// Score awarded per safe landing
    pub const PIECE_SCORE_VALUE: u32 = 1;
    /// Pieces laid out per spawned platform
    pub const PIECES_PER_PLATFORM: usize = 10;

    /// Duration of one jump arc (seconds)
    pub const JUMP_TIME: f32 = 0.3;
    /// Forward distance covered by one jump
    pub const JUMP_DISTANCE: f32 = 3.0;
    /// Peak height of the jump arc
    pub const JUMP_HEIGHT: f32 = 2.0;

    /// Contact-settle delay before a left piece arms its fall
    pub const SETTLE_DELAY: f32 = 0.1;
    /// Additional delay between arming and the platform detaching
    pub const PRE_FALL_DELAY: f32 = 0.4;
    /// Re-poll interval while the checkpoint still pins a fall candidate
    pub const CHECKPOINT_POLL: f32 = 0.1;
    /// Seconds a detached platform keeps falling before despawn
    pub const FALL_DESPAWN: f32 = 2.0;
    /// Buffer added to the jump duration for the missed-landing check
    pub const MISS_CHECK_BUFFER: f32 = 0.2;
    /// Jump lock applied after a revive
    pub const JUMP_LOCK: f32 = 1.0;
    /// Boundary volumes re-arm after this long
    pub const BOUNDARY_COOLDOWN: f32 = 2.0;

    /// Player-to-spawn-position distance that triggers the next platform
    pub const SPAWN_THRESHOLD: f32 = 30.0;
    /// Fixed travel-axis spacing between spawned platforms
    pub const PLATFORM_GAP: f32 = 10.0;

    /// Side boundary position; riding past it counts as leaving the play area
    pub const BOUNDARY_X: f32 = 8.0;
    /// Falling below this height counts as a fall-through
    pub const FALL_PLANE_Y: f32 = -5.0;
    /// Freefall acceleration (gameplay gravity, not physical)
    pub const GRAVITY: f32 = 20.0;
    /// Revive drop height above the target piece
    pub const REVIVE_DROP_HEIGHT: f32 = 1.0;

    pub const MAX_HEALTH: u32 = 3;
    pub const START_HEALTH: u32 = 3;
}

/// Clamp to [0, 1]
#[inline]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Linear interpolation a -> b by t
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
