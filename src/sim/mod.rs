//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod events;
pub mod piece;
pub mod platform;
pub mod player;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod timer;

pub use events::{AudioCue, Contact, GameEvent};
pub use piece::{Landing, Pickup, PickupKind, Piece, PieceRef};
pub use platform::Platform;
pub use player::{GroundContact, JumpRequest, Player, PlayerMotion, Riding};
pub use spawner::Spawner;
pub use state::{CheckpointStore, GamePhase, GameState, HealthTracker, ScoreTracker};
pub use tick::{TickInput, tick};
pub use timer::{TimerKind, TimerQueue};
