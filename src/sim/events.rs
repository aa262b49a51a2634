//! Outbound game events and inbound contact reports
//!
//! The sim never talks to UI, audio or persistence directly: it queues
//! [`GameEvent`]s on the state and the host drains them each frame. In the
//! other direction the host's physics layer reports [`Contact`]s through
//! [`super::TickInput`].

use serde::{Deserialize, Serialize};

use super::piece::PieceRef;

/// Audio cue identifiers the host maps to actual sounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCue {
    Jump,
    Landing,
    Collect,
    GameOver,
    GameWin,
}

/// Events emitted by the sim for UI / audio / persistence collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// First accepted jump: the run has started
    GameStarted,
    /// Score accumulator changed (new total)
    ScoreChanged(u32),
    /// Health changed (new current value)
    HealthChanged(u32),
    /// Coin collected (new run total)
    CoinCollected(u32),
    /// A new revive target was stored
    CheckpointChanged(PieceRef),
    /// All live platforms stopped scrolling for a revive
    PlatformsFrozen,
    /// Platforms resumed after a confirmed revive landing
    PlatformsResumed,
    /// Terminal: level cleared
    GameWon { stars: u8 },
    /// Terminal: attempt failed
    GameLost,
    PlayAudio(AudioCue),
}

/// Inbound contact reports from the physics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Contact {
    /// Player began touching a piece's top surface
    Enter(PieceRef),
    /// Player stopped touching a piece
    Exit(PieceRef),
    /// Player crossed a side boundary volume
    Boundary,
    /// Player crossed the fall plane below the playfield
    FallPlane,
}
