//! Forward platform spawning
//!
//! Watches the player's travel-axis position and schedules a new platform
//! whenever the player closes within a threshold of the last spawn
//! position. Spawn positions advance by a fixed gap and alternate
//! orientation; they are strictly monotonic, so no platform ever appears
//! behind the player.

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    /// Travel-axis position the next platform will occupy
    pub last_pos: f32,
    /// Orientation for the next spawn; flips on every platform
    pub invert_next: bool,
    pub spawn_count: u32,
    pub threshold: f32,
    pub gap: f32,
}

impl Spawner {
    pub fn new(gap: f32, threshold: f32) -> Self {
        Self {
            last_pos: gap,
            invert_next: false,
            spawn_count: 0,
            threshold,
            gap,
        }
    }

    /// Squared-distance check against the player position
    pub fn should_spawn(&self, player_z: f32) -> bool {
        let d = self.last_pos - player_z;
        d * d < self.threshold * self.threshold
    }

    /// Consume the next spawn slot, returning (position, inverted)
    pub fn advance(&mut self) -> (f32, bool) {
        let slot = (self.last_pos, self.invert_next);
        self.last_pos += self.gap;
        self.invert_next = !self.invert_next;
        self.spawn_count += 1;
        log::debug!(
            "spawner: platform #{} at z={:.1} (inverted: {})",
            self.spawn_count,
            slot.0,
            slot.1
        );
        slot
    }

    /// Back to the initial state; the owning state destroys the platforms
    pub fn reset(&mut self) {
        self.last_pos = self.gap;
        self.invert_next = false;
        self.spawn_count = 0;
    }
}

impl Default for Spawner {
    fn default() -> Self {
        Self::new(PLATFORM_GAP, SPAWN_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_scenario() {
        // Threshold 30, gap 10, next slot at z=60
        let mut s = Spawner::new(10.0, 30.0);
        s.last_pos = 60.0;

        assert!(!s.should_spawn(25.0));
        assert!(s.should_spawn(31.0));

        let (pos, inverted) = s.advance();
        assert_eq!(pos, 60.0);
        assert!(!inverted);
        // Exactly one spawn: the next slot is out of range again
        assert!(!s.should_spawn(31.0));
        assert_eq!(s.last_pos, 70.0);
    }

    #[test]
    fn test_alternating_inversion_and_monotonic_positions() {
        let mut s = Spawner::new(10.0, 30.0);
        let mut prev = f32::NEG_INFINITY;
        for i in 0..6 {
            let (pos, inverted) = s.advance();
            assert!(pos > prev);
            assert_eq!(inverted, i % 2 == 1);
            prev = pos;
        }
        assert_eq!(s.spawn_count, 6);
    }

    #[test]
    fn test_reset_restores_initial_slot() {
        let mut s = Spawner::new(10.0, 30.0);
        s.advance();
        s.advance();
        s.reset();
        assert_eq!(s.last_pos, 10.0);
        assert!(!s.invert_next);
        assert_eq!(s.spawn_count, 0);
    }
}
