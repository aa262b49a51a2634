//! Platform conveyors
//!
//! A platform owns an ordered run of pieces, scrolls them along its local
//! axis and wraps them back to offset 0 when they pass the reset position.
//! Pieces are reused in place; scrolling never reorders the sequence.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::piece::Piece;
use crate::consts::*;
use crate::tuning::LevelTuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    /// Position along the travel axis
    pub z: f32,
    /// Every other platform is flipped 180°, mirroring the scroll direction
    pub inverted: bool,
    /// The base platform hosts the initial checkpoint and never falls
    pub is_base: bool,
    pub speed: f32,
    pub gap_range: (f32, f32),
    /// Scrolling suspended for a revive; cleared on resume
    pub frozen: bool,
    /// Scrolling permanently stopped (terminal game state)
    pub stopped: bool,
    /// Seconds since this platform detached, if the fall protocol fired
    pub falling: Option<f32>,
    /// Cumulative spacing of all owned pieces; wrap point for offsets
    pub reset_pos: f32,
    pub pieces: Vec<Piece>,
}

impl Platform {
    /// Piece scale derived from the current score. Applied uniformly to
    /// every piece of a newly generated platform; existing pieces keep
    /// the scale they were spawned with.
    pub fn piece_scale(score: u32) -> f32 {
        (INITIAL_PIECE_SCALE - score as f32 * SCALE_DECREASE_RATE).max(MIN_PIECE_SCALE)
    }

    /// Lay out `count` pieces left to right starting at offset 0, each
    /// subsequent piece spaced by `half_width + gap + half_width` with the
    /// gap drawn uniformly per gap. The final offset becomes the reset
    /// position.
    #[allow(clippy::too_many_arguments)]
    pub fn generate<R: Rng>(
        id: u32,
        z: f32,
        inverted: bool,
        count: usize,
        scale: f32,
        tuning: &LevelTuning,
        next_piece_id: &mut u32,
        rng: &mut R,
    ) -> Self {
        let (gap_min, gap_max) = tuning.gap_range();
        let mut pieces = Vec::with_capacity(count);
        let mut offset = 0.0;
        let scaled_half = PIECE_HALF_WIDTH * scale;

        for _ in 0..count {
            let pid = *next_piece_id;
            *next_piece_id += 1;

            let mut piece = Piece::new(pid, offset, scale, tuning.safe_zone_ratio);
            piece.roll_pickup(
                rng,
                tuning.heart_chance,
                tuning.trap_chance,
                tuning.coin_chance,
            );
            pieces.push(piece);

            let gap = rng.random_range(gap_min..=gap_max);
            offset += scaled_half + gap + scaled_half;
        }

        log::debug!(
            "platform {id} generated: {count} pieces, scale {scale:.2}, reset {offset:.2}"
        );

        Self {
            id,
            z,
            inverted,
            is_base: false,
            speed: tuning.platform_speed,
            gap_range: (gap_min, gap_max),
            frozen: false,
            stopped: false,
            falling: None,
            reset_pos: offset,
            pieces,
        }
    }

    /// Static single-piece base platform the run starts on
    pub fn base(id: u32, next_piece_id: &mut u32, safe_zone_ratio: f32) -> Self {
        let pid = *next_piece_id;
        *next_piece_id += 1;
        let mut piece = Piece::new(pid, 0.0, INITIAL_PIECE_SCALE, safe_zone_ratio);
        piece.scoreless = true;
        let reset_pos = piece.half_width * 2.0;
        Self {
            id,
            z: 0.0,
            inverted: false,
            is_base: true,
            speed: 0.0,
            gap_range: (0.0, 0.0),
            frozen: false,
            stopped: false,
            falling: None,
            reset_pos,
            pieces: vec![piece],
        }
    }

    /// Advance the conveyor. No-op while frozen or stopped; a detached
    /// platform only accumulates its fall time.
    pub fn tick(&mut self, dt: f32) {
        if let Some(elapsed) = &mut self.falling {
            *elapsed += dt;
            return;
        }
        if self.frozen || self.stopped {
            return;
        }
        for piece in &mut self.pieces {
            piece.offset += self.speed * dt;
            if piece.offset >= self.reset_pos {
                piece.offset = 0.0;
            }
        }
    }

    pub fn freeze(&mut self) {
        if self.falling.is_none() {
            self.frozen = true;
        }
    }

    pub fn resume(&mut self) {
        self.frozen = false;
    }

    /// Detach: the platform drops out of play and despawns shortly after
    pub fn begin_fall(&mut self) {
        if self.falling.is_none() {
            self.falling = Some(0.0);
            log::debug!("platform {} detached and falling", self.id);
        }
    }

    /// Fallen long enough to despawn
    pub fn expired(&self) -> bool {
        self.falling.is_some_and(|t| t >= FALL_DESPAWN)
    }

    /// World x of a piece center; inversion mirrors the conveyor axis
    pub fn world_piece_x(&self, piece: &Piece) -> f32 {
        if self.inverted {
            -piece.offset
        } else {
            piece.offset
        }
    }

    pub fn piece(&self, id: u32) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    pub fn piece_mut(&mut self, id: u32) -> Option<&mut Piece> {
        self.pieces.iter_mut().find(|p| p.id == id)
    }

    /// Piece whose offset is closest to `reset_pos / 2`; used as the
    /// fallback revive target after a boundary exit. First piece in
    /// iteration order wins ties.
    pub fn center_piece(&self) -> Option<&Piece> {
        let center = self.reset_pos / 2.0;
        let mut best: Option<&Piece> = None;
        let mut best_dist = f32::INFINITY;
        for piece in &self.pieces {
            let dist = (piece.offset - center).abs();
            if dist < best_dist {
                best_dist = dist;
                best = Some(piece);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn tuning() -> LevelTuning {
        LevelTuning::default()
    }

    fn make(seed: u64) -> Platform {
        let mut ids = 0;
        let mut rng = Pcg32::seed_from_u64(seed);
        Platform::generate(1, 10.0, false, 10, 2.0, &tuning(), &mut ids, &mut rng)
    }

    #[test]
    fn test_generate_spacing_and_reset_pos() {
        let p = make(42);
        assert_eq!(p.pieces.len(), 10);

        let (gap_min, gap_max) = p.gap_range;
        for pair in p.pieces.windows(2) {
            let spacing = pair[1].offset - pair[0].offset;
            let gap = spacing - pair[0].half_width - pair[1].half_width;
            assert!(gap >= gap_min - 1e-4 && gap <= gap_max + 1e-4);
        }

        // Reset position is the cumulative spacing of all pieces
        let last = p.pieces.last().unwrap();
        assert!(p.reset_pos > last.offset);
    }

    #[test]
    fn test_scroll_wraps_to_zero() {
        let mut p = make(42);
        let reset = p.reset_pos;
        // Drive the first piece just past the wrap point
        p.pieces[0].offset = reset - 0.01;
        p.tick(0.1);
        assert!(p.pieces[0].offset.abs() < 1e-6);
    }

    #[test]
    fn test_frozen_platform_does_not_scroll() {
        let mut p = make(42);
        p.freeze();
        let before: Vec<f32> = p.pieces.iter().map(|x| x.offset).collect();
        p.tick(1.0);
        let after: Vec<f32> = p.pieces.iter().map(|x| x.offset).collect();
        assert_eq!(before, after);

        p.resume();
        p.tick(1.0);
        assert!((p.pieces[0].offset - before[0] - p.speed).abs() < 1e-4);
    }

    #[test]
    fn test_falling_platform_expires() {
        let mut p = make(42);
        p.begin_fall();
        assert!(!p.expired());
        p.tick(FALL_DESPAWN + 0.1);
        assert!(p.expired());
        // Freezing a falling platform has no effect
        p.freeze();
        assert!(!p.frozen);
    }

    #[test]
    fn test_center_piece_nearest_to_midpoint() {
        let p = make(42);
        let center = p.reset_pos / 2.0;
        let found = p.center_piece().unwrap();
        for piece in &p.pieces {
            assert!((found.offset - center).abs() <= (piece.offset - center).abs() + 1e-6);
        }
    }

    #[test]
    fn test_piece_scale_floor() {
        assert_eq!(Platform::piece_scale(0), INITIAL_PIECE_SCALE);
        assert!((Platform::piece_scale(5) - 2.5).abs() < 1e-6);
        assert_eq!(Platform::piece_scale(1000), MIN_PIECE_SCALE);
    }

    proptest! {
        /// After reset_pos / speed seconds of scrolling, every offset
        /// returns to its starting value (cyclic wrap).
        #[test]
        fn prop_full_cycle_returns_offsets(seed in 0u64..500) {
            let mut p = make(seed);
            let start: Vec<f32> = p.pieces.iter().map(|x| x.offset).collect();

            let cycle = p.reset_pos / p.speed;
            let steps = 4000u32;
            let dt = cycle / steps as f32;
            for _ in 0..steps {
                p.tick(dt);
            }

            for (piece, s) in p.pieces.iter().zip(&start) {
                let diff = (piece.offset - s).abs();
                let wrapped = (diff - p.reset_pos).abs();
                prop_assert!(diff < 0.05 || wrapped < 0.05);
            }
        }
    }
}
