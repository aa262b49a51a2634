//! Player motion and ground contact
//!
//! Horizontal motion is purely kinematic: the jump arc interpolates
//! between captured start/end positions so the landing spot is
//! deterministic. Gravity only takes over in freefall (initial drop,
//! missed landing, death, revive descent).
//!
//! There is no transform parenting: while grounded the player tracks the
//! piece underneath plus a local offset ("riding"), and the per-frame tick
//! recomputes the world x from it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::piece::PieceRef;
use crate::consts::*;
use crate::{clamp01, lerp};

/// Unit jump arc: zero at 0 and 1, maximal at 0.5
#[inline]
pub fn arc_curve(t: f32) -> f32 {
    4.0 * t * (1.0 - t)
}

/// Kinematic jump/freefall driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerMotion {
    pub pos: Vec3,
    pub elapsed: f32,
    pub start_z: f32,
    pub end_z: f32,
    /// Height of the last contacted surface; only updates while grounded
    pub base_height: f32,
    pub jumping: bool,
    /// Gravity-driven descent active (pre-first-landing, miss, revive)
    pub freefall: bool,
    pub vel_y: f32,
    /// First-ever ground contact recorded; disables the initial freefall
    pub has_landed: bool,
    pub game_over: bool,
    pub jump_time: f32,
    pub jump_distance: f32,
    pub jump_height: f32,
}

impl PlayerMotion {
    pub fn new(pos: Vec3) -> Self {
        Self {
            pos,
            elapsed: 0.0,
            start_z: pos.z,
            end_z: pos.z,
            base_height: 0.0,
            jumping: false,
            freefall: true,
            vel_y: 0.0,
            has_landed: false,
            game_over: false,
            jump_time: JUMP_TIME,
            jump_distance: JUMP_DISTANCE,
            jump_height: JUMP_HEIGHT,
        }
    }

    /// Jump-arc progress fraction in [0, 1]
    pub fn progress(&self) -> f32 {
        clamp01(self.elapsed / self.jump_time)
    }

    /// Begin a jump arc from the current position. The caller is
    /// responsible for the grounded check and for detaching from the
    /// ridden surface first.
    pub fn jump(&mut self) {
        self.elapsed = 0.0;
        self.start_z = self.pos.z;
        self.end_z = self.start_z + self.jump_distance;
        self.jumping = true;
        self.vel_y = 0.0;
    }

    /// Advance the arc or freefall. Returns true on the tick the arc
    /// completes.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.jumping && !self.game_over {
            self.elapsed += dt;
            let progress = self.progress();
            self.pos.z = lerp(self.start_z, self.end_z, progress);
            self.pos.y = self.base_height + arc_curve(progress) * self.jump_height;
            if progress >= 1.0 {
                self.jumping = false;
                return true;
            }
        } else if self.freefall {
            self.vel_y -= GRAVITY * dt;
            self.pos.y += self.vel_y * dt;
        }
        false
    }

    /// Called on every ground contact: the current height becomes the new
    /// base height; the first-ever contact also disables freefall.
    pub fn on_ground_contact(&mut self) {
        if !self.has_landed {
            self.has_landed = true;
            log::debug!("first landing: freefall disabled");
        }
        self.freefall = false;
        self.vel_y = 0.0;
        self.base_height = self.pos.y;
    }

    /// Re-spawn at `pos` and descend onto the revive target
    pub fn revive(&mut self, pos: Vec3) {
        self.jumping = false;
        self.game_over = false;
        self.has_landed = false;
        self.freefall = true;
        self.vel_y = 0.0;
        self.pos = pos;
        self.base_height = 0.0;
        self.start_z = pos.z;
        self.end_z = pos.z;
        self.elapsed = 0.0;
    }

    /// Hand control to gravity (miss, boundary, death)
    pub fn enable_freefall(&mut self) {
        self.jumping = false;
        self.freefall = true;
    }
}

/// Riding attachment: the piece underneath plus the local x offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Riding {
    pub piece: PieceRef,
    pub offset_x: f32,
}

/// Resolves ground contact into "can jump" state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroundContact {
    pub can_jump: bool,
    pub riding: Option<Riding>,
    /// Post-revive jump lock; counts down to zero
    pub jump_lock: f32,
}

impl GroundContact {
    /// Contact-enter: attach to the surface for scroll-following
    pub fn enter(&mut self, piece: PieceRef, offset_x: f32) {
        self.riding = Some(Riding { piece, offset_x });
        self.can_jump = self.jump_lock <= 0.0;
    }

    /// The player detached itself (jump); grounded state ends now
    pub fn detach(&mut self) {
        self.riding = None;
        self.can_jump = false;
    }

    /// Contact-exit report. Only clears `can_jump` when the player already
    /// detached itself; an exit while still riding means the surface
    /// scrolled, not that the player left, and a late exit for a piece left
    /// earlier does not unground a player standing on another one.
    pub fn exit(&mut self, piece: PieceRef) {
        match self.riding {
            Some(r) if r.piece == piece => {
                // Scroll-induced exit: still grounded
            }
            Some(_) => {
                // Stale report for a piece left earlier; grounded elsewhere
            }
            None => self.can_jump = false,
        }
    }

    pub fn lock_jump(&mut self, seconds: f32) {
        self.jump_lock = seconds;
        self.can_jump = false;
    }

    pub fn tick(&mut self, dt: f32) {
        if self.jump_lock > 0.0 {
            self.jump_lock -= dt;
            if self.jump_lock <= 0.0 && self.riding.is_some() {
                self.can_jump = true;
            }
        }
    }
}

/// Outcome of a jump request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpRequest {
    Ignored,
    Jumped { first: bool },
}

/// Input mediation plus revive/death entry points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub motion: PlayerMotion,
    pub contact: GroundContact,
    pub dead: bool,
    pub first_jump_done: bool,
}

impl Player {
    pub fn new(pos: Vec3) -> Self {
        Self {
            motion: PlayerMotion::new(pos),
            contact: GroundContact::default(),
            dead: false,
            first_jump_done: false,
        }
    }

    /// Tap/click arrived: jump if alive and grounded
    pub fn request_jump(&mut self) -> JumpRequest {
        if self.dead || !self.contact.can_jump {
            log::debug!("jump rejected: dead={} can_jump={}", self.dead, self.contact.can_jump);
            return JumpRequest::Ignored;
        }
        let first = !self.first_jump_done;
        self.first_jump_done = true;
        self.contact.detach();
        self.motion.jump();
        JumpRequest::Jumped { first }
    }

    /// Landing contact: attach and update the motion base height
    pub fn land(&mut self, piece: PieceRef, offset_x: f32) {
        self.contact.enter(piece, offset_x);
        self.motion.on_ground_contact();
    }

    /// Death entry point: gravity takes the body
    pub fn kill(&mut self) {
        if self.dead {
            return;
        }
        self.dead = true;
        self.motion.game_over = true;
        self.motion.enable_freefall();
    }

    /// Revive at `pos`, descending onto the target with a temporary
    /// jump lock so the player settles before the next jump
    pub fn revive(&mut self, pos: Vec3) {
        self.dead = false;
        self.motion.revive(pos);
        self.contact.riding = None;
        self.contact.lock_jump(JUMP_LOCK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(platform: u32, piece: u32) -> PieceRef {
        PieceRef { platform, piece }
    }

    fn grounded_player() -> Player {
        let mut p = Player::new(Vec3::ZERO);
        p.land(piece(0, 0), 0.0);
        p
    }

    #[test]
    fn test_arc_curve_shape() {
        assert_eq!(arc_curve(0.0), 0.0);
        assert_eq!(arc_curve(1.0), 0.0);
        assert_eq!(arc_curve(0.5), 1.0);
        assert!(arc_curve(0.25) > 0.0 && arc_curve(0.25) < 1.0);
    }

    #[test]
    fn test_jump_arc_is_deterministic() {
        let mut p = grounded_player();
        assert!(matches!(p.request_jump(), JumpRequest::Jumped { first: true }));

        let start_z = p.motion.pos.z;
        let mut completed = false;
        let dt = 1.0 / 120.0;
        for _ in 0..200 {
            if p.motion.tick(dt) {
                completed = true;
                break;
            }
        }
        assert!(completed);
        assert!(!p.motion.jumping);
        assert!((p.motion.pos.z - (start_z + JUMP_DISTANCE)).abs() < 1e-4);
        // Arc lands back at base height
        assert!(p.motion.pos.y.abs() < 1e-4);
    }

    #[test]
    fn test_jump_peak_at_half_progress() {
        let mut p = grounded_player();
        p.request_jump();
        p.motion.elapsed = p.motion.jump_time / 2.0 - 1e-6;
        p.motion.tick(1e-6);
        assert!((p.motion.pos.y - JUMP_HEIGHT).abs() < 1e-3);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let mut p = grounded_player();
        p.request_jump();
        // Mid-air: second request ignored
        assert_eq!(p.request_jump(), JumpRequest::Ignored);
    }

    #[test]
    fn test_scroll_exit_keeps_can_jump() {
        let mut p = grounded_player();
        assert!(p.contact.can_jump);

        // Exit for the ridden piece while still riding: surface scrolled
        p.contact.exit(piece(0, 0));
        assert!(p.contact.can_jump);

        // Jump detaches first; the following exit clears can_jump
        p.request_jump();
        p.contact.exit(piece(0, 0));
        assert!(!p.contact.can_jump);
    }

    #[test]
    fn test_stale_exit_for_other_piece_keeps_grounded() {
        let mut p = grounded_player();
        p.request_jump();
        p.land(piece(1, 2), 0.0);
        assert!(p.contact.can_jump);

        // Late exit report for the take-off piece arrives after landing
        p.contact.exit(piece(0, 0));
        assert!(p.contact.can_jump);
        assert_eq!(p.contact.riding.map(|r| r.piece), Some(piece(1, 2)));
    }

    #[test]
    fn test_revive_locks_jump_until_settled() {
        let mut p = grounded_player();
        p.kill();
        assert!(p.dead);

        p.revive(Vec3::new(0.0, 1.0, 5.0));
        assert!(!p.dead);
        assert!(p.motion.freefall);

        // Landing during the lock window does not enable jumping
        p.land(piece(1, 3), 0.0);
        assert!(!p.contact.can_jump);

        p.contact.tick(JUMP_LOCK + 0.01);
        assert!(p.contact.can_jump);
    }

    #[test]
    fn test_base_height_updates_only_on_contact() {
        let mut p = grounded_player();
        p.motion.pos.y = 0.8;
        assert_eq!(p.motion.base_height, 0.0);
        p.land(piece(0, 1), 0.0);
        assert!((p.motion.base_height - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_freefall_descends() {
        let mut p = Player::new(Vec3::new(0.0, 1.0, 0.0));
        let dt = 1.0 / 120.0;
        for _ in 0..120 {
            p.motion.tick(dt);
        }
        assert!(p.motion.pos.y < 1.0);
    }
}
