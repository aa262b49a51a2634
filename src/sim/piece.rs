//! Landing pads
//!
//! A piece is one atomic landing surface on a platform conveyor. It owns
//! the landing-accuracy judgement, an optional pickup slot and the contact
//! flags the delayed fall protocol reads.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Stable reference to a piece owned by some platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceRef {
    pub platform: u32,
    pub piece: u32,
}

/// Pickup types; at most one is visible per piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Coin,
    Heart,
    Trap,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub kind: PickupKind,
    pub visible: bool,
}

impl Pickup {
    pub fn show(kind: PickupKind) -> Self {
        Self {
            kind,
            visible: true,
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

/// Landing verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    Safe,
    Miss,
}

/// One landing pad on a platform conveyor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Piece {
    pub id: u32,
    /// Offset along the conveyor axis; wraps at the platform's reset position
    pub offset: f32,
    /// Half-width after the spawn-time scale was applied; immutable afterwards
    pub half_width: f32,
    /// Fraction of the width counted as safe; immutable after spawn
    pub safe_zone_ratio: f32,
    pub scale: f32,
    pub score_value: u32,
    /// Base pieces host the initial checkpoint but never award score
    pub scoreless: bool,
    pub pickup: Option<Pickup>,
    /// Player has landed on this piece at some point
    pub landed: bool,
    /// Player has genuinely left after landing (fall protocol armed)
    pub left: bool,
    /// Player is currently in contact
    pub occupied: bool,
}

impl Piece {
    pub fn new(id: u32, offset: f32, scale: f32, safe_zone_ratio: f32) -> Self {
        Self {
            id,
            offset,
            half_width: crate::consts::PIECE_HALF_WIDTH * scale,
            safe_zone_ratio,
            scale,
            score_value: crate::consts::PIECE_SCORE_VALUE,
            scoreless: false,
            pickup: None,
            landed: false,
            left: false,
            occupied: false,
        }
    }

    /// Absolute distance from center inside which a landing is safe
    pub fn safe_threshold(&self) -> f32 {
        self.half_width * self.safe_zone_ratio
    }

    /// Judge a landing at `landing_x` against this piece centered at
    /// `center_x`. The boundary value is Safe (closed interval).
    pub fn evaluate_landing(&self, landing_x: f32, center_x: f32) -> Landing {
        if (landing_x - center_x).abs() <= self.safe_threshold() {
            Landing::Safe
        } else {
            Landing::Miss
        }
    }

    /// Roll the pickup slot once at spawn time.
    ///
    /// Prioritized independent rolls in order heart, trap, coin: the first
    /// successful roll wins and suppresses the rest.
    pub fn roll_pickup<R: Rng>(
        &mut self,
        rng: &mut R,
        heart_chance: f32,
        trap_chance: f32,
        coin_chance: f32,
    ) {
        self.pickup = None;
        if rng.random::<f32>() <= heart_chance {
            self.pickup = Some(Pickup::show(PickupKind::Heart));
        } else if rng.random::<f32>() <= trap_chance {
            self.pickup = Some(Pickup::show(PickupKind::Trap));
        } else if rng.random::<f32>() <= coin_chance {
            self.pickup = Some(Pickup::show(PickupKind::Coin));
        }
    }

    /// Visible pickup, if any
    pub fn visible_pickup(&self) -> Option<PickupKind> {
        self.pickup.filter(|p| p.visible).map(|p| p.kind)
    }

    /// Reset contact flags so a piece is re-landable after a cancelled fall
    pub fn reset_contact_flags(&mut self) {
        self.left = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_safe_zone_scenario() {
        // halfWidth = 1, ratio = 0.7 -> threshold 0.7
        let mut piece = Piece::new(1, 0.0, 2.0, 0.7);
        assert!((piece.half_width - 1.0).abs() < 1e-6);
        piece.safe_zone_ratio = 0.7;

        assert_eq!(piece.evaluate_landing(0.5, 0.0), Landing::Safe);
        assert_eq!(piece.evaluate_landing(0.9, 0.0), Landing::Miss);
        assert_eq!(piece.evaluate_landing(-0.9, 0.0), Landing::Miss);
    }

    #[test]
    fn test_boundary_is_safe() {
        let piece = Piece::new(1, 0.0, 2.0, 0.7);
        let threshold = piece.safe_threshold();
        assert_eq!(piece.evaluate_landing(threshold, 0.0), Landing::Safe);
        assert_eq!(piece.evaluate_landing(-threshold, 0.0), Landing::Safe);
    }

    #[test]
    fn test_pickup_priority_heart_wins() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut piece = Piece::new(1, 0.0, 3.0, 0.7);
        // Certain heart roll suppresses trap and coin even at chance 1.0
        piece.roll_pickup(&mut rng, 1.0, 1.0, 1.0);
        assert_eq!(piece.visible_pickup(), Some(PickupKind::Heart));
    }

    #[test]
    fn test_pickup_none_when_all_rolls_fail() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut piece = Piece::new(1, 0.0, 3.0, 0.7);
        piece.roll_pickup(&mut rng, 0.0, 0.0, 0.0);
        assert_eq!(piece.pickup, None);
    }

    #[test]
    fn test_pickup_fallthrough_to_coin() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut piece = Piece::new(1, 0.0, 3.0, 0.7);
        piece.roll_pickup(&mut rng, 0.0, 0.0, 1.0);
        assert_eq!(piece.visible_pickup(), Some(PickupKind::Coin));
    }

    proptest! {
        #[test]
        fn prop_landing_iff_within_threshold(
            x in -10.0f32..10.0,
            scale in 0.5f32..4.0,
            ratio in 0.5f32..0.9,
        ) {
            let piece = Piece::new(1, 0.0, scale, ratio);
            let verdict = piece.evaluate_landing(x, 0.0);
            let expected = x.abs() <= piece.half_width * ratio;
            prop_assert_eq!(verdict == Landing::Safe, expected);
        }
    }
}
