//! Per-frame orchestration
//!
//! Single-threaded, frame-driven: one call to [`tick`] advances the whole
//! sim by `dt`. Inbound contact reports are applied in arrival order;
//! delayed work (piece falls, missed-landing confirmation) runs through
//! the timer queue and re-validates its target before acting.

use glam::Vec3;

use super::events::{AudioCue, Contact, GameEvent};
use super::piece::{Landing, PickupKind, PieceRef};
use super::platform::Platform;
use super::player::JumpRequest;
use super::state::{GamePhase, GameState};
use super::timer::TimerKind;
use crate::consts::*;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Tap/click arrived this frame
    pub jump: bool,
    /// Contact reports from the host physics layer, in arrival order
    pub contacts: Vec<Contact>,
    /// Derive contacts and world-limit events from sim geometry instead
    /// of host reports (headless/demo mode)
    pub resolve_contacts: bool,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.phase.is_terminal() {
        // Terminal states only keep the body falling for the host to show
        state.player.motion.tick(dt);
        return;
    }

    state.time += dt;
    if state.boundary_cooldown > 0.0 {
        state.boundary_cooldown -= dt;
    }

    if input.jump {
        handle_jump_request(state);
    }

    state.player.motion.tick(dt);
    state.player.contact.tick(dt);

    let playing = state.phase == GamePhase::Playing;
    let ramp = state.tuning.speed_increase_rate;
    for platform in &mut state.platforms {
        if playing && ramp > 0.0 && !platform.is_base {
            platform.speed += ramp * dt;
        }
        platform.tick(dt);
    }
    despawn_expired(state);

    follow_riding(state);
    spawn_ahead(state);

    for contact in &input.contacts {
        apply_contact(state, *contact);
    }
    if input.resolve_contacts {
        resolve_contacts(state);
        check_world_limits(state);
    }

    for kind in state.timers.advance(dt) {
        handle_timer(state, kind);
    }
}

fn apply_contact(state: &mut GameState, contact: Contact) {
    match contact {
        Contact::Enter(piece) => piece_contact_enter(state, piece),
        Contact::Exit(piece) => piece_contact_exit(state, piece),
        Contact::Boundary => handle_boundary(state),
        Contact::FallPlane => handle_fall_through(state),
    }
}

fn handle_jump_request(state: &mut GameState) {
    let ridden = state.player.contact.riding.map(|r| r.piece);
    match state.player.request_jump() {
        JumpRequest::Ignored => {}
        JumpRequest::Jumped { first } => {
            if first && state.phase == GamePhase::Ready {
                state.phase = GamePhase::Playing;
                state.emit(GameEvent::GameStarted);
                log::info!("first jump: run started");
            }
            state.emit(GameEvent::PlayAudio(AudioCue::Jump));
            // Armed at jump time: fires shortly after the arc would have
            // landed, and no-ops if the player is grounded by then
            let delay = state.player.motion.jump_time + MISS_CHECK_BUFFER;
            state.timers.schedule(delay, TimerKind::MissCheck);
            // The player detached itself; apply the contact-exit contract
            // now rather than waiting for the physics report
            if let Some(piece) = ridden {
                piece_contact_exit(state, piece);
            }
        }
    }
}

/// Landing contact. Evaluates accuracy unless a revive is in progress,
/// then resolves pickups.
fn piece_contact_enter(state: &mut GameState, piece_ref: PieceRef) {
    let Some(world) = state.piece_world_pos(piece_ref) else {
        log::warn!("contact-enter for dead piece {piece_ref:?}");
        return;
    };
    let player_x = state.player.motion.pos.x;

    let (verdict, scoreless, value) = {
        let Some(piece) = state.piece_mut(piece_ref) else {
            return;
        };
        piece.occupied = true;
        piece.landed = true;
        // Re-landing makes the piece whole again
        piece.left = false;
        (
            piece.evaluate_landing(player_x, world.x),
            piece.scoreless,
            piece.score_value,
        )
    };

    state.player.land(piece_ref, player_x - world.x);

    if state.reviving {
        // Revive landing confirmed: platforms resume, evaluation skipped
        state.reviving = false;
        resume_platforms(state);
        state.phase = GamePhase::Playing;
        state.emit(GameEvent::PlayAudio(AudioCue::Landing));
        collect_pickup(state, piece_ref);
        return;
    }

    match verdict {
        Landing::Safe => {
            log::debug!("safe landing on {piece_ref:?}");
            state.checkpoint.set(piece_ref);
            state.emit(GameEvent::CheckpointChanged(piece_ref));
            if !scoreless {
                let total = state.score.add(value);
                state.emit(GameEvent::ScoreChanged(total));
                check_win(state);
            }
            state.emit(GameEvent::PlayAudio(AudioCue::Landing));
            collect_pickup(state, piece_ref);
        }
        Landing::Miss => {
            log::debug!("missed the safe zone on {piece_ref:?}");
            state.emit(GameEvent::PlayAudio(AudioCue::Landing));
            handle_miss(state);
        }
    }
}

/// Contact-exit report. Scroll-induced exits (player still riding) are
/// ignored; a genuine leave arms the piece's delayed fall.
fn piece_contact_exit(state: &mut GameState, piece_ref: PieceRef) {
    if state
        .player
        .contact
        .riding
        .is_some_and(|r| r.piece == piece_ref)
    {
        return;
    }
    state.player.contact.exit(piece_ref);

    let terminal = state.phase.is_terminal();
    let Some(piece) = state.piece_mut(piece_ref) else {
        return;
    };
    piece.occupied = false;
    if terminal || !piece.landed || piece.left {
        return;
    }
    piece.left = true;
    state
        .timers
        .schedule(SETTLE_DELAY, TimerKind::PieceSettle(piece_ref));
    log::debug!("piece {piece_ref:?} left, settle check armed");
}

fn collect_pickup(state: &mut GameState, piece_ref: PieceRef) {
    let Some(kind) = state.piece(piece_ref).and_then(|p| p.visible_pickup()) else {
        return;
    };
    match kind {
        PickupKind::Coin => {
            hide_pickup(state, piece_ref);
            state.coins += 1;
            let total = state.coins;
            state.emit(GameEvent::CoinCollected(total));
            state.emit(GameEvent::PlayAudio(AudioCue::Collect));
        }
        PickupKind::Heart => {
            // At max health the heart stays on the piece
            if state.health.add(1) {
                hide_pickup(state, piece_ref);
                let current = state.health.current();
                state.emit(GameEvent::HealthChanged(current));
                state.emit(GameEvent::PlayAudio(AudioCue::Collect));
            }
        }
        PickupKind::Trap => {
            hide_pickup(state, piece_ref);
            handle_trap(state);
        }
    }
}

fn hide_pickup(state: &mut GameState, piece_ref: PieceRef) {
    if let Some(pickup) = state.piece_mut(piece_ref).and_then(|p| p.pickup.as_mut()) {
        pickup.hide();
    }
}

/// Trap damage: health loss in place, no freeze, no revive
fn handle_trap(state: &mut GameState) {
    let alive = state.health.lose(1);
    let current = state.health.current();
    state.emit(GameEvent::HealthChanged(current));
    log::debug!("trap triggered, health {current}");
    if !alive {
        game_end(state);
    }
}

/// Missed landing or fall-through: freeze everything, spend a life, and
/// route the player back to the checkpoint if any lives remain.
fn handle_miss(state: &mut GameState) {
    if state.phase.is_terminal() || state.phase == GamePhase::FrozenForRevive {
        return;
    }

    freeze_platforms(state);
    let alive = state.health.lose(1);
    let current = state.health.current();
    state.emit(GameEvent::HealthChanged(current));

    if !alive {
        game_end(state);
        return;
    }

    state.phase = GamePhase::FrozenForRevive;
    let target = state
        .checkpoint
        .get()
        .filter(|p| state.piece(*p).is_some());
    match target {
        Some(target) => revive_to(state, target),
        None => {
            // Stale or missing checkpoint: no revive possible
            log::warn!("no valid checkpoint, direct game over");
            game_end(state);
        }
    }
}

/// Boundary exit: like a miss, but the revive target is the center piece
/// of the checkpoint's platform, which also becomes the new checkpoint.
fn handle_boundary(state: &mut GameState) {
    if state.phase.is_terminal() || state.phase == GamePhase::FrozenForRevive {
        return;
    }
    if state.boundary_cooldown > 0.0 {
        log::debug!("boundary hit ignored (cooldown)");
        return;
    }
    state.boundary_cooldown = BOUNDARY_COOLDOWN;

    freeze_platforms(state);
    let alive = state.health.lose(1);
    let current = state.health.current();
    state.emit(GameEvent::HealthChanged(current));

    if !alive {
        game_end(state);
        return;
    }

    state.phase = GamePhase::FrozenForRevive;
    let target = state
        .checkpoint
        .get()
        .and_then(|cp| state.platform(cp.platform))
        .filter(|platform| platform.falling.is_none())
        .and_then(|platform| {
            platform.center_piece().map(|p| PieceRef {
                platform: platform.id,
                piece: p.id,
            })
        });
    match target {
        Some(target) => {
            state.checkpoint.set(target);
            state.emit(GameEvent::CheckpointChanged(target));
            revive_to(state, target);
        }
        None => {
            log::warn!("boundary exit with no revive platform, direct game over");
            game_end(state);
        }
    }
}

fn handle_fall_through(state: &mut GameState) {
    if state.phase == GamePhase::Playing {
        log::debug!("player fell through");
        handle_miss(state);
    }
}

fn revive_to(state: &mut GameState, target: PieceRef) {
    let Some(pos) = state.piece_world_pos(target) else {
        log::warn!("revive target {target:?} is gone, direct game over");
        game_end(state);
        return;
    };
    // The piece the player stood on is vacated by the teleport
    if let Some(riding) = state.player.contact.riding {
        if let Some(piece) = state.piece_mut(riding.piece) {
            piece.occupied = false;
        }
    }
    state.reviving = true;
    state
        .player
        .revive(pos + Vec3::new(0.0, REVIVE_DROP_HEIGHT, 0.0));
    log::info!("reviving onto {target:?}");
}

/// Freeze all live platforms and cancel their pending fall work; left
/// pieces become reusable.
fn freeze_platforms(state: &mut GameState) {
    state
        .timers
        .cancel_where(|k| matches!(k, TimerKind::PieceSettle(_) | TimerKind::PieceFall(_)));
    for platform in &mut state.platforms {
        platform.freeze();
        if platform.falling.is_none() {
            for piece in &mut platform.pieces {
                piece.reset_contact_flags();
            }
        }
    }
    state.emit(GameEvent::PlatformsFrozen);
    log::debug!("platforms frozen");
}

fn resume_platforms(state: &mut GameState) {
    for platform in &mut state.platforms {
        platform.resume();
    }
    state.emit(GameEvent::PlatformsResumed);
    log::debug!("platforms resumed");
}

/// Terminal loss entry point; idempotent
fn game_end(state: &mut GameState) {
    if state.phase.is_terminal() {
        return;
    }
    state.phase = GamePhase::GameOver;
    state.health.deplete();
    state.emit(GameEvent::HealthChanged(0));
    for platform in &mut state.platforms {
        platform.stopped = true;
    }
    state.timers.clear();
    state.player.kill();
    state.emit(GameEvent::GameLost);
    state.emit(GameEvent::PlayAudio(AudioCue::GameOver));
    log::info!("game over at score {}", state.score.get());
}

/// Terminal win entry point; idempotent
fn game_win(state: &mut GameState) {
    if state.phase.is_terminal() {
        return;
    }
    state.phase = GamePhase::Won;
    for platform in &mut state.platforms {
        platform.stopped = true;
    }
    state.timers.clear();
    let stars = state.health.stars();
    state.emit(GameEvent::GameWon { stars });
    state.emit(GameEvent::PlayAudio(AudioCue::GameWin));
    log::info!("level {} won with {stars} stars", state.level);
}

fn check_win(state: &mut GameState) {
    if state.phase.is_terminal() {
        return;
    }
    if state.score.get() >= state.tuning.target_score {
        game_win(state);
    }
}

fn handle_timer(state: &mut GameState, kind: TimerKind) {
    match kind {
        TimerKind::PieceSettle(piece_ref) => {
            let Some(platform) = state.platform(piece_ref.platform) else {
                return;
            };
            if platform.falling.is_some() {
                return;
            }
            if platform.frozen {
                if let Some(piece) = state.piece_mut(piece_ref) {
                    piece.reset_contact_flags();
                }
                return;
            }
            let Some(piece) = state.piece(piece_ref) else {
                return;
            };
            // Only a genuine jump away arms the fall; a scroll
            // repositioning or an immediate re-landing does not
            if !piece.occupied && state.player.motion.jumping {
                state
                    .timers
                    .schedule(PRE_FALL_DELAY, TimerKind::PieceFall(piece_ref));
            } else if let Some(piece) = state.piece_mut(piece_ref) {
                piece.reset_contact_flags();
            }
        }
        TimerKind::PieceFall(piece_ref) => {
            if state.phase != GamePhase::Playing {
                return;
            }
            let Some(platform) = state.platform(piece_ref.platform) else {
                return;
            };
            if platform.frozen || platform.falling.is_some() || platform.is_base {
                return;
            }
            if state.piece(piece_ref).is_none() {
                return;
            }
            // The checkpoint reference must move away before its platform
            // may be removed; hold the fall until it does
            if state.checkpoint.pins_platform(piece_ref.platform) {
                state
                    .timers
                    .schedule(CHECKPOINT_POLL, TimerKind::PieceFall(piece_ref));
                return;
            }
            if let Some(platform) = state.platform_mut(piece_ref.platform) {
                platform.begin_fall();
            }
        }
        TimerKind::MissCheck => {
            if state.phase != GamePhase::Playing {
                return;
            }
            if state.player.dead
                || state.player.motion.jumping
                || state.player.contact.riding.is_some()
            {
                return;
            }
            // Arc finished over nothing: gravity takes over and the fall
            // plane reports the actual miss
            log::debug!("missed landing confirmed");
            state.player.motion.enable_freefall();
        }
    }
}

/// Remove platforms that finished their fall, dropping any references
/// into them first.
fn despawn_expired(state: &mut GameState) {
    let expired: Vec<u32> = state
        .platforms
        .iter()
        .filter(|p| p.expired())
        .map(|p| p.id)
        .collect();
    if expired.is_empty() {
        return;
    }
    for id in expired {
        state.timers.cancel_where(|k| {
            matches!(
                k,
                TimerKind::PieceSettle(p) | TimerKind::PieceFall(p) if p.platform == id
            )
        });
        if state.checkpoint.pins_platform(id) {
            // Should be unreachable: falls are held while pinned
            log::warn!("checkpoint pinned despawning platform {id}");
            state.checkpoint.clear();
        }
        if state
            .player
            .contact
            .riding
            .is_some_and(|r| r.piece.platform == id)
        {
            state.player.contact.riding = None;
            state.player.contact.can_jump = false;
            state.player.motion.enable_freefall();
        }
        log::debug!("platform {id} despawned");
    }
    state.platforms.retain(|p| !p.expired());
}

/// While grounded the player follows the ridden piece (scroll-following
/// without transform parenting).
fn follow_riding(state: &mut GameState) {
    let Some(riding) = state.player.contact.riding else {
        return;
    };
    match state.piece_world_pos(riding.piece) {
        Some(pos) => {
            state.player.motion.pos.x = pos.x + riding.offset_x;
        }
        None => {
            // Surface vanished under the player
            state.player.contact.riding = None;
            state.player.contact.can_jump = false;
            state.player.motion.enable_freefall();
        }
    }
}

/// Extend the platform sequence ahead of the advancing player
fn spawn_ahead(state: &mut GameState) {
    if !state.spawner.should_spawn(state.player.motion.pos.z) {
        return;
    }
    let (z, inverted) = state.spawner.advance();
    let id = state.next_platform_id();
    let scale = Platform::piece_scale(state.score.get());
    let tuning = state.tuning.clone();
    let mut piece_ids = state.next_piece_id;
    let mut platform = Platform::generate(
        id,
        z,
        inverted,
        PIECES_PER_PLATFORM,
        scale,
        &tuning,
        &mut piece_ids,
        &mut state.rng,
    );
    state.next_piece_id = piece_ids;
    // Spawns during a revive freeze join the freeze
    platform.frozen = state.phase == GamePhase::FrozenForRevive;
    state.platforms.push(platform);
}

/// Headless landing resolution: piece under the player when the arc or a
/// freefall descent reaches surface level.
fn resolve_contacts(state: &mut GameState) {
    let motion = &state.player.motion;
    if motion.jumping || state.player.contact.riding.is_some() {
        return;
    }
    if motion.pos.y > 1e-3 {
        return;
    }
    let px = motion.pos.x;
    let pz = motion.pos.z;

    let hit = state
        .platforms
        .iter()
        .filter(|p| p.falling.is_none())
        .find(|p| (p.z - pz).abs() <= PIECE_HALF_DEPTH)
        .and_then(|p| {
            p.pieces
                .iter()
                .find(|piece| (p.world_piece_x(piece) - px).abs() <= piece.half_width)
                .map(|piece| PieceRef {
                    platform: p.id,
                    piece: piece.id,
                })
        });

    if let Some(piece_ref) = hit {
        state.player.motion.pos.y = 0.0;
        piece_contact_enter(state, piece_ref);
    }
}

/// Headless boundary / fall-plane volumes
fn check_world_limits(state: &mut GameState) {
    if state.player.motion.pos.x.abs() > BOUNDARY_X {
        handle_boundary(state);
    }
    if state.player.motion.pos.y < FALL_PLANE_Y {
        handle_fall_through(state);
    }
}
