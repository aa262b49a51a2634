//! Critter Hop headless demo
//!
//! Runs one level with a simple auto-player and internal contact
//! resolution, logging the event stream a real host would feed to UI and
//! audio. Usage: `critter-hop [seed] [level]`.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use critter_hop::consts::*;
use critter_hop::sim::{tick, AudioCue, GameEvent, GameState, TickInput};
use critter_hop::{LevelTable, Progress};

const LEVELS_PATH: &str = "levels.json";
const PROGRESS_PATH: &str = "progress.json";
/// Give up on runs the auto-player cannot finish
const MAX_SIM_SECONDS: f32 = 300.0;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });

    let table = LevelTable::load(Path::new(LEVELS_PATH));
    let mut progress = Progress::load(Path::new(PROGRESS_PATH), table.total());

    let level = args
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|&l| progress.is_unlocked(l))
        .unwrap_or(progress.current_level);
    let tuning = table.get(level);

    log::info!("critter-hop demo: seed {seed}, level {level} ({})", tuning.name);
    let mut state = GameState::new(seed, level, tuning);
    // Demo world scale: one hop spans the platform spacing
    state.player.motion.jump_distance = PLATFORM_GAP;

    // Fixed-timestep loop over simulated 60 Hz frames
    let frame_dt = 1.0 / 60.0;
    let mut accumulator = 0.0f32;
    let mut input = TickInput {
        resolve_contacts: true,
        ..Default::default()
    };

    while !state.phase.is_terminal() && state.time < MAX_SIM_SECONDS {
        input.jump = should_jump(&state);

        accumulator += frame_dt;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut state, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
            // One-shot inputs apply to a single substep
            input.jump = false;
        }

        for event in state.drain_events() {
            report(&state, event, &mut progress);
        }
    }

    if !state.phase.is_terminal() {
        log::warn!("run did not finish within {MAX_SIM_SECONDS} s, aborting");
    }

    progress.record_score(state.score.get());
    progress.add_coins(state.coins);
    progress.save(Path::new(PROGRESS_PATH));

    println!(
        "seed {seed} level {level}: {:?} with score {}, {} coins, best {}",
        state.phase,
        state.score.get(),
        state.coins,
        progress.best_score
    );
}

/// Auto-player: jump when grounded and the arc would come down near the
/// safe center of some piece (the player's x is unchanged in flight).
fn should_jump(state: &GameState) -> bool {
    if !state.player.contact.can_jump || state.phase.is_terminal() {
        return false;
    }
    let px = state.player.motion.pos.x;
    let landing_z = state.player.motion.pos.z + state.player.motion.jump_distance;

    state
        .platforms
        .iter()
        .filter(|p| p.falling.is_none() && (p.z - landing_z).abs() <= PIECE_HALF_DEPTH)
        .flat_map(|p| p.pieces.iter().map(move |piece| (p, piece)))
        .any(|(p, piece)| (p.world_piece_x(piece) - px).abs() <= piece.safe_threshold() * 0.8)
}

/// Log the event stream the way a host would hand it to UI / audio, and
/// fold terminal results into persistent progress.
fn report(state: &GameState, event: GameEvent, progress: &mut Progress) {
    match event {
        GameEvent::GameStarted => log::info!("run started"),
        GameEvent::ScoreChanged(total) => log::info!("score: {total}"),
        GameEvent::HealthChanged(current) => log::info!("health: {current}"),
        GameEvent::CoinCollected(total) => log::info!("coins: {total}"),
        GameEvent::CheckpointChanged(piece) => log::debug!("checkpoint: {piece:?}"),
        GameEvent::PlatformsFrozen => log::info!("platforms frozen for revive"),
        GameEvent::PlatformsResumed => log::info!("platforms resumed"),
        GameEvent::GameWon { stars } => {
            log::info!("level {} cleared: {stars} stars", state.level);
            progress.complete_level(state.level, stars, state.tuning.coin_reward);
        }
        GameEvent::GameLost => log::info!("game over"),
        GameEvent::PlayAudio(cue) => log::debug!("audio: {}", cue_name(cue)),
    }
}

fn cue_name(cue: AudioCue) -> &'static str {
    match cue {
        AudioCue::Jump => "jump",
        AudioCue::Landing => "landing",
        AudioCue::Collect => "collect",
        AudioCue::GameOver => "game-over",
        AudioCue::GameWin => "game-win",
    }
}
