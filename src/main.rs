//! Shadow Paradox entry point
//!
//! Headless runner: plays demo runs with the autopilot on a simulated clock
//! and logs how each one ended.
//!
//! Usage: `shadow-paradox [settings.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
use shadow_paradox::Settings;
#[cfg(not(target_arch = "wasm32"))]
use shadow_paradox::consts::{FPS, GAME_OVER_GRACE};
#[cfg(not(target_arch = "wasm32"))]
use shadow_paradox::sim::{GameEvent, GamePhase, GameState, Intent, TickInput, tick};

/// Demo runs before the runner quits
#[cfg(not(target_arch = "wasm32"))]
const DEMO_GAMES: u32 = 3;
/// Simulated time limit per run (seconds)
#[cfg(not(target_arch = "wasm32"))]
const MAX_RUN_SECONDS: u32 = 600;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Shadow Paradox (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(&path).unwrap_or_else(|err| {
            log::warn!("Ignoring settings file: {err}");
            Settings::default()
        }),
        None => Settings::default(),
    };
    let seed = args
        .next()
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or_else(clock_seed);

    let mut state = GameState::new(&settings, seed);
    if let Some(section) = state.store.section(state.current_section()) {
        log::debug!("Starting section:\n{}", section.grid);
    }

    run_demo(&mut state);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The core is embedded by a frontend on the web, there is no runner
}

#[cfg(not(target_arch = "wasm32"))]
fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0)
}

/// Tick at a fixed frame rate until the demo games are used up
#[cfg(not(target_arch = "wasm32"))]
fn run_demo(state: &mut GameState) {
    let dt = 1.0 / FPS as f64;
    let frames_per_run = (MAX_RUN_SECONDS * FPS) as u64;

    let mut frame: u64 = 0;
    let mut run_started: u64 = 0;

    while state.running {
        let now = frame as f64 * dt;
        let mut input = TickInput {
            intents: Vec::new(),
            autopilot: true,
        };

        if state.phase == GamePhase::GameOver {
            let ended = state.ended_at.unwrap_or(now);
            if now - ended >= GAME_OVER_GRACE {
                input.intents.push(if state.game >= DEMO_GAMES {
                    Intent::Quit
                } else {
                    Intent::Restart
                });
            }
        } else if frame - run_started >= frames_per_run {
            log::info!("Run #{} hit the time limit", state.game);
            input.intents.push(if state.game >= DEMO_GAMES {
                Intent::Quit
            } else {
                Intent::Restart
            });
        }

        tick(state, &input, now);

        for event in state.drain_events() {
            match event {
                GameEvent::FirstMove => log::debug!("Run #{} under way", state.game),
                GameEvent::GameOver {
                    score,
                    shadow_delay,
                } => {
                    log::info!("Game over! Score: {score}");
                    log::info!("Shadow Delay: {shadow_delay:.2}s");
                }
                GameEvent::Restarted { game } => {
                    run_started = frame;
                    log::info!("Game #{game}");
                }
                GameEvent::Quit => log::info!("Quitting after {} games", state.game),
                GameEvent::Paused | GameEvent::Resumed => {}
            }
        }
        frame += 1;
    }
}
