//! Per-frame simulation tick
//!
//! Applies the frame's intents, then moves the shadow along the recorded
//! history and checks whether it caught the player.

use rand::seq::SliceRandom;

use super::state::{Direction, GamePhase, GameState};
use crate::consts::GAME_OVER_GRACE;

/// Player intents for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Move(Direction),
    /// Toggle the pause menu
    Pause,
    Resume,
    Restart,
    Quit,
}

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Intents in the order they arrived this frame
    pub intents: Vec<Intent>,
    /// Demo mode - the autopilot plays the game
    pub autopilot: bool,
}

/// Advance the game to time `now` (seconds)
pub fn tick(state: &mut GameState, input: &TickInput, now: f64) {
    if !state.running {
        return;
    }

    for &intent in &input.intents {
        apply_intent(state, intent, now);
        if !state.running {
            return;
        }
    }

    // Don't tick if paused or game over
    if state.phase != GamePhase::Playing {
        return;
    }

    if input.autopilot && now - state.last_autopilot_move >= state.settings().autopilot_interval {
        state.last_autopilot_move = now;
        autopilot_step(state, now);
    }

    let section = state.current_section();
    state.store.ensure_exists(section);

    state.score = state.distance_score();
    state.shadow_delay = state.difficulty().delay(state.score);
    state
        .shadow
        .advance(&mut state.history, now, state.shadow_delay);

    // A shadow standing on a player who never moved doesn't count
    if state.moved && state.shadow.catches(state.player, state.settings().cell_size) {
        log::info!("Caught by the shadow at {:?}", state.player);
        state.game_over(now);
    }
}

fn apply_intent(state: &mut GameState, intent: Intent, now: f64) {
    match state.phase {
        GamePhase::Playing => match intent {
            Intent::Move(direction) => {
                state.try_move(direction, now);
            }
            Intent::Pause => state.pause(now),
            Intent::Resume => {}
            Intent::Restart => state.restart(),
            Intent::Quit => state.quit(),
        },
        GamePhase::Paused => match intent {
            Intent::Pause | Intent::Resume => state.resume(now),
            Intent::Restart => state.restart(),
            Intent::Quit => state.quit(),
            Intent::Move(_) => {}
        },
        GamePhase::GameOver => {
            // Give the player a moment before keys count again
            let ready = state
                .ended_at
                .is_none_or(|ended| now - ended >= GAME_OVER_GRACE);
            match intent {
                Intent::Restart if ready => state.restart(),
                // Closing the window never waits
                Intent::Quit => state.quit(),
                _ => {}
            }
        }
    }
}

/// Demo move: climb when possible, otherwise sidestep (random side first),
/// otherwise go down. Stepping straight back is the last resort.
fn autopilot_step(state: &mut GameState, now: f64) {
    let mut sideways = [Direction::Left, Direction::Right];
    sideways.shuffle(&mut state.rng);
    let order = [Direction::Up, sideways[0], sideways[1], Direction::Down];

    let cell_size = state.settings().cell_size;
    let back = state.previous;
    let mut fallback = None;
    for direction in order {
        let target = state.player + direction.offset() * cell_size;
        if Some(target) == back {
            fallback = Some(direction);
            continue;
        }
        if state.try_move(direction, now) {
            return;
        }
    }
    if let Some(direction) = fallback {
        state.try_move(direction, now);
    }
}

/// Convenience for frontends: a tick carrying a single intent
pub fn intent(intent: Intent) -> TickInput {
    TickInput {
        intents: vec![intent],
        autopilot: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::consts::FPS;
    use crate::sim::history::MoveRecord;
    use crate::sim::state::GameEvent;

    fn new_state(seed: u64) -> GameState {
        GameState::new(&Settings::default(), seed)
    }

    /// Make one legal move from the start, returning its direction
    fn first_move(state: &mut GameState, now: f64) -> Direction {
        for direction in [Direction::Up, Direction::Right] {
            tick(state, &intent(Intent::Move(direction)), now);
            if state.moved {
                return direction;
            }
        }
        panic!("start cell has no open neighbour");
    }

    #[test]
    fn test_no_game_over_without_moving() {
        let mut state = new_state(12345);
        state.shadow.position = Some(state.player);
        for frame in 0..300 {
            tick(&mut state, &TickInput::default(), frame as f64 / 60.0);
        }
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_shadow_catches_idle_player() {
        let mut state = new_state(7);
        let start = state.player;
        first_move(&mut state, 0.0);
        assert_ne!(state.player, start);

        tick(&mut state, &TickInput::default(), 1.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.shadow_position(), None);

        // The replayed move lands on the cell the player is still standing on
        tick(&mut state, &TickInput::default(), 1.5);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.shadow_position(), Some(state.player));
        let events = state.drain_events();
        assert_eq!(events[0], GameEvent::FirstMove);
        assert!(matches!(
            events[1],
            GameEvent::GameOver { shadow_delay, .. } if shadow_delay == 1.5
        ));
    }

    #[test]
    fn test_pause_shifts_pending_moves() {
        let mut state = new_state(3);
        first_move(&mut state, 0.0);

        tick(&mut state, &intent(Intent::Pause), 0.5);
        assert_eq!(state.phase, GamePhase::Paused);

        // Moves and time are frozen while paused
        tick(&mut state, &intent(Intent::Move(Direction::Down)), 5.0);
        assert_eq!(state.history.len(), 1);

        tick(&mut state, &intent(Intent::Resume), 10.5);
        assert_eq!(state.phase, GamePhase::Playing);
        let pending: Vec<MoveRecord> = state.history.iter().copied().collect();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].timestamp, 10.0);

        // One second of unpaused play: shadow still waiting
        tick(&mut state, &TickInput::default(), 11.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.shadow_position(), None);
    }

    #[test]
    fn test_pause_toggles() {
        let mut state = new_state(3);
        tick(&mut state, &intent(Intent::Pause), 0.0);
        assert_eq!(state.phase, GamePhase::Paused);
        tick(&mut state, &intent(Intent::Pause), 1.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::Paused, GameEvent::Resumed]
        );
    }

    #[test]
    fn test_game_over_grace() {
        let mut state = new_state(7);
        first_move(&mut state, 0.0);
        tick(&mut state, &TickInput::default(), 1.5);
        assert_eq!(state.phase, GamePhase::GameOver);

        tick(&mut state, &intent(Intent::Restart), 1.75);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.game, 1);

        tick(&mut state, &intent(Intent::Restart), 2.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.game, 2);
        assert!(!state.moved);
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_quit_skips_game_over_grace() {
        let mut state = new_state(7);
        first_move(&mut state, 0.0);
        tick(&mut state, &TickInput::default(), 1.5);
        assert_eq!(state.phase, GamePhase::GameOver);

        tick(&mut state, &intent(Intent::Quit), 1.55);
        assert!(!state.running);
        assert_eq!(state.drain_events().last(), Some(&GameEvent::Quit));
    }

    #[test]
    fn test_autopilot_interval_ignores_pause() {
        let mut state = new_state(21);
        let autopilot = TickInput {
            intents: Vec::new(),
            autopilot: true,
        };
        tick(&mut state, &autopilot, 0.0);
        assert_eq!(state.history.len(), 1);

        tick(&mut state, &intent(Intent::Pause), 0.05);
        let resume = TickInput {
            intents: vec![Intent::Resume],
            autopilot: true,
        };
        tick(&mut state, &resume, 100.0);
        assert_eq!(state.phase, GamePhase::Playing);

        // Only 0.05 s and then 0.06 s of active play since the last move
        assert_eq!(state.history.len(), 1);
        tick(&mut state, &autopilot, 100.01);
        assert_eq!(state.history.len(), 1);

        // 0.25 s of active play: the next move is due
        tick(&mut state, &autopilot, 100.2);
        assert_eq!(state.history.len(), 2);
    }

    #[test]
    fn test_quit_stops_ticking() {
        let mut state = new_state(1);
        tick(
            &mut state,
            &TickInput {
                intents: vec![Intent::Quit, Intent::Move(Direction::Up)],
                autopilot: false,
            },
            0.0,
        );
        assert!(!state.running);
        assert!(!state.moved);
        assert_eq!(state.drain_events(), vec![GameEvent::Quit]);
    }

    #[test]
    fn test_autopilot_moves() {
        let mut state = new_state(21);
        let input = TickInput {
            intents: Vec::new(),
            autopilot: true,
        };
        for frame in 0..30 {
            tick(&mut state, &input, frame as f64 / FPS as f64);
        }
        assert!(state.moved);
        // One move per interval at most: frames 0, 12 and 24
        assert!(state.history.len() <= 3);
    }

    #[test]
    fn test_determinism() {
        // Two states with the same seed play out identically
        let mut state1 = new_state(99999);
        let mut state2 = new_state(99999);
        let input = TickInput {
            intents: Vec::new(),
            autopilot: true,
        };

        for frame in 0..1200 {
            let now = frame as f64 / FPS as f64;
            tick(&mut state1, &input, now);
            tick(&mut state2, &input, now);
        }

        assert_eq!(state1.player, state2.player);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.phase, state2.phase);
        assert_eq!(state1.shadow_position(), state2.shadow_position());
        assert_eq!(state1.store.bounds(), state2.store.bounds());
    }

    #[test]
    fn test_window_follows_player() {
        let mut state = new_state(5);
        for frame in 0..6000 {
            let now = frame as f64 / FPS as f64;
            tick(
                &mut state,
                &TickInput {
                    intents: Vec::new(),
                    autopilot: true,
                },
                now,
            );
            if state.phase == GamePhase::GameOver {
                break;
            }
            let section = state.current_section();
            for index in state.visible_sections() {
                assert!(state.store.section(index).is_some(), "section {index} missing");
            }
            assert!(state.store.len() <= 5);
            assert_eq!(state.score, state.distance_score());
            assert!(state.store.section(section).is_some());
        }
    }
}
