/// Entry point and frame loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use sim::cursor::Action;
use sim::event::PuzzleEvent;
use sim::log::EventLog;
use sim::session::Session;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();

    let mut session = Session::new(&config);

    // Open the event log before raw mode so a failure can still be printed.
    let mut log = match &config.general.event_log {
        Some(path) => match EventLog::open(path) {
            Ok(log) => log,
            Err(e) => {
                eprintln!("Warning: could not open event log {}: {e}", path.display());
                EventLog::disabled()
            }
        },
        None => EventLog::disabled(),
    };
    if log.is_enabled() {
        if let Err(e) = log.session(session.seed) {
            eprintln!("Warning: event log write failed: {e}");
        }
    }

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &mut log, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    if let Err(e) = log.flush() {
        eprintln!("Warning: event log flush failed: {e}");
    }

    println!();
    println!("Thanks for playing Circuit Match!");
    println!("Rounds played: {}", session.engine.round());
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    log: &mut EventLog,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        session.set_message("Gamepad connected", 40);
    }
    let mut last_tick = Instant::now();

    // Events from the first deal.
    let opening = session.engine.drain_events();
    dispatch(session, sound, log, opening, Instant::now())?;

    loop {
        kb.drain_events();
        gp.update();

        let prompting = session.shell.is_prompting();
        if kb.ctrl_c_pressed() || gp.quit_pressed() || (!prompting && kb.any_pressed(KEYS_QUIT)) {
            break;
        }

        let now = Instant::now();
        if prompting {
            handle_prompt(session, sound, log, &kb, &gp, now)?;
        } else {
            handle_play(session, renderer, sound, log, &kb, &gp, now)?;
        }

        session.poll_prompt(Instant::now());

        if last_tick.elapsed() >= config.general.tick_rate {
            session.tick();
            last_tick = Instant::now();
        }

        renderer.render(session)?;
        log.flush()?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Board input: keys, gamepad and mouse picks drive the engine.
fn handle_play(
    session: &mut Session,
    renderer: &Renderer,
    sound: Option<&SoundEngine>,
    log: &mut EventLog,
    kb: &InputState,
    gp: &GamepadState,
    now: Instant,
) -> Result<(), Box<dyn std::error::Error>> {
    if kb.any_pressed(KEYS_NEW_ROUND) || gp.new_round_pressed() {
        let events = session.new_round(now);
        play_sounds(sound, &events);
        log.record(session.engine.round(), &events)?;
        return Ok(());
    }

    for code in kb.presses() {
        if let Some(action) = key_action(code) {
            session.engine.apply(action);
        }
    }
    for action in gp.actions() {
        session.engine.apply(action);
    }
    for &(x, y) in kb.clicks() {
        if let Some((column, index)) = renderer.hit_test(x, y) {
            session.engine.pick(column, index);
        }
    }

    let events = session.engine.drain_events();
    dispatch(session, sound, log, events, now)
}

/// Win prompt is open: only yes/no count. Esc answers no.
fn handle_prompt(
    session: &mut Session,
    sound: Option<&SoundEngine>,
    log: &mut EventLog,
    kb: &InputState,
    gp: &GamepadState,
    now: Instant,
) -> Result<(), Box<dyn std::error::Error>> {
    let yes = kb.any_pressed(KEYS_YES) || gp.confirm_pressed() || gp.new_round_pressed();
    let no = kb.any_pressed(KEYS_NO);
    if !yes && !no {
        return Ok(());
    }
    let events = session.answer_prompt(yes, now);
    play_sounds(sound, &events);
    log.record(session.engine.round(), &events)?;
    Ok(())
}

/// Fan drained engine events out to the session, sound and log.
fn dispatch(
    session: &mut Session,
    sound: Option<&SoundEngine>,
    log: &mut EventLog,
    events: Vec<PuzzleEvent>,
    now: Instant,
) -> Result<(), Box<dyn std::error::Error>> {
    if events.is_empty() {
        return Ok(());
    }
    session.absorb(&events, now);
    play_sounds(sound, &events);
    log.record(session.engine.round(), &events)?;
    Ok(())
}

fn play_sounds(sound: Option<&SoundEngine>, events: &[PuzzleEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            PuzzleEvent::SelectionChanged { left: Some(_) } => sfx.play_select(),
            PuzzleEvent::ConnectionDrawn { .. } => sfx.play_connect(),
            PuzzleEvent::ConnectionsCleared => sfx.play_reset(),
            PuzzleEvent::RoundWon { .. } => sfx.play_won(),
            _ => {}
        }
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_VALIDATE: &[KeyCode] = &[KeyCode::Char('v'), KeyCode::Char('V')];
const KEYS_RESET: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_NEW_ROUND: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Char('N'), KeyCode::F(5)];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_YES: &[KeyCode] = &[KeyCode::Char('y'), KeyCode::Char('Y'), KeyCode::Enter];
const KEYS_NO: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Char('N'), KeyCode::Esc];

/// Map one key press to an engine action.
fn key_action(code: KeyCode) -> Option<Action> {
    let is = |keys: &[KeyCode]| keys.contains(&code);
    if is(KEYS_UP) {
        Some(Action::MoveUp)
    } else if is(KEYS_DOWN) {
        Some(Action::MoveDown)
    } else if is(KEYS_LEFT) {
        Some(Action::MoveLeft)
    } else if is(KEYS_RIGHT) {
        Some(Action::MoveRight)
    } else if is(KEYS_CONFIRM) {
        Some(Action::Confirm)
    } else if is(KEYS_VALIDATE) {
        Some(Action::Validate)
    } else if is(KEYS_RESET) {
        Some(Action::Reset)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_wasd_move() {
        assert_eq!(key_action(KeyCode::Up), Some(Action::MoveUp));
        assert_eq!(key_action(KeyCode::Char('s')), Some(Action::MoveDown));
        assert_eq!(key_action(KeyCode::Char('A')), Some(Action::MoveLeft));
        assert_eq!(key_action(KeyCode::Right), Some(Action::MoveRight));
    }

    #[test]
    fn trigger_keys_map_to_actions() {
        assert_eq!(key_action(KeyCode::Enter), Some(Action::Confirm));
        assert_eq!(key_action(KeyCode::Char('V')), Some(Action::Validate));
        assert_eq!(key_action(KeyCode::Char('r')), Some(Action::Reset));
        assert_eq!(key_action(KeyCode::Char('x')), None);
        // new round and quit are handled outside the engine
        assert_eq!(key_action(KeyCode::Char('n')), None);
        assert_eq!(key_action(KeyCode::Esc), None);
    }
}
