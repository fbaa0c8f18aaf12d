/// Session: everything the frame loop and renderer share.
///
/// Wraps the engine with the host-side state the engine does not own:
/// the round shell (win prompt timing), the message bar, animation ticks.

use std::time::Instant;

use crate::config::GameConfig;
use crate::domain::rng::GameRng;
use super::engine::PuzzleEngine;
use super::event::PuzzleEvent;
use super::round::{PromptAnswer, RoundShell};

pub struct Session {
    pub engine: PuzzleEngine,
    pub shell: RoundShell,
    pub seed: u64,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
    pub anim_tick: u32,
}

impl Session {
    pub fn new(config: &GameConfig) -> Self {
        let rng = if config.general.seed == 0 {
            GameRng::from_clock()
        } else {
            GameRng::new(config.general.seed)
        };
        let seed = rng.seed();
        Session::with_engine(PuzzleEngine::new(config.board.clone(), rng), config, seed)
    }

    pub fn with_engine(engine: PuzzleEngine, config: &GameConfig, seed: u64) -> Self {
        Session {
            engine,
            shell: RoundShell::new(config.general.win_prompt_delay),
            seed,
            message: String::new(),
            message_timer: 0,
            anim_tick: 0,
        }
    }

    /// Show `msg` for `ticks` ticks (0 = until replaced).
    pub fn set_message(&mut self, msg: &str, ticks: u32) {
        self.message = msg.to_string();
        self.message_timer = ticks;
    }

    /// One UI tick: blink counter and message expiry.
    pub fn tick(&mut self) {
        self.anim_tick = self.anim_tick.wrapping_add(1);
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 { self.message.clear(); }
        }
    }

    /// Route drained engine events to the round shell and the message bar.
    pub fn absorb(&mut self, events: &[PuzzleEvent], now: Instant) {
        let round = self.engine.round();
        for event in events {
            self.shell.observe(event, round, now);
            match event {
                PuzzleEvent::RoundWon { score } => {
                    self.set_message(&format!("Circuit complete: {} hits the target!", score), 0);
                }
                PuzzleEvent::ConnectionsCleared => self.set_message("Wires cleared", 30),
                PuzzleEvent::BoardReady { .. } if round > 1 => {
                    self.set_message(&format!("Round {}: new board dealt", round), 40);
                }
                _ => {}
            }
        }
    }

    /// Advance the win-prompt timer.
    pub fn poll_prompt(&mut self, now: Instant) {
        if self.shell.poll(self.engine.round(), now) {
            self.set_message("New round?  [Y]es  [N]o", 0);
        }
    }

    /// Answer the open prompt. Yes deals a new board; no keeps playing.
    pub fn answer_prompt(&mut self, yes: bool, now: Instant) -> Vec<PuzzleEvent> {
        match self.shell.answer(yes) {
            Some(PromptAnswer::NewRound) => self.new_round(now),
            Some(PromptAnswer::KeepBoard) => {
                self.message.clear();
                self.message_timer = 0;
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Deal a new board and route the resulting events. Returns them for
    /// the sound and log layers.
    pub fn new_round(&mut self, now: Instant) -> Vec<PuzzleEvent> {
        self.engine.new_round();
        let events = self.engine.drain_events();
        self.absorb(&events, now);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::domain::board::Board;
    use crate::sim::round::RoundPhase;
    use std::time::Duration;

    fn session() -> Session {
        let board = Board::from_parts(vec![4, 7, 12], vec![10, 1, 2], vec![2, 0, 1]).unwrap();
        let engine = PuzzleEngine::with_board(board, BoardConfig::default(), GameRng::new(11));
        let mut s = Session::with_engine(engine, &GameConfig::default(), 11);
        let events = s.engine.drain_events();
        s.absorb(&events, Instant::now());
        s
    }

    fn solve(s: &mut Session, now: Instant) {
        for (l, r) in [(0, 2), (1, 0), (2, 1)] {
            s.engine.select(l);
            s.engine.connect(l, r);
        }
        let events = s.engine.drain_events();
        s.absorb(&events, now);
    }

    #[test]
    fn win_opens_prompt_after_delay() {
        let mut s = session();
        let t0 = Instant::now();
        solve(&mut s, t0);
        assert!(matches!(s.shell.phase(), RoundPhase::Celebrating { .. }));
        s.poll_prompt(t0 + Duration::from_millis(300));
        assert!(s.shell.is_prompting());
        assert!(s.message.contains("New round?"));
    }

    #[test]
    fn reset_during_celebration_cancels_prompt() {
        let mut s = session();
        let t0 = Instant::now();
        solve(&mut s, t0);
        s.engine.reset();
        let events = s.engine.drain_events();
        s.absorb(&events, t0);
        s.poll_prompt(t0 + Duration::from_secs(1));
        assert!(!s.shell.is_prompting());
    }

    #[test]
    fn yes_deals_new_board() {
        let mut s = session();
        let t0 = Instant::now();
        solve(&mut s, t0);
        s.poll_prompt(t0 + Duration::from_secs(1));
        let events = s.answer_prompt(true, t0);
        assert_eq!(s.engine.round(), 2);
        assert!(s.engine.connections().is_empty());
        assert!(events.iter().any(|e| matches!(e, PuzzleEvent::BoardReady { .. })));
        assert_eq!(s.shell.phase(), RoundPhase::Playing);
    }

    #[test]
    fn no_keeps_board_and_wiring() {
        let mut s = session();
        let t0 = Instant::now();
        solve(&mut s, t0);
        s.poll_prompt(t0 + Duration::from_secs(1));
        assert!(s.answer_prompt(false, t0).is_empty());
        assert_eq!(s.engine.round(), 1);
        assert_eq!(s.engine.connections().len(), 3);
        assert!(s.message.is_empty());
    }

    #[test]
    fn message_expires_after_ticks() {
        let mut s = session();
        s.set_message("hello", 2);
        s.tick();
        assert_eq!(s.message, "hello");
        s.tick();
        assert!(s.message.is_empty());
    }
}
