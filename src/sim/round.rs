/// Round flow: what the host does after the engine reports a win.
///
/// The engine only queues `RoundWon`. This shell waits a short delay so the
/// final wire and the green score are visible, then opens a "new round?"
/// prompt. The pending prompt belongs to the round it was scheduled in: a
/// reset or a new deal before the delay runs out cancels it.

use std::time::{Duration, Instant};

use super::event::PuzzleEvent;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RoundPhase {
    Playing,
    /// Won; prompt opens at `prompt_at` unless cancelled.
    Celebrating { round: u64, prompt_at: Instant },
    /// Waiting for a yes/no answer.
    Prompt { round: u64 },
}

/// Host decision after the prompt is answered.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PromptAnswer {
    NewRound,
    KeepBoard,
}

pub struct RoundShell {
    phase: RoundPhase,
    delay: Duration,
}

impl RoundShell {
    pub fn new(delay: Duration) -> Self {
        RoundShell { phase: RoundPhase::Playing, delay }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_prompting(&self) -> bool {
        matches!(self.phase, RoundPhase::Prompt { .. })
    }

    /// Feed one engine event. `round` is the engine's current deal counter.
    pub fn observe(&mut self, event: &PuzzleEvent, round: u64, now: Instant) {
        match event {
            PuzzleEvent::RoundWon { .. } => {
                if self.phase == RoundPhase::Playing {
                    self.phase = RoundPhase::Celebrating { round, prompt_at: now + self.delay };
                }
            }
            PuzzleEvent::ConnectionsCleared | PuzzleEvent::BoardReady { .. } => {
                self.phase = RoundPhase::Playing;
            }
            _ => {}
        }
    }

    /// Advance the timer. Returns true on the frame the prompt opens.
    pub fn poll(&mut self, round: u64, now: Instant) -> bool {
        match self.phase {
            RoundPhase::Celebrating { round: r, .. } if r != round => {
                self.phase = RoundPhase::Playing;
                false
            }
            RoundPhase::Celebrating { round: r, prompt_at } if now >= prompt_at => {
                self.phase = RoundPhase::Prompt { round: r };
                true
            }
            _ => false,
        }
    }

    /// Close the prompt. Ignored when no prompt is open.
    pub fn answer(&mut self, yes: bool) -> Option<PromptAnswer> {
        if !self.is_prompting() {
            return None;
        }
        self.phase = RoundPhase::Playing;
        Some(if yes { PromptAnswer::NewRound } else { PromptAnswer::KeepBoard })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    fn won() -> PuzzleEvent {
        PuzzleEvent::RoundWon { score: 90 }
    }

    #[test]
    fn prompt_opens_after_delay() {
        let t0 = Instant::now();
        let mut shell = RoundShell::new(DELAY);
        shell.observe(&won(), 1, t0);
        assert!(!shell.poll(1, t0 + Duration::from_millis(100)));
        assert!(!shell.is_prompting());
        assert!(shell.poll(1, t0 + DELAY));
        assert!(shell.is_prompting());
        // only reported once
        assert!(!shell.poll(1, t0 + DELAY * 2));
    }

    #[test]
    fn reset_before_delay_cancels_prompt() {
        let t0 = Instant::now();
        let mut shell = RoundShell::new(DELAY);
        shell.observe(&won(), 1, t0);
        shell.observe(&PuzzleEvent::ConnectionsCleared, 1, t0);
        assert!(!shell.poll(1, t0 + DELAY));
        assert_eq!(shell.phase(), RoundPhase::Playing);
    }

    #[test]
    fn new_deal_before_delay_cancels_prompt() {
        let t0 = Instant::now();
        let mut shell = RoundShell::new(DELAY);
        shell.observe(&won(), 1, t0);
        assert!(!shell.poll(2, t0 + DELAY));
        assert_eq!(shell.phase(), RoundPhase::Playing);
    }

    #[test]
    fn repeated_win_does_not_restart_timer() {
        let t0 = Instant::now();
        let mut shell = RoundShell::new(DELAY);
        shell.observe(&won(), 1, t0);
        shell.observe(&won(), 1, t0 + Duration::from_millis(200));
        assert!(shell.poll(1, t0 + DELAY));
    }

    #[test]
    fn answers_map_to_host_decisions() {
        let t0 = Instant::now();
        let mut shell = RoundShell::new(Duration::ZERO);
        assert_eq!(shell.answer(true), None);
        shell.observe(&won(), 1, t0);
        shell.poll(1, t0);
        assert_eq!(shell.answer(false), Some(PromptAnswer::KeepBoard));
        assert_eq!(shell.phase(), RoundPhase::Playing);
        shell.observe(&won(), 1, t0);
        shell.poll(1, t0);
        assert_eq!(shell.answer(true), Some(PromptAnswer::NewRound));
    }
}
