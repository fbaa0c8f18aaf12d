/// Terminal input collector.
///
/// Drains every pending crossterm event once per frame and keeps:
///   - key presses (Press and Repeat; Release is ignored)
///   - left mouse clicks, as terminal cell coordinates
///
/// Puzzle input is purely edge-triggered: holding an arrow key moves the
/// cursor once per auto-repeat, never continuously.

use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

pub struct InputState {
    /// Keys pressed during the most recent drain_events() call.
    presses: Vec<KeyEvent>,

    /// Left-button clicks `(col, row)` during the most recent drain.
    clicks: Vec<(u16, u16)>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            presses: Vec::with_capacity(8),
            clicks: Vec::with_capacity(2),
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        self.clicks.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.push_key(key),
                Ok(Event::Mouse(m)) => {
                    if let MouseEventKind::Down(MouseButton::Left) = m.kind {
                        self.clicks.push((m.column, m.row));
                    }
                }
                _ => {}
            }
        }
    }

    fn push_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Release {
            self.presses.push(key);
        }
    }

    /// Was this key pressed this frame?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.presses.iter().any(|k| k.code == code && !k.modifiers.contains(KeyModifiers::CONTROL))
    }

    /// Convenience: was any of these keys pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Presses in arrival order, for mapping several keys in one frame.
    pub fn presses(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.presses
            .iter()
            .filter(|k| !k.modifiers.contains(KeyModifiers::CONTROL))
            .map(|k| k.code)
    }

    pub fn clicks(&self) -> &[(u16, u16)] {
        &self.clicks
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.presses.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
