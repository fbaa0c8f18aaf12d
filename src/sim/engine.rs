/// PuzzleEngine: the complete state of a running puzzle.
///
/// ## Ownership
///
/// One engine owns the board, the wiring, the cursor and the pending
/// selection. Nothing else mutates them; the frame loop feeds actions in
/// and drains `PuzzleEvent`s out.
///
/// ## Totality
///
/// Every public operation is defined for every input. When a precondition
/// fails (no selection, slot already wired, index off the board) the call
/// is a no-op: no state changes and no events are queued.
///
/// ## Round lifecycle
///
///   - `new` / `new_round` deal a board and bump `round`.
///   - `reset` clears wiring + selection, keeps board and cursor.
///   - The board itself is never mutated between deals.

use crate::config::BoardConfig;
use crate::domain::board::{generate_board, Board};
use crate::domain::rng::GameRng;
use crate::domain::score::{self, Validation};
use super::connections::{ConnectOutcome, Connections, ConnectionsSnapshot};
use super::cursor::{Action, Column, Cursor};
use super::event::PuzzleEvent;

pub struct PuzzleEngine {
    board: Board,
    connections: Connections,
    cursor: Cursor,
    selection: Option<usize>,
    validation: Validation,

    /// Deal counter; starts at 1 for the first board.
    round: u64,

    rng: GameRng,
    board_cfg: BoardConfig,
    events: Vec<PuzzleEvent>,
}

// ── Construction ──

impl PuzzleEngine {
    /// Deal the first board from `rng`.
    pub fn new(board_cfg: BoardConfig, mut rng: GameRng) -> Self {
        let board = generate_board(&mut rng, &board_cfg);
        PuzzleEngine::start(board, board_cfg, rng)
    }

    /// Start on a fixed board. Later rounds are dealt from `rng`.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn with_board(board: Board, board_cfg: BoardConfig, rng: GameRng) -> Self {
        PuzzleEngine::start(board, board_cfg, rng)
    }

    fn start(board: Board, board_cfg: BoardConfig, rng: GameRng) -> Self {
        let n = board.len();
        let mut engine = PuzzleEngine {
            validation: Validation { value: 0, is_win: false },
            board,
            connections: Connections::new(n),
            cursor: Cursor::new(),
            selection: None,
            round: 1,
            rng,
            board_cfg,
            events: Vec::new(),
        };
        engine.events.push(PuzzleEvent::BoardReady {
            target: engine.board.target(),
            nodes: n,
        });
        engine.validate();
        engine
    }
}

// ── Queries ──

impl PuzzleEngine {
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn connections(&self) -> &Connections {
        &self.connections
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    /// Result of the most recent validation pass.
    pub fn validation(&self) -> Validation {
        self.validation
    }

    /// Current sum over the wiring.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn score(&self) -> u32 {
        score::score(&self.board, self.connections.pairs())
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    /// Take every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<PuzzleEvent> {
        std::mem::take(&mut self.events)
    }
}

// ── Operations ──

impl PuzzleEngine {
    /// Apply one discrete input action.
    pub fn apply(&mut self, action: Action) {
        let rows = self.board.len();
        match action {
            Action::MoveUp => {
                self.cursor.up(rows);
                self.cursor_moved();
            }
            Action::MoveDown => {
                self.cursor.down(rows);
                self.cursor_moved();
            }
            Action::MoveLeft => self.set_column(Column::Left),
            Action::MoveRight => self.set_column(Column::Right),
            Action::Confirm => match self.cursor.column {
                Column::Left => self.select(self.cursor.row),
                Column::Right => {
                    self.connect_selected(self.cursor.row);
                }
            },
            Action::Validate => {
                self.validate();
            }
            Action::Reset => self.reset(),
        }
    }

    /// Pointer pick: focus the node, then confirm on it.
    pub fn pick(&mut self, column: Column, index: usize) {
        if index >= self.board.len() {
            return;
        }
        if self.cursor.column != column || self.cursor.row != index {
            self.cursor = Cursor { column, row: index };
            self.cursor_moved();
        }
        self.apply(Action::Confirm);
    }

    /// Mark `left` as the node awaiting a wire.
    ///
    /// Selecting a node that is already wired is allowed; wiring it again
    /// replaces the old wire.
    pub fn select(&mut self, left: usize) {
        if left >= self.board.len() || self.selection == Some(left) {
            return;
        }
        self.selection = Some(left);
        self.events.push(PuzzleEvent::SelectionChanged { left: Some(left) });
    }

    /// Wire the selected node `left` to slot `right`.
    ///
    /// No-op unless `left` is the pending selection and `right` is free.
    /// On success the selection is consumed and the board is re-validated.
    pub fn connect(&mut self, left: usize, right: usize) -> ConnectionsSnapshot {
        if self.selection != Some(left) {
            return self.connections.snapshot();
        }
        match self.connections.connect(left, right) {
            ConnectOutcome::Rejected => {}
            ConnectOutcome::Connected { replaced } => {
                if let Some(old) = replaced {
                    self.events.push(PuzzleEvent::ConnectionCleared { left, right: old });
                }
                self.events.push(PuzzleEvent::ConnectionDrawn {
                    left,
                    right,
                    color: self.board.color(left),
                });
                self.selection = None;
                self.events.push(PuzzleEvent::SelectionChanged { left: None });
                self.validate();
            }
        }
        self.connections.snapshot()
    }

    /// `connect(selection, right)`; no-op without a selection.
    pub fn connect_selected(&mut self, right: usize) -> ConnectionsSnapshot {
        match self.selection {
            Some(left) => self.connect(left, right),
            None => self.connections.snapshot(),
        }
    }

    /// Re-score the current wiring. Queues `RoundWon` on a full, exact match.
    pub fn validate(&mut self) -> Validation {
        let v = score::validate(&self.board, self.connections.pairs());
        self.validation = v;
        self.events.push(PuzzleEvent::ScoreChanged(v));
        if v.is_win {
            self.events.push(PuzzleEvent::RoundWon { score: v.value });
        }
        v
    }

    /// Drop all wires and the pending selection. Board and cursor stay.
    pub fn reset(&mut self) {
        self.connections.clear();
        self.events.push(PuzzleEvent::ConnectionsCleared);
        if self.selection.take().is_some() {
            self.events.push(PuzzleEvent::SelectionChanged { left: None });
        }
        self.validation = score::validate(&self.board, self.connections.pairs());
        self.events.push(PuzzleEvent::ScoreChanged(self.validation));
    }

    /// Discard everything and deal a fresh board.
    pub fn new_round(&mut self) {
        self.board = generate_board(&mut self.rng, &self.board_cfg);
        self.connections = Connections::new(self.board.len());
        self.selection = None;
        self.cursor = Cursor::new();
        self.round += 1;
        self.events.push(PuzzleEvent::ConnectionsCleared);
        self.events.push(PuzzleEvent::BoardReady {
            target: self.board.target(),
            nodes: self.board.len(),
        });
        self.validation = score::validate(&self.board, self.connections.pairs());
        self.events.push(PuzzleEvent::ScoreChanged(self.validation));
    }

    // ── Internal ──

    fn set_column(&mut self, column: Column) {
        if self.cursor.column != column {
            self.cursor.column = column;
            self.cursor_moved();
        }
    }

    fn cursor_moved(&mut self) {
        self.events.push(PuzzleEvent::CursorMoved {
            column: self.cursor.column,
            row: self.cursor.row,
        });
    }
}
