/// Events emitted by the puzzle engine.
/// The presentation layer consumes these for wires, sound and the event log.

use crate::domain::board::NodeColor;
use crate::domain::score::Validation;
use super::cursor::Column;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PuzzleEvent {
    /// A fresh board was dealt.
    BoardReady { target: u32, nodes: usize },
    CursorMoved { column: Column, row: usize },
    /// `None` when the pending selection was consumed or dropped.
    SelectionChanged { left: Option<usize> },
    /// Draw a wire. Any earlier wire for `left` has already been cleared.
    ConnectionDrawn { left: usize, right: usize, color: NodeColor },
    /// Remove the wire `left → right` (remove-and-replace on re-wire).
    ConnectionCleared { left: usize, right: usize },
    /// Every wire was removed by a reset.
    ConnectionsCleared,
    ScoreChanged(Validation),
    /// Every node is wired and the sum hits the target.
    RoundWon { score: u32 },
}

impl PuzzleEvent {
    /// One `key=value` line for the event log.
    pub fn to_log_line(&self) -> String {
        match self {
            PuzzleEvent::BoardReady { target, nodes } => {
                format!("event=board_ready target={} nodes={}", target, nodes)
            }
            PuzzleEvent::CursorMoved { column, row } => {
                format!("event=cursor_moved column={} row={}", column.name(), row)
            }
            PuzzleEvent::SelectionChanged { left: Some(l) } => {
                format!("event=selection_changed left={}", l)
            }
            PuzzleEvent::SelectionChanged { left: None } => {
                "event=selection_changed left=none".to_string()
            }
            PuzzleEvent::ConnectionDrawn { left, right, color } => {
                format!("event=connection_drawn left={} right={} color={}", left, right, color.hex())
            }
            PuzzleEvent::ConnectionCleared { left, right } => {
                format!("event=connection_cleared left={} right={}", left, right)
            }
            PuzzleEvent::ConnectionsCleared => "event=connections_cleared".to_string(),
            PuzzleEvent::ScoreChanged(v) => {
                format!("event=score_changed value={} win={}", v.value, v.is_win)
            }
            PuzzleEvent::RoundWon { score } => format!("event=round_won score={}", score),
        }
    }
}
