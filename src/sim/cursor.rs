/// Keyboard-style focus over the two node columns.
///
/// Rows wrap within a column; columns are set directly (no wrap).

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Column {
    Left,
    Right,
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::Left => "left",
            Column::Right => "right",
        }
    }
}

/// Discrete input actions understood by the engine.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    /// Left column: select the focused node. Right column: wire to it.
    Confirm,
    /// Re-run the validator without touching connections.
    Validate,
    /// Drop every connection and the pending selection.
    Reset,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cursor {
    pub column: Column,
    pub row: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Cursor { column: Column::Left, row: 0 }
    }

    /// Move up one row, wrapping from the top to the bottom of `rows`.
    pub fn up(&mut self, rows: usize) {
        if rows == 0 { return; }
        self.row = (self.row + rows - 1) % rows;
    }

    /// Move down one row, wrapping from the bottom to the top of `rows`.
    pub fn down(&mut self, rows: usize) {
        if rows == 0 { return; }
        self.row = (self.row + 1) % rows;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor::new()
    }
}
