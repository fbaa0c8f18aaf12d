/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Board layout (one terminal row per node, one blank row between):
///
/// ```text
///      [ 12 ]──┐          [ ×10 ]
///              │
///   ▶  [  4 ]──┼──┐       [ ×1  ]
///              └──┼──────▶[ ×2  ]
///      [  7 ]     │
/// ```
///
/// Each left node owns a vertical lane, so wires never share a column.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::board::{Board, NodeColor};
use crate::domain::score::pad3;
use crate::sim::cursor::Column;
use crate::sim::round::RoundPhase;
use crate::sim::session::Session;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// Using the same RGB for `Clear(ClearType::All)` and every cell keeps
    /// VTE terminals from showing seams between rows.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg: Self::norm_bg(bg) }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::from_char(ch, fg, bg));
        }
    }

    /// Paint a whole row's background.
    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::from_char(' ', Color::White, bg));
        }
    }
}

// ── Layout: where each node sits on screen ──

/// Horizontal span of a node label on one terminal row.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
}

impl Rect {
    pub fn contains(&self, x: usize, y: usize) -> bool {
        y == self.y && x >= self.x && x < self.x + self.w
    }
}

/// Screen positions for one board at one terminal size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub left: Vec<Rect>,
    pub right: Vec<Rect>,
    /// Vertical lane column for each left node's wire.
    pub lanes: Vec<usize>,
    /// Last row used by the board.
    pub bottom: usize,
}

const HUD_ROW: usize = 0;
const BOARD_ROW: usize = 3;
const NODE_PITCH: usize = 2;
const MARKER_W: usize = 3;
const LANE_PAD: usize = 3;
const LANE_PITCH: usize = 3;

fn digits(n: u32) -> usize {
    n.to_string().len()
}

impl Layout {
    pub fn compute(board: &Board, term_w: usize) -> Layout {
        let n = board.len();
        let left_w = board.left_values().iter().map(|&v| digits(v)).max().unwrap_or(1) + 4;
        let right_w = board.multiplier_slots().iter().map(|&m| digits(m)).max().unwrap_or(1) + 5;
        let wire_w = LANE_PAD * 2 + LANE_PITCH * n.saturating_sub(1) + 1;
        let total = MARKER_W + left_w + wire_w + right_w;

        let left_x = term_w.saturating_sub(total) / 2 + MARKER_W;
        let right_x = left_x + left_w + wire_w;
        let row = |i: usize| BOARD_ROW + i * NODE_PITCH;

        Layout {
            left: (0..n).map(|i| Rect { x: left_x, y: row(i), w: left_w }).collect(),
            right: (0..n).map(|i| Rect { x: right_x, y: row(i), w: right_w }).collect(),
            lanes: (0..n).map(|i| left_x + left_w + LANE_PAD + i * LANE_PITCH).collect(),
            bottom: row(n.saturating_sub(1)),
        }
    }

    /// Which node, if any, a click at terminal cell (x, y) landed on.
    pub fn hit_test(&self, x: usize, y: usize) -> Option<(Column, usize)> {
        if let Some(i) = self.left.iter().position(|r| r.contains(x, y)) {
            return Some((Column::Left, i));
        }
        self.right.iter().position(|r| r.contains(x, y)).map(|i| (Column::Right, i))
    }

    /// Cells of the wire `left → right`, as (x, y, glyph).
    ///
    /// Runs right from the left node to its lane, along the lane to the
    /// slot's row, then right into the slot. The last cell is an arrowhead.
    pub fn wire_path(&self, left: usize, right: usize) -> Vec<(usize, usize, char)> {
        let (from, to) = match (self.left.get(left), self.right.get(right)) {
            (Some(f), Some(t)) => (f, t),
            _ => return Vec::new(),
        };
        let lane = self.lanes[left];
        let (y1, y2) = (from.y, to.y);
        let mut cells = Vec::new();

        for x in from.x + from.w..lane {
            cells.push((x, y1, '─'));
        }
        if y1 == y2 {
            cells.push((lane, y1, '─'));
        } else {
            let down = y2 > y1;
            cells.push((lane, y1, if down { '┐' } else { '┘' }));
            let (lo, hi) = if down { (y1 + 1, y2) } else { (y2 + 1, y1) };
            for y in lo..hi {
                cells.push((lane, y, '│'));
            }
            cells.push((lane, y2, if down { '└' } else { '┌' }));
        }
        for x in lane + 1..to.x {
            cells.push((x, y2, '─'));
        }
        if let Some(last) = cells.last_mut() {
            if last.1 == y2 && last.0 + 1 == to.x {
                last.2 = '▶';
            }
        }
        cells
    }
}

/// Merge a wire glyph onto whatever is already drawn: a lane crossing a
/// horizontal run becomes a junction.
fn merge_glyph(existing: char, incoming: char) -> char {
    match (existing, incoming) {
        ('─', '│') | ('│', '─') => '┼',
        _ => incoming,
    }
}

fn to_color(c: NodeColor) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const FOCUS_BG: Color = Color::Rgb { r: 70, g: 70, b: 120 };
const WIN_FG: Color = Color::Rgb { r: 0x00, g: 0xff, b: 0x8a };
const MISS_FG: Color = Color::Rgb { r: 0xff, g: 0x4d, b: 0x4d };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_round: Option<u64>,
    layout: Option<Layout>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_round: None,
            layout: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Node under terminal cell (x, y) in the last rendered frame.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<(Column, usize)> {
        self.layout.as_ref()?.hit_test(x as usize, y as usize)
    }

    pub fn render(&mut self, session: &Session) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // New deal → clean repaint
        let round = session.engine.round();
        if self.last_round != Some(round) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_round = Some(round);
        }

        self.compose(session);
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal default.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    /// Fill the front buffer for this frame and record the layout for mouse
    /// picks. A board that does not fit records no layout.
    fn compose(&mut self, session: &Session) {
        let layout = Layout::compute(session.engine.board(), self.term_w);

        self.front.clear();
        if layout.bottom + 6 > self.term_h || layout.right.iter().any(|r| r.x + r.w > self.term_w) {
            self.front.put_str(0, 0, "Terminal too small. Enlarge the window.", Color::Yellow, Color::Reset);
            self.layout = None;
            return;
        }

        self.compose_hud(session);
        self.compose_wires(session, &layout);
        self.compose_nodes(session, &layout);
        self.compose_message(session, layout.bottom + 2);
        self.compose_help(layout.bottom + 4);
        if session.shell.is_prompting() {
            self.compose_prompt(layout.bottom);
        }
        self.layout = Some(layout);
    }

    fn compose_hud(&mut self, s: &Session) {
        let engine = &s.engine;
        let v = engine.validation();
        self.front.fill_row(HUD_ROW, HUD_BG);

        let head = format!(" CIRCUIT MATCH  Round {}   Target ", engine.round());
        self.front.put_str(0, HUD_ROW, &head, Color::White, HUD_BG);
        let mut x = head.chars().count();
        let target = pad3(engine.board().target());
        self.front.put_str(x, HUD_ROW, &target, Color::Cyan, HUD_BG);
        x += target.len();
        self.front.put_str(x, HUD_ROW, "   Score ", Color::White, HUD_BG);
        x += 9;
        let score_fg = if v.is_win { WIN_FG } else { MISS_FG };
        let score = pad3(v.value);
        self.front.put_str(x, HUD_ROW, &score, score_fg, HUD_BG);
        x += score.len();
        let wired = format!("   Wired {}/{}", engine.connections().len(), engine.board().len());
        self.front.put_str(x, HUD_ROW, &wired, Color::Grey, HUD_BG);
    }

    fn compose_wires(&mut self, s: &Session, layout: &Layout) {
        let engine = &s.engine;
        // Wires flash while the win celebration runs.
        let flash = matches!(s.shell.phase(), RoundPhase::Celebrating { .. }) && (s.anim_tick / 2) % 2 == 0;
        for (left, right) in engine.connections().pairs() {
            let fg = if flash { WIN_FG } else { to_color(engine.board().color(left)) };
            for (x, y, glyph) in layout.wire_path(left, right) {
                let existing = self.front.get(x, y).ch;
                self.front.set(x, y, Cell::from_char(merge_glyph(existing, glyph), fg, Color::Reset));
            }
        }
    }

    fn compose_nodes(&mut self, s: &Session, layout: &Layout) {
        let engine = &s.engine;
        let board = engine.board();
        let cur = engine.cursor();
        let blink = (s.anim_tick / 6) % 2 == 0;

        for (i, rect) in layout.left.iter().enumerate() {
            let fg = to_color(board.color(i));
            let focused = cur.column == Column::Left && cur.row == i;
            let bg = if focused { FOCUS_BG } else { Color::Reset };
            let label = format!("[ {:>w$} ]", board.left_values()[i], w = rect.w - 4);
            self.front.put_str(rect.x, rect.y, &label, fg, bg);

            if engine.selection() == Some(i) && blink {
                self.front.put_str(rect.x - MARKER_W, rect.y, "▶", fg, Color::Reset);
            }
        }

        for (i, rect) in layout.right.iter().enumerate() {
            // A wired slot takes the color of the node feeding it.
            let fg = match engine.connections().left_of(i) {
                Some(l) => to_color(board.color(l)),
                None => Color::Grey,
            };
            let focused = cur.column == Column::Right && cur.row == i;
            let bg = if focused { FOCUS_BG } else { Color::Reset };
            let mult = format!("×{}", board.multiplier_slots()[i]);
            let label = format!("[ {:<w$} ]", mult, w = rect.w - 4);
            self.front.put_str(rect.x, rect.y, &label, fg, bg);
        }
    }

    fn compose_message(&mut self, s: &Session, row: usize) {
        if row >= self.front.height || s.message.is_empty() { return; }
        let msg = format!(" ◈ {} ", s.message);
        self.front.fill_row(row, MSG_BG);
        self.front.put_str(0, row, &msg, Color::Black, MSG_BG);
    }

    fn compose_help(&mut self, row: usize) {
        if row >= self.front.height { return; }
        let help = " ←↑↓→:Move  Enter:Select/Wire  V:Validate  R:Reset  N:New round  Q:Quit  │  Mouse: click nodes";
        self.front.put_str(0, row, help, Color::DarkGrey, Color::Reset);
    }

    fn compose_prompt(&mut self, board_bottom: usize) {
        let lines = [
            "╔════════════════════════════╗",
            "║   Solved!  New round?      ║",
            "║     [Y] Yes     [N] No     ║",
            "╚════════════════════════════╝",
        ];
        let w = lines[0].chars().count();
        let x = self.front.width.saturating_sub(w) / 2;
        let y = (BOARD_ROW + board_bottom) / 2;
        let top = y.saturating_sub(1);
        for (i, line) in lines.iter().enumerate() {
            self.front.put_str(x, top + i, line, WIN_FG, HUD_BG);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Board {
        Board::from_parts(vec![4, 7, 12], vec![10, 1, 2], vec![2, 0, 1]).unwrap()
    }

    #[test]
    fn layout_is_centered_and_stacked() {
        let l = Layout::compute(&scenario(), 80);
        assert_eq!(l.left.len(), 3);
        assert_eq!(l.left[0].y, BOARD_ROW);
        assert_eq!(l.left[2].y, BOARD_ROW + 4);
        assert_eq!(l.bottom, BOARD_ROW + 4);
        // widths: "[ 12 ]" and "[ ×10 ]"
        assert_eq!(l.left[0].w, 6);
        assert_eq!(l.right[0].w, 7);
        assert!(l.left[0].x >= MARKER_W);
        assert!(l.right[0].x + l.right[0].w <= 80);
        // lanes sit strictly between the columns, one per left node
        for &lane in &l.lanes {
            assert!(lane >= l.left[0].x + l.left[0].w && lane < l.right[0].x);
        }
    }

    #[test]
    fn hit_test_finds_nodes() {
        let l = Layout::compute(&scenario(), 80);
        let r = l.left[1];
        assert_eq!(l.hit_test(r.x, r.y), Some((Column::Left, 1)));
        assert_eq!(l.hit_test(r.x + r.w - 1, r.y), Some((Column::Left, 1)));
        assert_eq!(l.hit_test(r.x + r.w, r.y), None);
        let r = l.right[2];
        assert_eq!(l.hit_test(r.x + 2, r.y), Some((Column::Right, 2)));
        assert_eq!(l.hit_test(0, 0), None);
        // the blank row between nodes is not a node
        assert_eq!(l.hit_test(r.x, r.y - 1), None);
    }

    #[test]
    fn straight_wire_ends_in_arrow() {
        let l = Layout::compute(&scenario(), 80);
        let path = l.wire_path(1, 1);
        let y = l.left[1].y;
        assert!(path.iter().all(|&(_, py, _)| py == y));
        assert_eq!(path.first().unwrap().0, l.left[1].x + l.left[1].w);
        let last = *path.last().unwrap();
        assert_eq!((last.0, last.2), (l.right[1].x - 1, '▶'));
    }

    #[test]
    fn bent_wire_turns_at_its_lane() {
        let l = Layout::compute(&scenario(), 80);
        let lane = l.lanes[0];
        let down = l.wire_path(0, 2);
        assert!(down.contains(&(lane, l.left[0].y, '┐')));
        assert!(down.contains(&(lane, l.left[0].y + 1, '│')));
        assert!(down.contains(&(lane, l.right[2].y, '└')));
        let lane = l.lanes[2];
        let up = l.wire_path(2, 0);
        assert!(up.contains(&(lane, l.left[2].y, '┘')));
        assert!(up.contains(&(lane, l.right[0].y, '┌')));
    }

    #[test]
    fn wire_off_board_is_empty() {
        let l = Layout::compute(&scenario(), 80);
        assert!(l.wire_path(3, 0).is_empty());
        assert!(l.wire_path(0, 5).is_empty());
    }

    fn session() -> Session {
        use crate::config::{BoardConfig, GameConfig};
        use crate::domain::rng::GameRng;
        use crate::sim::engine::PuzzleEngine;
        let engine = PuzzleEngine::with_board(scenario(), BoardConfig::default(), GameRng::new(1));
        Session::with_engine(engine, &GameConfig::default(), 1)
    }

    fn sized(w: usize, h: usize) -> Renderer {
        let mut r = Renderer::new();
        r.term_w = w;
        r.term_h = h;
        r.front.resize(w, h);
        r.back.resize(w, h);
        r
    }

    #[test]
    fn clicks_hit_nodes_once_drawn() {
        let s = session();
        let mut r = sized(100, 30);
        r.compose(&s);
        let node = Layout::compute(s.engine.board(), 100).left[0];
        assert_eq!(r.hit_test(node.x as u16, node.y as u16), Some((Column::Left, 0)));
    }

    #[test]
    fn too_small_terminal_drops_hit_boxes() {
        let s = session();
        let mut r = sized(100, 30);
        r.compose(&s);
        let node = Layout::compute(s.engine.board(), 100).left[0];

        r.term_h = 5;
        r.compose(&s);
        assert_eq!(r.hit_test(node.x as u16, node.y as u16), None);
        assert_eq!(r.front.get(0, 0).ch, 'T');
    }

    #[test]
    fn hud_counts_wired_nodes() {
        let mut s = session();
        s.engine.select(0);
        s.engine.connect(0, 2);
        let mut r = sized(100, 30);
        r.compose(&s);
        let hud: String = (0..100).map(|x| r.front.get(x, HUD_ROW).ch).collect();
        assert!(hud.contains("Wired 1/3"), "{hud}");
    }

    #[test]
    fn crossing_becomes_junction() {
        assert_eq!(merge_glyph('─', '│'), '┼');
        assert_eq!(merge_glyph(' ', '│'), '│');
        assert_eq!(merge_glyph('─', '─'), '─');
    }
}
