/// Optional event log: one `key=value` line per engine event.
///
/// Enabled by `[general] event_log = "path"`. Lines are appended, so a
/// single file can hold several sessions; each session opens with a
/// `session seed=...` line.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::event::PuzzleEvent;

pub struct EventLog<W: Write = BufWriter<File>> {
    out: Option<W>,
}

impl EventLog {
    /// Log that drops everything.
    pub fn disabled() -> Self {
        EventLog { out: None }
    }

    /// Open `path` for appending.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(EventLog { out: Some(BufWriter::new(file)) })
    }
}

impl<W: Write> EventLog<W> {
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn to_writer(out: W) -> Self {
        EventLog { out: Some(out) }
    }

    pub fn is_enabled(&self) -> bool {
        self.out.is_some()
    }

    pub fn session(&mut self, seed: u64) -> io::Result<()> {
        match &mut self.out {
            Some(w) => writeln!(w, "session seed={}", seed),
            None => Ok(()),
        }
    }

    pub fn record(&mut self, round: u64, events: &[PuzzleEvent]) -> io::Result<()> {
        let w = match &mut self.out {
            Some(w) => w,
            None => return Ok(()),
        };
        for event in events {
            writeln!(w, "round={} {}", round, event.to_log_line())?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match &mut self.out {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> Option<W> {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_one_line_per_event() {
        let mut log = EventLog::to_writer(Vec::new());
        log.session(7).unwrap();
        log.record(1, &[
            PuzzleEvent::BoardReady { target: 90, nodes: 3 },
            PuzzleEvent::ConnectionsCleared,
        ]).unwrap();
        let text = String::from_utf8(log.into_inner().unwrap()).unwrap();
        assert_eq!(
            text,
            "session seed=7\nround=1 event=board_ready target=90 nodes=3\nround=1 event=connections_cleared\n"
        );
    }

    #[test]
    fn disabled_log_accepts_everything() {
        let mut log = EventLog::disabled();
        assert!(!log.is_enabled());
        log.session(1).unwrap();
        log.record(1, &[PuzzleEvent::ConnectionsCleared]).unwrap();
        log.flush().unwrap();
    }
}
