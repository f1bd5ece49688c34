use super::{CursorState, TerminalBuffer};
use alacritty_terminal::event::{Event, EventListener};
use alacritty_terminal::grid::Dimensions;
use alacritty_terminal::index::{Column, Line};
use alacritty_terminal::term::cell::Flags;
use alacritty_terminal::term::{Config, TermMode};
use alacritty_terminal::vte::ansi::Timeout;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Collects terminal replies (`PtyWrite`) so the feeder can write them back.
///
/// Programs like fzf and nvim query the cursor position on startup and stall
/// until they get an answer.
#[derive(Clone, Default)]
struct ReplyListener {
    pending: Arc<Mutex<Vec<u8>>>,
}

impl EventListener for ReplyListener {
    fn send_event(&self, event: Event) {
        if let Event::PtyWrite(text) = event {
            self.pending.lock().extend_from_slice(text.as_bytes());
        }
    }
}

/// No-op timeout that disables synchronized output buffering.
///
/// The sync protocol (CSI ?2026h/l) is designed for direct terminal I/O to
/// prevent flickering during redraws.  Screen assertions read the in-memory
/// grid directly, so sync mode would only hide content that has already
/// arrived.
#[derive(Default)]
struct NoSyncTimeout;

impl Timeout for NoSyncTimeout {
    fn set_timeout(&mut self, _duration: Duration) {}
    fn clear_timeout(&mut self) {}
    fn pending_timeout(&self) -> bool {
        false
    }
}

/// Terminal dimensions for alacritty's `Dimensions` trait.
struct TermSize {
    lines: usize,
    cols: usize,
}

impl Dimensions for TermSize {
    fn total_lines(&self) -> usize {
        self.lines
    }

    fn screen_lines(&self) -> usize {
        self.lines
    }

    fn columns(&self) -> usize {
        self.cols
    }
}

pub(super) struct AlacrittyEmulator {
    term: alacritty_terminal::Term<ReplyListener>,
    processor: alacritty_terminal::vte::ansi::Processor<NoSyncTimeout>,
    replies: Arc<Mutex<Vec<u8>>>,
}

impl AlacrittyEmulator {
    pub(super) fn new(rows: u16, cols: u16) -> Self {
        let config = Config {
            scrolling_history: 0,
            ..Config::default()
        };

        let size = TermSize {
            lines: rows.max(1) as usize,
            cols: cols.max(1) as usize,
        };

        let listener = ReplyListener::default();
        let replies = Arc::clone(&listener.pending);
        let term = alacritty_terminal::Term::new(config, &size, listener);
        let processor = alacritty_terminal::vte::ansi::Processor::default();

        Self {
            term,
            processor,
            replies,
        }
    }

    fn row_text(&self, row: usize) -> String {
        let grid = self.term.grid();
        let line = &grid[Line(row as i32)];
        let mut text = String::with_capacity(grid.columns());
        for col in 0..grid.columns() {
            let cell = &line[Column(col)];
            if cell
                .flags
                .intersects(Flags::WIDE_CHAR_SPACER | Flags::LEADING_WIDE_CHAR_SPACER)
            {
                continue;
            }
            text.push(if cell.c == '\0' { ' ' } else { cell.c });
            if let Some(zerowidth) = cell.zerowidth() {
                text.extend(zerowidth.iter());
            }
        }
        let trimmed = text.trim_end().len();
        text.truncate(trimmed);
        text
    }
}

impl TerminalBuffer for AlacrittyEmulator {
    fn feed(&mut self, bytes: &[u8]) {
        self.processor.advance(&mut self.term, bytes);
    }

    fn set_size(&mut self, rows: u16, cols: u16) {
        let size = TermSize {
            lines: rows.max(1) as usize,
            cols: cols.max(1) as usize,
        };
        self.term.resize(size);
    }

    fn size(&self) -> (u16, u16) {
        let grid = self.term.grid();
        (grid.screen_lines() as u16, grid.columns() as u16)
    }

    fn lines(&self) -> Vec<String> {
        (0..self.term.grid().screen_lines())
            .map(|row| self.row_text(row))
            .collect()
    }

    fn cursor(&self) -> CursorState {
        let point = self.term.grid().cursor.point;
        let visible = self.term.mode().contains(TermMode::SHOW_CURSOR);

        CursorState {
            row: point.line.0.max(0) as u16,
            col: point.column.0 as u16,
            visible,
        }
    }

    fn take_replies(&mut self) -> Vec<u8> {
        std::mem::take(&mut *self.replies.lock())
    }
}
