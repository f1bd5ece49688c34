use super::emulator::TerminalBuffer;

/// Immutable point-in-time copy of the visible screen.
///
/// Lines are in row order, top to bottom, with trailing blanks trimmed.
/// Equality is by value and is what the broadcaster uses to decide whether
/// anything changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferSnapshot {
    pub lines: Vec<String>,
    pub cursor_x: u16,
    pub cursor_y: u16,
}

impl BufferSnapshot {
    pub fn new(lines: Vec<String>, cursor_x: u16, cursor_y: u16) -> Self {
        Self {
            lines,
            cursor_x,
            cursor_y,
        }
    }

    /// Copy the current state out of a buffer. Callers hold the buffer lock.
    pub fn capture(buffer: &dyn TerminalBuffer) -> Self {
        let cursor = buffer.cursor();
        Self {
            lines: buffer.lines(),
            cursor_x: cursor.col,
            cursor_y: cursor.row,
        }
    }

    /// Lines joined with `\n`, the form searched by screen assertions.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.text().contains(needle)
    }

    /// Same rows, ignoring where the cursor sits.
    pub fn same_lines(&self, other: &Self) -> bool {
        self.lines == other.lines
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(rows: &[&str]) -> Vec<String> {
        rows.iter().map(|row| row.to_string()).collect()
    }

    #[test]
    fn contains_matches_across_rows() {
        let snapshot = BufferSnapshot::new(lines(&["hello", "world"]), 0, 1);
        assert!(snapshot.contains("hello\nworld"));
        assert!(snapshot.contains("orl"));
        assert!(!snapshot.contains("nope"));
    }

    #[test]
    fn cursor_participates_in_equality() {
        let a = BufferSnapshot::new(lines(&["$"]), 1, 0);
        let b = BufferSnapshot::new(lines(&["$"]), 2, 0);
        assert_ne!(a, b);
        assert!(a.same_lines(&b));
    }

    #[test]
    fn blank_screen_detected() {
        assert!(BufferSnapshot::new(lines(&["", "   "]), 0, 0).is_blank());
        assert!(!BufferSnapshot::new(lines(&["", "~"]), 0, 0).is_blank());
    }
}
