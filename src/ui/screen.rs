use crate::pty::BufferSnapshot;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthChar;

/// Draws a snapshot's rows into the body, clipped to the area, with the
/// cursor cell in reverse video.
pub struct ScreenBody<'a> {
    snapshot: &'a BufferSnapshot,
}

impl<'a> ScreenBody<'a> {
    pub fn new(snapshot: &'a BufferSnapshot) -> Self {
        Self { snapshot }
    }
}

impl Widget for ScreenBody<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        for (row, line) in self.snapshot.lines.iter().take(area.height as usize).enumerate() {
            let y = area.y + row as u16;
            let mut col: u16 = 0;
            for ch in line.chars() {
                let width = ch.width().unwrap_or(0) as u16;
                if width == 0 {
                    continue;
                }
                if col + width > area.width {
                    break;
                }
                if let Some(cell) = buf.cell_mut((area.x + col, y)) {
                    cell.set_char(ch);
                }
                col += width;
            }
        }

        let cursor_x = self.snapshot.cursor_x;
        let cursor_y = self.snapshot.cursor_y;
        if cursor_x < area.width && cursor_y < area.height {
            if let Some(cell) = buf.cell_mut((area.x + cursor_x, area.y + cursor_y)) {
                cell.set_style(Style::default().add_modifier(Modifier::REVERSED));
            }
        }
    }
}
