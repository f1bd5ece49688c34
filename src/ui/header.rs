use crate::ui::theme::{
    ACCENT, GLOBAL_BORDER, HEADER_SEPARATOR, HEADER_TEXT, STATUS_OK, STATUS_STOPPED,
};
use crate::ui::viewer::ViewerState;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

pub struct Header<'a> {
    state: &'a ViewerState,
}

impl<'a> Header<'a> {
    pub fn new(state: &'a ViewerState) -> Self {
        Self { state }
    }

    pub fn widget(&self) -> Paragraph<'static> {
        let text_style = Style::default().fg(HEADER_TEXT);
        let separator_style = Style::default().fg(HEADER_SEPARATOR);
        let (status, status_style) = if self.state.source_stopped {
            ("● stopped", Style::default().fg(STATUS_STOPPED))
        } else {
            ("● live", Style::default().fg(STATUS_OK))
        };
        let cursor = self
            .state
            .screen
            .as_ref()
            .map(|screen| format!("cursor {},{}", screen.cursor_y, screen.cursor_x))
            .unwrap_or_else(|| "cursor -".to_string());

        let line = Line::from(vec![
            Span::styled("  ", text_style),
            Span::styled(status, status_style),
            Span::styled("  ", text_style),
            Span::styled(self.state.title.clone(), Style::default().fg(ACCENT)),
            Span::styled("  │  ", separator_style),
            Span::styled(format!("updates {}", self.state.updates), text_style),
            Span::styled("  │  ", separator_style),
            Span::styled(cursor, text_style),
        ]);

        Paragraph::new(line).block(
            Block::default()
                .borders(Borders::TOP | Borders::BOTTOM)
                .border_style(Style::default().fg(GLOBAL_BORDER)),
        )
    }
}
