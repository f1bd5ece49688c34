use crate::ui::footer::Footer;
use crate::ui::header::Header;
use crate::ui::layout::layout_regions;
use crate::ui::screen::ScreenBody;
use crate::ui::theme::PLACEHOLDER;
use crate::ui::viewer::ViewerState;
use ratatui::layout::Alignment;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Clear, Paragraph};
use ratatui::Frame;

pub const WAITING_MESSAGE: &str = "Waiting for terminal output...";

pub fn draw(frame: &mut Frame<'_>, state: &ViewerState) {
    let area = frame.area();
    let (header, body, footer) = layout_regions(area);

    frame.render_widget(Header::new(state).widget(), header);
    frame.render_widget(Clear, body);
    match state.screen.as_deref() {
        Some(screen) if state.has_output() => {
            frame.render_widget(ScreenBody::new(screen), body);
        }
        _ => {
            let waiting = Paragraph::new(WAITING_MESSAGE)
                .alignment(Alignment::Center)
                .style(
                    Style::default()
                        .fg(PLACEHOLDER)
                        .add_modifier(Modifier::ITALIC),
                );
            frame.render_widget(waiting, body);
        }
    }
    frame.render_widget(Footer::widget(footer), footer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pty::BufferSnapshot;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;
    use std::sync::Arc;

    fn render(state: &ViewerState) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal.draw(|frame| draw(frame, state)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn row_text(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol().to_string())
            .collect()
    }

    fn all_text(buffer: &Buffer) -> String {
        (0..buffer.area.height)
            .map(|y| row_text(buffer, y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn empty_state_shows_waiting_message() {
        let text = all_text(&render(&ViewerState::new("bash")));
        assert!(text.contains(WAITING_MESSAGE));
        assert!(text.contains("bash"));
        assert!(text.contains("q/Esc: Quit"));
    }

    #[test]
    fn snapshot_lines_land_in_body() {
        let state = ViewerState {
            title: "demo".to_string(),
            screen: Some(Arc::new(BufferSnapshot::new(
                vec!["$ echo hi".to_string(), "hi".to_string()],
                2,
                1,
            ))),
            updates: 3,
            ..ViewerState::default()
        };
        let buffer = render(&state);
        // Body starts below the three-row header.
        assert!(row_text(&buffer, 3).starts_with("$ echo hi"));
        assert!(row_text(&buffer, 4).starts_with("hi"));
        assert!(all_text(&buffer).contains("updates 3"));
        assert!(!all_text(&buffer).contains(WAITING_MESSAGE));
        assert!(buffer[(2, 4)].modifier.contains(Modifier::REVERSED));
        assert!(!buffer[(0, 4)].modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn long_lines_are_clipped() {
        let state = ViewerState {
            screen: Some(Arc::new(BufferSnapshot::new(vec!["x".repeat(200)], 0, 0))),
            ..ViewerState::default()
        };
        let buffer = render(&state);
        assert_eq!(row_text(&buffer, 3), "x".repeat(60));
    }
}
