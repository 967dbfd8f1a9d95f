use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, mobile: bool) {
    let mut hints = vec![];
    if mobile {
        hints.push(("[←/→]", " geser  "));
    }
    hints.extend([
        ("[l]", " layout  "),
        ("[r]", " refresh  "),
        ("[Esc]", " quit"),
    ]);

    let mut spans = Vec::new();
    for (key, label) in &hints {
        spans.push(Span::styled(*key, theme::gold()));
        spans.push(Span::styled(*label, theme::dim()));
    }

    let line = Line::from(spans);
    let paragraph = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
