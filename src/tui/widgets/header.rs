use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::models::{PrayerSource, PrayerTimes};
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, times: &PrayerTimes) {
    let title_line = Line::from(vec![
        Span::styled("  مصلى الأمين  ", theme::gold().add_modifier(Modifier::BOLD)),
        Span::styled("Jadwal Sholat Hari Ini", theme::gold()),
    ]);

    let mut date_spans = Vec::new();
    if let Some(hijri) = &times.hijri_date {
        date_spans.push(Span::styled(hijri.as_str(), theme::amber()));
        date_spans.push(Span::styled("  ·  ", theme::dim()));
    }
    date_spans.push(Span::styled(times.date.as_str(), theme::dim()));
    date_spans.push(Span::styled("  ·  ", theme::dim()));
    date_spans.push(Span::styled(times.location.as_str(), theme::dim()));

    let source_style = match times.source {
        PrayerSource::Api => theme::green(),
        PrayerSource::Local => theme::amber(),
        PrayerSource::Fallback => theme::red(),
    };
    date_spans.push(Span::styled("  ·  ", theme::dim()));
    date_spans.push(Span::styled(times.source.as_str(), source_style));

    let text = vec![title_line, Line::from(""), Line::from(date_spans)];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
