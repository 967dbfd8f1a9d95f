use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
};

use crate::models::{CardStatus, PrayerCard};
use crate::tui::theme;
use crate::utils::format::{format_time, pad_display};

fn status_style(status: CardStatus) -> Style {
    match status {
        CardStatus::InProgress => theme::green().add_modifier(Modifier::BOLD),
        CardStatus::Upcoming => theme::amber(),
        CardStatus::Idle => theme::dim(),
    }
}

fn border_style(status: CardStatus) -> Style {
    match status {
        CardStatus::InProgress => theme::gold().add_modifier(Modifier::BOLD),
        CardStatus::Upcoming => theme::amber(),
        CardStatus::Idle => Style::default().fg(theme::BORDER),
    }
}

/// Five cards side by side, in daily order.
pub fn render_row(frame: &mut Frame, area: Rect, cards: &[PrayerCard]) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(cards.iter().map(|_| Constraint::Ratio(1, cards.len().max(1) as u32)))
        .split(area);

    for (card, column) in cards.iter().zip(columns.iter()) {
        let highlighted = card.status != CardStatus::Idle;
        let name_style = if highlighted {
            theme::gold().add_modifier(Modifier::BOLD)
        } else {
            theme::bold()
        };

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(card.name, name_style)),
            Line::from(Span::styled(card.arabic, theme::dim())),
            Line::from(""),
            Line::from(Span::styled(
                format_time(card.time),
                if highlighted { theme::amber().add_modifier(Modifier::BOLD) } else { theme::bold() },
            )),
            Line::from(""),
            Line::from(Span::styled(card.status.label(), status_style(card.status))),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style(card.status))
            .style(theme::surface());

        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, *column);
    }
}

/// Narrow layout: a strip that starts at the active or next prayer.
/// `offset` scrolls it like a carousel.
pub fn render_strip(frame: &mut Frame, area: Rect, cards: &[PrayerCard], offset: usize) {
    let block = Block::default()
        .title(Span::styled(" Sholat ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::BORDER))
        .style(theme::surface());

    let len = cards.len().max(1);
    let items: Vec<ListItem> = (0..cards.len())
        .map(|i| &cards[(i + offset) % len])
        .map(|card| {
            let highlighted = card.status != CardStatus::Idle;
            let name_style = if highlighted {
                theme::gold().add_modifier(Modifier::BOLD)
            } else {
                theme::bold()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("  {}", pad_display(card.name, 9)), name_style),
                Span::styled(pad_display(card.arabic, 8), theme::dim()),
                Span::styled(format!("{:<7}", format_time(card.time)), theme::amber()),
                Span::styled(card.status.label(), status_style(card.status)),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
