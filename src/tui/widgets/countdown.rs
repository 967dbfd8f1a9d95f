use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tui_big_text::{BigText, PixelSize};

use crate::models::PrayerTimes;
use crate::prayer_times::Board;
use crate::tui::theme;
use crate::utils::format::format_time;

// Quadrant pixels: each glyph is 4 columns by 4 rows.
const GLYPH_WIDTH: u16 = 4;
const GLYPH_HEIGHT: u16 = 4;

pub fn render(frame: &mut Frame, area: Rect, board: &Board, times: &PrayerTimes) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(ratatui::style::Style::default().fg(crate::tui::theme::BORDER))
        .style(theme::surface());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(countdown) = board.countdown else {
        let active = board.active.unwrap_or(board.next);
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                active.display_name().to_uppercase(),
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled("Sedang Berlangsung", theme::green())),
        ];
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
        return;
    };

    let caption = Line::from(vec![
        Span::styled(
            format!(
                "{} pukul {}",
                board.next.display_name(),
                format_time(times.time_of(board.next))
            ),
            theme::gold().add_modifier(Modifier::BOLD),
        ),
        Span::styled("  Adzan akan segera dimulai dalam", theme::dim()),
    ]);
    let caption_area = Rect { height: 1.min(inner.height), ..inner };
    frame.render_widget(Paragraph::new(caption).alignment(Alignment::Center), caption_area);

    let digits = countdown.to_string();
    let width = GLYPH_WIDTH * digits.chars().count() as u16;
    let below = inner.height.saturating_sub(2);

    if inner.width >= width && below >= GLYPH_HEIGHT {
        let big = BigText::builder()
            .pixel_size(PixelSize::Quadrant)
            .style(theme::amber())
            .lines(vec![Line::from(digits)])
            .build();
        let big_area = Rect {
            x: inner.x + (inner.width - width) / 2,
            y: inner.y + 2,
            width,
            height: GLYPH_HEIGHT,
        };
        frame.render_widget(big, big_area);
    } else {
        let small_area = Rect {
            y: inner.y + 1.min(inner.height),
            height: inner.height.saturating_sub(1),
            ..inner
        };
        frame.render_widget(
            Paragraph::new(Span::styled(digits, theme::amber().add_modifier(Modifier::BOLD)))
                .alignment(Alignment::Center),
            small_area,
        );
    }
}
