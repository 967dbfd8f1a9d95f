use ratatui::style::{Color, Modifier, Style};

// Deep mosque green with gold and orange accents.
pub const BG: Color = Color::Rgb(12, 24, 20);
pub const SURFACE: Color = Color::Rgb(20, 36, 30);
pub const BORDER: Color = Color::Rgb(46, 74, 62);
pub const TEXT: Color = Color::Rgb(226, 232, 220);
pub const TEXT_DIM: Color = Color::Rgb(122, 146, 134);
pub const GOLD: Color = Color::Rgb(212, 175, 55);
pub const GREEN: Color = Color::Rgb(96, 178, 120);
pub const ORANGE: Color = Color::Rgb(234, 128, 44);
pub const RED: Color = Color::Rgb(196, 84, 70);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn gold() -> Style {
    Style::default().fg(GOLD)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

/// Countdown digits and upcoming highlights.
pub fn amber() -> Style {
    Style::default().fg(ORANGE)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}
