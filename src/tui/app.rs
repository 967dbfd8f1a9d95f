use anyhow::Result;
use chrono::{Local, NaiveTime};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    widgets::Block,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::Notify;

use crate::api::PrayerTimesSource;
use crate::models::{Location, PrayerTimes};
use crate::prayer_times::{Board, resolve};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{cards, countdown, header, statusbar};

/// Terminals at least this wide get the desktop row of cards.
pub const DESKTOP_MIN_WIDTH: u16 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LayoutMode {
    Auto,
    Desktop,
    Mobile,
}

impl LayoutMode {
    pub fn is_mobile(self, width: u16) -> bool {
        match self {
            LayoutMode::Auto => width < DESKTOP_MIN_WIDTH,
            LayoutMode::Desktop => false,
            LayoutMode::Mobile => true,
        }
    }

    fn cycle(self) -> Self {
        match self {
            LayoutMode::Auto => LayoutMode::Desktop,
            LayoutMode::Desktop => LayoutMode::Mobile,
            LayoutMode::Mobile => LayoutMode::Auto,
        }
    }
}

pub struct App {
    pub times: PrayerTimes,
    pub board: Board,
    pub layout: LayoutMode,
    /// Carousel position in the mobile strip.
    pub offset: usize,
    pub should_quit: bool,
    pub refresh_requested: bool,
}

impl App {
    pub fn new(times: PrayerTimes, layout: LayoutMode, now: NaiveTime) -> Self {
        let board = resolve(&times, now);
        App {
            times,
            board,
            layout,
            offset: 0,
            should_quit: false,
            refresh_requested: false,
        }
    }

    /// Re-resolve against `now`. The strip snaps back to the front whenever
    /// the active or next prayer changes.
    pub fn tick(&mut self, now: NaiveTime) {
        let board = resolve(&self.times, now);
        if board.active != self.board.active || board.next != self.board.next {
            log::debug!("Board changed: active {:?}, next {}", board.active, board.next);
            self.offset = 0;
        }
        self.board = board;
    }

    pub fn apply_times(&mut self, times: PrayerTimes, now: NaiveTime) {
        log::debug!("Applying prayer times from {}", times.source.as_str());
        self.times = times;
        self.tick(now);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // presses only; some terminals also report release and repeat
        if key.kind != KeyEventKind::Press {
            return;
        }
        let len = self.board.mobile.len().max(1);
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => self.refresh_requested = true,
            KeyCode::Char('l') => self.layout = self.layout.cycle(),
            KeyCode::Right => self.offset = (self.offset + 1) % len,
            KeyCode::Left => self.offset = (self.offset + len - 1) % len,
            _ => {}
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);
        let mobile = self.layout.is_mobile(area.width);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Length(8), // countdown
                Constraint::Min(0),    // cards
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(frame, chunks[0], &self.times);
        countdown::render(frame, chunks[1], &self.board, &self.times);
        if mobile {
            cards::render_strip(frame, chunks[2], &self.board.mobile, self.offset);
        } else {
            let row = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(9), Constraint::Min(0)])
                .split(chunks[2]);
            cards::render_row(frame, row[0], &self.board.desktop);
        }
        statusbar::render(frame, chunks[3], mobile);
    }
}

async fn refetch_loop(
    source: Arc<PrayerTimesSource>,
    location: Location,
    every: Duration,
    wake: Arc<Notify>,
    tx: std::sync::mpsc::Sender<Event>,
) {
    let mut ticker = tokio::time::interval(every);
    // the first tick completes immediately; the board already has times
    ticker.tick().await;
    loop {
        let times = tokio::select! {
            _ = ticker.tick() => source.get(&location).await,
            _ = wake.notified() => source.refresh(&location).await,
        };
        if tx.send(Event::Times(Box::new(times))).is_err() {
            break;
        }
    }
}

/// Run the board until the user quits. Ticks once a second; prayer times
/// are refetched every `refetch_every` in the background.
pub fn run(
    rt: &Runtime,
    source: Arc<PrayerTimesSource>,
    location: Location,
    initial: PrayerTimes,
    refetch_every: Duration,
    layout: LayoutMode,
) -> Result<()> {
    let mut app = App::new(initial, layout, Local::now().time());
    let events = EventHandler::new(1000);
    let wake = Arc::new(Notify::new());
    let refetch = rt.spawn(refetch_loop(
        source,
        location,
        refetch_every,
        wake.clone(),
        events.sender(),
    ));

    let mut terminal = ratatui::init();
    let result = (|| -> Result<()> {
        loop {
            terminal.draw(|frame| app.draw(frame))?;

            match events.next()? {
                Event::Key(key) => {
                    app.handle_key(key);
                    if app.should_quit {
                        break;
                    }
                    if std::mem::take(&mut app.refresh_requested) {
                        wake.notify_one();
                    }
                }
                Event::Tick => app.tick(Local::now().time()),
                Event::Times(times) => app.apply_times(*times, Local::now().time()),
            }
        }
        Ok(())
    })();

    ratatui::restore();
    refetch.abort();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CardStatus, PrayerSource, PrayerType};
    use crossterm::event::KeyModifiers;
    use ratatui::{Terminal, backend::TestBackend};

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn times() -> PrayerTimes {
        PrayerTimes {
            fajr: hm(4, 40),
            dhuhr: hm(11, 58),
            asr: hm(15, 18),
            maghrib: hm(17, 50),
            isha: hm(19, 20),
            date: "16 Oct 2026".to_string(),
            hijri_date: Some("4 Jumada al-Awwal 1448".to_string()),
            location: "Depok, Indonesia".to_string(),
            source: PrayerSource::Local,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn screen(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn tick_moves_board_and_resets_strip() {
        let mut app = App::new(times(), LayoutMode::Mobile, hm(11, 0));
        assert_eq!(app.board.next, PrayerType::Dhuhr);
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.offset, 2);

        app.tick(hm(11, 50));
        assert_eq!(app.board.active, Some(PrayerType::Dhuhr));
        assert_eq!(app.offset, 0);
    }

    #[test]
    fn strip_wraps_left() {
        let mut app = App::new(times(), LayoutMode::Mobile, hm(11, 0));
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.offset, 4);
    }

    #[test]
    fn keys_quit_refresh_and_cycle_layout() {
        let mut app = App::new(times(), LayoutMode::Auto, hm(9, 0));
        app.handle_key(key(KeyCode::Char('l')));
        assert_eq!(app.layout, LayoutMode::Desktop);
        app.handle_key(key(KeyCode::Char('r')));
        assert!(app.refresh_requested);
        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn new_times_replace_old_ones() {
        let mut app = App::new(times(), LayoutMode::Auto, hm(12, 20));
        assert_eq!(app.board.active, Some(PrayerType::Dhuhr));
        let mut later = times();
        later.dhuhr = hm(13, 0);
        later.source = PrayerSource::Api;
        app.apply_times(later, hm(12, 20));
        assert_eq!(app.board.active, None);
        assert_eq!(app.board.next, PrayerType::Dhuhr);
        assert_eq!(app.board.desktop[1].status, CardStatus::Upcoming);
    }

    #[test]
    fn auto_layout_follows_width() {
        assert!(LayoutMode::Auto.is_mobile(80));
        assert!(!LayoutMode::Auto.is_mobile(120));
        assert!(LayoutMode::Mobile.is_mobile(200));
    }

    #[test]
    fn desktop_draw_shows_every_prayer() {
        let app = App::new(times(), LayoutMode::Desktop, hm(12, 0));
        let text = screen(&app, 120, 30);
        for name in ["Subuh", "Dzuhur", "Ashar", "Maghrib", "Isya"] {
            assert!(text.contains(name), "missing {name}");
        }
        assert!(text.contains("Sedang Berlangsung"));
    }

    #[test]
    fn mobile_draw_shows_countdown_caption() {
        let app = App::new(times(), LayoutMode::Mobile, hm(14, 0));
        let text = screen(&app, 80, 30);
        assert!(text.contains("Ashar pukul 15:18"));
        assert!(text.contains("Selanjutnya"));
    }
}
