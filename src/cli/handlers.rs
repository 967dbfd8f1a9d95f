use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveTime};
use std::future::Future;
use std::io::{self, BufRead, Write};

use crate::api::{PrayerTimesSource, QuranClient, QuranError, build_http_client};
use crate::cli::args::QuranCommands;
use crate::config::AppConfig;
use crate::models::{CardStatus, Location, PrayerCard, PrayerSource, PrayerTimes, parse_clock};
use crate::prayer_times::resolver::remaining_prayers;
use crate::prayer_times::{Board, resolve};
use crate::relay::{self, RelayState};
use crate::tui::app::LayoutMode;
use crate::utils::format::{format_duration_secs, format_time, pad_display, truncate};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;212;175;55m";

// ─── Times ───────────────────────────────────────────────────────────────────

pub async fn handle_times(
    source: &PrayerTimesSource,
    location: &Location,
    at: Option<&str>,
    layout: LayoutMode,
    json: bool,
) -> Result<()> {
    let now = match at {
        Some(s) => parse_clock(s).with_context(|| format!("Invalid --at value '{}'", s))?,
        None => Local::now().time(),
    };

    let times = source.get(location).await;
    let board = resolve(&times, now);

    if json {
        let out = serde_json::json!({ "times": times, "board": board });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    match &times.hijri_date {
        Some(hijri) => println_colored!(
            GOLD,
            "  Jadwal Sholat · {} ({} · {})",
            times.location,
            times.date,
            hijri
        ),
        None => println_colored!(GOLD, "  Jadwal Sholat · {} ({})", times.location, times.date),
    }
    if times.source != PrayerSource::Api {
        println_colored!(DIM, "  (jadwal {}, API tidak tersedia)", times.source.as_str());
    }
    println!();

    if layout.is_mobile(u16::MAX) {
        print_cards(&board.mobile);
    } else {
        print_cards(&board.desktop);
        let rest: Vec<String> = remaining_prayers(&times, board.current, board.next)
            .iter()
            .map(|c| format!("{} {}", c.name, format_time(c.time)))
            .collect();
        println!();
        println_colored!(DIM, "  Lainnya: {}", rest.join(" · "));
    }

    println!();
    print_status(&board, &times, now);
    println!();
    Ok(())
}

fn print_cards(cards: &[PrayerCard]) {
    for card in cards {
        let line = format!(
            "  {}{}{:<7}{}",
            pad_display(card.name, 10),
            pad_display(card.arabic, 9),
            format_time(card.time),
            card.status.label()
        );
        match card.status {
            CardStatus::InProgress => println_colored!(GREEN, "{}", line),
            CardStatus::Upcoming => println_colored!(BOLD, "{}", line),
            CardStatus::Idle => println_colored!(DIM, "{}", line),
        }
    }
}

fn print_status(board: &Board, times: &PrayerTimes, now: NaiveTime) {
    match (board.active, board.countdown) {
        (Some(active), _) => {
            println_colored!(GREEN, "  {} sedang berlangsung", active.display_name());
        }
        (None, Some(countdown)) => {
            println_colored!(
                AMBER,
                "  Selanjutnya {} pukul {}, dalam {} ({})",
                board.next.display_name(),
                format_time(times.time_of(board.next)),
                countdown,
                format_duration_secs(countdown.total_secs())
            );
        }
        (None, None) => {}
    }
    log::debug!("Resolved at {}: current prayer {}", format_time(now), board.current);
}

// ─── Relay ───────────────────────────────────────────────────────────────────

pub async fn handle_serve(config: &AppConfig, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config.relay.bind.clone());
    let http = build_http_client()?;
    let state = RelayState::new(http, &config.relay.upstream_base_url);
    relay::serve(&bind, state).await
}

// ─── Quran ───────────────────────────────────────────────────────────────────

/// Run `load`, asking whether to retry each time it fails.
async fn with_retry<T, F, Fut>(mut load: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, QuranError>>,
{
    loop {
        match load().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                println_colored!(RED, "  ✗ {}", e);
                if matches!(e, QuranError::InvalidSurah(_)) {
                    return Err(e.into());
                }
                let answer = prompt("  Coba lagi? [Y/n] ")?;
                if !is_yes(&answer) {
                    return Err(anyhow!(e));
                }
            }
        }
    }
}

pub async fn handle_quran(client: &QuranClient, action: &QuranCommands) -> Result<()> {
    match action {
        QuranCommands::List => {
            let surahs = with_retry(|| client.surah_list()).await?;
            println!();
            for s in &surahs {
                println!(
                    "  {:>3}  {}{}{:>3} ayat  {:<10} {}",
                    s.nomor,
                    pad_display(&s.nama_latin, 18),
                    pad_display(&s.nama, 12),
                    s.jumlah_ayat,
                    s.tempat_turun.label(),
                    s.arti
                );
            }
            println!();
        }
        QuranCommands::Read { surah, from, to } => {
            let detail = with_retry(|| client.surah(*surah)).await?;
            let s = &detail.surah;
            let first = from.unwrap_or(1).max(1);
            let last = to.unwrap_or(s.jumlah_ayat).min(s.jumlah_ayat.max(1));
            if first > last {
                return Err(anyhow!(
                    "Ayat range {}-{} is outside 1-{}",
                    first,
                    last,
                    s.jumlah_ayat
                ));
            }

            println!();
            println_colored!(
                GOLD,
                "  {}. {} ({}) · {} · {} ayat · {}",
                s.nomor,
                s.nama_latin,
                s.nama,
                s.arti,
                s.jumlah_ayat,
                s.tempat_turun.label()
            );
            println_colored!(DIM, "  {}", truncate(&s.deskripsi, 160));
            println!();

            for ayat in detail.ayat.iter().filter(|a| (first..=last).contains(&a.id)) {
                println_colored!(BOLD, "  [{}]  {}", ayat.id, ayat.ar);
                println_colored!(AMBER, "       {}", ayat.tr);
                println!("       {}", ayat.idn);
                println!();
            }
        }
    }
    Ok(())
}

// ─── Init ────────────────────────────────────────────────────────────────────

pub fn handle_init(force: bool) -> Result<()> {
    let path = AppConfig::config_path()?;
    if path.exists() && !force {
        println!("Config already exists at {:?}. Use --force to overwrite.", path);
        return Ok(());
    }
    AppConfig::default().save_to(&path)?;
    println_colored!(GREEN, "  ✓ Wrote default config to {:?}", path);
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().lock().read_line(&mut buf)?;
    Ok(buf.trim_end_matches('\n').trim_end_matches('\r').to_string())
}

/// Empty input counts as yes.
fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "" | "y" | "yes" | "ya")
}
