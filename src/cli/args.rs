use clap::{Parser, Subcommand};

use crate::tui::app::LayoutMode;

#[derive(Parser, Debug)]
#[command(name = "alamin", version, author, about = "Prayer times, Quran text and prayer-times relay for Musholla Al-Amin")]
pub struct Cli {
    /// Latitude of the device position (used together with --lon)
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub lat: Option<f64>,
    /// Longitude of the device position (used together with --lat)
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub lon: Option<f64>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Live prayer board with countdown (default)
    Board {
        /// Card layout; auto picks by terminal width
        #[arg(long, value_enum, default_value_t = LayoutMode::Auto)]
        layout: LayoutMode,
    },
    /// Show today's prayer times with the active and next prayer
    Times {
        /// Evaluate at this clock time (HH:MM) instead of now
        #[arg(long)]
        at: Option<String>,
        /// Card order: desktop keeps daily order, mobile starts at the active or next prayer
        #[arg(long, value_enum, default_value_t = LayoutMode::Desktop)]
        layout: LayoutMode,
        /// Print the resolved board as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the prayer-times relay for browser clients
    Serve {
        /// Address to listen on (default from config)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Read the Quran
    Quran {
        #[command(subcommand)]
        action: QuranCommands,
    },
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum QuranCommands {
    /// List all surahs
    List,
    /// Show the verses of one surah
    Read {
        /// Surah number (1-114)
        surah: u32,
        /// First ayat to show
        #[arg(long)]
        from: Option<u32>,
        /// Last ayat to show
        #[arg(long)]
        to: Option<u32>,
    },
}
