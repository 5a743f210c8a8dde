//! Threaded dealer and players for a real-time set-matching card game.
//!
//! One [`Arbiter`] thread owns the deck and the round timer and judges
//! submissions. One [`Agent`] thread runs per player, and autonomous players
//! get an extra [`Generator`] thread that presses random slots. All of them
//! share a single [`Board`].
//!
//! ## Architecture
//!
//! - [`Board`]: slot grid and per-agent token marks behind one `RwLock`
//! - [`Agent`]: bounded input queue, gate, token count, freeze countdown
//! - [`Generator`]: uniformly random key presses for non-human agents
//! - [`Arbiter`]: deal, timed wait, judge, clear; announces winners
//! - [`Halt`]: cloneable termination handle shared with input sources
//! - [`Timer`]: round deadline tracking in whole ticks
//!
//! ## Collaborators
//!
//! - [`Oracle`]: set validity and set search ([`Classic`] for the standard deck)
//! - [`Surface`]: display sink ([`Terminal`] logs to the console)
//! - [`Keymap`] and [`Console`]: raw keys to slot presses
#![allow(clippy::new_without_default)]

mod agent;
mod arbiter;
mod board;
mod config;
mod generator;
mod halt;
mod keymap;
mod oracle;
mod surface;
mod timer;
mod verdict;

#[cfg(feature = "cli")]
mod args;
#[cfg(feature = "cli")]
mod console;
#[cfg(feature = "cli")]
mod terminal;

#[cfg(test)]
mod testing;

pub use agent::*;
pub use arbiter::*;
pub use board::*;
pub use config::*;
pub use generator::*;
pub use halt::*;
pub use keymap::*;
pub use oracle::*;
pub use surface::*;
pub use timer::*;
pub use verdict::*;

#[cfg(feature = "cli")]
pub use args::*;
#[cfg(feature = "cli")]
pub use console::*;
#[cfg(feature = "cli")]
pub use terminal::*;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Index of a position on the board, `0..table_size`.
pub type Slot = usize;
/// Identifier of a card, `0..deck_size`.
pub type Item = usize;
/// Stable player index, `0..players`.
pub type AgentId = usize;

// ============================================================================
// GAME PARAMETERS
// ============================================================================
/// Cards that make up one set.
pub const SET_SIZE: usize = 3;
/// Slots on the board.
pub const TABLE_SIZE: usize = 12;
/// Values each feature can take.
pub const FEATURE_SIZE: usize = 3;
/// Features per card.
pub const FEATURE_COUNT: usize = 4;
/// Cards in the full deck, `FEATURE_SIZE ^ FEATURE_COUNT`.
pub const DECK_SIZE: usize = 81;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "cli")]
pub fn log() -> anyhow::Result<()> {
    use anyhow::Context;
    std::fs::create_dir_all("logs").context("create logs directory")?;
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .context("time moves slow")?
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).context("create log file")?,
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).context("initialize logger")
}
