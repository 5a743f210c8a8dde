//! setgame Binary
//!
//! Plays one game on the terminal. Human players type their keys and press
//! enter; `quit` ends the game early.

use anyhow::Context;
use clap::Parser;
use setgame::*;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    log()?;
    let config = Config::try_from(Args::parse())?;
    let oracle = Arc::new(Classic::from(&config));
    let surface = Arc::new(Terminal::new(Some(*oracle)));
    let arbiter = Arbiter::new(config, oracle, surface)?;
    Console::new(arbiter.halt(), arbiter.agents().to_vec(), Keymap::default()).spawn()?;
    let winners = std::thread::Builder::new()
        .name("arbiter".to_string())
        .spawn(move || arbiter.run())
        .context("spawn arbiter")?
        .join()
        .map_err(|_| anyhow::anyhow!("arbiter panicked"))??;
    log::info!("game over, winners {:?}", winners);
    Ok(())
}
