use super::*;
use anyhow::Context;
use std::io::BufRead;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Line-buffered keyboard input for human agents.
///
/// Every character of a line is looked up in the [`Keymap`] and forwarded
/// to the owning agent's `receive_input`. A line reading `quit` or `exit`
/// ends the game. Keys for autonomous agents or for slots past the end of
/// the board are dropped.
pub struct Console {
    halt: Halt,
    agents: Vec<Arc<Agent>>,
    keymap: Keymap,
}

impl Console {
    pub fn new(halt: Halt, agents: Vec<Arc<Agent>>, keymap: Keymap) -> Self {
        Self {
            halt,
            agents,
            keymap,
        }
    }
    /// Reads stdin on a detached thread until quit or end of input.
    pub fn spawn(self) -> anyhow::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("console".to_string())
            .spawn(move || self.read(std::io::stdin().lock()))
            .context("spawn console")
    }
    pub fn read<R: BufRead>(&self, input: R) {
        for line in input.lines() {
            match line {
                Ok(ref line) if self.handle(line) => continue,
                Ok(_) => return,
                Err(e) => {
                    log::warn!("[console] {}", e);
                    return;
                }
            }
        }
        log::debug!("[console] end of input");
    }
    /// Returns false once the line asked to quit.
    pub fn handle(&self, line: &str) -> bool {
        match line.trim() {
            "quit" | "exit" => {
                self.halt.terminate();
                false
            }
            keys => {
                keys.chars().for_each(|key| {
                    self.route(key);
                });
                true
            }
        }
    }
    /// Forwards one key press; true if an agent accepted it.
    pub fn route(&self, key: char) -> bool {
        self.keymap
            .resolve(key)
            .and_then(|(id, slot)| self.agents.get(id).map(|agent| (agent, slot)))
            .filter(|(agent, slot)| agent.is_human() && *slot < agent.table_size())
            .map(|(agent, slot)| agent.receive_input(slot))
            .unwrap_or(false)
    }
}
