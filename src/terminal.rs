use super::*;
use colored::Colorize;
use std::time::Duration;

/// Surface that writes every display event to the log.
///
/// With a [`Classic`] deck attached, cards are shown by their feature
/// digits rather than their raw index.
#[derive(Debug, Default)]
pub struct Terminal {
    deck: Option<Classic>,
}

impl Terminal {
    pub fn new(deck: Option<Classic>) -> Self {
        Self { deck }
    }
    fn label(&self, item: Item) -> String {
        match self.deck {
            Some(deck) => deck
                .features(item)
                .iter()
                .map(|f| f.to_string())
                .collect::<String>(),
            None => format!("#{}", item),
        }
    }
    fn seconds(duration: Duration) -> String {
        format!("{:.1}s", duration.as_secs_f64())
    }
}

impl Surface for Terminal {
    fn place(&self, item: Item, slot: Slot) {
        log::info!("[board] slot {:>2} <- {}", slot, self.label(item).cyan());
    }
    fn clear(&self, slot: Slot) {
        log::info!("[board] slot {:>2} {}", slot, "empty".dimmed());
    }
    fn token(&self, agent: AgentId, slot: Slot, placed: bool) {
        match placed {
            true => log::debug!("[board] P{} marks slot {}", agent, slot),
            false => log::debug!("[board] P{} unmarks slot {}", agent, slot),
        }
    }
    fn countdown(&self, remaining: Duration, warn: bool) {
        let text = Self::seconds(remaining);
        match warn {
            true => log::info!("[timer] {}", text.red().bold()),
            false => log::info!("[timer] {}", text.green()),
        }
    }
    fn score(&self, agent: AgentId, score: usize) {
        log::info!("[score] P{} {}", agent, format!("{}", score).green());
    }
    fn freeze(&self, agent: AgentId, remaining: Duration) {
        match remaining.is_zero() {
            true => log::debug!("[agent P{}] thawed", agent),
            false => log::debug!("[agent P{}] frozen {}", agent, Self::seconds(remaining).yellow()),
        }
    }
    fn winners(&self, agents: &[AgentId]) {
        let names = agents
            .iter()
            .map(|id| format!("P{}", id))
            .collect::<Vec<String>>()
            .join(", ");
        match agents.len() {
            1 => log::info!("[score] winner {}", names.green().bold()),
            _ => log::info!("[score] tie between {}", names.green().bold()),
        }
    }
}
