use super::*;
use std::time::Duration;

/// Sink for everything a player would see.
/// The game core calls into it from the arbiter, agent, and board threads,
/// so implementations must be thread-safe and should not block for long.
pub trait Surface: Send + Sync {
    /// A card was placed in a slot.
    fn place(&self, item: Item, slot: Slot);
    /// A slot was emptied.
    fn clear(&self, slot: Slot);
    /// An agent's token on a slot was placed or removed.
    fn token(&self, agent: AgentId, slot: Slot, placed: bool);
    /// Round countdown, with `warn` set once time is running low.
    fn countdown(&self, remaining: Duration, warn: bool);
    /// An agent's score changed.
    fn score(&self, agent: AgentId, score: usize);
    /// An agent's remaining freeze. Zero means the agent may act again.
    fn freeze(&self, agent: AgentId, remaining: Duration);
    /// The game is over.
    fn winners(&self, agents: &[AgentId]);
}
