//! Test doubles shared across module tests.
use super::*;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::time::Duration;
use std::time::Instant;

/// One call into a [`Surface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paint {
    Place(Item, Slot),
    Clear(Slot),
    Token(AgentId, Slot, bool),
    Countdown(Duration, bool),
    Score(AgentId, usize),
    Freeze(AgentId, Duration),
    Winners(Vec<AgentId>),
}

/// Surface that remembers every call in order.
#[derive(Debug, Default)]
pub struct Recorder(Mutex<Vec<Paint>>);

impl Recorder {
    pub fn events(&self) -> Vec<Paint> {
        self.0.lock().clone()
    }
    pub fn freezes(&self, agent: AgentId) -> Vec<Duration> {
        self.events()
            .into_iter()
            .filter_map(|p| match p {
                Paint::Freeze(a, d) if a == agent => Some(d),
                _ => None,
            })
            .collect()
    }
    pub fn countdowns(&self) -> Vec<Duration> {
        self.events()
            .into_iter()
            .filter_map(|p| match p {
                Paint::Countdown(d, _) => Some(d),
                _ => None,
            })
            .collect()
    }
    pub fn winners(&self) -> Option<Vec<AgentId>> {
        self.events().into_iter().find_map(|p| match p {
            Paint::Winners(w) => Some(w),
            _ => None,
        })
    }
    fn push(&self, paint: Paint) {
        self.0.lock().push(paint);
    }
}

impl Surface for Recorder {
    fn place(&self, item: Item, slot: Slot) {
        self.push(Paint::Place(item, slot));
    }
    fn clear(&self, slot: Slot) {
        self.push(Paint::Clear(slot));
    }
    fn token(&self, agent: AgentId, slot: Slot, placed: bool) {
        self.push(Paint::Token(agent, slot, placed));
    }
    fn countdown(&self, remaining: Duration, warn: bool) {
        self.push(Paint::Countdown(remaining, warn));
    }
    fn score(&self, agent: AgentId, score: usize) {
        self.push(Paint::Score(agent, score));
    }
    fn freeze(&self, agent: AgentId, remaining: Duration) {
        self.push(Paint::Freeze(agent, remaining));
    }
    fn winners(&self, agents: &[AgentId]) {
        self.push(Paint::Winners(agents.to_vec()));
    }
}

/// Oracle with a fixed list of valid sets that records every judgement.
#[derive(Debug, Default)]
pub struct Scripted {
    valid: Vec<BTreeSet<Item>>,
    judged: Mutex<Vec<Vec<Item>>>,
}

impl Scripted {
    pub fn new(valid: &[&[Item]]) -> Self {
        Self {
            valid: valid
                .iter()
                .map(|set| set.iter().copied().collect())
                .collect(),
            judged: Mutex::new(Vec::new()),
        }
    }
    /// Every `is_set` argument so far, in call order.
    pub fn judged(&self) -> Vec<Vec<Item>> {
        self.judged.lock().clone()
    }
}

impl Oracle for Scripted {
    fn is_set(&self, items: &[Item]) -> bool {
        self.judged.lock().push(items.to_vec());
        let items = items.iter().copied().collect::<BTreeSet<Item>>();
        self.valid.iter().any(|set| *set == items)
    }
    fn find_sets(&self, items: &[Item], limit: usize) -> Vec<Vec<Item>> {
        let items = items.iter().copied().collect::<BTreeSet<Item>>();
        self.valid
            .iter()
            .filter(|set| set.is_subset(&items))
            .map(|set| set.iter().copied().collect())
            .take(limit)
            .collect()
    }
}

/// Small board, small deck, millisecond ticks.
pub fn fast() -> Config {
    Config {
        table_size: 12,
        deck_size: 12,
        set_size: 3,
        players: 2,
        humans: 2,
        turn_timeout: Duration::from_millis(2_000),
        turn_warning: Duration::from_millis(200),
        point_freeze: Duration::from_millis(60),
        penalty_freeze: Duration::from_millis(60),
        table_delay: Duration::ZERO,
        tick: Duration::from_millis(20),
        seed: Some(7),
        ..Config::default()
    }
}

/// Polls until the condition holds or the deadline passes.
pub fn eventually<F>(within: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + within;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}
