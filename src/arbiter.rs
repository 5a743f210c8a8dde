use super::*;
use anyhow::Context;
use crossbeam_channel::Receiver;
use crossbeam_channel::RecvTimeoutError;
use crossbeam_channel::Sender;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Messages into the arbiter's inbox, consumed in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The agent holds a full set of tokens and wants it judged.
    Submit(AgentId),
    /// Wake up: termination was requested.
    Halt,
}

/// The dealer: owns the deck and the round timer, judges submissions, and
/// is the only writer of cards on the board.
///
/// Rounds run as deal → timed wait → clear until termination is requested or
/// no set is left among the remaining cards. During the timed wait the
/// arbiter sleeps one tick at a time or until a submission arrives, judges
/// every queued submission in order against the board as it is *now*, and
/// refreshes the countdown.
pub struct Arbiter {
    config: Config,
    board: Arc<Board>,
    agents: Vec<Arc<Agent>>,
    deck: Vec<Item>,
    oracle: Arc<dyn Oracle>,
    surface: Arc<dyn Surface>,
    timer: Timer,
    outbox: Sender<Notice>,
    inbox: Receiver<Notice>,
    halt: Halt,
    rng: SmallRng,
    shown: Option<u64>,
}

impl Arbiter {
    pub fn new(
        config: Config,
        oracle: Arc<dyn Oracle>,
        surface: Arc<dyn Surface>,
    ) -> anyhow::Result<Self> {
        config.validate().context("invalid game configuration")?;
        let (outbox, inbox) = crossbeam_channel::unbounded();
        let board = Arc::new(Board::new(
            config.table_size,
            config.players,
            Arc::clone(&surface),
        ));
        let agents = (0..config.players)
            .map(|id| {
                Arc::new(Agent::new(
                    id,
                    &config,
                    Arc::clone(&board),
                    Arc::clone(&surface),
                    outbox.clone(),
                ))
            })
            .collect::<Vec<Arc<Agent>>>();
        let halt = Halt::new(agents.clone(), outbox.clone());
        let mut rng = config
            .seed
            .map(SmallRng::seed_from_u64)
            .unwrap_or_else(SmallRng::from_os_rng);
        let mut deck = (0..config.deck_size).collect::<Vec<Item>>();
        deck.shuffle(&mut rng);
        Ok(Self {
            timer: Timer::new(config.turn_timeout, config.tick),
            config,
            board,
            agents,
            deck,
            oracle,
            surface,
            outbox,
            inbox,
            halt,
            rng,
            shown: None,
        })
    }

    /// Runs the whole game on the calling thread: starts the agents, plays
    /// rounds, joins the agents, and returns the winners in id order.
    pub fn run(mut self) -> anyhow::Result<Vec<AgentId>> {
        log::info!(
            "[arbiter] starting with {} agents ({} human), {} cards",
            self.agents.len(),
            self.config.humans,
            self.deck.len()
        );
        let handles = self.spawn(|agent| agent.spawn())?;
        while !self.is_halted() && self.solvable() {
            self.deal_round();
            self.wait();
            self.clear();
        }
        self.halt.terminate();
        self.join(handles);
        let winners = self.announce();
        log::info!("[arbiter] terminated");
        Ok(winners)
    }

    /// Queues a submission for judging and wakes the arbiter.
    pub fn submit_set(&self, id: AgentId) {
        if self.outbox.send(Notice::Submit(id)).is_err() {
            log::warn!("[arbiter] inbox closed, dropping submission from P{}", id);
        }
    }
    /// Ends the game. Safe to call more than once.
    pub fn terminate(&self) {
        self.halt.terminate();
    }
    /// Termination handle for other threads.
    pub fn halt(&self) -> Halt {
        self.halt.clone()
    }
    pub fn agents(&self) -> &[Arc<Agent>] {
        &self.agents
    }
    pub fn board(&self) -> &Arc<Board> {
        &self.board
    }
    pub fn deck(&self) -> &[Item] {
        &self.deck
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
    pub fn is_halted(&self) -> bool {
        self.halt.is_set()
    }
    /// Empties a slot for good, clearing every agent's token on it and
    /// bringing their counts back in line with the board in the same step.
    pub fn remove_for_all(&self, slot: Slot) -> Option<Item> {
        let removal = {
            let mut tallies = self.tallies();
            let removal = self.board.detach(slot)?;
            for &id in removal.owners.iter() {
                if let Some(tally) = tallies.get_mut(id) {
                    tally.set(self.board.tokens(id).len());
                }
            }
            removal
        };
        self.board.publish(slot, &removal);
        self.pace();
        Some(removal.item)
    }
}

// lifecycle
impl Arbiter {
    /// Starts every agent. If one fails, the ones already running are
    /// halted and joined before the error is returned.
    fn spawn<F>(&self, mut launch: F) -> anyhow::Result<Vec<JoinHandle<()>>>
    where
        F: FnMut(&Arc<Agent>) -> anyhow::Result<JoinHandle<()>>,
    {
        let mut handles = Vec::with_capacity(self.agents.len());
        for agent in self.agents.iter() {
            match launch(agent) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    self.halt.terminate();
                    self.join(handles);
                    return Err(e);
                }
            }
        }
        Ok(handles)
    }
    /// Every agent's token count, locked in id order. Taken before any board
    /// lock, the same order agents use when they press.
    fn tallies(&self) -> Vec<Tally<'_>> {
        self.agents.iter().map(|agent| agent.tally()).collect()
    }
    fn join(&self, handles: Vec<JoinHandle<()>>) {
        handles
            .into_iter()
            .map(|handle| handle.join())
            .enumerate()
            .filter(|(_, result)| result.is_err())
            .for_each(|(id, _)| log::warn!("[arbiter] agent P{} panicked", id));
    }
    /// True iff some set can still be made from the cards in play.
    fn solvable(&self) -> bool {
        let cards = self
            .deck
            .iter()
            .copied()
            .chain(self.board.cards())
            .collect::<Vec<Item>>();
        self.oracle.exists(&cards)
    }
    fn announce(&self) -> Vec<AgentId> {
        let scores = self
            .agents
            .iter()
            .map(|agent| agent.score())
            .collect::<Vec<usize>>();
        let best = scores.iter().copied().max().unwrap_or(0);
        let winners = scores
            .iter()
            .enumerate()
            .filter(|(_, score)| **score == best)
            .map(|(id, _)| id)
            .collect::<Vec<AgentId>>();
        log::info!("[arbiter] winners {:?} with {} points", winners, best);
        self.surface.winners(&winners);
        winners
    }
}

// round phases
impl Arbiter {
    /// Fills the board, opens every gate, and starts a full countdown.
    fn deal_round(&mut self) {
        log::info!("[arbiter] dealing, {} cards in deck", self.deck.len());
        self.deal();
        self.agents.iter().for_each(|agent| agent.set_gate(true));
        self.timer.reset();
        self.shown = None;
        self.hint();
    }
    /// Places cards from the shuffled deck into shuffled empty slots until
    /// either runs out.
    fn deal(&mut self) {
        self.deck.shuffle(&mut self.rng);
        let mut empty = self.board.empty_slots();
        empty.shuffle(&mut self.rng);
        for slot in empty {
            let Some(item) = self.deck.pop() else {
                break;
            };
            match self.board.place(item, slot) {
                Ok(()) => self.pace(),
                Err(e) => {
                    log::warn!("[arbiter] {:#}", e);
                    self.deck.push(item);
                }
            }
        }
    }
    /// Sleeps in ticks, judging submissions as they arrive, until the
    /// countdown runs out, the game is halted, or no set is left.
    fn wait(&mut self) {
        while !self.is_halted() && !self.timer.expired() {
            self.show();
            self.step(self.timer.until_tick());
            if !self.solvable() {
                log::info!("[arbiter] no sets left in play");
                break;
            }
        }
        self.show();
    }
    /// One wake-up: waits up to `timeout`, then drains the inbox in order.
    fn step(&mut self, timeout: Duration) {
        match self.inbox.recv_timeout(timeout) {
            Ok(notice) => {
                self.handle(notice);
                while let Ok(notice) = self.inbox.try_recv() {
                    self.handle(notice);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("[arbiter] inbox disconnected");
                self.halt.terminate();
            }
        }
    }
    fn handle(&mut self, notice: Notice) {
        match notice {
            Notice::Submit(id) if self.is_halted() => {
                log::debug!("[arbiter] ignoring P{} after termination", id)
            }
            Notice::Submit(id) => self.judge(id),
            Notice::Halt => log::debug!("[arbiter] woken for termination"),
        }
    }
    /// Judges a submission against the tokens on the board right now,
    /// not against whatever the agent held when it submitted.
    fn judge(&mut self, id: AgentId) {
        let Some(agent) = self.agents.get(id).cloned() else {
            log::warn!("[arbiter] submission from unknown P{}", id);
            return;
        };
        let slots = self.board.tokens(id);
        let items = match self.board.items(&slots) {
            Some(items) if items.len() == self.config.set_size => items,
            _ => {
                log::debug!("[arbiter] P{} holds {} tokens, releasing", id, slots.len());
                agent.reconcile();
                agent.apply_freeze(Verdict::Release);
                return;
            }
        };
        if self.oracle.is_set(&items) {
            log::info!("[arbiter] P{} found set {:?} at {:?}", id, items, slots);
            slots.iter().for_each(|&slot| {
                self.remove_for_all(slot);
            });
            self.deal();
            self.hint();
            self.timer.reset();
            self.shown = None;
            agent.apply_freeze(Verdict::Point(self.config.point_freeze));
        } else {
            log::debug!("[arbiter] P{} submitted non-set {:?}", id, items);
            agent.reconcile();
            agent.apply_freeze(Verdict::Penalty(self.config.penalty_freeze));
        }
    }
    /// Closes every gate, wipes tokens, and returns all cards to the deck.
    /// Skipped entirely once the game is halted.
    fn clear(&mut self) {
        if self.is_halted() {
            return;
        }
        log::info!("[arbiter] clearing {} cards", self.board.count());
        self.agents.iter().for_each(|agent| agent.set_gate(false));
        let stripped = {
            let mut tallies = self.tallies();
            let stripped = self.board.strip_marks();
            tallies.iter_mut().for_each(|tally| tally.set(0));
            stripped
        };
        self.board.publish_unmarks(&stripped);
        self.agents.iter().for_each(|agent| agent.reset_round());
        let mut filled = self.board.filled_slots();
        filled.shuffle(&mut self.rng);
        for slot in filled {
            if let Some(item) = self.remove_for_all(slot) {
                self.deck.push(item);
            }
        }
        self.timer.clear();
        self.discard();
    }
    /// Drops submissions left over from the round just cleared, releasing
    /// the agents still waiting on them.
    fn discard(&mut self) {
        while let Ok(notice) = self.inbox.try_recv() {
            if let Notice::Submit(id) = notice {
                log::debug!("[arbiter] discarding stale submission from P{}", id);
                if let Some(agent) = self.agents.get(id) {
                    agent.apply_freeze(Verdict::Release);
                }
            }
        }
    }
}

// display
impl Arbiter {
    /// Pushes the countdown whenever its whole-tick value changes.
    fn show(&mut self) {
        let ticks = self.timer.ticks();
        if self.shown != Some(ticks) {
            self.shown = Some(ticks);
            let remaining = self.timer.countdown();
            self.surface
                .countdown(remaining, remaining <= self.config.turn_warning);
        }
    }
    fn hint(&self) {
        if !self.config.hints {
            return;
        }
        for set in self.oracle.find_sets(&self.board.cards(), usize::MAX) {
            let slots = set
                .iter()
                .filter_map(|&item| self.board.locate(item))
                .collect::<Vec<Slot>>();
            log::info!("[arbiter] hint: slots {:?} hold {:?}", slots, set);
        }
    }
    fn pace(&self) {
        if !self.config.table_delay.is_zero() && !self.is_halted() {
            std::thread::sleep(self.config.table_delay);
        }
    }
}

impl std::fmt::Debug for Arbiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arbiter")
            .field("deck", &self.deck.len())
            .field("board", &self.board.count())
            .field("agents", &self.agents.len())
            .field("halted", &self.is_halted())
            .finish()
    }
}
