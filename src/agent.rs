use super::*;
use anyhow::Context;
use crossbeam_channel::Receiver;
use crossbeam_channel::SendTimeoutError;
use crossbeam_channel::Sender;
use parking_lot::Condvar;
use parking_lot::Mutex;
use parking_lot::MutexGuard;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;
use std::time::Duration;
use std::time::Instant;

#[derive(Debug, Default)]
struct State {
    tokens: usize,
    score: usize,
    freeze: Duration,
    verdict: Option<Verdict>,
}

/// One participant and the thread that acts for it.
///
/// Key presses arrive through [`Agent::receive_input`] into a bounded queue
/// that the agent's own thread drains, toggling tokens on the board. The
/// press that completes a set submits it to the arbiter, after which the
/// thread blocks until a [`Verdict`] arrives and then sits out its freeze.
///
/// Input is accepted only while the round gate is open, the agent is not
/// frozen, and termination has not been requested.
pub struct Agent {
    id: AgentId,
    human: bool,
    set_size: usize,
    table_size: usize,
    tick: Duration,
    seed: Option<u64>,
    board: Arc<Board>,
    surface: Arc<dyn Surface>,
    arbiter: Sender<Notice>,
    keys: Sender<Slot>,
    queue: Receiver<Slot>,
    wake: Sender<()>,
    woken: Receiver<()>,
    gate: AtomicBool,
    frozen: AtomicBool,
    halted: AtomicBool,
    state: Mutex<State>,
    signal: Condvar,
}

impl Agent {
    pub fn new(
        id: AgentId,
        config: &Config,
        board: Arc<Board>,
        surface: Arc<dyn Surface>,
        arbiter: Sender<Notice>,
    ) -> Self {
        let (keys, queue) = crossbeam_channel::bounded(config.set_size);
        let (wake, woken) = crossbeam_channel::bounded(1);
        Self {
            id,
            human: config.is_human(id),
            set_size: config.set_size,
            table_size: config.table_size,
            tick: config.tick,
            seed: config.seed,
            board,
            surface,
            arbiter,
            keys,
            queue,
            wake,
            woken,
            gate: AtomicBool::new(false),
            frozen: AtomicBool::new(false),
            halted: AtomicBool::new(false),
            state: Mutex::new(State::default()),
            signal: Condvar::new(),
        }
    }
    /// Starts the agent's thread, which in turn starts its generator if the
    /// agent is autonomous.
    pub fn spawn(self: &Arc<Self>) -> anyhow::Result<JoinHandle<()>> {
        let agent = Arc::clone(self);
        std::thread::Builder::new()
            .name(format!("agent-{}", self.id))
            .spawn(move || agent.run())
            .with_context(|| format!("spawn agent P{}", self.id))
    }
}

// input source and arbiter-facing operations
impl Agent {
    /// Queues a key press. Dropped unless input is currently accepted;
    /// blocks while the queue is full. Returns whether the press was queued.
    pub fn receive_input(&self, slot: Slot) -> bool {
        if !self.is_open() {
            log::trace!("[agent P{}] dropped press on slot {}", self.id, slot);
            return false;
        }
        let mut slot = slot;
        loop {
            match self.keys.send_timeout(slot, self.tick) {
                Ok(()) => return true,
                Err(SendTimeoutError::Timeout(s)) if self.is_open() => slot = s,
                Err(_) => return false,
            }
        }
    }
    /// Opens or closes the round gate. Queued presses stay queued.
    pub fn set_gate(&self, open: bool) {
        self.gate.store(open, Ordering::SeqCst);
        let _state = self.state.lock();
        self.signal.notify_all();
    }
    /// Hands a judgement to the agent's thread, waking it whether it is
    /// waiting on a submission or idle on its queue.
    pub fn apply_freeze(&self, verdict: Verdict) {
        self.frozen.store(true, Ordering::SeqCst);
        let mut state = self.state.lock();
        state.freeze = verdict.duration();
        state.verdict = Some(verdict);
        self.signal.notify_all();
        let _ = self.wake.try_send(());
    }
    /// Scores a point and forgets the tokens that made it.
    pub fn award(&self) {
        let mut state = self.state.lock();
        self.reward(&mut state);
    }
    /// Forgets everything placed this round: queued presses and tokens.
    pub fn reset_round(&self) {
        let mut state = self.state.lock();
        let dropped = self.queue.try_iter().count();
        let cleared = self.board.clear_marks_of(self.id);
        state.tokens = 0;
        log::trace!(
            "[agent P{}] round reset, {} presses dropped, {} tokens cleared",
            self.id,
            dropped,
            cleared
        );
    }
    /// Re-derives the token count from the board.
    pub fn reconcile(&self) {
        let mut state = self.state.lock();
        state.tokens = self.board.tokens(self.id).len();
    }
    /// Holds the agent's token count so it can change in step with the board.
    pub fn tally(&self) -> Tally<'_> {
        Tally(self.state.lock())
    }
    /// Asks the agent's thread and its generator to exit, waking any wait.
    pub fn request_termination(&self) {
        self.halted.store(true, Ordering::SeqCst);
        let _state = self.state.lock();
        self.signal.notify_all();
    }
}

// accessors
impl Agent {
    pub fn id(&self) -> AgentId {
        self.id
    }
    pub fn is_human(&self) -> bool {
        self.human
    }
    pub fn table_size(&self) -> usize {
        self.table_size
    }
    pub fn score(&self) -> usize {
        self.state.lock().score
    }
    pub fn tokens(&self) -> usize {
        self.state.lock().tokens
    }
    pub fn tick(&self) -> Duration {
        self.tick
    }
    /// Shuffle seed for this agent's generator, if the game is seeded.
    pub fn seed(&self) -> Option<u64> {
        self.seed
            .map(|seed| seed ^ (self.id as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
    /// Judgement delivered but not yet picked up by the agent's thread.
    pub fn verdict(&self) -> Option<Verdict> {
        self.state.lock().verdict
    }
    pub fn pending_inputs(&self) -> usize {
        self.queue.len()
    }
    pub fn is_gated(&self) -> bool {
        self.gate.load(Ordering::SeqCst)
    }
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::SeqCst)
    }
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }
    /// True iff a key press would be accepted right now.
    pub fn is_open(&self) -> bool {
        self.is_gated() && !self.is_frozen() && !self.is_halted()
    }
    /// Blocks until input would be accepted, termination, or the timeout.
    pub fn await_open(&self, timeout: Duration) -> bool {
        let until = Instant::now() + timeout;
        let mut state = self.state.lock();
        while !self.is_open() && !self.is_halted() {
            if self.signal.wait_until(&mut state, until).timed_out() {
                break;
            }
        }
        self.is_open()
    }
}

/// Exclusive hold on an agent's token count. The agent cannot press while
/// it is held, so a caller that takes it before touching the board keeps
/// count and marks in step.
pub struct Tally<'a>(MutexGuard<'a, State>);

impl Tally<'_> {
    pub fn tokens(&self) -> usize {
        self.0.tokens
    }
    pub fn set(&mut self, tokens: usize) {
        self.0.tokens = tokens;
    }
}

// the agent's own thread
impl Agent {
    fn run(self: Arc<Self>) {
        log::info!("[agent P{}] starting", self.id);
        let generator = match self.human {
            true => None,
            false => Generator::spawn(Arc::clone(&self))
                .inspect_err(|e| log::warn!("[agent P{}] no generator: {:#}", self.id, e))
                .ok(),
        };
        while !self.is_halted() {
            let slot = crossbeam_channel::select! {
                recv(self.queue) -> slot => slot.ok(),
                recv(self.woken) -> _ => None,
                default(self.tick) => None,
            };
            match slot {
                Some(slot) => self.press(slot),
                None => self.settle_pending(),
            }
        }
        if let Some(handle) = generator {
            if handle.join().is_err() {
                log::warn!("[agent P{}] generator panicked", self.id);
            }
        }
        log::info!("[agent P{}] terminated", self.id);
    }
    /// Toggles a token. The press that completes a set submits it.
    fn press(&self, slot: Slot) {
        let mut state = self.state.lock();
        if let Some(verdict) = state.verdict.take() {
            self.settle(&mut state, verdict);
        }
        if self.board.unmark(self.id, slot) {
            state.tokens = state.tokens.saturating_sub(1);
            log::trace!("[agent P{}] unmarked slot {}", self.id, slot);
        } else if state.tokens < self.set_size && self.board.mark(self.id, slot) {
            state.tokens += 1;
            log::trace!("[agent P{}] marked slot {}", self.id, slot);
            if state.tokens == self.set_size {
                self.submit(&mut state);
            }
        }
    }
    /// Sends the set to the arbiter and blocks until it is judged.
    fn submit(&self, state: &mut MutexGuard<'_, State>) {
        self.frozen.store(true, Ordering::SeqCst);
        if let Err(e) = self.arbiter.send(Notice::Submit(self.id)) {
            log::warn!("[agent P{}] arbiter is gone: {}", self.id, e);
            self.frozen.store(false, Ordering::SeqCst);
            return;
        }
        log::debug!("[agent P{}] submitted set", self.id);
        // a verdict delivered before termination still counts
        let verdict = loop {
            if let Some(verdict) = state.verdict.take() {
                break verdict;
            }
            if self.is_halted() {
                return;
            }
            self.signal.wait_for(state, self.tick);
        };
        self.settle(state, verdict);
    }
    /// Picks up a verdict delivered while the agent was not waiting for one.
    fn settle_pending(&self) {
        let mut state = self.state.lock();
        if let Some(verdict) = state.verdict.take() {
            self.settle(&mut state, verdict);
        }
    }
    /// Scores if owed, sits out the freeze, then takes input again.
    fn settle(&self, state: &mut MutexGuard<'_, State>, verdict: Verdict) {
        log::debug!("[agent P{}] judged: {}", self.id, verdict);
        if verdict.is_point() {
            self.reward(state);
        }
        state.freeze = verdict.duration();
        self.countdown(state);
        if !self.is_halted() {
            self.frozen.store(false, Ordering::SeqCst);
            self.signal.notify_all();
        }
    }
    /// Sits out the freeze one tick at a time, showing what is left.
    fn countdown(&self, state: &mut MutexGuard<'_, State>) {
        if state.freeze.is_zero() {
            return;
        }
        while !state.freeze.is_zero() {
            if self.is_halted() {
                return;
            }
            self.surface.freeze(self.id, state.freeze);
            let step = state.freeze.min(self.tick);
            let until = Instant::now() + step;
            while Instant::now() < until && !self.is_halted() {
                self.signal.wait_until(state, until);
            }
            state.freeze = state.freeze.saturating_sub(step);
        }
        self.surface.freeze(self.id, Duration::ZERO);
    }
    fn reward(&self, state: &mut State) {
        state.score += 1;
        self.board.clear_marks_of(self.id);
        state.tokens = 0;
        log::info!("[agent P{}] scored, now {}", self.id, state.score);
        self.surface.score(self.id, state.score);
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("human", &self.human)
            .field("gate", &self.is_gated())
            .field("frozen", &self.is_frozen())
            .field("halted", &self.is_halted())
            .field("state", &*self.state.lock())
            .finish()
    }
}
