use super::*;
use anyhow::Context;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Key presses for an autonomous agent: uniformly random slots, as fast as
/// the agent's bounded queue will take them. It makes no judgement of its
/// own and is indistinguishable from a keyboard at `receive_input`.
/// Seeded games give every generator its own reproducible stream.
pub struct Generator {
    agent: Arc<Agent>,
    rng: SmallRng,
}

impl Generator {
    pub fn new(agent: Arc<Agent>) -> Self {
        let rng = agent
            .seed()
            .map(SmallRng::seed_from_u64)
            .unwrap_or_else(SmallRng::from_os_rng);
        Self { agent, rng }
    }
    pub fn spawn(agent: Arc<Agent>) -> anyhow::Result<JoinHandle<()>> {
        let id = agent.id();
        std::thread::Builder::new()
            .name(format!("generator-{}", id))
            .spawn(move || Self::new(agent).run())
            .with_context(|| format!("spawn generator P{}", id))
    }
    fn run(mut self) {
        log::info!("[generator P{}] starting", self.agent.id());
        while !self.agent.is_halted() {
            if self.agent.await_open(self.agent.tick()) {
                let slot = self.pick();
                self.agent.receive_input(slot);
            }
        }
        log::info!("[generator P{}] terminated", self.agent.id());
    }
    fn pick(&mut self) -> Slot {
        self.rng.random_range(0..self.agent.table_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use std::time::Duration;

    fn agent() -> (Arc<Agent>, Arc<Board>, crossbeam_channel::Receiver<Notice>) {
        let config = Config {
            humans: 0,
            ..fast()
        };
        let recorder = Arc::new(Recorder::default());
        let board = Arc::new(Board::new(config.table_size, config.players, recorder.clone()));
        (0..config.table_size).for_each(|slot| board.place(slot, slot).unwrap());
        let (tx, rx) = crossbeam_channel::unbounded();
        let agent = Arc::new(Agent::new(1, &config, board.clone(), recorder, tx));
        (agent, board, rx)
    }

    #[test]
    fn closed_gate_drops_generated_presses() {
        let (agent, board, _inbox) = agent();
        assert!(!agent.is_human());
        let handle = agent.spawn().unwrap();
        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(agent.pending_inputs(), 0);
        assert!(board.tokens(1).is_empty());
        agent.request_termination();
        assert!(eventually(Duration::from_millis(500), || handle.is_finished()));
        handle.join().unwrap();
    }
    #[test]
    fn open_gate_generates_submissions() {
        let (agent, _, inbox) = agent();
        let handle = agent.spawn().unwrap();
        agent.set_gate(true);
        let notice = inbox.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(notice, Notice::Submit(1)));
        assert!(agent.is_frozen());
        agent.request_termination();
        assert!(eventually(Duration::from_millis(500), || handle.is_finished()));
        handle.join().unwrap();
    }
    #[test]
    fn seeded_generators_repeat() {
        let config = Config {
            humans: 0,
            seed: Some(11),
            ..fast()
        };
        let recorder = Arc::new(Recorder::default());
        let board = Arc::new(Board::new(config.table_size, config.players, recorder.clone()));
        let (tx, _) = crossbeam_channel::unbounded();
        let stream = |id: AgentId| {
            let agent = Arc::new(Agent::new(id, &config, board.clone(), recorder.clone(), tx.clone()));
            let mut generator = Generator::new(agent);
            (0..32).map(|_| generator.pick()).collect::<Vec<Slot>>()
        };
        assert_eq!(stream(0), stream(0));
        assert_ne!(stream(0), stream(1));
    }
    #[test]
    fn generated_slots_are_on_board() {
        let (agent, _, _inbox) = agent();
        let mut generator = Generator::new(agent);
        (0..1000).for_each(|_| assert!(generator.pick() < 12));
    }
}
