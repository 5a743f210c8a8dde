use super::*;
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

/// Cloneable handle that ends the game from any thread.
/// The first call wins; later calls do nothing.
#[derive(Clone)]
pub struct Halt {
    flag: Arc<AtomicBool>,
    agents: Vec<Arc<Agent>>,
    inbox: Sender<Notice>,
}

impl Halt {
    pub fn new(agents: Vec<Arc<Agent>>, inbox: Sender<Notice>) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            agents,
            inbox,
        }
    }
    /// Sets the flag, tells every agent, and wakes the arbiter.
    pub fn terminate(&self) {
        if self.flag.swap(true, Ordering::SeqCst) {
            return;
        }
        log::info!("[halt] termination requested");
        self.agents.iter().for_each(|agent| agent.request_termination());
        if self.inbox.send(Notice::Halt).is_err() {
            log::debug!("[halt] arbiter already gone");
        }
    }
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for Halt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Halt")
            .field("set", &self.is_set())
            .field("agents", &self.agents.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    #[test]
    fn terminate_reaches_agents_and_arbiter_once() {
        let config = fast();
        let recorder = Arc::new(Recorder::default());
        let board = Arc::new(Board::new(config.table_size, config.players, recorder.clone()));
        let (tx, rx) = crossbeam_channel::unbounded();
        let agents = (0..config.players)
            .map(|id| Arc::new(Agent::new(id, &config, board.clone(), recorder.clone(), tx.clone())))
            .collect::<Vec<_>>();
        let halt = Halt::new(agents.clone(), tx);
        assert!(!halt.is_set());
        halt.terminate();
        halt.clone().terminate();
        assert!(halt.is_set());
        assert!(agents.iter().all(|agent| agent.is_halted()));
        assert_eq!(rx.try_iter().filter(|n| matches!(n, Notice::Halt)).count(), 1);
    }
}
