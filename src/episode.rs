//! Generation boundary signalling between running agents and the trainer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

/// Message emitted once every agent of an episode has terminated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationComplete {
    /// Episode the message belongs to
    pub episode: u64,
}

/// Errors from the alive counter
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CounterError {
    #[error("agent death reported with no agents alive")]
    NoAgentsAlive,
}

/// Counts running agents and signals when the last one terminates.
///
/// The decrement is a single atomic compare-and-swap, so exactly one caller
/// observes the transition to zero and sends the completion message.
pub struct AliveCounter {
    alive: AtomicUsize,
    episode: AtomicUsize,
    complete_tx: Mutex<Sender<GenerationComplete>>,
}

impl AliveCounter {
    /// Create a counter with no agents alive, plus the receiving end of its signal
    pub fn new() -> (Self, Receiver<GenerationComplete>) {
        let (complete_tx, complete_rx) = mpsc::channel();
        let counter = Self {
            alive: AtomicUsize::new(0),
            episode: AtomicUsize::new(0),
            complete_tx: Mutex::new(complete_tx),
        };
        (counter, complete_rx)
    }

    /// Start a new episode with `count` agents alive
    pub fn restart(&self, count: usize) -> u64 {
        let episode = self.episode.fetch_add(1, Ordering::SeqCst) as u64 + 1;
        self.alive.store(count, Ordering::SeqCst);
        if count == 0 {
            self.notify(episode);
        }
        episode
    }

    /// Record one agent termination; returns the number still alive
    pub fn record_death(&self) -> Result<usize, CounterError> {
        let previous = self
            .alive
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .map_err(|_| CounterError::NoAgentsAlive)?;

        if previous == 1 {
            self.notify(self.episode.load(Ordering::SeqCst) as u64);
        }
        Ok(previous - 1)
    }

    pub fn alive(&self) -> usize {
        self.alive.load(Ordering::SeqCst)
    }

    fn notify(&self, episode: u64) {
        let sent = self
            .complete_tx
            .lock()
            .map(|tx| tx.send(GenerationComplete { episode }).is_ok())
            .unwrap_or(false);
        if !sent {
            log::warn!("Generation complete signal for episode {} was dropped", episode);
        }
    }
}
