//! Block pacing: bounds how many transactions a block contributes and
//! spreads them across the block interval on the audio clock.
//!
//! Batches play one after another: a block's sampled transactions are
//! evenly spaced over `block_time` seconds, and the next batch starts when
//! the last event of the previous one has fired.

use std::collections::VecDeque;

use crate::chain::{Block, ChainEvent};

/// Pick up to `size` items with an even stride of `len / size`, starting
/// with the first.
pub fn sample_evenly<T: Clone>(items: &[T], size: usize) -> Vec<T> {
    let size = size.min(items.len());
    if size == 0 {
        return Vec::new();
    }
    let step = (items.len() / size).max(1);
    items.iter().step_by(step).take(size).cloned().collect()
}

/// The events a block contributes: its full transactions, sampled and
/// classified as plain transfers or contract calls.
pub fn sample_block(block: &Block, max_transactions: usize) -> Vec<ChainEvent> {
    sample_evenly(&block.full_transactions(), max_transactions)
        .into_iter()
        .map(ChainEvent::from_transaction)
        .collect()
}

#[derive(Debug, Clone)]
struct Batch {
    events: Vec<ChainEvent>,
    queued_at: f64,
}

#[derive(Debug, Clone)]
struct Running {
    events: VecDeque<ChainEvent>,
    start: f64,
    interval: f64,
    fired: usize,
}

impl Running {
    fn next_due(&self) -> Option<f64> {
        (!self.events.is_empty()).then(|| self.start + self.fired as f64 * self.interval)
    }
}

/// FIFO of event batches released against the audio clock.
#[derive(Debug, Clone)]
pub struct TransactionPacer {
    block_time: f64,
    queued: VecDeque<Batch>,
    running: Option<Running>,
    /// When the last batch finished firing.
    free_at: f64,
}

impl TransactionPacer {
    pub fn new(block_time: f64) -> Self {
        TransactionPacer {
            block_time: if block_time.is_finite() { block_time.max(0.0) } else { 0.0 },
            queued: VecDeque::new(),
            running: None,
            free_at: f64::NEG_INFINITY,
        }
    }

    /// Queue a batch at audio-clock time `now`. Empty batches are dropped.
    pub fn enqueue(&mut self, events: Vec<ChainEvent>, now: f64) {
        if !events.is_empty() {
            self.queued.push_back(Batch { events, queued_at: now });
        }
    }

    /// Events not yet released.
    pub fn pending(&self) -> usize {
        self.queued.iter().map(|b| b.events.len()).sum::<usize>()
            + self.running.as_ref().map_or(0, |r| r.events.len())
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    pub fn clear(&mut self) {
        self.queued.clear();
        self.running = None;
    }

    /// Release every event due at or before `now`, with the time it was due.
    pub fn drain_due(&mut self, now: f64) -> Vec<(f64, ChainEvent)> {
        let mut due = Vec::new();
        loop {
            if self.running.is_none() {
                let Some(batch) = self.queued.pop_front() else {
                    break;
                };
                self.running = Some(Running {
                    interval: self.block_time / batch.events.len() as f64,
                    start: batch.queued_at.max(self.free_at),
                    events: batch.events.into(),
                    fired: 0,
                });
            }
            let Some(run) = self.running.as_mut() else {
                break;
            };
            while let Some(at) = run.next_due() {
                if at > now {
                    break;
                }
                if let Some(event) = run.events.pop_front() {
                    due.push((at, event));
                }
                run.fired += 1;
                if run.events.is_empty() {
                    self.free_at = at;
                }
            }
            if run.events.is_empty() {
                self.running = None;
            } else {
                break;
            }
        }
        due
    }
}
