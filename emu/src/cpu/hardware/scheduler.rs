//! Central event scheduler.
//!
//! Every piece of hardware that needs to act at some future cycle count (a timer overflow,
//! a DMA FIFO refill, an APU frame-sequencer tick) registers an [`Event`] instead of being
//! polled every cycle. [`Bus::step`](crate::bus::Bus::step) advances the scheduler's clock and
//! pops any event whose timestamp has been reached, dispatching on its [`EventTag`].
//!
//! Grounded on the same fixed-enum-tag, no-closures design as a Game Boy core's scheduler:
//! events carry only a tag and a timestamp, and the consumer match-dispatches on the tag. This
//! keeps the queue `Copy`, serializable, and free of trait objects.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Identifies what should happen when a scheduled [`Event`] fires.
///
/// Channel/timer indices are carried inline so the dispatcher doesn't need a second lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTag {
    /// Timer `n` (0..=3) has reached 0x10000 and overflows.
    TimerOverflow(u8),
    /// The APU frame sequencer should advance to its next step (512 Hz).
    ApuFrameSequencer,
    /// The APU mixer should pull a sample and hand it to the host (32768 Hz).
    ApuSample,
    /// A delayed immediate-mode DMA transfer (used to model the 2-cycle start latency).
    DmaDelayedStart(u8),
}

/// A single queued occurrence of an [`EventTag`] at an absolute cycle timestamp.
///
/// `seq` is a monotonically increasing insertion counter used only to break ties between
/// events scheduled for the same timestamp, so the fire order for same-cycle events is the
/// order they were scheduled in rather than whatever `BinaryHeap` happens to pick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Event {
    timestamp: u64,
    seq: u64,
    tag: EventTag,
}

// `BinaryHeap` is a max-heap; we want the event with the smallest (timestamp, seq) to be
// popped first, so ordering is reversed here rather than wrapping every push in `Reverse`.
impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp && self.seq == other.seq
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.timestamp, other.seq).cmp(&(self.timestamp, self.seq))
    }
}

/// Priority queue of pending hardware events, keyed by an absolute master-clock cycle count.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Scheduler {
    queue: BinaryHeap<Event>,
    current_time: u64,
    next_seq: u64,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            current_time: 0,
            next_seq: 0,
        }
    }

    #[must_use]
    pub fn now(&self) -> u64 {
        self.current_time
    }

    pub fn advance(&mut self, cycles: u64) {
        self.current_time += cycles;
    }

    /// Schedules `tag` to fire `delay` cycles from now. If `tag` is already pending it is
    /// removed first, so re-arming a timer/DMA/APU event replaces its previous due time rather
    /// than firing twice.
    pub fn schedule(&mut self, tag: EventTag, delay: u64) {
        self.cancel(tag);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Event {
            timestamp: self.current_time + delay,
            seq,
            tag,
        });
    }

    /// Removes every pending occurrence of `tag`, if any.
    pub fn cancel(&mut self, tag: EventTag) {
        if self.queue.iter().any(|ev| ev.tag == tag) {
            self.queue = self.queue.drain().filter(|ev| ev.tag != tag).collect();
        }
    }

    #[must_use]
    pub fn is_scheduled(&self, tag: EventTag) -> bool {
        self.queue.iter().any(|ev| ev.tag == tag)
    }

    /// Pops the next event if it is due at or before the current time.
    pub fn pop_due(&mut self) -> Option<EventTag> {
        if self.queue.peek().is_some_and(|ev| ev.timestamp <= self.current_time) {
            self.queue.pop().map(|ev| ev.tag)
        } else {
            None
        }
    }
}
