//! The four 16-bit hardware timers.
//!
//! Each timer counts up from its reload value at a rate selected by a 2-bit prescaler
//! (`/1`, `/64`, `/256`, `/1024` of the CPU clock) and overflows back to the reload value
//! when it passes `0xFFFF`. A timer can instead be put in "cascade" mode, in which case it
//! ignores its own prescaler and increments by one every time the *previous* timer overflows
//! -- this is how games build wider-than-16-bit counters. Timer 0 has no previous timer, so
//! its cascade bit is ignored, matching the real hardware.
//!
//! [`Bus::step`](crate::bus::Bus::step) drives [`Timers::step`] once per CPU cycle; the
//! returned [`TimerStepResult`] tells the bus which timers overflowed so it can raise the
//! matching IRQ and, for timers 0/1, notify the APU FIFOs.

use serde::{Deserialize, Serialize};

const PRESCALER_CYCLES: [u16; 4] = [1, 64, 256, 1024];

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize)]
struct TimerChannel {
    reload: u16,
    counter: u16,
    control: u16,
    /// Cycles remaining until the next prescaler tick; reset on enable and on each tick.
    prescaler_remaining: u16,
}

impl TimerChannel {
    const fn prescaler_cycles(self) -> u16 {
        PRESCALER_CYCLES[(self.control & 0b11) as usize]
    }

    const fn enabled(self) -> bool {
        self.control & 0x0080 != 0
    }

    const fn cascade(self) -> bool {
        self.control & 0x0004 != 0
    }

    const fn irq_enabled(self) -> bool {
        self.control & 0x0040 != 0
    }

    /// Advances the counter by one tick (either a prescaler expiry or a cascade pulse).
    /// Returns `true` on overflow, having already reloaded the counter.
    fn tick(&mut self) -> bool {
        let (next, overflowed) = self.counter.overflowing_add(1);
        self.counter = if overflowed { self.reload } else { next };
        overflowed
    }
}

/// Per-cycle outcome of [`Timers::step`]. `overflow` fires whenever a timer wraps past
/// `0xFFFF`, regardless of whether its IRQ is enabled -- cascade chaining and the APU FIFO both
/// key off the raw overflow. `irq` is the gated subset that should actually raise an interrupt.
#[derive(Default, Debug, Clone, Copy)]
pub struct TimerStepResult {
    overflow: [bool; 4],
    irq: [bool; 4],
}

impl TimerStepResult {
    const fn overflowed(self, idx: usize) -> bool {
        self.overflow[idx]
    }

    const fn set(&mut self, idx: usize, overflowed: bool, irq_enabled: bool) {
        self.overflow[idx] = overflowed;
        self.irq[idx] = overflowed && irq_enabled;
    }

    #[must_use]
    pub const fn timer_overflowed(self, idx: usize) -> bool {
        self.overflow[idx]
    }

    #[must_use]
    pub const fn irq_requested(self, idx: usize) -> bool {
        self.irq[idx]
    }
}

#[derive(Default, Serialize, Deserialize)]
pub struct Timers {
    channels: [TimerChannel; 4],
}

impl Timers {
    /// Writes the reload register (`TMxCNT_L` while disabled). Does not touch the live
    /// counter -- the reload only takes effect the next time the timer (re)starts or overflows.
    pub const fn set_reload(&mut self, idx: usize, value: u16) {
        self.channels[idx].reload = value;
    }

    /// Writes the control register (`TMxCNT_H`). On the disabled->enabled edge the counter is
    /// loaded from the reload value and the prescaler restarts from a full period, matching
    /// real hardware (the first tick after starting a timer is a full prescaler period away).
    pub const fn set_control(&mut self, idx: usize, value: u16) {
        let was_enabled = self.channels[idx].enabled();
        self.channels[idx].control = value;
        let now_enabled = self.channels[idx].enabled();
        if now_enabled && !was_enabled {
            self.channels[idx].counter = self.channels[idx].reload;
            self.channels[idx].prescaler_remaining = self.channels[idx].prescaler_cycles();
        }
    }

    /// Advances every timer by one CPU cycle, chaining cascaded overflows in index order.
    pub fn step(&mut self) -> TimerStepResult {
        let mut result = TimerStepResult::default();
        for idx in 0..4 {
            if !self.channels[idx].enabled() {
                continue;
            }
            // Timer 0 has no predecessor; its cascade bit is ignored per hardware behavior.
            if idx > 0 && self.channels[idx].cascade() {
                if result.overflowed(idx - 1) {
                    let overflowed = self.channels[idx].tick();
                    result.set(idx, overflowed, self.channels[idx].irq_enabled());
                }
                continue;
            }
            self.channels[idx].prescaler_remaining = self.channels[idx]
                .prescaler_remaining
                .saturating_sub(1);
            if self.channels[idx].prescaler_remaining == 0 {
                self.channels[idx].prescaler_remaining = self.channels[idx].prescaler_cycles();
                let overflowed = self.channels[idx].tick();
                result.set(idx, overflowed, self.channels[idx].irq_enabled());
            }
        }
        result
    }

    /// Current live counter value, as read back through `TMxCNT_L`.
    #[must_use]
    pub const fn counter(&self, idx: usize) -> u16 {
        self.channels[idx].counter
    }

    #[must_use]
    pub const fn overflowed_unmasked(&self, idx: usize) -> bool {
        self.channels[idx].counter == self.channels[idx].reload
    }

    // -- Flat register accessors, kept for the memory-mapped register dispatch in `Bus`. --

    #[must_use]
    pub const fn tm0cnt_l(&self) -> u16 {
        self.channels[0].counter
    }
    #[must_use]
    pub const fn tm1cnt_l(&self) -> u16 {
        self.channels[1].counter
    }
    #[must_use]
    pub const fn tm2cnt_l(&self) -> u16 {
        self.channels[2].counter
    }
    #[must_use]
    pub const fn tm3cnt_l(&self) -> u16 {
        self.channels[3].counter
    }

    #[must_use]
    pub const fn tm0cnt_h(&self) -> u16 {
        self.channels[0].control
    }
    #[must_use]
    pub const fn tm1cnt_h(&self) -> u16 {
        self.channels[1].control
    }
    #[must_use]
    pub const fn tm2cnt_h(&self) -> u16 {
        self.channels[2].control
    }
    #[must_use]
    pub const fn tm3cnt_h(&self) -> u16 {
        self.channels[3].control
    }

    #[must_use]
    pub const fn reload(&self, idx: usize) -> u16 {
        self.channels[idx].reload
    }

    /// Test-only hook to poke a counter value directly, bypassing the enable-edge latch.
    #[cfg(test)]
    pub const fn set_counter_for_test(&mut self, idx: usize, value: u16) {
        self.channels[idx].counter = value;
    }
}
