//! Cycle-count debounce window for the probe input.
//!
//! Time is measured in CPU cycles divided by 64 so that the stepper ISR can pass
//! a 16-bit counter. Elapsed time is the wrapping difference of two counter
//! values, which stays unambiguous as long as the threshold is well inside the
//! 16-bit period. [`MAX_DEBOUNCE_THRESHOLD`] enforces that.

/// Upper bound for a debounce threshold, in CPU cycles / 64.
pub const MAX_DEBOUNCE_THRESHOLD: u16 = 49152;

/// Divider between CPU cycles and the scaled counter passed to the tick.
pub const CYCLE_DIVIDER: u32 = 64;

/// Minimum sustained-trigger time, in CPU cycles / 64.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebounceThreshold(u16);

impl DebounceThreshold {
    /// No debounce; a trigger is confirmed on the tick after it is first seen.
    pub const ZERO: Self = DebounceThreshold(0);

    /// Largest representable window.
    pub const MAX: Self = DebounceThreshold(MAX_DEBOUNCE_THRESHOLD);

    /// Converts a debounce time in milliseconds to scaled cycles.
    ///
    /// Values that would exceed [`MAX_DEBOUNCE_THRESHOLD`] are clamped to it.
    /// Negative and NaN inputs give a zero threshold. This is the only floating
    /// point work in the crate and must not run inside the interrupt.
    pub fn from_millis(millis: f32, cpu_hz: u32) -> Self {
        let ticks_per_second = (cpu_hz / CYCLE_DIVIDER) as f32;

        if millis > MAX_DEBOUNCE_THRESHOLD as f32 * 1000.0 / ticks_per_second {
            // Anything larger would get close to the counter period and the
            // probe might never trigger.
            return Self::MAX;
        }

        // Float to int casts saturate, and NaN maps to zero.
        DebounceThreshold((ticks_per_second * (millis / 1000.0)) as u16)
    }

    /// Creates a threshold from raw scaled cycles, clamped to the maximum.
    pub const fn from_scaled_cycles(cycles: u16) -> Self {
        if cycles > MAX_DEBOUNCE_THRESHOLD {
            Self::MAX
        } else {
            DebounceThreshold(cycles)
        }
    }

    /// Returns the threshold in CPU cycles / 64.
    pub const fn scaled_cycles(self) -> u16 {
        self.0
    }
}

/// Settling state of the debounce window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DebounceSession {
    /// Probe not triggered, or a trigger was just confirmed.
    #[default]
    Idle,
    /// Probe reads triggered since `start`.
    Settling {
        /// Scaled cycle counter value when the trigger was first seen.
        start: u16,
    },
}

/// Result of one debounce tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Probe is not triggered.
    Idle,
    /// Probe is triggered but the window has not elapsed yet.
    Settling,
    /// Trigger confirmed on this tick.
    Triggered,
}

/// Per-tick debounce state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Debouncer {
    session: DebounceSession,
}

impl Debouncer {
    /// Creates an idle debouncer.
    pub const fn new() -> Self {
        Self {
            session: DebounceSession::Idle,
        }
    }

    /// Advances the state machine by one tick.
    ///
    /// `now` is the scaled cycle counter. Integer compares only; safe for the
    /// stepper interrupt.
    #[inline]
    pub fn tick(
        &mut self,
        triggered: bool,
        now: u16,
        threshold: DebounceThreshold,
        ignore_debounce: bool,
    ) -> TickOutcome {
        if !triggered {
            self.session = DebounceSession::Idle;
            return TickOutcome::Idle;
        }

        let confirmed = ignore_debounce
            || match self.session {
                DebounceSession::Settling { start } => now.wrapping_sub(start) >= threshold.0,
                DebounceSession::Idle => false,
            };

        if confirmed {
            self.session = DebounceSession::Idle;
            return TickOutcome::Triggered;
        }

        if self.session == DebounceSession::Idle {
            self.session = DebounceSession::Settling { start: now };
        }
        TickOutcome::Settling
    }

    /// Discards any settling state.
    pub fn reset(&mut self) {
        self.session = DebounceSession::Idle;
    }

    /// Returns the current session.
    pub fn session(&self) -> DebounceSession {
        self.session
    }
}
