//! Probe monitor tying the pin, debounce window and trigger latch together.
//!
//! [`ProbeMonitor`] is owned by the stepper interrupt side. The few values the
//! foreground needs to touch while the interrupt runs live in [`ProbeControl`],
//! which only holds atomics and can be placed in a `static`.

use portable_atomic::{AtomicBool, Ordering};

use crate::config::ProbeConfig;
use crate::debounce::{DebounceSession, DebounceThreshold, Debouncer, TickOutcome};
use crate::latch::{self, MotionSystem};
use crate::pin::{ProbePin, read_triggered};
use crate::polarity::PolarityMask;

/// Whether the stepper interrupt should monitor the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProbeState {
    /// Not probing. Ticks from the interrupt are ignored.
    Off,
    /// Probing cycle in progress.
    Active,
}

/// Probe state shared between the foreground and the stepper interrupt.
#[derive(Debug, Default)]
pub struct ProbeControl {
    ignore_debounce: AtomicBool,
    active: AtomicBool,
}

impl ProbeControl {
    /// Creates a control block with debounce enabled and probing off.
    pub const fn new() -> Self {
        Self {
            ignore_debounce: AtomicBool::new(false),
            active: AtomicBool::new(false),
        }
    }

    /// Accept a trigger on the first triggered tick, skipping the debounce window.
    pub fn set_ignore_debounce(&self, ignore: bool) {
        self.ignore_debounce.store(ignore, Ordering::Release);
    }

    /// Returns the ignore-debounce flag.
    pub fn ignore_debounce(&self) -> bool {
        self.ignore_debounce.load(Ordering::Acquire)
    }

    /// Returns the current probe state.
    pub fn state(&self) -> ProbeState {
        if self.active.load(Ordering::Acquire) {
            ProbeState::Active
        } else {
            ProbeState::Off
        }
    }

    fn set_state(&self, state: ProbeState) {
        self.active.store(state == ProbeState::Active, Ordering::Release);
    }
}

/// Result of a probing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProbeOutcome {
    /// The probe triggered and its position was latched.
    Contact,
    /// The cycle ended without a trigger.
    NoContact,
}

/// Errors from starting a probing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProbeError {
    /// The probe already reads triggered before any motion.
    AlreadyTriggered,
    /// A probing cycle is already active.
    CycleActive,
}

impl core::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProbeError::AlreadyTriggered => {
                write!(f, "probe is already triggered at cycle start")
            }
            ProbeError::CycleActive => {
                write!(f, "a probing cycle is already active")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ProbeError {}

/// Debounces the probe input and latches position on a confirmed trigger.
///
/// # Type Parameters
/// * `'c` - Lifetime of the shared control block
/// * `P` - Probe pin implementation type
pub struct ProbeMonitor<'c, P: ProbePin> {
    pin: P,
    control: &'c ProbeControl,
    config: ProbeConfig,
    mask: PolarityMask,
    threshold: DebounceThreshold,
    debouncer: Debouncer,
    cycle_armed: bool,
}

impl<'c, P: ProbePin> ProbeMonitor<'c, P> {
    /// Creates a monitor set up for probing toward the workpiece.
    pub fn new(pin: P, control: &'c ProbeControl, config: ProbeConfig) -> Self {
        let mut monitor = Self {
            pin,
            control,
            config,
            mask: PolarityMask::CLEAR,
            threshold: DebounceThreshold::ZERO,
            debouncer: Debouncer::new(),
            cycle_armed: false,
        };
        monitor.apply_config(config);
        monitor
    }

    /// Re-derives mask and threshold after a settings change.
    pub fn apply_config(&mut self, config: ProbeConfig) {
        self.config = config;
        self.configure(false);
        self.set_debounce(config.debounce_ms);
    }

    /// Sets the polarity mask for the probing direction.
    pub fn configure(&mut self, is_probe_away: bool) {
        self.mask = self.config.mask(is_probe_away);
    }

    /// Sets the debounce time in milliseconds.
    ///
    /// Uses floating point; never call from the interrupt. The value is kept in
    /// the active configuration, with negative times stored as zero.
    pub fn set_debounce(&mut self, millis: f32) {
        self.config.debounce_ms = if millis < 0.0 { 0.0 } else { millis };
        self.threshold = DebounceThreshold::from_millis(millis, self.config.cpu_hz);
        if self.threshold == DebounceThreshold::MAX {
            crate::log_warn!("probe debounce clamped to {} scaled cycles", self.threshold);
        } else {
            crate::log_debug!("probe debounce set to {} scaled cycles", self.threshold);
        }
    }

    /// Discards any settling state from a previous cycle.
    pub fn reset_session(&mut self) {
        self.debouncer.reset();
    }

    /// Sets the ignore-debounce flag. See [`ProbeControl::set_ignore_debounce`].
    pub fn set_ignore_debounce(&self, ignore: bool) {
        self.control.set_ignore_debounce(ignore);
    }

    /// Reads the probe. Triggered = true.
    #[inline]
    pub fn is_triggered(&mut self) -> bool {
        read_triggered(&mut self.pin, self.mask)
    }

    /// Runs one debounce step and fires the latch on a confirmed trigger.
    ///
    /// `cycle_div64` is the stepper cycle counter divided by 64.
    #[inline]
    pub fn tick<S: MotionSystem + ?Sized>(
        &mut self,
        cycle_div64: u16,
        system: &mut S,
    ) -> TickOutcome {
        let triggered = read_triggered(&mut self.pin, self.mask);
        let outcome = self.debouncer.tick(
            triggered,
            cycle_div64,
            self.threshold,
            self.control.ignore_debounce(),
        );
        if outcome == TickOutcome::Triggered {
            latch::fire(system);
        }
        outcome
    }

    /// Stepper interrupt entry point.
    ///
    /// Monitors the probe only while a cycle is active, and ends monitoring on
    /// the first confirmed trigger.
    #[inline]
    pub fn on_isr_tick<S: MotionSystem + ?Sized>(
        &mut self,
        cycle_div64: u16,
        system: &mut S,
    ) -> TickOutcome {
        if self.control.state() != ProbeState::Active {
            return TickOutcome::Idle;
        }
        let outcome = self.tick(cycle_div64, system);
        if outcome == TickOutcome::Triggered {
            self.control.set_state(ProbeState::Off);
        }
        outcome
    }

    /// Arms the monitor for a probing cycle.
    ///
    /// Fails if the probe already reads triggered in the requested direction;
    /// the mask is restored to toward-workpiece in that case.
    pub fn begin_cycle(&mut self, is_probe_away: bool) -> Result<(), ProbeError> {
        if self.control.state() == ProbeState::Active {
            return Err(ProbeError::CycleActive);
        }

        self.configure(is_probe_away);
        if self.is_triggered() {
            crate::log_warn!("probe triggered before cycle start");
            self.configure(false);
            return Err(ProbeError::AlreadyTriggered);
        }

        self.reset_session();
        self.cycle_armed = true;
        self.control.set_state(ProbeState::Active);
        crate::log_debug!("probe cycle armed, away = {}", is_probe_away);
        Ok(())
    }

    /// Disarms the monitor and reports whether the cycle made contact.
    pub fn end_cycle(&mut self) -> ProbeOutcome {
        let outcome = if self.cycle_armed && self.control.state() == ProbeState::Off {
            ProbeOutcome::Contact
        } else {
            ProbeOutcome::NoContact
        };

        self.control.set_state(ProbeState::Off);
        self.cycle_armed = false;
        self.reset_session();
        self.configure(false);
        crate::log_debug!("probe cycle ended: {}", outcome);
        outcome
    }

    /// Returns the current probe state.
    pub fn state(&self) -> ProbeState {
        self.control.state()
    }

    /// Returns the active polarity mask.
    pub fn mask(&self) -> PolarityMask {
        self.mask
    }

    /// Returns the cached debounce threshold.
    pub fn threshold(&self) -> DebounceThreshold {
        self.threshold
    }

    /// Returns the debounce session.
    pub fn session(&self) -> DebounceSession {
        self.debouncer.session()
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Releases the probe pin.
    pub fn release(self) -> P {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latch::ExecFlags;
    use core::cell::Cell;

    struct SharedPin<'a>(&'a Cell<bool>);

    impl ProbePin for SharedPin<'_> {
        fn is_high(&mut self) -> bool {
            self.0.get()
        }
    }

    struct Machine {
        position: [i32; 2],
        probe_position: [i32; 2],
        flags: ExecFlags,
    }

    impl MotionSystem for Machine {
        type Position = [i32; 2];

        fn machine_position(&self) -> [i32; 2] {
            self.position
        }

        fn store_probe_position(&mut self, position: [i32; 2]) {
            self.probe_position = position;
        }

        fn exec_flags(&self) -> &ExecFlags {
            &self.flags
        }
    }

    fn machine() -> Machine {
        Machine {
            position: [10, 20],
            probe_position: [0; 2],
            flags: ExecFlags::new(),
        }
    }

    #[test]
    fn new_sets_toward_mask_and_threshold() {
        let level = Cell::new(true);
        let control = ProbeControl::new();
        let config = ProbeConfig {
            debounce_ms: 1.0,
            ..ProbeConfig::default()
        };
        let monitor = ProbeMonitor::new(SharedPin(&level), &control, config);

        assert_eq!(monitor.mask(), PolarityMask::INVERT);
        assert_eq!(monitor.threshold().scaled_cycles(), 250);
        assert_eq!(monitor.state(), ProbeState::Off);
    }

    #[test]
    fn isr_tick_is_ignored_while_off() {
        // Pull-up idles high; low means contact
        let level = Cell::new(false);
        let control = ProbeControl::new();
        let mut monitor = ProbeMonitor::new(SharedPin(&level), &control, ProbeConfig::default());
        let mut sys = machine();

        control.set_ignore_debounce(true);
        assert_eq!(monitor.on_isr_tick(0, &mut sys), TickOutcome::Idle);
        assert_eq!(sys.flags.bits(), 0);
    }

    #[test]
    fn isr_trigger_disarms_monitor() {
        let level = Cell::new(true);
        let control = ProbeControl::new();
        let mut monitor = ProbeMonitor::new(SharedPin(&level), &control, ProbeConfig::default());
        let mut sys = machine();

        monitor.begin_cycle(false).unwrap();
        assert_eq!(monitor.state(), ProbeState::Active);

        level.set(false);
        assert_eq!(monitor.on_isr_tick(0, &mut sys), TickOutcome::Settling);
        assert_eq!(monitor.on_isr_tick(1, &mut sys), TickOutcome::Triggered);
        assert_eq!(monitor.state(), ProbeState::Off);
        assert_eq!(monitor.on_isr_tick(2, &mut sys), TickOutcome::Idle);
        assert_eq!(monitor.end_cycle(), ProbeOutcome::Contact);
    }

    #[test]
    fn begin_cycle_twice_is_rejected() {
        let level = Cell::new(true);
        let control = ProbeControl::new();
        let mut monitor = ProbeMonitor::new(SharedPin(&level), &control, ProbeConfig::default());

        monitor.begin_cycle(false).unwrap();
        assert_eq!(monitor.begin_cycle(false), Err(ProbeError::CycleActive));
    }

    #[test]
    fn release_returns_pin() {
        let level = Cell::new(true);
        let control = ProbeControl::new();
        let monitor = ProbeMonitor::new(SharedPin(&level), &control, ProbeConfig::default());
        let mut pin = monitor.release();
        assert!(pin.is_high());
    }
}
