//! Shared test infrastructure for probe-monitor integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use core::cell::Cell;
use probe_monitor::{ExecFlags, MotionSystem, Position, ProbePin};

pub const CPU_HZ: u32 = 16_000_000;

// ============================================================================
// Mock Pin
// ============================================================================

/// Probe pin whose level is controlled from the test through a shared cell
pub struct MockPin<'a> {
    level: &'a Cell<bool>,
    reads: &'a Cell<u32>,
}

impl<'a> MockPin<'a> {
    pub fn new(level: &'a Cell<bool>, reads: &'a Cell<u32>) -> Self {
        Self { level, reads }
    }
}

impl ProbePin for MockPin<'_> {
    fn is_high(&mut self) -> bool {
        self.reads.set(self.reads.get() + 1);
        self.level.get()
    }
}

/// Test fixture owning the pin level and read counter
pub struct PinHarness {
    pub level: Cell<bool>,
    pub reads: Cell<u32>,
}

impl PinHarness {
    /// Probe idling high (internal pull-up, default polarity)
    pub fn idle_high() -> Self {
        Self {
            level: Cell::new(true),
            reads: Cell::new(0),
        }
    }

    pub fn pin(&self) -> MockPin<'_> {
        MockPin::new(&self.level, &self.reads)
    }

    /// Pull the pin low, which is contact with the default settings
    pub fn contact(&self) {
        self.level.set(false);
    }

    pub fn release(&self) {
        self.level.set(true);
    }
}

// ============================================================================
// Mock Motion System
// ============================================================================

/// Motion system that records every probe position write
pub struct MockMachine {
    pub position: Position<3>,
    pub probe_position: Position<3>,
    pub flags: ExecFlags,
    pub latch_history: heapless::Vec<Position<3>, 8>,
}

impl MockMachine {
    pub fn new() -> Self {
        Self {
            position: [0; 3],
            probe_position: [0; 3],
            flags: ExecFlags::new(),
            latch_history: heapless::Vec::new(),
        }
    }

    pub fn fire_count(&self) -> usize {
        self.latch_history.len()
    }

    pub fn motion_cancelled(&self) -> bool {
        self.flags.contains(ExecFlags::MOTION_CANCEL)
    }
}

impl MotionSystem for MockMachine {
    type Position = Position<3>;

    fn machine_position(&self) -> Position<3> {
        self.position
    }

    fn store_probe_position(&mut self, position: Position<3>) {
        self.probe_position = position;
        let _ = self.latch_history.push(position);
    }

    fn exec_flags(&self) -> &ExecFlags {
        &self.flags
    }
}

/// Probe pin whose every read fails
pub struct FailingPin;

impl ProbePin for FailingPin {
    fn is_high(&mut self) -> bool {
        false
    }

    fn try_is_high(&mut self) -> Option<bool> {
        None
    }
}
