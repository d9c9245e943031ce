//! Trigger latch: position capture and motion cancel.
//!
//! Provides the [`MotionSystem`] trait for the motion side of the controller and
//! [`ExecFlags`], the real-time execution flag set the motion executor polls.

use portable_atomic::{AtomicU8, Ordering};

/// Real-time execution flags shared between interrupt and foreground code.
///
/// Each bit is an independent request. Bits are posted with `fetch_or`, so
/// concurrent posts from different contexts never lose each other. On targets
/// without atomic read-modify-write, enable the `critical-section` feature.
#[derive(Debug, Default)]
pub struct ExecFlags(AtomicU8);

impl ExecFlags {
    // Bits below are posted and consumed by the host controller. The probe only
    // ever posts `MOTION_CANCEL` and leaves the rest untouched.

    /// Request a status report.
    pub const STATUS_REPORT: u8 = 1 << 0;
    /// Start or resume the queued motion.
    pub const CYCLE_START: u8 = 1 << 1;
    /// Queued motion has finished.
    pub const CYCLE_STOP: u8 = 1 << 2;
    /// Decelerate to a stop and hold.
    pub const FEED_HOLD: u8 = 1 << 3;
    /// Soft reset.
    pub const RESET: u8 = 1 << 4;
    /// Safety door opened.
    pub const SAFETY_DOOR: u8 = 1 << 5;
    /// Cancel the current motion. Posted by the probe on a confirmed trigger.
    pub const MOTION_CANCEL: u8 = 1 << 6;
    /// Enter sleep mode.
    pub const SLEEP: u8 = 1 << 7;

    /// Creates an empty flag set. Usable in a `static`.
    pub const fn new() -> Self {
        ExecFlags(AtomicU8::new(0))
    }

    /// Sets the given bits.
    #[inline]
    pub fn post(&self, bits: u8) {
        self.0.fetch_or(bits, Ordering::AcqRel);
    }

    /// Clears the given bits.
    #[inline]
    pub fn clear(&self, bits: u8) {
        self.0.fetch_and(!bits, Ordering::AcqRel);
    }

    /// Clears all bits and returns the previous set.
    pub fn take(&self) -> u8 {
        self.0.swap(0, Ordering::AcqRel)
    }

    /// Returns true if all of the given bits are set.
    pub fn contains(&self, bits: u8) -> bool {
        self.0.load(Ordering::Acquire) & bits == bits
    }

    /// Returns the raw bit set.
    pub fn bits(&self) -> u8 {
        self.0.load(Ordering::Acquire)
    }
}

/// Machine position in steps, one entry per axis.
pub type Position<const AXES: usize> = [i32; AXES];

/// Trait for the motion subsystem the probe reports into.
pub trait MotionSystem {
    /// Fixed-size position record, usually a [`Position`].
    type Position: Copy;

    /// Returns the live machine position.
    fn machine_position(&self) -> Self::Position;

    /// Overwrites the probe position record.
    fn store_probe_position(&mut self, position: Self::Position);

    /// Returns the real-time execution flags.
    fn exec_flags(&self) -> &ExecFlags;
}

/// Latches the machine position and cancels motion.
///
/// Called exactly once per confirmed trigger, from the stepper interrupt.
#[inline]
pub fn fire<S: MotionSystem + ?Sized>(system: &mut S) {
    let snapshot = system.machine_position();
    system.store_probe_position(snapshot);
    system.exec_flags().post(ExecFlags::MOTION_CANCEL);
}
