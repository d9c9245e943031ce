#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`ProbeMonitor`**: Debounces the probe and latches position on a confirmed trigger
//! - **`ProbeControl`**: Atomics shared between foreground code and the stepper interrupt
//! - **`ProbePin`**: Trait to implement for your probe input hardware
//! - **`MotionSystem`**: Trait to implement for your position tracker and execution flags
//! - **`ExecFlags`**: Real-time execution flag set, including `MOTION_CANCEL`
//! - **`PolarityMask`**: Normalizes the raw pin level to "triggered"
//! - **`DebounceThreshold`**: Debounce window in CPU cycles / 64, at most 49152
//! - **`ProbeConfig`**: Settings for clock, pin inversion and debounce time
//!
//! The stepper interrupt calls [`ProbeMonitor::on_isr_tick`] with the cycle counter
//! divided by 64. Everything on that path is integer-only.

/// Debug log through `defmt` when the feature is enabled.
macro_rules! log_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::debug!($($arg)*);
    };
}

/// Warning log through `defmt` when the feature is enabled.
macro_rules! log_warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::warn!($($arg)*);
    };
}

pub(crate) use {log_debug, log_warn};

pub mod config;
pub mod debounce;
pub mod latch;
pub mod monitor;
pub mod pin;
pub mod polarity;

pub use config::{ConfigError, DEFAULT_CPU_HZ, ProbeConfig, ProbeConfigBuilder};
pub use debounce::{
    DebounceSession, DebounceThreshold, Debouncer, MAX_DEBOUNCE_THRESHOLD, TickOutcome,
};
pub use latch::{ExecFlags, MotionSystem, Position};
pub use monitor::{ProbeControl, ProbeError, ProbeMonitor, ProbeOutcome, ProbeState};
pub use pin::{ProbePin, read_triggered};
pub use polarity::PolarityMask;

#[cfg(feature = "embedded-hal")]
pub use pin::HalProbePin;
