//! Probe settings supplied by the controller's settings store.

use crate::debounce::{CYCLE_DIVIDER, DebounceThreshold};
use crate::polarity::PolarityMask;

/// Default CPU clock, in Hz.
pub const DEFAULT_CPU_HZ: u32 = 16_000_000;

/// Settings that determine probe polarity and debounce timing.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProbeConfig {
    /// CPU clock driving the stepper cycle counter.
    pub cpu_hz: u32,

    /// Invert the probe pin. Set for probes that idle low and go high on contact.
    pub invert_pin: bool,

    /// Debounce time in milliseconds.
    pub debounce_ms: f32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            cpu_hz: DEFAULT_CPU_HZ,
            invert_pin: false,
            debounce_ms: 0.0,
        }
    }
}

impl ProbeConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ProbeConfigBuilder {
        ProbeConfigBuilder::new()
    }

    /// Debounce threshold for this configuration.
    pub fn threshold(&self) -> DebounceThreshold {
        DebounceThreshold::from_millis(self.debounce_ms, self.cpu_hz)
    }

    /// Polarity mask for the given probing direction.
    pub fn mask(&self, is_probe_away: bool) -> PolarityMask {
        PolarityMask::configure(self.invert_pin, is_probe_away)
    }
}

/// Builder for [`ProbeConfig`] with validation.
#[derive(Debug, Clone, Copy)]
pub struct ProbeConfigBuilder {
    config: ProbeConfig,
}

impl ProbeConfigBuilder {
    /// Creates a builder starting from the default settings.
    pub fn new() -> Self {
        Self {
            config: ProbeConfig::default(),
        }
    }

    /// Sets the CPU clock frequency.
    pub fn cpu_hz(mut self, cpu_hz: u32) -> Self {
        self.config.cpu_hz = cpu_hz;
        self
    }

    /// Sets the invert-probe-pin flag.
    pub fn invert_pin(mut self, invert: bool) -> Self {
        self.config.invert_pin = invert;
        self
    }

    /// Sets the debounce time in milliseconds.
    pub fn debounce_ms(mut self, millis: f32) -> Self {
        self.config.debounce_ms = millis;
        self
    }

    /// Validates and builds the configuration.
    ///
    /// Negative debounce times are clamped to zero.
    pub fn build(mut self) -> Result<ProbeConfig, ConfigError> {
        if self.config.cpu_hz < CYCLE_DIVIDER {
            return Err(ConfigError::CpuFrequencyTooLow);
        }
        if !self.config.debounce_ms.is_finite() {
            return Err(ConfigError::InvalidDebounce);
        }
        if self.config.debounce_ms < 0.0 {
            self.config.debounce_ms = 0.0;
        }
        Ok(self.config)
    }
}

impl Default for ProbeConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// CPU clock is below one scaled cycle per second.
    CpuFrequencyTooLow,

    /// Debounce time is NaN or infinite.
    InvalidDebounce,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::CpuFrequencyTooLow => {
                write!(f, "cpu frequency must be at least {} Hz", CYCLE_DIVIDER)
            }
            ConfigError::InvalidDebounce => {
                write!(f, "debounce time must be a finite number of milliseconds")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
