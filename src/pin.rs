//! Probe input abstraction.

use crate::polarity::PolarityMask;

/// Trait for abstracting the probe input pin.
///
/// Implement this for your GPIO hardware. The read is performed from the
/// stepper interrupt on every tick, so it must be a plain register read.
pub trait ProbePin {
    /// Returns the raw electrical level of the probe input.
    fn is_high(&mut self) -> bool;

    /// Returns the raw level, or `None` if the read failed.
    ///
    /// Override this for pins whose reads can fail.
    #[inline(always)]
    fn try_is_high(&mut self) -> Option<bool> {
        Some(self.is_high())
    }
}

/// Reads the probe and returns `true` when it is triggered.
///
/// The raw level is normalized through `mask`, so the result is independent of
/// wiring and probing direction. A failed read is never a trigger.
#[inline(always)]
pub fn read_triggered<P: ProbePin + ?Sized>(pin: &mut P, mask: PolarityMask) -> bool {
    match pin.try_is_high() {
        Some(raw) => mask.apply(raw),
        None => false,
    }
}

/// Adapter for any `embedded-hal` input pin.
///
/// A failed read reads as not triggered through [`read_triggered`], whatever the
/// mask. [`ProbePin::is_high`] alone reports it as a low level.
#[cfg(feature = "embedded-hal")]
pub struct HalProbePin<P>(pub P);

#[cfg(feature = "embedded-hal")]
impl<P: embedded_hal::digital::InputPin> ProbePin for HalProbePin<P> {
    #[inline]
    fn is_high(&mut self) -> bool {
        self.0.is_high().unwrap_or(false)
    }

    #[inline]
    fn try_is_high(&mut self) -> Option<bool> {
        self.0.is_high().ok()
    }
}
