//! Trigger polarity derived from wiring and probing direction.

/// XOR mask that turns a raw pin level into "triggered".
///
/// With the internal pull-up the probe idles high and pulls low on contact, so
/// the mask is set unless the invert setting says otherwise. Probing away from
/// the workpiece looks for loss of contact and flips the mask once more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PolarityMask(bool);

impl PolarityMask {
    /// Mask that leaves the raw level unchanged.
    pub const CLEAR: Self = PolarityMask(false);

    /// Mask that inverts the raw level.
    pub const INVERT: Self = PolarityMask(true);

    /// Computes the mask for the given invert setting and probing direction.
    pub const fn configure(invert_pin: bool, is_probe_away: bool) -> Self {
        let mut mask = false;
        if !invert_pin {
            mask = !mask;
        }
        if is_probe_away {
            mask = !mask;
        }
        PolarityMask(mask)
    }

    /// Applies the mask to a raw pin level.
    #[inline(always)]
    pub const fn apply(self, raw: bool) -> bool {
        raw ^ self.0
    }

    /// Returns true if this mask inverts the raw level.
    pub const fn is_inverting(self) -> bool {
        self.0
    }
}
