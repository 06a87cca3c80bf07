//! Decimal precision and scale bounds

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest precision representable in 64 bits
pub const DECIMAL_64_MAX_PRECISION: u8 = 18;

/// Largest precision representable in 128 bits
pub const DECIMAL_128_MAX_PRECISION: u8 = 38;

/// Inclusive precision and scale bounds for a decimal signature entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecimalBounds {
    /// Smallest admitted precision
    pub min_precision: u8,
    /// Largest admitted precision
    pub max_precision: u8,
    /// Smallest admitted scale
    pub min_scale: i8,
    /// Largest admitted scale
    pub max_scale: i8,
}

impl DecimalBounds {
    /// Create bounds from explicit limits
    #[must_use]
    pub const fn new(min_precision: u8, max_precision: u8, min_scale: i8, max_scale: i8) -> Self {
        Self {
            min_precision,
            max_precision,
            min_scale,
            max_scale,
        }
    }

    /// Any precision up to `max_precision` with a non-negative scale not above it
    #[must_use]
    pub const fn up_to(max_precision: u8) -> Self {
        #[allow(clippy::cast_possible_wrap)]
        let max_scale = if max_precision > i8::MAX as u8 {
            i8::MAX
        } else {
            max_precision as i8
        };
        Self::new(1, max_precision, 0, max_scale)
    }

    /// Check that both precision and scale fall inside the bounds
    #[inline]
    #[must_use]
    pub const fn admits(&self, precision: u8, scale: i8) -> bool {
        precision >= self.min_precision
            && precision <= self.max_precision
            && scale >= self.min_scale
            && scale <= self.max_scale
    }

    /// Overlap of two bounds, if any
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let bounds = Self::new(
            self.min_precision.max(other.min_precision),
            self.max_precision.min(other.max_precision),
            self.min_scale.max(other.min_scale),
            self.max_scale.min(other.max_scale),
        );
        (bounds.min_precision <= bounds.max_precision && bounds.min_scale <= bounds.max_scale)
            .then_some(bounds)
    }
}

impl fmt::Display for DecimalBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::up_to(self.max_precision) {
            write!(f, "DECIMAL(p<={})", self.max_precision)
        } else {
            write!(
                f,
                "DECIMAL(p:{}..={},s:{}..={})",
                self.min_precision, self.max_precision, self.min_scale, self.max_scale
            )
        }
    }
}
