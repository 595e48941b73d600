// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan speed ordinal.
//!
//! The MCU reports fan speed through the `A04` key using raw mode values:
//!
//! | Raw | Mode   | Ordinal |
//! |-----|--------|---------|
//! | 1   | Low    | 1       |
//! | 2   | Medium | 2       |
//! | 3   | High   | 3       |
//! | 5   | Turbo  | 4       |
//! | 6   | Sleep  | 0       |
//!
//! Raw values not listed here are passed through unchanged. Firmware that
//! introduces new modes will surface them as out-of-range ordinals.

use std::fmt;

use crate::error::ValueError;

/// Raw `A04` value reported for turbo mode.
pub const RAW_TURBO: u16 = 5;

/// Raw `A04` value reported for sleep mode.
pub const RAW_SLEEP: u16 = 6;

/// Fan speed ordinal as presented to a fan control surface (0-4).
///
/// # Examples
///
/// ```
/// use winix_bridge::types::FanSpeed;
///
/// // Turbo is reported as raw 5 and presented as the top ordinal
/// let speed = FanSpeed::from_raw(5);
/// assert_eq!(speed, FanSpeed::TURBO);
/// assert_eq!(speed.to_raw(), 5);
///
/// // Control surfaces can only request ordinals 0-4
/// assert!(FanSpeed::new(5).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FanSpeed(u16);

impl FanSpeed {
    /// Lowest ordinal.
    pub const MIN: u16 = 0;

    /// Highest ordinal.
    pub const MAX: u16 = 4;

    /// Ordinal 0, reported while the purifier is in sleep mode.
    pub const SLEEP: Self = Self(0);

    /// Low speed.
    pub const LOW: Self = Self(1);

    /// Medium speed.
    pub const MEDIUM: Self = Self(2);

    /// High speed.
    pub const HIGH: Self = Self(3);

    /// Turbo speed.
    pub const TURBO: Self = Self(4);

    /// Creates a speed from an ordinal.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the ordinal is outside [0, 4].
    pub fn new(ordinal: u16) -> Result<Self, ValueError> {
        if ordinal > Self::MAX {
            return Err(ValueError::OutOfRange {
                min: Self::MIN,
                max: Self::MAX,
                actual: ordinal,
            });
        }
        Ok(Self(ordinal))
    }

    /// Decodes a raw `A04` value.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        match raw {
            RAW_TURBO => Self::TURBO,
            RAW_SLEEP => Self::SLEEP,
            other => Self(other),
        }
    }

    /// Encodes the ordinal back to its raw `A04` value.
    ///
    /// Ordinal 0 is written as-is; sleep mode is requested explicitly via
    /// the sleep switch.
    #[must_use]
    pub const fn to_raw(self) -> u16 {
        if self.0 == Self::TURBO.0 {
            RAW_TURBO
        } else {
            self.0
        }
    }

    /// Returns the ordinal.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for FanSpeed {
    type Error = ValueError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
