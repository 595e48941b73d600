// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power state of the purifier.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Represents the power state of the purifier (`A02`).
///
/// # Examples
///
/// ```
/// use winix_bridge::types::PowerState;
///
/// assert_eq!(PowerState::from_raw(1), PowerState::On);
/// assert_eq!(PowerState::from_raw(0), PowerState::Off);
/// assert_eq!(PowerState::On.to_raw(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PowerState {
    /// Power is off.
    Off,
    /// Power is on.
    On,
}

impl PowerState {
    /// Decodes the raw wire value. Only `1` means on.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        if raw == 1 { Self::On } else { Self::Off }
    }

    /// Returns the raw wire value.
    #[must_use]
    pub const fn to_raw(self) -> u16 {
        match self {
            Self::Off => 0,
            Self::On => 1,
        }
    }

    /// Returns `true` if the power is on.
    #[must_use]
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    /// Returns the display string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PowerState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OFF" | "0" | "FALSE" => Ok(Self::Off),
            "ON" | "1" | "TRUE" => Ok(Self::On),
            _ => Err(ValueError::InvalidPowerState(s.to_string())),
        }
    }
}

impl From<bool> for PowerState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

impl From<PowerState> for bool {
    fn from(value: PowerState) -> Self {
        value.is_on()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_is_on() {
        assert_eq!(PowerState::from_raw(1), PowerState::On);
        assert_eq!(PowerState::from_raw(0), PowerState::Off);
        assert_eq!(PowerState::from_raw(2), PowerState::Off);
    }

    #[test]
    fn raw_values() {
        assert_eq!(PowerState::On.to_raw(), 1);
        assert_eq!(PowerState::Off.to_raw(), 0);
    }

    #[test]
    fn from_str_accepts_common_forms() {
        assert_eq!("on".parse::<PowerState>().unwrap(), PowerState::On);
        assert_eq!("0".parse::<PowerState>().unwrap(), PowerState::Off);
        assert!("maybe".parse::<PowerState>().is_err());
    }

    #[test]
    fn bool_conversions() {
        assert_eq!(PowerState::from(true), PowerState::On);
        assert!(!bool::from(PowerState::Off));
    }
}
