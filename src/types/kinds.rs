// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifiers for the numeric sensors and boolean switches.

use std::fmt;

/// A plain numeric sensor, published as its raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SensorKind {
    /// Air quality index (`S08`).
    AirQualityIndex,
    /// Ambient light level (`S14`).
    Light,
    /// Filter age counter in hours (`A21`).
    FilterAge,
}

impl SensorKind {
    /// Returns a stable name for logging.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AirQualityIndex => "aqi",
            Self::Light => "light",
            Self::FilterAge => "filter_age",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A boolean switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SwitchKind {
    /// Plasmawave ionizer (`A07`).
    Plasmawave,
    /// Automatic mode (`A03`).
    Auto,
    /// Sleep mode, derived from `A04` being 6.
    Sleep,
}

impl SwitchKind {
    /// Returns a stable name for logging.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Plasmawave => "plasmawave",
            Self::Auto => "auto",
            Self::Sleep => "sleep",
        }
    }
}

impl fmt::Display for SwitchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
