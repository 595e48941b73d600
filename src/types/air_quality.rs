// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Air quality indicator level reported through `S07`.

use std::fmt;

use crate::error::ValueError;

/// Air quality indicator (the purifier's "stoplight").
///
/// # Examples
///
/// ```
/// use winix_bridge::types::AirQuality;
///
/// assert_eq!(AirQuality::try_from(2).unwrap(), AirQuality::Fair);
/// assert_eq!(AirQuality::Poor.as_str(), "Poor");
/// assert!(AirQuality::try_from(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AirQuality {
    /// Raw value 1.
    Good,
    /// Raw value 2.
    Fair,
    /// Raw value 3.
    Poor,
}

impl AirQuality {
    /// Returns the text rendered by a text sensor.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }

    /// Returns the raw wire value.
    #[must_use]
    pub const fn to_raw(self) -> u16 {
        match self {
            Self::Good => 1,
            Self::Fair => 2,
            Self::Poor => 3,
        }
    }
}

impl fmt::Display for AirQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u16> for AirQuality {
    type Error = ValueError;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(Self::Good),
            2 => Ok(Self::Fair),
            3 => Ok(Self::Poor),
            other => Err(ValueError::InvalidAirQuality(other)),
        }
    }
}
