// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded attribute changes.
//!
//! A [`StateChange`] is what an observer sees: a raw `A04=5` becomes
//! `StateChange::Speed(FanSpeed::TURBO)`, a raw `S07=2` becomes
//! `StateChange::AirQuality(AirQuality::Fair)`.
//!
//! # Examples
//!
//! ```
//! use winix_bridge::state::{DeviceState, StateChange};
//! use winix_bridge::types::PowerState;
//!
//! let mut state = DeviceState::new();
//!
//! // Apply returns true if state actually changed
//! assert!(state.apply(&StateChange::Power(PowerState::On)));
//!
//! // Applying same change again returns false
//! assert!(!state.apply(&StateChange::Power(PowerState::On)));
//! ```

use crate::types::{AirQuality, FanSpeed, PowerState, SensorKind, SwitchKind};

/// Represents a change of one observable attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StateChange {
    /// Power switched on or off.
    Power(PowerState),

    /// Fan speed ordinal changed.
    Speed(FanSpeed),

    /// Air quality indicator changed.
    AirQuality(AirQuality),

    /// A numeric sensor changed.
    Sensor {
        /// Which sensor.
        kind: SensorKind,
        /// The new raw reading.
        value: u16,
    },

    /// A boolean switch changed.
    Switch {
        /// Which switch.
        kind: SwitchKind,
        /// The new switch state.
        on: bool,
    },
}

impl StateChange {
    /// Creates a sensor change.
    #[must_use]
    pub const fn sensor(kind: SensorKind, value: u16) -> Self {
        Self::Sensor { kind, value }
    }

    /// Creates a switch change.
    #[must_use]
    pub const fn switch(kind: SwitchKind, on: bool) -> Self {
        Self::Switch { kind, on }
    }

    /// Returns `true` if this change belongs to the fan surface (power or speed).
    #[must_use]
    pub fn is_fan(&self) -> bool {
        matches!(self, Self::Power(_) | Self::Speed(_))
    }

    /// Returns `true` if this is a numeric or text sensor change.
    #[must_use]
    pub fn is_sensor(&self) -> bool {
        matches!(self, Self::Sensor { .. } | Self::AirQuality(_))
    }

    /// Returns `true` if this is a switch change.
    #[must_use]
    pub fn is_switch(&self) -> bool {
        matches!(self, Self::Switch { .. })
    }
}
