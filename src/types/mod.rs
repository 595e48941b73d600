// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for the purifier's observable attributes.
//!
//! Each type is a decoded projection of a raw `u16` carried on the wire.
//!
//! # Types
//!
//! - [`PowerState`] - On/Off (`A02`)
//! - [`FanSpeed`] - Speed ordinal 0-4 (`A04`)
//! - [`AirQuality`] - Good/Fair/Poor indicator (`S07`)
//! - [`SensorKind`] - Numeric sensors (`S08`, `S14`, `A21`)
//! - [`SwitchKind`] - Boolean switches (`A07`, `A03`, sleep derived from `A04`)

mod air_quality;
mod fan_speed;
mod kinds;
mod power;

pub use air_quality::AirQuality;
pub use fan_speed::{FanSpeed, RAW_SLEEP, RAW_TURBO};
pub use kinds::{SensorKind, SwitchKind};
pub use power::PowerState;
