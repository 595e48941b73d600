// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Control requests sent to the purifier.
//!
//! A [`ControlRequest`] names the attributes a caller wants changed. The
//! bridge diffs it against the last-known state so only real changes reach
//! the wire, encoded as a single `AWS_RECV:A211` sentence.
//!
//! # Wire values
//!
//! | Request | Key | Raw |
//! |---------|-----|-----|
//! | power on / off | `A02` | `1` / `0` |
//! | speed 0-3 / 4 | `A04` | ordinal / `5` |
//! | sleep on / off | `A04` | `6` / `1` (or the requested speed) |
//! | plasmawave on / off | `A07` | `1` / `0` |
//! | auto on / off | `A03` | `1` / `2` |
//!
//! # Examples
//!
//! ```
//! use winix_bridge::command::ControlRequest;
//! use winix_bridge::state::DeviceState;
//! use winix_bridge::types::{FanSpeed, PowerState};
//!
//! let request = ControlRequest::new()
//!     .with_power(PowerState::On)
//!     .with_speed(FanSpeed::TURBO);
//!
//! let delta = request.diff(&DeviceState::new());
//! assert_eq!(delta.get("A02"), Some(1));
//! assert_eq!(delta.get("A04"), Some(5));
//! ```

mod control;

pub use control::ControlRequest;
