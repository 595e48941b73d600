// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state management types.
//!
//! Raw values arrive as a [`StateMap`] of wire keys to integers. Deltas are
//! collected in [`PendingStates`] until the publish step, which runs them
//! through the decode table into [`StateChange`]s and folds them into the
//! last-known [`DeviceState`].
//!
//! # Examples
//!
//! ```
//! use winix_bridge::state::{DeviceState, PendingStates, StateMap};
//! use winix_bridge::types::PowerState;
//!
//! let mut pending = PendingStates::new();
//! pending.merge([("A02", 1)].into_iter().collect::<StateMap>());
//!
//! let mut state = DeviceState::new();
//! let changes = state.apply_delta(&pending.take());
//!
//! assert_eq!(changes.len(), 1);
//! assert_eq!(state.power(), Some(PowerState::On));
//! assert!(pending.is_empty());
//! ```

mod device_state;
mod state_change;
mod state_map;

pub use device_state::{DeviceState, decode};
pub use state_change::StateChange;
pub use state_map::{AttributeKey, PendingStates, StateMap};
