// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for types that publish purifier state.

use crate::state::{DeviceState, StateChange, StateMap};
use crate::subscription::SubscriptionId;
use crate::types::{AirQuality, FanSpeed, PowerState, SensorKind, SwitchKind};

/// Trait for types that support event subscriptions.
///
/// Presentation surfaces (a fan entity, sensors, switches) subscribe here
/// instead of polling the bridge.
///
/// # Examples
///
/// ```
/// use winix_bridge::subscription::Subscribable;
/// use winix_bridge::transport::{ManualClock, MemoryPort};
/// use winix_bridge::{Bridge, BridgeConfig};
///
/// # fn main() -> winix_bridge::Result<()> {
/// let bridge = Bridge::new(MemoryPort::new(), ManualClock::new(), BridgeConfig::default())?;
///
/// let sub_id = bridge.on_speed_changed(|speed| {
///     println!("Fan speed is now {speed}");
/// });
///
/// bridge.on_sensor_changed(|kind, value| {
///     println!("{kind}: {value}");
/// });
///
/// bridge.unsubscribe(sub_id);
/// # Ok(())
/// # }
/// ```
pub trait Subscribable {
    /// Subscribes to published raw state batches.
    ///
    /// The callback runs once per non-empty publish, before any attribute
    /// callbacks, and sees unknown keys too.
    fn on_states_published<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateMap) + Send + Sync + 'static;

    /// Subscribes to power state changes.
    fn on_power_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(PowerState) + Send + Sync + 'static;

    /// Subscribes to fan speed changes.
    fn on_speed_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(FanSpeed) + Send + Sync + 'static;

    /// Subscribes to air quality indicator changes.
    fn on_air_quality_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(AirQuality) + Send + Sync + 'static;

    /// Subscribes to numeric sensor changes.
    fn on_sensor_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(SensorKind, u16) + Send + Sync + 'static;

    /// Subscribes to switch changes.
    fn on_switch_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(SwitchKind, bool) + Send + Sync + 'static;

    /// Subscribes to connection events.
    ///
    /// The callback is called when the handshake enters `Connected`.
    /// It receives the last-known device state.
    fn on_connected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceState) + Send + Sync + 'static;

    /// Subscribes to disconnection events.
    fn on_disconnected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static;

    /// Subscribes to all state changes.
    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static;

    /// Unsubscribes a callback by its subscription ID.
    ///
    /// Returns `true` if the subscription was found and removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
