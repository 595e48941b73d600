// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for purifier state subscriptions.
//!
//! This module provides the core types for managing subscription callbacks:
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry for storing and dispatching callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::state::{DeviceState, StateChange, StateMap};
use crate::types::{AirQuality, FanSpeed, PowerState, SensorKind, SwitchKind};

/// Unique identifier for a subscription.
///
/// This ID is returned when creating a subscription and can be used to
/// unsubscribe later. IDs are unique within a registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

type StatesCallback = Arc<dyn Fn(&StateMap) + Send + Sync>;
type PowerCallback = Arc<dyn Fn(PowerState) + Send + Sync>;
type SpeedCallback = Arc<dyn Fn(FanSpeed) + Send + Sync>;
type AirQualityCallback = Arc<dyn Fn(AirQuality) + Send + Sync>;
type SensorCallback = Arc<dyn Fn(SensorKind, u16) + Send + Sync>;
type SwitchCallback = Arc<dyn Fn(SwitchKind, bool) + Send + Sync>;
type ConnectedCallback = Arc<dyn Fn(&DeviceState) + Send + Sync>;
type DisconnectedCallback = Arc<dyn Fn() + Send + Sync>;
type StateChangedCallback = Arc<dyn Fn(&StateChange) + Send + Sync>;

/// Registry for managing state subscription callbacks.
///
/// It uses interior mutability via `parking_lot::RwLock`, so callbacks can be
/// registered through a shared reference while the bridge is running.
///
/// # Thread Safety
///
/// The registry is fully thread-safe. Callbacks are wrapped in `Arc` so they
/// can be cloned cheaply.
pub struct CallbackRegistry {
    next_id: AtomicU64,
    /// Raw state map callbacks, once per published batch.
    states_callbacks: RwLock<HashMap<SubscriptionId, StatesCallback>>,
    power_callbacks: RwLock<HashMap<SubscriptionId, PowerCallback>>,
    speed_callbacks: RwLock<HashMap<SubscriptionId, SpeedCallback>>,
    air_quality_callbacks: RwLock<HashMap<SubscriptionId, AirQualityCallback>>,
    sensor_callbacks: RwLock<HashMap<SubscriptionId, SensorCallback>>,
    switch_callbacks: RwLock<HashMap<SubscriptionId, SwitchCallback>>,
    /// Connected callbacks (called when the handshake reaches `Connected`).
    connected_callbacks: RwLock<HashMap<SubscriptionId, ConnectedCallback>>,
    /// Disconnected callbacks (called on the MCU's disconnect notice).
    disconnected_callbacks: RwLock<HashMap<SubscriptionId, DisconnectedCallback>>,
    /// Generic state change callbacks (receives all changes).
    state_changed_callbacks: RwLock<HashMap<SubscriptionId, StateChangedCallback>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            states_callbacks: RwLock::new(HashMap::new()),
            power_callbacks: RwLock::new(HashMap::new()),
            speed_callbacks: RwLock::new(HashMap::new()),
            air_quality_callbacks: RwLock::new(HashMap::new()),
            sensor_callbacks: RwLock::new(HashMap::new()),
            switch_callbacks: RwLock::new(HashMap::new()),
            connected_callbacks: RwLock::new(HashMap::new()),
            disconnected_callbacks: RwLock::new(HashMap::new()),
            state_changed_callbacks: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration methods
    // =========================================================================

    /// Registers a callback for published raw state batches.
    ///
    /// The callback receives every key of the batch, known or not.
    pub fn on_states_published<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateMap) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.states_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for power state changes.
    pub fn on_power_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(PowerState) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.power_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for fan speed changes.
    pub fn on_speed_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(FanSpeed) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.speed_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for air quality indicator changes.
    pub fn on_air_quality_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(AirQuality) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.air_quality_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for numeric sensor changes.
    pub fn on_sensor_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(SensorKind, u16) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.sensor_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for switch changes.
    pub fn on_switch_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(SwitchKind, bool) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.switch_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for when the session becomes connected.
    ///
    /// The callback receives the last-known device state.
    pub fn on_connected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceState) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.connected_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for when the MCU reports a disconnect.
    pub fn on_disconnected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.disconnected_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for all state changes.
    pub fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.state_changed_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    // =========================================================================
    // Unsubscription
    // =========================================================================

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.states_callbacks.write().remove(&id).is_some()
            || self.power_callbacks.write().remove(&id).is_some()
            || self.speed_callbacks.write().remove(&id).is_some()
            || self.air_quality_callbacks.write().remove(&id).is_some()
            || self.sensor_callbacks.write().remove(&id).is_some()
            || self.switch_callbacks.write().remove(&id).is_some()
            || self.connected_callbacks.write().remove(&id).is_some()
            || self.disconnected_callbacks.write().remove(&id).is_some()
            || self.state_changed_callbacks.write().remove(&id).is_some()
    }

    /// Clears all callbacks.
    pub fn clear(&self) {
        self.states_callbacks.write().clear();
        self.power_callbacks.write().clear();
        self.speed_callbacks.write().clear();
        self.air_quality_callbacks.write().clear();
        self.sensor_callbacks.write().clear();
        self.switch_callbacks.write().clear();
        self.connected_callbacks.write().clear();
        self.disconnected_callbacks.write().clear();
        self.state_changed_callbacks.write().clear();
    }

    // =========================================================================
    // Dispatch methods
    // =========================================================================

    /// Dispatches a published batch to raw state map callbacks.
    pub fn dispatch_published(&self, states: &StateMap) {
        let callbacks = self.states_callbacks.read();
        for callback in callbacks.values() {
            callback(states);
        }
    }

    /// Dispatches a state change to relevant callbacks.
    ///
    /// Generic callbacks run first, then the ones matching the change type.
    /// Callbacks are called synchronously in an arbitrary order.
    pub fn dispatch(&self, change: &StateChange) {
        {
            let callbacks = self.state_changed_callbacks.read();
            for callback in callbacks.values() {
                callback(change);
            }
        }

        match *change {
            StateChange::Power(state) => {
                let callbacks = self.power_callbacks.read();
                for callback in callbacks.values() {
                    callback(state);
                }
            }
            StateChange::Speed(speed) => {
                let callbacks = self.speed_callbacks.read();
                for callback in callbacks.values() {
                    callback(speed);
                }
            }
            StateChange::AirQuality(level) => {
                let callbacks = self.air_quality_callbacks.read();
                for callback in callbacks.values() {
                    callback(level);
                }
            }
            StateChange::Sensor { kind, value } => {
                let callbacks = self.sensor_callbacks.read();
                for callback in callbacks.values() {
                    callback(kind, value);
                }
            }
            StateChange::Switch { kind, on } => {
                let callbacks = self.switch_callbacks.read();
                for callback in callbacks.values() {
                    callback(kind, on);
                }
            }
        }
    }

    /// Dispatches the connected event with the last-known device state.
    pub fn dispatch_connected(&self, state: &DeviceState) {
        let callbacks = self.connected_callbacks.read();
        for callback in callbacks.values() {
            callback(state);
        }
    }

    /// Dispatches the disconnected event.
    pub fn dispatch_disconnected(&self) {
        let callbacks = self.disconnected_callbacks.read();
        for callback in callbacks.values() {
            callback();
        }
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.states_callbacks.read().len()
            + self.power_callbacks.read().len()
            + self.speed_callbacks.read().len()
            + self.air_quality_callbacks.read().len()
            + self.sensor_callbacks.read().len()
            + self.switch_callbacks.read().len()
            + self.connected_callbacks.read().len()
            + self.disconnected_callbacks.read().len()
            + self.state_changed_callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn subscription_id_display() {
        let id = SubscriptionId::new(42);
        assert_eq!(id.to_string(), "Sub(42)");
        assert_eq!(id.value(), 42);
    }

    #[test]
    fn registry_new_is_empty() {
        let registry = CallbackRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.callback_count(), 0);
    }

    #[test]
    fn registry_power_callback() {
        let registry = CallbackRegistry::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let id = registry.on_power_changed(move |_state| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(registry.callback_count(), 1);

        registry.dispatch(&StateChange::Power(PowerState::On));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        assert!(registry.unsubscribe(id));
        assert!(registry.is_empty());

        registry.dispatch(&StateChange::Power(PowerState::Off));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn registry_speed_callback() {
        let registry = CallbackRegistry::new();
        let received = Arc::new(RwLock::new(None::<FanSpeed>));
        let received_clone = received.clone();

        registry.on_speed_changed(move |speed| {
            *received_clone.write() = Some(speed);
        });

        registry.dispatch(&StateChange::Speed(FanSpeed::TURBO));
        assert_eq!(*received.read(), Some(FanSpeed::TURBO));
    }

    #[test]
    fn registry_sensor_and_switch_callbacks() {
        let registry = CallbackRegistry::new();
        let sensors = Arc::new(RwLock::new(Vec::new()));
        let switches = Arc::new(RwLock::new(Vec::new()));
        let s = sensors.clone();
        let w = switches.clone();

        registry.on_sensor_changed(move |kind, value| s.write().push((kind, value)));
        registry.on_switch_changed(move |kind, on| w.write().push((kind, on)));

        registry.dispatch(&StateChange::sensor(SensorKind::Light, 34));
        registry.dispatch(&StateChange::switch(SwitchKind::Sleep, true));
        registry.dispatch(&StateChange::AirQuality(AirQuality::Fair));

        assert_eq!(*sensors.read(), vec![(SensorKind::Light, 34)]);
        assert_eq!(*switches.read(), vec![(SwitchKind::Sleep, true)]);
    }

    #[test]
    fn registry_state_changed_sees_everything() {
        let registry = CallbackRegistry::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        registry.on_state_changed(move |_change| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch(&StateChange::Power(PowerState::On));
        registry.dispatch(&StateChange::AirQuality(AirQuality::Poor));
        registry.dispatch(&StateChange::sensor(SensorKind::FilterAge, 3706));

        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn registry_published_callback() {
        let registry = CallbackRegistry::new();
        let received = Arc::new(RwLock::new(StateMap::new()));
        let received_clone = received.clone();

        registry.on_states_published(move |states| {
            *received_clone.write() = states.clone();
        });

        let states: StateMap = [("A02", 1), ("X99", 7)].into_iter().collect();
        registry.dispatch_published(&states);
        assert_eq!(*received.read(), states);
    }

    #[test]
    fn registry_multiple_callbacks_same_type() {
        let registry = CallbackRegistry::new();
        let counter1 = Arc::new(AtomicU32::new(0));
        let counter2 = Arc::new(AtomicU32::new(0));
        let c1 = counter1.clone();
        let c2 = counter2.clone();

        registry.on_power_changed(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        });
        registry.on_power_changed(move |_| {
            c2.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch(&StateChange::Power(PowerState::On));

        assert_eq!(counter1.load(Ordering::SeqCst), 1);
        assert_eq!(counter2.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn registry_unsubscribe_nonexistent() {
        let registry = CallbackRegistry::new();
        assert!(!registry.unsubscribe(SubscriptionId::new(999)));
    }

    #[test]
    fn registry_clear() {
        let registry = CallbackRegistry::new();

        registry.on_power_changed(|_| {});
        registry.on_speed_changed(|_| {});
        registry.on_connected(|_| {});

        assert_eq!(registry.callback_count(), 3);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_connection_callbacks() {
        let registry = CallbackRegistry::new();
        let connected = Arc::new(AtomicU32::new(0));
        let disconnected = Arc::new(AtomicU32::new(0));
        let c = connected.clone();
        let d = disconnected.clone();

        registry.on_connected(move |_state| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        registry.on_disconnected(move || {
            d.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch_connected(&DeviceState::new());
        registry.dispatch_disconnected();
        registry.dispatch_disconnected();

        assert_eq!(connected.load(Ordering::SeqCst), 1);
        assert_eq!(disconnected.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn registry_unique_ids() {
        let registry = CallbackRegistry::new();

        let id1 = registry.on_power_changed(|_| {});
        let id2 = registry.on_sensor_changed(|_, _| {});
        let id3 = registry.on_states_published(|_| {});

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn registry_debug() {
        let registry = CallbackRegistry::new();
        registry.on_power_changed(|_| {});

        let debug = format!("{registry:?}");
        assert!(debug.contains("CallbackRegistry"));
        assert!(debug.contains("callback_count: 1"));
    }
}
