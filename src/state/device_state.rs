// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Last-known observed state and the per-key decode table.

use crate::types::{AirQuality, FanSpeed, PowerState, RAW_SLEEP, SensorKind, SwitchKind};

use super::{AttributeKey, StateChange, StateMap};

/// Decodes one raw value into a change, or `None` if the value is ignored.
type DecodeFn = fn(u16) -> Option<StateChange>;

/// Decode rules, keyed by attribute. A key may appear more than once when it
/// drives several attributes (`A04` feeds both speed and the sleep switch).
const DECODE_TABLE: &[(AttributeKey, DecodeFn)] = &[
    (AttributeKey::Power, decode_power),
    (AttributeKey::Auto, decode_auto),
    (AttributeKey::Speed, decode_speed),
    (AttributeKey::Speed, decode_sleep),
    (AttributeKey::Plasmawave, decode_plasmawave),
    (AttributeKey::FilterAge, decode_filter_age),
    (AttributeKey::AirQuality, decode_air_quality),
    (AttributeKey::AirQualityIndex, decode_air_quality_index),
    (AttributeKey::Light, decode_light),
];

fn decode_power(raw: u16) -> Option<StateChange> {
    Some(StateChange::Power(PowerState::from_raw(raw)))
}

fn decode_auto(raw: u16) -> Option<StateChange> {
    Some(StateChange::switch(SwitchKind::Auto, raw == 1))
}

fn decode_speed(raw: u16) -> Option<StateChange> {
    Some(StateChange::Speed(FanSpeed::from_raw(raw)))
}

fn decode_sleep(raw: u16) -> Option<StateChange> {
    Some(StateChange::switch(SwitchKind::Sleep, raw == RAW_SLEEP))
}

fn decode_plasmawave(raw: u16) -> Option<StateChange> {
    Some(StateChange::switch(SwitchKind::Plasmawave, raw == 1))
}

fn decode_filter_age(raw: u16) -> Option<StateChange> {
    Some(StateChange::sensor(SensorKind::FilterAge, raw))
}

fn decode_air_quality(raw: u16) -> Option<StateChange> {
    AirQuality::try_from(raw).ok().map(StateChange::AirQuality)
}

fn decode_air_quality_index(raw: u16) -> Option<StateChange> {
    Some(StateChange::sensor(SensorKind::AirQualityIndex, raw))
}

fn decode_light(raw: u16) -> Option<StateChange> {
    Some(StateChange::sensor(SensorKind::Light, raw))
}

/// Decodes a raw key/value pair through the decode table.
///
/// Unknown keys and ignored values yield no changes.
///
/// # Examples
///
/// ```
/// use winix_bridge::state::{StateChange, decode};
/// use winix_bridge::types::{FanSpeed, SwitchKind};
///
/// let changes = decode("A04", 6);
/// assert_eq!(
///     changes,
///     vec![
///         StateChange::Speed(FanSpeed::SLEEP),
///         StateChange::switch(SwitchKind::Sleep, true),
///     ]
/// );
/// assert!(decode("S07", 9).is_empty());
/// ```
#[must_use]
pub fn decode(key: &str, raw: u16) -> Vec<StateChange> {
    let Ok(key) = key.parse::<AttributeKey>() else {
        return Vec::new();
    };
    DECODE_TABLE
        .iter()
        .filter(|(k, _)| *k == key)
        .filter_map(|(_, rule)| rule(raw))
        .collect()
}

/// Last-known state of the purifier as seen by observers.
///
/// All fields are optional because nothing is known until the MCU reports
/// it.
///
/// # Examples
///
/// ```
/// use winix_bridge::state::{DeviceState, StateMap};
/// use winix_bridge::types::{FanSpeed, PowerState};
///
/// let mut state = DeviceState::new();
/// let delta: StateMap = [("A02", 1), ("A04", 5)].into_iter().collect();
///
/// let changes = state.apply_delta(&delta);
/// assert!(!changes.is_empty());
/// assert_eq!(state.power(), Some(PowerState::On));
/// assert_eq!(state.speed(), Some(FanSpeed::TURBO));
///
/// // Nothing changes the second time around
/// assert!(state.apply_delta(&delta).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeviceState {
    power: Option<PowerState>,
    speed: Option<FanSpeed>,
    air_quality: Option<AirQuality>,
    air_quality_index: Option<u16>,
    light: Option<u16>,
    filter_age: Option<u16>,
    plasmawave: Option<bool>,
    auto_mode: Option<bool>,
    sleep: Option<bool>,
}

impl DeviceState {
    /// Creates a new empty device state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the power state.
    #[must_use]
    pub fn power(&self) -> Option<PowerState> {
        self.power
    }

    /// Gets the fan speed ordinal.
    #[must_use]
    pub fn speed(&self) -> Option<FanSpeed> {
        self.speed
    }

    /// Gets the air quality indicator.
    #[must_use]
    pub fn air_quality(&self) -> Option<AirQuality> {
        self.air_quality
    }

    /// Gets a numeric sensor reading.
    #[must_use]
    pub fn sensor(&self, kind: SensorKind) -> Option<u16> {
        match kind {
            SensorKind::AirQualityIndex => self.air_quality_index,
            SensorKind::Light => self.light,
            SensorKind::FilterAge => self.filter_age,
        }
    }

    /// Gets a switch state.
    #[must_use]
    pub fn switch(&self, kind: SwitchKind) -> Option<bool> {
        match kind {
            SwitchKind::Plasmawave => self.plasmawave,
            SwitchKind::Auto => self.auto_mode,
            SwitchKind::Sleep => self.sleep,
        }
    }

    fn sensor_mut(&mut self, kind: SensorKind) -> &mut Option<u16> {
        match kind {
            SensorKind::AirQualityIndex => &mut self.air_quality_index,
            SensorKind::Light => &mut self.light,
            SensorKind::FilterAge => &mut self.filter_age,
        }
    }

    fn switch_mut(&mut self, kind: SwitchKind) -> &mut Option<bool> {
        match kind {
            SwitchKind::Plasmawave => &mut self.plasmawave,
            SwitchKind::Auto => &mut self.auto_mode,
            SwitchKind::Sleep => &mut self.sleep,
        }
    }

    /// Applies a state change and returns whether the state actually changed.
    ///
    /// # Returns
    ///
    /// Returns `true` if the state was modified, `false` if it was already
    /// at the target value.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        fn replace<T: PartialEq>(slot: &mut Option<T>, value: T) -> bool {
            if slot.as_ref() == Some(&value) {
                false
            } else {
                *slot = Some(value);
                true
            }
        }

        match *change {
            StateChange::Power(state) => replace(&mut self.power, state),
            StateChange::Speed(speed) => replace(&mut self.speed, speed),
            StateChange::AirQuality(level) => replace(&mut self.air_quality, level),
            StateChange::Sensor { kind, value } => replace(self.sensor_mut(kind), value),
            StateChange::Switch { kind, on } => replace(self.switch_mut(kind), on),
        }
    }

    /// Decodes a raw delta and applies it, returning only the changes that
    /// actually modified the state, in key order.
    pub fn apply_delta(&mut self, delta: &StateMap) -> Vec<StateChange> {
        let mut changes = Vec::new();
        for (key, raw) in delta.iter() {
            let decoded = decode(key, raw);
            if decoded.is_empty() {
                tracing::trace!(key, raw, "No attribute decoded from key");
            }
            for change in decoded {
                if self.apply(&change) {
                    changes.push(change);
                }
            }
        }
        changes
    }

    /// Clears all state, resetting to unknown.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(pairs: &[(&str, u16)]) -> StateMap {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn new_state_is_empty() {
        let state = DeviceState::new();
        assert!(state.power().is_none());
        assert!(state.speed().is_none());
        assert!(state.sensor(SensorKind::Light).is_none());
        assert!(state.switch(SwitchKind::Sleep).is_none());
    }

    #[test]
    fn full_snapshot_decodes_every_known_key() {
        let mut state = DeviceState::new();
        let changes = state.apply_delta(&delta(&[
            ("A02", 1),
            ("A03", 2),
            ("A04", 2),
            ("A05", 1),
            ("A07", 1),
            ("A21", 3706),
            ("S07", 1),
            ("S08", 97),
            ("S14", 34),
        ]));

        // A04 yields speed + sleep, A05 is unknown
        assert_eq!(changes.len(), 9);
        assert_eq!(state.power(), Some(PowerState::On));
        assert_eq!(state.speed(), Some(FanSpeed::MEDIUM));
        assert_eq!(state.switch(SwitchKind::Auto), Some(false));
        assert_eq!(state.switch(SwitchKind::Plasmawave), Some(true));
        assert_eq!(state.switch(SwitchKind::Sleep), Some(false));
        assert_eq!(state.sensor(SensorKind::FilterAge), Some(3706));
        assert_eq!(state.air_quality(), Some(AirQuality::Good));
        assert_eq!(state.sensor(SensorKind::AirQualityIndex), Some(97));
        assert_eq!(state.sensor(SensorKind::Light), Some(34));
    }

    #[test]
    fn turbo_and_sleep_mapping() {
        let mut state = DeviceState::new();
        state.apply_delta(&delta(&[("A04", 5)]));
        assert_eq!(state.speed(), Some(FanSpeed::TURBO));
        assert_eq!(state.switch(SwitchKind::Sleep), Some(false));

        let changes = state.apply_delta(&delta(&[("A04", 6)]));
        assert_eq!(state.speed(), Some(FanSpeed::SLEEP));
        assert_eq!(state.switch(SwitchKind::Sleep), Some(true));
        assert_eq!(
            changes,
            vec![
                StateChange::Speed(FanSpeed::SLEEP),
                StateChange::switch(SwitchKind::Sleep, true),
            ]
        );
    }

    #[test]
    fn sleep_only_reported_when_derived_value_changes() {
        let mut state = DeviceState::new();
        state.apply_delta(&delta(&[("A04", 1)]));
        let changes = state.apply_delta(&delta(&[("A04", 3)]));
        assert_eq!(changes, vec![StateChange::Speed(FanSpeed::HIGH)]);
    }

    #[test]
    fn invalid_air_quality_is_ignored() {
        let mut state = DeviceState::new();
        state.apply_delta(&delta(&[("S07", 3)]));
        let changes = state.apply_delta(&delta(&[("S07", 0)]));
        assert!(changes.is_empty());
        assert_eq!(state.air_quality(), Some(AirQuality::Poor));
    }

    #[test]
    fn unchanged_sensor_is_suppressed() {
        let mut state = DeviceState::new();
        assert_eq!(state.apply_delta(&delta(&[("S08", 97)])).len(), 1);
        assert!(state.apply_delta(&delta(&[("S08", 97)])).is_empty());
        assert_eq!(
            state.apply_delta(&delta(&[("S08", 116)])),
            vec![StateChange::sensor(SensorKind::AirQualityIndex, 116)]
        );
    }

    #[test]
    fn partial_update_leaves_fan_untouched() {
        let mut state = DeviceState::new();
        state.apply_delta(&delta(&[("A02", 1), ("A04", 5)]));
        let changes = state.apply_delta(&delta(&[("S08", 97)]));
        assert!(changes.iter().all(|c| !c.is_fan()));
        assert_eq!(state.power(), Some(PowerState::On));
        assert_eq!(state.speed(), Some(FanSpeed::TURBO));
    }

    #[test]
    fn unknown_keys_decode_to_nothing() {
        assert!(decode("X99", 1).is_empty());
        assert!(decode("A05", 1).is_empty());
    }

    #[test]
    fn clear_resets_state() {
        let mut state = DeviceState::new();
        state.apply(&StateChange::Power(PowerState::On));
        state.clear();
        assert!(state.power().is_none());
    }
}
