// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The [`ControlRequest`] builder and its diff against the last-known state.

use crate::state::{AttributeKey, DeviceState, StateMap};
use crate::types::{FanSpeed, PowerState, RAW_SLEEP, SwitchKind};

/// Raw `A03` value for manual mode.
const RAW_AUTO_OFF: u16 = 2;

/// Raw `A04` value written when leaving sleep without a requested speed.
const RAW_WAKE_SPEED: u16 = 1;

/// A set of requested attribute changes.
///
/// Unset fields are left alone. Requesting a value the purifier already
/// reports is a no-op for that field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ControlRequest {
    /// Requested power state.
    pub power: Option<PowerState>,
    /// Requested fan speed ordinal.
    pub speed: Option<FanSpeed>,
    /// Requested plasmawave switch state.
    pub plasmawave: Option<bool>,
    /// Requested auto mode switch state.
    pub auto_mode: Option<bool>,
    /// Requested sleep switch state.
    pub sleep: Option<bool>,
}

impl ControlRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a power state.
    #[must_use]
    pub fn with_power(mut self, power: PowerState) -> Self {
        self.power = Some(power);
        self
    }

    /// Requests a fan speed.
    #[must_use]
    pub fn with_speed(mut self, speed: FanSpeed) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Requests a plasmawave state.
    #[must_use]
    pub fn with_plasmawave(mut self, on: bool) -> Self {
        self.plasmawave = Some(on);
        self
    }

    /// Requests an auto mode state.
    #[must_use]
    pub fn with_auto_mode(mut self, on: bool) -> Self {
        self.auto_mode = Some(on);
        self
    }

    /// Requests a sleep state.
    #[must_use]
    pub fn with_sleep(mut self, on: bool) -> Self {
        self.sleep = Some(on);
        self
    }

    /// Requests a switch state by kind.
    #[must_use]
    pub fn with_switch(self, kind: SwitchKind, on: bool) -> Self {
        match kind {
            SwitchKind::Plasmawave => self.with_plasmawave(on),
            SwitchKind::Auto => self.with_auto_mode(on),
            SwitchKind::Sleep => self.with_sleep(on),
        }
    }

    /// Returns `true` if nothing is requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Computes the raw values to send given the last-known `state`.
    ///
    /// Attributes whose state is unknown are always sent. Requesting sleep
    /// overrides a speed request on `A04`, even when already sleeping.
    #[must_use]
    pub fn diff(&self, state: &DeviceState) -> StateMap {
        let mut delta = StateMap::new();
        let sleep_requested = self.sleep == Some(true);

        if let Some(power) = self.power.filter(|p| state.power() != Some(*p)) {
            delta.set(AttributeKey::Power, power.to_raw());
        }

        if let Some(speed) = self
            .speed
            .filter(|s| !sleep_requested && state.speed() != Some(*s))
        {
            delta.set(AttributeKey::Speed, speed.to_raw());
        }

        if let Some(on) = self.switch_change(state, SwitchKind::Plasmawave) {
            delta.set(AttributeKey::Plasmawave, u16::from(on));
        }

        if let Some(on) = self.switch_change(state, SwitchKind::Auto) {
            delta.set(AttributeKey::Auto, if on { 1 } else { RAW_AUTO_OFF });
        }

        if let Some(on) = self.switch_change(state, SwitchKind::Sleep) {
            let raw = if on {
                RAW_SLEEP
            } else {
                self.speed.map_or(RAW_WAKE_SPEED, FanSpeed::to_raw)
            };
            delta.set(AttributeKey::Speed, raw);
        }

        delta
    }

    fn requested_switch(&self, kind: SwitchKind) -> Option<bool> {
        match kind {
            SwitchKind::Plasmawave => self.plasmawave,
            SwitchKind::Auto => self.auto_mode,
            SwitchKind::Sleep => self.sleep,
        }
    }

    fn switch_change(&self, state: &DeviceState, kind: SwitchKind) -> Option<bool> {
        self.requested_switch(kind)
            .filter(|on| state.switch(kind) != Some(*on))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateChange;

    fn state_with(changes: &[StateChange]) -> DeviceState {
        let mut state = DeviceState::new();
        for change in changes {
            state.apply(change);
        }
        state
    }

    #[test]
    fn empty_request_diffs_to_nothing() {
        let request = ControlRequest::new();
        assert!(request.is_empty());
        assert!(request.diff(&DeviceState::new()).is_empty());
    }

    #[test]
    fn power_off_when_on() {
        let state = state_with(&[StateChange::Power(PowerState::On)]);
        let delta = ControlRequest::new()
            .with_power(PowerState::Off)
            .diff(&state);
        let expected: StateMap = [("A02", 0)].into_iter().collect();
        assert_eq!(delta, expected);
    }

    #[test]
    fn unchanged_values_are_skipped() {
        let state = state_with(&[
            StateChange::Power(PowerState::On),
            StateChange::Speed(FanSpeed::HIGH),
        ]);
        let delta = ControlRequest::new()
            .with_power(PowerState::On)
            .with_speed(FanSpeed::HIGH)
            .diff(&state);
        assert!(delta.is_empty());
    }

    #[test]
    fn unknown_state_counts_as_changed() {
        let delta = ControlRequest::new()
            .with_plasmawave(false)
            .diff(&DeviceState::new());
        assert_eq!(delta.get("A07"), Some(0));
    }

    #[test]
    fn turbo_is_encoded_as_five() {
        let delta = ControlRequest::new()
            .with_speed(FanSpeed::TURBO)
            .diff(&DeviceState::new());
        assert_eq!(delta.get("A04"), Some(5));
    }

    #[test]
    fn auto_off_is_encoded_as_two() {
        let state = state_with(&[StateChange::switch(SwitchKind::Auto, true)]);
        let delta = ControlRequest::new().with_auto_mode(false).diff(&state);
        assert_eq!(delta.get("A03"), Some(2));

        let delta = ControlRequest::new()
            .with_switch(SwitchKind::Auto, true)
            .diff(&DeviceState::new());
        assert_eq!(delta.get("A03"), Some(1));
    }

    #[test]
    fn sleep_overrides_speed() {
        let delta = ControlRequest::new()
            .with_speed(FanSpeed::HIGH)
            .with_sleep(true)
            .diff(&DeviceState::new());
        assert_eq!(delta.get("A04"), Some(6));
    }

    #[test]
    fn speed_is_ignored_while_staying_asleep() {
        let state = state_with(&[
            StateChange::Speed(FanSpeed::SLEEP),
            StateChange::switch(SwitchKind::Sleep, true),
        ]);
        let delta = ControlRequest::new()
            .with_speed(FanSpeed::HIGH)
            .with_sleep(true)
            .diff(&state);
        assert!(delta.is_empty());
    }

    #[test]
    fn leaving_sleep_uses_requested_speed_or_low() {
        let state = state_with(&[
            StateChange::Speed(FanSpeed::SLEEP),
            StateChange::switch(SwitchKind::Sleep, true),
        ]);

        let delta = ControlRequest::new().with_sleep(false).diff(&state);
        assert_eq!(delta.get("A04"), Some(1));

        let delta = ControlRequest::new()
            .with_sleep(false)
            .with_speed(FanSpeed::TURBO)
            .diff(&state);
        assert_eq!(delta.get("A04"), Some(5));
    }

    #[test]
    fn applying_the_diff_reaches_the_request() {
        let mut state = state_with(&[StateChange::Power(PowerState::Off)]);
        let request = ControlRequest::new()
            .with_power(PowerState::On)
            .with_speed(FanSpeed::TURBO)
            .with_plasmawave(true);

        state.apply_delta(&request.diff(&state));
        assert_eq!(state.power(), Some(PowerState::On));
        assert_eq!(state.speed(), Some(FanSpeed::TURBO));
        assert_eq!(state.switch(SwitchKind::Plasmawave), Some(true));
        assert!(request.diff(&state).is_empty());
    }
}
