// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw key/value state carried on the wire.
//!
//! The MCU identifies every attribute by a short code such as `A02` or `S08`
//! and carries its value as an unsigned integer. [`StateMap`] holds those
//! pairs ordered by key; [`PendingStates`] accumulates them between publish
//! steps.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// The closed vocabulary of attribute keys the bridge interprets.
///
/// Keys outside this vocabulary are carried through a [`StateMap`] untouched
/// but never decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum AttributeKey {
    /// `A02`: power.
    Power,
    /// `A03`: automatic mode.
    Auto,
    /// `A04`: fan speed / mode.
    Speed,
    /// `A07`: plasmawave ionizer.
    Plasmawave,
    /// `A21`: filter age counter.
    FilterAge,
    /// `S07`: air quality indicator level.
    AirQuality,
    /// `S08`: air quality index.
    AirQualityIndex,
    /// `S14`: ambient light level.
    Light,
}

impl AttributeKey {
    /// Every known key.
    pub const ALL: [Self; 8] = [
        Self::Power,
        Self::Auto,
        Self::Speed,
        Self::Plasmawave,
        Self::FilterAge,
        Self::AirQuality,
        Self::AirQualityIndex,
        Self::Light,
    ];

    /// Returns the wire code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Power => "A02",
            Self::Auto => "A03",
            Self::Speed => "A04",
            Self::Plasmawave => "A07",
            Self::FilterAge => "A21",
            Self::AirQuality => "S07",
            Self::AirQualityIndex => "S08",
            Self::Light => "S14",
        }
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeKey {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ValueError::UnknownKey(s.to_string()))
    }
}

/// An ordered map of raw attribute values keyed by wire code.
///
/// # Examples
///
/// ```
/// use winix_bridge::state::{AttributeKey, StateMap};
///
/// let mut states = StateMap::new();
/// states.set(AttributeKey::Power, 1);
/// states.insert("A05", 1); // unknown keys are kept as-is
///
/// assert_eq!(states.get_attribute(AttributeKey::Power), Some(1));
/// assert_eq!(states.get("A05"), Some(1));
/// assert_eq!(states.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct StateMap(BTreeMap<String, u16>);

impl StateMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a raw value, overwriting any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: u16) {
        self.0.insert(key.into(), value);
    }

    /// Inserts a value for a known attribute.
    pub fn set(&mut self, key: AttributeKey, value: u16) {
        self.insert(key.as_str(), value);
    }

    /// Returns the raw value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<u16> {
        self.0.get(key).copied()
    }

    /// Returns the raw value for a known attribute.
    #[must_use]
    pub fn get_attribute(&self, key: AttributeKey) -> Option<u16> {
        self.get(key.as_str())
    }

    /// Merges `other` into `self`; keys present in both take `other`'s value.
    pub fn merge(&mut self, other: StateMap) {
        self.0.extend(other.0);
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u16)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, u16)> for StateMap {
    fn from_iter<I: IntoIterator<Item = (K, u16)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl IntoIterator for StateMap {
    type Item = (String, u16);
    type IntoIter = btree_map::IntoIter<String, u16>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Deltas accumulated since the last publish step.
///
/// Each decoded application message is merged in; the publish step moves the
/// whole batch out with [`take`](Self::take), leaving the buffer empty.
#[derive(Debug, Clone, Default)]
pub struct PendingStates {
    states: StateMap,
}

impl PendingStates {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a decoded delta; later values win per key.
    pub fn merge(&mut self, delta: StateMap) {
        self.states.merge(delta);
    }

    /// Moves the accumulated batch out, clearing the buffer.
    #[must_use]
    pub fn take(&mut self) -> StateMap {
        std::mem::take(&mut self.states)
    }

    /// Returns the pending batch without clearing it.
    #[must_use]
    pub fn peek(&self) -> &StateMap {
        &self.states
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
