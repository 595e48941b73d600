// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::protocol::{MODULE_VERSION, READY_TIMEOUT, RX_PREFIX, TX_PREFIX};

/// Default interval between two ticks of [`Bridge::run`](crate::Bridge::run).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Configuration for a [`Bridge`](crate::Bridge).
///
/// Every field has a default matching the C545 firmware, so most callers only
/// need `BridgeConfig::default()`. Durations are (de)serialized as whole
/// milliseconds, and missing fields take their defaults.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use winix_bridge::BridgeConfig;
///
/// let config = BridgeConfig::default()
///     .with_module_version("7600")
///     .with_ready_timeout(Duration::from_secs(5));
/// assert_eq!(config.rx_prefix, "AT*ICT*");
///
/// let parsed = BridgeConfig::from_json(r#"{"ready_timeout_ms": 5000, "module_version": "7600"}"#)?;
/// assert_eq!(parsed, config);
/// # Ok::<(), winix_bridge::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Prefix every inbound sentence must carry.
    pub rx_prefix: String,
    /// Prefix written before every outbound sentence.
    pub tx_prefix: String,
    /// Firmware version reported in `MIB:OK`.
    pub module_version: String,
    /// Silence after which `DEVICEREADY` is announced again.
    #[serde(rename = "ready_timeout_ms", with = "duration_ms")]
    pub ready_timeout: Duration,
    /// Tick period of the async driver.
    #[serde(rename = "poll_interval_ms", with = "duration_ms")]
    pub poll_interval: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            rx_prefix: RX_PREFIX.to_string(),
            tx_prefix: TX_PREFIX.to_string(),
            module_version: MODULE_VERSION.to_string(),
            ready_timeout: READY_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl BridgeConfig {
    /// Parses a configuration from JSON and validates it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the JSON is malformed or the result fails
    /// [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the inbound prefix.
    #[must_use]
    pub fn with_rx_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.rx_prefix = prefix.into();
        self
    }

    /// Sets the outbound prefix.
    #[must_use]
    pub fn with_tx_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tx_prefix = prefix.into();
        self
    }

    /// Sets the reported module version.
    #[must_use]
    pub fn with_module_version(mut self, version: impl Into<String>) -> Self {
        self.module_version = version.into();
        self
    }

    /// Sets the ready timeout.
    #[must_use]
    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Sets the driver tick period.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Checks the configuration for values the bridge cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if either prefix is empty or the poll interval
    /// is zero.
    pub fn validate(&self) -> Result<()> {
        if self.rx_prefix.is_empty() {
            return Err(Error::Config("rx_prefix must not be empty".to_string()));
        }
        if self.tx_prefix.is_empty() {
            return Err(Error::Config("tx_prefix must not be empty".to_string()));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::Config("poll_interval must be non-zero".to_string()));
        }
        Ok(())
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
