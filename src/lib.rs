// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `winix_bridge` - A Rust library speaking the Winix C545 air purifier's
//! MCU serial protocol.
//!
//! The purifier's control board talks to a Wi-Fi module over a UART. This
//! library takes the module's place: it answers the MCU's handshake, decodes
//! the state it reports into typed attributes and encodes control requests
//! back onto the wire.
//!
//! # Supported Features
//!
//! - **Handshake**: readiness announcement, capability negotiation, timeout recovery
//! - **State decoding**: power, fan speed (incl. turbo and sleep), plasmawave,
//!   auto mode, air quality, air-quality index, ambient light, filter age
//! - **Subscriptions**: callbacks for published batches and per-attribute changes
//! - **Control**: diffed state changes sent as a single command
//!
//! # Architecture
//!
//! ```text
//! bytes ─▶ LineFramer ─▶ Inbound ─┬─▶ Handshake ──────────────▶ replies
//!                                 └─▶ AwsMessage ─▶ PendingStates
//!                                                      │ publish
//!                                                      ▼
//!                             DeviceState ─▶ CallbackRegistry ─▶ observers
//! ControlRequest ─▶ diff ─▶ encode_states ─▶ serial link
//! ```
//!
//! # Quick Start
//!
//! ```
//! use winix_bridge::subscription::Subscribable;
//! use winix_bridge::transport::{ManualClock, MemoryPort};
//! use winix_bridge::types::{FanSpeed, PowerState};
//! use winix_bridge::{Bridge, BridgeConfig, ControlRequest};
//!
//! # fn main() -> winix_bridge::Result<()> {
//! let port = MemoryPort::new();
//! let clock = ManualClock::new();
//! let mut bridge = Bridge::new(port.clone(), clock.clone(), BridgeConfig::default())?;
//!
//! bridge.on_speed_changed(|speed| println!("Fan speed: {speed}"));
//!
//! // The MCU reports its state
//! port.inject_str("AT*ICT*AWS_SEND=A210 {\"A02\":\"1\",\"A04\":\"02\"}\r\n");
//! bridge.tick()?;
//! assert_eq!(bridge.state().speed(), Some(FanSpeed::MEDIUM));
//!
//! // Turn the purifier off
//! let sent = bridge.control(&ControlRequest::new().with_power(PowerState::Off))?;
//! assert!(sent);
//! # Ok(())
//! # }
//! ```
//!
//! ## Async driver
//!
//! ```no_run
//! use std::time::Duration;
//! use winix_bridge::transport::{MemoryPort, MonotonicClock};
//! use winix_bridge::{Bridge, BridgeConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> winix_bridge::Result<()> {
//!     let mut bridge = Bridge::new(MemoryPort::new(), MonotonicClock::new(), BridgeConfig::default())?;
//!
//!     // Run for a minute, then stop
//!     bridge.run(tokio::time::sleep(Duration::from_secs(60))).await
//! }
//! ```

mod bridge;
pub mod command;
mod config;
pub mod error;
pub mod protocol;
pub mod state;
pub mod subscription;
pub mod transport;
pub mod types;

pub use bridge::Bridge;
pub use command::ControlRequest;
pub use config::{BridgeConfig, DEFAULT_POLL_INTERVAL};
pub use error::{Error, ParseError, ProtocolError, Result, TransportError, ValueError};
pub use state::{DeviceState, StateChange, StateMap};
pub use subscription::{CallbackRegistry, Subscribable, SubscriptionId};
pub use types::{AirQuality, FanSpeed, PowerState, SensorKind, SwitchKind};
