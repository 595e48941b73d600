// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire protocol spoken by the purifier's MCU.
//!
//! The MCU believes it is talking to a Wi-Fi module. Every sentence it sends
//! starts with [`RX_PREFIX`]; every sentence the bridge answers with starts
//! with [`TX_PREFIX`] and ends in `\r\n`.
//!
//! # Layers
//!
//! - [`LineFramer`]: bytes to `\r`-terminated sentences
//! - [`Inbound`]: sentence classification by prefix
//! - [`AwsMessage`]: the `AWS_SEND` key/value sub-protocol, and
//!   [`encode_states`] for the reverse direction
//! - [`Handshake`]: readiness, capability negotiation and session state
//!
//! # Example exchange
//!
//! ```text
//! <- *ICT*DEVICEREADY
//! -> AT*ICT*MCU_READY=1.2.0
//! <- *ICT*MCU_READY:OK
//! -> AT*ICT*MIB=32
//! <- *ICT*MIB:OK 7595
//! <- *ICT*AWS_IND:CONNECT OK
//! -> AT*ICT*AWS_SEND=A210 {"A02":"1","A04":"02"}
//! <- *ICT*AWS_SEND:OK
//! <- *ICT*AWS_IND:SEND OK
//! ```

use std::time::Duration;

mod aws;
mod framer;
mod handshake;
mod sentence;

pub use aws::{ApiCode, AwsMessage, encode_states};
pub use framer::LineFramer;
pub use handshake::{Handshake, HandshakeEvent, HandshakeState, Transition};
pub use sentence::{Inbound, Outbound};

/// Capacity of the line buffer; sentences keep at most one byte less.
pub const MAX_LINE_LENGTH: usize = 255;

/// Prefix of every sentence sent by the MCU.
pub const RX_PREFIX: &str = "AT*ICT*";

/// Prefix of every sentence sent to the MCU.
pub const TX_PREFIX: &str = "*ICT*";

/// Firmware version reported in `MIB:OK`.
pub const MODULE_VERSION: &str = "7595";

/// Silence after which readiness is announced again.
pub const READY_TIMEOUT: Duration = Duration::from_secs(10);
