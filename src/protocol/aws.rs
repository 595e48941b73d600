// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `AWS` application message sub-protocol.
//!
//! The MCU reports state with sentences such as:
//!
//! ```text
//! AWS_SEND=A210 {"A02":"1","A03":"02","A04":"02","A07":"1","A21":"3706","S07":"01","S08":"97","S14":"34"}
//! AWS_SEND=A220 {"S07":"01","S08":"116","S14":"34"}
//! ```
//!
//! and accepts state changes as:
//!
//! ```text
//! AWS_RECV:A211 12 {"A02":"0"}
//! ```

use std::fmt;

use crate::error::ParseError;
use crate::state::StateMap;

/// Header preceding the API code of an inbound message.
const SEND_HEADER: &str = "AWS_SEND=A";

/// Inbound payloads start after the fixed-width `AWS_SEND=A2XX {` header.
const PAYLOAD_OFFSET: usize = "AWS_SEND=A2XX {".len();

/// Header of an outbound state-change command.
const RECV_HEADER: &str = "AWS_RECV:A211 12 ";

/// Longest key the payload grammar accepts.
const MAX_KEY_LENGTH: usize = 3;

/// Numeric API code carried by an application message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiCode {
    /// `102`: the MCU reports the cloud link as disconnected.
    Disconnect,
    /// `210`: full device state snapshot.
    DeviceState,
    /// `220`: partial sensor update.
    SensorUpdate,
    /// `230`: error report.
    ErrorReport,
    /// `240`: version report.
    VersionReport,
    /// Any other code.
    Unknown(u16),
}

impl ApiCode {
    /// Returns the numeric code.
    #[must_use]
    pub const fn value(&self) -> u16 {
        match self {
            Self::Disconnect => 102,
            Self::DeviceState => 210,
            Self::SensorUpdate => 220,
            Self::ErrorReport => 230,
            Self::VersionReport => 240,
            Self::Unknown(code) => *code,
        }
    }
}

impl From<u16> for ApiCode {
    fn from(code: u16) -> Self {
        match code {
            102 => Self::Disconnect,
            210 => Self::DeviceState,
            220 => Self::SensorUpdate,
            230 => Self::ErrorReport,
            240 => Self::VersionReport,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for ApiCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.value())
    }
}

/// A decoded inbound application message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AwsMessage {
    /// Link-disconnect notice (`102`).
    Disconnect,

    /// State snapshot or sensor update (`210`, `220`).
    States {
        /// The code the message carried.
        code: ApiCode,
        /// Every key/value pair of the payload.
        states: StateMap,
    },

    /// Error or version report (`230`, `240`); acknowledged, not decoded.
    Report {
        /// The code the message carried.
        code: ApiCode,
    },

    /// A code the bridge does not handle.
    Unknown {
        /// The numeric code.
        code: u16,
    },
}

impl AwsMessage {
    /// Decodes an inbound sentence starting at `AWS_SEND`.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::ApiCode` if the `AWS_SEND=A<code>` header cannot be
    /// matched, `ParseError::Payload` if a `210`/`220` message is too short
    /// to hold a payload or is corrupted around its opening brace, or
    /// `ParseError::Token` if any payload token is malformed. A malformed
    /// token discards the whole message.
    ///
    /// # Examples
    ///
    /// ```
    /// use winix_bridge::protocol::{ApiCode, AwsMessage};
    ///
    /// let msg = AwsMessage::decode(r#"AWS_SEND=A210 {"A02":"1","A04":"5"}"#).unwrap();
    /// let AwsMessage::States { code, states } = msg else { panic!() };
    /// assert_eq!(code, ApiCode::DeviceState);
    /// assert_eq!(states.get("A02"), Some(1));
    /// assert_eq!(states.get("A04"), Some(5));
    ///
    /// assert!(AwsMessage::decode(r#"AWS_SEND=A210 {"A02":"1","A04":x}"#).is_err());
    /// ```
    pub fn decode(sentence: &str) -> Result<Self, ParseError> {
        let code = ApiCode::from(parse_api_code(sentence)?);
        Ok(match code {
            ApiCode::Disconnect => Self::Disconnect,
            ApiCode::DeviceState | ApiCode::SensorUpdate => {
                let payload = sentence
                    .get(PAYLOAD_OFFSET..)
                    .ok_or_else(|| ParseError::Payload(sentence.to_string()))?;
                Self::States {
                    code,
                    states: parse_payload(payload)?,
                }
            }
            ApiCode::ErrorReport | ApiCode::VersionReport => Self::Report { code },
            ApiCode::Unknown(code) => Self::Unknown { code },
        })
    }

    /// Returns `true` if the message must be acknowledged as received.
    #[must_use]
    pub fn is_acknowledged(&self) -> bool {
        matches!(self, Self::States { .. } | Self::Report { .. })
    }
}

/// Extracts the code from `AWS_SEND=A<up to 3 digits>`.
fn parse_api_code(sentence: &str) -> Result<u16, ParseError> {
    let digits = sentence
        .strip_prefix(SEND_HEADER)
        .map(|rest| {
            let len = rest
                .bytes()
                .take(3)
                .take_while(u8::is_ascii_digit)
                .count();
            &rest[..len]
        })
        .filter(|digits| !digits.is_empty())
        .ok_or_else(|| ParseError::ApiCode(sentence.to_string()))?;

    digits
        .parse()
        .map_err(|_| ParseError::ApiCode(sentence.to_string()))
}

/// Splits a payload on commas and parses every token.
fn parse_payload(payload: &str) -> Result<StateMap, ParseError> {
    let mut states = StateMap::new();
    for token in payload.split(',').filter(|t| !t.is_empty()) {
        let (key, value) =
            parse_token(token).ok_or_else(|| ParseError::Token(token.to_string()))?;
        states.insert(key, value);
    }
    Ok(states)
}

/// Parses `"<key>":"<digits>"`, ignoring anything after the closing quote.
fn parse_token(token: &str) -> Option<(&str, u16)> {
    let (key, rest) = token.strip_prefix('"')?.split_once('"')?;
    if key.is_empty() || key.len() > MAX_KEY_LENGTH || key.contains(char::is_whitespace) {
        return None;
    }

    let rest = rest.strip_prefix(":\"")?;
    let len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    let (digits, rest) = rest.split_at(len);
    if !rest.starts_with('"') {
        return None;
    }

    // Values wider than 16 bits wrap
    let value = digits.bytes().fold(0u16, |acc, d| {
        acc.wrapping_mul(10).wrapping_add(u16::from(d - b'0'))
    });
    Some((key, value))
}

/// Encodes pending changes as an `AWS_RECV` command.
///
/// Returns `None` for an empty map: there is nothing to send.
///
/// # Examples
///
/// ```
/// use winix_bridge::protocol::encode_states;
/// use winix_bridge::state::StateMap;
///
/// let states: StateMap = [("A02", 0), ("A04", 5)].into_iter().collect();
/// assert_eq!(
///     encode_states(&states).as_deref(),
///     Some(r#"AWS_RECV:A211 12 {"A02":"0","A04":"5"}"#)
/// );
/// assert!(encode_states(&StateMap::new()).is_none());
/// ```
#[must_use]
pub fn encode_states(states: &StateMap) -> Option<String> {
    if states.is_empty() {
        return None;
    }

    let body = states
        .iter()
        .map(|(key, value)| format!("\"{key}\":\"{value}\""))
        .collect::<Vec<_>>()
        .join(",");

    Some(format!("{RECV_HEADER}{{{body}}}"))
}
