// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sentence classification and outbound sentence rendering.

use std::fmt;

use crate::error::ProtocolError;

/// A classified inbound sentence, prefix stripped.
///
/// Example sentences as sent by the MCU:
///
/// ```text
/// AT*ICT*MCU_READY=1.2.0
/// AT*ICT*MIB=32
/// AT*ICT*SETMIB=18 C545
/// AT*ICT*AWS_SEND=A220 {"S07":"01","S08":"116","S14":"34"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// `AWS_SEND...`: an application message, kept verbatim for the codec.
    Aws(String),
    /// `MCU_READY...`: the MCU finished booting.
    McuReady,
    /// `MIB=32`: capability block negotiation.
    Mib,
    /// `SETMIB...`: capability block assignment.
    SetMib,
    /// `SMODE...`: mode set.
    Smode,
}

impl Inbound {
    /// Classifies a framed sentence.
    ///
    /// Prefixes are tried in order and the first match wins.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::MissingPrefix` if the sentence does not start
    /// with `prefix`, or `ProtocolError::Unsupported` if no sentence kind
    /// matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use winix_bridge::protocol::Inbound;
    ///
    /// assert_eq!(Inbound::parse("AT*ICT*MIB=32", "AT*ICT*"), Ok(Inbound::Mib));
    /// assert!(Inbound::parse("MIB=32", "AT*ICT*").is_err());
    /// ```
    pub fn parse(sentence: &str, prefix: &str) -> Result<Self, ProtocolError> {
        let body = sentence
            .strip_prefix(prefix)
            .ok_or_else(|| ProtocolError::MissingPrefix {
                prefix: prefix.to_string(),
                sentence: sentence.to_string(),
            })?;

        if body.starts_with("AWS_SEND") {
            Ok(Self::Aws(body.to_string()))
        } else if body.starts_with("MCU_READY") {
            Ok(Self::McuReady)
        } else if body.starts_with("MIB=32") {
            Ok(Self::Mib)
        } else if body.starts_with("SETMIB") {
            Ok(Self::SetMib)
        } else if body.starts_with("SMODE") {
            Ok(Self::Smode)
        } else {
            Err(ProtocolError::Unsupported(body.to_string()))
        }
    }
}

/// A sentence the bridge writes to the MCU, before the outbound prefix and
/// line terminator are added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// `DEVICEREADY`: announces the bridge is ready.
    DeviceReady,
    /// `MCU_READY:OK`.
    McuReadyOk,
    /// `MIB:OK <version>`: reports the emulated module's firmware version.
    MibOk(String),
    /// `SETMIB:OK`.
    SetMibOk,
    /// `SMODE:OK`.
    SmodeOk,
    /// `AWS_IND:CONNECT OK`: the cloud session is up.
    ConnectOk,
    /// `AWS_SEND:OK`: application message accepted.
    SendOk,
    /// `AWS_IND:SEND OK`: application message delivered.
    SendIndication,
    /// `AWS_IND:DISCONNECTED`.
    Disconnected,
    /// `AWS_RECV:A211 12 {...}`: an encoded state-change command.
    StateCommand(String),
}

impl fmt::Display for Outbound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceReady => f.write_str("DEVICEREADY"),
            Self::McuReadyOk => f.write_str("MCU_READY:OK"),
            Self::MibOk(version) => write!(f, "MIB:OK {version}"),
            Self::SetMibOk => f.write_str("SETMIB:OK"),
            Self::SmodeOk => f.write_str("SMODE:OK"),
            Self::ConnectOk => f.write_str("AWS_IND:CONNECT OK"),
            Self::SendOk => f.write_str("AWS_SEND:OK"),
            Self::SendIndication => f.write_str("AWS_IND:SEND OK"),
            Self::Disconnected => f.write_str("AWS_IND:DISCONNECTED"),
            Self::StateCommand(sentence) => f.write_str(sentence),
        }
    }
}
