// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the Winix bridge.
//!
//! This module provides the error hierarchy used across the library: value
//! validation, sentence classification, application message decoding and
//! serial transport failures.
//!
//! Only transport failures ever surface from [`Bridge::tick`](crate::Bridge::tick).
//! Everything else is logged and the offending sentence is dropped, so the
//! bridge stays ready for the next byte.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// A sentence could not be classified.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// An application message could not be decoded.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The serial link failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Bridge configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// An invalid power state string was provided.
    #[error("invalid power state: {0}")]
    InvalidPowerState(String),

    /// The raw air-quality level is not one of 1, 2 or 3.
    #[error("invalid air quality level: {0}")]
    InvalidAirQuality(u16),

    /// The key is not part of the known attribute vocabulary.
    #[error("unknown attribute key: {0}")]
    UnknownKey(String),
}

/// Errors related to sentence classification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The sentence does not start with the inbound prefix.
    #[error("sentence missing prefix {prefix:?}: {sentence}")]
    MissingPrefix {
        /// The expected prefix.
        prefix: String,
        /// The offending sentence.
        sentence: String,
    },

    /// The sentence kind is not handled by the bridge.
    #[error("unsupported sentence: {0}")]
    Unsupported(String),
}

/// Errors related to decoding application messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The `AWS_SEND=A<code>` header could not be matched.
    #[error("failed to extract API code from: {0}")]
    ApiCode(String),

    /// A payload token did not match the `"key":"value"` pattern.
    #[error("failed to extract key/value from token: {0}")]
    Token(String),

    /// The payload offset lies past the end of the sentence or inside a
    /// multi-byte character.
    #[error("missing or corrupted payload: {0}")]
    Payload(String),
}

/// Errors raised by the serial link.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Reading a byte from the link failed.
    #[error("read failed: {0}")]
    Read(#[source] std::io::Error),

    /// Writing a sentence to the link failed.
    #[error("write failed: {0}")]
    Write(#[source] std::io::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
