// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line framer for the MCU serial stream.
//!
//! The MCU terminates sentences with `\r\n`. The carriage return ends a
//! sentence; line feeds are discarded wherever they appear. Sentences longer
//! than the buffer are truncated rather than rejected.

use bytes::{BufMut, BytesMut};

use super::MAX_LINE_LENGTH;

/// Accumulates bytes until a carriage return completes a sentence.
///
/// One framer belongs to one serial link; its cursor persists across calls.
///
/// # Examples
///
/// ```
/// use winix_bridge::protocol::LineFramer;
///
/// let mut framer = LineFramer::new();
/// let lines = framer.feed_bytes(b"AT*ICT*MIB=32\r\nAT*ICT*SM");
/// assert_eq!(lines, vec!["AT*ICT*MIB=32".to_string()]);
///
/// // The partial sentence is completed by the next chunk
/// assert_eq!(framer.feed_bytes(b"ODE\r"), vec!["AT*ICT*SMODE".to_string()]);
/// ```
#[derive(Debug)]
pub struct LineFramer {
    buffer: BytesMut,
    max_length: usize,
}

impl LineFramer {
    /// Creates a framer bounded to [`MAX_LINE_LENGTH`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_length(MAX_LINE_LENGTH)
    }

    /// Creates a framer whose sentences hold at most `max_length - 1` bytes.
    #[must_use]
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(max_length),
            max_length,
        }
    }

    /// Feeds one byte, returning a sentence when the byte is `\r`.
    pub fn feed(&mut self, byte: u8) -> Option<String> {
        match byte {
            b'\n' => None,
            b'\r' => {
                let sentence = String::from_utf8_lossy(&self.buffer).into_owned();
                self.buffer.clear();
                Some(sentence)
            }
            _ => {
                if self.buffer.len() + 1 < self.max_length {
                    self.buffer.put_u8(byte);
                } else {
                    tracing::trace!(byte, "Line buffer full, dropping byte");
                }
                None
            }
        }
    }

    /// Feeds a chunk of bytes, returning every sentence it completes.
    pub fn feed_bytes(&mut self, data: &[u8]) -> Vec<String> {
        data.iter().filter_map(|&byte| self.feed(byte)).collect()
    }

    /// Returns the number of bytes waiting for a terminator.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Discards any partial sentence.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}
