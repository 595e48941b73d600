// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collaborators the bridge consumes: the serial link and a clock.
//!
//! Opening the link is the caller's business; the bridge only needs a
//! byte-addressable, non-blocking view of it. In-memory implementations are
//! provided for tests and simulations.

use std::io;

mod clock;
mod memory;

pub use clock::{ManualClock, MonotonicClock};
pub use memory::MemoryPort;

/// A non-blocking, byte-addressable serial link.
pub trait SerialPort {
    /// Returns the number of bytes that can be read without blocking.
    fn available(&self) -> usize;

    /// Reads one byte.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the byte could not be read.
    fn read_byte(&mut self) -> io::Result<u8>;

    /// Writes all of `data`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the link rejected the write.
    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()>;
}

/// A monotonic millisecond clock.
///
/// Only differences between readings are meaningful; callers subtract with
/// wrapping arithmetic.
pub trait Clock {
    /// Returns the current time in milliseconds.
    fn now_ms(&self) -> u64;
}
