// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory serial link.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use super::SerialPort;

/// An in-memory [`SerialPort`].
///
/// Clones share the same buffers, so a test can keep one handle while the
/// bridge owns another.
///
/// # Examples
///
/// ```
/// use winix_bridge::transport::{MemoryPort, SerialPort};
///
/// let mut port = MemoryPort::new();
/// let handle = port.clone();
///
/// handle.inject(b"OK");
/// assert_eq!(port.available(), 2);
/// assert_eq!(port.read_byte().unwrap(), b'O');
///
/// port.write_bytes(b"*ICT*DEVICEREADY\r\n").unwrap();
/// assert_eq!(handle.take_written_sentences(), vec!["*ICT*DEVICEREADY".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryPort {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    /// `None` marks an injected read failure.
    read_queue: VecDeque<Option<u8>>,
    written: Vec<u8>,
    fail_writes: bool,
}

impl MemoryPort {
    /// Creates an empty port.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues bytes to be read.
    pub fn inject(&self, data: &[u8]) {
        self.inner.lock().read_queue.extend(data.iter().copied().map(Some));
    }

    /// Queues the bytes of `text` to be read.
    pub fn inject_str(&self, text: &str) {
        self.inject(text.as_bytes());
    }

    /// Queues a read failure at the current end of the read queue.
    pub fn inject_read_error(&self) {
        self.inner.lock().read_queue.push_back(None);
    }

    /// Makes every following write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }

    /// Returns the number of queued reads, including injected failures.
    #[must_use]
    pub fn pending_reads(&self) -> usize {
        self.inner.lock().read_queue.len()
    }

    /// Returns a copy of everything written so far.
    #[must_use]
    pub fn written(&self) -> Vec<u8> {
        self.inner.lock().written.clone()
    }

    /// Drains the written bytes, split into `\r\n`-terminated sentences.
    ///
    /// A trailing unterminated fragment is kept as the last element.
    #[must_use]
    pub fn take_written_sentences(&self) -> Vec<String> {
        let written = std::mem::take(&mut self.inner.lock().written);
        String::from_utf8_lossy(&written)
            .split_terminator("\r\n")
            .map(str::to_string)
            .collect()
    }

    /// Discards everything written so far.
    pub fn clear_written(&self) {
        self.inner.lock().written.clear();
    }
}

impl SerialPort for MemoryPort {
    fn available(&self) -> usize {
        self.inner.lock().read_queue.len()
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        match self.inner.lock().read_queue.pop_front() {
            Some(Some(byte)) => Ok(byte),
            Some(None) => Err(io::Error::other("injected read failure")),
            None => Err(io::Error::new(io::ErrorKind::WouldBlock, "no data available")),
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        let mut inner = self.inner.lock();
        if inner.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "link closed"));
        }
        inner.written.extend_from_slice(data);
        Ok(())
    }
}
