// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The bridge between the MCU serial link and the device-state model.
//!
//! A [`Bridge`] owns one serial link. Each [`tick`](Bridge::tick):
//!
//! 1. evaluates the handshake timeout,
//! 2. reads bytes until one sentence is framed or the link runs dry,
//! 3. routes that sentence (handshake reply or application message),
//! 4. publishes pending state deltas to observers.
//!
//! Nothing blocks. [`run`](Bridge::run) drives ticks on a tokio interval
//! until a shutdown future completes.

use std::future::Future;
use std::sync::Arc;

use tokio::time::MissedTickBehavior;

use crate::command::ControlRequest;
use crate::config::BridgeConfig;
use crate::error::{Result, TransportError};
use crate::protocol::{
    AwsMessage, Handshake, HandshakeEvent, HandshakeState, Inbound, LineFramer, Outbound,
    encode_states,
};
use crate::state::{DeviceState, PendingStates, StateChange, StateMap};
use crate::subscription::{CallbackRegistry, Subscribable, SubscriptionId};
use crate::transport::{Clock, SerialPort};
use crate::types::{AirQuality, FanSpeed, PowerState, SensorKind, SwitchKind};

/// Protocol bridge for one purifier.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use winix_bridge::transport::{ManualClock, MemoryPort};
/// use winix_bridge::types::PowerState;
/// use winix_bridge::{Bridge, BridgeConfig};
///
/// # fn main() -> winix_bridge::Result<()> {
/// let port = MemoryPort::new();
/// let clock = ManualClock::new();
/// let mut bridge = Bridge::new(port.clone(), clock.clone(), BridgeConfig::default())?;
///
/// port.inject_str("AT*ICT*AWS_SEND=A210 {\"A02\":\"1\",\"A04\":\"5\"}\r\n");
/// bridge.tick()?;
///
/// assert_eq!(bridge.state().power(), Some(PowerState::On));
/// assert_eq!(
///     port.take_written_sentences(),
///     vec!["*ICT*AWS_SEND:OK".to_string(), "*ICT*AWS_IND:SEND OK".to_string()]
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bridge<P, C> {
    port: P,
    clock: C,
    config: BridgeConfig,
    framer: LineFramer,
    handshake: Handshake,
    pending: PendingStates,
    state: DeviceState,
    read_error: Option<TransportError>,
    callbacks: Arc<CallbackRegistry>,
}

impl<P: SerialPort, C: Clock> Bridge<P, C> {
    /// Creates a bridge over an open serial link.
    ///
    /// The handshake starts in `Reset`, stamped with the current clock
    /// reading, so `DEVICEREADY` is first announced one ready timeout later.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration fails validation.
    pub fn new(port: P, clock: C, config: BridgeConfig) -> Result<Self> {
        config.validate()?;

        let handshake = Handshake::new(
            clock.now_ms(),
            config.ready_timeout,
            config.module_version.clone(),
        );

        Ok(Self {
            port,
            clock,
            config,
            framer: LineFramer::new(),
            handshake,
            pending: PendingStates::new(),
            state: DeviceState::new(),
            read_error: None,
            callbacks: Arc::new(CallbackRegistry::new()),
        })
    }

    /// Restarts the session after the caller reopened the serial link.
    ///
    /// The handshake returns to `Reset` stamped now, and any partial sentence
    /// or unpublished state is discarded. The last-known device state is kept.
    pub fn reset_link(&mut self) {
        let now = self.clock.now_ms();
        tracing::info!("Serial link reset");
        self.handshake.reset(now);
        self.framer.clear();
        let _ = self.pending.take();
        self.read_error = None;
    }

    /// Runs one cooperative step.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` if writing a reply to the link fails.
    /// Malformed input is logged and dropped, never returned.
    pub fn tick(&mut self) -> Result<()> {
        let now = self.clock.now_ms();
        self.drive_handshake(HandshakeEvent::Poll, now)?;

        if let Some(sentence) = self.read_sentence() {
            self.route(&sentence)?;
        }

        self.publish();
        Ok(())
    }

    /// Ticks every `poll_interval` until `shutdown` completes.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`tick`](Self::tick).
    pub async fn run<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        tracing::info!(poll_interval = ?self.config.poll_interval, "Bridge running");
        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("Bridge stopped");
                    return Ok(());
                }
                _ = interval.tick() => self.tick()?,
            }
        }
    }

    /// Sends a control request to the purifier.
    ///
    /// Only attributes that differ from the last-known state are sent. The
    /// change is applied to the local state right away and observers are
    /// notified, without waiting for the MCU to report it back.
    ///
    /// Returns `false` if nothing needed to change; nothing is written then.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` if the command could not be written. The
    /// local state is left untouched in that case.
    pub fn control(&mut self, request: &ControlRequest) -> Result<bool> {
        let delta = request.diff(&self.state);
        let Some(command) = encode_states(&delta) else {
            tracing::debug!(?request, "Control request changes nothing");
            return Ok(false);
        };

        self.write_sentence(&Outbound::StateCommand(command))?;
        self.notify(&delta);
        Ok(true)
    }

    fn read_sentence(&mut self) -> Option<String> {
        while self.port.available() > 0 {
            match self.port.read_byte() {
                Ok(byte) => {
                    if let Some(sentence) = self.framer.feed(byte) {
                        return Some(sentence);
                    }
                }
                Err(error) => {
                    let error = TransportError::Read(error);
                    tracing::warn!(%error, "Serial read failed");
                    self.read_error = Some(error);
                    return None;
                }
            }
        }
        None
    }

    fn route(&mut self, sentence: &str) -> Result<()> {
        tracing::debug!(sentence, "Received sentence");

        let inbound = match Inbound::parse(sentence, &self.config.rx_prefix) {
            Ok(inbound) => inbound,
            Err(error @ crate::error::ProtocolError::MissingPrefix { .. }) => {
                tracing::warn!(%error, "Dropping sentence");
                return Ok(());
            }
            Err(error) => {
                tracing::debug!(%error, "Ignoring sentence");
                return Ok(());
            }
        };

        let now = self.clock.now_ms();
        match inbound {
            Inbound::Aws(body) => self.handle_aws(&body, now),
            Inbound::McuReady => {
                tracing::info!("MCU ready");
                self.drive_handshake(HandshakeEvent::McuReady, now)
            }
            Inbound::Mib => {
                tracing::info!(version = %self.config.module_version, "Capability block negotiated");
                self.drive_handshake(HandshakeEvent::MibNegotiated, now)
            }
            Inbound::SetMib => {
                tracing::info!(sentence, "Capability block assigned");
                self.write_sentence(&Outbound::SetMibOk)
            }
            Inbound::Smode => {
                tracing::info!(sentence, "Mode set");
                self.write_sentence(&Outbound::SmodeOk)
            }
        }
    }

    fn handle_aws(&mut self, body: &str, now: u64) -> Result<()> {
        let message = match AwsMessage::decode(body) {
            Ok(message) => message,
            Err(error) => {
                tracing::error!(%error, sentence = body, "Failed to decode application message");
                return Ok(());
            }
        };

        match message {
            AwsMessage::Disconnect => {
                tracing::info!("MCU reported cloud link down");
                self.drive_handshake(HandshakeEvent::DisconnectNotice, now)?;
                self.callbacks.dispatch_disconnected();
                return Ok(());
            }
            AwsMessage::States { code, states } => {
                tracing::info!(%code, count = states.len(), "State update");
                self.pending.merge(states);
            }
            AwsMessage::Report { code } => {
                tracing::info!(%code, sentence = body, "Report received");
            }
            AwsMessage::Unknown { code } => {
                tracing::debug!(code, sentence = body, "Unknown API code");
                return Ok(());
            }
        }

        self.drive_handshake(HandshakeEvent::ApplicationMessage, now)
    }

    fn drive_handshake(&mut self, event: HandshakeEvent, now: u64) -> Result<()> {
        // Commit only once every reply is on the wire, so a failed write is
        // retried on the next poll or message.
        let transition = self.handshake.transition(event, self.handshake.elapsed(now));
        for reply in &transition.replies {
            self.write_sentence(reply)?;
        }
        self.handshake.commit(&transition, now);
        if transition.entered(HandshakeState::Connected) {
            self.callbacks.dispatch_connected(&self.state);
        }
        Ok(())
    }

    fn write_sentence(&mut self, sentence: &Outbound) -> Result<()> {
        tracing::debug!(%sentence, "Sending sentence");
        let line = format!("{}{sentence}\r\n", self.config.tx_prefix);
        self.port
            .write_bytes(line.as_bytes())
            .map_err(TransportError::Write)?;
        Ok(())
    }

    fn publish(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let states = self.pending.take();
        self.callbacks.dispatch_published(&states);
        self.notify(&states);
    }

    fn notify(&mut self, delta: &StateMap) {
        for change in self.state.apply_delta(delta) {
            tracing::info!(?change, "State changed");
            self.callbacks.dispatch(&change);
        }
    }
}

impl<P, C> Bridge<P, C> {
    /// Returns the last-known device state.
    #[must_use]
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Returns the handshake state.
    #[must_use]
    pub fn handshake_state(&self) -> HandshakeState {
        self.handshake.state()
    }

    /// Returns `true` once the handshake reached `Connected`.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.handshake.is_connected()
    }

    /// Returns the deltas waiting for the next publish step.
    #[must_use]
    pub fn pending(&self) -> &StateMap {
        self.pending.peek()
    }

    /// Takes the last serial read failure, if any occurred since the
    /// previous call. Read failures never fail [`tick`](Bridge::tick).
    pub fn take_read_error(&mut self) -> Option<TransportError> {
        self.read_error.take()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Returns the callback registry, for sharing with other owners.
    #[must_use]
    pub fn callbacks(&self) -> &Arc<CallbackRegistry> {
        &self.callbacks
    }

    /// Returns a reference to the serial link.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Returns a mutable reference to the serial link.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Decomposes the bridge into its link and clock.
    pub fn into_parts(self) -> (P, C) {
        (self.port, self.clock)
    }
}

impl<P, C> Subscribable for Bridge<P, C> {
    fn on_states_published<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateMap) + Send + Sync + 'static,
    {
        self.callbacks.on_states_published(callback)
    }

    fn on_power_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(PowerState) + Send + Sync + 'static,
    {
        self.callbacks.on_power_changed(callback)
    }

    fn on_speed_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(FanSpeed) + Send + Sync + 'static,
    {
        self.callbacks.on_speed_changed(callback)
    }

    fn on_air_quality_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(AirQuality) + Send + Sync + 'static,
    {
        self.callbacks.on_air_quality_changed(callback)
    }

    fn on_sensor_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(SensorKind, u16) + Send + Sync + 'static,
    {
        self.callbacks.on_sensor_changed(callback)
    }

    fn on_switch_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(SwitchKind, bool) + Send + Sync + 'static,
    {
        self.callbacks.on_switch_changed(callback)
    }

    fn on_connected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceState) + Send + Sync + 'static,
    {
        self.callbacks.on_connected(callback)
    }

    fn on_disconnected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.on_disconnected(callback)
    }

    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        self.callbacks.on_state_changed(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::Error;
    use crate::transport::{ManualClock, MemoryPort};

    fn bridge() -> (Bridge<MemoryPort, ManualClock>, MemoryPort, ManualClock) {
        let port = MemoryPort::new();
        let clock = ManualClock::new();
        let bridge = Bridge::new(port.clone(), clock.clone(), BridgeConfig::default()).unwrap();
        (bridge, port, clock)
    }

    #[test]
    fn rejects_invalid_config() {
        let config = BridgeConfig::default().with_rx_prefix("");
        let result = Bridge::new(MemoryPort::new(), ManualClock::new(), config);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn one_sentence_per_tick() {
        let (mut bridge, port, _) = bridge();
        port.inject_str("AT*ICT*SETMIB=18 C545\r\nAT*ICT*SMODE=1\r\n");

        bridge.tick().unwrap();
        assert_eq!(port.take_written_sentences(), vec!["*ICT*SETMIB:OK"]);
        assert!(port.pending_reads() > 0);

        bridge.tick().unwrap();
        assert_eq!(port.take_written_sentences(), vec!["*ICT*SMODE:OK"]);
    }

    #[test]
    fn partial_sentence_waits_for_terminator() {
        let (mut bridge, port, _) = bridge();
        port.inject_str("AT*ICT*SMO");
        bridge.tick().unwrap();
        assert!(port.written().is_empty());

        port.inject_str("DE=1\r");
        bridge.tick().unwrap();
        assert_eq!(port.take_written_sentences(), vec!["*ICT*SMODE:OK"]);
    }

    #[test]
    fn read_error_ends_the_read_loop() {
        let (mut bridge, port, _) = bridge();
        port.inject_str("AT*ICT*SM");
        port.inject_read_error();
        port.inject_str("ODE=1\r");

        bridge.tick().unwrap();
        assert!(port.written().is_empty());
        assert!(matches!(
            bridge.take_read_error(),
            Some(TransportError::Read(_))
        ));
        assert!(bridge.take_read_error().is_none());

        // The framer kept its partial sentence across the failure
        bridge.tick().unwrap();
        assert_eq!(port.take_written_sentences(), vec!["*ICT*SMODE:OK"]);
    }

    #[test]
    fn prefix_mismatch_and_unsupported_are_silent() {
        let (mut bridge, port, _) = bridge();
        port.inject_str("ICT*MIB=32\r\nAT*ICT*ASSOCIATED:0\r\n");
        bridge.tick().unwrap();
        bridge.tick().unwrap();
        assert!(port.written().is_empty());
        assert_eq!(bridge.handshake_state(), HandshakeState::Reset);
    }

    #[test]
    fn write_failure_is_returned() {
        let (mut bridge, port, _) = bridge();
        port.set_fail_writes(true);
        port.inject_str("AT*ICT*SMODE=1\r");
        assert!(matches!(
            bridge.tick(),
            Err(Error::Transport(TransportError::Write(_)))
        ));
    }

    #[test]
    fn states_are_published_once_per_batch() {
        let (mut bridge, port, _) = bridge();
        let batches = Arc::new(AtomicU32::new(0));
        let b = batches.clone();
        bridge.on_states_published(move |_| {
            b.fetch_add(1, Ordering::SeqCst);
        });

        port.inject_str("AT*ICT*AWS_SEND=A220 {\"S08\":\"97\",\"S14\":\"34\"}\r");
        bridge.tick().unwrap();
        assert_eq!(batches.load(Ordering::SeqCst), 1);
        assert!(bridge.pending().is_empty());

        // Nothing pending, nothing published
        bridge.tick().unwrap();
        assert_eq!(batches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn control_writes_and_applies() {
        let (mut bridge, port, _) = bridge();
        let speeds = Arc::new(AtomicU32::new(0));
        let s = speeds.clone();
        bridge.on_speed_changed(move |speed| {
            s.store(u32::from(speed.value()), Ordering::SeqCst);
        });

        let request = ControlRequest::new().with_speed(FanSpeed::TURBO);
        assert!(bridge.control(&request).unwrap());
        assert_eq!(
            port.take_written_sentences(),
            vec![r#"*ICT*AWS_RECV:A211 12 {"A04":"5"}"#]
        );
        assert_eq!(bridge.state().speed(), Some(FanSpeed::TURBO));
        assert_eq!(speeds.load(Ordering::SeqCst), 4);

        assert!(!bridge.control(&request).unwrap());
        assert!(port.written().is_empty());
    }

    #[test]
    fn control_write_failure_leaves_state() {
        let (mut bridge, port, _) = bridge();
        port.set_fail_writes(true);
        let request = ControlRequest::new().with_power(PowerState::On);
        assert!(bridge.control(&request).is_err());
        assert!(bridge.state().power().is_none());
    }

    #[test]
    fn connected_and_disconnected_callbacks() {
        let (mut bridge, port, clock) = bridge();
        let connected = Arc::new(AtomicU32::new(0));
        let disconnected = Arc::new(AtomicU32::new(0));
        let c = connected.clone();
        let d = disconnected.clone();
        bridge.on_connected(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        bridge.on_disconnected(move || {
            d.fetch_add(1, Ordering::SeqCst);
        });

        port.inject_str("AT*ICT*MIB=32\r");
        bridge.tick().unwrap();
        clock.advance(Duration::from_millis(16));
        bridge.tick().unwrap();
        assert!(bridge.is_connected());

        // A valid message while connected does not re-enter
        port.inject_str("AT*ICT*AWS_SEND=A240 1.2.0\r");
        bridge.tick().unwrap();
        assert_eq!(connected.load(Ordering::SeqCst), 1);

        port.inject_str("AT*ICT*AWS_SEND=A102\r");
        bridge.tick().unwrap();
        assert_eq!(disconnected.load(Ordering::SeqCst), 1);
        assert_eq!(bridge.handshake_state(), HandshakeState::Reset);
    }

    #[test]
    fn failed_connect_reply_is_retried() {
        let (mut bridge, port, clock) = bridge();
        let connected = Arc::new(AtomicU32::new(0));
        let c = connected.clone();
        bridge.on_connected(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        port.inject_str("AT*ICT*MIB=32\r");
        bridge.tick().unwrap();
        port.clear_written();

        port.set_fail_writes(true);
        clock.advance(Duration::from_millis(16));
        assert!(bridge.tick().is_err());
        assert_eq!(bridge.handshake_state(), HandshakeState::Mib);
        assert_eq!(connected.load(Ordering::SeqCst), 0);

        port.set_fail_writes(false);
        clock.advance(Duration::from_millis(16));
        bridge.tick().unwrap();
        assert_eq!(port.take_written_sentences(), vec!["*ICT*AWS_IND:CONNECT OK"]);
        assert!(bridge.is_connected());
        assert_eq!(connected.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_ready_announcement_is_retried() {
        let (mut bridge, port, clock) = bridge();
        port.set_fail_writes(true);
        clock.advance(Duration::from_secs(10));
        assert!(bridge.tick().is_err());
        assert_eq!(bridge.handshake_state(), HandshakeState::Reset);

        port.set_fail_writes(false);
        clock.advance(Duration::from_millis(16));
        bridge.tick().unwrap();
        assert_eq!(port.take_written_sentences(), vec!["*ICT*DEVICEREADY"]);
        assert_eq!(bridge.handshake_state(), HandshakeState::DeviceReady);
    }

    #[test]
    fn reset_link_restarts_the_session() {
        let (mut bridge, port, clock) = bridge();
        port.inject_str("AT*ICT*AWS_SEND=A240 1.2.0\r");
        bridge.tick().unwrap();
        assert!(bridge.is_connected());

        port.inject_str("AT*ICT*SMO");
        bridge.tick().unwrap();
        clock.advance(Duration::from_secs(3));
        bridge.reset_link();
        assert_eq!(bridge.handshake_state(), HandshakeState::Reset);
        port.clear_written();

        // The partial sentence was discarded with the old link
        port.inject_str("DE=1\r");
        bridge.tick().unwrap();
        assert!(port.written().is_empty());

        // Ready is announced one timeout after the reset, not after start
        clock.advance(Duration::from_millis(9_999));
        bridge.tick().unwrap();
        assert!(port.written().is_empty());
        clock.advance(Duration::from_millis(1));
        bridge.tick().unwrap();
        assert_eq!(port.take_written_sentences(), vec!["*ICT*DEVICEREADY"]);
    }

    #[test]
    fn unsubscribe_through_bridge() {
        let (bridge, _, _) = bridge();
        let id = bridge.on_power_changed(|_| {});
        assert_eq!(bridge.callbacks().callback_count(), 1);
        assert!(bridge.unsubscribe(id));
        assert!(bridge.callbacks().is_empty());
    }
}
