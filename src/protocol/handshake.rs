// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection handshake between the bridge and the MCU.
//!
//! The MCU expects to talk to a Wi-Fi module that announces itself, answers
//! capability negotiation and finally reports a cloud connection:
//!
//! ```text
//! Reset ──(10 s idle)──▶ DeviceReady ──MIB=32──▶ Mib ──(next poll)──▶ Connected
//!   ▲          MCU_READY ──▶ DeviceReady
//!   └──────────── AWS_SEND=A102 from any state
//!                 any acknowledged application message ──▶ Connected
//! ```
//!
//! While in `Reset` or `DeviceReady`, `DEVICEREADY` is re-announced every time
//! the ready timeout elapses without another handshake event.

use std::fmt;
use std::time::Duration;

use super::Outbound;

/// Handshake progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum HandshakeState {
    /// Nothing negotiated yet.
    Reset,
    /// Readiness announced or acknowledged.
    DeviceReady,
    /// Capability block negotiated.
    Mib,
    /// Session established.
    Connected,
}

impl HandshakeState {
    /// Returns the state name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Reset => "Reset",
            Self::DeviceReady => "DeviceReady",
            Self::Mib => "Mib",
            Self::Connected => "Connected",
        }
    }
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs that drive the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandshakeEvent {
    /// Periodic timeout evaluation, once per tick.
    Poll,
    /// `MCU_READY` received.
    McuReady,
    /// `MIB=32` received.
    MibNegotiated,
    /// `AWS_SEND=A102` received.
    DisconnectNotice,
    /// An application message was accepted.
    ApplicationMessage,
}

/// Outcome of feeding one event to the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State before the event.
    pub from: HandshakeState,
    /// New state, or `None` when the event leaves the machine untouched.
    ///
    /// A `Some` also restamps the last-event time, even when the state is
    /// unchanged.
    pub to: Option<HandshakeState>,
    /// Sentences to write to the MCU, in order.
    pub replies: Vec<Outbound>,
}

impl Transition {
    fn idle(from: HandshakeState) -> Self {
        Self {
            from,
            to: None,
            replies: Vec::new(),
        }
    }

    fn to(from: HandshakeState, to: HandshakeState, replies: Vec<Outbound>) -> Self {
        Self {
            from,
            to: Some(to),
            replies,
        }
    }

    /// Returns `true` if the transition moved into `state` from a different one.
    #[must_use]
    pub fn entered(&self, state: HandshakeState) -> bool {
        self.to == Some(state) && self.from != state
    }
}

/// The handshake state machine.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use winix_bridge::protocol::{Handshake, HandshakeEvent, HandshakeState, Outbound};
///
/// let mut handshake = Handshake::new(0, Duration::from_secs(10), "7595");
///
/// // Grace period after link open
/// assert!(handshake.handle(HandshakeEvent::Poll, 9_999).replies.is_empty());
///
/// let t = handshake.handle(HandshakeEvent::Poll, 10_000);
/// assert_eq!(t.replies, vec![Outbound::DeviceReady]);
/// assert_eq!(handshake.state(), HandshakeState::DeviceReady);
/// ```
#[derive(Debug, Clone)]
pub struct Handshake {
    state: HandshakeState,
    last_event_ms: u64,
    ready_timeout: Duration,
    module_version: String,
}

impl Handshake {
    /// Creates a handshake in `Reset`, stamped at `now_ms`.
    #[must_use]
    pub fn new(now_ms: u64, ready_timeout: Duration, module_version: impl Into<String>) -> Self {
        Self {
            state: HandshakeState::Reset,
            last_event_ms: now_ms,
            ready_timeout,
            module_version: module_version.into(),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Returns the time of the last state-relevant event.
    #[must_use]
    pub fn last_event_ms(&self) -> u64 {
        self.last_event_ms
    }

    /// Returns `true` once the session is established.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state == HandshakeState::Connected
    }

    /// Computes the transition for `event` given the time elapsed since the
    /// last recorded event, without modifying the machine.
    #[must_use]
    pub fn transition(&self, event: HandshakeEvent, elapsed: Duration) -> Transition {
        use HandshakeState::{Connected, DeviceReady, Mib, Reset};

        let from = self.state;
        match event {
            HandshakeEvent::Poll => match from {
                Connected => Transition::idle(from),
                Reset | DeviceReady if elapsed < self.ready_timeout => Transition::idle(from),
                Reset | DeviceReady => Transition::to(from, DeviceReady, vec![Outbound::DeviceReady]),
                Mib => Transition::to(from, Connected, vec![Outbound::ConnectOk]),
            },
            HandshakeEvent::McuReady => {
                Transition::to(from, DeviceReady, vec![Outbound::McuReadyOk])
            }
            HandshakeEvent::MibNegotiated => Transition::to(
                from,
                Mib,
                vec![Outbound::MibOk(self.module_version.clone())],
            ),
            HandshakeEvent::DisconnectNotice => Transition::to(
                from,
                Reset,
                vec![
                    Outbound::SendOk,
                    Outbound::SendIndication,
                    Outbound::Disconnected,
                ],
            ),
            HandshakeEvent::ApplicationMessage => Transition::to(
                from,
                Connected,
                vec![Outbound::SendOk, Outbound::SendIndication],
            ),
        }
    }

    /// Returns the time elapsed since the last recorded event, with the
    /// millisecond clock allowed to wrap.
    #[must_use]
    pub fn elapsed(&self, now_ms: u64) -> Duration {
        Duration::from_millis(now_ms.wrapping_sub(self.last_event_ms))
    }

    /// Commits a transition previously computed by
    /// [`transition`](Self::transition), stamping it at `now_ms`.
    ///
    /// Idle transitions leave the machine untouched.
    pub fn commit(&mut self, transition: &Transition, now_ms: u64) {
        let Some(to) = transition.to else {
            return;
        };
        if to != self.state {
            tracing::info!(from = %self.state, to = %to, "Handshake transition");
        }
        self.state = to;
        self.last_event_ms = now_ms;
    }

    /// Feeds `event` at `now_ms`, applying the resulting transition.
    pub fn handle(&mut self, event: HandshakeEvent, now_ms: u64) -> Transition {
        let transition = self.transition(event, self.elapsed(now_ms));
        self.commit(&transition, now_ms);
        transition
    }

    /// Forces the machine back to `Reset`, stamped at `now_ms`.
    pub fn reset(&mut self, now_ms: u64) {
        self.state = HandshakeState::Reset;
        self.last_event_ms = now_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn handshake() -> Handshake {
        Handshake::new(0, TIMEOUT, "7595")
    }

    #[test]
    fn starts_in_reset() {
        let hs = handshake();
        assert_eq!(hs.state(), HandshakeState::Reset);
        assert!(!hs.is_connected());
    }

    #[test]
    fn transition_is_pure() {
        let hs = handshake();
        let t = hs.transition(HandshakeEvent::Poll, Duration::from_secs(11));
        assert_eq!(t.to, Some(HandshakeState::DeviceReady));
        assert_eq!(hs.state(), HandshakeState::Reset);
    }

    #[test]
    fn ready_is_reannounced_every_timeout() {
        let mut hs = handshake();
        assert_eq!(
            hs.handle(HandshakeEvent::Poll, 10_000).replies,
            vec![Outbound::DeviceReady]
        );
        assert!(hs.handle(HandshakeEvent::Poll, 15_000).replies.is_empty());
        assert_eq!(
            hs.handle(HandshakeEvent::Poll, 20_000).replies,
            vec![Outbound::DeviceReady]
        );
        assert_eq!(hs.last_event_ms(), 20_000);
    }

    #[test]
    fn full_sequence_reaches_connected() {
        let mut hs = handshake();
        hs.handle(HandshakeEvent::Poll, 10_000);

        let t = hs.handle(HandshakeEvent::McuReady, 10_500);
        assert_eq!(t.replies, vec![Outbound::McuReadyOk]);
        assert_eq!(hs.state(), HandshakeState::DeviceReady);

        let t = hs.handle(HandshakeEvent::MibNegotiated, 10_600);
        assert_eq!(t.replies, vec![Outbound::MibOk("7595".into())]);
        assert_eq!(hs.state(), HandshakeState::Mib);

        let t = hs.handle(HandshakeEvent::Poll, 10_610);
        assert_eq!(t.replies, vec![Outbound::ConnectOk]);
        assert!(t.entered(HandshakeState::Connected));
        assert!(hs.is_connected());

        // Terminal until a disconnect notice
        assert!(hs.handle(HandshakeEvent::Poll, 100_000).replies.is_empty());
        assert!(hs.is_connected());
    }

    #[test]
    fn disconnect_preempts_any_state() {
        for start in [
            HandshakeState::Reset,
            HandshakeState::DeviceReady,
            HandshakeState::Mib,
            HandshakeState::Connected,
        ] {
            let mut hs = handshake();
            hs.state = start;
            let t = hs.handle(HandshakeEvent::DisconnectNotice, 5);
            assert_eq!(hs.state(), HandshakeState::Reset);
            assert_eq!(hs.last_event_ms(), 5);
            assert_eq!(
                t.replies,
                vec![
                    Outbound::SendOk,
                    Outbound::SendIndication,
                    Outbound::Disconnected
                ]
            );
        }
    }

    #[test]
    fn application_message_forces_connected() {
        let mut hs = handshake();
        let t = hs.handle(HandshakeEvent::ApplicationMessage, 1);
        assert!(t.entered(HandshakeState::Connected));
        assert_eq!(t.replies, vec![Outbound::SendOk, Outbound::SendIndication]);

        // Already connected: acknowledged again but not re-entered
        let t = hs.handle(HandshakeEvent::ApplicationMessage, 2);
        assert!(!t.entered(HandshakeState::Connected));
        assert_eq!(t.replies.len(), 2);
    }

    #[test]
    fn elapsed_survives_clock_wrap() {
        let mut hs = Handshake::new(u64::MAX - 1_000, TIMEOUT, "7595");
        assert!(hs.handle(HandshakeEvent::Poll, 5_000).replies.is_empty());
        assert_eq!(
            hs.handle(HandshakeEvent::Poll, 9_000).replies,
            vec![Outbound::DeviceReady]
        );
    }

    #[test]
    fn uncommitted_transition_is_computed_again() {
        let mut hs = handshake();
        hs.handle(HandshakeEvent::MibNegotiated, 100);

        let t = hs.transition(HandshakeEvent::Poll, hs.elapsed(110));
        assert_eq!(t.replies, vec![Outbound::ConnectOk]);
        assert_eq!(hs.state(), HandshakeState::Mib);

        let t = hs.transition(HandshakeEvent::Poll, hs.elapsed(120));
        assert!(t.entered(HandshakeState::Connected));
        hs.commit(&t, 120);
        assert!(hs.is_connected());
        assert_eq!(hs.last_event_ms(), 120);
    }

    #[test]
    fn reset_restamps() {
        let mut hs = handshake();
        hs.handle(HandshakeEvent::ApplicationMessage, 1);
        hs.reset(50);
        assert_eq!(hs.state(), HandshakeState::Reset);
        assert!(hs.handle(HandshakeEvent::Poll, 10_049).replies.is_empty());
    }
}
