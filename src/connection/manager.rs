//! Connection state machine.
//!
//! ```text
//!              open                     close (unintentional)
//! Connecting ───────> Connected ────────────────────────────┐
//!     ^                   │ error                           v
//!     │                   v          grace elapsed                   attempts left
//!     │                 Error ───────────────────────> Reconnecting ──────────────┐
//!     │                                                      │ exhausted           │
//!     │                                                      v                     │
//!     │                                                Disconnected                │
//!     └──────────────────────── reconnect timer fires ─────────────────────────────┘
//! ```
//!
//! `disconnect()` moves any state to `Disconnected`, cancels both timers and
//! closes the transport. The manager never sleeps: the session loop asks for
//! [`ConnectionManager::next_deadline`] and calls
//! [`ConnectionManager::fire_due_timers`] when it passes.

use std::time::Duration;

use tokio::time::Instant;

use super::policy::ReconnectPolicy;
use super::state::ConnectionState;
use super::transport::{
    Connector, Epoch, EventSender, Transport, TransportEvent, TransportEventKind,
};
use crate::protocol::{self, DecodeError, Frame};
use crate::sync::Outbound;
use crate::timer::{TimerSlot, earliest};

/// Something consumers of the connection need to know about.
#[derive(Debug)]
pub enum ConnectionEvent {
    StateChanged(ConnectionState),
    Frame(Frame),
    DecodeError(DecodeError),
}

pub struct ConnectionManager<C: Connector> {
    connector: C,
    url: String,
    events_tx: EventSender,
    state: ConnectionState,
    policy: ReconnectPolicy,
    error_grace: Duration,
    transport: Option<C::Transport>,
    epoch: Epoch,
    /// Set by `disconnect()`, cleared by `connect()`.
    intentional: bool,
    reconnect_timer: TimerSlot,
    grace_timer: TimerSlot,
    outbox: Vec<ConnectionEvent>,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(
        connector: C,
        url: impl Into<String>,
        events_tx: EventSender,
        policy: ReconnectPolicy,
        error_grace: Duration,
    ) -> Self {
        Self {
            connector,
            url: url.into(),
            events_tx,
            state: ConnectionState::Disconnected,
            policy,
            error_grace,
            transport: None,
            epoch: 0,
            intentional: false,
            reconnect_timer: TimerSlot::new(),
            grace_timer: TimerSlot::new(),
            outbox: Vec::new(),
        }
    }

    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    pub const fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    pub const fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Take the events produced since the last call, in order.
    pub fn drain_events(&mut self) -> Vec<ConnectionEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        earliest([&self.reconnect_timer, &self.grace_timer])
    }

    pub const fn reconnect_deadline(&self) -> Option<Instant> {
        self.reconnect_timer.deadline()
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// User-initiated connect. Resets the attempt budget.
    pub fn connect(&mut self, now: Instant) {
        crate::debug!("conn"; "connect to {}", self.url);
        self.intentional = false;
        self.reconnect_timer.cancel();
        self.grace_timer.cancel();
        self.policy.reset();
        self.open_transport(now);
    }

    /// Intentional close: nothing reconnects and no timer fires afterwards.
    pub fn disconnect(&mut self) {
        crate::debug!("conn"; "disconnect");
        self.intentional = true;
        self.reconnect_timer.cancel();
        self.grace_timer.cancel();
        self.close_transport();
        self.set_state(ConnectionState::Disconnected);
    }

    /// Transmit only while connected. `false` means the payload was dropped.
    pub fn send(&mut self, payload: &str) -> bool {
        if self.state != ConnectionState::Connected {
            return false;
        }
        let Some(transport) = self.transport.as_mut() else {
            return false;
        };
        match transport.send_text(payload.to_owned()) {
            Ok(()) => true,
            Err(e) => {
                crate::debug!("conn"; "send failed: {}", e);
                false
            }
        }
    }

    /// Feed one event from the transport layer.
    pub fn handle_event(&mut self, event: TransportEvent, now: Instant) {
        if event.epoch != self.epoch || self.intentional {
            crate::debug!("conn"; "dropping event from stale transport (epoch {})", event.epoch);
            return;
        }

        match event.kind {
            TransportEventKind::Opened => {
                if self.state == ConnectionState::Connecting {
                    self.policy.reset();
                    self.set_state(ConnectionState::Connected);
                }
            }
            TransportEventKind::Binary(bytes) => match protocol::decode(&bytes) {
                Ok(frame) => self.outbox.push(ConnectionEvent::Frame(frame)),
                Err(e) => {
                    crate::debug!("conn"; "decode failed ({} bytes): {}", bytes.len(), e);
                    self.outbox.push(ConnectionEvent::DecodeError(e));
                }
            },
            TransportEventKind::Text(text) => {
                crate::debug!("conn"; "ignoring text message ({} bytes)", text.len());
            }
            TransportEventKind::Error(message) => self.on_error(now, &message),
            TransportEventKind::Closed => self.on_closed(now),
        }
    }

    /// Run whichever timers are due. Each fire re-checks that its purpose is
    /// still current before acting.
    pub fn fire_due_timers(&mut self, now: Instant) {
        if self.grace_timer.take_due(now)
            && self.state == ConnectionState::Error
            && !self.intentional
        {
            self.enter_reconnecting(now);
        }

        if self.reconnect_timer.take_due(now)
            && self.state == ConnectionState::Reconnecting
            && !self.intentional
        {
            crate::log!(
                "conn";
                "reconnect attempt {}/{}",
                self.policy.attempt(),
                self.policy.max_attempts()
            );
            self.open_transport(now);
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            crate::debug!("conn"; "{} -> {}", self.state, state);
            self.state = state;
            self.outbox.push(ConnectionEvent::StateChanged(state));
        }
    }

    /// Close the prior transport (if any), then start a new attempt.
    fn open_transport(&mut self, now: Instant) {
        self.close_transport();
        self.epoch += 1;
        self.set_state(ConnectionState::Connecting);

        match self
            .connector
            .open(&self.url, self.epoch, self.events_tx.clone())
        {
            Ok(transport) => self.transport = Some(transport),
            Err(e) => self.on_error(now, &e.to_string()),
        }
    }

    fn close_transport(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
    }

    fn on_error(&mut self, now: Instant, message: &str) {
        crate::log!("conn"; "transport error: {}", message);
        if !self.state.is_live() {
            return;
        }
        self.close_transport();
        self.set_state(ConnectionState::Error);
        // Hold the error state so it is visible before retrying
        self.grace_timer.arm(now, self.error_grace);
    }

    fn on_closed(&mut self, now: Instant) {
        self.transport = None;
        if self.state.is_live() {
            crate::log!("conn"; "connection lost");
            self.enter_reconnecting(now);
        }
    }

    fn enter_reconnecting(&mut self, now: Instant) {
        self.close_transport();
        self.set_state(ConnectionState::Reconnecting);

        match self.policy.next_delay() {
            Some(delay) => {
                crate::debug!(
                    "conn";
                    "retry {}/{} in {}ms",
                    self.policy.attempt(),
                    self.policy.max_attempts(),
                    delay.as_millis()
                );
                self.reconnect_timer.arm(now, delay);
            }
            None => {
                crate::log!(
                    "conn";
                    "giving up after {} attempts",
                    self.policy.max_attempts()
                );
                self.set_state(ConnectionState::Disconnected);
            }
        }
    }
}

impl<C: Connector> Outbound for ConnectionManager<C> {
    fn send(&mut self, payload: &str) -> bool {
        ConnectionManager::send(self, payload)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory connector shared by manager and session tests.

    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::connection::transport::TransportError;

    #[derive(Debug, Default)]
    pub struct Wire {
        /// Text frames sent on each epoch, in order.
        pub sent: Vec<(Epoch, String)>,
        pub opened: Vec<Epoch>,
        pub closed: Vec<Epoch>,
    }

    #[derive(Clone, Default)]
    pub struct FakeConnector {
        pub wire: Arc<Mutex<Wire>>,
        pub refuse: bool,
    }

    pub struct FakeTransport {
        epoch: Epoch,
        wire: Arc<Mutex<Wire>>,
        open: bool,
    }

    impl Transport for FakeTransport {
        fn send_text(&mut self, text: String) -> Result<(), TransportError> {
            if !self.open {
                return Err(TransportError::Closed);
            }
            self.wire.lock().sent.push((self.epoch, text));
            Ok(())
        }

        fn close(&mut self) {
            if self.open {
                self.open = false;
                self.wire.lock().closed.push(self.epoch);
            }
        }
    }

    impl Connector for FakeConnector {
        type Transport = FakeTransport;

        fn open(
            &mut self,
            _url: &str,
            epoch: Epoch,
            _events: EventSender,
        ) -> Result<FakeTransport, TransportError> {
            if self.refuse {
                return Err(TransportError::Closed);
            }
            self.wire.lock().opened.push(epoch);
            Ok(FakeTransport {
                epoch,
                wire: Arc::clone(&self.wire),
                open: true,
            })
        }
    }

    impl FakeConnector {
        pub fn sent(&self) -> Vec<String> {
            self.wire.lock().sent.iter().map(|(_, s)| s.clone()).collect()
        }

        pub fn open_count(&self) -> usize {
            self.wire.lock().opened.len()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeConnector;
    use super::*;
    use crate::protocol::fixtures::{error_frame_bytes, mesh_frame_bytes, sample_mesh};
    use tokio::sync::mpsc;

    fn manager() -> (ConnectionManager<FakeConnector>, FakeConnector) {
        let connector = FakeConnector::default();
        let (tx, _rx) = mpsc::channel(16);
        let manager = ConnectionManager::new(
            connector.clone(),
            "ws://test/ws/preview",
            tx,
            ReconnectPolicy::default(),
            Duration::from_millis(1500),
        );
        (manager, connector)
    }

    fn event(manager: &ConnectionManager<FakeConnector>, kind: TransportEventKind) -> TransportEvent {
        TransportEvent::new(manager.epoch(), kind)
    }

    fn states(events: &[ConnectionEvent]) -> Vec<ConnectionState> {
        events
            .iter()
            .filter_map(|e| match e {
                ConnectionEvent::StateChanged(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    fn connected(now: Instant) -> (ConnectionManager<FakeConnector>, FakeConnector) {
        let (mut m, c) = manager();
        m.connect(now);
        m.handle_event(event(&m, TransportEventKind::Opened), now);
        m.drain_events();
        (m, c)
    }

    #[test]
    fn test_connect_then_open() {
        let now = Instant::now();
        let (mut m, c) = manager();
        m.connect(now);
        assert_eq!(m.state(), ConnectionState::Connecting);

        m.handle_event(event(&m, TransportEventKind::Opened), now);
        assert_eq!(m.state(), ConnectionState::Connected);
        assert_eq!(
            states(&m.drain_events()),
            vec![ConnectionState::Connecting, ConnectionState::Connected]
        );
        assert_eq!(c.open_count(), 1);
    }

    #[test]
    fn test_send_only_when_connected() {
        let now = Instant::now();
        let (mut m, c) = manager();
        assert!(!m.send("early"));

        m.connect(now);
        assert!(!m.send("connecting"));

        m.handle_event(event(&m, TransportEventKind::Opened), now);
        assert!(m.send("hello"));
        assert_eq!(c.sent(), vec!["hello".to_string()]);
    }

    #[test]
    fn test_backoff_sequence_and_exhaustion() {
        let mut now = Instant::now();
        let (mut m, c) = connected(now);

        let mut delays = Vec::new();
        loop {
            m.handle_event(event(&m, TransportEventKind::Closed), now);
            let Some(deadline) = m.reconnect_deadline() else {
                break;
            };
            assert_eq!(m.state(), ConnectionState::Reconnecting);
            delays.push(deadline - now);
            now = deadline;
            m.fire_due_timers(now);
            assert_eq!(m.state(), ConnectionState::Connecting);
        }

        let secs = |s| Duration::from_secs(s);
        assert_eq!(delays, vec![secs(1), secs(2), secs(4), secs(8), secs(16)]);
        assert_eq!(m.state(), ConnectionState::Disconnected);
        // initial connection plus exactly five retries
        assert_eq!(c.open_count(), 6);
        assert_eq!(m.next_deadline(), None);
    }

    #[test]
    fn test_open_resets_attempts() {
        let now = Instant::now();
        let (mut m, _c) = connected(now);

        m.handle_event(event(&m, TransportEventKind::Closed), now);
        m.fire_due_timers(now + Duration::from_secs(1));
        assert_eq!(m.policy().attempt(), 1);

        m.handle_event(event(&m, TransportEventKind::Opened), now);
        assert_eq!(m.state(), ConnectionState::Connected);
        assert_eq!(m.policy().attempt(), 0);
    }

    #[test]
    fn test_error_holds_for_grace_period() {
        let now = Instant::now();
        let (mut m, _c) = connected(now);

        m.handle_event(event(&m, TransportEventKind::Error("reset".into())), now);
        assert_eq!(m.state(), ConnectionState::Error);
        // The close that follows an error does not skip the grace period
        m.handle_event(event(&m, TransportEventKind::Closed), now);
        assert_eq!(m.state(), ConnectionState::Error);

        m.fire_due_timers(now + Duration::from_millis(1499));
        assert_eq!(m.state(), ConnectionState::Error);

        m.fire_due_timers(now + Duration::from_millis(1500));
        assert_eq!(m.state(), ConnectionState::Reconnecting);
        assert_eq!(
            m.reconnect_deadline(),
            Some(now + Duration::from_millis(2500))
        );
    }

    #[test]
    fn test_disconnect_cancels_grace_timer() {
        let now = Instant::now();
        let (mut m, c) = connected(now);

        m.handle_event(event(&m, TransportEventKind::Error("reset".into())), now);
        m.disconnect();
        assert_eq!(m.state(), ConnectionState::Disconnected);
        assert_eq!(m.next_deadline(), None);

        m.fire_due_timers(now + Duration::from_secs(60));
        assert_eq!(m.state(), ConnectionState::Disconnected);
        assert_eq!(c.open_count(), 1);
    }

    #[test]
    fn test_disconnect_cancels_reconnect_timer() {
        let now = Instant::now();
        let (mut m, c) = connected(now);

        m.handle_event(event(&m, TransportEventKind::Closed), now);
        assert!(m.reconnect_deadline().is_some());

        m.disconnect();
        m.fire_due_timers(now + Duration::from_secs(60));
        assert_eq!(m.state(), ConnectionState::Disconnected);
        assert_eq!(c.open_count(), 1);
    }

    #[test]
    fn test_intentional_close_is_terminal() {
        let now = Instant::now();
        let (mut m, c) = connected(now);
        let epoch = m.epoch();

        m.disconnect();
        m.handle_event(TransportEvent::new(epoch, TransportEventKind::Closed), now);
        assert_eq!(m.state(), ConnectionState::Disconnected);
        assert_eq!(m.next_deadline(), None);
        assert_eq!(c.wire.lock().closed, vec![epoch]);
    }

    #[test]
    fn test_stale_epoch_is_ignored() {
        let now = Instant::now();
        let (mut m, c) = connected(now);
        let old = m.epoch();

        m.connect(now);
        assert_eq!(m.state(), ConnectionState::Connecting);
        // The old transport was closed before the new one opened
        assert_eq!(c.wire.lock().closed, vec![old]);
        assert_eq!(c.wire.lock().opened, vec![old, old + 1]);

        m.handle_event(TransportEvent::new(old, TransportEventKind::Opened), now);
        m.handle_event(TransportEvent::new(old, TransportEventKind::Closed), now);
        assert_eq!(m.state(), ConnectionState::Connecting);
        assert_eq!(m.next_deadline(), None);
    }

    #[test]
    fn test_decode_error_is_not_fatal() {
        let now = Instant::now();
        let (mut m, _c) = connected(now);

        m.handle_event(event(&m, TransportEventKind::Binary(vec![1, 2])), now);
        m.handle_event(
            event(
                &m,
                TransportEventKind::Binary(mesh_frame_bytes(&sample_mesh(4, 2))),
            ),
            now,
        );

        let events = m.drain_events();
        assert!(matches!(
            events[0],
            ConnectionEvent::DecodeError(DecodeError::BufferTooSmall { .. })
        ));
        assert!(matches!(events[1], ConnectionEvent::Frame(Frame::Mesh(_))));
        assert_eq!(events.len(), 2);
        assert_eq!(m.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_error_frame_is_data() {
        let now = Instant::now();
        let (mut m, _c) = connected(now);

        let bytes = error_frame_bytes(r#"{"error":"bad","detail":"x","field":null}"#);
        m.handle_event(event(&m, TransportEventKind::Binary(bytes)), now);

        let events = m.drain_events();
        assert!(matches!(events[0], ConnectionEvent::Frame(Frame::Error(_))));
        assert_eq!(m.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_refused_open_goes_through_error() {
        let now = Instant::now();
        let (mut m, mut c) = manager();
        c.refuse = true;
        m.connector = c;

        m.connect(now);
        assert_eq!(m.state(), ConnectionState::Error);
        m.fire_due_timers(now + Duration::from_millis(1500));
        assert_eq!(m.state(), ConnectionState::Reconnecting);
    }

    #[test]
    fn test_user_connect_after_exhaustion_resets_budget() {
        let mut now = Instant::now();
        let (mut m, _c) = connected(now);
        loop {
            m.handle_event(event(&m, TransportEventKind::Closed), now);
            let Some(deadline) = m.reconnect_deadline() else {
                break;
            };
            now = deadline;
            m.fire_due_timers(now);
        }
        assert_eq!(m.state(), ConnectionState::Disconnected);

        m.connect(now);
        assert_eq!(m.state(), ConnectionState::Connecting);
        assert_eq!(m.policy().attempt(), 0);
    }
}
