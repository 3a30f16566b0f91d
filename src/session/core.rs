//! The session service object.
//!
//! Owns everything one editing session needs: the connection, the outbound
//! scheduler, the undo history, the current design and the transient UI
//! state. Like the pieces it composes it never sleeps or spawns; callers pass
//! `now` and drive deadlines through [`Session::next_deadline`] and
//! [`Session::fire_due_timers`].

use tokio::time::Instant;

use super::messages::SessionEvent;
use crate::config::ClientConfig;
use crate::connection::{
    ConnectionEvent, ConnectionManager, ConnectionState, Connector, EventSender, ReconnectPolicy,
    TransportEvent,
};
use crate::history::History;
use crate::protocol::{Design, ErrorFrame, Frame, MeshFrame};
use crate::sync::{ChangeSource, SyncScheduler};

/// Label of the history entry recorded for the design a session starts with.
pub const INITIAL_LABEL: &str = "Initial";

pub struct Session<C: Connector> {
    manager: ConnectionManager<C>,
    scheduler: SyncScheduler,
    history: History<Design>,
    design: Design,
    generating: bool,
    last_mesh: Option<MeshFrame>,
    last_error: Option<ErrorFrame>,
    outbox: Vec<SessionEvent>,
}

impl<C: Connector> Session<C> {
    pub fn new(
        connector: C,
        design: Design,
        config: &ClientConfig,
        transport_events: EventSender,
    ) -> Self {
        let manager = ConnectionManager::new(
            connector,
            config.connection.url.clone(),
            transport_events,
            ReconnectPolicy::from_config(&config.connection),
            config.error_grace(),
        );

        let mut scheduler = SyncScheduler::from_config(&config.sync);
        scheduler.set_latest(design.clone());

        let mut history = History::new(config.history.capacity);
        history.record(&design, INITIAL_LABEL);

        Self {
            manager,
            scheduler,
            history,
            design,
            generating: false,
            last_mesh: None,
            last_error: None,
            outbox: Vec::new(),
        }
    }

    pub const fn design(&self) -> &Design {
        &self.design
    }

    pub const fn state(&self) -> ConnectionState {
        self.manager.state()
    }

    pub const fn is_generating(&self) -> bool {
        self.generating
    }

    pub const fn last_mesh(&self) -> Option<&MeshFrame> {
        self.last_mesh.as_ref()
    }

    pub const fn last_error(&self) -> Option<&ErrorFrame> {
        self.last_error.as_ref()
    }

    pub const fn history(&self) -> &History<Design> {
        &self.history
    }

    pub const fn manager(&self) -> &ConnectionManager<C> {
        &self.manager
    }

    /// Take the events produced since the last call, in order.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        [self.manager.next_deadline(), self.scheduler.next_deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    pub fn connect(&mut self, now: Instant) {
        self.manager.connect(now);
        self.pump();
    }

    /// Cancel every pending timer, close the transport and stay down.
    pub fn disconnect(&mut self) {
        self.scheduler.cancel();
        self.manager.disconnect();
        self.set_generating(false);
        self.pump();
    }

    /// Send a raw payload. Returns whether it reached the transport.
    pub fn send(&mut self, payload: &str) -> bool {
        let sent = self.manager.send(payload);
        if sent {
            self.set_generating(true);
        }
        sent
    }

    /// Commit an edit: record it, then hand it to the scheduler.
    pub fn on_parameter_change(&mut self, design: Design, source: ChangeSource, now: Instant) {
        let label = design.change_label(&self.design);
        crate::debug!("session"; "{} ({})", label, source);

        if self.history.record(&design, label) {
            self.history_changed();
        }
        self.design = design.clone();

        let sent = self
            .scheduler
            .on_parameter_change(design, source, now, &mut self.manager);
        if sent {
            self.set_generating(true);
        }
    }

    /// Step back in history and send the restored design right away.
    pub fn undo(&mut self, now: Instant) -> Option<Design> {
        let design = self.history.undo()?;
        self.restore(design.clone(), now);
        Some(design)
    }

    pub fn redo(&mut self, now: Instant) -> Option<Design> {
        let design = self.history.redo()?;
        self.restore(design.clone(), now);
        Some(design)
    }

    /// Adopt an imported design. Goes through the same full-snapshot path as
    /// a fresh connection.
    pub fn load(&mut self, design: Design, label: impl Into<String>) {
        if self.history.record(&design, label) {
            self.history_changed();
        }
        self.design = design.clone();
        self.scheduler.set_latest(design);
        self.resync();
    }

    pub fn handle_transport_event(&mut self, event: TransportEvent, now: Instant) {
        self.manager.handle_event(event, now);
        self.pump();
    }

    pub fn fire_due_timers(&mut self, now: Instant) {
        self.manager.fire_due_timers(now);
        if self.scheduler.fire_due_timers(now, &mut self.manager) {
            self.set_generating(true);
        }
        self.pump();
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn restore(&mut self, design: Design, now: Instant) {
        self.history_changed();
        self.design = design.clone();
        let sent =
            self.scheduler
                .on_parameter_change(design, ChangeSource::Immediate, now, &mut self.manager);
        if sent {
            self.set_generating(true);
        }
    }

    fn resync(&mut self) {
        if self.scheduler.resync(&mut self.manager) {
            self.set_generating(true);
        }
    }

    /// Translate connection events into session events. A resync can itself
    /// produce no connection events, so one pass is enough.
    fn pump(&mut self) {
        for event in self.manager.drain_events() {
            match event {
                ConnectionEvent::StateChanged(state) => {
                    crate::debug!("session"; "state {}", state);
                    self.outbox.push(SessionEvent::StateChanged(state));
                    match state {
                        ConnectionState::Connected => self.resync(),
                        ConnectionState::Connecting => {}
                        // No reply will arrive on a dead transport
                        _ => self.set_generating(false),
                    }
                }
                ConnectionEvent::Frame(frame) => {
                    self.set_generating(false);
                    match &frame {
                        Frame::Mesh(mesh) => {
                            self.last_mesh = Some(mesh.clone());
                            self.last_error = None;
                        }
                        Frame::Error(error) => self.last_error = Some(error.clone()),
                    }
                    self.outbox.push(SessionEvent::Frame(frame));
                }
                ConnectionEvent::DecodeError(e) => {
                    self.set_generating(false);
                    self.outbox.push(SessionEvent::DecodeError(e));
                }
            }
        }
    }

    fn set_generating(&mut self, generating: bool) {
        if self.generating != generating {
            self.generating = generating;
            self.outbox.push(SessionEvent::Generating(generating));
        }
    }

    fn history_changed(&mut self) {
        self.outbox.push(SessionEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }
}
