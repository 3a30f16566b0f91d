//! Session Actor
//!
//! Runs a [`Session`] on a single task:
//!
//! ```text
//! SessionHandle ──commands──┐
//!                           v
//! transports ──events──> select! ──> Session ──SessionEvent──> consumer
//!                           ^
//! earliest deadline ────────┘
//! ```
//!
//! Everything is processed one message at a time, so timer fires, transport
//! events and UI commands never interleave mid-operation. Publishing events
//! never waits: a consumer that falls behind loses events, not the loop.

use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use super::core::Session;
use super::messages::{SessionCommand, SessionEvent};
use crate::config::ClientConfig;
use crate::connection::{Connector, TransportEvent};
use crate::protocol::Design;
use crate::sync::ChangeSource;

/// Channel buffer size
const CHANNEL_BUFFER: usize = 64;

#[derive(Debug, Error)]
#[error("session is not running")]
pub struct SessionClosed;

pub struct SessionActor<C: Connector> {
    session: Session<C>,
    commands: mpsc::Receiver<SessionCommand>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    events_tx: mpsc::Sender<SessionEvent>,
}

impl<C: Connector> SessionActor<C> {
    /// Wire up a session. Returns the actor to run, a handle to drive it and
    /// the receiving end of its event stream.
    pub fn new(
        connector: C,
        design: Design,
        config: &ClientConfig,
    ) -> (Self, SessionHandle, mpsc::Receiver<SessionEvent>) {
        let (command_tx, commands) = mpsc::channel(CHANNEL_BUFFER);
        let (transport_tx, transport_rx) = mpsc::channel(CHANNEL_BUFFER);
        let (events_tx, events_rx) = mpsc::channel(CHANNEL_BUFFER);

        let actor = Self {
            session: Session::new(connector, design, config, transport_tx),
            commands,
            transport_rx,
            events_tx,
        };
        (actor, SessionHandle { tx: command_tx }, events_rx)
    }

    /// Run until `Shutdown` or every handle is dropped.
    pub async fn run(mut self) {
        crate::debug!("session"; "start");
        self.flush();
        loop {
            let deadline = self.session.next_deadline();

            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(SessionCommand::Shutdown) | None => {
                        self.session.disconnect();
                        self.flush();
                        break;
                    }
                    Some(command) => self.dispatch(command),
                },

                Some(event) = self.transport_rx.recv() => {
                    self.session.handle_transport_event(event, Instant::now());
                }

                () = sleep_until(deadline) => {
                    self.session.fire_due_timers(Instant::now());
                }
            }

            self.flush();
        }
        crate::debug!("session"; "stopped");
    }

    fn dispatch(&mut self, command: SessionCommand) {
        let now = Instant::now();
        match command {
            SessionCommand::Connect => self.session.connect(now),
            SessionCommand::Disconnect => self.session.disconnect(),
            SessionCommand::Send { payload, reply } => {
                let _ = reply.send(self.session.send(&payload));
            }
            SessionCommand::ParameterChange { design, source } => {
                self.session.on_parameter_change(design, source, now);
            }
            SessionCommand::Undo(reply) => {
                let _ = reply.send(self.session.undo(now));
            }
            SessionCommand::Redo(reply) => {
                let _ = reply.send(self.session.redo(now));
            }
            SessionCommand::Load { design, label } => self.session.load(design, label),
            SessionCommand::Shutdown => {}
        }
    }

    /// Forward pending events. Events that do not fit in the buffer are
    /// dropped; a dropped receiver just means nobody listens.
    fn flush(&mut self) {
        let mut dropped = 0usize;
        for event in self.session.drain_events() {
            match self.events_tx.try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => dropped += 1,
                Err(TrySendError::Closed(_)) => break,
            }
        }
        if dropped > 0 {
            crate::debug!("session"; "event consumer behind, dropped {} events", dropped);
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Cloneable front door to a running [`SessionActor`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    async fn command(&self, command: SessionCommand) -> Result<(), SessionClosed> {
        self.tx.send(command).await.map_err(|_| SessionClosed)
    }

    pub async fn connect(&self) -> Result<(), SessionClosed> {
        self.command(SessionCommand::Connect).await
    }

    pub async fn disconnect(&self) -> Result<(), SessionClosed> {
        self.command(SessionCommand::Disconnect).await
    }

    pub async fn send(&self, payload: impl Into<String>) -> Result<bool, SessionClosed> {
        let (reply, rx) = oneshot::channel();
        self.command(SessionCommand::Send {
            payload: payload.into(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| SessionClosed)
    }

    pub async fn on_parameter_change(
        &self,
        design: Design,
        source: ChangeSource,
    ) -> Result<(), SessionClosed> {
        self.command(SessionCommand::ParameterChange { design, source })
            .await
    }

    pub async fn undo(&self) -> Result<Option<Design>, SessionClosed> {
        let (reply, rx) = oneshot::channel();
        self.command(SessionCommand::Undo(reply)).await?;
        rx.await.map_err(|_| SessionClosed)
    }

    pub async fn redo(&self) -> Result<Option<Design>, SessionClosed> {
        let (reply, rx) = oneshot::channel();
        self.command(SessionCommand::Redo(reply)).await?;
        rx.await.map_err(|_| SessionClosed)
    }

    pub async fn load(&self, design: Design, label: impl Into<String>) -> Result<(), SessionClosed> {
        self.command(SessionCommand::Load {
            design,
            label: label.into(),
        })
        .await
    }

    pub async fn shutdown(&self) -> Result<(), SessionClosed> {
        self.command(SessionCommand::Shutdown).await
    }

    /// Send a command from a plain thread (file watcher, signal handler).
    pub fn blocking_command(&self, command: SessionCommand) -> Result<(), SessionClosed> {
        self.tx.blocking_send(command).map_err(|_| SessionClosed)
    }
}
