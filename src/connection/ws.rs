//! WebSocket transport over tungstenite.
//!
//! Each transport owns one I/O thread. The thread connects, then polls: it
//! drains the outbound queue, then does a short-timeout read and forwards
//! whatever arrived to the session loop.
//!
//! ```text
//! Session --[Outbound]--> io thread --[Message::Text]--> backend
//!    ^                        |
//!    +----[TransportEvent]----+<--[Message::Binary]----- backend
//! ```

use std::net::TcpStream;
use std::time::Duration;

use crossbeam::channel::{Receiver, Sender, TryRecvError, unbounded};
use tungstenite::protocol::Message;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::WebSocket;

use super::transport::{
    Connector, Epoch, EventSender, Transport, TransportError, TransportEvent, TransportEventKind,
};

/// Read timeout for the poll loop; bounds outbound latency.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

enum Outbound {
    Text(String),
    Close,
}

/// Opens tungstenite-backed transports.
#[derive(Debug, Default)]
pub struct WsConnector;

pub struct WsTransport {
    outbound: Sender<Outbound>,
}

impl Transport for WsTransport {
    fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.outbound
            .send(Outbound::Text(text))
            .map_err(|_| TransportError::Closed)
    }

    fn close(&mut self) {
        let _ = self.outbound.send(Outbound::Close);
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.close();
    }
}

impl Connector for WsConnector {
    type Transport = WsTransport;

    fn open(
        &mut self,
        url: &str,
        epoch: Epoch,
        events: EventSender,
    ) -> Result<WsTransport, TransportError> {
        let parsed = url::Url::parse(url)
            .map_err(|e| TransportError::InvalidUrl(url.to_string(), e.to_string()))?;
        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(TransportError::InvalidUrl(
                url.to_string(),
                format!("unsupported scheme `{}`", parsed.scheme()),
            ));
        }

        let (tx, rx) = unbounded();
        let url = parsed.to_string();
        std::thread::Builder::new()
            .name(format!("ws-io-{epoch}"))
            .spawn(move || IoLoop { epoch, events }.run(&url, rx))?;

        Ok(WsTransport { outbound: tx })
    }
}

struct IoLoop {
    epoch: Epoch,
    events: EventSender,
}

impl IoLoop {
    /// Forward an event. Returns false once the session loop is gone.
    fn emit(&self, kind: TransportEventKind) -> bool {
        self.events
            .blocking_send(TransportEvent::new(self.epoch, kind))
            .is_ok()
    }

    fn fail(&self, error: impl ToString) {
        if self.emit(TransportEventKind::Error(error.to_string())) {
            self.emit(TransportEventKind::Closed);
        }
    }

    fn run(self, url: &str, outbound: Receiver<Outbound>) {
        crate::debug!("ws"; "connecting to {} (epoch {})", url, self.epoch);

        let mut ws = match tungstenite::connect(url) {
            Ok((ws, _response)) => ws,
            Err(e) => {
                self.fail(e);
                return;
            }
        };

        if let MaybeTlsStream::Plain(stream) = ws.get_ref()
            && let Err(e) = stream.set_read_timeout(Some(POLL_INTERVAL))
        {
            self.fail(e);
            return;
        }

        if !self.emit(TransportEventKind::Opened) {
            let _ = ws.close(None);
            return;
        }

        loop {
            if !self.drain_outbound(&mut ws, &outbound) {
                return;
            }

            match ws.read() {
                Ok(Message::Binary(bytes)) => {
                    if !self.emit(TransportEventKind::Binary(bytes.to_vec())) {
                        let _ = ws.close(None);
                        return;
                    }
                }
                Ok(Message::Text(text)) => {
                    if !self.emit(TransportEventKind::Text(text.as_str().to_owned())) {
                        let _ = ws.close(None);
                        return;
                    }
                }
                Ok(Message::Close(_)) => {
                    crate::debug!("ws"; "closed by peer (epoch {})", self.epoch);
                    self.emit(TransportEventKind::Closed);
                    return;
                }
                // Ping/pong are answered by tungstenite
                Ok(_) => {}
                Err(tungstenite::Error::Io(ref e))
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                    ) => {}
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    self.emit(TransportEventKind::Closed);
                    return;
                }
                Err(e) => {
                    self.fail(e);
                    return;
                }
            }
        }
    }

    /// Send everything queued. Returns false when the loop should stop.
    fn drain_outbound(
        &self,
        ws: &mut WebSocket<MaybeTlsStream<TcpStream>>,
        outbound: &Receiver<Outbound>,
    ) -> bool {
        loop {
            match outbound.try_recv() {
                Ok(Outbound::Text(text)) => {
                    if let Err(e) = ws.send(Message::Text(text.into())) {
                        self.fail(e);
                        return false;
                    }
                }
                // Intentional close: the manager no longer listens to this epoch
                Ok(Outbound::Close) | Err(TryRecvError::Disconnected) => {
                    crate::debug!("ws"; "closing (epoch {})", self.epoch);
                    let _ = ws.close(None);
                    let _ = ws.flush();
                    return false;
                }
                Err(TryRecvError::Empty) => return true,
            }
        }
    }
}
