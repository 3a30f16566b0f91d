//! `preview` command: keep the backend in sync with a design file.
//!
//! ```text
//! notify ──> watcher thread ──ParameterChange(Text)──┐
//! Ctrl+C ──> crossbeam ──> signal thread ──Shutdown──┤
//!                                                    v
//!                                              SessionActor ──SessionEvent──> status block
//! ```
//!
//! Saves are treated like typed input, so a burst of writes is debounced
//! into one send of the final content. A save that only flips toggles or
//! presets goes out at once. Once the session has given up reconnecting,
//! the next save reconnects it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, anyhow};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::report::{error_line, mesh_status, warning_line};
use crate::config::ClientConfig;
use crate::connection::{ConnectionState, WsConnector};
use crate::logger::{status_clear, status_error, status_info, status_success, status_warning};
use crate::protocol::{Design, Frame};
use crate::session::{SessionActor, SessionCommand, SessionEvent, SessionHandle};
use crate::sync::ChangeSource;
use crate::{debug, log};

/// Execute preview command
pub fn run_preview(design_path: &Path, config: &ClientConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(preview(design_path, config))
}

async fn preview(design_path: &Path, config: &ClientConfig) -> Result<()> {
    let mut reader = DesignReader::open(design_path)?;
    let design = reader.last().clone();

    let (actor, handle, mut events) = SessionActor::new(WsConnector, design, config);
    let actor_task = tokio::spawn(actor.run());

    setup_shutdown_handler(handle.clone())?;
    let offline = Arc::new(AtomicBool::new(false));
    let watcher_offline = Arc::clone(&offline);
    let path = reader.path().to_path_buf();
    let _watcher = watch_design(path, handle.clone(), move |h| {
        let Some((design, source)) = reader.poll() else {
            return true;
        };
        let reconnect = watcher_offline.swap(false, Ordering::AcqRel);
        save_commands(design, source, reconnect)
            .into_iter()
            .all(|command| h.blocking_command(command).is_ok())
    })?;

    log!("conn"; "connecting to {}", config.connection.url);
    handle.connect().await?;
    drop(handle);

    let mut view = PreviewView::default();
    while let Some(event) = events.recv().await {
        if let SessionEvent::StateChanged(state) = &event {
            offline.store(*state == ConnectionState::Disconnected, Ordering::Release);
        }
        view.apply(event);
    }

    actor_task.await.context("session task failed")?;
    status_clear();
    log!("conn"; "disconnected");
    Ok(())
}

/// Ctrl+C performs an intentional disconnect, which ends the event stream.
fn setup_shutdown_handler(handle: SessionHandle) -> Result<()> {
    let (tx, rx) = crossbeam::channel::bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = tx.try_send(());
    })
    .map_err(|e| anyhow!("failed to set Ctrl+C handler: {}", e))?;

    std::thread::spawn(move || {
        if rx.recv().is_ok() {
            debug!("session"; "shutdown signal received");
            let _ = handle.blocking_command(SessionCommand::Shutdown);
        }
    });
    Ok(())
}

/// Watch the design file and call `on_change` for each relevant event until
/// it returns `false`. The parent directory is watched so editors that save
/// by rename are still seen.
fn watch_design(
    path: PathBuf,
    handle: SessionHandle,
    mut on_change: impl FnMut(&SessionHandle) -> bool + Send + 'static,
) -> Result<RecommendedWatcher> {
    let (notify_tx, notify_rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = notify_tx.send(res);
    })
    .context("failed to create file watcher")?;

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", dir.display()))?;
    log!("watch"; "watching {}", path.display());

    std::thread::spawn(move || {
        while let Ok(result) = notify_rx.recv() {
            match result {
                Ok(event) if is_design_event(&event, &path) => {
                    if !on_change(&handle) {
                        break; // Session gone
                    }
                }
                Ok(_) => {}
                Err(e) => log!("watch"; "notify error: {}", e),
            }
        }
    });

    Ok(watcher)
}

fn is_design_event(event: &notify::Event, target: &Path) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == target.file_name())
}

/// Commands for one save. After the session gave up, a save is the user's
/// explicit reconnect; the resync on `Connected` then carries the edit.
fn save_commands(design: Design, source: ChangeSource, reconnect: bool) -> Vec<SessionCommand> {
    let mut commands = Vec::with_capacity(2);
    if reconnect {
        log!("conn"; "design saved, reconnecting");
        commands.push(SessionCommand::Connect);
    }
    commands.push(SessionCommand::ParameterChange { design, source });
    commands
}

/// Toggles and presets apply at once; anything touching a number waits for
/// the file to settle.
fn save_source(previous: &Design, next: &Design) -> ChangeSource {
    let changed = next.changed_params(previous);
    if !changed.is_empty()
        && changed
            .iter()
            .all(|p| p.default_source() == ChangeSource::Immediate)
    {
        ChangeSource::Immediate
    } else {
        ChangeSource::Text
    }
}

// ============================================================================
// Design file
// ============================================================================

/// Re-reads the design file and reports only real changes.
struct DesignReader {
    path: PathBuf,
    last: Design,
}

impl DesignReader {
    fn open(path: &Path) -> Result<Self> {
        let last = read_design(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            last,
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn last(&self) -> &Design {
        &self.last
    }

    /// New design and how to send it, if the file parses and differs from
    /// the last one seen. Half-written files fail to parse and are skipped
    /// until the next event.
    fn poll(&mut self) -> Option<(Design, ChangeSource)> {
        match read_design(&self.path) {
            Ok(design) if design != self.last => {
                let source = save_source(&self.last, &design);
                self.last = design.clone();
                Some((design, source))
            }
            Ok(_) => None,
            Err(e) => {
                debug!("watch"; "{:#}", e);
                None
            }
        }
    }
}

/// Read a wire-format design. Missing keys take their defaults.
fn read_design(path: &Path) -> Result<Design> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read design {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid design JSON in {}", path.display()))
}

// ============================================================================
// Terminal view
// ============================================================================

/// What the status block currently shows.
#[derive(Debug)]
struct PreviewView {
    state: ConnectionState,
    generating: bool,
    mesh: Option<String>,
    backend_error: Option<String>,
}

impl Default for PreviewView {
    fn default() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            generating: false,
            mesh: None,
            backend_error: None,
        }
    }
}

impl PreviewView {
    fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::StateChanged(state) => {
                self.state = state;
                if state == ConnectionState::Connected {
                    log!("conn"; "connected");
                }
            }
            SessionEvent::Generating(generating) => self.generating = generating,
            SessionEvent::Frame(Frame::Mesh(mesh)) => {
                for warning in &mesh.validation {
                    log!("check"; "{}", warning_line(warning));
                }
                self.mesh = Some(mesh_status(&mesh));
                self.backend_error = None;
            }
            SessionEvent::Frame(Frame::Error(error)) => {
                self.backend_error = Some(error_line(&error));
            }
            SessionEvent::DecodeError(e) => log!("error"; "unreadable frame: {}", e),
            SessionEvent::HistoryChanged { .. } => return,
        }
        self.show();
    }

    fn headline(&self) -> String {
        match self.state {
            _ if self.generating => format!("{} | generating…", self.state),
            ConnectionState::Disconnected => format!("{} | save to reconnect", self.state),
            state => state.to_string(),
        }
    }

    fn body(&self) -> String {
        let mut lines = vec![self.headline()];
        if let Some(mesh) = &self.mesh {
            lines.push(mesh.clone());
        }
        lines.join("\n")
    }

    fn show(&self) {
        if let Some(error) = &self.backend_error {
            status_error(&self.body(), error);
            return;
        }
        match self.state {
            ConnectionState::Connected => status_success(&self.body()),
            ConnectionState::Error | ConnectionState::Reconnecting => status_warning(&self.body()),
            ConnectionState::Connecting | ConnectionState::Disconnected => {
                status_info(&self.body());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::design::TailType;
    use crate::protocol::fixtures::sample_mesh;
    use notify::event::{CreateKind, ModifyKind};

    #[test]
    fn test_read_design_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glider.json");
        fs::write(&path, r#"{"wing_span": 1400, "tail_type": "V-Tail"}"#).unwrap();

        let design = read_design(&path).unwrap();
        assert_eq!(design.wing_span, 1400.0);
        assert_eq!(design.wing_chord, Design::default().wing_chord);
    }

    #[test]
    fn test_read_design_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glider.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(read_design(&path).is_err());
        assert!(read_design(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_reader_reports_only_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glider.json");
        fs::write(&path, r#"{"wing_span": 1000}"#).unwrap();
        let mut reader = DesignReader::open(&path).unwrap();

        // Same content rewritten
        fs::write(&path, r#"{ "wing_span": 1000.0 }"#).unwrap();
        assert_eq!(reader.poll(), None);

        // Half-written save
        fs::write(&path, r#"{"wing_span": 12"#).unwrap();
        assert_eq!(reader.poll(), None);

        fs::write(&path, r#"{"wing_span": 1200}"#).unwrap();
        assert_eq!(
            reader.poll().map(|(d, source)| (d.wing_span, source)),
            Some((1200.0, ChangeSource::Text))
        );
        assert_eq!(reader.last().wing_span, 1200.0);

        fs::write(&path, r#"{"wing_span": 1200, "tail_type": "V-Tail"}"#).unwrap();
        assert_eq!(
            reader.poll().map(|(_, source)| source),
            Some(ChangeSource::Immediate)
        );
    }

    #[test]
    fn test_save_source() {
        let base = Design::default();
        let toggled = Design {
            hollow_parts: false,
            tail_type: TailType::TTail,
            ..base.clone()
        };
        assert_eq!(save_source(&base, &toggled), ChangeSource::Immediate);

        let mixed = Design {
            wing_span: 1500.0,
            ..toggled.clone()
        };
        assert_eq!(save_source(&base, &mixed), ChangeSource::Text);
        assert_eq!(save_source(&base, &base), ChangeSource::Text);
    }

    #[test]
    fn test_save_after_giving_up_reconnects_first() {
        let design = Design::default();
        let commands = save_commands(design.clone(), ChangeSource::Text, true);
        assert!(matches!(
            commands.as_slice(),
            [
                SessionCommand::Connect,
                SessionCommand::ParameterChange { source: ChangeSource::Text, .. }
            ]
        ));

        let commands = save_commands(design, ChangeSource::Immediate, false);
        assert!(matches!(
            commands.as_slice(),
            [SessionCommand::ParameterChange { source: ChangeSource::Immediate, .. }]
        ));
    }

    #[test]
    fn test_is_design_event() {
        let target = Path::new("/work/glider.json");
        let modify = notify::Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/work/glider.json"));
        let create_other = notify::Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/work/other.json"));
        let remove = notify::Event::new(EventKind::Remove(notify::event::RemoveKind::File))
            .add_path(PathBuf::from("/work/glider.json"));

        assert!(is_design_event(&modify, target));
        assert!(!is_design_event(&create_other, target));
        assert!(!is_design_event(&remove, target));
    }

    #[test]
    fn test_view_tracks_session_events() {
        let mut view = PreviewView::default();
        view.state = ConnectionState::Connected;
        view.generating = true;
        assert_eq!(view.headline(), "connected | generating…");
        view.state = ConnectionState::Disconnected;
        view.generating = false;
        assert_eq!(view.headline(), "disconnected | save to reconnect");
        view.state = ConnectionState::Connected;

        view.mesh = Some(mesh_status(&sample_mesh(4, 2)));
        view.generating = false;
        let body = view.body();
        assert!(body.starts_with("connected\n4 vertices, 2 faces"));
    }
}
