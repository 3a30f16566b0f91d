//! Logging utilities with colored output and an in-place status block.
//!
//! This module provides:
//! - `log!` / `debug!` macros for formatted terminal output with colored prefixes
//! - `StatusLine` for a status block that is redrawn in place (connection
//!   state, latest derived values) while log lines scroll above it
//!
//! # Example
//!
//! ```ignore
//! log!("conn"; "connecting to {}", url);
//! status_info("connected | span 1000 mm | AR 5.56");
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix.
///
/// If a status block is on screen it is lifted, the message printed, and the
/// block redrawn underneath so it always stays last.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let mut status = STATUS.lock();
    let mut stdout = stdout().lock();

    status.erase(&mut stdout);
    writeln!(stdout, "{prefix} {message}").ok();
    status.redraw(&mut stdout);
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "conn" | "ws" => prefix.bright_blue().bold().to_string(),
        "watch" => prefix.bright_green().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Status Line (status block with overwrite)
// ============================================================================

/// Current UTC time formatted as HH:MM:SS
fn now() -> String {
    use std::time::SystemTime;
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Status block that overwrites its previous rendering.
///
/// Each call replaces the whole block, so a burst of state changes and
/// mesh updates leaves one up-to-date block instead of a scrolling log.
pub struct StatusLine {
    /// Rendered block, kept so `log` can redraw it after printing.
    rendered: String,
    /// Lines of previous output to clear
    last_lines: usize,
}

static STATUS: LazyLock<Mutex<StatusLine>> = LazyLock::new(|| Mutex::new(StatusLine::new()));

impl StatusLine {
    pub const fn new() -> Self {
        Self {
            rendered: String::new(),
            last_lines: 0,
        }
    }

    /// Display success message (✓ prefix, green).
    pub fn success(&mut self, message: &str) {
        self.display(&format!("{}", "✓".green()), message);
    }

    /// Display neutral message (• prefix, dimmed symbol).
    pub fn info(&mut self, message: &str) {
        self.display(&format!("{}", "•".dimmed()), message);
    }

    /// Display error message (✗ prefix, red) with optional detail.
    pub fn error(&mut self, summary: &str, detail: &str) {
        let message = if detail.is_empty() {
            summary.to_string()
        } else {
            format!("{summary}\n{detail}")
        };
        self.display(&format!("{}", "✗".red()), &message);
    }

    /// Display warning message (⚠ prefix, yellow).
    pub fn warning(&mut self, detail: &str) {
        self.display(&format!("{}", "⚠".yellow()), detail);
    }

    fn display(&mut self, symbol: &str, message: &str) {
        let mut stdout = stdout().lock();
        self.erase(&mut stdout);
        self.rendered = Self::render(&now(), symbol, message);
        self.redraw(&mut stdout);
        stdout.flush().ok();
    }

    fn render(timestamp: &str, symbol: &str, message: &str) -> String {
        let timestamp = format!("[{timestamp}]").dimmed().to_string();
        format!("{timestamp} {symbol} {message}")
    }

    /// Number of terminal lines a rendered block occupies.
    fn line_count(rendered: &str) -> usize {
        if rendered.is_empty() {
            0
        } else {
            rendered.matches('\n').count() + 1
        }
    }

    fn erase(&mut self, out: &mut impl Write) {
        if self.last_lines > 0 {
            #[allow(clippy::cast_possible_truncation)]
            let lines = self.last_lines as u16;
            execute!(out, cursor::MoveUp(lines)).ok();
            execute!(out, Clear(ClearType::FromCursorDown)).ok();
            self.last_lines = 0;
        }
    }

    fn redraw(&mut self, out: &mut impl Write) {
        if !self.rendered.is_empty() {
            writeln!(out, "{}", self.rendered).ok();
            self.last_lines = Self::line_count(&self.rendered);
        }
    }

    /// Remove the block from screen and forget it.
    pub fn clear(&mut self) {
        let mut stdout = stdout().lock();
        self.erase(&mut stdout);
        self.rendered.clear();
        stdout.flush().ok();
    }
}

/// Global status: success
pub fn status_success(message: &str) {
    STATUS.lock().success(message);
}

/// Global status: neutral
pub fn status_info(message: &str) {
    STATUS.lock().info(message);
}

/// Global status: error
pub fn status_error(summary: &str, detail: &str) {
    STATUS.lock().error(summary, detail);
}

/// Global status: warning
pub fn status_warning(detail: &str) {
    STATUS.lock().warning(detail);
}

/// Global status: detach the block so the next output starts fresh
pub fn status_clear() {
    STATUS.lock().clear();
}
