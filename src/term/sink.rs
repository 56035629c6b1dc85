//! Shared console output sink
//!
//! One process-wide sink owns the terminal line. Ordinary writes and the
//! spinner status line go through it, so a write while a spinner is
//! animating clears the line first and redraws it afterwards. The formatter
//! never learns about status sessions; the coordination lives here.
//!
//! When stdout is not a terminal (or colour is disabled) the sink degrades
//! to plain sequential text: no animation, status messages printed as
//! ordinary lines.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::{
    cursor::MoveToColumn,
    execute,
    style::Print,
    terminal::{self, Clear, ClearType},
    tty::IsTty,
};
use thiserror::Error;
use unicode_width::UnicodeWidthChar;

use crate::config::{config, theme, ColorMode, StyleId};
use crate::fmt::styled_text;
use crate::term::spinner::SpinnerKind;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to write to output: {0}")]
    Write(#[source] io::Error),

    #[error("Failed to draw status line: {0}")]
    Draw(#[source] io::Error),
}

/// Opaque backend options for one status session
#[derive(Debug, Clone, Default)]
pub struct SpinnerOptions {
    /// Override the spinner's own frame interval
    pub refresh: Option<Duration>,
}

/// Live state of the single status line, shared with the ticker thread
#[derive(Debug)]
struct LineState {
    active: bool,
    paused: bool,
    frame: usize,
    message: String,
    kind: SpinnerKind,
    interval: Duration,
}

impl Default for LineState {
    fn default() -> Self {
        Self {
            active: false,
            paused: false,
            frame: 0,
            message: String::new(),
            kind: SpinnerKind::default(),
            interval: SpinnerKind::default().interval(),
        }
    }
}

/// Background animation thread handle
struct Ticker {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

/// Where sink output goes
enum Output {
    Stdout,
    /// Test capture buffer (always plain mode)
    #[allow(dead_code)]
    Capture(Arc<Mutex<Vec<u8>>>),
}

/// The shared output sink
pub struct Console {
    ansi: bool,
    out: Output,
    line: Arc<Mutex<LineState>>,
    ticker: Mutex<Option<Ticker>>,
}

/// Process-wide console, created lazily on first use
pub fn console() -> &'static Console {
    static CONSOLE: OnceLock<Console> = OnceLock::new();
    CONSOLE.get_or_init(Console::new)
}

impl Console {
    /// Create a console attached to stdout
    pub fn new() -> Self {
        let ansi = match config().color_mode() {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => io::stdout().is_tty(),
        };
        Self {
            ansi,
            out: Output::Stdout,
            line: Arc::new(Mutex::new(LineState::default())),
            ticker: Mutex::new(None),
        }
    }

    /// Plain-mode console writing into a shared buffer, for tests
    #[cfg(test)]
    pub(crate) fn with_capture() -> (Self, Arc<Mutex<Vec<u8>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let console = Self {
            ansi: false,
            out: Output::Capture(Arc::clone(&buffer)),
            line: Arc::new(Mutex::new(LineState::default())),
            ticker: Mutex::new(None),
        };
        (console, buffer)
    }

    /// Whether ANSI styling and animation are enabled
    pub fn ansi(&self) -> bool {
        self.ansi
    }

    /// Write a block of text, suspending the spinner line around it
    pub fn write(&self, text: &str) {
        if let Ok(line) = self.line.lock() {
            let animating = line.active && !line.paused && self.ansi;
            if animating {
                clear_status_line();
            }
            if let Err(e) = self.write_raw(text) {
                tracing::debug!("console write failed: {}", e);
            }
            if animating {
                if let Err(e) = draw_status_line(&line) {
                    tracing::debug!("status redraw failed: {}", e);
                }
            }
        }
    }

    /// Pause spinner animation and clear its line
    pub fn suspend(&self) {
        if let Ok(mut line) = self.line.lock() {
            if line.active && !line.paused {
                line.paused = true;
                if self.ansi {
                    clear_status_line();
                }
            }
        }
    }

    /// Resume spinner animation and redraw its line
    pub fn resume(&self) {
        if let Ok(mut line) = self.line.lock() {
            if line.active && line.paused {
                line.paused = false;
                if self.ansi {
                    if let Err(e) = draw_status_line(&line) {
                        tracing::debug!("status redraw failed: {}", e);
                    }
                }
            }
        }
    }

    /// Open a status line.
    ///
    /// Returns false when another session already holds the line; the caller
    /// is expected to degrade to plain start/stop messages.
    pub fn start(&self, message: &str, kind: SpinnerKind, opts: &SpinnerOptions) -> bool {
        {
            let Ok(mut line) = self.line.lock() else {
                return false;
            };
            if line.active {
                return false;
            }
            line.active = true;
            line.paused = false;
            line.frame = 0;
            line.message = message.to_string();
            line.kind = kind;
            line.interval = opts.refresh.unwrap_or_else(|| kind.interval());

            if self.ansi {
                if let Err(e) = draw_status_line(&line) {
                    tracing::debug!("status draw failed: {}", e);
                }
            } else if let Err(e) = self.write_raw(&format!("{message}\n")) {
                tracing::debug!("console write failed: {}", e);
            }
        }

        if self.ansi {
            let mut ticker = match self.ticker.lock() {
                Ok(t) => t,
                Err(poisoned) => poisoned.into_inner(),
            };
            *ticker = Some(self.spawn_ticker());
        }
        true
    }

    /// Replace the status message while the session is running
    pub fn update(&self, message: &str) {
        if let Ok(mut line) = self.line.lock() {
            if !line.active {
                return;
            }
            line.message = message.to_string();
            if self.ansi && !line.paused {
                if let Err(e) = draw_status_line(&line) {
                    tracing::debug!("status redraw failed: {}", e);
                }
            }
        }
    }

    /// Close the status line: stop animation and clear it
    pub fn stop(&self) {
        // Join the ticker first so nothing redraws after the clear
        let ticker = match self.ticker.lock() {
            Ok(mut t) => t.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(mut ticker) = ticker {
            ticker.running.store(false, Ordering::SeqCst);
            if let Some(handle) = ticker.handle.take() {
                let _ = handle.join();
            }
        }

        if let Ok(mut line) = self.line.lock() {
            if line.active {
                line.active = false;
                line.paused = false;
                if self.ansi {
                    clear_status_line();
                }
            }
        }
    }

    /// Spawn the animation thread
    fn spawn_ticker(&self) -> Ticker {
        let line = Arc::clone(&self.line);
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = thread::spawn(move || loop {
            if !flag.load(Ordering::SeqCst) {
                break;
            }
            let interval = match line.lock() {
                Ok(mut line) => {
                    if line.active && !line.paused {
                        line.frame = line.frame.wrapping_add(1);
                        if let Err(e) = draw_status_line(&line) {
                            tracing::trace!("spinner tick failed: {}", e);
                        }
                    }
                    line.interval
                }
                Err(_) => Duration::from_millis(80),
            };
            thread::sleep(interval);
        });

        Ticker {
            running,
            handle: Some(handle),
        }
    }

    fn write_raw(&self, text: &str) -> Result<(), SinkError> {
        match &self.out {
            Output::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(text.as_bytes()).map_err(SinkError::Write)?;
                stdout.flush().map_err(SinkError::Write)
            }
            Output::Capture(buffer) => {
                if let Ok(mut buffer) = buffer.lock() {
                    buffer.extend_from_slice(text.as_bytes());
                }
                Ok(())
            }
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

/// Clear the spinner's line in place
fn clear_status_line() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, MoveToColumn(0), Clear(ClearType::CurrentLine));
}

/// Redraw frame + message on the current line, truncated to terminal width
fn draw_status_line(line: &LineState) -> Result<(), SinkError> {
    let frames = line.kind.frames();
    let frame = frames[line.frame % frames.len()];
    let glyph = styled_text(frame, theme().style(StyleId::Spinner), true);

    let cols = terminal::size().map(|(c, _)| c as usize).unwrap_or(80);
    let budget = cols.saturating_sub(2); // frame glyph + space
    let message = truncate_to_width(&line.message, budget);

    let mut stdout = io::stdout();
    execute!(
        stdout,
        MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(format!("{glyph} {message}"))
    )
    .map_err(SinkError::Draw)?;
    stdout.flush().map_err(SinkError::Draw)
}

/// Cut a string to a maximum display width
fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > max_width {
            break;
        }
        width += w;
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured(buffer: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
    }

    #[test]
    fn test_write_passes_through() {
        let (console, buffer) = Console::with_capture();
        console.write("hello\n");
        assert_eq!(captured(&buffer), "hello\n");
    }

    #[test]
    fn test_plain_start_prints_message_line() {
        let (console, buffer) = Console::with_capture();
        assert!(console.start("working", SpinnerKind::Dots, &SpinnerOptions::default()));
        console.stop();
        assert_eq!(captured(&buffer), "working\n");
    }

    #[test]
    fn test_second_session_is_refused() {
        let (console, _buffer) = Console::with_capture();
        assert!(console.start("outer", SpinnerKind::Dots, &SpinnerOptions::default()));
        assert!(!console.start("inner", SpinnerKind::Dots, &SpinnerOptions::default()));
        console.stop();
        // Line is free again after stop
        assert!(console.start("again", SpinnerKind::Dots, &SpinnerOptions::default()));
        console.stop();
    }

    #[test]
    fn test_write_during_session_stays_clean() {
        let (console, buffer) = Console::with_capture();
        console.start("working", SpinnerKind::Dots, &SpinnerOptions::default());
        console.write("nested output\n");
        console.stop();
        assert_eq!(captured(&buffer), "working\nnested output\n");
    }

    #[test]
    fn test_suspend_resume_roundtrip() {
        let (console, buffer) = Console::with_capture();
        console.start("working", SpinnerKind::Dots, &SpinnerOptions::default());
        console.suspend();
        console.write("while suspended\n");
        console.resume();
        console.stop();
        assert!(captured(&buffer).contains("while suspended\n"));
    }

    #[test]
    fn test_update_requires_active_session() {
        let (console, buffer) = Console::with_capture();
        console.update("ignored");
        assert_eq!(captured(&buffer), "");
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("hello", 3), "hel");
        assert_eq!(truncate_to_width("hello", 10), "hello");
        // Wide characters count double
        assert_eq!(truncate_to_width("日本語", 4), "日本");
    }
}
