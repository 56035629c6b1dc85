//! Status controller
//!
//! Wraps a unit of work with a live spinner status line. The spinner is
//! suspended around any output produced inside the wrapped call, the line is
//! restored on every exit path (including panics), and sessions can be
//! suppressed per subject via the [`ShowStatus`] capability.

use crate::config::theme;
use crate::fmt::styled_text;
use crate::term::{console, default_spinner, Console, SpinnerKind, SpinnerOptions};

/// Capability check for status suppression.
///
/// When the wrapped work runs on behalf of a subject value, the session is
/// skipped entirely if the subject reports `false` here. The default is to
/// show status.
pub trait ShowStatus {
    fn show_status(&self) -> bool {
        true
    }
}

/// Configuration for one status session
#[derive(Debug, Clone)]
pub struct Status {
    message: String,
    exit_message: Option<String>,
    exit_style: Option<String>,
    spinner: SpinnerKind,
    opts: SpinnerOptions,
}

impl Status {
    /// New status with the given message and the configured default spinner
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_message: None,
            exit_style: None,
            spinner: default_spinner(),
            opts: SpinnerOptions::default(),
        }
    }

    /// Message rendered after the wrapped work succeeds
    pub fn exit_message(mut self, message: impl Into<String>) -> Self {
        self.exit_message = Some(message.into());
        self
    }

    /// Theme style name for the exit message (default: `success`)
    pub fn exit_style(mut self, style: impl Into<String>) -> Self {
        self.exit_style = Some(style.into());
        self
    }

    /// Spinner used for the animation
    pub fn spinner(mut self, spinner: SpinnerKind) -> Self {
        self.spinner = spinner;
        self
    }

    /// Override the spinner frame interval (passed through to the backend)
    pub fn refresh(mut self, interval: std::time::Duration) -> Self {
        self.opts.refresh = Some(interval);
        self
    }

    /// Run a unit of work under this status.
    ///
    /// The exit message, if any, is rendered after the closure returns. If
    /// the closure panics the status line is still cleared, the exit message
    /// is skipped, and the panic propagates.
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        self.run_with_console(console(), f)
    }

    /// Run fallible work under this status.
    ///
    /// On `Err` the session is closed without an exit message and the error
    /// propagates unchanged.
    pub fn try_run<T, E>(&self, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        self.try_run_with_console(console(), f)
    }

    /// Run work on behalf of a subject, honouring its [`ShowStatus`]
    /// capability. The check happens once, before the session opens.
    pub fn run_on<S, T>(&self, subject: &S, f: impl FnOnce(&S) -> T) -> T
    where
        S: ShowStatus + ?Sized,
    {
        self.run_on_with_console(console(), subject, f)
    }

    fn run_on_with_console<S, T>(
        &self,
        console: &Console,
        subject: &S,
        f: impl FnOnce(&S) -> T,
    ) -> T
    where
        S: ShowStatus + ?Sized,
    {
        if !subject.show_status() {
            return f(subject);
        }
        self.run_with_console(console, || f(subject))
    }

    fn run_with_console<T>(&self, console: &Console, f: impl FnOnce() -> T) -> T {
        let session = StatusSession::open(console, self);
        let output = f();
        session.finish(self.exit_line(console));
        output
    }

    fn try_run_with_console<T, E>(
        &self,
        console: &Console,
        f: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let session = StatusSession::open(console, self);
        let output = f();
        match output {
            Ok(_) => session.finish(self.exit_line(console)),
            Err(_) => session.finish(None),
        }
        output
    }

    /// Styled exit line, if an exit message was supplied
    fn exit_line(&self, console: &Console) -> Option<String> {
        let message = self.exit_message.as_deref()?;
        let style = self
            .exit_style
            .as_deref()
            .and_then(|name| theme().named(name))
            .unwrap_or(theme().success);
        Some(format!("{}\n", styled_text(message, style, console.ansi())))
    }
}

/// One live status session bound to an in-progress call.
///
/// Closing is guaranteed: if the session is dropped without `finish` (the
/// wrapped work panicked), `Drop` clears the line and no exit message is
/// written.
struct StatusSession<'a> {
    console: &'a Console,
    /// Whether this session holds the animated line. A nested session does
    /// not, and degrades to plain start/stop output.
    owns_line: bool,
    closed: bool,
}

impl<'a> StatusSession<'a> {
    fn open(console: &'a Console, status: &Status) -> Self {
        let owns_line = console.start(&status.message, status.spinner, &status.opts);
        if owns_line {
            tracing::debug!("status session started: {}", status.message);
        } else {
            // Another session is animating; fall back to a plain start
            // line written through the sink so the outer spinner is
            // suspended around it.
            tracing::debug!("status line busy, degrading: {}", status.message);
            console.write(&format!("{}\n", status.message));
        }
        Self {
            console,
            owns_line,
            closed: false,
        }
    }

    /// Close the session and render the exit line, if any
    fn finish(mut self, exit_line: Option<String>) {
        self.close();
        if let Some(line) = exit_line {
            self.console.write(&line);
        }
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if self.owns_line {
            self.console.stop();
            tracing::debug!("status session closed");
        }
    }
}

impl Drop for StatusSession<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Wrap a unit of work so every call runs under the given status
pub fn with_status<T, F>(status: Status, mut f: F) -> impl FnMut() -> T
where
    F: FnMut() -> T,
{
    move || status.run(|| f())
}

/// Wrap a unit of work taking a subject; the subject's [`ShowStatus`]
/// capability decides per call whether the session is shown
pub fn with_status_on<S, T, F>(status: Status, mut f: F) -> impl FnMut(&S) -> T
where
    S: ShowStatus + ?Sized,
    F: FnMut(&S) -> T,
{
    move |subject| status.run_on(subject, |s| f(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::{Arc, Mutex};

    fn captured(buffer: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    struct Worker {
        show: bool,
    }

    impl ShowStatus for Worker {
        fn show_status(&self) -> bool {
            self.show
        }
    }

    #[test]
    fn test_run_emits_exit_message() {
        init_tracing();
        let (console, buffer) = Console::with_capture();
        let status = Status::new("working").exit_message("done");
        let result = status.run_with_console(&console, || 41 + 1);
        assert_eq!(result, 42);
        assert_eq!(captured(&buffer), "working\ndone\n");
    }

    #[test]
    fn test_no_exit_message_by_default() {
        let (console, buffer) = Console::with_capture();
        let status = Status::new("working");
        status.run_with_console(&console, || ());
        assert_eq!(captured(&buffer), "working\n");
    }

    #[test]
    fn test_suppressed_session_produces_no_status_output() {
        let (console, buffer) = Console::with_capture();
        let status = Status::new("working").exit_message("done");
        let worker = Worker { show: false };

        let result = status.run_on_with_console(&console, &worker, |_| {
            console.write("payload\n");
            7
        });

        assert_eq!(result, 7);
        // Only the callable's own output, no start or exit lines
        assert_eq!(captured(&buffer), "payload\n");
    }

    #[test]
    fn test_run_on_respects_capability() {
        let (console, buffer) = Console::with_capture();
        let status = Status::new("working");
        let shown = Worker { show: true };
        let hidden = Worker { show: false };
        assert_eq!(status.run_on_with_console(&console, &hidden, |_| 1), 1);
        assert_eq!(captured(&buffer), "");
        assert_eq!(status.run_on_with_console(&console, &shown, |_| 2), 2);
        assert_eq!(captured(&buffer), "working\n");
    }

    #[test]
    fn test_try_run_err_skips_exit_message() {
        let (console, buffer) = Console::with_capture();
        let status = Status::new("working").exit_message("done");
        let result: Result<(), &str> =
            status.try_run_with_console(&console, || Err("broken"));
        assert_eq!(result, Err("broken"));
        let out = captured(&buffer);
        assert!(out.contains("working"));
        assert!(!out.contains("done"));
    }

    #[test]
    fn test_try_run_ok_emits_exit_message() {
        let (console, buffer) = Console::with_capture();
        let status = Status::new("working").exit_message("done");
        let result: Result<i32, ()> = status.try_run_with_console(&console, || Ok(5));
        assert_eq!(result, Ok(5));
        assert!(captured(&buffer).ends_with("done\n"));
    }

    #[test]
    fn test_panic_restores_line_without_exit_message() {
        let (console, buffer) = Console::with_capture();
        let status = Status::new("working").exit_message("done");

        let result = catch_unwind(AssertUnwindSafe(|| {
            status.run_with_console(&console, || panic!("boom"));
        }));
        assert!(result.is_err());

        let out = captured(&buffer);
        assert!(!out.contains("done"));
        // The line is free again for the next session
        let follow_up = Status::new("next");
        follow_up.run_with_console(&console, || ());
        assert!(captured(&buffer).contains("next"));
    }

    #[test]
    fn test_nested_session_degrades_to_plain_lines() {
        let (console, buffer) = Console::with_capture();
        let outer = Status::new("outer").exit_message("outer done");
        let inner = Status::new("inner").exit_message("inner done");

        outer.run_with_console(&console, || {
            inner.run_with_console(&console, || {
                console.write("payload\n");
            });
        });

        assert_eq!(
            captured(&buffer),
            "outer\ninner\npayload\ninner done\nouter done\n"
        );
    }

    #[test]
    fn test_nested_output_is_a_clean_block() {
        let (console, buffer) = Console::with_capture();
        let status = Status::new("working");
        status.run_with_console(&console, || {
            console.write("line one\nline two\n");
        });
        assert!(captured(&buffer).contains("line one\nline two\n"));
    }

    #[test]
    fn test_with_status_wrapper_preserves_return_value() {
        let status = Status::new("working");
        let mut wrapped = with_status(status, || "value");
        assert_eq!(wrapped(), "value");
        assert_eq!(wrapped(), "value");
    }

    #[test]
    fn test_with_status_on_wrapper() {
        let status = Status::new("working");
        let mut wrapped = with_status_on(status, |w: &Worker| w.show);
        assert!(!wrapped(&Worker { show: false }));
        assert!(wrapped(&Worker { show: true }));
    }
}
