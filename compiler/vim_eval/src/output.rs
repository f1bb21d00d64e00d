//! Message output for `:echo`, `:echomsg` and error reports.
//!
//! Output can be directed to different destinations:
//! - Native: stdout/stderr (default)
//! - Tests and embedding hosts: a buffer that can be inspected
//! - Silent: discard everything
//!
//! Uses enum dispatch instead of trait objects; the set of destinations is
//! closed and echo is on a hot path in loops.

use std::sync::Arc;

use parking_lot::Mutex;

/// Writes messages to stdout and errors to stderr.
#[derive(Default)]
pub struct StdoutOutput;

impl StdoutOutput {
    pub fn echo(&self, msg: &str) {
        println!("{msg}");
    }

    pub fn echon(&self, msg: &str) {
        print!("{msg}");
    }

    pub fn error(&self, msg: &str) {
        eprintln!("{msg}");
    }
}

/// Captures everything written to it.
///
/// `:echo` text and error reports land in the same transcript, in order,
/// as they would on the editor's message line. Errors and `:echomsg` lines
/// are also kept separately, like Vim's `:messages` history.
pub struct BufferOutput {
    transcript: Mutex<String>,
    errors: Mutex<Vec<String>>,
    history: Mutex<Vec<String>>,
}

impl BufferOutput {
    pub fn new() -> Self {
        BufferOutput {
            transcript: Mutex::new(String::new()),
            errors: Mutex::new(Vec::new()),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn echo(&self, msg: &str) {
        let mut buf = self.transcript.lock();
        buf.push_str(msg);
        buf.push('\n');
    }

    pub fn echon(&self, msg: &str) {
        self.transcript.lock().push_str(msg);
    }

    pub fn error(&self, msg: &str) {
        self.echo(msg);
        self.errors.lock().push(msg.to_string());
        self.history.lock().push(msg.to_string());
    }

    pub fn remember(&self, msg: &str) {
        self.history.lock().push(msg.to_string());
    }

    pub fn get_output(&self) -> String {
        self.transcript.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.history.lock().clone()
    }

    pub fn clear(&self) {
        self.transcript.lock().clear();
        self.errors.lock().clear();
        self.history.lock().clear();
    }
}

impl Default for BufferOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// Output destination.
pub enum OutputHandler {
    /// stdout/stderr (default).
    Stdout(StdoutOutput),
    /// In-memory capture.
    Buffer(BufferOutput),
    /// Discards all output.
    Silent,
}

impl OutputHandler {
    /// `:echo`: one line.
    pub fn echo(&self, msg: &str) {
        match self {
            Self::Stdout(h) => h.echo(msg),
            Self::Buffer(h) => h.echo(msg),
            Self::Silent => {}
        }
    }

    /// `:echon`: no line break.
    pub fn echon(&self, msg: &str) {
        match self {
            Self::Stdout(h) => h.echon(msg),
            Self::Buffer(h) => h.echon(msg),
            Self::Silent => {}
        }
    }

    /// `:echomsg`: one line, kept in the message history.
    pub fn echomsg(&self, msg: &str) {
        match self {
            Self::Stdout(h) => h.echo(msg),
            Self::Buffer(h) => {
                h.echo(msg);
                h.remember(msg);
            }
            Self::Silent => {}
        }
    }

    /// An error report: `:echoerr` or an uncaught error.
    pub fn error(&self, msg: &str) {
        match self {
            Self::Stdout(h) => h.error(msg),
            Self::Buffer(h) => h.error(msg),
            Self::Silent => {}
        }
    }

    /// Captured transcript; empty for handlers that do not capture.
    pub fn get_output(&self) -> String {
        match self {
            Self::Buffer(h) => h.get_output(),
            Self::Stdout(_) | Self::Silent => String::new(),
        }
    }

    /// Captured error reports.
    pub fn errors(&self) -> Vec<String> {
        match self {
            Self::Buffer(h) => h.errors(),
            Self::Stdout(_) | Self::Silent => Vec::new(),
        }
    }

    /// Captured `:messages` history.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Buffer(h) => h.messages(),
            Self::Stdout(_) | Self::Silent => Vec::new(),
        }
    }

    pub fn clear(&self) {
        if let Self::Buffer(h) = self {
            h.clear();
        }
    }
}

/// Output handler shared between the interpreter and its host.
pub type SharedOutputHandler = Arc<OutputHandler>;

/// Handler writing to stdout/stderr.
pub fn stdout_handler() -> SharedOutputHandler {
    Arc::new(OutputHandler::Stdout(StdoutOutput))
}

/// Handler capturing output for inspection.
pub fn buffer_handler() -> SharedOutputHandler {
    Arc::new(OutputHandler::Buffer(BufferOutput::new()))
}

/// Handler discarding all output.
pub fn silent_handler() -> SharedOutputHandler {
    Arc::new(OutputHandler::Silent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn buffer_echo_adds_newline() {
        let handler = BufferOutput::new();
        handler.echo("hello");
        assert_eq!(handler.get_output(), "hello\n");
    }

    #[test]
    fn buffer_echon_does_not() {
        let handler = BufferOutput::new();
        handler.echon("a");
        handler.echon("b");
        assert_eq!(handler.get_output(), "ab");
    }

    #[test]
    fn errors_join_transcript_and_history() {
        let handler = buffer_handler();
        handler.echo("one");
        handler.error("E121: Undefined variable: x");
        handler.echomsg("two");
        assert_eq!(
            handler.get_output(),
            "one\nE121: Undefined variable: x\ntwo\n"
        );
        assert_eq!(handler.errors(), vec!["E121: Undefined variable: x"]);
        assert_eq!(
            handler.messages(),
            vec!["E121: Undefined variable: x", "two"]
        );
    }

    #[test]
    fn clear_resets_everything() {
        let handler = buffer_handler();
        handler.error("E1");
        handler.clear();
        assert_eq!(handler.get_output(), "");
        assert!(handler.errors().is_empty());
    }

    #[test]
    fn silent_and_stdout_capture_nothing() {
        let silent = silent_handler();
        silent.echo("x");
        assert_eq!(silent.get_output(), "");
        assert_eq!(stdout_handler().get_output(), "");
    }
}
