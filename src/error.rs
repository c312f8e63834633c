//! Error types and reporting for the shell.
//!
//! Every failure the interpreter itself can observe is a `ShellError`. The
//! kind decides what happens next:
//! - fatal kinds terminate the interpreter with status 1
//! - recoverable kinds are reported and folded into `$?`
//!
//! Errors inside a forked child never become a `ShellError`; the child reports
//! and exits on its own, and the parent sees an ordinary exit status.

use std::fmt;

/// Categorized error types for better diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad command-line invocation
    Usage,
    /// The input stream could not be opened or read
    Input,
    /// A word or expansion buffer could not grow
    Resource,
    /// Installing a signal disposition failed
    Signal,
    /// The child process could not be created
    Spawn,
    /// Waiting on a child failed for a reason other than interruption
    Wait,
    /// Malformed command line (missing redirection target)
    Parse,
    /// The command could not be prepared for execution
    Execution,
}

impl ErrorKind {
    pub fn is_fatal(self) -> bool {
        !matches!(self, ErrorKind::Parse | ErrorKind::Execution)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Usage => write!(f, "Usage error"),
            ErrorKind::Input => write!(f, "Input error"),
            ErrorKind::Resource => write!(f, "Resource error"),
            ErrorKind::Signal => write!(f, "Signal error"),
            ErrorKind::Spawn => write!(f, "Spawn error"),
            ErrorKind::Wait => write!(f, "Wait error"),
            ErrorKind::Parse => write!(f, "Parse error"),
            ErrorKind::Execution => write!(f, "Execution error"),
        }
    }
}

/// Rich error type with context information
#[derive(Debug, Clone)]
pub struct ShellError {
    pub kind: ErrorKind,
    pub message: String,
    /// Additional context explaining what was being processed
    pub context: Option<String>,
}

impl ShellError {
    /// Create a new error with just the kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ShellError {
            kind,
            message: message.into(),
            context: None,
        }
    }

    /// Add context string (e.g., "Expected: cmd < filename")
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    /// Value stored in `$?` when a recoverable error is reported.
    pub fn status(&self) -> i32 {
        match self.kind {
            ErrorKind::Parse => 2,
            _ => 1,
        }
    }

    /// Simplified display without input context
    pub fn display_simple(&self) -> String {
        let mut msg = format!("{}: {}", self.kind, self.message);
        if let Some(context) = &self.context {
            msg.push_str(&format!("\n  hint: {}", context));
        }
        msg
    }
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_simple())
    }
}

impl std::error::Error for ShellError {}

/// Convenience type alias for Results with ShellError
pub type ShellResult<T> = Result<T, ShellError>;
