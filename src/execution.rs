//! Launching external commands.
//!
//! Everything the child needs is converted to C strings in `ExecPlan::new`,
//! including the null-terminated pointer array handed to `execv`, so nothing
//! is allocated between fork and exec.
use std::ffi::{CStr, CString};
use std::ptr;

use libc::c_char;

use crate::error::{ErrorKind, ShellError, ShellResult};
use crate::parse::ParsedCommand;

mod redirection;
mod spawning;

use redirection::PreparedRedirect;
pub use spawning::spawn;

pub struct ExecPlan {
    argv: Vec<CString>,
    // Points into `argv`, which is never mutated after construction.
    argv_ptrs: Vec<*const c_char>,
    search_path: bool,
    redirects: Vec<PreparedRedirect>,
    background: bool,
    display: String,
}

impl ExecPlan {
    pub fn new(cmd: &ParsedCommand) -> ShellResult<Self> {
        let Some(name) = cmd.name() else {
            return Err(ShellError::new(ErrorKind::Execution, "empty command"));
        };
        let argv = cmd
            .args
            .iter()
            .map(|arg| to_cstring(arg))
            .collect::<ShellResult<Vec<CString>>>()?;
        let argv_ptrs = argv
            .iter()
            .map(|arg| arg.as_ptr())
            .chain([ptr::null()])
            .collect();
        let redirects = cmd
            .redirections
            .iter()
            .map(PreparedRedirect::new)
            .collect::<ShellResult<Vec<_>>>()?;
        Ok(Self {
            argv,
            argv_ptrs,
            search_path: !name.contains('/'),
            redirects,
            background: cmd.background,
            display: cmd.display(),
        })
    }

    pub fn program(&self) -> &CStr {
        // `new` rejects an empty argv.
        self.argv[0].as_c_str()
    }

    /// Whether the program is looked up in `PATH` rather than used as a path.
    pub fn search_path(&self) -> bool {
        self.search_path
    }

    pub fn background(&self) -> bool {
        self.background
    }

    pub fn display(&self) -> &str {
        &self.display
    }
}

pub(crate) fn to_cstring(text: &str) -> ShellResult<CString> {
    CString::new(text).map_err(|_| {
        ShellError::new(
            ErrorKind::Execution,
            format!("{}: contains a NUL byte", text.replace('\0', "\\0")),
        )
    })
}
