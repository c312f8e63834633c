use std::ffi::{CStr, CString};
use std::os::fd::RawFd;

use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2};

use crate::error::ShellResult;
use crate::parse::{RedirectKind, Redirection};

use super::to_cstring;

const CREATE_MODE: libc::mode_t = 0o777;

/// A redirection resolved to the exact `open` call the child will make.
pub(crate) struct PreparedRedirect {
    path: CString,
    target: RawFd,
    flags: OFlag,
}

impl PreparedRedirect {
    pub(crate) fn new(redirect: &Redirection) -> ShellResult<Self> {
        let (target, flags) = match redirect.kind {
            RedirectKind::Input => (libc::STDIN_FILENO, OFlag::O_RDONLY),
            RedirectKind::OutputTruncate => (
                libc::STDOUT_FILENO,
                OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            ),
            RedirectKind::OutputAppend => (
                libc::STDOUT_FILENO,
                OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_APPEND,
            ),
        };
        Ok(Self {
            path: to_cstring(&redirect.path)?,
            target,
            flags,
        })
    }

    pub(crate) fn path(&self) -> &CStr {
        &self.path
    }

    /// Open the target and move it onto stdin or stdout. Only called in the
    /// forked child.
    pub(crate) fn apply(&self) -> Result<(), Errno> {
        let fd = open(
            self.path.as_c_str(),
            self.flags,
            Mode::from_bits_truncate(CREATE_MODE),
        )?;
        if fd != self.target {
            dup2(fd, self.target)?;
            close(fd)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepare(kind: RedirectKind) -> PreparedRedirect {
        PreparedRedirect::new(&Redirection {
            kind,
            path: "/tmp/target".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn input_reads_onto_stdin() {
        let redirect = prepare(RedirectKind::Input);
        assert_eq!(redirect.target, libc::STDIN_FILENO);
        assert_eq!(redirect.flags, OFlag::O_RDONLY);
        assert_eq!(redirect.path().to_bytes(), b"/tmp/target");
    }

    #[test]
    fn output_kinds_create_on_stdout() {
        let truncate = prepare(RedirectKind::OutputTruncate);
        assert_eq!(truncate.target, libc::STDOUT_FILENO);
        assert!(truncate.flags.contains(OFlag::O_CREAT | OFlag::O_TRUNC));
        assert!(!truncate.flags.contains(OFlag::O_APPEND));

        let append = prepare(RedirectKind::OutputAppend);
        assert_eq!(append.target, libc::STDOUT_FILENO);
        assert!(append.flags.contains(OFlag::O_CREAT | OFlag::O_APPEND));
        assert!(!append.flags.contains(OFlag::O_TRUNC));
    }
}
