use std::os::fd::BorrowedFd;

use log::{debug, warn};
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

use crate::error::{ErrorKind, ShellError, ShellResult};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SignalState {
    /// Blocked in a line read; SIGINT re-prompts.
    AwaitingInput,
    /// Running a command; SIGINT only reaches the child.
    Processing,
}

/// Interpreter-side SIGINT and SIGTSTP handling.
///
/// The actions in place before `install` are saved once and handed back to
/// every child through `restore_defaults`. Dropping the controller restores
/// them in the interpreter as well.
pub struct SignalController {
    default_int: SigAction,
    default_tstp: SigAction,
    state: SignalState,
}

impl SignalController {
    pub fn install() -> ShellResult<Self> {
        let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::all());
        let default_tstp = install_action(Signal::SIGTSTP, &ignore)?;
        let default_int = install_action(Signal::SIGINT, &prompt_action())?;
        debug!("signal event=install tstp=ignore int=newline");
        Ok(Self {
            default_int,
            default_tstp,
            state: SignalState::AwaitingInput,
        })
    }

    pub fn state(&self) -> SignalState {
        self.state
    }

    pub fn awaiting_input(&mut self) -> ShellResult<()> {
        if self.state != SignalState::AwaitingInput {
            install_action(Signal::SIGINT, &prompt_action())?;
            self.state = SignalState::AwaitingInput;
            debug!("signal event=state value=awaiting-input");
        }
        Ok(())
    }

    pub fn processing(&mut self) -> ShellResult<()> {
        if self.state != SignalState::Processing {
            let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::all());
            install_action(Signal::SIGINT, &ignore)?;
            self.state = SignalState::Processing;
            debug!("signal event=state value=processing");
        }
        Ok(())
    }

    /// Put back the actions saved by `install`. Runs in the forked child, so
    /// it must not allocate or log.
    pub fn restore_defaults(&self) -> nix::Result<()> {
        unsafe {
            sigaction(Signal::SIGINT, &self.default_int)?;
            sigaction(Signal::SIGTSTP, &self.default_tstp)?;
        }
        Ok(())
    }
}

impl Drop for SignalController {
    fn drop(&mut self) {
        if let Err(err) = self.restore_defaults() {
            warn!("signal event=restore error={}", err);
        }
    }
}

// No SA_RESTART: the pending read must fail with EINTR.
fn prompt_action() -> SigAction {
    SigAction::new(
        SigHandler::Handler(newline_on_interrupt),
        SaFlags::empty(),
        SigSet::all(),
    )
}

extern "C" fn newline_on_interrupt(_: libc::c_int) {
    let fd = unsafe { BorrowedFd::borrow_raw(libc::STDERR_FILENO) };
    let _ = nix::unistd::write(fd, b"\n");
}

fn install_action(signal: Signal, action: &SigAction) -> ShellResult<SigAction> {
    unsafe { sigaction(signal, action) }.map_err(|err| {
        ShellError::new(
            ErrorKind::Signal,
            format!("cannot set {} action: {}", signal.as_str(), err.desc()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::ptr;

    fn current_handler(signal: libc::c_int) -> libc::sighandler_t {
        let mut old: libc::sigaction = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::sigaction(signal, ptr::null(), &mut old) };
        assert_eq!(rc, 0);
        old.sa_sigaction
    }

    fn current_flags(signal: libc::c_int) -> libc::c_int {
        let mut old: libc::sigaction = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::sigaction(signal, ptr::null(), &mut old) };
        assert_eq!(rc, 0);
        old.sa_flags
    }

    #[test]
    #[serial]
    fn transitions_switch_sigint_disposition() {
        let mut signals = SignalController::install().unwrap();
        assert_eq!(signals.state(), SignalState::AwaitingInput);
        assert_eq!(current_handler(libc::SIGTSTP), libc::SIG_IGN);
        let handler = current_handler(libc::SIGINT);
        assert_ne!(handler, libc::SIG_IGN);
        assert_ne!(handler, libc::SIG_DFL);
        assert_eq!(current_flags(libc::SIGINT) & libc::SA_RESTART, 0);

        signals.processing().unwrap();
        assert_eq!(signals.state(), SignalState::Processing);
        assert_eq!(current_handler(libc::SIGINT), libc::SIG_IGN);

        signals.awaiting_input().unwrap();
        assert_eq!(current_handler(libc::SIGINT), handler);

        signals.restore_defaults().unwrap();
        assert_eq!(current_handler(libc::SIGINT), libc::SIG_DFL);
        assert_eq!(current_handler(libc::SIGTSTP), libc::SIG_DFL);
    }

    #[test]
    #[serial]
    fn saved_defaults_survive_repeated_transitions() {
        let mut signals = SignalController::install().unwrap();
        for _ in 0..3 {
            signals.processing().unwrap();
            signals.awaiting_input().unwrap();
        }
        signals.restore_defaults().unwrap();
        assert_eq!(current_handler(libc::SIGINT), libc::SIG_DFL);
        assert_eq!(current_handler(libc::SIGTSTP), libc::SIG_DFL);
    }
}
