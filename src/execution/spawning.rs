use std::os::fd::BorrowedFd;

use log::debug;
use nix::errno::Errno;
use nix::unistd::{fork, write, ForkResult, Pid};

use crate::error::{ErrorKind, ShellError, ShellResult};
use crate::signals::SignalController;

use super::ExecPlan;

/// Fork and exec `plan`, returning the child's pid without waiting for it.
///
/// Failures after the fork (redirection targets, exec) are reported by the
/// child on stderr and turn into exit status 1.
pub fn spawn(plan: &ExecPlan, signals: &SignalController) -> ShellResult<Pid> {
    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => {
            debug!(
                "job event=spawn kind={} pid={} cmd={:?}",
                if plan.background() { "background" } else { "foreground" },
                child,
                plan.display()
            );
            Ok(child)
        }
        Ok(ForkResult::Child) => run_child(plan, signals),
        Err(err) => Err(ShellError::new(
            ErrorKind::Spawn,
            format!("cannot fork: {}", err.desc()),
        )),
    }
}

// Between fork and exec: no allocation, no logging.
fn run_child(plan: &ExecPlan, signals: &SignalController) -> ! {
    if let Err(err) = signals.restore_defaults() {
        child_exit(b"minishell: signal setup", err.desc());
    }
    for redirect in &plan.redirects {
        if let Err(err) = redirect.apply() {
            child_exit(redirect.path().to_bytes(), err.desc());
        }
    }
    let err = exec(plan);
    let reason = if err == Errno::ENOENT && plan.search_path() {
        "command not found"
    } else {
        err.desc()
    };
    child_exit(plan.program().to_bytes(), reason)
}

/// Only returns if the exec failed.
fn exec(plan: &ExecPlan) -> Errno {
    let program = plan.program().as_ptr();
    let argv = plan.argv_ptrs.as_ptr();
    unsafe {
        if plan.search_path() {
            libc::execvp(program, argv);
        } else {
            libc::execv(program, argv);
        }
    }
    Errno::last()
}

fn child_exit(subject: &[u8], reason: &str) -> ! {
    let stderr = unsafe { BorrowedFd::borrow_raw(libc::STDERR_FILENO) };
    let parts: [&[u8]; 4] = [subject, b": ", reason.as_bytes(), b"\n"];
    for part in parts {
        let _ = write(stderr, part);
    }
    unsafe { libc::_exit(1) }
}
