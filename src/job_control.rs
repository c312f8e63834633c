use std::io::{self, Write};

use log::{debug, warn};
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::error::{ErrorKind, ShellError, ShellResult};

/// How a child changed state, carrying the exit code or signal number.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WaitOutcome {
    Exited(i32),
    Signaled(i32),
    Stopped(i32),
}

impl WaitOutcome {
    /// Value for `$?`: the exit code, or 128 plus the signal number.
    pub fn status_code(self) -> i32 {
        match self {
            WaitOutcome::Exited(code) => code,
            WaitOutcome::Signaled(sig) | WaitOutcome::Stopped(sig) => 128 + sig,
        }
    }

    fn is_done(self) -> bool {
        !matches!(self, WaitOutcome::Stopped(_))
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum JobStatus {
    Running,
    Stopped,
    /// Already collected, waiting to be reported by the next sweep.
    Done(WaitOutcome),
}

#[derive(Debug, Clone)]
pub struct Job {
    pub pid: Pid,
    pub command: String,
    pub status: JobStatus,
}

impl Job {
    pub fn new(pid: Pid, command: &str, status: JobStatus) -> Self {
        Self {
            pid,
            command: command.to_string(),
            status,
        }
    }
}

/// Block until `pid` exits, is killed or stops.
pub fn wait_foreground(pid: Pid) -> ShellResult<WaitOutcome> {
    debug!("job event=wait pid={}", pid);
    loop {
        match waitpid(pid, Some(WaitPidFlag::WUNTRACED)) {
            Ok(status) => {
                if let Some(outcome) = outcome_of(status) {
                    debug!("job event=waited pid={} outcome={:?}", pid, outcome);
                    return Ok(outcome);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(err) => {
                return Err(ShellError::new(
                    ErrorKind::Wait,
                    format!("cannot wait for process {pid}: {}", err.desc()),
                ));
            }
        }
    }
}

/// Check on `pid` without blocking. `Ok(None)` means it is still running.
pub fn poll_job(pid: Pid) -> nix::Result<Option<WaitOutcome>> {
    loop {
        match waitpid(pid, Some(WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED)) {
            Ok(status) => return Ok(outcome_of(status)),
            Err(Errno::EINTR) => continue,
            Err(err) => return Err(err),
        }
    }
}

pub fn continue_job(pid: Pid) -> nix::Result<()> {
    debug!("job event=cont pid={}", pid);
    kill(pid, Signal::SIGCONT)
}

fn outcome_of(status: WaitStatus) -> Option<WaitOutcome> {
    match status {
        WaitStatus::Exited(_, code) => Some(WaitOutcome::Exited(code)),
        WaitStatus::Signaled(_, sig, _) => Some(WaitOutcome::Signaled(sig as i32)),
        WaitStatus::Stopped(_, sig) => Some(WaitOutcome::Stopped(sig as i32)),
        _ => None,
    }
}

/// Report and forget finished background jobs; restart stopped ones.
pub fn reap_jobs<W: Write>(jobs: &mut Vec<Job>, diag: &mut W) -> io::Result<()> {
    let mut index = 0;
    while index < jobs.len() {
        let Job { pid, status, .. } = jobs[index];
        let outcome = match status {
            JobStatus::Done(outcome) => Some(outcome),
            JobStatus::Stopped => Some(WaitOutcome::Stopped(Signal::SIGSTOP as i32)),
            JobStatus::Running => match poll_job(pid) {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!("job event=poll pid={} error={}", pid, err);
                    jobs.remove(index);
                    continue;
                }
            },
        };
        let Some(outcome) = outcome else {
            index += 1;
            continue;
        };

        match outcome {
            WaitOutcome::Exited(code) => {
                writeln!(diag, "Child process {pid} done. Exit status {code}.")?;
            }
            WaitOutcome::Signaled(sig) => {
                writeln!(diag, "Child process {pid} done. Signaled {sig}.")?;
            }
            WaitOutcome::Stopped(_) => {
                if let Err(err) = continue_job(pid) {
                    warn!("job event=cont pid={} error={}", pid, err);
                }
                writeln!(diag, "Child process {pid} stopped. Continuing.")?;
            }
        }

        if outcome.is_done() {
            let job = jobs.remove(index);
            debug!("job event=reap done pid={} cmd={:?}", job.pid, job.command);
        } else {
            jobs[index].status = JobStatus::Running;
            index += 1;
        }
    }
    Ok(())
}
