use std::fs::File;
use std::io;

use log::{debug, warn};

use crate::builtins::{execute_builtin, is_builtin, BuiltinOutcome};
use crate::config::{prompt, InputSource, ShellConfig};
use crate::error::{ErrorKind, ShellError, ShellResult};
use crate::execution::{spawn, ExecPlan};
use crate::io_helpers::{print_prompt, stdin_file, LineReader, ReadOutcome};
use crate::job_control::{
    continue_job, poll_job, reap_jobs, wait_foreground, Job, JobStatus, WaitOutcome,
};
use crate::params::Parameters;
use crate::parse::{LineParser, ParsedCommand};
use crate::signals::SignalController;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Flow {
    Continue,
    Exit(i32),
}

pub(crate) struct ShellState {
    reader: LineReader<File>,
    interactive: bool,
    parser: LineParser,
    params: Parameters,
    signals: SignalController,
    jobs: Vec<Job>,
}

impl ShellState {
    pub(crate) fn new(config: &ShellConfig, input: File) -> ShellResult<Self> {
        Ok(Self {
            reader: LineReader::new(input),
            interactive: config.interactive(),
            parser: LineParser::new(config.max_words),
            params: Parameters::new(),
            signals: SignalController::install()?,
            jobs: Vec::new(),
        })
    }
}

/// Run the interpreter until end of input or `exit`, returning the status to
/// exit with.
pub fn run(config: &ShellConfig) -> ShellResult<i32> {
    let input = open_input(&config.input)?;
    let mut state = ShellState::new(config, input)?;
    debug!(
        "shell event=start interactive={} max_words={}",
        state.interactive,
        state.parser.max_words()
    );
    loop {
        if let Flow::Exit(code) = run_once(&mut state)? {
            debug!("shell event=exit code={}", code);
            return Ok(code);
        }
    }
}

fn open_input(source: &InputSource) -> ShellResult<File> {
    match source {
        InputSource::Stdin => stdin_file().map_err(|err| {
            ShellError::new(ErrorKind::Input, format!("cannot open standard input: {err}"))
        }),
        InputSource::Script(path) => File::open(path).map_err(|err| {
            ShellError::new(ErrorKind::Input, format!("{}: {err}", path.display()))
        }),
    }
}

pub(crate) fn run_once(state: &mut ShellState) -> ShellResult<Flow> {
    state.signals.awaiting_input()?;
    if let Err(err) = reap_jobs(&mut state.jobs, &mut io::stderr().lock()) {
        warn!("job event=report error={}", err);
    }
    if state.interactive {
        if let Err(err) = print_prompt(&prompt()) {
            warn!("prompt event=write error={}", err);
        }
    }

    let line = match state.reader.read_line() {
        Ok(ReadOutcome::Line(line)) => line,
        Ok(ReadOutcome::Interrupted) => {
            debug!("input event=interrupted");
            return Ok(Flow::Continue);
        }
        Ok(ReadOutcome::Eof) => return Ok(Flow::Exit(0)),
        Err(err) => {
            return Err(ShellError::new(
                ErrorKind::Input,
                format!("cannot read input: {err}"),
            ));
        }
    };
    state.signals.processing()?;

    let parsed = {
        let ctx = state.params.expansion_context();
        state.parser.parse_line(&line, &ctx)
    };
    match parsed {
        Ok(Some(cmd)) => execute(state, &cmd),
        Ok(None) => Ok(Flow::Continue),
        Err(err) => report(state, err),
    }
}

fn report(state: &mut ShellState, err: ShellError) -> ShellResult<Flow> {
    if err.is_fatal() {
        return Err(err);
    }
    match err.kind {
        ErrorKind::Parse => eprintln!("parse error: {}", err.message),
        _ => eprintln!("error: {}", err.message),
    }
    state.params.set_last_status(err.status());
    Ok(Flow::Continue)
}

fn execute(state: &mut ShellState, cmd: &ParsedCommand) -> ShellResult<Flow> {
    if cmd.args.is_empty() {
        debug!("exec event=skip reason=empty-argv");
        return Ok(Flow::Continue);
    }
    if is_builtin(cmd.name()) {
        return Ok(match execute_builtin(&mut state.params, &cmd.args) {
            BuiltinOutcome::Continue => Flow::Continue,
            BuiltinOutcome::Exit(code) => Flow::Exit(code),
        });
    }

    let plan = match ExecPlan::new(cmd) {
        Ok(plan) => plan,
        Err(err) => return report(state, err),
    };
    let pid = spawn(&plan, &state.signals)?;

    if plan.background() {
        let status = match poll_job(pid) {
            Ok(None) => JobStatus::Running,
            Ok(Some(WaitOutcome::Stopped(_))) => JobStatus::Stopped,
            Ok(Some(outcome)) => JobStatus::Done(outcome),
            Err(err) => {
                warn!("job event=poll pid={} error={}", pid, err);
                JobStatus::Running
            }
        };
        state.params.set_background(pid);
        state.jobs.push(Job::new(pid, plan.display(), status));
        return Ok(Flow::Continue);
    }

    match wait_foreground(pid)? {
        WaitOutcome::Stopped(_) => {
            eprintln!("Child process {pid} stopped. Continuing.");
            if let Err(err) = continue_job(pid) {
                warn!("job event=cont pid={} error={}", pid, err);
            }
            state.params.set_background(pid);
            state
                .jobs
                .push(Job::new(pid, plan.display(), JobStatus::Running));
        }
        outcome => state.params.set_last_status(outcome.status_code()),
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    fn state_for(script: &str) -> (ShellState, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("script");
        fs::write(&path, script).unwrap();
        let config = ShellConfig {
            input: InputSource::Script(path.clone()),
            ..ShellConfig::default()
        };
        let state = ShellState::new(&config, File::open(&path).unwrap()).unwrap();
        (state, dir)
    }

    fn run_all(state: &mut ShellState) -> i32 {
        loop {
            if let Flow::Exit(code) = run_once(state).unwrap() {
                return code;
            }
        }
    }

    #[test]
    #[serial]
    fn foreground_status_flows_into_parameter() {
        let (mut state, _dir) = state_for("sh -c exit\\ 7\n");
        assert_eq!(run_once(&mut state).unwrap(), Flow::Continue);
        assert_eq!(state.params.last_status(), 7);
        assert_eq!(run_once(&mut state).unwrap(), Flow::Exit(0));
    }

    #[test]
    #[serial]
    fn parse_errors_set_status_two() {
        let (mut state, _dir) = state_for("echo hi >\n");
        assert_eq!(run_once(&mut state).unwrap(), Flow::Continue);
        assert_eq!(state.params.last_status(), 2);
    }

    #[test]
    #[serial]
    fn exit_builtin_uses_last_status() {
        let (mut state, _dir) = state_for("false\nexit\necho unreachable\n");
        assert_eq!(run_all(&mut state), 1);
    }

    #[test]
    #[serial]
    fn empty_argv_keeps_status() {
        let (mut state, _dir) = state_for("sh -c exit\\ 4\n&\n# note\n\n");
        assert_eq!(run_all(&mut state), 0);
        assert_eq!(state.params.last_status(), 4);
        assert!(state.jobs.is_empty());
    }

    #[test]
    #[serial]
    fn background_job_is_recorded_without_blocking() {
        let (mut state, _dir) = state_for("sleep 5 &\n");
        let started = Instant::now();
        assert_eq!(run_once(&mut state).unwrap(), Flow::Continue);
        assert!(started.elapsed() < Duration::from_secs(3));

        let pid = state.params.last_background().unwrap();
        assert_eq!(state.jobs.len(), 1);
        assert_eq!(state.jobs[0].pid, pid);
        assert_eq!(state.jobs[0].command, "sleep 5 &");
        assert_eq!(state.params.last_status(), 0);

        nix::sys::signal::kill(pid, nix::sys::signal::Signal::SIGKILL).unwrap();
        wait_foreground(pid).unwrap();
    }

    #[test]
    #[serial]
    fn stopped_foreground_child_moves_to_background() {
        // `$$` on the command line would expand to the interpreter's own pid.
        let helper = tempdir().unwrap();
        let stopper = helper.path().join("stop.sh");
        fs::write(&stopper, "kill -STOP $$\n").unwrap();
        let (mut state, _dir) = state_for(&format!("sh {}\n", stopper.display()));
        assert_eq!(run_once(&mut state).unwrap(), Flow::Continue);
        assert_eq!(state.jobs.len(), 1);
        let pid = state.jobs[0].pid;
        assert_eq!(state.params.last_background(), Some(pid));
        assert_eq!(state.params.last_status(), 0);
        assert_eq!(wait_foreground(pid).unwrap(), WaitOutcome::Exited(0));
    }
}
