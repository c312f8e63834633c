//! Special parameter table.
//!
//! `$`, `!` and `?` live here rather than in the process environment, so
//! children never inherit them. Every other name falls through to the
//! environment.
use std::env;

use nix::unistd::{getpid, Pid};

use crate::expansion::ExpansionContext;

#[derive(Debug, Clone)]
pub struct Parameters {
    shell_pid: String,
    last_background: Option<Pid>,
    last_status: i32,
}

impl Parameters {
    pub fn new() -> Self {
        Self::with_pid(getpid())
    }

    pub fn with_pid(pid: Pid) -> Self {
        Self {
            shell_pid: pid.to_string(),
            last_background: None,
            last_status: 0,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<String> {
        match name {
            "$" => Some(self.shell_pid.clone()),
            "!" => self.last_background.map(|pid| pid.to_string()),
            "?" => Some(self.last_status.to_string()),
            _ => env::var_os(name).map(|value| value.to_string_lossy().into_owned()),
        }
    }

    pub fn last_status(&self) -> i32 {
        self.last_status
    }

    pub fn set_last_status(&mut self, status: i32) {
        self.last_status = status;
    }

    pub fn last_background(&self) -> Option<Pid> {
        self.last_background
    }

    pub fn set_background(&mut self, pid: Pid) {
        self.last_background = Some(pid);
    }

    pub fn expansion_context(&self) -> ExpansionContext<'_> {
        ExpansionContext {
            lookup_var: Box::new(move |name| self.lookup(name)),
        }
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::expand_word;

    #[test]
    fn specials_start_with_defaults() {
        let params = Parameters::with_pid(Pid::from_raw(321));
        assert_eq!(params.lookup("$").as_deref(), Some("321"));
        assert_eq!(params.lookup("?").as_deref(), Some("0"));
        assert_eq!(params.lookup("!"), None);
    }

    #[test]
    fn setters_are_visible_through_expansion() {
        let mut params = Parameters::with_pid(Pid::from_raw(10));
        params.set_last_status(130);
        params.set_background(Pid::from_raw(55));
        let ctx = params.expansion_context();
        assert_eq!(expand_word("$$:$?:$!", &ctx).unwrap(), "10:130:55");
    }

    #[test]
    fn shell_pid_defaults_to_current_process() {
        let params = Parameters::new();
        assert_eq!(
            params.lookup("$"),
            Some(std::process::id().to_string())
        );
    }

    #[test]
    fn other_names_come_from_environment() {
        let params = Parameters::new();
        let path = env::var("PATH").ok();
        assert_eq!(params.lookup("PATH"), path);
        assert_eq!(params.lookup("MINISHELL_SURELY_UNSET_VARIABLE"), None);
    }
}
