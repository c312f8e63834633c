use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use log::warn;

use crate::error::{ErrorKind, ShellError, ShellResult};
use crate::parse::MAX_WORDS;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum InputSource {
    Stdin,
    Script(PathBuf),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ShellConfig {
    pub input: InputSource,
    pub max_words: usize,
}

impl ShellConfig {
    /// Build the configuration from command-line operands (program name
    /// already skipped) and the process environment.
    pub fn from_args<I>(args: I) -> ShellResult<Self>
    where
        I: IntoIterator<Item = OsString>,
    {
        Self::from_parts(args, |name| env::var(name).ok())
    }

    fn from_parts<I, F>(args: I, lookup: F) -> ShellResult<Self>
    where
        I: IntoIterator<Item = OsString>,
        F: Fn(&str) -> Option<String>,
    {
        let mut args = args.into_iter();
        let input = match args.next() {
            None => InputSource::Stdin,
            Some(path) => InputSource::Script(PathBuf::from(path)),
        };
        if args.next().is_some() {
            return Err(ShellError::new(ErrorKind::Usage, "too many arguments")
                .with_context("Usage: minishell [FILE]"));
        }
        Ok(Self {
            input,
            max_words: max_words_from(lookup("MINISHELL_MAX_WORDS")),
        })
    }

    pub fn interactive(&self) -> bool {
        self.input == InputSource::Stdin
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            input: InputSource::Stdin,
            max_words: MAX_WORDS,
        }
    }
}

/// Current `PS1`, read fresh for every prompt.
pub fn prompt() -> String {
    env::var("PS1").unwrap_or_default()
}

fn max_words_from(value: Option<String>) -> usize {
    let Some(value) = value else {
        return MAX_WORDS;
    };
    match value.trim().parse::<usize>() {
        Ok(limit) if limit > 0 => limit,
        _ => {
            warn!("config event=ignore var=MINISHELL_MAX_WORDS value={value:?}");
            MAX_WORDS
        }
    }
}
