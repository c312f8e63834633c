//! Turning a raw input line into a command.
//!
//! Three passes run in a fixed order:
//! - the tokenizer splits the line into words
//! - the expander substitutes parameter references inside each word
//! - the command parser pulls out redirections and the trailing `&`
//!
//! `LineParser` owns the state shared by those passes for a whole session.
use std::fmt;

use log::debug;

use crate::error::ShellResult;
use crate::expansion::{ExpansionContext, Expander};

mod command_parser;
mod redirection_parser;
mod tokenizer;

pub use command_parser::parse_command;
pub use tokenizer::split_words;

/// Default bound on the number of words taken from one line.
pub const MAX_WORDS: usize = 512;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RedirectKind {
    Input,
    OutputTruncate,
    OutputAppend,
}

impl RedirectKind {
    pub fn from_operator(word: &str) -> Option<Self> {
        match word {
            "<" => Some(RedirectKind::Input),
            ">" => Some(RedirectKind::OutputTruncate),
            ">>" => Some(RedirectKind::OutputAppend),
            _ => None,
        }
    }

    pub fn operator(self) -> &'static str {
        match self {
            RedirectKind::Input => "<",
            RedirectKind::OutputTruncate => ">",
            RedirectKind::OutputAppend => ">>",
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Redirection {
    pub kind: RedirectKind,
    pub path: String,
}

impl fmt::Display for Redirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.kind.operator(), self.path)
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ParsedCommand {
    pub args: Vec<String>,
    pub redirections: Vec<Redirection>,
    pub background: bool,
}

impl ParsedCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    /// Command text used in job diagnostics.
    pub fn display(&self) -> String {
        let mut parts = self.args.clone();
        parts.extend(self.redirections.iter().map(Redirection::to_string));
        if self.background {
            parts.push("&".to_string());
        }
        parts.join(" ")
    }
}

/// Parser context carried across lines: the word bound and the reusable
/// expansion buffer.
pub struct LineParser {
    max_words: usize,
    expander: Expander,
}

impl LineParser {
    pub fn new(max_words: usize) -> Self {
        Self {
            max_words,
            expander: Expander::new(),
        }
    }

    pub fn max_words(&self) -> usize {
        self.max_words
    }

    /// Run the whole pipeline over one line. `Ok(None)` means the line held
    /// no words (blank or comment-only).
    pub fn parse_line(
        &mut self,
        line: &str,
        ctx: &ExpansionContext<'_>,
    ) -> ShellResult<Option<ParsedCommand>> {
        let words = split_words(line, self.max_words)?;
        if words.is_empty() {
            return Ok(None);
        }
        debug!("parse event=split words={:?}", words);
        let expanded = self.expander.expand_words(words, ctx)?;
        debug!("parse event=expand words={:?}", expanded);
        parse_command(expanded).map(Some)
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new(MAX_WORDS)
    }
}
