//! A small line-oriented command interpreter.
//!
//! The binary is a thin wrapper around [`run`]; the parsing and expansion
//! layers are public so fuzz targets and tests can drive them directly.

pub mod builtins;
pub mod config;
pub mod error;
pub mod execution;
pub mod expansion;
pub mod io_helpers;
pub mod job_control;
pub mod params;
pub mod parse;
mod repl;
pub mod signals;
mod utils;

pub use config::ShellConfig;
pub use error::{ErrorKind, ShellError, ShellResult};
pub use expansion::{expand_word, ExpansionContext, Expander};
pub use parse::{parse_command, split_words, LineParser, ParsedCommand, MAX_WORDS};
pub use repl::run;

/// Fuzz helper for tokenizer and command parser targets.
pub fn fuzz_parse_bytes(data: &[u8]) {
    let input = String::from_utf8_lossy(data);
    let Ok(words) = split_words(&input, MAX_WORDS) else {
        return;
    };
    assert!(words.len() <= MAX_WORDS);
    let _ = parse_command(words);
}

/// Fuzz helper for the whole line pipeline, expansion included.
pub fn fuzz_expand_bytes(data: &[u8]) {
    let input = String::from_utf8_lossy(data);
    let ctx = ExpansionContext {
        lookup_var: Box::new(|name| Some(name.to_string())),
    };
    if !input.contains('$') {
        if let Ok(expanded) = expand_word(&input, &ctx) {
            assert_eq!(expanded, input);
        }
    }
    let _ = LineParser::default().parse_line(&input, &ctx);
}
