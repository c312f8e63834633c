//! Parameter expansion.
//!
//! Recognized references, matched left to right without overlap:
//! - `$$` shell process id
//! - `$!` pid of the most recent background job, empty before the first one
//! - `$?` status of the last foreground command, `0` when unknown
//! - `${name}` any variable, empty when unset
//!
//! `${` without a closing `}` is left untouched and scanning moves on.
use crate::error::ShellResult;
use crate::utils::try_push_str;

type LookupVar<'a> = Box<dyn Fn(&str) -> Option<String> + 'a>;

pub struct ExpansionContext<'a> {
    pub lookup_var: LookupVar<'a>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Param<'w> {
    ShellPid,
    BackgroundPid,
    LastStatus,
    Named(&'w str),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct ParamRef<'w> {
    start: usize,
    end: usize,
    param: Param<'w>,
}

/// Builds expanded words in a single buffer that is cleared per word.
#[derive(Default)]
pub struct Expander {
    buf: String,
}

impl Expander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expand_words(
        &mut self,
        words: Vec<String>,
        ctx: &ExpansionContext<'_>,
    ) -> ShellResult<Vec<String>> {
        let mut expanded = Vec::with_capacity(words.len());
        for word in words {
            expanded.push(self.expand_word(&word, ctx)?);
        }
        Ok(expanded)
    }

    pub fn expand_word(&mut self, word: &str, ctx: &ExpansionContext<'_>) -> ShellResult<String> {
        self.buf.clear();
        let mut rest = word;
        while let Some(found) = next_reference(rest) {
            try_push_str(&mut self.buf, &rest[..found.start], "expansion")?;
            try_push_str(&mut self.buf, &resolve(found.param, ctx), "expansion")?;
            rest = &rest[found.end..];
        }
        try_push_str(&mut self.buf, rest, "expansion")?;
        Ok(self.buf.clone())
    }
}

/// Convenience wrapper for one-off expansion outside a `LineParser`.
pub fn expand_word(word: &str, ctx: &ExpansionContext<'_>) -> ShellResult<String> {
    Expander::new().expand_word(word, ctx)
}

fn resolve(param: Param<'_>, ctx: &ExpansionContext<'_>) -> String {
    match param {
        Param::ShellPid => (ctx.lookup_var)("$").unwrap_or_default(),
        Param::BackgroundPid => (ctx.lookup_var)("!").unwrap_or_default(),
        Param::LastStatus => (ctx.lookup_var)("?").unwrap_or_else(|| "0".to_string()),
        Param::Named(name) => (ctx.lookup_var)(name).unwrap_or_default(),
    }
}

// All delimiters are ASCII, so byte offsets always land on char boundaries.
fn next_reference(text: &str) -> Option<ParamRef<'_>> {
    let bytes = text.as_bytes();
    let mut from = 0;
    while let Some(offset) = text[from..].find('$') {
        let start = from + offset;
        let simple = match bytes.get(start + 1) {
            Some(b'$') => Some(Param::ShellPid),
            Some(b'!') => Some(Param::BackgroundPid),
            Some(b'?') => Some(Param::LastStatus),
            Some(b'{') => {
                let name_start = start + 2;
                if let Some(len) = text[name_start..].find('}') {
                    let name_end = name_start + len;
                    return Some(ParamRef {
                        start,
                        end: name_end + 1,
                        param: Param::Named(&text[name_start..name_end]),
                    });
                }
                None
            }
            _ => None,
        };
        if let Some(param) = simple {
            return Some(ParamRef {
                start,
                end: start + 2,
                param,
            });
        }
        from = start + 1;
    }
    None
}
