//! Word splitting for shell input.
//!
//! Words are separated by whitespace. A `#` at the start of a word comments
//! out the rest of the line, and a backslash makes the next character part
//! of the current word whatever it is.
use log::warn;

use crate::error::ShellResult;
use crate::utils::try_push_char;

pub fn split_words(line: &str, max_words: usize) -> ShellResult<Vec<String>> {
    let mut words = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.next_if(|ch| is_blank(*ch)).is_some() {}
        let Some(&first) = chars.peek() else {
            break;
        };
        if first == '#' {
            break;
        }
        if words.len() == max_words {
            warn!("tokenize event=truncate max_words={max_words}");
            break;
        }

        let mut word = String::new();
        while let Some(ch) = chars.next_if(|ch| !is_blank(*ch)) {
            let literal = if ch == '\\' {
                // A trailing backslash has nothing to escape and stays as-is.
                chars.next().unwrap_or('\\')
            } else {
                ch
            };
            try_push_char(&mut word, literal, "word")?;
        }
        words.push(word);
    }

    Ok(words)
}

// Same set as C isspace(); char::is_ascii_whitespace leaves out \v.
fn is_blank(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}
