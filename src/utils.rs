use crate::error::{ErrorKind, ShellError, ShellResult};

/// Append `text` to `buf`, failing instead of aborting when the allocation
/// cannot grow.
pub(crate) fn try_push_str(buf: &mut String, text: &str, what: &str) -> ShellResult<()> {
    buf.try_reserve(text.len()).map_err(|err| {
        ShellError::new(ErrorKind::Resource, format!("cannot grow {what} buffer: {err}"))
    })?;
    buf.push_str(text);
    Ok(())
}

pub(crate) fn try_push_char(buf: &mut String, ch: char, what: &str) -> ShellResult<()> {
    let mut encoded = [0u8; 4];
    try_push_str(buf, ch.encode_utf8(&mut encoded), what)
}
