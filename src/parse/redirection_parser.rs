use crate::error::{ErrorKind, ShellError, ShellResult};
use crate::parse::{ParsedCommand, RedirectKind, Redirection};

/// Consume the target word following a redirection operator.
pub(crate) fn apply_redirection<I>(
    current: &mut ParsedCommand,
    kind: RedirectKind,
    iter: &mut I,
) -> ShellResult<()>
where
    I: Iterator<Item = String>,
{
    let path = iter.next().ok_or_else(|| {
        ShellError::new(
            ErrorKind::Parse,
            format!("missing redirection target after '{}'", kind.operator()),
        )
        .with_context(format!("Expected: cmd {} filename", kind.operator()))
    })?;
    current.redirections.push(Redirection { kind, path });
    Ok(())
}
