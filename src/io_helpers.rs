use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::AsFd;

const CHUNK: usize = 1024;

#[derive(Debug, Eq, PartialEq)]
pub enum ReadOutcome {
    Line(String),
    /// A signal cut the read short; whatever was buffered is dropped.
    Interrupted,
    Eof,
}

/// Line reader that surfaces `EINTR` instead of retrying it.
///
/// `BufRead::read_line` loops on `Interrupted`, which would swallow the
/// Ctrl-C that is supposed to abandon the current line.
pub struct LineReader<R> {
    inner: R,
    pending: Vec<u8>,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::new(),
        }
    }

    pub fn read_line(&mut self) -> io::Result<ReadOutcome> {
        loop {
            if let Some(pos) = self.pending.iter().position(|&byte| byte == b'\n') {
                let rest = self.pending.split_off(pos + 1);
                let mut line = std::mem::replace(&mut self.pending, rest);
                line.pop();
                return Ok(ReadOutcome::Line(String::from_utf8_lossy(&line).into_owned()));
            }

            let start = self.pending.len();
            self.pending.try_reserve(CHUNK).map_err(io::Error::other)?;
            self.pending.resize(start + CHUNK, 0);
            match self.inner.read(&mut self.pending[start..]) {
                Ok(0) => {
                    self.pending.truncate(start);
                    if self.pending.is_empty() {
                        return Ok(ReadOutcome::Eof);
                    }
                    let line = std::mem::take(&mut self.pending);
                    return Ok(ReadOutcome::Line(String::from_utf8_lossy(&line).into_owned()));
                }
                Ok(read) => self.pending.truncate(start + read),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {
                    self.pending.clear();
                    return Ok(ReadOutcome::Interrupted);
                }
                Err(err) => {
                    self.pending.truncate(start);
                    return Err(err);
                }
            }
        }
    }
}

/// Raw handle on fd 0 for `LineReader`, bypassing the buffer kept by
/// `io::Stdin`.
pub fn stdin_file() -> io::Result<File> {
    let fd = io::stdin().as_fd().try_clone_to_owned()?;
    Ok(File::from(fd))
}

pub fn print_prompt(prompt: &str) -> io::Result<()> {
    let mut stderr = io::stderr().lock();
    stderr.write_all(prompt.as_bytes())?;
    stderr.flush()
}
