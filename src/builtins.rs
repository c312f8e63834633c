use std::env;
use std::path::PathBuf;

use crate::params::Parameters;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BuiltinOutcome {
    Continue,
    Exit(i32),
}

pub fn is_builtin(cmd: Option<&str>) -> bool {
    matches!(cmd, Some("exit" | "cd"))
}

/// Run a built-in inside the interpreter. Redirections and `&` have no
/// effect on built-ins, so only the argument vector is taken.
pub fn execute_builtin(params: &mut Parameters, args: &[String]) -> BuiltinOutcome {
    let operands = args.get(1..).unwrap_or_default();
    match args.first().map(String::as_str) {
        Some("cd") => {
            change_directory(params, operands);
            BuiltinOutcome::Continue
        }
        Some("exit") => exit_status(params, operands),
        _ => BuiltinOutcome::Continue,
    }
}

fn change_directory(params: &mut Parameters, operands: &[String]) {
    let target = match operands {
        [] => match env::var_os("HOME") {
            Some(home) => PathBuf::from(home),
            None => {
                eprintln!("cd: HOME not set");
                params.set_last_status(1);
                return;
            }
        },
        [dir] => PathBuf::from(dir),
        _ => {
            eprintln!("cd: too many arguments");
            params.set_last_status(1);
            return;
        }
    };
    if let Err(err) = env::set_current_dir(&target) {
        eprintln!("cd: {}: {err}", target.display());
        params.set_last_status(1);
    }
}

fn exit_status(params: &mut Parameters, operands: &[String]) -> BuiltinOutcome {
    match operands {
        [] => BuiltinOutcome::Exit(params.last_status()),
        [code] => match parse_exit_code(code) {
            Some(code) => BuiltinOutcome::Exit(code),
            None => {
                eprintln!("exit: {code}: integer argument required");
                params.set_last_status(1);
                BuiltinOutcome::Continue
            }
        },
        _ => {
            eprintln!("exit: too many arguments");
            params.set_last_status(1);
            BuiltinOutcome::Continue
        }
    }
}

/// Integer with optional sign, in decimal, `0x` hex or leading-zero octal.
fn parse_exit_code(text: &str) -> Option<i32> {
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (digits, radix) = if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        (hex, 16)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (&unsigned[1..], 8)
    } else {
        (unsigned, 10)
    };
    // from_str_radix would accept a second sign.
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).ok()
}
