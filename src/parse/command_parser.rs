use crate::error::ShellResult;
use crate::parse::redirection_parser::apply_redirection;
use crate::parse::{ParsedCommand, RedirectKind};

/// Split expanded words into argv, redirections and the background flag.
///
/// Redirections are removed first and the `&` check only looks at what is
/// left, so both `cmd > out &` and `cmd & > out` run in the background. An
/// `&` followed by another argument stays in argv.
pub fn parse_command(words: Vec<String>) -> ShellResult<ParsedCommand> {
    let mut current = ParsedCommand::new();
    let mut iter = words.into_iter();

    while let Some(word) = iter.next() {
        if let Some(kind) = RedirectKind::from_operator(&word) {
            apply_redirection(&mut current, kind, &mut iter)?;
            continue;
        }
        current.args.push(word);
    }

    current.background = current.args.last().is_some_and(|last| last == "&");
    if current.background {
        current.args.pop();
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parse::{split_words, Redirection, MAX_WORDS};

    fn parse(line: &str) -> ShellResult<ParsedCommand> {
        parse_command(split_words(line, MAX_WORDS).unwrap())
    }

    #[test]
    fn plain_command() {
        let cmd = parse("ls -l /").unwrap();
        assert_eq!(cmd.args, vec!["ls", "-l", "/"]);
        assert!(cmd.redirections.is_empty());
        assert!(!cmd.background);
    }

    #[test]
    fn redirects_are_stripped_in_order() {
        let cmd = parse("sort < in > out >> log -r").unwrap();
        assert_eq!(cmd.args, vec!["sort", "-r"]);
        assert_eq!(
            cmd.redirections,
            vec![
                Redirection {
                    kind: RedirectKind::Input,
                    path: "in".to_string()
                },
                Redirection {
                    kind: RedirectKind::OutputTruncate,
                    path: "out".to_string()
                },
                Redirection {
                    kind: RedirectKind::OutputAppend,
                    path: "log".to_string()
                },
            ]
        );
    }

    #[test]
    fn trailing_ampersand_sets_background() {
        let cmd = parse("sleep 5 &").unwrap();
        assert!(cmd.background);
        assert_eq!(cmd.args, vec!["sleep", "5"]);

        let cmd = parse("cmd > file &").unwrap();
        assert!(cmd.background);
        assert_eq!(cmd.args, vec!["cmd"]);
        assert_eq!(cmd.redirections[0].path, "file");
    }

    #[test]
    fn ampersand_before_redirection_still_backgrounds() {
        let cmd = parse("cmd & > file").unwrap();
        assert!(cmd.background);
        assert_eq!(cmd.args, vec!["cmd"]);
    }

    #[test]
    fn ampersand_followed_by_argument_is_literal() {
        let cmd = parse("echo & done").unwrap();
        assert!(!cmd.background);
        assert_eq!(cmd.args, vec!["echo", "&", "done"]);
    }

    #[test]
    fn glued_ampersand_is_not_background() {
        let cmd = parse("sleep 5&").unwrap();
        assert!(!cmd.background);
        assert_eq!(cmd.args, vec!["sleep", "5&"]);
    }

    #[test]
    fn redirection_target_may_look_like_operator() {
        let cmd = parse("echo > >").unwrap();
        assert_eq!(cmd.args, vec!["echo"]);
        assert_eq!(cmd.redirections[0].path, ">");
    }

    #[test]
    fn operator_without_target_is_error() {
        let err = parse("cat <").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        let err = parse("echo hi >>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
    }

    #[test]
    fn only_ampersand_leaves_empty_argv() {
        let cmd = parse("&").unwrap();
        assert!(cmd.background);
        assert!(cmd.args.is_empty());

        let cmd = parse("> out").unwrap();
        assert!(cmd.args.is_empty());
        assert_eq!(cmd.redirections.len(), 1);
    }
}
