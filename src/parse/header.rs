use tracing::{debug, trace};

use super::strip_keyword;
use crate::error::ParseErrorKind;

const PROTO3: &str = "proto3";

pub(super) fn parse_syntax(lines: &[&str]) -> Result<String, ParseErrorKind> {
    trace!(?lines, "processing syntax lines");

    let line = match lines {
        [] => return Err(ParseErrorKind::MissingSyntax),
        [line] => *line,
        [_, second, ..] => {
            return Err(ParseErrorKind::MultipleSyntax {
                fragment: second.to_string(),
            })
        }
    };

    let value = line
        .split('=')
        .nth(1)
        .ok_or_else(|| ParseErrorKind::MissingEquals {
            statement: "syntax",
            fragment: line.to_owned(),
        })?;

    let (value, _) = value
        .split_once(';')
        .ok_or_else(|| ParseErrorKind::MissingSemicolon {
            statement: "syntax",
            fragment: line.to_owned(),
        })?;

    let syntax = super::strip_quotes(value).trim().to_owned();
    if syntax != PROTO3 {
        return Err(ParseErrorKind::UnsupportedSyntax {
            syntax,
            fragment: line.to_owned(),
        });
    }

    debug!(%syntax, "parsed syntax");
    Ok(syntax)
}

pub(super) fn parse_package(lines: &[&str]) -> Result<String, ParseErrorKind> {
    trace!(?lines, "processing package lines");

    match lines {
        [] => return Err(ParseErrorKind::MissingPackage),
        [_] => (),
        [_, second, ..] => {
            return Err(ParseErrorKind::MultiplePackage {
                fragment: second.to_string(),
            })
        }
    }

    let line = lines.join(" ");
    if !line.contains(';') {
        return Err(ParseErrorKind::MissingSemicolon {
            statement: "package",
            fragment: line,
        });
    }

    if line.contains(['"', '\'']) {
        return Err(ParseErrorKind::UnexpectedQuote {
            item: "package name",
            fragment: line,
        });
    }

    let name = strip_keyword(&line, "package").replace(';', "");
    let name = name.trim();
    if name.is_empty() {
        return Err(ParseErrorKind::MissingName {
            item: "package name",
            fragment: line,
        });
    }
    if name.contains(char::is_whitespace) {
        return Err(ParseErrorKind::InvalidName {
            item: "package name",
            name: name.to_owned(),
            fragment: line,
        });
    }

    debug!(package = name, "parsed package");
    Ok(name.to_owned())
}
