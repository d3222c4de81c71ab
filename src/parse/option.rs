use indexmap::IndexMap;
use tracing::{debug, trace};

use super::{check_quotes, keyword_indices, strip_quotes};
use crate::error::ParseErrorKind;

const TERMINATOR: &str = ";\n";

pub(super) fn parse_options(lines: &[&str]) -> Result<IndexMap<String, String>, ParseErrorKind> {
    trace!(?lines, "processing option lines");

    let mut options = IndexMap::new();
    if lines.is_empty() {
        return Ok(options);
    }

    // Statements end in ';' at the end of a line, so a ';' inside a quoted value survives.
    let text: String = lines.iter().flat_map(|line| [*line, "\n"]).collect();

    let option_count = keyword_indices(&text, "option").count();
    let terminator_count = text.matches(TERMINATOR).count();
    if option_count > terminator_count {
        return Err(ParseErrorKind::MissingSemicolon {
            statement: "option",
            fragment: text.trim().to_owned(),
        });
    }
    if option_count < terminator_count {
        return Err(ParseErrorKind::ExtraSemicolon {
            statement: "option",
            fragment: text.trim().to_owned(),
        });
    }

    for statement in text.split(TERMINATOR).map(str::trim) {
        if statement.is_empty() {
            continue;
        }

        check_quotes("option", statement)?;

        let tokens: Vec<&str> = statement.split_whitespace().collect();
        let [_, key, equals, value] = tokens[..] else {
            return Err(ParseErrorKind::InvalidTokenCount {
                statement: "option",
                expected: 4,
                found: tokens.len(),
                fragment: statement.to_owned(),
            });
        };

        if equals != "=" {
            return Err(ParseErrorKind::MissingEquals {
                statement: "option",
                fragment: statement.to_owned(),
            });
        }

        if key.contains(['"', '\'']) {
            return Err(ParseErrorKind::UnexpectedQuote {
                item: "option name",
                fragment: statement.to_owned(),
            });
        }

        let value = strip_quotes(value);
        if value.is_empty() {
            return Err(ParseErrorKind::MissingName {
                item: "option value",
                fragment: statement.to_owned(),
            });
        }

        options.insert(key.to_owned(), value);
    }

    debug!(?options, "parsed options");
    Ok(options)
}
