use tracing::{debug, trace};

use super::{check_quotes, keyword_indices, strip_quotes};
use crate::error::ParseErrorKind;

pub(super) fn parse_imports(lines: &[&str]) -> Result<Vec<String>, ParseErrorKind> {
    trace!(?lines, "processing import lines");

    if lines.is_empty() {
        return Ok(Vec::new());
    }

    let line = lines.join(" ");

    let import_count = keyword_indices(&line, "import").count();
    let semicolon_count = line.matches(';').count();
    if import_count > semicolon_count {
        return Err(ParseErrorKind::MissingSemicolon {
            statement: "import",
            fragment: line,
        });
    }
    if import_count < semicolon_count {
        return Err(ParseErrorKind::ExtraSemicolon {
            statement: "import",
            fragment: line,
        });
    }

    let mut imports = Vec::new();
    for statement in line.split(';').map(str::trim) {
        if statement.is_empty() {
            continue;
        }

        check_quotes("import", statement)?;

        let mut tokens = statement.split_whitespace().skip(1).peekable();
        if let Some(&"public" | &"weak") = tokens.peek() {
            tokens.next();
        }

        let path = tokens.next().map(strip_quotes).unwrap_or_default();
        if path.is_empty() {
            return Err(ParseErrorKind::MissingName {
                item: "import path",
                fragment: statement.to_owned(),
            });
        }

        imports.push(path);
    }

    debug!(?imports, "parsed imports");
    Ok(imports)
}
