use std::{iter::once, path::Path};

use indexmap::IndexMap;
use tracing::{debug, debug_span};

mod header;
mod import;
mod message;
mod option;
mod service;

use crate::{
    error::{ParseError, ParseErrorKind},
    file::read_source,
    lines::Sections,
    model::{Message, Model, Service},
    Error,
};

/// A proto3 parser holding the most recently parsed file.
///
/// # Examples
///
/// ```
/// # use proto3_lines::Parser;
/// let mut parser = Parser::new();
/// parser.parse("
///     syntax = \"proto3\";
///     package sample;
///
///     service Greeter {
///         rpc SayHello(HelloRequest) returns (HelloReply);
///     }
/// ").unwrap();
///
/// assert_eq!(parser.package_name(), "sample");
/// assert_eq!(parser.services()[0].rpcs()[0].response(), "HelloReply");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Parser {
    model: Model,
}

impl Parser {
    /// Creates a parser with an empty model.
    pub fn new() -> Self {
        Parser::default()
    }

    /// Parses `source`, replacing any previously parsed model.
    ///
    /// # Errors
    ///
    /// Returns the first problem found. Sections are processed in the order syntax, package,
    /// import, option, service, message; sections before the failing one remain populated but
    /// should not be relied upon.
    pub fn parse(&mut self, source: &str) -> Result<(), ParseError> {
        self.parse_named("", source)
    }

    /// Reads the file at `path` and parses its contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is larger than
    /// [`MAX_FILE_LEN`](crate::file::MAX_FILE_LEN), is not valid UTF-8, or does not parse.
    pub fn read_file(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let source = read_source(path)?;
        self.parse_named(&path.display().to_string(), &source)?;
        Ok(())
    }

    pub(crate) fn parse_named(&mut self, name: &str, source: &str) -> Result<(), ParseError> {
        self.model = Model::default();
        parse_into(&mut self.model, source).map_err(|kind| {
            debug!(file = name, error = %kind, "failed to parse");
            ParseError::new(kind, name, source)
        })
    }

    /// The parsed model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Consumes the parser, returning the parsed model.
    pub fn into_model(self) -> Model {
        self.model
    }

    /// See [`Model::syntax()`].
    pub fn syntax(&self) -> &str {
        self.model.syntax()
    }

    /// See [`Model::package_name()`].
    pub fn package_name(&self) -> &str {
        self.model.package_name()
    }

    /// See [`Model::options()`].
    pub fn options(&self) -> &IndexMap<String, String> {
        self.model.options()
    }

    /// See [`Model::imports()`].
    pub fn imports(&self) -> &[String] {
        self.model.imports()
    }

    /// See [`Model::services()`].
    pub fn services(&self) -> &[Service] {
        self.model.services()
    }

    /// See [`Model::messages()`].
    pub fn messages(&self) -> &[Message] {
        self.model.messages()
    }
}

pub(crate) fn parse_named(name: &str, source: &str) -> Result<Model, ParseError> {
    let mut parser = Parser::new();
    parser.parse_named(name, source)?;
    Ok(parser.into_model())
}

fn parse_into(model: &mut Model, source: &str) -> Result<(), ParseErrorKind> {
    let _span = debug_span!("parse", len = source.len()).entered();

    let sections = Sections::classify(source);

    model.syntax = header::parse_syntax(&sections.syntax)?;
    model.package = header::parse_package(&sections.package)?;
    model.imports = import::parse_imports(&sections.import)?;
    model.options = option::parse_options(&sections.option)?;
    model.services = service::parse_services(&sections.service)?;
    model.messages = message::parse_messages(&sections.message)?;

    debug!(
        package = %model.package,
        imports = model.imports.len(),
        options = model.options.len(),
        services = model.services.len(),
        messages = model.messages.len(),
        "parsed file"
    );
    Ok(())
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '.' | '/' | '-')
}

/// Byte offsets of each occurrence of `keyword` in `text` that is not part of a longer word.
pub(crate) fn keyword_indices<'a>(
    text: &'a str,
    keyword: &'a str,
) -> impl Iterator<Item = usize> + 'a {
    text.match_indices(keyword)
        .map(|(index, _)| index)
        .filter(move |&index| {
            let before = text[..index].chars().next_back();
            let after = text[index + keyword.len()..].chars().next();
            !before.map_or(false, is_word_char) && !after.map_or(false, is_word_char)
        })
}

/// Splits `text` before each occurrence of `keyword`, trimming the pieces and dropping empty
/// ones. Any text before the first occurrence forms a piece of its own.
pub(crate) fn split_at_keyword<'a>(text: &'a str, keyword: &str) -> Vec<&'a str> {
    let mut starts: Vec<usize> = keyword_indices(text, keyword).collect();
    if starts.first() != Some(&0) {
        starts.insert(0, 0);
    }

    let ends = starts.iter().skip(1).copied().chain(once(text.len()));
    starts
        .iter()
        .zip(ends)
        .map(|(&start, end)| text[start..end].trim())
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Removes a leading `keyword` from `text`, if present.
pub(crate) fn strip_keyword<'a>(text: &'a str, keyword: &str) -> &'a str {
    match text.strip_prefix(keyword) {
        Some(rest) if !rest.starts_with(is_word_char) => rest,
        _ => text,
    }
}

/// Finds the first `{` and the last `}` of a block, requiring the braces in between to balance.
pub(crate) fn block_bounds(
    statement: &'static str,
    block: &str,
) -> Result<(usize, usize), ParseErrorKind> {
    if block.matches('{').count() != block.matches('}').count() {
        return Err(ParseErrorKind::UnbalancedBraces {
            statement,
            fragment: block.to_owned(),
        });
    }

    match (block.find('{'), block.rfind('}')) {
        (Some(open), Some(close)) if open < close => Ok((open, close)),
        (Some(_), Some(_)) => Err(ParseErrorKind::UnbalancedBraces {
            statement,
            fragment: block.to_owned(),
        }),
        _ => Err(ParseErrorKind::MissingBlock {
            statement,
            fragment: block.to_owned(),
        }),
    }
}

/// Counts the single and double quotes in an import or option statement, checking that at
/// least one kind is present, both are balanced and the statement ends with a closing quote.
pub(crate) fn check_quotes(statement: &'static str, text: &str) -> Result<(), ParseErrorKind> {
    let double = text.matches('"').count();
    let single = text.matches('\'').count();

    if double == 0 && single == 0 {
        return Err(ParseErrorKind::MissingQuote {
            statement,
            fragment: text.to_owned(),
        });
    }

    if double % 2 == 1 || single % 2 == 1 {
        return Err(ParseErrorKind::UnbalancedQuotes {
            statement,
            fragment: text.to_owned(),
        });
    }

    let last = text.len() - 1;
    if (double > 0 && text.rfind('"') != Some(last))
        || (single > 0 && text.rfind('\'') != Some(last))
    {
        return Err(ParseErrorKind::MisplacedQuote {
            statement,
            fragment: text.to_owned(),
        });
    }

    Ok(())
}

pub(crate) fn strip_quotes(text: &str) -> String {
    text.replace(['"', '\''], "")
}
