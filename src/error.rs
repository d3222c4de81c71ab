use std::{fmt, io, path::PathBuf};

use miette::{Diagnostic, NamedSource, SourceCode, SourceSpan};
use thiserror::Error;

/// An error that may occur while parsing a proto3 source file.
///
/// Parsing stops at the first problem found, so each error describes a single offending
/// statement. When that statement appears verbatim in the source, [`span()`](ParseError::span)
/// points at it.
#[derive(Error, Diagnostic)]
#[error("{}", kind)]
#[diagnostic(forward(kind))]
pub struct ParseError {
    kind: Box<ParseErrorKind>,
    file: String,
    #[label("found here")]
    span: Option<SourceSpan>,
    #[source_code]
    source_code: NamedSource,
}

/// The broad class of problem reported by a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// A declaration is missing or appears too many times.
    StructuralCount,
    /// A required `=`, `;`, `(`, `)` or `returns` is missing.
    PunctuationMissing,
    /// A semicolon appears where none is allowed.
    PunctuationExtraneous,
    /// Quotes are missing, unbalanced or misplaced.
    QuoteViolation,
    /// Braces are missing or unbalanced.
    BraceMismatch,
    /// A name is empty or contains whitespace.
    IdentifierInvalid,
    /// A statement has the wrong number of tokens.
    TokenCountMismatch,
    /// A service has no RPCs, or a message has an empty body.
    EmptyBody,
    /// The syntax declaration names something other than `proto3`.
    UnsupportedSyntax,
}

#[derive(Error, Debug, Diagnostic, PartialEq, Eq)]
pub(crate) enum ParseErrorKind {
    #[error("missing syntax declaration")]
    #[diagnostic(help("add 'syntax = \"proto3\";' to the file"))]
    MissingSyntax,
    #[error("multiple syntax declarations: '{fragment}'")]
    MultipleSyntax { fragment: String },
    #[error("unsupported syntax '{syntax}': '{fragment}'")]
    #[diagnostic(help("only 'proto3' is supported"))]
    UnsupportedSyntax { syntax: String, fragment: String },
    #[error("missing package declaration")]
    MissingPackage,
    #[error("multiple package declarations: '{fragment}'")]
    MultiplePackage { fragment: String },
    #[error("{statement} statement is missing '=': '{fragment}'")]
    MissingEquals {
        statement: &'static str,
        fragment: String,
    },
    #[error("{statement} statement is missing ';': '{fragment}'")]
    MissingSemicolon {
        statement: &'static str,
        fragment: String,
    },
    #[error("unexpected ';' in {statement} statement: '{fragment}'")]
    ExtraSemicolon {
        statement: &'static str,
        fragment: String,
    },
    #[error("rpc is missing '(' or ')': '{fragment}'")]
    MissingParenthesis { fragment: String },
    #[error("rpc is missing 'returns': '{fragment}'")]
    MissingReturns { fragment: String },
    #[error("missing quote in {statement} statement: '{fragment}'")]
    MissingQuote {
        statement: &'static str,
        fragment: String,
    },
    #[error("mismatched quotes in {statement} statement: '{fragment}'")]
    UnbalancedQuotes {
        statement: &'static str,
        fragment: String,
    },
    #[error("{statement} statement must end with its closing quote: '{fragment}'")]
    MisplacedQuote {
        statement: &'static str,
        fragment: String,
    },
    #[error("{item} must not contain quotes: '{fragment}'")]
    UnexpectedQuote {
        item: &'static str,
        fragment: String,
    },
    #[error("cannot find {statement} block: '{fragment}'")]
    MissingBlock {
        statement: &'static str,
        fragment: String,
    },
    #[error("unbalanced braces in {statement}: '{fragment}'")]
    UnbalancedBraces {
        statement: &'static str,
        fragment: String,
    },
    #[error("missing {item}: '{fragment}'")]
    MissingName {
        item: &'static str,
        fragment: String,
    },
    #[error("invalid {item} '{name}': '{fragment}'")]
    #[diagnostic(help("names must not contain whitespace"))]
    InvalidName {
        item: &'static str,
        name: String,
        fragment: String,
    },
    #[error("expected {expected} tokens in {statement} statement, but found {found}: '{fragment}'")]
    InvalidTokenCount {
        statement: &'static str,
        expected: usize,
        found: usize,
        fragment: String,
    },
    #[error("expected a type and a name before '=' in field: '{fragment}'")]
    InvalidField { fragment: String },
    #[error("no rpc has been found in service: '{fragment}'")]
    NoRpc { fragment: String },
    #[error("empty message body: '{fragment}'")]
    EmptyMessage { fragment: String },
}

impl ParseErrorKind {
    fn fragment(&self) -> Option<&str> {
        match self {
            ParseErrorKind::MissingSyntax | ParseErrorKind::MissingPackage => None,
            ParseErrorKind::MultipleSyntax { fragment }
            | ParseErrorKind::UnsupportedSyntax { fragment, .. }
            | ParseErrorKind::MultiplePackage { fragment }
            | ParseErrorKind::MissingEquals { fragment, .. }
            | ParseErrorKind::MissingSemicolon { fragment, .. }
            | ParseErrorKind::ExtraSemicolon { fragment, .. }
            | ParseErrorKind::MissingParenthesis { fragment }
            | ParseErrorKind::MissingReturns { fragment }
            | ParseErrorKind::MissingQuote { fragment, .. }
            | ParseErrorKind::UnbalancedQuotes { fragment, .. }
            | ParseErrorKind::MisplacedQuote { fragment, .. }
            | ParseErrorKind::UnexpectedQuote { fragment, .. }
            | ParseErrorKind::MissingBlock { fragment, .. }
            | ParseErrorKind::UnbalancedBraces { fragment, .. }
            | ParseErrorKind::MissingName { fragment, .. }
            | ParseErrorKind::InvalidName { fragment, .. }
            | ParseErrorKind::InvalidTokenCount { fragment, .. }
            | ParseErrorKind::InvalidField { fragment }
            | ParseErrorKind::NoRpc { fragment }
            | ParseErrorKind::EmptyMessage { fragment } => Some(fragment),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            ParseErrorKind::MissingSyntax
            | ParseErrorKind::MultipleSyntax { .. }
            | ParseErrorKind::MissingPackage
            | ParseErrorKind::MultiplePackage { .. } => ErrorCategory::StructuralCount,
            ParseErrorKind::UnsupportedSyntax { .. } => ErrorCategory::UnsupportedSyntax,
            ParseErrorKind::MissingEquals { .. }
            | ParseErrorKind::MissingSemicolon { .. }
            | ParseErrorKind::MissingParenthesis { .. }
            | ParseErrorKind::MissingReturns { .. } => ErrorCategory::PunctuationMissing,
            ParseErrorKind::ExtraSemicolon { .. } => ErrorCategory::PunctuationExtraneous,
            ParseErrorKind::MissingQuote { .. }
            | ParseErrorKind::UnbalancedQuotes { .. }
            | ParseErrorKind::MisplacedQuote { .. }
            | ParseErrorKind::UnexpectedQuote { .. } => ErrorCategory::QuoteViolation,
            ParseErrorKind::MissingBlock { .. } | ParseErrorKind::UnbalancedBraces { .. } => {
                ErrorCategory::BraceMismatch
            }
            ParseErrorKind::MissingName { .. } | ParseErrorKind::InvalidName { .. } => {
                ErrorCategory::IdentifierInvalid
            }
            ParseErrorKind::InvalidTokenCount { .. } | ParseErrorKind::InvalidField { .. } => {
                ErrorCategory::TokenCountMismatch
            }
            ParseErrorKind::NoRpc { .. } | ParseErrorKind::EmptyMessage { .. } => {
                ErrorCategory::EmptyBody
            }
        }
    }
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, file: &str, source: &str) -> Self {
        let span = kind
            .fragment()
            .filter(|fragment| !fragment.is_empty())
            .and_then(|fragment| {
                source
                    .find(fragment)
                    .map(|offset| SourceSpan::from((offset, fragment.len())))
            });

        ParseError {
            kind: Box::new(kind),
            file: file.to_owned(),
            span,
            source_code: NamedSource::new(file, source.to_owned()),
        }
    }

    #[cfg(test)]
    pub(crate) fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// The broad class of problem this error reports.
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// The name of the file in which this error occurred.
    ///
    /// This is empty when the source was parsed from a string.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The offending statement, as seen by the parser.
    ///
    /// Statements spanning several lines are reported with their lines joined, so the fragment
    /// may not occur verbatim in the source.
    pub fn fragment(&self) -> Option<&str> {
        self.kind.fragment()
    }

    /// The location of the offending statement in the source, if it could be found.
    pub fn span(&self) -> Option<SourceSpan> {
        self.span
    }
}

impl fmt::Debug for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(span) = &self.span {
            if let Ok(span_contents) = self.source_code.read_span(span, 0, 0) {
                if !self.file.is_empty() {
                    write!(f, "{}:", self.file)?;
                }

                write!(
                    f,
                    "{}:{}: ",
                    span_contents.line() + 1,
                    span_contents.column() + 1
                )?;
            }
        }

        write!(f, "{}", self)
    }
}

/// An error that can occur when reading and parsing a proto3 file.
#[derive(Diagnostic, Error)]
#[error(transparent)]
#[diagnostic(transparent)]
pub struct Error {
    kind: Box<ErrorKind>,
}

#[derive(Debug, Diagnostic, Error)]
pub(crate) enum ErrorKind {
    #[error("{}", err)]
    #[diagnostic(forward(err))]
    Parse { err: ParseError },
    #[error("error opening file '{path}'")]
    OpenFile {
        path: PathBuf,
        #[source]
        err: io::Error,
    },
    #[error("file '{path}' is too large")]
    #[diagnostic(help("the maximum file length is 2,147,483,647 bytes"))]
    FileTooLarge { path: PathBuf },
    #[error("file '{path}' is not valid utf-8")]
    FileInvalidUtf8 { path: PathBuf },
}

impl Error {
    pub(crate) fn from_kind(kind: ErrorKind) -> Self {
        Error {
            kind: Box::new(kind),
        }
    }

    /// The file in which this error occurred, if known.
    pub fn file(&self) -> Option<&str> {
        match &*self.kind {
            ErrorKind::Parse { err } if err.file().is_empty() => None,
            ErrorKind::Parse { err } => Some(err.file()),
            ErrorKind::OpenFile { path, .. }
            | ErrorKind::FileTooLarge { path }
            | ErrorKind::FileInvalidUtf8 { path } => path.to_str(),
        }
    }

    /// Returns the underlying parse error, if this error was caused by an invalid source file.
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match &*self.kind {
            ErrorKind::Parse { err } => Some(err),
            _ => None,
        }
    }

    /// Returns true if this error is caused by an invalid proto3 source file.
    pub fn is_parse(&self) -> bool {
        matches!(
            &*self.kind,
            ErrorKind::Parse { .. }
                | ErrorKind::FileTooLarge { .. }
                | ErrorKind::FileInvalidUtf8 { .. }
        )
    }

    /// Returns true if this error is caused by an IO error while opening a file.
    pub fn is_io(&self) -> bool {
        matches!(&*self.kind, ErrorKind::OpenFile { .. })
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::from_kind(ErrorKind::Parse { err })
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.kind {
            ErrorKind::Parse { err } => err.fmt(f),
            ErrorKind::OpenFile { err, .. } => write!(f, "{}: {}", self, err),
            ErrorKind::FileTooLarge { .. } | ErrorKind::FileInvalidUtf8 { .. } => {
                write!(f, "{}", self)
            }
        }
    }
}

#[test]
fn fmt_debug_io() {
    let err = Error::from_kind(ErrorKind::OpenFile {
        path: "path/to/file.proto".into(),
        err: io::Error::new(io::ErrorKind::Other, "io error"),
    });

    assert!(err.is_io());
    assert!(!err.is_parse());
    assert_eq!(err.file(), Some("path/to/file.proto"));
    assert_eq!(
        format!("{:?}", err),
        "error opening file 'path/to/file.proto': io error"
    );
}

#[test]
fn fmt_debug_parse() {
    let source = "syntax = \"proto3\";\npackage foo;\nimport foo.proto;\n";
    let err = Error::from(ParseError::new(
        ParseErrorKind::MissingQuote {
            statement: "import",
            fragment: "import foo.proto".to_owned(),
        },
        "file.proto",
        source,
    ));

    assert!(err.is_parse());
    assert_eq!(err.file(), Some("file.proto"));
    assert_eq!(
        format!("{:?}", err),
        "file.proto:3:1: missing quote in import statement: 'import foo.proto'"
    );
}

#[test]
fn span_is_absent_for_joined_fragments() {
    let err = ParseError::new(
        ParseErrorKind::MissingSemicolon {
            statement: "import",
            fragment: "import 'a.proto' import 'b.proto';".to_owned(),
        },
        "",
        "import 'a.proto'\nimport 'b.proto';\n",
    );

    assert_eq!(err.span(), None);
    assert_eq!(err.category(), ErrorCategory::PunctuationMissing);
    assert_eq!(
        format!("{:?}", err),
        "import statement is missing ';': 'import 'a.proto' import 'b.proto';'"
    );
}
