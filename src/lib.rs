//! A line-oriented parser for a restricted subset of the proto3 interface definition language.
//!
//! Source text is split into lines, each line is routed to a section by its leading keyword,
//! and each section is then processed in the order syntax, package, import, option, service,
//! message. The result is a [`Model`] holding the package name, imports, file options,
//! services with their RPC signatures and messages with their fields.
//!
//! For a one-shot parse, see [`parse()`]. To read a file from disk, see [`file::File`] or
//! [`Parser::read_file`].
//!
//! # Examples
//!
//! ```
//! use proto3_lines::{FieldValue, Qualifier};
//!
//! let model = proto3_lines::parse("
//!     syntax = \"proto3\";
//!     package sample;
//!     import \"other.proto\";
//!     option go_package = \"sample\";
//!
//!     message Outer {
//!         message Inner {
//!             int32 id = 1;
//!         }
//!         repeated Inner items = 1;
//!     }
//! ").unwrap();
//!
//! assert_eq!(model.package_name(), "sample");
//! assert_eq!(model.imports(), ["other.proto"]);
//! assert_eq!(model.options()["go_package"], "sample");
//!
//! let outer = model.message("Outer").unwrap();
//! assert!(matches!(outer.field("Inner"), Some(FieldValue::Message(_))));
//! let items = outer.field("items").and_then(FieldValue::as_scalar).unwrap();
//! assert_eq!(items.ty(), "Inner");
//! assert_eq!(items.qualifier(), Some(Qualifier::Repeated));
//! ```
//!
//! ### Error messages
//!
//! Errors implement [`miette::Diagnostic`]. When the offending statement can be found in the
//! source, it is labelled:
//!
//! ```text
//! Error:
//!   × missing quote in import statement: 'import foo.proto'
//!    ╭─[root.proto:3:1]
//!  2 │ package foo;
//!  3 │ import foo.proto;
//!    · ────────┬───────
//!    ·         ╰── found here
//!    ╰────
//! ```
#![warn(missing_debug_implementations, missing_docs)]
#![deny(unsafe_code)]

pub mod file;

mod error;
mod lines;
mod model;
mod parse;

pub use self::error::{Error, ErrorCategory, ParseError};
pub use self::model::{FieldDescriptor, FieldValue, Message, Model, Qualifier, Rpc, Service};
pub use self::parse::Parser;

/// Parses a proto3 source string.
///
/// This is equivalent to calling [`Parser::parse`] on a new parser and taking its model.
///
/// # Errors
///
/// Returns the first problem found in the source. See [`ErrorCategory`] for the kinds of
/// problem reported.
///
/// # Examples
///
/// ```
/// # use proto3_lines::ErrorCategory;
/// let err = proto3_lines::parse("package foo;").unwrap_err();
/// assert_eq!(err.to_string(), "missing syntax declaration");
/// assert_eq!(err.category(), ErrorCategory::StructuralCount);
/// ```
pub fn parse(source: &str) -> Result<Model, ParseError> {
    parse::parse_named("", source)
}
