use std::mem;

use indexmap::IndexMap;
use tracing::{debug, trace};

use super::{block_bounds, keyword_indices, strip_keyword};
use crate::{
    error::ParseErrorKind,
    model::{FieldDescriptor, FieldValue, Message, Qualifier},
};

const MESSAGE: &str = "message";

pub(super) fn parse_messages(lines: &[&str]) -> Result<Vec<Message>, ParseErrorKind> {
    trace!(?lines, "processing message lines");

    if lines.is_empty() {
        return Ok(Vec::new());
    }

    let text = lines.join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let messages = split_messages(&text)
        .iter()
        .map(|block| parse_message(block))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(messages = messages.len(), "parsed messages");
    Ok(messages)
}

/// Splits whitespace-normalized text into top-level `message` blocks.
///
/// The text is first cut before every `message` token, then adjacent pieces are joined back
/// together until each block ends with a `}` that closes all of its braces, reassembling
/// messages with nested messages inside.
fn split_messages(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for token in text.split(' ') {
        if token == MESSAGE && !current.is_empty() {
            pieces.push(current.join(" "));
            current.clear();
        }
        current.push(token);
    }
    if !current.is_empty() {
        pieces.push(current.join(" "));
    }

    let mut blocks = Vec::new();
    let mut block = String::new();
    for piece in pieces {
        if !block.is_empty() {
            block.push(' ');
        }
        block.push_str(&piece);

        if block.ends_with('}') && block.matches('{').count() == block.matches('}').count() {
            blocks.push(mem::take(&mut block));
        }
    }
    if !block.is_empty() {
        blocks.push(block);
    }

    blocks
}

fn parse_message(content: &str) -> Result<Message, ParseErrorKind> {
    let (open, close) = block_bounds("message", content)?;

    if content.ends_with(';') {
        return Err(ParseErrorKind::ExtraSemicolon {
            statement: "message",
            fragment: content.to_owned(),
        });
    }

    let name = match content[..open].split_whitespace().collect::<Vec<_>>()[..] {
        [MESSAGE, name] => name,
        [] | [MESSAGE] => {
            return Err(ParseErrorKind::MissingName {
                item: "message name",
                fragment: content.to_owned(),
            })
        }
        _ => {
            return Err(ParseErrorKind::InvalidName {
                item: "message name",
                name: strip_keyword(content[..open].trim(), MESSAGE)
                    .trim()
                    .to_owned(),
                fragment: content.to_owned(),
            })
        }
    };

    let body = &content[open + 1..close];
    if body.trim().is_empty() {
        return Err(ParseErrorKind::EmptyMessage {
            fragment: content.to_owned(),
        });
    }

    let mut message = Message::new(name);
    let mut pending = String::new();
    for statement in body.split(';').map(str::trim) {
        if statement.is_empty() {
            continue;
        }

        // Only an unterminated nested message is ever left pending, and the ';' separating its
        // statements must be put back before it is parsed.
        if !pending.is_empty() {
            pending.push(';');
        }
        pending.push_str(statement);

        parse_body(&mut pending, &mut message.fields)?;
    }

    if !pending.is_empty() {
        return Err(ParseErrorKind::UnbalancedBraces {
            statement: "nested message",
            fragment: pending,
        });
    }

    trace!(message = name, fields = message.fields.len(), "parsed message");
    Ok(message)
}

/// Consumes as much of `pending` as possible, adding fields and complete nested messages to
/// `fields`. A nested message whose closing brace has not been seen yet is left in `pending`.
fn parse_body(
    pending: &mut String,
    fields: &mut IndexMap<String, FieldValue>,
) -> Result<(), ParseErrorKind> {
    loop {
        let Some(start) = nested_message_start(pending) else {
            fields.extend(parse_fields(pending)?);
            pending.clear();
            return Ok(());
        };

        let Some(end) = matching_brace(&pending[start..]).map(|len| start + len) else {
            return Ok(());
        };

        fields.extend(parse_fields(&pending[..start])?);
        let nested = parse_message(&pending[start..=end])?;
        fields.insert(nested.name.clone(), FieldValue::Message(nested));

        *pending = pending[end + 1..].trim().to_owned();
        if pending.is_empty() {
            return Ok(());
        }
    }
}

/// Finds a `message` keyword introducing a nested message, i.e. followed by at most one name
/// and then `{`. A field that happens to be called `message` is not matched.
fn nested_message_start(text: &str) -> Option<usize> {
    keyword_indices(text, MESSAGE).find(|&index| {
        let rest = text[index + MESSAGE.len()..].trim_start();
        let rest = rest
            .trim_start_matches(|ch: char| !ch.is_whitespace() && ch != '{')
            .trim_start();
        rest.starts_with('{')
    })
}

/// The offset of the `}` closing the first `{` in `text`.
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (index, ch) in text.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' if depth == 0 => return None,
            '}' if depth == 1 => return Some(index),
            '}' => depth -= 1,
            _ => (),
        }
    }
    None
}

fn parse_fields(content: &str) -> Result<Vec<(String, FieldValue)>, ParseErrorKind> {
    let mut fields = Vec::new();

    for statement in content.split(';').map(str::trim) {
        if statement.is_empty() {
            continue;
        }

        if statement.contains(['{', '}']) {
            return Err(ParseErrorKind::UnbalancedBraces {
                statement: "field",
                fragment: statement.to_owned(),
            });
        }

        let (declaration, _) =
            statement
                .split_once('=')
                .ok_or_else(|| ParseErrorKind::MissingEquals {
                    statement: "field",
                    fragment: statement.to_owned(),
                })?;

        let tokens: Vec<&str> = declaration.split_whitespace().collect();
        let qualifier = tokens.first().copied().and_then(Qualifier::from_keyword);
        let tokens = if qualifier.is_some() {
            &tokens[1..]
        } else {
            &tokens[..]
        };

        // Everything between the qualifier and the name is the type, e.g. `map<string, Foo>`.
        let (name, ty) = match tokens.split_last() {
            Some((name, ty)) if !ty.is_empty() => (*name, ty.join(" ")),
            _ => {
                return Err(ParseErrorKind::InvalidField {
                    fragment: statement.to_owned(),
                })
            }
        };

        fields.push((
            name.to_owned(),
            FieldValue::Scalar(FieldDescriptor::new(ty, qualifier)),
        ));
    }

    Ok(fields)
}

#[test]
fn split_messages_reassembles_nested_blocks() {
    let text = "message A { message B { int32 x = 1; } message C { int32 y = 2; } } \
        message D { string d = 1; }";
    assert_eq!(
        split_messages(text),
        vec![
            "message A { message B { int32 x = 1; } message C { int32 y = 2; } }",
            "message D { string d = 1; }",
        ]
    );
}

#[test]
fn matching_brace_skips_inner_blocks() {
    assert_eq!(matching_brace("message A { message B { } }"), Some(26));
    assert_eq!(matching_brace("message A { message B { }"), None);
    assert_eq!(matching_brace("} message A {"), None);
}

#[test]
fn nested_message_start_ignores_fields_named_message() {
    assert_eq!(nested_message_start("string message = 1"), None);
    assert_eq!(nested_message_start("string message_id = 1"), None);
    assert_eq!(nested_message_start("int32 a = 1 message B {"), Some(12));
    assert_eq!(nested_message_start("message {"), Some(0));
}
