use tracing::{debug, trace};

use super::{block_bounds, split_at_keyword, strip_keyword};
use crate::{
    error::ParseErrorKind,
    model::{Rpc, Service},
};

pub(super) fn parse_services(lines: &[&str]) -> Result<Vec<Service>, ParseErrorKind> {
    trace!(?lines, "processing service lines");

    if lines.is_empty() {
        return Ok(Vec::new());
    }

    let line = lines.join(" ");
    let services = split_at_keyword(&line, "service")
        .into_iter()
        .map(parse_service)
        .collect::<Result<Vec<_>, _>>()?;

    debug!(services = services.len(), "parsed services");
    Ok(services)
}

fn parse_service(block: &str) -> Result<Service, ParseErrorKind> {
    if block.ends_with(';') {
        return Err(ParseErrorKind::ExtraSemicolon {
            statement: "service",
            fragment: block.to_owned(),
        });
    }

    let (open, close) = block_bounds("service", block)?;

    let name = strip_keyword(block[..open].trim(), "service").trim();
    if name.is_empty() {
        return Err(ParseErrorKind::MissingName {
            item: "service name",
            fragment: block.to_owned(),
        });
    }
    if name.contains(char::is_whitespace) {
        return Err(ParseErrorKind::InvalidName {
            item: "service name",
            name: name.to_owned(),
            fragment: block.to_owned(),
        });
    }

    let body = block[open + 1..close].trim().replace('\n', " ");
    let rpcs = split_at_keyword(&body, "rpc")
        .into_iter()
        .map(parse_rpc)
        .collect::<Result<Vec<_>, _>>()?;

    if rpcs.is_empty() {
        return Err(ParseErrorKind::NoRpc {
            fragment: block.to_owned(),
        });
    }

    trace!(service = name, rpcs = rpcs.len(), "parsed service");
    Ok(Service::new(name, rpcs))
}

fn parse_rpc(fragment: &str) -> Result<Rpc, ParseErrorKind> {
    if !fragment.ends_with(';') {
        return Err(ParseErrorKind::MissingSemicolon {
            statement: "rpc",
            fragment: fragment.to_owned(),
        });
    }

    // The body of an rpc holds only options, which are not retained.
    let declaration = match fragment.find('{') {
        Some(_) if !fragment.contains('}') => {
            return Err(ParseErrorKind::UnbalancedBraces {
                statement: "rpc",
                fragment: fragment.to_owned(),
            })
        }
        Some(open) => &fragment[..open],
        None => fragment,
    };
    let declaration = strip_keyword(declaration.trim(), "rpc").replace(';', "");
    let declaration = declaration.trim();

    if declaration.is_empty() {
        return Err(ParseErrorKind::MissingName {
            item: "rpc declaration",
            fragment: fragment.to_owned(),
        });
    }

    let (open, close) = match (declaration.find('('), declaration.find(')')) {
        (Some(open), Some(close)) if open < close => (open, close),
        _ => {
            return Err(ParseErrorKind::MissingParenthesis {
                fragment: fragment.to_owned(),
            })
        }
    };

    let name = declaration[..open].trim();
    if name.is_empty() {
        return Err(ParseErrorKind::MissingName {
            item: "rpc name",
            fragment: fragment.to_owned(),
        });
    }
    if name.contains(char::is_whitespace) {
        return Err(ParseErrorKind::InvalidName {
            item: "rpc name",
            name: name.to_owned(),
            fragment: fragment.to_owned(),
        });
    }

    let request = declaration[open + 1..close].trim();
    if request.is_empty() {
        return Err(ParseErrorKind::MissingName {
            item: "rpc request type",
            fragment: fragment.to_owned(),
        });
    }

    let returns = declaration[close..]
        .find("returns")
        .map(|index| &declaration[close + index..])
        .ok_or_else(|| ParseErrorKind::MissingReturns {
            fragment: fragment.to_owned(),
        })?;

    let response = match returns.find('(') {
        Some(open) => {
            let close = returns[open..]
                .find(')')
                .ok_or_else(|| ParseErrorKind::MissingParenthesis {
                    fragment: fragment.to_owned(),
                })?;
            returns[open + 1..open + close].trim()
        }
        None => returns.split_whitespace().nth(1).unwrap_or_default(),
    };
    if response.is_empty() {
        return Err(ParseErrorKind::MissingName {
            item: "rpc response type",
            fragment: fragment.to_owned(),
        });
    }

    Ok(Rpc::new(name, request, response))
}
