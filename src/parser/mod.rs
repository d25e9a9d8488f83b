//! Directive grammar validation using pest
//!
//! Each script line is trimmed and classified on its own; a malformed line
//! never prevents the following lines from being classified.

use crate::ast::{Directive, Environment, LineKind, ScriptLine};
use pest::Parser;
use pest::error::{Error as PestError, ErrorVariant};
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct DirectiveParser;

/// Parse a single trimmed line of the form `KEYWORD >> "command"`.
///
/// The command body runs from the first quote after `>>` to the last quote on
/// the line, so embedded quotes survive verbatim.
///
/// # Errors
///
/// Returns `Err` if the line does not match the directive grammar:
/// - unrecognised keyword
/// - missing `>>`
/// - missing opening or closing quote
pub fn parse_directive(line: &str) -> Result<Directive, Box<PestError<Rule>>> {
    let directive = DirectiveParser::parse(Rule::directive, line)?
        .next()
        .ok_or_else(|| custom_error(line, "empty parse result"))?;

    let mut environment = None;
    let mut raw_command = String::new();
    for pair in directive.into_inner() {
        match pair.as_rule() {
            Rule::keyword => environment = Environment::from_keyword(pair.as_str()),
            Rule::body => raw_command = pair.as_str().to_string(),
            _ => {}
        }
    }

    let environment = environment.ok_or_else(|| custom_error(line, "unknown environment"))?;
    Ok(Directive {
        environment,
        raw_command,
    })
}

fn custom_error(line: &str, message: &str) -> Box<PestError<Rule>> {
    Box::new(PestError::new_from_pos(
        ErrorVariant::CustomError {
            message: message.to_string(),
        },
        pest::Position::from_start(line),
    ))
}

/// Classify one raw script line. `number` is 1-based.
#[must_use]
pub fn classify_line(number: usize, raw: &str) -> ScriptLine<'_> {
    let text = raw.trim();
    let kind = if text.is_empty() {
        LineKind::Blank
    } else if text.starts_with('#') {
        LineKind::Comment
    } else {
        match parse_directive(text) {
            Ok(directive) => LineKind::Directive(directive),
            Err(_) => LineKind::Malformed,
        }
    };
    ScriptLine { number, text, kind }
}

/// Classify every line of a script in order.
pub fn classify_script(script: &str) -> impl Iterator<Item = ScriptLine<'_>> {
    split_lines(script)
        .enumerate()
        .map(|(index, line)| classify_line(index + 1, line))
}

/// Split on `\n`, `\r\n`, or a lone `\r`; a final terminator does not start
/// an extra line.
fn split_lines(script: &str) -> impl Iterator<Item = &str> {
    let body = script
        .strip_suffix("\r\n")
        .or_else(|| script.strip_suffix(['\n', '\r']))
        .unwrap_or(script);
    (!script.is_empty())
        .then_some(body)
        .into_iter()
        .flat_map(|body| body.split('\n'))
        .flat_map(|line| line.strip_suffix('\r').unwrap_or(line).split('\r'))
}
