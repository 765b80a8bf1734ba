//! Command template parsing.
//!
//! Rule commands and descriptions use ninja's variable syntax, since that is
//! the format edges are eventually rendered into.
//!
//! # Syntax
//!
//! - `$name` - variable reference (`[A-Za-z0-9_-]+`)
//! - `${name}` - variable reference, `.` is also allowed inside braces
//! - `$$` - a literal `$`
//! - `$ ` - a literal space
//! - `$:` - a literal colon
//! - `$` followed by a newline - line continuation, leading whitespace on the
//!   next line is dropped
//!
//! # Example
//!
//! ```
//! use lathe_lib::template::{parse, Segment};
//!
//! let segments = parse("$objcopy $options $in $out").unwrap();
//! assert_eq!(segments[0], Segment::Variable("objcopy".to_string()));
//! ```

use std::collections::BTreeSet;

use thiserror::Error;

/// A segment of parsed template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  /// Literal text, escapes already resolved.
  Literal(String),

  /// A variable to be bound at edge level.
  Variable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
  #[error("dangling '$' at end of template")]
  Dangling,

  #[error("unclosed '${{' at position {0}")]
  Unclosed(usize),

  #[error("empty variable name at position {0}")]
  EmptyName(usize),

  #[error("invalid variable name '{1}' at position {0}")]
  InvalidName(usize, String),

  #[error("line break at position {0}: only '$' followed by a newline may continue a line")]
  LineBreak(usize),

  #[error("invalid escape '${1}' at position {0}")]
  BadEscape(usize, char),
}

fn is_var_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_braced_var_char(c: char) -> bool {
  is_var_char(c) || c == '.'
}

/// Parse a template into literal and variable segments.
///
/// # Errors
///
/// Returns an error for a trailing `$`, an unclosed `${`, an empty or
/// malformed `${...}` name, a raw line break, or a `$` followed by a
/// character that is neither a variable start nor a recognized escape.
pub fn parse(input: &str) -> Result<Vec<Segment>, TemplateError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut chars = input.char_indices().peekable();

  while let Some((pos, ch)) = chars.next() {
    if ch == '\n' || ch == '\r' {
      return Err(TemplateError::LineBreak(pos));
    }
    if ch != '$' {
      literal.push(ch);
      continue;
    }

    let Some(&(_, next)) = chars.peek() else {
      return Err(TemplateError::Dangling);
    };

    match next {
      '$' | ' ' | ':' => {
        literal.push(next);
        chars.next();
      }
      '\n' => {
        chars.next();
        while let Some((_, ' ')) = chars.peek() {
          chars.next();
        }
      }
      '{' => {
        chars.next();
        let mut name = String::new();
        let mut closed = false;
        for (_, c) in chars.by_ref() {
          if c == '}' {
            closed = true;
            break;
          }
          name.push(c);
        }
        if !closed {
          return Err(TemplateError::Unclosed(pos));
        }
        if name.is_empty() {
          return Err(TemplateError::EmptyName(pos));
        }
        if !name.chars().all(is_braced_var_char) {
          return Err(TemplateError::InvalidName(pos, name));
        }
        flush(&mut segments, &mut literal);
        segments.push(Segment::Variable(name));
      }
      c if is_var_char(c) => {
        let mut name = String::new();
        while let Some(&(_, c)) = chars.peek() {
          if !is_var_char(c) {
            break;
          }
          name.push(c);
          chars.next();
        }
        flush(&mut segments, &mut literal);
        segments.push(Segment::Variable(name));
      }
      other => return Err(TemplateError::BadEscape(pos, other)),
    }
  }

  flush(&mut segments, &mut literal);
  Ok(segments)
}

fn flush(segments: &mut Vec<Segment>, literal: &mut String) {
  if !literal.is_empty() {
    segments.push(Segment::Literal(std::mem::take(literal)));
  }
}

/// The distinct variable names a template references, in sorted order.
pub fn variables(input: &str) -> Result<BTreeSet<String>, TemplateError> {
  Ok(
    parse(input)?
      .into_iter()
      .filter_map(|segment| match segment {
        Segment::Variable(name) => Some(name),
        Segment::Literal(_) => None,
      })
      .collect(),
  )
}
