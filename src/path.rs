//! The path language: dotted, slashed or bracketed segments, with quoting.
//!
//! ```text
//! $.address.city
//! adresses1[0]/street
//! hobbys["Free climbing"]
//! "a.b\"c"
//! ```

use std::{
    error::Error,
    fmt::{self, Display, Write},
    str::FromStr,
};

use crate::kind::Kind;

/// Error from parsing or resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathError {
    kind: PathErrorKind,
}

impl PathError {
    /// Returns a reference to the error kind for detailed error inspection.
    pub fn kind(&self) -> &PathErrorKind {
        &self.kind
    }
}

impl Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = &self.kind;
        write!(f, "{kind}")
    }
}
impl Error for PathError {}

impl<K: Into<PathErrorKind>> From<K> for PathError {
    fn from(value: K) -> Self {
        let kind = value.into();
        PathError { kind }
    }
}

/// Detailed classification of path errors.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PathErrorKind {
    // Tokenization errors
    /// `[` inside an open bracket.
    NestedBrackets,
    /// `]` without a preceding `[`.
    UnmatchedCloseBracket,
    /// A separator or the end of input inside an open bracket.
    UnclosedBrackets,
    /// A character after `\` that needs no escaping.
    UnknownEscape(char),
    /// `\` at the end of input.
    DanglingEscape,
    /// The end of input inside quotes.
    UnclosedQuotes,
    /// A character below U+0020.
    ControlCharacter(char),
    /// Whitespace outside quotes.
    SpaceInElement,

    // Resolution errors
    /// No field, index or key matches the segment.
    SegmentNotFound(String),
    /// Segments remain but the value reached has no children.
    PathTooLong(String),
    /// The map's key type cannot be built from a segment.
    UnsupportedKeyType(Kind),
    /// The value reached cannot be copied out of the graph.
    NotAccessible(&'static str),
}

impl Display for PathErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathErrorKind::NestedBrackets => write!(f, "nested brackets not permitted"),
            PathErrorKind::UnmatchedCloseBracket => {
                write!(f, "closed bracket without matching open")
            }
            PathErrorKind::UnclosedBrackets => write!(f, "brackets left open"),
            PathErrorKind::UnknownEscape(c) => write!(f, "unknown escape character {c:?}"),
            PathErrorKind::DanglingEscape => {
                write!(f, "escape sequence needs a second character")
            }
            PathErrorKind::UnclosedQuotes => write!(f, "quotes left open"),
            PathErrorKind::ControlCharacter(c) => {
                write!(f, "control character {c:?} not permitted")
            }
            PathErrorKind::SpaceInElement => write!(f, "space not permitted in element"),
            PathErrorKind::SegmentNotFound(segment) => {
                write!(f, "object for path segment '{segment}' not found")
            }
            PathErrorKind::PathTooLong(segment) => {
                write!(f, "path too long at segment '{segment}'")
            }
            PathErrorKind::UnsupportedKeyType(kind) => write!(f, "unsupported key type: {kind}"),
            PathErrorKind::NotAccessible(type_name) => {
                write!(f, "value of type {type_name} not accessible")
            }
        }
    }
}

/// A parsed path: an ordered sequence of non-empty segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    elements: Vec<String>,
}

impl Path {
    /// Parses a path. Surrounding whitespace and a leading `$..` or `$.` are
    /// ignored; an empty path addresses the root.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        log::trace!("Parsing path {input:?}");

        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix("$..").unwrap_or(trimmed);
        let trimmed = trimmed.strip_prefix("$.").unwrap_or(trimmed).trim();

        let mut tokenizer = Tokenizer::default();
        for c in trimmed.chars() {
            tokenizer.push(c)?;
        }
        Ok(tokenizer.finish()?)
    }

    /// Builds a path from segments, dropping empty ones.
    ///
    /// Fails on a segment holding a character below U+0020, which no path
    /// text can spell.
    pub fn from_elements<I, S>(elements: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut path = Path::default();
        for element in elements {
            let element: String = element.into();
            if let Some(c) = element.chars().find(|c| *c < ' ') {
                return Err(PathErrorKind::ControlCharacter(c).into());
            }
            if !element.is_empty() {
                path.elements.push(element);
            }
        }
        Ok(path)
    }

    /// The segments, in order.
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the path addresses the root.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, element) in self.elements.iter().enumerate() {
            if index > 0 {
                f.write_char('.')?;
            }
            if !needs_quotes(element) {
                f.write_str(element)?;
                continue;
            }
            f.write_char('"')?;
            for c in element.chars() {
                if matches!(c, '"' | '\\') {
                    f.write_char('\\')?;
                }
                f.write_char(c)?;
            }
            f.write_char('"')?;
        }
        Ok(())
    }
}

fn needs_quotes(element: &str) -> bool {
    element.starts_with('$')
        || element
            .chars()
            .any(|c| matches!(c, '.' | '/' | '\\' | '[' | ']' | '"') || c.is_whitespace())
}

#[derive(Default)]
struct Tokenizer {
    elements: Vec<String>,
    current: String,
    escaped: bool,
    quoted: bool,
    bracketed: bool,
}

impl Tokenizer {
    fn push(&mut self, c: char) -> Result<(), PathErrorKind> {
        if self.escaped {
            if !matches!(c, '.' | '/' | '\\' | '[' | ']' | '"') {
                return Err(PathErrorKind::UnknownEscape(c));
            }
            self.current.push(c);
            self.escaped = false;
            return Ok(());
        }

        if c == '"' {
            self.quoted = !self.quoted;
            return Ok(());
        }

        if self.quoted {
            match c {
                '\\' => self.escaped = true,
                c if c < ' ' => return Err(PathErrorKind::ControlCharacter(c)),
                c => self.current.push(c),
            }
            return Ok(());
        }

        match c {
            '.' | '/' | '\\' => {
                if self.bracketed {
                    return Err(PathErrorKind::UnclosedBrackets);
                }
                self.flush();
            }
            '[' => {
                if self.bracketed {
                    return Err(PathErrorKind::NestedBrackets);
                }
                self.flush();
                self.bracketed = true;
            }
            ']' => {
                if !self.bracketed {
                    return Err(PathErrorKind::UnmatchedCloseBracket);
                }
                self.flush();
                self.bracketed = false;
            }
            c if c < ' ' => return Err(PathErrorKind::ControlCharacter(c)),
            c if c.is_whitespace() => return Err(PathErrorKind::SpaceInElement),
            c => self.current.push(c),
        }
        Ok(())
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.elements.push(std::mem::take(&mut self.current));
        }
    }

    fn finish(mut self) -> Result<Path, PathErrorKind> {
        if self.escaped {
            return Err(PathErrorKind::DanglingEscape);
        }
        if self.quoted {
            return Err(PathErrorKind::UnclosedQuotes);
        }
        if self.bracketed {
            return Err(PathErrorKind::UnclosedBrackets);
        }
        self.flush();
        Ok(Path {
            elements: self.elements,
        })
    }
}
