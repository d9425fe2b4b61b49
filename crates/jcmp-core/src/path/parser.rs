use super::{Connector, KeyPattern, Segment, Selector, ROOT_SYMBOL};
use crate::PathError;

/// Recursive-descent parser for path expressions.
///
/// ```text
/// path      := "" | "$" segment*
/// segment   := connector? (key | "[" (quoted | index) "]")
/// connector := "." | ".." | "..."      (one `*` may sit between dots)
/// key       := [A-Za-z_][A-Za-z0-9_]*
/// quoted    := "r"? '"' ([^"\\] | "\\" any)* '"'
/// index     := [0-9]+ | "*" | ""
/// ```
pub(super) struct PathParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> PathParser<'a> {
    pub(super) fn parse(input: &'a str) -> Result<Vec<Segment>, PathError> {
        let mut parser = Self { input, pos: 0 };
        parser.parse_path()
    }

    fn parse_path(&mut self) -> Result<Vec<Segment>, PathError> {
        // Empty text addresses the root, like `$`.
        if self.is_at_end() {
            return Ok(Vec::new());
        }
        if self.peek() != Some(ROOT_SYMBOL as u8) {
            return Err(self.error("expected `$`"));
        }
        self.advance();

        let mut segments = Vec::new();
        while !self.is_at_end() {
            segments.push(self.parse_segment()?);
        }
        Ok(segments)
    }

    fn parse_segment(&mut self) -> Result<Segment, PathError> {
        let connector = self.parse_connector()?;
        let selector = match self.peek() {
            Some(b'[') => self.parse_bracket()?,
            Some(c) if c.is_ascii_alphabetic() || c == b'_' => {
                Selector::Key(self.parse_identifier().to_owned())
            }
            _ => return Err(self.error("expected key or `[`")),
        };
        Ok(Segment::new(connector, selector))
    }

    fn parse_connector(&mut self) -> Result<Connector, PathError> {
        let mut dots = 0;
        while dots < 3 {
            match self.peek() {
                Some(b'.') => {
                    dots += 1;
                    self.advance();
                }
                Some(b'*') if dots > 0 && self.peek_at(1) == Some(b'.') => self.advance(),
                _ => break,
            }
        }
        if self.peek() == Some(b'.') {
            return Err(self.error("connector has more than three `.`"));
        }
        Ok(match dots {
            0 | 1 => Connector::Child,
            2 => Connector::Search,
            _ => Connector::DeepSearch,
        })
    }

    fn parse_bracket(&mut self) -> Result<Selector, PathError> {
        self.expect(b'[')?;
        let selector = match self.peek() {
            Some(b'"') => Selector::Key(self.parse_quoted_key()?),
            Some(b'r') if self.peek_at(1) == Some(b'"') => {
                self.advance();
                let source = self.scan_quoted()?;
                Selector::Regex(KeyPattern::new(source)?)
            }
            Some(b'*') => {
                self.advance();
                Selector::AnyIndex
            }
            Some(b']') => Selector::AnyIndex,
            Some(c) if c.is_ascii_digit() => self.parse_index()?,
            _ => return Err(self.error("expected index, `*` or quoted key")),
        };
        self.expect(b']')?;
        Ok(selector)
    }

    fn parse_identifier(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
            self.advance();
        }
        let input = self.input;
        &input[start..self.pos]
    }

    fn parse_index(&mut self) -> Result<Selector, PathError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        self.input[start..self.pos]
            .parse()
            .map(Selector::Index)
            .map_err(|_| self.error_at(start, "index out of range"))
    }

    fn parse_quoted_key(&mut self) -> Result<String, PathError> {
        let start = self.pos;
        let raw = self.scan_quoted()?;
        serde_json::from_str(&format!("\"{raw}\""))
            .map_err(|_| self.error_at(start, "invalid escape in quoted key"))
    }

    /// Consumes a double-quoted string and returns its raw contents.
    fn scan_quoted(&mut self) -> Result<&'a str, PathError> {
        self.expect(b'"')?;
        let start = self.pos;
        loop {
            match self.peek() {
                Some(b'"') => break,
                Some(b'\\') => {
                    self.advance();
                    if self.is_at_end() {
                        return Err(self.error("unterminated escape"));
                    }
                    self.advance();
                }
                Some(_) => self.advance(),
                None => return Err(self.error_at(start - 1, "unterminated quoted key")),
            }
        }
        let input = self.input;
        let raw = &input[start..self.pos];
        self.advance();
        Ok(raw)
    }

    fn expect(&mut self, byte: u8) -> Result<(), PathError> {
        if self.peek() == Some(byte) {
            self.advance();
            Ok(())
        } else if byte == b']' {
            Err(self.error("expected `]`"))
        } else if byte == b'"' {
            Err(self.error("expected `\"`"))
        } else {
            Err(self.error("unexpected character"))
        }
    }

    fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn error(&self, reason: &'static str) -> PathError {
        self.error_at(self.pos, reason)
    }

    fn error_at(&self, offset: usize, reason: &'static str) -> PathError {
        PathError::Syntax { path: self.input.to_owned(), offset, reason }
    }
}
