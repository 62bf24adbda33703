//! Character-level cursor shared by the block extractor and the template
//! parser.

use source_map::Span;

/// A forward-only cursor over markup text.
pub struct MarkupLexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> MarkupLexer<'a> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    /// Get the current position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The full text this lexer walks.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Get the remaining source.
    pub fn remaining(&self) -> &'a str {
        &self.source[self.pos..]
    }

    /// Peek at the next character.
    pub fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Consume and return the next character.
    pub fn next_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skip whitespace and return the number of bytes skipped.
    pub fn skip_whitespace(&mut self) -> usize {
        self.consume_while(char::is_whitespace).len()
    }

    /// Check if the remaining source starts with the given string.
    pub fn starts_with(&self, s: &str) -> bool {
        self.remaining().starts_with(s)
    }

    /// ASCII case-insensitive variant of [`Self::starts_with`].
    pub fn starts_with_ignore_case(&self, s: &str) -> bool {
        self.remaining()
            .get(..s.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(s))
    }

    /// Consume a string if the remaining source starts with it.
    pub fn consume(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// Consume characters while the predicate is true.
    pub fn consume_while<F>(&mut self, pred: F) -> &'a str
    where
        F: Fn(char) -> bool,
    {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.source[start..self.pos]
    }

    /// Consume until the given string is found (or EOF).
    pub fn consume_until(&mut self, s: &str) -> &'a str {
        let start = self.pos;
        match self.remaining().find(s) {
            Some(idx) => self.pos += idx,
            None => self.pos = self.source.len(),
        }
        &self.source[start..self.pos]
    }

    /// Read a tag name. Names start with a letter and may contain
    /// alphanumerics, `-`, `_`, `:` and `.`.
    pub fn read_tag_name(&mut self) -> Option<&'a str> {
        if !self.peek_char().is_some_and(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        Some(self.consume_while(is_tag_char))
    }

    /// Read an attribute name, including directive prefixes (`:`, `@`, `#`)
    /// and modifiers (`v-on:click.stop`, `v-bind:[key]`).
    pub fn read_attr_name(&mut self) -> Option<&'a str> {
        let name = self.consume_while(is_attr_char);
        (!name.is_empty()).then_some(name)
    }

    /// Read a quoted value. The returned slice excludes the quotes; an
    /// unterminated string runs to EOF.
    pub fn read_quoted_string(&mut self) -> Option<(&'a str, Span)> {
        let quote = self.peek_char().filter(|c| *c == '"' || *c == '\'')?;
        self.next_char();
        let start = self.pos;
        let value = self.consume_while(|c| c != quote);
        let span = Span::between(start, self.pos);
        self.next_char();
        Some((value, span))
    }

    /// Read an unquoted attribute value.
    pub fn read_unquoted_value(&mut self) -> (&'a str, Span) {
        let start = self.pos;
        let value = self.consume_while(|c| !c.is_whitespace() && c != '>' && c != '<');
        // A trailing `/` belongs to a self-closing `/>`.
        let value = if value.ends_with('/') && self.starts_with(">") {
            self.pos -= 1;
            &value[..value.len() - 1]
        } else {
            value
        };
        (value, Span::between(start, self.pos))
    }

    /// Read a `<!-- ... -->` comment and return its body.
    pub fn read_comment(&mut self) -> Option<&'a str> {
        if !self.consume("<!--") {
            return None;
        }
        let content = self.consume_until("-->");
        self.consume("-->");
        Some(content)
    }

    /// Read raw content up to the `</tag` that closes the current block.
    ///
    /// Nested openers of the same tag are counted, so a `<template v-slot>`
    /// inside the component template does not end the outer block early.
    /// The cursor stops in front of the closing tag.
    pub fn read_block_content(&mut self, tag: &str) -> &'a str {
        let start = self.pos;
        let open = format!("<{}", tag);
        let close = format!("</{}", tag);
        let mut depth = 0usize;

        while !self.is_eof() {
            if self.starts_with_ignore_case(&close) && self.is_name_boundary(close.len()) {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                self.pos += close.len();
                continue;
            }
            if self.starts_with_ignore_case(&open) && self.is_name_boundary(open.len()) {
                depth += 1;
                self.pos += open.len();
                continue;
            }
            if self.starts_with("<!--") {
                self.read_comment();
                continue;
            }
            self.next_char();
        }
        &self.source[start..self.pos]
    }

    /// True when the character `len` bytes ahead cannot continue a tag name.
    fn is_name_boundary(&self, len: usize) -> bool {
        self.remaining()[len..]
            .chars()
            .next()
            .map_or(true, |c| !is_tag_char(c))
    }

    /// Check if at end of input.
    pub fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Get a span from start to current position.
    pub fn span_from(&self, start: usize) -> Span {
        Span::between(start, self.pos)
    }
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
}

fn is_attr_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '-' | '_' | ':' | '.' | '@' | '#' | '[' | ']' | '$')
}
