//! Markup parser.
//!
//! Purely structural: tags, attributes as strings, children and raw text.
//! The parser is forgiving about unclosed elements (they close at the end of
//! their parent) and stray closing tags (they are skipped). It fails on an
//! opening tag that never ends, on nesting deeper than
//! [`MAX_NESTING_DEPTH`], and when there is no element to act as the root.

use crate::ast::*;
use quasar_sfc::{MarkupLexer, ParseError, ParseResult};
use smol_str::SmolStr;
use source_map::Span;

/// Parse markup and return its first element.
pub fn parse_markup(source: &str) -> ParseResult<GenericElement> {
    let nodes = parse_fragment(source)?;
    nodes
        .into_iter()
        .find_map(|node| match node {
            GenericNode::Element(el) => Some(el),
            GenericNode::Text(_) => None,
        })
        .ok_or_else(|| ParseError::no_root_element(Span::between(0, source.len())))
}

/// Parse markup into a list of top-level nodes.
pub fn parse_fragment(source: &str) -> ParseResult<Vec<GenericNode>> {
    let mut parser = TemplateParser::new(source);
    parser.parse_children(None)
}

/// Deepest element nesting the parser follows.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Tags whose content is kept as a single opaque text child.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "pre", "noscript", "textarea"];

struct TemplateParser<'a> {
    lexer: MarkupLexer<'a>,
    /// Tags currently open, innermost last.
    open: Vec<SmolStr>,
}

impl<'a> TemplateParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lexer: MarkupLexer::new(source),
            open: Vec::new(),
        }
    }

    /// Parse children until the closing tag of `end_tag` (or of any open
    /// ancestor) or EOF.
    fn parse_children(&mut self, end_tag: Option<&str>) -> ParseResult<Vec<GenericNode>> {
        let mut children = Vec::new();

        while !self.lexer.is_eof() {
            if self.lexer.starts_with("</") {
                let name = self.peek_closing_name();
                if end_tag.is_some_and(|t| t.eq_ignore_ascii_case(&name)) {
                    break;
                }
                if self.open.iter().any(|t| t.eq_ignore_ascii_case(&name)) {
                    // Closes an ancestor, so the current element ends here.
                    tracing::debug!(tag = ?end_tag, closing = %name, "implicitly closing element");
                    break;
                }
                let start = self.lexer.pos();
                self.skip_closing_tag();
                let err = ParseError::mismatched_close(
                    end_tag.unwrap_or("(none)"),
                    &name,
                    self.lexer.span_from(start),
                );
                tracing::debug!(code = %err.code, "skipping stray closing tag: {}", err);
                continue;
            }

            if self.lexer.starts_with("<!--") {
                self.lexer.read_comment();
                continue;
            }

            if self.lexer.starts_with("<") && self.starts_tag() {
                children.push(GenericNode::Element(self.parse_element()?));
                continue;
            }

            if let Some(text) = self.parse_text() {
                children.push(GenericNode::Text(text));
            }
        }

        Ok(children)
    }

    /// Whether the `<` under the cursor opens a tag rather than being text.
    fn starts_tag(&self) -> bool {
        self.lexer.remaining()[1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
    }

    fn peek_closing_name(&self) -> String {
        self.lexer.remaining()[2..]
            .trim_start()
            .split(|c: char| c.is_whitespace() || c == '>')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase()
    }

    fn skip_closing_tag(&mut self) {
        self.lexer.consume_until(">");
        self.lexer.consume(">");
    }

    /// Parse text up to the next tag. `{{ ... }}` segments are consumed whole
    /// so a `<` inside an interpolation does not end the text.
    fn parse_text(&mut self) -> Option<TextNode> {
        let start = self.lexer.pos();
        let mut content = String::new();

        while !self.lexer.is_eof() {
            if self.lexer.starts_with("{{") {
                let segment_start = self.lexer.pos();
                self.lexer.consume("{{");
                self.lexer.consume_until("}}");
                self.lexer.consume("}}");
                content.push_str(self.lexer.span_from(segment_start).slice(self.lexer.source()));
                continue;
            }
            if self.lexer.starts_with("<") && (self.starts_tag() || self.lexer.starts_with("</") || self.lexer.starts_with("<!--")) {
                break;
            }
            if let Some(c) = self.lexer.next_char() {
                content.push(c);
            }
        }

        if self.lexer.pos() == start {
            // A lone `<` that is not a tag; keep it as text.
            self.lexer.next_char();
            return Some(TextNode::new("<", self.lexer.span_from(start)));
        }
        Some(TextNode::new(
            decode_entities(&content),
            self.lexer.span_from(start),
        ))
    }

    /// Parse an element.
    fn parse_element(&mut self) -> ParseResult<GenericElement> {
        let start = self.lexer.pos();
        self.lexer.consume("<");

        let tag: SmolStr = match self.lexer.read_tag_name() {
            Some(name) => name.to_ascii_lowercase().into(),
            None => return Err(ParseError::expected_tag_name(self.lexer.span_from(start))),
        };

        let attrs = self.parse_attributes();
        self.lexer.skip_whitespace();

        let self_closing = self.lexer.consume("/>");
        if !self_closing && !self.lexer.consume(">") {
            return Err(ParseError::unclosed_tag(&tag, self.lexer.span_from(start)));
        }

        let mut element = GenericElement {
            tag: tag.clone(),
            attrs,
            children: Vec::new(),
            self_closing,
            span: Span::default(),
        };

        if self_closing || is_void_element(&tag) {
            element.span = self.lexer.span_from(start);
            return Ok(element);
        }

        if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
            let content_start = self.lexer.pos();
            let content = self.lexer.read_block_content(&tag);
            if !content.trim().is_empty() {
                element.children.push(GenericNode::Text(TextNode::new(
                    content,
                    self.lexer.span_from(content_start),
                )));
            }
        } else {
            if self.open.len() >= MAX_NESTING_DEPTH {
                return Err(ParseError::nesting_too_deep(&tag, self.lexer.span_from(start)));
            }
            self.open.push(tag.clone());
            let children = self.parse_children(Some(&tag));
            self.open.pop();
            element.children = children?;
        }

        // Consume our closing tag if it is the one under the cursor; an
        // ancestor's closing tag is left for the ancestor.
        if self.lexer.starts_with("</") && self.peek_closing_name() == tag.as_str() {
            self.skip_closing_tag();
        } else {
            tracing::debug!(tag = %tag, "element closed implicitly");
        }

        element.span = self.lexer.span_from(start);
        Ok(element)
    }

    /// Parse attributes up to `>` or `/>`. Later duplicates overwrite earlier
    /// values but keep the first position.
    fn parse_attributes(&mut self) -> Attributes {
        let mut attrs = Attributes::new();

        loop {
            self.lexer.skip_whitespace();
            if self.lexer.is_eof() || self.lexer.starts_with(">") || self.lexer.starts_with("/>") {
                break;
            }

            let Some(name) = self.lexer.read_attr_name() else {
                self.lexer.next_char();
                continue;
            };
            let name = name.to_string();

            self.lexer.skip_whitespace();
            let value = if self.lexer.consume("=") {
                self.lexer.skip_whitespace();
                match self.lexer.read_quoted_string() {
                    Some((v, _)) => decode_entities(v),
                    None => decode_entities(self.lexer.read_unquoted_value().0),
                }
            } else {
                String::new()
            };

            attrs.insert(name, value);
        }

        attrs
    }
}

/// Check if an element is a void element (never has children).
fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Decode the handful of named entities that show up in templates.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", "\u{a0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
