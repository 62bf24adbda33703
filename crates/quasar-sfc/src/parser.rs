//! Splits a component file into its top-level blocks.

use crate::block::{BlockAttr, SfcBlock, SfcBlocks};
use crate::error::{ParseError, ParseResult};
use crate::lexer::MarkupLexer;
use source_map::Span;

/// Extract the template, script and style blocks of a component.
///
/// Text outside of blocks is skipped. A missing template is not an error
/// here; callers that need one use [`SfcBlocks::require_template`].
pub fn extract_blocks(source: &str) -> ParseResult<SfcBlocks> {
    BlockExtractor::new(source).run()
}

struct BlockExtractor<'a> {
    lexer: MarkupLexer<'a>,
    blocks: SfcBlocks,
    script_setup: Option<SfcBlock>,
}

impl<'a> BlockExtractor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lexer: MarkupLexer::new(source),
            blocks: SfcBlocks::default(),
            script_setup: None,
        }
    }

    fn run(mut self) -> ParseResult<SfcBlocks> {
        while !self.lexer.is_eof() {
            self.lexer.skip_whitespace();
            if self.lexer.starts_with("<!--") {
                self.lexer.read_comment();
            } else if self.lexer.starts_with("<") && !self.lexer.starts_with("</") {
                if let Some(block) = self.read_block()? {
                    self.store(block);
                }
            } else {
                self.lexer.next_char();
            }
        }

        if self.blocks.script.is_none() {
            self.blocks.script = self.script_setup.take();
        }
        Ok(self.blocks)
    }

    fn store(&mut self, block: SfcBlock) {
        if block.tag == "style" {
            self.blocks.styles.push(block);
            return;
        }

        let slot = match block.tag.as_str() {
            "template" => &mut self.blocks.template,
            "script" if block.has_attr("setup") => &mut self.script_setup,
            "script" => &mut self.blocks.script,
            other => {
                tracing::debug!(block = other, "skipping custom block");
                return;
            }
        };

        if slot.is_some() {
            let warning = ParseError::duplicate_block(&block.tag, block.span);
            tracing::warn!(code = %warning.code, "{}", warning);
            self.blocks.warnings.push(warning);
        } else {
            *slot = Some(block);
        }
    }

    fn read_block(&mut self) -> ParseResult<Option<SfcBlock>> {
        let start = self.lexer.pos();
        self.lexer.consume("<");

        let tag = match self.lexer.read_tag_name() {
            Some(name) => name.to_ascii_lowercase(),
            None => return Ok(None),
        };
        let attrs = self.read_attrs();

        let self_closing = self.lexer.consume("/>");
        if !self_closing && !self.lexer.consume(">") {
            return Err(ParseError::unclosed_tag(&tag, self.lexer.span_from(start)));
        }

        let (content, content_span) = if self_closing {
            (String::new(), Span::empty(self.lexer.pos() as u32))
        } else {
            let content_start = self.lexer.pos();
            let content = self.lexer.read_block_content(&tag);
            let content_span = self.lexer.span_from(content_start);
            if self.lexer.is_eof() {
                return Err(ParseError::unclosed_tag(&tag, self.lexer.span_from(start)));
            }
            self.lexer.consume_until(">");
            self.lexer.consume(">");
            (content.to_string(), content_span)
        };

        Ok(Some(SfcBlock {
            tag: tag.into(),
            attrs,
            content,
            content_span,
            span: self.lexer.span_from(start),
        }))
    }

    fn read_attrs(&mut self) -> Vec<BlockAttr> {
        let mut attrs = Vec::new();
        loop {
            self.lexer.skip_whitespace();
            if self.lexer.is_eof() || self.lexer.starts_with(">") || self.lexer.starts_with("/>") {
                break;
            }

            let attr_start = self.lexer.pos();
            let Some(name) = self.lexer.read_attr_name() else {
                self.lexer.next_char();
                continue;
            };

            self.lexer.skip_whitespace();
            let value = if self.lexer.consume("=") {
                self.lexer.skip_whitespace();
                match self.lexer.read_quoted_string() {
                    Some((v, _)) => Some(v.to_string()),
                    None => Some(self.lexer.read_unquoted_value().0.to_string()),
                }
            } else {
                None
            };

            attrs.push(BlockAttr {
                name: name.into(),
                value,
                span: self.lexer.span_from(attr_start),
            });
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_template_and_script() {
        let source = r#"<template>
  <q-btn label="Go" />
</template>

<script>
export default { data() { return { on: true } } }
</script>

<style scoped>
.x { color: red; }
</style>
"#;
        let blocks = extract_blocks(source).unwrap();
        let template = blocks.require_template().unwrap();
        assert_eq!(template.content.trim(), r#"<q-btn label="Go" />"#);
        assert_eq!(template.content_span.slice(source), template.content);
        assert!(blocks.script_source().contains("data()"));
        assert_eq!(blocks.styles.len(), 1);
        assert!(blocks.styles[0].has_attr("scoped"));
    }

    #[test]
    fn test_missing_template() {
        let blocks = extract_blocks("<script>export default {}</script>").unwrap();
        let err = blocks.require_template().unwrap_err();
        assert_eq!(err.code, ErrorCode::TemplateNotFound);
    }

    #[test]
    fn test_nested_template_tags_stay_inside() {
        let source = "<template><q-card><template v-slot:header>H</template></q-card></template>";
        let blocks = extract_blocks(source).unwrap();
        assert_eq!(
            blocks.template.unwrap().content,
            "<q-card><template v-slot:header>H</template></q-card>"
        );
    }

    #[test]
    fn test_script_setup_used_when_alone() {
        let source = "<template><div/></template><script setup>const a = 1</script>";
        let blocks = extract_blocks(source).unwrap();
        assert_eq!(blocks.script_source(), "const a = 1");
    }

    #[test]
    fn test_options_script_wins_over_setup() {
        let source = "<script setup>const a = 1</script><script>export default {}</script>";
        let blocks = extract_blocks(source).unwrap();
        assert_eq!(blocks.script_source(), "export default {}");
    }

    #[test]
    fn test_duplicate_template_is_a_warning() {
        let source = "<template><a/></template><template><b/></template>";
        let blocks = extract_blocks(source).unwrap();
        assert_eq!(blocks.template.unwrap().content, "<a/>");
        assert_eq!(blocks.warnings.len(), 1);
        assert_eq!(blocks.warnings[0].code, ErrorCode::DuplicateBlock);
        assert!(!blocks.warnings[0].code.is_fatal());
    }

    #[test]
    fn test_unterminated_block() {
        let err = extract_blocks("<template><div>").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnclosedTag);
    }
}
