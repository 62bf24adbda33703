//! Single-file component front end.
//!
//! Extracts the `<template>`, `<script>` and `<style>` blocks of a Vue
//! component and provides [`MarkupLexer`], the cursor the template parser is
//! built on.

pub mod block;
pub mod error;
pub mod lexer;
pub mod parser;

pub use block::{BlockAttr, SfcBlock, SfcBlocks};
pub use error::{ErrorCode, ParseError, ParseResult};
pub use lexer::MarkupLexer;
pub use parser::extract_blocks;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_offsets_map_back_to_file() {
        let source = "<!-- header -->\n<template>\n  <q-icon name=\"home\" />\n</template>\n";
        let blocks = extract_blocks(source).unwrap();
        let template = blocks.require_template().unwrap();
        let inner = template.content.find("q-icon").unwrap() as u32;
        let absolute = template.content_span.start + inner;
        assert_eq!(&source[absolute as usize..absolute as usize + 6], "q-icon");
    }
}
