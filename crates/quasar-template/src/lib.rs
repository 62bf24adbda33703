//! Quasar template compiler.
//!
//! Parses the markup of a component template into a generic element tree,
//! builds an evaluation context from the component script and normalizes the
//! tree into [`SemanticNode`]s with every directive resolved.

pub mod ast;
pub mod context;
pub mod error;
pub mod expr;
pub mod normalize;
pub mod parser;

pub use ast::*;
pub use context::ComponentContext;
pub use error::{DirectiveError, DirectiveErrorCode, DirectiveResult};
pub use expr::{evaluate, evaluate_condition};
pub use normalize::normalize;
pub use parser::{parse_fragment, parse_markup};

use quasar_sfc::{extract_blocks, ParseResult};

/// A component template ready for rendering.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    /// Root of the normalized tree. Suppressed when the root `v-if` is falsy.
    pub root: SemanticNode,
    /// The context the template was evaluated under.
    pub context: ComponentContext,
    /// Non-fatal problems found while splitting the file.
    pub warnings: Vec<quasar_sfc::ParseError>,
}

/// Compile a full single-file component.
///
/// Fails when the file has no `<template>` block or the template has no root
/// element. Error spans are in file coordinates.
pub fn compile_component(source: &str) -> ParseResult<CompiledTemplate> {
    let blocks = extract_blocks(source)?;
    let template = blocks.require_template()?;
    let context = ComponentContext::from_script(blocks.script_source());

    let root = compile_template(&template.content, &context)
        .map_err(|err| err.relocated(template.content_span.start))?;

    Ok(CompiledTemplate {
        root,
        context,
        warnings: blocks.warnings,
    })
}

/// Parse and normalize bare template markup.
pub fn compile_template(markup: &str, context: &ComponentContext) -> ParseResult<SemanticNode> {
    let element = parse_markup(markup)?;
    Ok(normalize(&element, context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quasar_sfc::ErrorCode;

    #[test]
    fn test_compile_component_uses_script_context() {
        let source = r#"<template>
  <q-card>
    <q-btn v-if="visible" :label="title" />
  </q-card>
</template>
<script>
export default {
  data() {
    return { visible: true, title: 'Save' }
  }
}
</script>"#;
        let compiled = compile_component(source).unwrap();
        let btn = compiled.root.child_elements().next().unwrap();
        assert_eq!(btn.tag, "q-btn");
        assert_eq!(btn.attr("label"), Some("Save"));
    }

    #[test]
    fn test_missing_template_is_fatal() {
        let err = compile_component("<script>export default {}</script>").unwrap_err();
        assert_eq!(err.code, ErrorCode::TemplateNotFound);
    }

    #[test]
    fn test_empty_template_reports_file_position() {
        let source = "<template>\n  <!-- nothing -->\n</template>";
        let err = compile_component(source).unwrap_err();
        assert_eq!(err.code, ErrorCode::NoRootElement);
        assert_eq!(err.span.start, 10);
    }

    #[test]
    fn test_compile_template_without_script() {
        let root = compile_template("<q-icon name=\"home\" />", &ComponentContext::new()).unwrap();
        assert_eq!(root.attr("name"), Some("home"));
    }
}
