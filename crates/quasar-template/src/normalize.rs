//! Directive evaluation.
//!
//! Turns parser output into [`SemanticNode`]s: bindings are evaluated and
//! written back under their plain names, `v-if` chains and `v-for` are
//! resolved, and event listeners are dropped. The output contains no
//! directive keys, so normalizing it a second time changes nothing.

use crate::ast::*;
use crate::context::ComponentContext;
use crate::error::{DirectiveError, DirectiveResult};
use crate::expr::{self, display, evaluate, evaluate_condition, is_truthy, stringify};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Class given to the wrapper created for a `v-for` on the root element.
pub const V_FOR_CONTAINER_CLASS: &str = "v-for-container";

/// Normalize a parsed element under `ctx`.
///
/// A falsy `v-if` yields a suppressed node. A `v-for` on this element yields a
/// `div.v-for-container` holding one clone per item, or a suppressed node when
/// the collection is empty.
pub fn normalize(element: &GenericElement, ctx: &ComponentContext) -> SemanticNode {
    let Some(source) = element.attrs.get("v-for") else {
        return normalize_element(element, ctx);
    };

    let clones = expand_v_for(element, source, ctx);
    if clones.is_empty() {
        return SemanticNode::suppressed(element.span);
    }

    let mut attrs = Attributes::new();
    attrs.insert("class".into(), V_FOR_CONTAINER_CLASS.into());
    let mut container = SemanticNode::element("div", attrs, element.span);
    container.children = clones;
    container
}

/// Normalize one element, ignoring any `v-for` on it.
fn normalize_element(element: &GenericElement, ctx: &ComponentContext) -> SemanticNode {
    if let Some(condition) = element.attrs.get("v-if") {
        if !evaluate_condition(condition, ctx) {
            return SemanticNode::suppressed(element.span);
        }
    }

    let mut attrs = Attributes::new();
    let mut text_override = None;

    for (key, value) in &element.attrs {
        if let Some(name) = binding_name(key) {
            let bound = evaluate(value, ctx);
            match name {
                "class" => append_class(&mut attrs, &class_string(&bound)),
                "style" => append_style(&mut attrs, &style_string(&bound)),
                "key" => {}
                _ => {
                    attrs.insert(name.to_string(), stringify(&bound));
                }
            }
            continue;
        }

        match key.as_str() {
            "v-for" | "v-if" | "v-else-if" | "v-else" => {}
            "class" => append_class(&mut attrs, value),
            "style" => append_style(&mut attrs, value),
            "v-bind" => spread_bindings(&mut attrs, &evaluate(value, ctx)),
            "v-show" => {
                if !evaluate_condition(value, ctx) {
                    append_class(&mut attrs, "hidden");
                }
            }
            "v-text" | "v-html" => text_override = Some(display(&evaluate(value, ctx))),
            k if k == "v-model" || k.starts_with("v-model:") || k.starts_with("v-model.") => {
                apply_model(&element.tag, k, value, ctx, &mut attrs);
            }
            k if k.starts_with('@') || k.starts_with("v-on") => {}
            k if k.starts_with('#') || k.starts_with("v-slot") => {}
            k if k.starts_with("v-") => {
                tracing::debug!(directive = k, tag = %element.tag, "ignoring directive");
            }
            k if has_binding_for(element, k) => {}
            k => {
                attrs.insert(k.to_string(), value.clone());
            }
        }
    }

    let children = match text_override {
        Some(text) if text.trim().is_empty() => Vec::new(),
        Some(text) => vec![SemanticNode::text(text.trim(), element.span)],
        None => normalize_children(&element.children, ctx),
    };

    let mut node = SemanticNode::element(element.tag.clone(), attrs, element.span);
    node.children = children;
    node
}

/// Normalize a child list, resolving `v-if`/`v-else-if`/`v-else` chains,
/// splicing `v-for` clones and `<template>` wrappers into the list and
/// dropping suppressed nodes and blank text.
pub fn normalize_children(children: &[GenericNode], ctx: &ComponentContext) -> Vec<SemanticNode> {
    let mut out = Vec::new();
    // Some(branch_taken) while inside a conditional chain.
    let mut chain: Option<bool> = None;

    for child in children {
        let element = match child {
            GenericNode::Text(text) => {
                if let Some(node) = normalize_text(text, ctx) {
                    chain = None;
                    out.push(node);
                }
                continue;
            }
            GenericNode::Element(el) => el,
        };

        if let Some(source) = element.attrs.get("v-for") {
            chain = None;
            for clone in expand_v_for(element, source, ctx) {
                push_node(&mut out, clone);
            }
            continue;
        }

        let attrs = &element.attrs;
        let node = if attrs.contains_key("v-if") {
            let node = normalize_element(element, ctx);
            chain = Some(!node.is_suppressed());
            node
        } else if let Some(condition) = attrs.get("v-else-if") {
            if chain == Some(true) {
                continue;
            }
            let met = evaluate_condition(condition, ctx);
            chain = Some(met);
            if !met {
                continue;
            }
            normalize_element(element, ctx)
        } else if attrs.contains_key("v-else") {
            let taken = chain == Some(true);
            chain = None;
            if taken {
                continue;
            }
            normalize_element(element, ctx)
        } else {
            chain = None;
            normalize_element(element, ctx)
        };

        push_node(&mut out, node);
    }

    out
}

fn push_node(out: &mut Vec<SemanticNode>, node: SemanticNode) {
    if node.is_suppressed() {
        return;
    }
    if node.tag == "template" {
        out.extend(node.children);
    } else {
        out.push(node);
    }
}

fn normalize_text(text: &TextNode, ctx: &ComponentContext) -> Option<SemanticNode> {
    let content = interpolate(&text.content, ctx);
    let trimmed = content.trim();
    (!trimmed.is_empty()).then(|| SemanticNode::text(trimmed, text.span))
}

/// Replace every `{{ expr }}` with the display form of its value.
pub fn interpolate(text: &str, ctx: &ComponentContext) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find("{{") {
        let Some(close) = rest[open + 2..].find("}}") else {
            break;
        };
        out.push_str(&rest[..open]);
        let inner = &rest[open + 2..open + 2 + close];
        out.push_str(&display(&evaluate(inner, ctx)));
        rest = &rest[open + 2 + close + 2..];
    }

    out.push_str(rest);
    out
}

/// A parsed `v-for` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VFor<'a> {
    pub item: &'a str,
    pub index: Option<&'a str>,
    pub source: &'a str,
}

static V_FOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:\(\s*([A-Za-z_$][\w$]*)\s*(?:,\s*([A-Za-z_$][\w$]*)\s*)?(?:,\s*[A-Za-z_$][\w$]*\s*)?\)|([A-Za-z_$][\w$]*))\s+(?:in|of)\s+(.+?)\s*$",
    )
    .expect("valid regex")
});

/// Parse `item in source`, `(item, index) in source` or the `of` form.
pub fn parse_v_for(expression: &str) -> DirectiveResult<VFor<'_>> {
    let caps = V_FOR
        .captures(expression)
        .ok_or_else(|| DirectiveError::invalid_v_for(expression))?;
    let item = caps
        .get(1)
        .or_else(|| caps.get(3))
        .ok_or_else(|| DirectiveError::invalid_v_for(expression))?;
    let source = caps
        .get(4)
        .ok_or_else(|| DirectiveError::invalid_v_for(expression))?;

    Ok(VFor {
        item: item.as_str(),
        index: caps.get(2).map(|m| m.as_str()),
        source: source.as_str(),
    })
}

/// Most clones a numeric `v-for="n in N"` produces.
pub const MAX_RANGE_ITERATIONS: u64 = 1000;

/// One normalized clone per collection item. Each clone is built from its own
/// copy of the element under a derived context.
fn expand_v_for(element: &GenericElement, expression: &str, ctx: &ComponentContext) -> Vec<SemanticNode> {
    let binding = match parse_v_for(expression) {
        Ok(binding) => binding,
        Err(err) => {
            tracing::debug!(code = %err.code, "skipping v-for: {}", err);
            return Vec::new();
        }
    };

    let items = match expr::try_evaluate(binding.source, ctx) {
        Ok(Value::Array(items)) => items,
        Ok(Value::Number(n)) => {
            let mut count = n.as_u64().unwrap_or(0);
            if count > MAX_RANGE_ITERATIONS {
                tracing::warn!(
                    count,
                    limit = MAX_RANGE_ITERATIONS,
                    "v-for range truncated"
                );
                count = MAX_RANGE_ITERATIONS;
            }
            (1..=count).map(|i| expr::number(i as f64)).collect()
        }
        Ok(other) => {
            tracing::debug!(source = binding.source, value = %other, "v-for source is not a sequence");
            Vec::new()
        }
        Err(err) => {
            tracing::debug!(code = %err.code, "skipping v-for: {}", err);
            Vec::new()
        }
    };

    let mut template = element.clone();
    template.attrs.shift_remove("v-for");

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let mut bindings = vec![(binding.item.to_string(), item)];
            if let Some(index) = binding.index {
                bindings.push((index.to_string(), expr::number(i as f64)));
            }
            normalize_element(&template, &ctx.derive_with(bindings))
        })
        .filter(|node| !node.is_suppressed())
        .collect()
}

/// `:name` and `v-bind:name` both bind `name`.
fn binding_name(key: &str) -> Option<&str> {
    key.strip_prefix(':')
        .or_else(|| key.strip_prefix("v-bind:"))
        .filter(|name| !name.is_empty())
}

fn has_binding_for(element: &GenericElement, name: &str) -> bool {
    element.attrs.contains_key(&format!(":{}", name))
        || element.attrs.contains_key(&format!("v-bind:{}", name))
}

fn spread_bindings(attrs: &mut Attributes, value: &Value) {
    if let Value::Object(map) = value {
        for (key, v) in map {
            attrs.entry(key.clone()).or_insert_with(|| stringify(v));
        }
    }
}

/// Map `v-model` onto the attribute the component reads its value from.
fn apply_model(tag: &str, key: &str, expression: &str, ctx: &ComponentContext, attrs: &mut Attributes) {
    let value = expr::try_evaluate(expression, ctx).unwrap_or(Value::Null);

    if let Some(arg) = key.strip_prefix("v-model:") {
        let arg = arg.split('.').next().unwrap_or(arg);
        attrs.insert(arg.to_string(), display(&value));
        return;
    }

    let (name, text) = match tag {
        "q-checkbox" | "q-toggle" | "q-radio" => ("value", is_truthy(&value).to_string()),
        "q-input" | "q-select" | "q-file" | "q-editor" | "input" | "textarea" | "select" => {
            ("value", display(&value))
        }
        _ => ("model-value", display(&value)),
    };
    attrs.insert(name.to_string(), text);
}

/// `:class` accepts a string, an array or an object of flags.
fn class_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(class_string)
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(map) => map
            .iter()
            .filter(|(_, on)| is_truthy(on))
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        _ => String::new(),
    }
}

/// `:style` accepts a string, an object or an array of objects.
fn style_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(style_string)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| format!("{}: {};", kebab_case(k), display(v)))
            .collect::<Vec<_>>()
            .join(" "),
        _ => String::new(),
    }
}

fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn append_class(attrs: &mut Attributes, classes: &str) {
    let entry = attrs.entry("class".to_string()).or_default();
    for class in classes.split_whitespace() {
        if !entry.split_whitespace().any(|c| c == class) {
            if !entry.is_empty() {
                entry.push(' ');
            }
            entry.push_str(class);
        }
    }
}

fn append_style(attrs: &mut Attributes, style: &str) {
    let style = style.trim();
    if style.is_empty() {
        return;
    }
    let entry = attrs.entry("style".to_string()).or_default();
    let existing = entry.trim_end();
    if existing.is_empty() {
        *entry = style.to_string();
    } else if existing.ends_with(';') {
        *entry = format!("{} {}", existing, style);
    } else {
        *entry = format!("{}; {}", existing, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_markup;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn run(markup: &str, ctx: &ComponentContext) -> SemanticNode {
        normalize(&parse_markup(markup).unwrap(), ctx)
    }

    fn texts(node: &SemanticNode) -> Vec<String> {
        node.child_elements().map(|c| c.text_content()).collect()
    }

    fn sample_ctx() -> ComponentContext {
        ComponentContext::new()
            .with_data("msg", json!("Hello"))
            .with_data("show", json!(true))
            .with_data("hide", json!(false))
            .with_data("mode", json!("b"))
            .with_data("name", json!("Ana"))
            .with_data("agreed", json!(true))
            .with_data("users", json!([{ "name": "A" }, { "name": "B" }]))
    }

    #[test]
    fn test_repetition_produces_ordered_siblings() {
        let node = run(r#"<ul><li v-for="item in [1,2,3]">{{item}}</li></ul>"#, &ComponentContext::new());
        assert_eq!(node.children.len(), 3);
        assert_eq!(texts(&node), vec!["1", "2", "3"]);
        assert!(node.children.iter().all(|c| !c.attributes.contains_key("v-for")));
    }

    #[test]
    fn test_repetition_clones_are_independent() {
        let mut node = run(
            r#"<div><q-item v-for="(user, i) in users" :label="user.name" :data-index="i"><span>x</span></q-item></div>"#,
            &sample_ctx(),
        );
        assert_eq!(node.children[0].attr("label"), Some("A"));
        assert_eq!(node.children[1].attr("label"), Some("B"));
        assert_eq!(node.children[1].attr("data-index"), Some("1"));

        node.children[0].children[0].tag = "b".into();
        assert_eq!(node.children[1].children[0].tag, "span");
        assert_ne!(
            node.children[0].children.as_ptr(),
            node.children[1].children.as_ptr()
        );
    }

    #[test]
    fn test_loop_binding_does_not_leak() {
        let node = run(
            r#"<div><span v-for="msg in ['x']">{{ msg }}</span><p>{{ msg }}</p></div>"#,
            &sample_ctx(),
        );
        assert_eq!(texts(&node), vec!["x", "Hello"]);
    }

    #[test]
    fn test_root_repetition_is_wrapped() {
        let node = run(r#"<q-btn v-for="n in 2" :label="n" />"#, &ComponentContext::new());
        assert_eq!(node.tag, "div");
        assert_eq!(node.attr("class"), Some(V_FOR_CONTAINER_CLASS));
        let labels: Vec<_> = node.children.iter().filter_map(|c| c.attr("label")).collect();
        assert_eq!(labels, vec!["1", "2"]);
    }

    #[test]
    fn test_empty_collection_is_suppressed() {
        let ctx = ComponentContext::new().with_data("rows", json!([]));
        assert!(run(r#"<li v-for="r in rows">x</li>"#, &ctx).is_suppressed());
        assert!(run(r#"<li v-for="r in missing">x</li>"#, &ctx).is_suppressed());
        assert!(run(r#"<li v-for="not a loop">x</li>"#, &ctx).is_suppressed());

        let node = run(r#"<ul><li v-for="r in rows">x</li><li>y</li></ul>"#, &ctx);
        assert_eq!(texts(&node), vec!["y"]);
    }

    #[test]
    fn test_numeric_range_is_capped() {
        let node = run(r#"<ul><li v-for="n in 3">{{ n }}</li></ul>"#, &ComponentContext::new());
        assert_eq!(texts(&node), vec!["1", "2", "3"]);

        let node = run(r#"<ul><li v-for="n in 5000000">x</li></ul>"#, &ComponentContext::new());
        assert_eq!(node.children.len(), MAX_RANGE_ITERATIONS as usize);
    }

    #[test]
    fn test_conditional_suppression() {
        let node = run(r#"<q-card v-if="hide"><q-btn v-for="x in [1,2]" /></q-card>"#, &sample_ctx());
        assert!(node.is_suppressed());
        assert!(node.children.is_empty());

        let node = run(r#"<q-card v-if="show"><q-btn /></q-card>"#, &sample_ctx());
        assert_eq!(node.tag, "q-card");
        assert!(!node.attributes.contains_key("v-if"));
    }

    #[test]
    fn test_else_chains() {
        let markup = r#"<div>
            <p v-if="mode === 'a'">A</p>
            <p v-else-if="mode === 'b'">B</p>
            <p v-else>C</p>
            <p v-if="hide">D</p>
            <p v-else>E</p>
        </div>"#;
        let node = run(markup, &sample_ctx());
        assert_eq!(texts(&node), vec!["B", "E"]);
    }

    #[test]
    fn test_v_show_hides_with_class() {
        let node = run(r#"<div class="row" v-show="hide">x</div>"#, &sample_ctx());
        assert_eq!(node.attr("class"), Some("row hidden"));
        assert!(!node.attributes.contains_key("v-show"));
    }

    #[test]
    fn test_bindings_replace_static_values() {
        let node = run(
            r#"<q-btn label="static" :label="msg" v-bind:icon="'send'" @click="go" v-on:focus="f" />"#,
            &sample_ctx(),
        );
        let keys: Vec<_> = node.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["label", "icon"]);
        assert_eq!(node.attr("label"), Some("Hello"));
        assert_eq!(node.attr("icon"), Some("send"));
    }

    #[test]
    fn test_class_and_style_bindings_merge() {
        let node = run(
            r#"<div class="q-pa-md" :class="{ active: show, faded: hide }" style="color: red" :style="{ fontSize: '12px' }"></div>"#,
            &sample_ctx(),
        );
        assert_eq!(node.attr("class"), Some("q-pa-md active"));
        assert_eq!(node.attr("style"), Some("color: red; font-size: 12px;"));

        let node = run(r#"<div :class="['a', { b: show }]"></div>"#, &sample_ctx());
        assert_eq!(node.attr("class"), Some("a b"));
    }

    #[test]
    fn test_v_model_mapping() {
        let node = run(r#"<div><q-input v-model="name" /><q-toggle v-model="agreed" /><q-checkbox v-model="nope" /></div>"#, &sample_ctx());
        let values: Vec<_> = node.children.iter().map(|c| c.attr("value")).collect();
        assert_eq!(values, vec![Some("Ana"), Some("true"), Some("false")]);
        assert!(node.children.iter().all(|c| !c.attributes.contains_key("v-model")));
    }

    #[test]
    fn test_template_wrappers_are_transparent() {
        let node = run(
            r#"<q-list><template v-if="show"><q-item>1</q-item><q-item>2</q-item></template><template v-for="u in users"><q-item>{{ u.name }}</q-item></template></q-list>"#,
            &sample_ctx(),
        );
        assert_eq!(texts(&node), vec!["1", "2", "A", "B"]);
    }

    #[test]
    fn test_text_trimmed_and_interpolated() {
        let node = run("<p>\n   {{ msg }}, {{ name }}!  \n  <b>  </b></p>", &sample_ctx());
        assert_eq!(node.children[0].text.as_deref(), Some("Hello, Ana!"));
        assert!(node.children[1].children.is_empty());
    }

    #[test]
    fn test_v_text_replaces_children() {
        let node = run(r#"<span v-text="msg">ignored</span>"#, &sample_ctx());
        assert_eq!(node.text_content(), "Hello");
    }

    #[test]
    fn test_normalizing_twice_is_idempotent() {
        let markup = r#"<q-card class="q-pa-md" :class="{ on: show }">
            <q-btn v-for="(u, i) in users" :label="u.name" v-if="i > 0" @click="x" />
            <p v-if="hide">no</p>
            <p v-else>{{ msg }}</p>
            <q-input v-model="name" v-show="hide" />
        </q-card>"#;
        let ctx = sample_ctx();
        let once = run(markup, &ctx);
        let twice = normalize(&GenericElement::from(&once), &ctx);
        assert_eq!(once, twice);
        assert_eq!(once.children.len(), 3);
    }

    #[test]
    fn test_parse_v_for_forms() {
        let v = parse_v_for("(item, idx) in list").unwrap();
        assert_eq!((v.item, v.index, v.source), ("item", Some("idx"), "list"));
        let v = parse_v_for("row of rows.items").unwrap();
        assert_eq!((v.item, v.index, v.source), ("row", None, "rows.items"));
        assert!(parse_v_for("{ a } in list").is_err());
    }

    #[test]
    fn test_interpolate_unterminated() {
        assert_eq!(interpolate("a {{ b", &ComponentContext::new()), "a {{ b");
    }
}
