//! Evaluation context built from a component's script block.
//!
//! The script is never executed. Props, data, computed names and method names
//! are recovered with pattern matching, and values are only taken when they
//! are constants the expression evaluator can read.

use crate::expr;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Named values visible to template expressions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentContext {
    pub props: IndexMap<String, Value>,
    pub data: IndexMap<String, Value>,
    pub computed: IndexMap<String, Value>,
    /// Method names. They are never callable from expressions.
    pub methods: Vec<String>,
    /// Loop bindings introduced by `v-for`, innermost scope wins.
    locals: IndexMap<String, Value>,
}

static PROPS_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bprops\s*:\s*[\{\[]").expect("valid regex"));
static DEFINE_PROPS_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bdefineProps\s*\(\s*[\{\[]").expect("valid regex"));
static DATA_FN_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bdata\s*(?:\(\s*\)|:\s*function\s*\(\s*\))\s*\{").expect("valid regex")
});
static DATA_ARROW_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bdata\s*:\s*\(\s*\)\s*=>\s*\(?\s*\{").expect("valid regex"));
static RETURN_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\breturn\s*\{").expect("valid regex"));
static COMPUTED_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bcomputed\s*:\s*\{").expect("valid regex"));
static METHODS_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bmethods\s*:\s*\{").expect("valid regex"));
static SETUP_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)\b(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:ref|reactive|shallowRef)\s*(?:<[^>]*>)?\s*\(")
        .expect("valid regex")
});
static SETUP_COMPUTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)\b(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*computed\s*\(")
        .expect("valid regex")
});
static PROP_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\btype\s*:\s*\[?\s*([A-Za-z]+)").expect("valid regex"));
static PROP_REQUIRED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\brequired\s*:\s*true\b").expect("valid regex"));

impl ComponentContext {
    /// Create a new, empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from the text of a `<script>` block.
    pub fn from_script(source: &str) -> Self {
        let mut ctx = Self::default();
        if source.trim().is_empty() {
            return ctx;
        }

        for pattern in [&*PROPS_START, &*DEFINE_PROPS_START] {
            if let Some(m) = pattern.find(source) {
                ctx.read_props(source, m.end() - 1);
            }
        }

        if let Some(m) = DATA_ARROW_START.find(source) {
            if let Some(body) = balanced(source, m.end() - 1) {
                ctx.read_data(body);
            }
        } else if let Some(m) = DATA_FN_START.find(source) {
            let fn_body = balanced(source, m.end() - 1).unwrap_or("");
            if let Some(ret) = RETURN_OBJECT.find(fn_body) {
                if let Some(body) = balanced(fn_body, ret.end() - 1) {
                    ctx.read_data(body);
                }
            }
        }

        if let Some(m) = COMPUTED_START.find(source) {
            if let Some(body) = balanced(source, m.end() - 1) {
                for entry in split_top_level(body) {
                    if let Some(name) = entry_key(entry) {
                        ctx.computed.insert(name.to_string(), sensible_default(name));
                    }
                }
            }
        }

        if let Some(m) = METHODS_START.find(source) {
            if let Some(body) = balanced(source, m.end() - 1) {
                ctx.methods = split_top_level(body)
                    .filter_map(entry_key)
                    .map(str::to_string)
                    .collect();
            }
        }

        for caps in SETUP_REF.captures_iter(source) {
            let (Some(name), Some(whole)) = (caps.get(1), caps.get(0)) else {
                continue;
            };
            let value = balanced(source, whole.end() - 1)
                .map(parse_value)
                .unwrap_or(Value::Null);
            ctx.data.insert(name.as_str().to_string(), value);
        }

        for caps in SETUP_COMPUTED.captures_iter(source) {
            if let Some(name) = caps.get(1) {
                ctx.computed
                    .insert(name.as_str().to_string(), sensible_default(name.as_str()));
            }
        }

        tracing::debug!(
            props = ctx.props.len(),
            data = ctx.data.len(),
            computed = ctx.computed.len(),
            methods = ctx.methods.len(),
            "built component context"
        );
        ctx
    }

    /// Resolve a name: loop bindings, then props, data and computed.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.locals
            .get(name)
            .or_else(|| self.props.get(name))
            .or_else(|| self.data.get(name))
            .or_else(|| self.computed.get(name))
    }

    /// A child scope with extra loop bindings. `self` is left untouched.
    pub fn derive_with<I>(&self, bindings: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut child = self.clone();
        child.locals.extend(bindings);
        child
    }

    /// Set a single value in the data scope.
    pub fn with_data(mut self, name: impl Into<String>, value: Value) -> Self {
        self.data.insert(name.into(), value);
        self
    }

    fn read_props(&mut self, source: &str, open: usize) {
        let Some(body) = balanced(source, open) else {
            return;
        };

        // `props: ['title', 'color']`
        if source[open..].starts_with('[') {
            for entry in split_top_level(body) {
                let name = entry.trim().trim_matches(|c| c == '\'' || c == '"');
                if !name.is_empty() {
                    self.props.insert(name.to_string(), sensible_default(name));
                }
            }
            return;
        }

        for entry in split_top_level(body) {
            let Some(name) = entry_key(entry) else {
                continue;
            };
            let definition = entry_value(entry).unwrap_or("").trim();
            let value = if definition.starts_with('{') {
                prop_from_definition(name, definition)
            } else {
                default_for_type(definition)
            };
            self.props.insert(name.to_string(), value);
        }
    }

    fn read_data(&mut self, body: &str) {
        for entry in split_top_level(body) {
            if let Some(name) = entry_key(entry) {
                let value = entry_value(entry).map(parse_value).unwrap_or(Value::Null);
                self.data.insert(name.to_string(), value);
            }
        }
    }
}

/// `{ type: String, default: 'x', required: true }`
fn prop_from_definition(name: &str, definition: &str) -> Value {
    let inner = balanced(definition, 0).unwrap_or("");
    let mut value = None;

    for entry in split_top_level(inner) {
        if entry_key(entry) == Some("default") {
            value = entry_value(entry).map(|raw| parse_value(unwrap_factory(raw)));
        }
    }

    let value = value.unwrap_or_else(|| match PROP_TYPE.captures(inner) {
        Some(caps) => caps
            .get(1)
            .map_or(Value::Null, |t| default_for_type(t.as_str())),
        None => Value::Null,
    });

    if PROP_REQUIRED.is_match(inner) && !expr::is_truthy(&value) {
        return sensible_default(name);
    }
    value
}

/// `() => []` and `() => ({ a: 1 })` become their returned expression.
fn unwrap_factory(raw: &str) -> &str {
    let raw = raw.trim();
    match raw.strip_prefix("()").map(str::trim_start) {
        Some(rest) if rest.starts_with("=>") => {
            let body = rest[2..].trim();
            body.strip_prefix('(')
                .and_then(|b| b.strip_suffix(')'))
                .unwrap_or(body)
        }
        _ => raw,
    }
}

/// Zero value for a constructor name used as a prop type.
pub fn default_for_type(type_name: &str) -> Value {
    match type_name.trim().to_ascii_lowercase().as_str() {
        "string" => Value::String(String::new()),
        "number" => expr::number(0.0),
        "boolean" => Value::Bool(false),
        "array" => Value::Array(Vec::new()),
        "object" => Value::Object(Map::new()),
        _ => Value::Null,
    }
}

/// A plausible placeholder for a value that only exists at runtime, guessed
/// from its name.
pub fn sensible_default(name: &str) -> Value {
    let lower = name.to_ascii_lowercase();
    let has = |needle: &str| lower.contains(needle);

    let text = if has("color") {
        "primary"
    } else if has("active") || has("selected") || has("disabled") {
        return Value::Bool(false);
    } else if has("label") || has("title") {
        "Label"
    } else if has("description") || has("content") {
        "Content"
    } else if has("size") {
        "md"
    } else if has("width") {
        "100%"
    } else if has("height") {
        "auto"
    } else if has("icon") {
        "icon"
    } else if matches!(lower.as_str(), "dense" | "outlined" | "flat" | "bordered") {
        return Value::Bool(false);
    } else {
        ""
    };
    Value::String(text.to_string())
}

/// Read a value written in script source. Constants are parsed, anything else
/// is kept as its source text with surrounding quotes removed.
fn parse_value(raw: &str) -> Value {
    let raw = raw.trim().trim_end_matches(';').trim();
    expr::parse_literal(raw).unwrap_or_else(|| {
        Value::String(
            raw.trim_matches(|c| c == '\'' || c == '"' || c == '`')
                .to_string(),
        )
    })
}

/// Contents between the bracket at `open` and its match, skipping strings.
fn balanced(source: &str, open: usize) -> Option<&str> {
    let bytes = source.as_bytes();
    let (opener, closer) = match bytes.get(open)? {
        b'{' => (b'{', b'}'),
        b'[' => (b'[', b']'),
        b'(' => (b'(', b')'),
        _ => return None,
    };

    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if matches!(b, b'\'' | b'"' | b'`') => quote = Some(b),
            None if b == opener => depth += 1,
            None if b == closer => {
                depth -= 1;
                if depth == 0 {
                    return source.get(open + 1..i);
                }
            }
            None => {}
        }
        i += 1;
    }
    None
}

/// Split an object or array body on commas at nesting depth zero.
fn split_top_level(body: &str) -> impl Iterator<Item = &str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in body.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '{' | '[' | '(' => depth += 1,
            '}' | ']' | ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts.into_iter().filter(|p| !p.trim().is_empty())
}

/// Key of `key: value`, `'key': value` or the shorthand `key() { ... }`.
fn entry_key(entry: &str) -> Option<&str> {
    let entry = entry.trim();
    let entry = entry.strip_prefix("async ").unwrap_or(entry).trim_start();
    let key = if entry.starts_with('\'') || entry.starts_with('"') {
        entry[1..].split(|c| c == '\'' || c == '"').next()?
    } else {
        let end = entry
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(entry.len());
        &entry[..end]
    };
    (!key.is_empty()).then_some(key)
}

fn entry_value(entry: &str) -> Option<&str> {
    let entry = entry.trim();
    let colon = entry.find(':')?;
    // A `(` before the colon means method shorthand, not a property.
    if entry[..colon].contains('(') {
        return None;
    }
    Some(entry[colon + 1..].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const OPTIONS_SCRIPT: &str = r#"
export default {
  name: 'UserCard',
  props: {
    title: String,
    count: { type: Number, default: 5 },
    tags: { type: Array, default: () => ['a', 'b'] },
    iconColor: { type: String, required: true },
    disabled: Boolean,
  },
  data() {
    const unused = 1;
    return {
      message: 'Hello, world',
      active: true,
      items: [{ id: 1 }, { id: 2 }],
      created: new Date(),
    };
  },
  computed: {
    fullLabel() { return this.message + '!'; },
    pageTitle: function () { return 'x'; },
  },
  methods: {
    save() {},
    async load() {},
  },
};
"#;

    #[test]
    fn test_options_api_props() {
        let ctx = ComponentContext::from_script(OPTIONS_SCRIPT);
        assert_eq!(ctx.props["title"], json!(""));
        assert_eq!(ctx.props["count"], json!(5));
        assert_eq!(ctx.props["tags"], json!(["a", "b"]));
        assert_eq!(ctx.props["iconColor"], json!("primary"));
        assert_eq!(ctx.props["disabled"], json!(false));
    }

    #[test]
    fn test_options_api_data() {
        let ctx = ComponentContext::from_script(OPTIONS_SCRIPT);
        assert_eq!(ctx.data["message"], json!("Hello, world"));
        assert_eq!(ctx.data["active"], json!(true));
        assert_eq!(ctx.data["items"], json!([{"id": 1}, {"id": 2}]));
        assert_eq!(ctx.data["created"], json!("new Date()"));
        assert!(!ctx.data.contains_key("unused"));
    }

    #[test]
    fn test_computed_and_methods() {
        let ctx = ComponentContext::from_script(OPTIONS_SCRIPT);
        assert_eq!(ctx.computed["fullLabel"], json!("Label"));
        assert_eq!(ctx.computed["pageTitle"], json!("Label"));
        assert_eq!(ctx.methods, vec!["save", "load"]);
    }

    #[test]
    fn test_arrow_data_and_array_props() {
        let script = "export default { props: ['color', 'size'], data: () => ({ open: false, n: 2 }) }";
        let ctx = ComponentContext::from_script(script);
        assert_eq!(ctx.props["color"], json!("primary"));
        assert_eq!(ctx.props["size"], json!("md"));
        assert_eq!(ctx.data["open"], json!(false));
        assert_eq!(ctx.data["n"], json!(2));
    }

    #[test]
    fn test_script_setup_refs() {
        let script = r#"
import { ref, computed } from 'vue'
const props = defineProps({ label: { type: String, default: 'Send' } })
const visible = ref(true)
const rows = ref<number[]>([1, 2])
const total = computed(() => rows.value.length)
"#;
        let ctx = ComponentContext::from_script(script);
        assert_eq!(ctx.props["label"], json!("Send"));
        assert_eq!(ctx.data["visible"], json!(true));
        assert_eq!(ctx.data["rows"], json!([1, 2]));
        assert_eq!(ctx.computed["total"], json!(""));
    }

    #[test]
    fn test_lookup_order_and_derive() {
        let mut ctx = ComponentContext::new().with_data("item", json!("data"));
        ctx.props.insert("item".into(), json!("prop"));
        assert_eq!(ctx.lookup("item"), Some(&json!("prop")));

        let child = ctx.derive_with([("item".to_string(), json!(1))]);
        assert_eq!(child.lookup("item"), Some(&json!(1)));
        assert_eq!(ctx.lookup("item"), Some(&json!("prop")));
    }

    #[test]
    fn test_sensible_defaults() {
        assert_eq!(sensible_default("bgColor"), json!("primary"));
        assert_eq!(sensible_default("isSelected"), json!(false));
        assert_eq!(sensible_default("cardTitle"), json!("Label"));
        assert_eq!(sensible_default("dense"), json!(false));
        assert_eq!(sensible_default("whatever"), json!(""));
    }

    #[test]
    fn test_empty_script() {
        assert_eq!(ComponentContext::from_script("  "), ComponentContext::default());
    }
}
