//! Sandboxed evaluation of directive expressions.
//!
//! Supported grammar, loosest binding first:
//!
//! ```text
//! ternary    := or ( "?" ternary ":" ternary )?
//! or         := and ( "||" and )*
//! and        := compare ( "&&" compare )*
//! compare    := unary ( ("===" | "!==" | "==" | "!=" | ">=" | "<=" | ">" | "<") unary )?
//! unary      := "!" unary | "-" unary | primary
//! primary    := number | string | true | false | null | undefined
//!             | ident ( "." ident )?
//!             | "[" items "]" | "{" entries "}" | "(" ternary ")"
//! ```
//!
//! Identifiers resolve only against the supplied [`ComponentContext`]. There
//! are no calls, assignments or globals. Anything outside the grammar is
//! returned as the literal expression text.

use crate::context::ComponentContext;
use crate::error::{DirectiveError, DirectiveResult};

/// Deepest nesting of sub-expressions the parser follows. Each grouping,
/// unary operator and nested ternary counts one level.
pub const MAX_EXPRESSION_DEPTH: usize = 256;
use serde_json::{Map, Number, Value};

/// Evaluate an expression to a value.
///
/// A bare identifier missing from the context, or an expression outside the
/// supported grammar, evaluates to the expression text itself.
pub fn evaluate(expr: &str, ctx: &ComponentContext) -> Value {
    let trimmed = expr.trim();
    match parse_expression(trimmed) {
        Ok(Expr::Ident(name)) => ctx
            .lookup(&name)
            .cloned()
            .unwrap_or_else(|| Value::String(trimmed.to_string())),
        Ok(ast) => ast.eval(ctx),
        Err(err) => {
            tracing::debug!(code = %err.code, "treating expression as literal: {}", err);
            Value::String(trimmed.to_string())
        }
    }
}

/// Evaluate an expression without the literal fallback. Unknown identifiers
/// are `null`; syntax outside the grammar is an error.
pub fn try_evaluate(expr: &str, ctx: &ComponentContext) -> DirectiveResult<Value> {
    parse_expression(expr.trim()).map(|ast| ast.eval(ctx))
}

/// Evaluate an expression for truthiness. Unknown identifiers are falsy and
/// unparseable expressions are `false`.
pub fn evaluate_condition(expr: &str, ctx: &ComponentContext) -> bool {
    match parse_expression(expr.trim()) {
        Ok(ast) => is_truthy(&ast.eval(ctx)),
        Err(err) => {
            tracing::debug!(code = %err.code, "condition evaluates to false: {}", err);
            false
        }
    }
}

/// Parse a constant such as `[1, 2]`, `{ a: 'x' }` or `'text'` without any
/// context. Returns `None` for anything that references an identifier.
pub fn parse_literal(src: &str) -> Option<Value> {
    let ast = parse_expression(src.trim()).ok()?;
    ast.is_constant().then(|| ast.eval(&ComponentContext::default()))
}

/// JavaScript truthiness.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// String form used when a bound value is written into an attribute.
/// Strings are used as-is, everything else is serialized as JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Display form used for `{{ }}` interpolation.
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => stringify(other),
    }
}

/// Build a JSON number, preferring an integer representation.
pub fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::Number(Number::from(value as i64))
    } else {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Str(String),
    Ident(String),
    Punct(&'static str),
}

const PUNCTUATION: &[&str] = &[
    "===", "!==", "==", "!=", ">=", "<=", "&&", "||", ">", "<", "!", "?", ":", ".", ",", "(",
    ")", "[", "]", "{", "}", "-",
];

fn tokenize(src: &str) -> DirectiveResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = src;

    while let Some(c) = rest.chars().next() {
        if c.is_whitespace() {
            rest = &rest[c.len_utf8()..];
            continue;
        }

        if c == '\'' || c == '"' {
            let body = &rest[1..];
            let end = body
                .find(c)
                .ok_or_else(|| DirectiveError::unsupported("Unterminated string", src))?;
            tokens.push(Token::Str(body[..end].to_string()));
            rest = &body[end + 1..];
            continue;
        }

        if c.is_ascii_digit() {
            let len = rest
                .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
                .unwrap_or(rest.len());
            let value = rest[..len]
                .parse::<f64>()
                .map_err(|_| DirectiveError::unsupported("Invalid number", src))?;
            tokens.push(Token::Num(value));
            rest = &rest[len..];
            continue;
        }

        if c.is_alphabetic() || c == '_' || c == '$' {
            let len = rest
                .find(|ch: char| !(ch.is_alphanumeric() || ch == '_' || ch == '$'))
                .unwrap_or(rest.len());
            tokens.push(Token::Ident(rest[..len].to_string()));
            rest = &rest[len..];
            continue;
        }

        match PUNCTUATION.iter().find(|p| rest.starts_with(**p)) {
            Some(p) => {
                tokens.push(Token::Punct(p));
                rest = &rest[p.len()..];
            }
            None => {
                return Err(DirectiveError::unsupported(
                    format!("Unexpected character `{}`", c),
                    src,
                ))
            }
        }
    }

    Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CompareOp {
    StrictEq,
    StrictNe,
    LooseEq,
    LooseNe,
    Ge,
    Le,
    Gt,
    Lt,
}

impl CompareOp {
    fn from_punct(p: &str) -> Option<Self> {
        Some(match p {
            "===" => Self::StrictEq,
            "!==" => Self::StrictNe,
            "==" => Self::LooseEq,
            "!=" => Self::LooseNe,
            ">=" => Self::Ge,
            "<=" => Self::Le,
            ">" => Self::Gt,
            "<" => Self::Lt,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal(Value),
    Ident(String),
    Member(String, String),
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
    Not(Box<Expr>),
    Neg(Box<Expr>),
    Compare(CompareOp, Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
}

impl Expr {
    fn eval(&self, ctx: &ComponentContext) -> Value {
        match self {
            Expr::Literal(v) => v.clone(),
            Expr::Ident(name) => ctx.lookup(name).cloned().unwrap_or(Value::Null),
            Expr::Member(object, field) => match ctx.lookup(object) {
                Some(Value::Object(map)) => map.get(field).cloned().unwrap_or(Value::Null),
                Some(Value::Array(items)) if field == "length" => number(items.len() as f64),
                Some(Value::String(s)) if field == "length" => number(s.chars().count() as f64),
                _ => Value::Null,
            },
            Expr::Array(items) => Value::Array(items.iter().map(|e| e.eval(ctx)).collect()),
            Expr::Object(entries) => {
                let mut map = Map::new();
                for (key, expr) in entries {
                    map.insert(key.clone(), expr.eval(ctx));
                }
                Value::Object(map)
            }
            Expr::Not(inner) => Value::Bool(!is_truthy(&inner.eval(ctx))),
            Expr::Neg(inner) => number(-to_number(&inner.eval(ctx))),
            Expr::Compare(op, lhs, rhs) => Value::Bool(compare(*op, &lhs.eval(ctx), &rhs.eval(ctx))),
            Expr::And(lhs, rhs) => {
                let left = lhs.eval(ctx);
                if is_truthy(&left) {
                    rhs.eval(ctx)
                } else {
                    left
                }
            }
            Expr::Or(lhs, rhs) => {
                let left = lhs.eval(ctx);
                if is_truthy(&left) {
                    left
                } else {
                    rhs.eval(ctx)
                }
            }
            Expr::Ternary(cond, then, otherwise) => {
                if is_truthy(&cond.eval(ctx)) {
                    then.eval(ctx)
                } else {
                    otherwise.eval(ctx)
                }
            }
        }
    }

    fn is_constant(&self) -> bool {
        match self {
            Expr::Literal(_) => true,
            Expr::Ident(_) | Expr::Member(..) => false,
            Expr::Array(items) => items.iter().all(Expr::is_constant),
            Expr::Object(entries) => entries.iter().all(|(_, e)| e.is_constant()),
            Expr::Not(e) | Expr::Neg(e) => e.is_constant(),
            Expr::Compare(_, a, b) | Expr::And(a, b) | Expr::Or(a, b) => {
                a.is_constant() && b.is_constant()
            }
            Expr::Ternary(a, b, c) => a.is_constant() && b.is_constant() && c.is_constant(),
        }
    }
}

fn parse_expression(src: &str) -> DirectiveResult<Expr> {
    if src.is_empty() {
        return Err(DirectiveError::unsupported("Empty expression", src));
    }
    let tokens = tokenize(src)?;
    let mut parser = ExprParser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
        src,
    };
    let expr = parser.ternary()?;
    if parser.pos != tokens.len() {
        return Err(DirectiveError::unsupported("Unexpected trailing tokens", src));
    }
    Ok(expr)
}

struct ExprParser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
    src: &'t str,
}

impl<'t> ExprParser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, punct: &str) -> bool {
        if matches!(self.peek(), Some(Token::Punct(p)) if *p == punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: &str) -> DirectiveResult<()> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(self.error(format!("Expected `{}`", punct)))
        }
    }

    fn error(&self, message: impl Into<String>) -> DirectiveError {
        DirectiveError::unsupported(message, self.src)
    }

    fn enter(&mut self) -> DirectiveResult<()> {
        self.depth += 1;
        if self.depth > MAX_EXPRESSION_DEPTH {
            return Err(DirectiveError::too_deep(self.src));
        }
        Ok(())
    }

    fn ternary(&mut self) -> DirectiveResult<Expr> {
        self.enter()?;
        let expr = self.ternary_inner();
        self.depth -= 1;
        expr
    }

    fn ternary_inner(&mut self) -> DirectiveResult<Expr> {
        let cond = self.or()?;
        if !self.eat("?") {
            return Ok(cond);
        }
        let then = self.ternary()?;
        self.expect(":")?;
        let otherwise = self.ternary()?;
        Ok(Expr::Ternary(Box::new(cond), Box::new(then), Box::new(otherwise)))
    }

    fn or(&mut self) -> DirectiveResult<Expr> {
        let mut lhs = self.and()?;
        while self.eat("||") {
            let rhs = self.and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> DirectiveResult<Expr> {
        let mut lhs = self.compare()?;
        while self.eat("&&") {
            let rhs = self.compare()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn compare(&mut self) -> DirectiveResult<Expr> {
        let lhs = self.unary()?;
        let op = match self.peek() {
            Some(Token::Punct(p)) => CompareOp::from_punct(p),
            _ => None,
        };
        match op {
            Some(op) => {
                self.pos += 1;
                let rhs = self.unary()?;
                Ok(Expr::Compare(op, Box::new(lhs), Box::new(rhs)))
            }
            None => Ok(lhs),
        }
    }

    fn unary(&mut self) -> DirectiveResult<Expr> {
        self.enter()?;
        let expr = self.unary_inner();
        self.depth -= 1;
        expr
    }

    fn unary_inner(&mut self) -> DirectiveResult<Expr> {
        if self.eat("!") {
            return Ok(Expr::Not(Box::new(self.unary()?)));
        }
        if self.eat("-") {
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> DirectiveResult<Expr> {
        let token = self
            .peek()
            .ok_or_else(|| self.error("Unexpected end of expression"))?;
        self.pos += 1;

        match token {
            Token::Num(n) => Ok(Expr::Literal(number(*n))),
            Token::Str(s) => Ok(Expr::Literal(Value::String(s.clone()))),
            Token::Ident(name) => Ok(match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" | "undefined" => Expr::Literal(Value::Null),
                _ if self.eat(".") => match self.peek() {
                    Some(Token::Ident(field)) => {
                        self.pos += 1;
                        Expr::Member(name.clone(), field.clone())
                    }
                    _ => return Err(self.error("Expected property name after `.`")),
                },
                _ => Expr::Ident(name.clone()),
            }),
            Token::Punct("(") => {
                let inner = self.ternary()?;
                self.expect(")")?;
                Ok(inner)
            }
            Token::Punct("[") => {
                let mut items = Vec::new();
                while !self.eat("]") {
                    items.push(self.ternary()?);
                    if !self.eat(",") {
                        self.expect("]")?;
                        break;
                    }
                }
                Ok(Expr::Array(items))
            }
            Token::Punct("{") => {
                let mut entries = Vec::new();
                while !self.eat("}") {
                    let key = match self.peek() {
                        Some(Token::Ident(k)) | Some(Token::Str(k)) => k.clone(),
                        _ => return Err(self.error("Expected object key")),
                    };
                    self.pos += 1;
                    let value = if self.eat(":") {
                        self.ternary()?
                    } else {
                        Expr::Ident(key.clone())
                    };
                    entries.push((key, value));
                    if !self.eat(",") {
                        self.expect("}")?;
                        break;
                    }
                }
                Ok(Expr::Object(entries))
            }
            Token::Punct(p) => Err(self.error(format!("Unexpected `{}`", p))),
        }
    }
}

fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        // Distinct arrays/objects are never identical.
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => false,
        _ => a == b,
    }
}

fn loose_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => {
            strict_equals(a, b)
        }
        _ => to_number(a) == to_number(b),
    }
}

fn compare(op: CompareOp, a: &Value, b: &Value) -> bool {
    match op {
        CompareOp::StrictEq => strict_equals(a, b),
        CompareOp::StrictNe => !strict_equals(a, b),
        CompareOp::LooseEq => loose_equals(a, b),
        CompareOp::LooseNe => !loose_equals(a, b),
        _ => {
            let ordering = match (a, b) {
                (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
                _ => to_number(a).partial_cmp(&to_number(b)),
            };
            match (op, ordering) {
                (_, None) => false,
                (CompareOp::Ge, Some(o)) => o.is_ge(),
                (CompareOp::Le, Some(o)) => o.is_le(),
                (CompareOp::Gt, Some(o)) => o.is_gt(),
                (CompareOp::Lt, Some(o)) => o.is_lt(),
                _ => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ctx() -> ComponentContext {
        let mut ctx = ComponentContext::default();
        ctx.props.insert("color".into(), json!("primary"));
        ctx.props.insert("shared".into(), json!("from-props"));
        ctx.data.insert("shared".into(), json!("from-data"));
        ctx.data.insert("count".into(), json!(3));
        ctx.data.insert("active".into(), json!(true));
        ctx.data.insert("empty".into(), json!(""));
        ctx.data.insert("user".into(), json!({ "name": "Ana", "age": 30 }));
        ctx.data.insert("items".into(), json!([1, 2, 3]));
        ctx.computed.insert("label".into(), json!("Label"));
        ctx
    }

    #[test]
    fn test_identifier_lookup_precedence() {
        let ctx = ctx();
        assert_eq!(evaluate("shared", &ctx), json!("from-props"));
        assert_eq!(evaluate("count", &ctx), json!(3));
        assert_eq!(evaluate("label", &ctx), json!("Label"));
    }

    #[test]
    fn test_unknown_identifier_is_literal() {
        assert_eq!(evaluate("nothingHere", &ctx()), json!("nothingHere"));
        assert!(!evaluate_condition("nothingHere", &ctx()));
    }

    #[test]
    fn test_member_access_one_level() {
        let ctx = ctx();
        assert_eq!(evaluate("user.name", &ctx), json!("Ana"));
        assert_eq!(evaluate("items.length", &ctx), json!(3));
        assert_eq!(evaluate("user.missing", &ctx), Value::Null);
        // Deeper chains are outside the grammar.
        assert_eq!(evaluate("user.name.first", &ctx), json!("user.name.first"));
    }

    #[test]
    fn test_ternary() {
        let ctx = ctx();
        assert_eq!(evaluate("active ? 'primary' : 'grey'", &ctx), json!("primary"));
        assert_eq!(evaluate("empty ? 'a' : count > 2 ? 'b' : 'c'", &ctx), json!("b"));
    }

    #[test]
    fn test_comparisons() {
        let ctx = ctx();
        assert!(evaluate_condition("count === 3", &ctx));
        assert!(!evaluate_condition("count === '3'", &ctx));
        assert!(evaluate_condition("count == '3'", &ctx));
        assert!(evaluate_condition("count !== 4", &ctx));
        assert!(evaluate_condition("count >= 3 && count <= 3", &ctx));
        assert!(evaluate_condition("color === 'primary'", &ctx));
        assert!(evaluate_condition("user.age > 18", &ctx));
        assert!(!evaluate_condition("user.name < 3", &ctx));
    }

    #[test]
    fn test_logical_short_circuit_values() {
        let ctx = ctx();
        assert_eq!(evaluate("empty || 'fallback'", &ctx), json!("fallback"));
        assert_eq!(evaluate("active && color", &ctx), json!("primary"));
        assert_eq!(evaluate("empty && color", &ctx), json!(""));
        assert!(evaluate_condition("!empty", &ctx));
        assert!(evaluate_condition("!!active", &ctx));
        assert!(evaluate_condition("missing || active", &ctx));
    }

    #[test]
    fn test_literals() {
        let ctx = ctx();
        assert_eq!(evaluate("[1, 2, 3]", &ctx), json!([1, 2, 3]));
        assert_eq!(evaluate("{ active: active, 'x-y': 1 }", &ctx), json!({"active": true, "x-y": 1}));
        assert_eq!(evaluate("-1.5", &ctx), json!(-1.5));
        assert_eq!(evaluate("'Go'", &ctx), json!("Go"));
    }

    #[test]
    fn test_outside_grammar_is_literal() {
        let ctx = ctx();
        assert_eq!(evaluate("doThing()", &ctx), json!("doThing()"));
        assert_eq!(evaluate("count + 1", &ctx), json!("count + 1"));
        assert_eq!(evaluate("a = 1", &ctx), json!("a = 1"));
        assert!(!evaluate_condition("window.alert(1)", &ctx));
    }

    #[test]
    fn test_no_ambient_globals() {
        let ctx = ComponentContext::default();
        assert_eq!(evaluate("window", &ctx), json!("window"));
        assert!(!evaluate_condition("process", &ctx));
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let ctx = ctx();
        let deep = format!("{}active{}", "(".repeat(50_000), ")".repeat(50_000));
        assert!(!evaluate_condition(&deep, &ctx));
        let err = try_evaluate(&deep, &ctx).unwrap_err();
        assert_eq!(err.code, crate::error::DirectiveErrorCode::NestingTooDeep);

        let negations = format!("{}active", "!".repeat(50_000));
        assert_eq!(
            try_evaluate(&negations, &ctx).unwrap_err().code,
            crate::error::DirectiveErrorCode::NestingTooDeep
        );

        let reasonable = format!("{}active{}", "(".repeat(64), ")".repeat(64));
        assert!(evaluate_condition(&reasonable, &ctx));
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(parse_literal("[{ id: 1 }, { id: 2 }]"), Some(json!([{"id": 1}, {"id": 2}])));
        assert_eq!(parse_literal("'text'"), Some(json!("text")));
        assert_eq!(parse_literal("someVar"), None);
    }

    #[test]
    fn test_stringify() {
        assert_eq!(stringify(&json!("x")), "x");
        assert_eq!(stringify(&json!(2)), "2");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&json!([1, 2])), "[1,2]");
        assert_eq!(display(&Value::Null), "");
    }
}
