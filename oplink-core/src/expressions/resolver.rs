use crate::expressions::template::{parse_template, Segment};
use crate::outcome::{self, Outcome};
use crate::types::AnyValue;

/// External store of values for full expressions.
///
/// Keys are `"<linkName>.<expression-without-$>"`; the resolver never
/// evaluates an expression itself, it only asks this collaborator.
pub trait ExpressionLookup {
    fn resolve(&self, key: &str) -> Outcome<AnyValue>;
}

/// Resolve one raw link parameter or body value.
///
/// String literals that are themselves JSON/YAML documents are re-parsed
/// structurally first. Then every string leaf is classified: a full
/// expression (the entire string, braces stripped, begins with `$`) is
/// replaced by the looked-up value; embedded `{$...}` occurrences inside a
/// longer string are rewritten in place to `$(<linkName>.<capture>)` markers
/// for the downstream value generator; everything else stays literal.
pub fn resolve_value(
    raw: &AnyValue,
    link_name: &str,
    lookup: &dyn ExpressionLookup,
) -> Outcome<AnyValue> {
    let value = match raw {
        // Full expressions must not be mistaken for YAML flow mappings.
        AnyValue::String(s) if full_expression(s.trim()).is_none() => {
            parse_structured(s).unwrap_or_else(|| raw.clone())
        }
        other => other.clone(),
    };
    walk(&value, link_name, lookup)
}

fn walk(value: &AnyValue, link_name: &str, lookup: &dyn ExpressionLookup) -> Outcome<AnyValue> {
    match value {
        AnyValue::Null | AnyValue::Bool(_) | AnyValue::Number(_) => Outcome::Ok(value.clone()),
        AnyValue::String(s) => resolve_string(s, link_name, lookup),
        AnyValue::Array(items) => {
            outcome::try_map(items, |v| walk(v, link_name, lookup)).map(AnyValue::Array)
        }
        AnyValue::Object(map) => {
            let entries = outcome::try_map(map, |(k, v)| {
                walk(v, link_name, lookup).map(|resolved| (k.clone(), resolved))
            });
            entries.map(|pairs| AnyValue::Object(pairs.into_iter().collect()))
        }
    }
}

fn resolve_string(s: &str, link_name: &str, lookup: &dyn ExpressionLookup) -> Outcome<AnyValue> {
    if let Some(expr) = full_expression(s.trim()) {
        return lookup
            .resolve(&format!("{link_name}.{expr}"))
            .context(format!("link '{link_name}'"));
    }

    let template = match parse_template(s) {
        Ok(t) => t,
        Err(e) => return Outcome::invalid(format!("link '{link_name}': {e}")),
    };
    if let Some(expr) = template.as_single_expression() {
        return lookup
            .resolve(&format!("{link_name}.{expr}"))
            .context(format!("link '{link_name}'"));
    }
    if !template.has_expressions() {
        return Outcome::Ok(AnyValue::String(s.to_string()));
    }

    // Rewrite embedded expressions to deferred-dereference markers, keeping
    // the surrounding literal text untouched.
    let mut out = String::new();
    for segment in template.segments {
        match segment {
            Segment::Literal(text) => out.push_str(&text),
            Segment::Expr(capture) => out.push_str(&format!("$({link_name}.{capture})")),
        }
    }
    Outcome::Ok(AnyValue::String(out))
}

/// The entire string, with at most one `{...}` wrapper stripped, is a `$...`
/// expression.
fn full_expression(trimmed: &str) -> Option<&str> {
    if let Some(rest) = trimmed.strip_prefix('$') {
        return Some(rest);
    }
    let inner = trimmed.strip_prefix('{')?.strip_suffix('}')?.trim();
    let rest = inner.strip_prefix('$')?;
    if rest.contains('{') || rest.contains('}') {
        return None;
    }
    Some(rest)
}

/// Re-parse a string literal that itself encodes a structured document.
///
/// JSON is attempted first; `{`/`[`-prefixed strings fall back to YAML. A
/// parse that yields another plain string keeps the original literal.
fn parse_structured(s: &str) -> Option<AnyValue> {
    let trimmed = s.trim_start();
    if let Ok(value) = serde_json::from_str::<AnyValue>(s) {
        if !value.is_string() {
            return Some(value);
        }
    }
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value) = serde_yaml::from_str::<AnyValue>(s) {
            if !value.is_string() {
                return Some(value);
            }
        }
    }
    None
}
