#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// An embedded expression, captured without the leading `$`.
    Expr(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub segments: Vec<Segment>,
}

impl Template {
    pub fn has_expressions(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Expr(_)))
    }

    /// The whole input was a single `{$...}` expression and nothing else.
    pub fn as_single_expression(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [Segment::Expr(e)] => Some(e),
            _ => None,
        }
    }
}

/// Split a string into literal text and embedded `{$...}` expressions.
pub fn parse_template(input: &str) -> Result<Template, TemplateError> {
    let mut segments = Vec::new();
    let mut buf = String::new();
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '{' {
            // Only treat `{ ... }` as an embedded expression if it looks like `{ $... }`.
            // Otherwise keep scanning; this avoids swallowing JSON objects in payload strings.
            let mut lookahead = chars.clone();
            while let Some(ws) = lookahead.peek() {
                if ws.is_whitespace() {
                    lookahead.next();
                } else {
                    break;
                }
            }
            if !matches!(lookahead.peek(), Some('$')) {
                buf.push('{');
                continue;
            }

            // Find the matching `}` (no nesting support).
            let mut inner = String::new();
            let mut found = false;
            for n in chars.by_ref() {
                if n == '}' {
                    found = true;
                    break;
                }
                inner.push(n);
            }
            if !found {
                return Err(TemplateError::UnclosedExpression);
            }

            let inner = inner.trim();
            // The lookahead guarantees a leading `$`; strip it for the capture.
            let capture = inner.strip_prefix('$').unwrap_or(inner);
            if capture.is_empty() {
                return Err(TemplateError::EmptyExpression);
            }
            if !buf.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut buf)));
            }
            segments.push(Segment::Expr(capture.to_string()));
        } else {
            buf.push(ch);
        }
    }

    if !buf.is_empty() {
        segments.push(Segment::Literal(buf));
    }

    Ok(Template { segments })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unclosed embedded expression (missing '}}')")]
    UnclosedExpression,
    #[error("embedded expression is empty")]
    EmptyExpression,
}
