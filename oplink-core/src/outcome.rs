use crate::error::LinkError;

/// A caught runtime fault, boxed so callers stay generic over its origin.
pub type Fault = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Three-way result of a fallible pipeline stage.
///
/// `Invalid` carries a diagnostic for input that violates a documented rule;
/// `Faulted` wraps an error caught from a collaborator (value coercion, path
/// generation) instead of letting it propagate raw.
#[derive(Debug)]
pub enum Outcome<T> {
    Ok(T),
    Invalid(String),
    Faulted(Fault),
}

impl<T> Outcome<T> {
    pub fn invalid(message: impl Into<String>) -> Self {
        Outcome::Invalid(message.into())
    }

    pub fn faulted<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Outcome::Faulted(Box::new(err))
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ok(v) => Outcome::Ok(f(v)),
            Outcome::Invalid(m) => Outcome::Invalid(m),
            Outcome::Faulted(e) => Outcome::Faulted(e),
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Outcome<U>) -> Outcome<U> {
        match self {
            Outcome::Ok(v) => f(v),
            Outcome::Invalid(m) => Outcome::Invalid(m),
            Outcome::Faulted(e) => Outcome::Faulted(e),
        }
    }

    /// Prefix the diagnostic of an `Invalid` outcome; `Ok` and `Faulted` pass through.
    pub fn context(self, ctx: impl AsRef<str>) -> Outcome<T> {
        match self {
            Outcome::Invalid(m) => Outcome::Invalid(format!("{}: {m}", ctx.as_ref())),
            other => other,
        }
    }

    pub fn into_result(self) -> Result<T, LinkError> {
        match self {
            Outcome::Ok(v) => Ok(v),
            Outcome::Invalid(m) => Err(LinkError::Validation(m)),
            Outcome::Faulted(e) => Err(LinkError::Fault { source: e }),
        }
    }
}

/// Fold outcomes into the first failure or all values.
pub fn collect<T>(items: impl IntoIterator<Item = Outcome<T>>) -> Outcome<Vec<T>> {
    let mut out = Vec::new();
    for item in items {
        match item {
            Outcome::Ok(v) => out.push(v),
            Outcome::Invalid(m) => return Outcome::Invalid(m),
            Outcome::Faulted(e) => return Outcome::Faulted(e),
        }
    }
    Outcome::Ok(out)
}

/// Map each item through a fallible function, stopping at the first failure.
pub fn try_map<T, U>(
    items: impl IntoIterator<Item = T>,
    mut f: impl FnMut(T) -> Outcome<U>,
) -> Outcome<Vec<U>> {
    collect(items.into_iter().map(&mut f))
}
