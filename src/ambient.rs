use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{ContextError, Result};

/// A value that can be carried as ambient context.
///
/// `Patch` is the partial form a caller supplies when entering a scope;
/// `merge` applies it shallowly, field by field, and never mutates `self`.
pub trait Ambient: Clone + fmt::Debug + fmt::Display + PartialEq {
    type Patch;

    fn merge(&self, patch: &Self::Patch) -> Self;
}

/// The bundled ambient value: one numeric field and one string field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AmbientContext {
    pub a: i64,
    pub s: String,
}

impl AmbientContext {
    pub fn new(a: i64, s: impl Into<String>) -> Self {
        Self { a, s: s.into() }
    }

    /// Parse a JSON object; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        from_json_object(json)
    }
}

/// Deserialize `json` only if it is an object, so the positional (array)
/// form serde accepts for structs is refused.
fn from_json_object<T: serde::de::DeserializeOwned>(json: &str) -> Result<T> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| ContextError::Parse(e.to_string()))?;
    if !value.is_object() {
        return Err(ContextError::Parse(format!("expected a JSON object, got `{value}`")));
    }
    serde_json::from_value(value).map_err(|e| ContextError::Parse(e.to_string()))
}

impl fmt::Display for AmbientContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{a:{},s:{:?}}}", self.a, self.s)
    }
}

/// Partial `AmbientContext`; absent fields keep the enclosing value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub a: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<String>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn a(mut self, a: i64) -> Self {
        self.a = Some(a);
        self
    }

    pub fn s(mut self, s: impl Into<String>) -> Self {
        self.s = Some(s.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_none() && self.s.is_none()
    }

    /// Parse `{"a": 1}`, `{"s": "x"}` or both. Unknown keys are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        from_json_object(json)
    }
}

impl From<AmbientContext> for Overrides {
    fn from(ctx: AmbientContext) -> Self {
        Self { a: Some(ctx.a), s: Some(ctx.s) }
    }
}

impl Ambient for AmbientContext {
    type Patch = Overrides;

    fn merge(&self, patch: &Overrides) -> Self {
        Self {
            a: patch.a.unwrap_or(self.a),
            s: patch.s.clone().unwrap_or_else(|| self.s.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn merge_is_shallow_and_partial() {
        let base = AmbientContext::new(1, "hello");
        assert_eq!(base.merge(&Overrides::new().a(7)), AmbientContext::new(7, "hello"));
        assert_eq!(base.merge(&Overrides::new().s("x")), AmbientContext::new(1, "x"));
        assert_eq!(base.merge(&Overrides::new()), base);
        // the base snapshot is untouched
        assert_eq!(base, AmbientContext::new(1, "hello"));
    }

    #[test]
    fn overrides_from_json() {
        assert_eq!(Overrides::from_json(r#"{"a":3}"#).unwrap(), Overrides::new().a(3));
        assert_eq!(
            Overrides::from_json(r#"{"a":2,"s":"world"}"#).unwrap(),
            Overrides::new().a(2).s("world")
        );
        assert!(Overrides::from_json("{}").unwrap().is_empty());
    }

    #[test]
    fn overrides_from_json_rejects_garbage() {
        assert!(matches!(Overrides::from_json("{a:1"), Err(ContextError::Parse(_))));
        assert!(matches!(Overrides::from_json(r#"{"b":1}"#), Err(ContextError::Parse(_))));
        assert!(matches!(Overrides::from_json(r#"{"a":"one"}"#), Err(ContextError::Parse(_))));
    }

    #[test]
    fn ambient_from_json_rejects_unknown_keys_and_arrays() {
        assert_eq!(AmbientContext::from_json(r#"{"a":4}"#).unwrap(), AmbientContext::new(4, ""));
        assert!(matches!(AmbientContext::from_json(r#"{"b":1}"#), Err(ContextError::Parse(_))));
        assert!(matches!(AmbientContext::from_json(r#"[7,"x"]"#), Err(ContextError::Parse(_))));
        assert!(matches!(AmbientContext::from_json("[7]"), Err(ContextError::Parse(_))));
    }

    #[test]
    fn overrides_from_json_rejects_arrays() {
        assert!(matches!(Overrides::from_json(r#"[7,"x"]"#), Err(ContextError::Parse(_))));
        assert!(matches!(Overrides::from_json("3"), Err(ContextError::Parse(_))));
    }

    #[test]
    fn ambient_display() {
        assert_eq!(AmbientContext::new(2, "world").to_string(), r#"{a:2,s:"world"}"#);
        assert_eq!(AmbientContext::default().to_string(), r#"{a:0,s:""}"#);
    }
}
