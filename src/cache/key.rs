//! Cache key generation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Derives keys of the form `<namespace>:<operation>:<canonical JSON args>`.
///
/// Object keys are sorted recursively before serialization, so structurally
/// equal arguments always yield the same key.
pub struct CacheKeyGenerator {
    namespace: String,
}

impl CacheKeyGenerator {
    pub fn new() -> Self {
        Self {
            namespace: "gemini".into(),
        }
    }

    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = ns.into();
        self
    }

    pub fn generate(&self, operation: &str, args: &[Value]) -> CacheKey {
        let canonical = canonicalize(Value::Array(args.to_vec())).to_string();
        CacheKey::new(format!("{}:{}:{}", self.namespace, operation, canonical))
    }

    /// Same as [`generate`](Self::generate) for any serializable argument tuple.
    pub fn generate_from<T: Serialize>(&self, operation: &str, args: &T) -> CacheKey {
        let canonical = serde_json::to_value(args)
            .map(|v| canonicalize(v).to_string())
            .unwrap_or_default();
        CacheKey::new(format!("{}:{}:{}", self.namespace, operation, canonical))
    }

    /// Prefix shared by every key of one operation, for prefix scans.
    pub fn operation_prefix(&self, operation: &str) -> String {
        format!("{}:{}:", self.namespace, operation)
    }
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

impl Default for CacheKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_key_format() {
        let key = CacheKeyGenerator::new().generate("courseContent", &[json!("Databases"), json!("SQL")]);
        assert_eq!(key.as_str(), r#"gemini:courseContent:["Databases","SQL"]"#);
    }

    #[test]
    fn test_structural_equality_ignores_insertion_order() {
        let gen = CacheKeyGenerator::new();
        let mut a = HashMap::new();
        a.insert("b", 2);
        a.insert("a", 1);
        let b = json!({"a": 1, "b": 2});
        assert_eq!(gen.generate_from("op", &(a,)), gen.generate_from("op", &(b,)));
    }

    #[test]
    fn test_argument_count_changes_key() {
        let gen = CacheKeyGenerator::new();
        let one = gen.generate("quiz", &[json!("Algebra")]);
        let two = gen.generate("quiz", &[json!("Algebra"), json!("intro")]);
        assert_ne!(one, two);
        assert!(one.as_str().starts_with(&gen.operation_prefix("quiz")));
    }
}
