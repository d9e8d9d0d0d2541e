//! Read-only views over dictionary-shaped configuration trees.
//!
//! Builders never depend on a particular document format. They read through
//! [`ConfigValue`], which is implemented for both `serde_yaml::Value` and
//! `serde_json::Value`, and through [`Node`], which remembers the dotted path
//! of the value so every error can name where it happened.

use super::error::BuildError;

// ============================================================================
// ConfigValue
// ============================================================================

/// Minimal interface a configuration tree must offer to the builders:
/// key lookup, nested subscripts and scalar accessors.
pub trait ConfigValue: Sized {
    /// Look up `key` if this value is a mapping.
    fn get(&self, key: &str) -> Option<&Self>;

    /// Whether this value is an explicit null.
    fn is_null(&self) -> bool;

    fn as_str(&self) -> Option<&str>;

    fn as_f64(&self) -> Option<f64>;

    fn as_u64(&self) -> Option<u64>;

    fn as_bool(&self) -> Option<bool>;

    /// Elements of this value if it is a sequence.
    fn as_sequence(&self) -> Option<&[Self]>;

    /// Short description of the value kind for error messages.
    fn kind(&self) -> &'static str;
}

impl ConfigValue for serde_yaml::Value {
    fn get(&self, key: &str) -> Option<&Self> {
        serde_yaml::Value::get(self, key)
    }

    fn is_null(&self) -> bool {
        serde_yaml::Value::is_null(self)
    }

    fn as_str(&self) -> Option<&str> {
        serde_yaml::Value::as_str(self)
    }

    fn as_f64(&self) -> Option<f64> {
        serde_yaml::Value::as_f64(self)
    }

    fn as_u64(&self) -> Option<u64> {
        serde_yaml::Value::as_u64(self)
    }

    fn as_bool(&self) -> Option<bool> {
        serde_yaml::Value::as_bool(self)
    }

    fn as_sequence(&self) -> Option<&[Self]> {
        serde_yaml::Value::as_sequence(self).map(|seq| seq.as_slice())
    }

    fn kind(&self) -> &'static str {
        match self {
            serde_yaml::Value::Null => "null",
            serde_yaml::Value::Bool(_) => "boolean",
            serde_yaml::Value::Number(_) => "number",
            serde_yaml::Value::String(_) => "string",
            serde_yaml::Value::Sequence(_) => "sequence",
            serde_yaml::Value::Mapping(_) => "mapping",
            serde_yaml::Value::Tagged(_) => "tagged value",
        }
    }
}

impl ConfigValue for serde_json::Value {
    fn get(&self, key: &str) -> Option<&Self> {
        serde_json::Value::get(self, key)
    }

    fn is_null(&self) -> bool {
        serde_json::Value::is_null(self)
    }

    fn as_str(&self) -> Option<&str> {
        serde_json::Value::as_str(self)
    }

    fn as_f64(&self) -> Option<f64> {
        serde_json::Value::as_f64(self)
    }

    fn as_u64(&self) -> Option<u64> {
        serde_json::Value::as_u64(self)
    }

    fn as_bool(&self) -> Option<bool> {
        serde_json::Value::as_bool(self)
    }

    fn as_sequence(&self) -> Option<&[Self]> {
        serde_json::Value::as_array(self).map(|seq| seq.as_slice())
    }

    fn kind(&self) -> &'static str {
        match self {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "boolean",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Array(_) => "sequence",
            serde_json::Value::Object(_) => "mapping",
        }
    }
}

// ============================================================================
// Node
// ============================================================================

/// A configuration value together with its dotted path from the root.
#[derive(Debug, Clone)]
pub struct Node<'a, V> {
    value: &'a V,
    path: String,
}

impl<'a, V: ConfigValue> Node<'a, V> {
    /// Wrap the root of a subtree. `label` becomes the first path segment
    /// and may be empty.
    pub fn root(value: &'a V, label: impl Into<String>) -> Self {
        Self {
            value,
            path: label.into(),
        }
    }

    /// Dotted path of this node, e.g. `model.actor.head`.
    pub fn path(&self) -> &str {
        if self.path.is_empty() {
            "<root>"
        } else {
            &self.path
        }
    }

    /// The wrapped value.
    pub fn value(&self) -> &'a V {
        self.value
    }

    /// Path of `key` below this node.
    pub fn key_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_owned()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    /// Child at `key`; absent and null children are both `None`.
    pub fn get(&self, key: &str) -> Option<Node<'a, V>> {
        self.value
            .get(key)
            .filter(|value| !value.is_null())
            .map(|value| Node {
                value,
                path: self.key_path(key),
            })
    }

    /// Whether `key` is present with a non-null value.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Required child at `key`.
    pub fn child(&self, key: &str) -> Result<Node<'a, V>, BuildError> {
        self.get(key).ok_or_else(|| BuildError::MissingField {
            path: self.path().to_owned(),
            key: key.to_owned(),
        })
    }

    /// The discriminator (`name` field) of this node.
    pub fn discriminator(&self) -> Result<&'a str, BuildError> {
        self.str("name")
    }

    // ------------------------------------------------------------------------
    // Scalar accessors (all fields required)
    // ------------------------------------------------------------------------

    pub fn str(&self, key: &str) -> Result<&'a str, BuildError> {
        let node = self.child(key)?;
        node.value
            .as_str()
            .ok_or_else(|| node.invalid_type("a string"))
    }

    pub fn f64(&self, key: &str) -> Result<f64, BuildError> {
        let node = self.child(key)?;
        node.value
            .as_f64()
            .ok_or_else(|| node.invalid_type("a number"))
    }

    /// Non-negative integer. Integral floats such as `1e6` are accepted.
    pub fn usize(&self, key: &str) -> Result<usize, BuildError> {
        let node = self.child(key)?;
        node.as_count()
    }

    /// Strictly positive integer.
    pub fn positive_usize(&self, key: &str) -> Result<usize, BuildError> {
        let value = self.usize(key)?;
        if value == 0 {
            return Err(BuildError::InvalidValue {
                path: self.key_path(key),
                reason: "must be greater than zero".to_owned(),
            });
        }
        Ok(value)
    }

    /// Boolean flag. Integers `0` and `1` are accepted as well.
    pub fn bool(&self, key: &str) -> Result<bool, BuildError> {
        let node = self.child(key)?;
        if let Some(flag) = node.value.as_bool() {
            return Ok(flag);
        }
        match node.value.as_u64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(node.invalid_type("a boolean")),
        }
    }

    /// Ordered sequence of non-negative integers.
    pub fn usize_list(&self, key: &str) -> Result<Vec<usize>, BuildError> {
        let node = self.child(key)?;
        let items = node
            .value
            .as_sequence()
            .ok_or_else(|| node.invalid_type("a sequence of integers"))?;

        items
            .iter()
            .enumerate()
            .map(|(i, value)| {
                Node {
                    value,
                    path: format!("{}[{}]", node.path, i),
                }
                .as_count()
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Optional accessors
    // ------------------------------------------------------------------------

    /// Number at `key`, or `default` when absent or null.
    pub fn f64_or(&self, key: &str, default: f64) -> Result<f64, BuildError> {
        if self.has(key) {
            self.f64(key)
        } else {
            Ok(default)
        }
    }

    fn as_count(&self) -> Result<usize, BuildError> {
        if let Some(value) = self.value.as_u64() {
            return usize::try_from(value).map_err(|_| self.invalid_type("an integer within usize"));
        }
        match self.value.as_f64() {
            Some(value) if value >= 0.0 && value.fract() == 0.0 && value <= usize::MAX as f64 => {
                Ok(value as usize)
            }
            _ => Err(self.invalid_type("a non-negative integer")),
        }
    }

    fn invalid_type(&self, expected: &'static str) -> BuildError {
        let found = match self.value.as_str() {
            Some(text) => format!("string `{}`", text),
            None => self.value.kind().to_owned(),
        };
        BuildError::InvalidType {
            path: self.path().to_owned(),
            expected,
            found,
        }
    }
}
