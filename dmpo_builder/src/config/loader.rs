//! Layered YAML configuration loading.
//!
//! Experiments are usually described by a base file plus a few override files
//! and a handful of command line tweaks. This module composes them into a
//! single `serde_yaml::Value` tree:
//!
//! ```ignore
//! let mut tree = loader::compose(&["configs/dmpo.yaml", "configs/large_buffer.yaml"])?;
//! loader::apply_overrides(&mut tree, &["actor_updater.optimizer.learning_rate=0.001"])?;
//! let assembly = dmpo_builder::assemble(&tree)?;
//! ```
//!
//! Later files win. Mappings are merged key by key, every other value
//! (including sequences and nulls) replaces what was there.

use serde_yaml::{Mapping, Value};
use std::path::Path;

use super::error::BuildError;

/// Parse one YAML document. `origin` names the document in errors.
pub fn parse_str(origin: &str, text: &str) -> Result<Value, BuildError> {
    serde_yaml::from_str(text).map_err(|source| BuildError::Parse {
        origin: origin.to_owned(),
        source,
    })
}

/// Read and parse one YAML file.
pub fn load_file(path: impl AsRef<Path>) -> Result<Value, BuildError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| BuildError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    let value = parse_str(&path.display().to_string(), &text)?;
    log::debug!("Loaded configuration layer {}", path.display());
    Ok(value)
}

/// Load every file in order and merge them into one tree.
pub fn compose<P: AsRef<Path>>(paths: &[P]) -> Result<Value, BuildError> {
    let mut tree = Value::Mapping(Mapping::new());
    for path in paths {
        let layer = load_file(path)?;
        merge(&mut tree, layer);
    }
    Ok(tree)
}

/// Deep-merge `overlay` into `base`.
pub fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Apply one `dotted.key=value` override.
///
/// The right hand side is parsed as a YAML scalar, so `3e-4` becomes a number,
/// `true` a boolean and `null` clears the entry. Missing intermediate
/// mappings are created; descending into a non-mapping value is an error.
pub fn apply_override(tree: &mut Value, spec: &str) -> Result<(), BuildError> {
    let invalid = |reason| BuildError::InvalidOverride {
        spec: spec.to_owned(),
        reason,
    };

    let (key, raw) = spec
        .split_once('=')
        .ok_or_else(|| invalid("expected `dotted.key=value`"))?;
    let segments: Vec<&str> = key.trim().split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(invalid("key has an empty segment"));
    }

    let value: Value = serde_yaml::from_str(raw.trim())
        .map_err(|_| invalid("value is not a YAML scalar"))?;

    let mut cursor: &mut Value = tree;
    for segment in &segments[..segments.len() - 1] {
        if cursor.is_null() {
            *cursor = Value::Mapping(Mapping::new());
        }
        cursor = match cursor {
            Value::Mapping(map) => map
                .entry(Value::String((*segment).to_owned()))
                .or_insert_with(|| Value::Mapping(Mapping::new())),
            _ => return Err(invalid("key descends into a non-mapping value")),
        };
    }

    if cursor.is_null() {
        *cursor = Value::Mapping(Mapping::new());
    }
    match cursor {
        Value::Mapping(map) => {
            let last = segments[segments.len() - 1];
            map.insert(Value::String(last.to_owned()), value);
            log::debug!("Applied override {}", spec);
            Ok(())
        }
        _ => Err(invalid("key descends into a non-mapping value")),
    }
}

/// Apply overrides in order.
pub fn apply_overrides<S: AsRef<str>>(tree: &mut Value, specs: &[S]) -> Result<(), BuildError> {
    for spec in specs {
        apply_override(tree, spec.as_ref())?;
    }
    Ok(())
}
