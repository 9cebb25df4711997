//! Interpolating YAML loader
//!
//! Parses a YAML file into a [`Value`], substituting placeholders in every
//! string scalar (mapping keys included) as the value is built. The result
//! is what gets cached, so substitution happens once per load rather than
//! once per read.

use std::path::Path;

use crate::error::{Error, Result, SourceLocation};
use crate::interpolation;
use crate::namespace::Namespace;
use crate::value::Value;

/// Loads one configuration file into a value.
///
/// [`YamlLoader`] is the implementation used by default; the trait exists so
/// a tree can be handed a different one (for instance one that records how
/// often files are read).
pub trait Loader: Send + Sync {
    /// Load the file at `path`, substituting placeholders from `namespace`
    fn load(&self, path: &Path, namespace: &Namespace) -> Result<Value>;
}

/// Reads and parses `.yaml` files from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlLoader;

impl Loader for YamlLoader {
    fn load(&self, path: &Path, namespace: &Namespace) -> Result<Value> {
        load_file(path, namespace)
    }
}

/// Load and interpolate a YAML file.
///
/// Fails with `InvalidPath` unless `path` names a regular file.
pub fn load_file(path: &Path, namespace: &Namespace) -> Result<Value> {
    let is_file = std::fs::metadata(path)
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(Error::invalid_path(path));
    }

    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_str(&text, namespace).map_err(|mut e| {
        e.source_location = Some(match e.source_location.take() {
            Some(loc) => SourceLocation {
                file: path.display().to_string(),
                ..loc
            },
            None => SourceLocation::file(path),
        });
        e
    })
}

/// Parse YAML text, substituting placeholders from `namespace`
pub fn parse_str(text: &str, namespace: &Namespace) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    let doc: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| {
        let mut err = Error::parse(e.to_string());
        if let Some(loc) = e.location() {
            err = err.with_source_location(SourceLocation {
                file: "<input>".into(),
                line: Some(loc.line()),
                column: Some(loc.column()),
            });
        }
        err
    })?;

    let mut trail = Vec::new();
    convert(doc, namespace, &mut trail)
}

fn convert(node: serde_yaml::Value, namespace: &Namespace, trail: &mut Vec<String>) -> Result<Value> {
    use serde_yaml::Value as Yaml;

    Ok(match node {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            // u64 beyond i64::MAX, or a real float
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Yaml::String(s) => Value::String(substitute_at(&s, namespace, trail)?),
        Yaml::Sequence(seq) => {
            let mut items = Vec::with_capacity(seq.len());
            for (i, item) in seq.into_iter().enumerate() {
                trail.push(i.to_string());
                items.push(convert(item, namespace, trail)?);
                trail.pop();
            }
            Value::Sequence(items)
        }
        Yaml::Mapping(map) => {
            let mut out = indexmap::IndexMap::with_capacity(map.len());
            for (key, value) in map {
                let key = mapping_key(key, namespace, trail)?;
                trail.push(key.clone());
                if out.contains_key(&key) {
                    return Err(Error::parse(format!(
                        "Duplicate mapping key after substitution (at '{}')",
                        display_trail(trail)
                    )));
                }
                let value = convert(value, namespace, trail)?;
                trail.pop();
                out.insert(key, value);
            }
            Value::Mapping(out)
        }
        // tags carry no meaning here; keep what they wrap
        Yaml::Tagged(tagged) => convert(tagged.value, namespace, trail)?,
    })
}

fn mapping_key(key: serde_yaml::Value, namespace: &Namespace, trail: &[String]) -> Result<String> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => substitute_at(&s, namespace, trail),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        Yaml::Tagged(tagged) => mapping_key(tagged.value, namespace, trail),
        Yaml::Sequence(_) | Yaml::Mapping(_) => Err(Error::parse(format!(
            "Mapping keys must be scalars (under '{}')",
            display_trail(trail)
        ))),
    }
}

fn substitute_at(text: &str, namespace: &Namespace, trail: &[String]) -> Result<String> {
    interpolation::substitute(text, namespace).map_err(|mut e| {
        if !trail.is_empty() {
            let cause = e.cause.take().unwrap_or_default();
            e.cause = Some(format!("{} (at '{}')", cause, display_trail(trail)));
        }
        e
    })
}

fn display_trail(trail: &[String]) -> String {
    if trail.is_empty() {
        "<root>".to_string()
    } else {
        trail.join(".")
    }
}
