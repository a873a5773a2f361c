//! Layered configuration: a main YAML file with an optional defaults file.
//!
//! Options are addressed by `/`-separated hierarchical names
//! (e.g. `debug/echosql`). Lookup tries the main document first and falls
//! back to the defaults document; the two tiers are never merged within one
//! call. Values are coerced through a closed set of option types, and a
//! missing option is always an error rather than a silent default.

use crate::error::SettingsError;
use serde_yaml::Value;
use std::fmt;
use std::path::Path;

/// The closed set of types an option can be coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    String,
    Integer,
    Float,
    Bool,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::String => write!(f, "string"),
            OptionType::Integer => write!(f, "integer"),
            OptionType::Float => write!(f, "float"),
            OptionType::Bool => write!(f, "bool"),
        }
    }
}

/// A coerced option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

/// Resolver over the main document and an optional defaults document.
#[derive(Debug)]
pub struct Settings {
    main: Value,
    defaults: Option<Value>,
}

impl Settings {
    /// Load settings from a main file and an optional defaults file.
    pub fn load<P: AsRef<Path>>(main: P, defaults: Option<P>) -> Result<Self, SettingsError> {
        let main = load_document(main.as_ref())?;
        let defaults = match defaults {
            Some(path) => Some(load_document(path.as_ref())?),
            None => None,
        };
        Ok(Self { main, defaults })
    }

    /// Build settings directly from parsed documents.
    pub fn from_values(main: Value, defaults: Option<Value>) -> Self {
        Self { main, defaults }
    }

    /// Return a single option coerced to the requested type.
    ///
    /// The main document wins when the option is present in both tiers.
    pub fn option(&self, name: &str, ty: OptionType) -> Result<OptionValue, SettingsError> {
        let node = find(&self.main, name)
            .or_else(|| self.defaults.as_ref().and_then(|d| find(d, name)))
            .ok_or_else(|| SettingsError::MissingOption(name.to_string()))?;
        coerce(node, name, ty)
    }

    /// Return every match for the option at the tier where a match was found.
    ///
    /// A sequence node yields its elements, a scalar node yields one value.
    /// An empty sequence counts as zero matches and triggers the fallback.
    pub fn option_list(
        &self,
        name: &str,
        ty: OptionType,
    ) -> Result<Vec<OptionValue>, SettingsError> {
        let mut nodes = find_all(&self.main, name);
        if nodes.is_empty() {
            if let Some(defaults) = &self.defaults {
                nodes = find_all(defaults, name);
            }
        }
        if nodes.is_empty() {
            return Err(SettingsError::MissingOption(name.to_string()));
        }
        nodes.into_iter().map(|n| coerce(n, name, ty)).collect()
    }

    /// Convenience accessor for a string option.
    pub fn string(&self, name: &str) -> Result<String, SettingsError> {
        match self.option(name, OptionType::String)? {
            OptionValue::String(s) => Ok(s),
            _ => unreachable!("string coercion always yields a string"),
        }
    }

    /// Convenience accessor for a bool option.
    pub fn bool(&self, name: &str) -> Result<bool, SettingsError> {
        match self.option(name, OptionType::Bool)? {
            OptionValue::Bool(b) => Ok(b),
            _ => unreachable!("bool coercion always yields a bool"),
        }
    }
}

fn load_document(path: &Path) -> Result<Value, SettingsError> {
    let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_yaml::from_str(&text).map_err(|source| SettingsError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Walk a `/`-separated path through nested mappings.
fn find<'a>(doc: &'a Value, name: &str) -> Option<&'a Value> {
    let mut node = doc;
    for segment in name.split('/') {
        node = node.get(segment)?;
    }
    Some(node)
}

/// Resolve a path to the list of leaf nodes it matches within one document.
fn find_all<'a>(doc: &'a Value, name: &str) -> Vec<&'a Value> {
    match find(doc, name) {
        Some(Value::Sequence(items)) => items.iter().collect(),
        Some(node) => vec![node],
        None => Vec::new(),
    }
}

/// Coerce a scalar node to the requested option type.
fn coerce(node: &Value, name: &str, ty: OptionType) -> Result<OptionValue, SettingsError> {
    let conversion_error = || SettingsError::TypeConversion {
        name: name.to_string(),
        ty,
    };

    let text = match node {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return Err(conversion_error()),
    };

    match ty {
        OptionType::String => Ok(OptionValue::String(text)),
        OptionType::Integer => text
            .trim()
            .parse::<i64>()
            .map(OptionValue::Integer)
            .map_err(|_| conversion_error()),
        OptionType::Float => text
            .trim()
            .parse::<f64>()
            .map(OptionValue::Float)
            .map_err(|_| conversion_error()),
        OptionType::Bool => str_to_bool(&text)
            .map(OptionValue::Bool)
            .ok_or_else(conversion_error),
    }
}

/// Human-intuitive boolean parsing.
fn str_to_bool(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "true" | "yes" | "t" | "y" | "1" => Some(true),
        "false" | "no" | "f" | "n" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_tokens_round_trip() {
        for token in ["true", "YES", "t", "Y", "1"] {
            assert_eq!(str_to_bool(token), Some(true), "token {token}");
        }
        for token in ["false", "No", "F", "n", "0"] {
            assert_eq!(str_to_bool(token), Some(false), "token {token}");
        }
        for token in ["maybe", "2", "on", ""] {
            assert_eq!(str_to_bool(token), None, "token {token}");
        }
    }
}
