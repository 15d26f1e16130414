//! The resolved configuration document and its typed accessors.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::errors::ConfigError;
use crate::domain::models::value;

/// On-disk shape of a single config entry, prior to resolution.
#[derive(Debug, Deserialize)]
pub struct RawNode {
    pub value: Value,

    /// Marks the value as ciphertext requiring decryption.
    #[serde(default)]
    pub secure: bool,
}

/// On-disk shape of a whole config file: section name to node name to entry.
pub type RawDocument = HashMap<String, HashMap<String, RawNode>>;

/// A single leaf configuration entry within a section. Immutable once
/// resolution has completed.
#[derive(Debug, Clone)]
pub struct ConfigNode {
    pub name: String,
    pub value: Value,

    /// Original ciphertext; empty unless the node was secure and decrypted.
    pub encrypted_value: String,
    pub secure: bool,
}

/// A top-level grouping of nodes.
#[derive(Debug, Clone)]
pub struct ConfigSection {
    pub name: String,
    pub nodes: HashMap<String, ConfigNode>,
}

/// The fully resolved configuration: overrides applied, secure values
/// decrypted. Read-only for the remainder of the process lifetime.
#[derive(Debug, Clone)]
pub struct Document {
    sections: HashMap<String, ConfigSection>,
    environment: String,
}

impl Document {
    pub(crate) fn new(sections: HashMap<String, ConfigSection>, environment: String) -> Self {
        Self {
            sections,
            environment,
        }
    }

    /// The environment name this document was resolved for.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// String value at `(section, node)`.
    pub fn string(&self, section: &str, node: &str) -> Result<String, ConfigError> {
        let config_node = self.node(section, node)?;
        match config_node.value.as_str() {
            Some(s) => Ok(s.to_string()),
            None => Err(ConfigError::TypeMismatch {
                expected: "string",
                actual: value::type_name(&config_node.value),
            }),
        }
    }

    /// Integer value at `(section, node)`. Accepts any numeric
    /// representation, truncating toward zero.
    pub fn integer(&self, section: &str, node: &str) -> Result<i64, ConfigError> {
        let config_node = self.node(section, node)?;
        value::as_integer(&config_node.value).ok_or(ConfigError::TypeMismatch {
            expected: "number",
            actual: value::type_name(&config_node.value),
        })
    }

    /// Boolean value at `(section, node)`.
    pub fn boolean(&self, section: &str, node: &str) -> Result<bool, ConfigError> {
        let config_node = self.node(section, node)?;
        config_node.value.as_bool().ok_or(ConfigError::TypeMismatch {
            expected: "boolean",
            actual: value::type_name(&config_node.value),
        })
    }

    /// String-slice value at `(section, node)`. Every element must be a
    /// string; a single non-string element fails the whole call.
    pub fn string_slice(&self, section: &str, node: &str) -> Result<Vec<String>, ConfigError> {
        let config_node = self.node(section, node)?;
        let items = config_node
            .value
            .as_array()
            .ok_or(ConfigError::TypeMismatch {
                expected: "array",
                actual: value::type_name(&config_node.value),
            })?;

        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ConfigError::MixedTypeSlice {
                        section: section.to_string(),
                        node: node.to_string(),
                        found: value::type_name(item),
                    })
            })
            .collect()
    }

    /// The stored value exactly as resolved, without type assertions.
    pub fn raw(&self, section: &str, node: &str) -> Result<&Value, ConfigError> {
        Ok(&self.node(section, node)?.value)
    }

    /// The original ciphertext of a secure node. Empty if the node was never
    /// secure; never triggers decryption.
    pub fn encrypted_string(&self, section: &str, node: &str) -> Result<String, ConfigError> {
        Ok(self.node(section, node)?.encrypted_value.clone())
    }

    fn node(&self, section: &str, node: &str) -> Result<&ConfigNode, ConfigError> {
        let config_section = self
            .sections
            .get(section)
            .ok_or_else(|| ConfigError::SectionNotFound(section.to_string()))?;

        config_section
            .nodes
            .get(node)
            .ok_or_else(|| ConfigError::NodeNotFound {
                section: section.to_string(),
                node: node.to_string(),
            })
    }
}

/// Read access to resolved configuration, for consumers that want to mock
/// config in their own tests.
pub trait ConfigReader {
    fn string(&self, section: &str, node: &str) -> Result<String, ConfigError>;
    fn integer(&self, section: &str, node: &str) -> Result<i64, ConfigError>;
    fn boolean(&self, section: &str, node: &str) -> Result<bool, ConfigError>;
    fn encrypted_string(&self, section: &str, node: &str) -> Result<String, ConfigError>;
    fn environment(&self) -> &str;
}

impl ConfigReader for Document {
    fn string(&self, section: &str, node: &str) -> Result<String, ConfigError> {
        Document::string(self, section, node)
    }

    fn integer(&self, section: &str, node: &str) -> Result<i64, ConfigError> {
        Document::integer(self, section, node)
    }

    fn boolean(&self, section: &str, node: &str) -> Result<bool, ConfigError> {
        Document::boolean(self, section, node)
    }

    fn encrypted_string(&self, section: &str, node: &str) -> Result<String, ConfigError> {
        Document::encrypted_string(self, section, node)
    }

    fn environment(&self) -> &str {
        Document::environment(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Document {
        let mut nodes = HashMap::new();
        nodes.insert(
            "test_string".to_string(),
            ConfigNode {
                name: "test_string".to_string(),
                value: json!("foo"),
                encrypted_value: String::new(),
                secure: false,
            },
        );
        nodes.insert(
            "test_int".to_string(),
            ConfigNode {
                name: "test_int".to_string(),
                value: json!(1),
                encrypted_value: String::new(),
                secure: false,
            },
        );
        nodes.insert(
            "test_bool".to_string(),
            ConfigNode {
                name: "test_bool".to_string(),
                value: json!(true),
                encrypted_value: String::new(),
                secure: false,
            },
        );
        nodes.insert(
            "test_string_slice".to_string(),
            ConfigNode {
                name: "test_string_slice".to_string(),
                value: json!(["foo", "bar"]),
                encrypted_value: String::new(),
                secure: false,
            },
        );
        nodes.insert(
            "test_string_slice_mixed_values".to_string(),
            ConfigNode {
                name: "test_string_slice_mixed_values".to_string(),
                value: json!(["foo", 1]),
                encrypted_value: String::new(),
                secure: false,
            },
        );
        nodes.insert(
            "secret".to_string(),
            ConfigNode {
                name: "secret".to_string(),
                value: json!("plain"),
                encrypted_value: "ciphertext".to_string(),
                secure: true,
            },
        );

        let mut sections = HashMap::new();
        sections.insert(
            "app".to_string(),
            ConfigSection {
                name: "app".to_string(),
                nodes,
            },
        );

        Document::new(sections, "development".to_string())
    }

    #[test]
    fn test_typed_accessors() {
        let doc = document();
        assert_eq!(doc.string("app", "test_string").unwrap(), "foo");
        assert_eq!(doc.integer("app", "test_int").unwrap(), 1);
        assert!(doc.boolean("app", "test_bool").unwrap());
    }

    #[test]
    fn test_string_slice() {
        let doc = document();
        assert_eq!(
            doc.string_slice("app", "test_string_slice").unwrap(),
            vec!["foo", "bar"]
        );
    }

    #[test]
    fn test_string_slice_rejects_non_array() {
        let doc = document();
        let err = doc.string_slice("app", "test_string").unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { expected: "array", .. }));
    }

    #[test]
    fn test_string_slice_rejects_mixed_values() {
        let doc = document();
        let err = doc
            .string_slice("app", "test_string_slice_mixed_values")
            .unwrap_err();
        assert!(matches!(err, ConfigError::MixedTypeSlice { found: "number", .. }));
    }

    #[test]
    fn test_missing_section() {
        let doc = document();
        let err = doc.string("foo", "bar").unwrap_err();
        assert!(matches!(err, ConfigError::SectionNotFound(section) if section == "foo"));
    }

    #[test]
    fn test_missing_node() {
        let doc = document();
        let err = doc.string("app", "zzz").unwrap_err();
        assert!(matches!(err, ConfigError::NodeNotFound { node, .. } if node == "zzz"));
    }

    #[test]
    fn test_type_mismatch_names_both_types() {
        let doc = document();
        let err = doc.string("app", "test_int").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TypeMismatch {
                expected: "string",
                actual: "number",
            }
        ));
    }

    #[test]
    fn test_encrypted_string() {
        let doc = document();
        assert_eq!(doc.encrypted_string("app", "secret").unwrap(), "ciphertext");
        assert_eq!(doc.encrypted_string("app", "test_string").unwrap(), "");
    }

    #[test]
    fn test_raw_value() {
        let doc = document();
        assert_eq!(doc.raw("app", "test_int").unwrap(), &json!(1));
    }

    #[test]
    fn test_environment() {
        assert_eq!(document().environment(), "development");
    }
}
