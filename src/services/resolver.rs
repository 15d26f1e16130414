//! Configuration loading and resolution.
//!
//! Resolution runs once at startup: decode the raw document, apply per-node
//! environment overrides, decrypt secure values through the decryption port,
//! and assemble the immutable [`Document`].

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, info};

use crate::domain::errors::ConfigError;
use crate::domain::models::document::{ConfigNode, ConfigSection, Document, RawDocument, RawNode};
use crate::domain::models::value;
use crate::domain::ports::decryptor::Decryptor;
use crate::domain::ports::env_source::EnvSource;
use crate::services::binder::Schema;
use crate::services::env_loader;

/// Variable selecting which `<dir>/<environment>.json` document to load.
pub const ENVIRONMENT_VAR: &str = "KMSCONFIG_ENV";

/// Environment assumed when the selector variable is unset.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Prefix shared by override variables and environment-only variables.
pub const OVERRIDE_PREFIX: &str = "KMSCONFIG_VAR_";

/// Truthy switch that bypasses file loading entirely.
pub const ENV_ONLY_VAR: &str = "KMSCONFIG_ENV_ONLY";

/// Loads and resolves configuration documents.
pub struct ConfigResolver {
    path: PathBuf,
    decryptor: Box<dyn Decryptor>,
    env: Box<dyn EnvSource>,
}

impl ConfigResolver {
    pub fn new(
        path: impl Into<PathBuf>,
        decryptor: Box<dyn Decryptor>,
        env: Box<dyn EnvSource>,
    ) -> Self {
        Self {
            path: path.into(),
            decryptor,
            env,
        }
    }

    /// The environment this resolver loads for.
    pub fn environment(&self) -> String {
        self.env
            .var(ENVIRONMENT_VAR)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
    }

    /// Load `<dir>/<environment>.json` and resolve it.
    ///
    /// When the env-only switch is set, or the file does not exist, the
    /// document is synthesised from prefixed environment variables instead.
    /// Any other read failure is fatal.
    pub fn load(&self) -> Result<Document, ConfigError> {
        let environment = self.environment();

        if self.env_only() {
            info!("loading config exclusively from environment variables");
            return env_loader::from_environment(
                self.env.as_ref(),
                self.decryptor.as_ref(),
                &environment,
            );
        }

        let path = self.path.join(format!("{environment}.json"));
        info!(path = %path.display(), "loading config");

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found, synthesising from environment variables"
                );
                return env_loader::from_environment(
                    self.env.as_ref(),
                    self.decryptor.as_ref(),
                    &environment,
                );
            }
            Err(err) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source: err,
                })
            }
        };

        self.resolve(&bytes, &environment)
    }

    /// Load, then populate `target` through `schema`.
    pub fn load_and_populate<T>(
        &self,
        schema: &Schema<T>,
        target: &mut T,
    ) -> Result<Document, ConfigError> {
        let document = self.load()?;
        schema.populate(&document, target)?;
        Ok(document)
    }

    /// Resolve raw document bytes for the given environment.
    pub fn resolve(&self, raw: &[u8], environment: &str) -> Result<Document, ConfigError> {
        let raw_document: RawDocument = serde_json::from_slice(raw)?;

        let mut sections = HashMap::new();
        for (section_name, raw_nodes) in raw_document {
            let mut nodes = HashMap::new();
            for (node_name, raw_node) in raw_nodes {
                let node = self.resolve_node(&section_name, &node_name, raw_node)?;
                nodes.insert(node_name, node);
            }
            sections.insert(
                section_name.clone(),
                ConfigSection {
                    name: section_name,
                    nodes,
                },
            );
        }

        Ok(Document::new(sections, environment.to_string()))
    }

    fn resolve_node(
        &self,
        section: &str,
        name: &str,
        raw: RawNode,
    ) -> Result<ConfigNode, ConfigError> {
        let mut node_value = raw.value;
        let mut encrypted_value = String::new();

        // Override replaces the value before the secure check; an overridden
        // secure node skips decryption.
        let overridden = match self.override_value(section, name, &node_value)? {
            Some(replacement) => {
                node_value = replacement;
                true
            }
            None => false,
        };

        if raw.secure && !overridden {
            let Some(ciphertext) = node_value.as_str().map(str::to_string) else {
                return Err(ConfigError::TypeMismatch {
                    expected: "string",
                    actual: value::type_name(&node_value),
                });
            };

            info!(node = %format!("{section}.{name}"), "encrypted config value found, decrypting");
            let plaintext =
                self.decryptor
                    .decrypt(&ciphertext)
                    .map_err(|source| ConfigError::Decryption {
                        node: format!("{section}.{name}"),
                        source,
                    })?;

            encrypted_value = ciphertext;
            node_value = Value::String(plaintext);
        }

        Ok(ConfigNode {
            name: name.to_string(),
            value: node_value,
            encrypted_value,
            secure: raw.secure,
        })
    }

    /// Check for an override variable and coerce it to the original value's
    /// type: booleans parse as booleans, strings pass through verbatim, and
    /// anything structured parses as JSON.
    fn override_value(
        &self,
        section: &str,
        node: &str,
        original: &Value,
    ) -> Result<Option<Value>, ConfigError> {
        let variable = format!("{OVERRIDE_PREFIX}{section}_{node}");
        let Some(raw) = self.env.var(&variable).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };

        debug!(%variable, "override variable found");

        let replacement = match original {
            Value::Bool(_) => {
                let parsed =
                    value::parse_boolean(&raw).ok_or_else(|| ConfigError::TypeCoercion {
                        variable: variable.clone(),
                        reason: format!("'{raw}' is not a boolean"),
                    })?;
                Value::Bool(parsed)
            }
            Value::String(_) => Value::String(raw),
            _ => serde_json::from_str(&raw).map_err(|err| ConfigError::TypeCoercion {
                variable: variable.clone(),
                reason: err.to_string(),
            })?,
        };

        Ok(Some(replacement))
    }

    fn env_only(&self) -> bool {
        self.env
            .var(ENV_ONLY_VAR)
            .and_then(|v| value::parse_boolean(&v))
            .unwrap_or(false)
    }
}
