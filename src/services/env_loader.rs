//! Configuration sourced exclusively from environment variables.
//!
//! Two strategies: synthesise a flat document from every `KMSCONFIG_VAR_*`
//! variable, or bind a schema's fields directly from per-field variable
//! names. Variables listed in the secure-variables entry are decrypted
//! through the decryption port before use.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::debug;

use crate::domain::errors::{BindError, ConfigError};
use crate::domain::models::document::{ConfigNode, ConfigSection, Document};
use crate::domain::models::value;
use crate::domain::ports::decryptor::Decryptor;
use crate::domain::ports::env_source::EnvSource;
use crate::services::binder::{resolve_unit, Binding, FieldSpec, Schema};
use crate::services::resolver::OVERRIDE_PREFIX;

/// Comma-separated list of variable names whose values are ciphertext.
pub const SECURE_VARS_VAR: &str = "KMSCONFIG_SECURE_ENV_VARS";

/// Synthesise a flat document from every prefixed environment variable.
///
/// The key remainder after the prefix splits on the first underscore into
/// `(section, node)`, both lower-cased. Malformed keys are skipped.
/// Duplicate `(section, node)` pairs resolve last-wins in the env source's
/// key order.
pub fn from_environment(
    env: &dyn EnvSource,
    decryptor: &dyn Decryptor,
    environment: &str,
) -> Result<Document, ConfigError> {
    let secure_names = secure_var_names(env);
    let mut sections: HashMap<String, ConfigSection> = HashMap::new();

    for (key, raw_value) in env.vars() {
        let Some(remainder) = key.strip_prefix(OVERRIDE_PREFIX) else {
            continue;
        };
        let Some((section_part, node_part)) = remainder.split_once('_') else {
            debug!(%key, "skipping malformed environment config variable");
            continue;
        };
        if section_part.is_empty() || node_part.is_empty() {
            debug!(%key, "skipping malformed environment config variable");
            continue;
        }

        let section_name = section_part.to_lowercase();
        let node_name = node_part.to_lowercase();

        let (node_value, encrypted_value, secure) = if secure_names.contains(&key) {
            let plaintext =
                decryptor
                    .decrypt(&raw_value)
                    .map_err(|source| ConfigError::Decryption {
                        node: format!("{section_name}.{node_name}"),
                        source,
                    })?;
            (Value::String(plaintext), raw_value, true)
        } else {
            (Value::String(raw_value), String::new(), false)
        };

        let node = ConfigNode {
            name: node_name.clone(),
            value: node_value,
            encrypted_value,
            secure,
        };

        sections
            .entry(section_name.clone())
            .or_insert_with(|| ConfigSection {
                name: section_name,
                nodes: HashMap::new(),
            })
            .nodes
            .insert(node_name, node);
    }

    Ok(Document::new(sections, environment.to_string()))
}

/// Bind a schema's fields directly from per-field environment variables.
///
/// Every field maps to `KMSCONFIG_VAR_<SECTION>_<NODE>` with both tags
/// upper-cased. Every variable must be present and unique across fields.
pub fn bind_from_environment<T>(
    schema: &Schema<T>,
    env: &dyn EnvSource,
    decryptor: &dyn Decryptor,
    target: &mut T,
) -> Result<(), ConfigError> {
    if schema.sections.is_empty() {
        return Err(BindError::EmptySchema.into());
    }

    // First pass: compute every variable name, rejecting collisions before
    // any value is read.
    let mut owners: HashMap<String, String> = HashMap::new();
    for section in &schema.sections {
        if section.fields.is_empty() {
            return Err(BindError::EmptySection(section.name.clone()).into());
        }
        for field in &section.fields {
            if matches!(field.binding, Binding::Skip) {
                continue;
            }
            let variable = field_variable(&section.name, &field.node);
            let qualified = format!("{}.{}", section.name, field.node);
            if let Some(first) = owners.insert(variable.clone(), qualified.clone()) {
                return Err(BindError::DuplicateEnvVar {
                    variable,
                    first,
                    second: qualified,
                }
                .into());
            }
        }
    }

    let secure_names = secure_var_names(env);

    for section in &schema.sections {
        for field in &section.fields {
            if matches!(field.binding, Binding::Skip) {
                continue;
            }

            let variable = field_variable(&section.name, &field.node);
            let Some(raw) = env.var(&variable) else {
                return Err(BindError::MissingEnvVar(variable).into());
            };

            let raw = if secure_names.contains(&variable) {
                decryptor
                    .decrypt(&raw)
                    .map_err(|source| ConfigError::Decryption {
                        node: format!("{}.{}", section.name, field.node),
                        source,
                    })?
            } else {
                raw
            };

            assign(&section.name, field, &variable, &raw, target)?;
        }
    }

    Ok(())
}

fn assign<T>(
    section: &str,
    field: &FieldSpec<T>,
    variable: &str,
    raw: &str,
    target: &mut T,
) -> Result<(), ConfigError> {
    let coercion = |expected: &'static str, reason: String| {
        ConfigError::from(BindError::EnvCoercion {
            variable: variable.to_string(),
            expected,
            reason,
        })
    };

    match &field.binding {
        Binding::Skip => {}
        Binding::String(set) => set(target, raw.to_string()),
        Binding::Integer(set) => {
            let parsed = raw
                .trim()
                .parse::<i64>()
                .map_err(|err| coercion("integer", err.to_string()))?;
            set(target, parsed);
        }
        Binding::Unsigned(set) => {
            let parsed = raw
                .trim()
                .parse::<u64>()
                .map_err(|err| coercion("unsigned integer", err.to_string()))?;
            set(target, parsed);
        }
        Binding::Boolean(set) => {
            let parsed = value::parse_boolean(raw)
                .ok_or_else(|| coercion("boolean", format!("'{raw}' is not a boolean")))?;
            set(target, parsed);
        }
        Binding::StringSlice(set) => set(target, value::split_list(raw)),
        Binding::Duration { unit, set } => {
            let resolved = resolve_unit(section, &field.node, unit)?;
            let ticks = raw
                .trim()
                .parse::<u64>()
                .map_err(|err| coercion("unsigned integer", err.to_string()))?;
            set(target, resolved.duration(ticks));
        }
    }

    Ok(())
}

fn field_variable(section: &str, node: &str) -> String {
    format!(
        "{OVERRIDE_PREFIX}{}_{}",
        section.to_uppercase(),
        node.to_uppercase()
    )
}

fn secure_var_names(env: &dyn EnvSource) -> HashSet<String> {
    env.var(SECURE_VARS_VAR)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
