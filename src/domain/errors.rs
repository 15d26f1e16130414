use thiserror::Error;

use crate::domain::ports::decryptor::DecryptionError;

/// Errors raised while loading, resolving, or reading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse config document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("The config section '{0}' doesn't exist")]
    SectionNotFound(String),

    #[error("The node '{node}' doesn't exist in section '{section}'")]
    NodeNotFound { section: String, node: String },

    #[error("Expected a {expected} value, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Override variable '{variable}' could not be coerced: {reason}")]
    TypeCoercion { variable: String, reason: String },

    #[error("Mixed types in slice at {section}.{node}, expected all strings but got {found}")]
    MixedTypeSlice {
        section: String,
        node: String,
        found: &'static str,
    },

    #[error("Failed to decrypt secure value '{node}'")]
    Decryption {
        node: String,
        #[source]
        source: DecryptionError,
    },

    #[error(transparent)]
    Bind(#[from] BindError),
}

/// Errors raised while binding a document or environment onto a destination
/// struct.
#[derive(Error, Debug)]
pub enum BindError {
    #[error("Schema has no registered sections")]
    EmptySchema,

    #[error("Section '{0}' has no registered fields")]
    EmptySection(String),

    #[error("Duration field {section}.{node} is missing a unit")]
    MissingDurationUnit { section: String, node: String },

    #[error("Duration field {section}.{node} has unrecognised unit '{unit}'")]
    UnknownDurationUnit {
        section: String,
        node: String,
        unit: String,
    },

    #[error("Field {section}.{node} expected a {expected} value, config holds {actual}")]
    FieldTypeMismatch {
        section: String,
        node: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Environment variable '{variable}' could not be parsed as {expected}: {reason}")]
    EnvCoercion {
        variable: String,
        expected: &'static str,
        reason: String,
    },

    #[error("Environment variable '{0}' not found")]
    MissingEnvVar(String),

    #[error("Fields {first} and {second} both resolve to environment variable '{variable}'")]
    DuplicateEnvVar {
        variable: String,
        first: String,
        second: String,
    },
}
