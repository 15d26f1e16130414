//! Kmsconfig - environment-aware configuration with KMS-backed secure values.
//!
//! Kmsconfig loads a hierarchical, environment-specific configuration
//! document, applies per-value overrides from process environment variables,
//! transparently decrypts values marked secure through a KMS decryption
//! service, and optionally binds the resolved values onto a caller-supplied
//! struct.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): document model, value coercion, and the
//!   decryption/environment ports
//! - **Service Layer** (`services`): resolver, struct binder, and the
//!   environment-only loader
//! - **Infrastructure Layer** (`infrastructure`): the KMS HTTP client
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use kmsconfig::{ConfigResolver, ProcessEnv};
//! use kmsconfig::infrastructure::kms::KmsClient;
//!
//! fn main() -> anyhow::Result<()> {
//!     let kms = KmsClient::from_env(&ProcessEnv)?;
//!     let resolver = ConfigResolver::new("./config", Box::new(kms), Box::new(ProcessEnv));
//!     let document = resolver.load()?;
//!     let queue = document.string("aws", "sqs_queue")?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{BindError, ConfigError};
pub use domain::models::document::{ConfigNode, ConfigReader, ConfigSection, Document};
pub use domain::ports::decryptor::{DecryptionError, Decryptor, MockDecryptor};
pub use domain::ports::env_source::{EnvSource, ProcessEnv, StaticEnv};
pub use services::binder::{DurationUnit, Schema};
pub use services::resolver::ConfigResolver;
