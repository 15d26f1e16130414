//! Implementation of the value lookup command.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use crate::domain::ports::env_source::ProcessEnv;
use crate::infrastructure::kms::KmsClient;
use crate::services::resolver::ConfigResolver;

/// Resolve the document under `path` and return the rendered value at the
/// dotted `node_key`.
pub fn execute(path: &Path, node_key: &str) -> Result<String> {
    let (section, node) = split_node_key(node_key)?;

    let kms = KmsClient::from_env(&ProcessEnv).context("Failed to build KMS client")?;
    let resolver = ConfigResolver::new(path, Box::new(kms), Box::new(ProcessEnv));

    let document = resolver
        .load()
        .with_context(|| format!("Failed to load config from '{}'", path.display()))?;

    let value = document.raw(section, node)?;
    Ok(render(value))
}

fn split_node_key(key: &str) -> Result<(&str, &str)> {
    match key.split_once('.') {
        Some((section, node)) if !section.is_empty() && !node.is_empty() && !node.contains('.') => {
            Ok((section, node))
        }
        _ => bail!("Expected node key in the format 'section.node', got: '{key}'"),
    }
}

/// Strings print bare; everything else prints as JSON.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_node_key() {
        assert_eq!(split_node_key("app.test_string").unwrap(), ("app", "test_string"));
    }

    #[test]
    fn test_split_node_key_rejects_malformed() {
        assert!(split_node_key("app").is_err());
        assert!(split_node_key("app.").is_err());
        assert!(split_node_key(".node").is_err());
        assert!(split_node_key("a.b.c").is_err());
    }

    #[test]
    fn test_render() {
        assert_eq!(render(&json!("foo")), "foo");
        assert_eq!(render(&json!(1)), "1");
        assert_eq!(render(&json!(["a", "b"])), "[\"a\",\"b\"]");
        assert_eq!(render(&json!(true)), "true");
    }
}
