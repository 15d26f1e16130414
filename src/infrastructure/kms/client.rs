//! HTTP client for the KMS decrypt endpoint.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::decryptor::{DecryptionError, Decryptor};
use crate::domain::ports::env_source::EnvSource;

/// Variable naming the decrypt endpoint directly.
pub const KMS_ENDPOINT_VAR: &str = "KMSCONFIG_KMS_ENDPOINT";

/// Variable naming the AWS region the endpoint is derived from when no
/// explicit endpoint is configured.
pub const AWS_REGION_VAR: &str = "AWS_REGION";

const DEFAULT_REGION: &str = "eu-west-1";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the KMS client.
#[derive(Debug, Clone)]
pub struct KmsClientConfig {
    /// Decrypt endpoint URL.
    pub endpoint: String,

    /// Request timeout. The core specifies no deadline policy of its own;
    /// this is a plain transport timeout.
    pub timeout_secs: u64,
}

impl KmsClientConfig {
    /// Build the config from the environment: explicit endpoint if set,
    /// otherwise derived from the AWS region.
    pub fn from_env(env: &dyn EnvSource) -> Self {
        let endpoint = env
            .var(KMS_ENDPOINT_VAR)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| {
                let region = env
                    .var(AWS_REGION_VAR)
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| DEFAULT_REGION.to_string());
                format!("https://kms.{region}.amazonaws.com")
            });

        Self {
            endpoint,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Serialize)]
struct DecryptRequest<'a> {
    #[serde(rename = "CiphertextBlob")]
    ciphertext_blob: &'a str,
}

#[derive(Deserialize)]
struct DecryptResponse {
    #[serde(rename = "Plaintext")]
    plaintext: String,
}

/// Blocking client for the KMS decrypt operation.
///
/// One request per call, no retries; resolution aborts on the first
/// failure.
pub struct KmsClient {
    http_client: HttpClient,
    endpoint: String,
}

impl KmsClient {
    pub fn new(config: KmsClientConfig) -> Result<Self, DecryptionError> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint,
        })
    }

    /// Construct a client configured from the environment.
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, DecryptionError> {
        Self::new(KmsClientConfig::from_env(env))
    }
}

impl Decryptor for KmsClient {
    fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptionError> {
        // The blob must be valid base64 before transmission.
        BASE64.decode(ciphertext)?;

        debug!(endpoint = %self.endpoint, "requesting decryption");

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("X-Amz-Target", "TrentService.Decrypt")
            .header("Content-Type", "application/x-amz-json-1.1")
            .json(&DecryptRequest {
                ciphertext_blob: ciphertext,
            })
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| "failed to read error response".to_string());
            return Err(DecryptionError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let body: DecryptResponse = response
            .json()
            .map_err(|err| DecryptionError::MalformedResponse(err.to_string()))?;

        let plaintext = BASE64
            .decode(&body.plaintext)
            .map_err(|_| DecryptionError::MalformedResponse("plaintext is not valid base64".to_string()))?;

        Ok(String::from_utf8(plaintext)?)
    }
}
