pub mod decryptor;
pub mod env_source;

pub use decryptor::{DecryptionError, Decryptor, MockDecryptor};
pub use env_source::{EnvSource, ProcessEnv, StaticEnv};
