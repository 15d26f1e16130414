pub mod client;

pub use client::{KmsClient, KmsClientConfig};
