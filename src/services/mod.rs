pub mod binder;
pub mod env_loader;
pub mod resolver;

pub use binder::{DurationUnit, Schema, SectionBuilder};
pub use env_loader::{bind_from_environment, from_environment};
pub use resolver::ConfigResolver;
