pub mod document;
pub mod value;

pub use document::{ConfigNode, ConfigReader, ConfigSection, Document, RawDocument, RawNode};
