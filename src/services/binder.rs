//! Declarative binding of a resolved document onto a destination struct.
//!
//! A [`Schema`] is a registry of `(section, node, kind)` descriptors with a
//! setter per field, built once at startup. `populate` walks the registry
//! and assigns each destination field from the document, converting
//! durations and slices on the way.

use std::time::Duration;

use crate::domain::errors::{BindError, ConfigError};
use crate::domain::models::document::Document;
use crate::domain::models::value;

/// Unit tag interpreting a duration field's raw integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl DurationUnit {
    /// Parse a unit token. Unknown tokens return `None`.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "microseconds" => Some(Self::Microseconds),
            "milliseconds" => Some(Self::Milliseconds),
            "seconds" => Some(Self::Seconds),
            "minutes" => Some(Self::Minutes),
            "hours" => Some(Self::Hours),
            "days" => Some(Self::Days),
            _ => None,
        }
    }

    /// The duration of `ticks` of this unit.
    pub fn duration(self, ticks: u64) -> Duration {
        match self {
            Self::Microseconds => Duration::from_micros(ticks),
            Self::Milliseconds => Duration::from_millis(ticks),
            Self::Seconds => Duration::from_secs(ticks),
            Self::Minutes => Duration::from_secs(ticks * 60),
            Self::Hours => Duration::from_secs(ticks * 3600),
            Self::Days => Duration::from_secs(ticks * 86_400),
        }
    }
}

pub(crate) enum Binding<T> {
    String(fn(&mut T, String)),
    Integer(fn(&mut T, i64)),
    Unsigned(fn(&mut T, u64)),
    Boolean(fn(&mut T, bool)),
    StringSlice(fn(&mut T, Vec<String>)),
    Duration { unit: String, set: fn(&mut T, Duration) },
    Skip,
}

pub(crate) struct FieldSpec<T> {
    pub(crate) node: String,
    pub(crate) binding: Binding<T>,
}

pub(crate) struct SectionSpec<T> {
    pub(crate) name: String,
    pub(crate) fields: Vec<FieldSpec<T>>,
}

/// Registry of destination fields keyed by `(section, node)`.
pub struct Schema<T> {
    pub(crate) sections: Vec<SectionSpec<T>>,
}

impl<T> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Schema<T> {
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
        }
    }

    /// Open a section and start registering its fields.
    pub fn section(self, name: &str) -> SectionBuilder<T> {
        SectionBuilder {
            schema: self,
            section: SectionSpec {
                name: name.to_string(),
                fields: Vec::new(),
            },
        }
    }

    /// Populate `target` from `document` according to the registry.
    ///
    /// The whole destination either populates fully or the first failure is
    /// returned; a target that received an `Err` must not be used.
    pub fn populate(&self, document: &Document, target: &mut T) -> Result<(), ConfigError> {
        if self.sections.is_empty() {
            return Err(BindError::EmptySchema.into());
        }

        for section in &self.sections {
            if section.fields.is_empty() {
                return Err(BindError::EmptySection(section.name.clone()).into());
            }

            for field in &section.fields {
                apply_field(document, &section.name, field, target)?;
            }
        }

        Ok(())
    }
}

/// Builder registering the fields of one section.
pub struct SectionBuilder<T> {
    schema: Schema<T>,
    section: SectionSpec<T>,
}

impl<T> SectionBuilder<T> {
    pub fn string(self, node: &str, set: fn(&mut T, String)) -> Self {
        self.field(node, Binding::String(set))
    }

    pub fn integer(self, node: &str, set: fn(&mut T, i64)) -> Self {
        self.field(node, Binding::Integer(set))
    }

    pub fn unsigned(self, node: &str, set: fn(&mut T, u64)) -> Self {
        self.field(node, Binding::Unsigned(set))
    }

    pub fn boolean(self, node: &str, set: fn(&mut T, bool)) -> Self {
        self.field(node, Binding::Boolean(set))
    }

    pub fn string_slice(self, node: &str, set: fn(&mut T, Vec<String>)) -> Self {
        self.field(node, Binding::StringSlice(set))
    }

    /// Register a duration field. The raw config integer is multiplied by
    /// `unit` (one of `microseconds`, `milliseconds`, `seconds`, `minutes`,
    /// `hours`, `days`); the token is validated when the schema is applied.
    pub fn duration(self, node: &str, unit: &str, set: fn(&mut T, Duration)) -> Self {
        self.field(
            node,
            Binding::Duration {
                unit: unit.to_string(),
                set,
            },
        )
    }

    /// Register a node the destination deliberately does not consume.
    pub fn skip(self, node: &str) -> Self {
        self.field(node, Binding::Skip)
    }

    /// Close the section and return to the schema.
    pub fn done(mut self) -> Schema<T> {
        self.schema.sections.push(self.section);
        self.schema
    }

    fn field(mut self, node: &str, binding: Binding<T>) -> Self {
        self.section.fields.push(FieldSpec {
            node: node.to_string(),
            binding,
        });
        self
    }
}

pub(crate) fn resolve_unit(section: &str, node: &str, token: &str) -> Result<DurationUnit, BindError> {
    if token.is_empty() {
        return Err(BindError::MissingDurationUnit {
            section: section.to_string(),
            node: node.to_string(),
        });
    }

    DurationUnit::parse(token).ok_or_else(|| BindError::UnknownDurationUnit {
        section: section.to_string(),
        node: node.to_string(),
        unit: token.to_string(),
    })
}

fn apply_field<T>(
    document: &Document,
    section: &str,
    field: &FieldSpec<T>,
    target: &mut T,
) -> Result<(), ConfigError> {
    let mismatch = |expected: &'static str, actual: &'static str| {
        ConfigError::from(BindError::FieldTypeMismatch {
            section: section.to_string(),
            node: field.node.clone(),
            expected,
            actual,
        })
    };

    match &field.binding {
        Binding::Skip => Ok(()),
        Binding::StringSlice(set) => {
            // Delegates to the accessor so slice errors keep their own kinds.
            let items = document.string_slice(section, &field.node)?;
            set(target, items);
            Ok(())
        }
        Binding::String(set) => {
            let raw = document.raw(section, &field.node)?;
            match raw.as_str() {
                Some(s) => {
                    set(target, s.to_string());
                    Ok(())
                }
                None => Err(mismatch("string", value::type_name(raw))),
            }
        }
        Binding::Boolean(set) => {
            let raw = document.raw(section, &field.node)?;
            match raw.as_bool() {
                Some(b) => {
                    set(target, b);
                    Ok(())
                }
                None => Err(mismatch("boolean", value::type_name(raw))),
            }
        }
        Binding::Integer(set) => {
            let raw = document.raw(section, &field.node)?;
            match value::as_integer(raw) {
                Some(i) => {
                    set(target, i);
                    Ok(())
                }
                None => Err(mismatch("number", value::type_name(raw))),
            }
        }
        Binding::Unsigned(set) => {
            let raw = document.raw(section, &field.node)?;
            match value::as_unsigned(raw) {
                Some(u) => {
                    set(target, u);
                    Ok(())
                }
                None => Err(mismatch("non-negative number", value::type_name(raw))),
            }
        }
        Binding::Duration { unit, set } => {
            let raw = document.raw(section, &field.node)?;
            let resolved = resolve_unit(section, &field.node, unit)?;
            match value::as_unsigned(raw) {
                Some(ticks) => {
                    set(target, resolved.duration(ticks));
                    Ok(())
                }
                None => Err(mismatch("non-negative number", value::type_name(raw))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::document::{ConfigNode, ConfigSection};
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Debug, Default, PartialEq)]
    struct AppSettings {
        name: String,
        workers: i64,
        enabled: bool,
        hosts: Vec<String>,
        timeout: Duration,
    }

    fn node(name: &str, value: serde_json::Value) -> ConfigNode {
        ConfigNode {
            name: name.to_string(),
            value,
            encrypted_value: String::new(),
            secure: false,
        }
    }

    fn document() -> Document {
        let mut nodes = HashMap::new();
        nodes.insert("test_string".to_string(), node("test_string", json!("foo")));
        nodes.insert("test_int".to_string(), node("test_int", json!(4)));
        nodes.insert("test_bool".to_string(), node("test_bool", json!(true)));
        nodes.insert(
            "test_string_slice".to_string(),
            node("test_string_slice", json!(["foo", "bar"])),
        );
        nodes.insert("test_time".to_string(), node("test_time", json!(2)));

        let mut sections = HashMap::new();
        sections.insert(
            "app".to_string(),
            ConfigSection {
                name: "app".to_string(),
                nodes,
            },
        );
        Document::new(sections, "development".to_string())
    }

    fn schema() -> Schema<AppSettings> {
        Schema::<AppSettings>::new()
            .section("app")
            .string("test_string", |s, v| s.name = v)
            .integer("test_int", |s, v| s.workers = v)
            .boolean("test_bool", |s, v| s.enabled = v)
            .string_slice("test_string_slice", |s, v| s.hosts = v)
            .duration("test_time", "seconds", |s, v| s.timeout = v)
            .done()
    }

    #[test]
    fn test_populate_full_struct() {
        let mut settings = AppSettings::default();
        schema().populate(&document(), &mut settings).unwrap();

        assert_eq!(settings.name, "foo");
        assert_eq!(settings.workers, 4);
        assert!(settings.enabled);
        assert_eq!(settings.hosts, vec!["foo", "bar"]);
        assert_eq!(settings.timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_duration_units() {
        assert_eq!(
            DurationUnit::parse("milliseconds").unwrap().duration(3),
            Duration::from_millis(3)
        );
        assert_eq!(
            DurationUnit::parse("days").unwrap().duration(1),
            Duration::from_secs(86_400)
        );
        assert!(DurationUnit::parse("fortnights").is_none());
    }

    #[test]
    fn test_missing_duration_unit() {
        let schema = Schema::<AppSettings>::new()
            .section("app")
            .duration("test_time", "", |s, v| s.timeout = v)
            .done();

        let err = schema
            .populate(&document(), &mut AppSettings::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Bind(BindError::MissingDurationUnit { .. })
        ));
    }

    #[test]
    fn test_unknown_duration_unit() {
        let schema = Schema::<AppSettings>::new()
            .section("app")
            .duration("test_time", "weeks", |s, v| s.timeout = v)
            .done();

        let err = schema
            .populate(&document(), &mut AppSettings::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Bind(BindError::UnknownDurationUnit { unit, .. }) if unit == "weeks"
        ));
    }

    #[test]
    fn test_field_type_mismatch_names_both_types() {
        let schema = Schema::<AppSettings>::new()
            .section("app")
            .string("test_int", |s, v| s.name = v)
            .done();

        let err = schema
            .populate(&document(), &mut AppSettings::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Bind(BindError::FieldTypeMismatch {
                expected: "string",
                actual: "number",
                ..
            })
        ));
    }

    #[test]
    fn test_empty_schema() {
        let schema = Schema::<AppSettings>::new();
        let err = schema
            .populate(&document(), &mut AppSettings::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Bind(BindError::EmptySchema)));
    }

    #[test]
    fn test_empty_section() {
        let schema = Schema::<AppSettings>::new().section("app").done();
        let err = schema
            .populate(&document(), &mut AppSettings::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Bind(BindError::EmptySection(name)) if name == "app"
        ));
    }

    #[test]
    fn test_skip_leaves_field_untouched() {
        let mut settings = AppSettings {
            workers: 10,
            ..AppSettings::default()
        };

        let schema = Schema::<AppSettings>::new()
            .section("app")
            .string("test_string", |s, v| s.name = v)
            .skip("test_int")
            .done();

        schema.populate(&document(), &mut settings).unwrap();
        assert_eq!(settings.name, "foo");
        assert_eq!(settings.workers, 10);
    }

    #[test]
    fn test_missing_node_propagates() {
        let schema = Schema::<AppSettings>::new()
            .section("app")
            .string("missing_field", |s, v| s.name = v)
            .done();

        let err = schema
            .populate(&document(), &mut AppSettings::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::NodeNotFound { .. }));
    }

    #[test]
    fn test_slice_errors_keep_accessor_kind() {
        let mut nodes = HashMap::new();
        nodes.insert("mixed".to_string(), node("mixed", json!(["foo", 1])));
        let mut sections = HashMap::new();
        sections.insert(
            "app".to_string(),
            ConfigSection {
                name: "app".to_string(),
                nodes,
            },
        );
        let document = Document::new(sections, "development".to_string());

        let schema = Schema::<AppSettings>::new()
            .section("app")
            .string_slice("mixed", |s, v| s.hosts = v)
            .done();

        let err = schema
            .populate(&document, &mut AppSettings::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::MixedTypeSlice { .. }));
    }
}
