//! Entity schemas
//!
//! An entity schema declares what a record kind may contain: an ordered list
//! of fields, each with a cardinality and a value kind that is either a
//! scalar property type, a link to another schema, or a nested sub-schema.
//!
//! Schemas are pure data. Identity is by name; they are built once at
//! grammar construction and immutable afterwards.

use std::fmt;
use std::sync::Arc;

use crate::error::{ModelError, Result};
use crate::property::PropertyType;

/// How many values a field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Exactly one value, required at build time
    One,
    /// Zero or one value
    Optional,
    /// Zero or more values, insertion order preserved
    Many,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Cardinality::One => "one",
            Cardinality::Optional => "optional",
            Cardinality::Many => "many",
        };
        f.write_str(s)
    }
}

/// What kind of value a field holds
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// A scalar property value
    Scalar(PropertyType),
    /// A link to a record of the named target schema
    Link { target: String },
    /// A group of nested child records conforming to the sub-schema
    Nested(Arc<EntitySchema>),
}

impl FieldKind {
    /// Short description used in type-mismatch errors
    pub fn describe(&self) -> String {
        match self {
            FieldKind::Scalar(ty) => format!("scalar {ty}"),
            FieldKind::Link { target } => format!("link to `{target}`"),
            FieldKind::Nested(schema) => format!("nested `{}`", schema.name()),
        }
    }
}

/// One declared field of an entity schema
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    cardinality: Cardinality,
    kind: FieldKind,
}

impl FieldSpec {
    pub fn scalar(name: impl Into<String>, ty: PropertyType, cardinality: Cardinality) -> Self {
        Self {
            name: name.into(),
            cardinality,
            kind: FieldKind::Scalar(ty),
        }
    }

    pub fn link(
        name: impl Into<String>,
        target: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            name: name.into(),
            cardinality,
            kind: FieldKind::Link {
                target: target.into(),
            },
        }
    }

    pub fn nested(
        name: impl Into<String>,
        schema: Arc<EntitySchema>,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            name: name.into(),
            cardinality,
            kind: FieldKind::Nested(schema),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Whether a record must carry at least one value for this field
    pub fn required(&self) -> bool {
        self.cardinality == Cardinality::One
    }
}

/// The declared shape of one record kind
#[derive(Debug, Clone)]
pub struct EntitySchema {
    name: String,
    fields: Vec<FieldSpec>,
    provided: bool,
}

impl EntitySchema {
    /// Build a schema whose instances come from parsed sources
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Result<Self> {
        Self::build(name.into(), fields, false)
    }

    /// Build a schema whose instances are supplied by the host (root raws)
    pub fn provided(name: impl Into<String>, fields: Vec<FieldSpec>) -> Result<Self> {
        Self::build(name.into(), fields, true)
    }

    fn build(name: String, fields: Vec<FieldSpec>, provided: bool) -> Result<Self> {
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(ModelError::DuplicateField {
                    schema: name,
                    field: field.name.clone(),
                });
            }
        }
        Ok(Self {
            name,
            fields,
            provided,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields, in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Whether instances are supplied by the host rather than parsed
    pub fn is_provided(&self) -> bool {
        self.provided
    }

    /// Look up a field by name
    ///
    /// The caller supplies the record key so the failure points at the
    /// offending source declaration.
    pub fn field(&self, key: &str, name: &str) -> Result<&FieldSpec> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| ModelError::UnknownField {
                key: key.to_string(),
                schema: self.name.clone(),
                field: name.to_string(),
            })
    }

    /// Schema names this schema links to, directly or through nested fields
    ///
    /// Drives the kind dependency graph used to order the solve phase.
    pub fn link_targets(&self) -> Vec<&str> {
        let mut targets = Vec::new();
        collect_link_targets(self, &mut targets);
        targets
    }
}

fn collect_link_targets<'a>(schema: &'a EntitySchema, out: &mut Vec<&'a str>) {
    for field in &schema.fields {
        match field.kind() {
            FieldKind::Link { target } => {
                if !out.contains(&target.as_str()) {
                    out.push(target);
                }
            }
            FieldKind::Nested(sub) => collect_link_targets(sub, out),
            FieldKind::Scalar(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EntitySchema {
        EntitySchema::new(
            "widget",
            vec![
                FieldSpec::scalar("label", PropertyType::Text, Cardinality::Optional),
                FieldSpec::link("owner", "person", Cardinality::One),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_field_lookup() {
        let schema = sample();
        assert_eq!(schema.field("W1", "label").unwrap().name(), "label");
        let err = schema.field("W1", "nope").unwrap_err();
        assert!(matches!(err, ModelError::UnknownField { ref field, .. } if field == "nope"));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = EntitySchema::new(
            "widget",
            vec![
                FieldSpec::scalar("label", PropertyType::Text, Cardinality::One),
                FieldSpec::scalar("label", PropertyType::Text, Cardinality::One),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateField { ref field, .. } if field == "label"));
    }

    #[test]
    fn test_link_targets_include_nested() {
        let part = Arc::new(
            EntitySchema::new(
                "part",
                vec![FieldSpec::link("material", "material", Cardinality::One)],
            )
            .unwrap(),
        );
        let schema = EntitySchema::new(
            "widget",
            vec![
                FieldSpec::link("owner", "person", Cardinality::One),
                FieldSpec::nested("parts", part, Cardinality::Many),
            ],
        )
        .unwrap();
        assert_eq!(schema.link_targets(), vec!["person", "material"]);
    }
}
