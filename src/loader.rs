//! JSON raw-record loader
//!
//! The only loader shipped in-tree; the concrete text-notation parsers are
//! external collaborators. Reads a raw dump document, runs every
//! declaration through the schema-validating raw builder, and appends the
//! results to the repository. Scalar JSON values are coerced by the
//! declared field type, so `1` can feed a decimal field while `"1"` cannot.
//!
//! Declarations of provided schemas are rejected: their instances are
//! seeded by the grammars, never read from sources.
//!
//! ## Document shape
//! ```json
//! {
//!   "records": [
//!     {
//!       "key": "EntCustomer",
//!       "schema": "entity",
//!       "namespace": "shop",
//!       "scalars": { "label": "Customer" },
//!       "links": { "domain": "DomCore" },
//!       "nested": {
//!         "attributes": [
//!           { "key": "name", "links": { "value": "TypText" } }
//!         ]
//!       }
//!     }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{ModelError, Result};
use crate::property::{PropertyType, PropertyValue};
use crate::raw::{RawBuilder, RawRecord};
use crate::repository::RawRepository;
use crate::schema::{EntitySchema, FieldKind};

#[derive(Debug, Deserialize)]
struct RawDump {
    #[serde(default)]
    records: Vec<RecordDecl>,
}

#[derive(Debug, Deserialize)]
struct RecordDecl {
    key: String,
    schema: String,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    scalars: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    links: IndexMap<String, LinkDecl>,
    #[serde(default)]
    nested: IndexMap<String, Vec<ChildDecl>>,
}

/// Nested children carry no schema; the parent field declares it
#[derive(Debug, Deserialize)]
struct ChildDecl {
    key: String,
    #[serde(default)]
    scalars: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    links: IndexMap<String, LinkDecl>,
    #[serde(default)]
    nested: IndexMap<String, Vec<ChildDecl>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LinkDecl {
    One(String),
    Many(Vec<String>),
}

impl LinkDecl {
    fn targets(&self) -> &[String] {
        match self {
            LinkDecl::One(k) => std::slice::from_ref(k),
            LinkDecl::Many(ks) => ks,
        }
    }
}

/// Load a raw dump document from a string, returning the record count
pub fn load_str(repository: &mut RawRepository, json: &str) -> Result<usize> {
    let dump: RawDump = serde_json::from_str(json)?;
    let count = dump.records.len();
    for decl in dump.records {
        let schema = repository
            .grammar()
            .schema(&decl.schema)
            .cloned()
            .ok_or_else(|| ModelError::UnknownSchema {
                key: decl.key.clone(),
                schema: decl.schema.clone(),
            })?;
        if schema.is_provided() {
            return Err(ModelError::ProvidedSchema {
                key: decl.key,
                schema: decl.schema,
            });
        }
        let record = build_record(
            &decl.key,
            schema,
            decl.namespace,
            decl.scalars,
            decl.links,
            decl.nested,
        )?;
        repository.add_raw(record)?;
    }
    tracing::debug!(records = count, "loaded raw dump");
    Ok(count)
}

/// Load a raw dump document from a file
pub fn load_path(repository: &mut RawRepository, path: impl AsRef<Path>) -> Result<usize> {
    load_str(repository, &fs::read_to_string(path)?)
}

fn build_record(
    key: &str,
    schema: Arc<EntitySchema>,
    namespace: Option<String>,
    scalars: IndexMap<String, serde_json::Value>,
    links: IndexMap<String, LinkDecl>,
    nested: IndexMap<String, Vec<ChildDecl>>,
) -> Result<RawRecord> {
    let mut builder = RawBuilder::new(key, schema.clone());
    if let Some(ns) = namespace {
        builder = builder.namespace(ns);
    }

    for (field, value) in scalars {
        let spec = schema.field(key, &field)?;
        let declared = match spec.kind() {
            FieldKind::Scalar(ty) => *ty,
            other => {
                return Err(ModelError::TypeMismatch {
                    key: key.to_string(),
                    field,
                    expected: other.describe(),
                    found: json_kind(&value).to_string(),
                });
            }
        };
        match value {
            serde_json::Value::Array(items) => {
                for item in items {
                    builder = builder.scalar(&field, coerce(key, &field, declared, &item)?)?;
                }
            }
            item => builder = builder.scalar(&field, coerce(key, &field, declared, &item)?)?,
        }
    }

    for (field, decl) in links {
        for target in decl.targets() {
            builder = builder.link(&field, target.as_str())?;
        }
    }

    for (field, children) in nested {
        let spec = schema.field(key, &field)?;
        let sub = match spec.kind() {
            FieldKind::Nested(sub) => sub.clone(),
            other => {
                return Err(ModelError::TypeMismatch {
                    key: key.to_string(),
                    field,
                    expected: other.describe(),
                    found: "nested records".to_string(),
                });
            }
        };
        for child in children {
            let record = build_record(
                &child.key,
                sub.clone(),
                None,
                child.scalars,
                child.links,
                child.nested,
            )?;
            builder = builder.child(&field, record)?;
        }
    }

    builder.build()
}

/// Coerce a JSON scalar by the declared property type
fn coerce(
    key: &str,
    field: &str,
    declared: PropertyType,
    value: &serde_json::Value,
) -> Result<PropertyValue> {
    let converted = match declared {
        PropertyType::Text => value.as_str().map(PropertyValue::from),
        PropertyType::Boolean => value.as_bool().map(PropertyValue::from),
        PropertyType::Integer => value.as_i64().map(PropertyValue::from),
        PropertyType::Decimal => value.as_f64().map(PropertyValue::from),
    };
    converted.ok_or_else(|| ModelError::TypeMismatch {
        key: key.to_string(),
        field: field.to_string(),
        expected: declared.label().to_string(),
        found: json_kind(value).to_string(),
    })
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factories::standard_registry;

    #[test]
    fn test_loads_records_through_builder() {
        let registry = standard_registry().unwrap();
        let mut repository = RawRepository::new(&registry).unwrap();
        let loaded = load_str(
            &mut repository,
            r#"{
                "records": [
                    { "key": "DomCore", "schema": "domain", "scalars": { "label": "Core" } },
                    {
                        "key": "EntCustomer",
                        "schema": "entity",
                        "namespace": "shop",
                        "links": { "domain": "DomCore" },
                        "nested": {
                            "attributes": [
                                { "key": "name", "links": { "value": "TypText" } }
                            ]
                        }
                    }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(loaded, 2);
        assert!(repository.contains(&"EntCustomer".into()));
    }

    #[test]
    fn test_scalar_kind_checked_against_schema() {
        let registry = standard_registry().unwrap();
        let mut repository = RawRepository::new(&registry).unwrap();
        let err = load_str(
            &mut repository,
            r#"{ "records": [ { "key": "DomCore", "schema": "domain", "scalars": { "label": 7 } } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ModelError::TypeMismatch { ref expected, ref found, .. }
                if expected == "text" && found == "number"
        ));
    }

    #[test]
    fn test_provided_schema_rejected() {
        let registry = standard_registry().unwrap();
        let mut repository = RawRepository::new(&registry).unwrap();
        let err = load_str(
            &mut repository,
            r#"{ "records": [ { "key": "TypMoney", "schema": "type", "scalars": { "property": "decimal" } } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::ProvidedSchema { ref schema, .. } if schema == "type"));
    }

    #[test]
    fn test_unknown_schema_reported() {
        let registry = standard_registry().unwrap();
        let mut repository = RawRepository::new(&registry).unwrap();
        let err = load_str(
            &mut repository,
            r#"{ "records": [ { "key": "X1", "schema": "mystery" } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::UnknownSchema { ref schema, .. } if schema == "mystery"));
    }
}
