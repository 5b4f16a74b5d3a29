//! Core factory: built-in value types and domains
//!
//! Owns the `type` schema (provided: its instances are the root raws seeded
//! by the grammar, one per scalar property kind) and the `domain` schema
//! (namespace grouping, no links).

use std::sync::Arc;

use crate::error::{ModelError, Result};
use crate::factory::SketchFactory;
use crate::grammar::Grammar;
use crate::notebook::Notebook;
use crate::property::PropertyType;
use crate::raw::{RawBuilder, RawRecord};
use crate::schema::{Cardinality, EntitySchema, FieldSpec};
use crate::sketch::{DomainSketch, Sketch, TypeSketch};

use super::wrong_factory;

/// Schema of the built-in value types
pub fn type_schema() -> Arc<EntitySchema> {
    Arc::new(
        EntitySchema::provided(
            "type",
            vec![
                FieldSpec::scalar("property", PropertyType::Text, Cardinality::One),
                FieldSpec::scalar("label", PropertyType::Text, Cardinality::Optional),
            ],
        )
        .expect("type schema is well-formed"),
    )
}

/// Schema of domain declarations
pub fn domain_schema() -> Arc<EntitySchema> {
    Arc::new(
        EntitySchema::new(
            "domain",
            vec![FieldSpec::scalar(
                "label",
                PropertyType::Text,
                Cardinality::Optional,
            )],
        )
        .expect("domain schema is well-formed"),
    )
}

pub struct CoreFactory;

impl SketchFactory for CoreFactory {
    fn name(&self) -> &'static str {
        "core"
    }

    fn grammar(&self) -> Result<Grammar> {
        let mut grammar = Grammar::new("core")
            .with_schema(type_schema())?
            .with_schema(domain_schema())?;
        for ty in PropertyType::ALL {
            let raw = RawBuilder::new(ty.sketch_name(), type_schema())
                .scalar("property", ty.label())?
                .build()?;
            grammar = grammar.with_root_raw(raw);
        }
        Ok(grammar)
    }

    fn supports(&self, schema: &EntitySchema) -> bool {
        matches!(schema.name(), "type" | "domain")
    }

    fn create_sketches(&self, _notebook: &Notebook, record: &RawRecord) -> Result<Vec<Sketch>> {
        let key = record.key().to_string();
        match record.schema().name() {
            "type" => {
                let label = record.text("property").unwrap_or_default();
                let property: PropertyType =
                    label.parse().map_err(|_| ModelError::TypeMismatch {
                        key: key.clone(),
                        field: "property".to_string(),
                        expected: "a property type label".to_string(),
                        found: label.to_string(),
                    })?;
                Ok(vec![Sketch::Type(TypeSketch {
                    name: key,
                    property,
                    label: record.text("label").map(str::to_string),
                })])
            }
            "domain" => Ok(vec![Sketch::Domain(DomainSketch {
                name: key,
                namespace: record.namespace().map(str::to_string),
                label: record.text("label").map(str::to_string),
            })]),
            _ => Err(wrong_factory(record)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_seeds_all_types() {
        let grammar = CoreFactory.grammar().unwrap();
        assert_eq!(grammar.root_raws().len(), PropertyType::ALL.len());
        assert!(grammar.schema("type").unwrap().is_provided());
        assert!(!grammar.schema("domain").unwrap().is_provided());
    }

    #[test]
    fn test_type_sketch_from_root_raw() {
        let grammar = CoreFactory.grammar().unwrap();
        let notebook = Notebook::new();
        let raw = &grammar.root_raws()[0];
        let sketches = CoreFactory.create_sketches(&notebook, raw).unwrap();
        let ty = sketches[0].as_type().unwrap();
        assert_eq!(ty.name, "TypText");
        assert_eq!(ty.property, PropertyType::Text);
    }
}
