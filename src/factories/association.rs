//! Association factory
//!
//! Owns the `association` schema: a directed link between two entities.
//! Entity-to-entity references live here, in their own kind, so the kind
//! dependency graph stays acyclic.

use std::sync::Arc;

use crate::error::Result;
use crate::factory::SketchFactory;
use crate::grammar::Grammar;
use crate::notebook::Notebook;
use crate::property::PropertyType;
use crate::raw::RawRecord;
use crate::schema::{Cardinality, EntitySchema, FieldSpec};
use crate::sketch::{AssociationSketch, Sketch, SketchKind};

use super::{one_link, resolve_link, wrong_factory};

/// Schema of association declarations
pub fn association_schema() -> Arc<EntitySchema> {
    Arc::new(
        EntitySchema::new(
            "association",
            vec![
                FieldSpec::link("source", "entity", Cardinality::One),
                FieldSpec::link("target", "entity", Cardinality::One),
                FieldSpec::scalar("cardinality", PropertyType::Text, Cardinality::Optional),
                FieldSpec::scalar("label", PropertyType::Text, Cardinality::Optional),
            ],
        )
        .expect("association schema is well-formed"),
    )
}

pub struct AssociationFactory;

impl SketchFactory for AssociationFactory {
    fn name(&self) -> &'static str {
        "association"
    }

    fn grammar(&self) -> Result<Grammar> {
        Grammar::new("association").with_schema(association_schema())
    }

    fn supports(&self, schema: &EntitySchema) -> bool {
        schema.name() == "association"
    }

    fn create_sketches(&self, notebook: &Notebook, record: &RawRecord) -> Result<Vec<Sketch>> {
        if record.schema().name() != "association" {
            return Err(wrong_factory(record));
        }
        let key = record.key().as_str();
        let source = one_link(record, "source")?;
        let target = one_link(record, "target")?;
        resolve_link(notebook, key, "source", source, SketchKind::Entity)?;
        resolve_link(notebook, key, "target", target, SketchKind::Entity)?;
        Ok(vec![Sketch::Association(AssociationSketch {
            name: key.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            cardinality: record.text("cardinality").map(str::to_string),
            label: record.text("label").map(str::to_string),
        })])
    }
}
