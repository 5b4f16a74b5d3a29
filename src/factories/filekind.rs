//! File-kind factory
//!
//! Owns the `filekind` schema: a named file artifact shape serializing one
//! entity. File kinds are either declared in sources or synthesized by the
//! task factory's cascade for logged tasks.

use std::sync::Arc;

use crate::error::Result;
use crate::factory::SketchFactory;
use crate::grammar::Grammar;
use crate::notebook::Notebook;
use crate::property::PropertyType;
use crate::raw::RawRecord;
use crate::schema::{Cardinality, EntitySchema, FieldSpec};
use crate::sketch::{FileKindSketch, Sketch, SketchKind};

use super::{one_link, resolve_link, wrong_factory};

/// Schema of file-kind declarations
pub fn filekind_schema() -> Arc<EntitySchema> {
    Arc::new(
        EntitySchema::new(
            "filekind",
            vec![
                FieldSpec::link("entity", "entity", Cardinality::One),
                FieldSpec::scalar("extension", PropertyType::Text, Cardinality::One),
                FieldSpec::scalar("format", PropertyType::Text, Cardinality::Optional),
                FieldSpec::scalar("label", PropertyType::Text, Cardinality::Optional),
            ],
        )
        .expect("filekind schema is well-formed"),
    )
}

pub struct FileKindFactory;

impl SketchFactory for FileKindFactory {
    fn name(&self) -> &'static str {
        "filekind"
    }

    fn grammar(&self) -> Result<Grammar> {
        Grammar::new("filekind").with_schema(filekind_schema())
    }

    fn supports(&self, schema: &EntitySchema) -> bool {
        schema.name() == "filekind"
    }

    fn create_sketches(&self, notebook: &Notebook, record: &RawRecord) -> Result<Vec<Sketch>> {
        if record.schema().name() != "filekind" {
            return Err(wrong_factory(record));
        }
        let key = record.key().as_str();
        let entity = one_link(record, "entity")?;
        resolve_link(notebook, key, "entity", entity, SketchKind::Entity)?;
        Ok(vec![Sketch::FileKind(FileKindSketch {
            name: key.to_string(),
            entity: entity.to_string(),
            extension: record.text("extension").unwrap_or_default().to_string(),
            format: record.text("format").map(str::to_string),
            label: record.text("label").map(str::to_string),
        })])
    }
}
