//! Task factory
//!
//! Owns the `task` schema: a task acts on one entity, reads many input
//! attributes, and writes at most one output attribute. A task record
//! produces exactly one sketch.
//!
//! Shorthand: `logged = true` cascades a synthesized `filekind` raw for the
//! task's log file during gather, inserted with the usual duplicate and
//! schema checks.

use std::sync::Arc;

use crate::error::Result;
use crate::factory::SketchFactory;
use crate::grammar::Grammar;
use crate::notebook::Notebook;
use crate::property::PropertyType;
use crate::raw::{RawBuilder, RawRecord};
use crate::schema::{Cardinality, EntitySchema, FieldSpec};
use crate::sketch::{Sketch, SketchKind, TaskSketch};

use super::{filekind::filekind_schema, one_link, resolve_link, wrong_factory};

/// Schema of task declarations
///
/// Input and output links are declared against the `entity` schema but
/// carry `$member` keys; they resolve to Attribute sketches registered by
/// the entity factory.
pub fn task_schema() -> Arc<EntitySchema> {
    Arc::new(
        EntitySchema::new(
            "task",
            vec![
                FieldSpec::link("entity", "entity", Cardinality::One),
                FieldSpec::link("inputs", "entity", Cardinality::Many),
                FieldSpec::link("output", "entity", Cardinality::Optional),
                FieldSpec::scalar("label", PropertyType::Text, Cardinality::Optional),
                FieldSpec::scalar("logged", PropertyType::Boolean, Cardinality::Optional),
            ],
        )
        .expect("task schema is well-formed"),
    )
}

pub struct TaskFactory;

impl SketchFactory for TaskFactory {
    fn name(&self) -> &'static str {
        "task"
    }

    fn grammar(&self) -> Result<Grammar> {
        Grammar::new("task").with_schema(task_schema())
    }

    fn supports(&self, schema: &EntitySchema) -> bool {
        schema.name() == "task"
    }

    fn create_sketches(&self, notebook: &Notebook, record: &RawRecord) -> Result<Vec<Sketch>> {
        if record.schema().name() != "task" {
            return Err(wrong_factory(record));
        }
        let key = record.key().as_str();
        let entity = one_link(record, "entity")?;
        resolve_link(notebook, key, "entity", entity, SketchKind::Entity)?;

        let mut inputs = Vec::new();
        for input in record.links("inputs") {
            resolve_link(notebook, key, "inputs", input, SketchKind::Attribute)?;
            inputs.push(input.to_string());
        }
        let output = match record.link("output") {
            Some(target) => {
                resolve_link(notebook, key, "output", target, SketchKind::Attribute)?;
                Some(target.to_string())
            }
            None => None,
        };

        Ok(vec![Sketch::Task(TaskSketch {
            name: key.to_string(),
            entity: entity.to_string(),
            label: record.text("label").map(str::to_string),
            inputs,
            output,
            logged: record.boolean("logged").unwrap_or(false),
        })])
    }

    fn on_new_raw(&self, record: &RawRecord) -> Result<Vec<RawRecord>> {
        if record.boolean("logged") != Some(true) {
            return Ok(Vec::new());
        }
        let key = record.key().as_str();
        SketchKind::Task.validate_name(key)?;
        let stem = key.strip_prefix("Tsk").unwrap_or(key);
        let file = format!("Fil{stem}");
        let mut builder = RawBuilder::new(file.as_str(), filekind_schema())
            .scalar("extension", "log")?
            .scalar("format", "text")?;
        if let Some(entity) = record.link("entity") {
            builder = builder.link("entity", entity.clone())?;
        }
        tracing::debug!(task = key, file = %file, "synthesized log file kind");
        Ok(vec![builder.build()?])
    }
}
