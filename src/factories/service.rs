//! Service factory
//!
//! Owns the `service` schema: a web-service shape exposing one entity, with
//! nested operation declarations. A service that declares no operations
//! gets a default outbound `fetch` operation at build time.

use std::sync::Arc;

use crate::error::Result;
use crate::factory::SketchFactory;
use crate::grammar::Grammar;
use crate::notebook::Notebook;
use crate::property::PropertyType;
use crate::raw::RawRecord;
use crate::schema::{Cardinality, EntitySchema, FieldSpec};
use crate::sketch::{OperationSketch, ServiceSketch, Sketch, SketchKind};

use super::{one_link, resolve_link, wrong_factory};

/// Sub-schema of one service operation; the child key is the operation name
pub fn operation_schema() -> Arc<EntitySchema> {
    Arc::new(
        EntitySchema::new(
            "operation",
            vec![FieldSpec::scalar(
                "direction",
                PropertyType::Text,
                Cardinality::Optional,
            )],
        )
        .expect("operation schema is well-formed"),
    )
}

/// Schema of service declarations
pub fn service_schema() -> Arc<EntitySchema> {
    Arc::new(
        EntitySchema::new(
            "service",
            vec![
                FieldSpec::link("entity", "entity", Cardinality::One),
                FieldSpec::scalar("label", PropertyType::Text, Cardinality::Optional),
                FieldSpec::nested("operations", operation_schema(), Cardinality::Many),
            ],
        )
        .expect("service schema is well-formed"),
    )
}

pub struct ServiceFactory;

impl SketchFactory for ServiceFactory {
    fn name(&self) -> &'static str {
        "service"
    }

    fn grammar(&self) -> Result<Grammar> {
        Grammar::new("service").with_schema(service_schema())
    }

    fn supports(&self, schema: &EntitySchema) -> bool {
        schema.name() == "service"
    }

    fn create_sketches(&self, notebook: &Notebook, record: &RawRecord) -> Result<Vec<Sketch>> {
        if record.schema().name() != "service" {
            return Err(wrong_factory(record));
        }
        let key = record.key().as_str();
        let entity = one_link(record, "entity")?;
        resolve_link(notebook, key, "entity", entity, SketchKind::Entity)?;

        let mut operations: Vec<OperationSketch> = record
            .children("operations")
            .iter()
            .map(|child| OperationSketch {
                name: child.key().to_string(),
                direction: child
                    .text("direction")
                    .unwrap_or("inbound")
                    .to_string(),
            })
            .collect();
        if operations.is_empty() {
            operations.push(OperationSketch {
                name: "fetch".to_string(),
                direction: "outbound".to_string(),
            });
        }

        Ok(vec![Sketch::Service(ServiceSketch {
            name: key.to_string(),
            entity: entity.to_string(),
            label: record.text("label").map(str::to_string),
            operations,
        })])
    }
}
