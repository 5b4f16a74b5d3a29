//! Entity factory
//!
//! Owns the `entity` schema: a link to its domain, nested attribute
//! declarations, and optional nested master-data rows. One entity record
//! resolves into:
//! - one Entity sketch,
//! - one member Attribute sketch per attribute (`Entity$attr`),
//! - a companion StaticData sketch when master-data rows are present.
//!
//! Nested child keys are local member names (`name`, `price`), not
//! repository keys; the attribute sketch name is derived from the parent.

use std::sync::Arc;

use crate::error::{ModelError, Result};
use crate::factory::SketchFactory;
use crate::grammar::Grammar;
use crate::notebook::Notebook;
use crate::property::PropertyType;
use crate::raw::RawRecord;
use crate::schema::{Cardinality, EntitySchema, FieldSpec};
use crate::sketch::{AttributeSketch, EntitySketch, Sketch, SketchKind, StaticDataSketch};

use super::{one_link, resolve_link, wrong_factory};

/// Sub-schema of one attribute declaration
pub fn attribute_schema() -> Arc<EntitySchema> {
    Arc::new(
        EntitySchema::new(
            "attribute",
            vec![
                FieldSpec::link("value", "type", Cardinality::One),
                FieldSpec::scalar("required", PropertyType::Boolean, Cardinality::Optional),
                FieldSpec::scalar("label", PropertyType::Text, Cardinality::Optional),
            ],
        )
        .expect("attribute schema is well-formed"),
    )
}

/// Sub-schema of one master-data cell
pub fn cell_schema() -> Arc<EntitySchema> {
    Arc::new(
        EntitySchema::new(
            "cell",
            vec![
                FieldSpec::scalar("attribute", PropertyType::Text, Cardinality::One),
                FieldSpec::scalar("value", PropertyType::Text, Cardinality::One),
            ],
        )
        .expect("cell schema is well-formed"),
    )
}

/// Sub-schema of one master-data row
pub fn row_schema() -> Arc<EntitySchema> {
    Arc::new(
        EntitySchema::new(
            "row",
            vec![FieldSpec::nested("cells", cell_schema(), Cardinality::Many)],
        )
        .expect("row schema is well-formed"),
    )
}

/// Schema of entity declarations
pub fn entity_schema() -> Arc<EntitySchema> {
    Arc::new(
        EntitySchema::new(
            "entity",
            vec![
                FieldSpec::link("domain", "domain", Cardinality::One),
                FieldSpec::scalar("label", PropertyType::Text, Cardinality::Optional),
                FieldSpec::nested("attributes", attribute_schema(), Cardinality::Many),
                FieldSpec::nested("rows", row_schema(), Cardinality::Many),
            ],
        )
        .expect("entity schema is well-formed"),
    )
}

pub struct EntityFactory;

impl SketchFactory for EntityFactory {
    fn name(&self) -> &'static str {
        "entity"
    }

    fn grammar(&self) -> Result<Grammar> {
        Grammar::new("entity").with_schema(entity_schema())
    }

    fn supports(&self, schema: &EntitySchema) -> bool {
        schema.name() == "entity"
    }

    fn create_sketches(&self, notebook: &Notebook, record: &RawRecord) -> Result<Vec<Sketch>> {
        if record.schema().name() != "entity" {
            return Err(wrong_factory(record));
        }
        let key = record.key().as_str();
        SketchKind::Entity.validate_name(key)?;

        let domain = one_link(record, "domain")?;
        resolve_link(notebook, key, "domain", domain, SketchKind::Domain)?;

        let mut sketches = Vec::new();
        let mut attribute_names = Vec::new();
        for child in record.children("attributes") {
            let member = child.key().as_str();
            let attr_name = format!("{key}${member}");
            let value = one_link(child, "value")?;
            resolve_link(notebook, &attr_name, "value", value, SketchKind::Type)?;
            attribute_names.push(attr_name.clone());
            sketches.push(Sketch::Attribute(AttributeSketch {
                name: attr_name,
                entity: key.to_string(),
                value_type: value.to_string(),
                required: child.boolean("required").unwrap_or(false),
                label: child.text("label").map(str::to_string),
            }));
        }

        let rows = self.collect_rows(record, &attribute_names)?;
        let has_static_data = !rows.is_empty();

        sketches.insert(
            0,
            Sketch::Entity(EntitySketch {
                name: key.to_string(),
                domain: domain.to_string(),
                label: record.text("label").map(str::to_string),
                attributes: attribute_names,
                has_static_data,
            }),
        );

        if has_static_data {
            // `EntCustomer` ships its rows as `DatCustomer`.
            let stem = key.strip_prefix("Ent").unwrap_or(key);
            sketches.push(Sketch::StaticData(StaticDataSketch {
                name: format!("Dat{stem}"),
                entity: key.to_string(),
                rows,
            }));
        }
        Ok(sketches)
    }
}

impl EntityFactory {
    /// Master-data rows as stable JSON objects keyed by member name
    ///
    /// Every cell must name a declared attribute; a stray name is a dangling
    /// reference into the entity's own members.
    fn collect_rows(
        &self,
        record: &RawRecord,
        attribute_names: &[String],
    ) -> Result<Vec<serde_json::Value>> {
        let key = record.key().as_str();
        let mut rows = Vec::new();
        for row in record.children("rows") {
            let mut object = serde_json::Map::new();
            for cell in row.children("cells") {
                let attribute = cell.text("attribute").unwrap_or_default();
                let qualified = format!("{key}${attribute}");
                if !attribute_names.contains(&qualified) {
                    return Err(ModelError::UnresolvedLink {
                        key: key.to_string(),
                        field: "rows".to_string(),
                        target: attribute.to_string(),
                    });
                }
                let value = cell.text("value").unwrap_or_default();
                object.insert(attribute.to_string(), serde_json::Value::from(value));
            }
            rows.push(serde_json::Value::Object(object));
        }
        Ok(rows)
    }
}
