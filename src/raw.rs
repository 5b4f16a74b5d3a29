//! Raw records
//!
//! A raw record is a loosely-typed declaration gathered from an external
//! source: a unique key, an optional namespace, scalar values, named links to
//! other record keys, and nested child records. It conforms to exactly one
//! entity schema and is validated against it as it is built, so malformed
//! loader output fails at construction time rather than at solve time. Only
//! link target existence is deferred to the solve phase.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::property::PropertyValue;
use crate::schema::{Cardinality, EntitySchema, FieldKind, FieldSpec};

/// Opaque, case-sensitive record key, unique across one repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawKey(String);

impl RawKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RawKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RawKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RawKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Values held by a scalar field, shaped by its cardinality
#[derive(Debug, Clone)]
enum ScalarSlot {
    One(PropertyValue),
    Many(Vec<PropertyValue>),
}

/// Keys held by a link field, shaped by its cardinality
#[derive(Debug, Clone)]
enum LinkSlot {
    One(RawKey),
    Many(Vec<RawKey>),
}

/// A schema-validated, not-yet-resolved declaration
#[derive(Debug, Clone)]
pub struct RawRecord {
    key: RawKey,
    schema: Arc<EntitySchema>,
    namespace: Option<String>,
    scalars: IndexMap<String, ScalarSlot>,
    links: IndexMap<String, LinkSlot>,
    nested: IndexMap<String, Vec<RawRecord>>,
}

impl RawRecord {
    pub fn key(&self) -> &RawKey {
        &self.key
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Single scalar value of a `one`/`optional` field
    pub fn scalar(&self, field: &str) -> Option<&PropertyValue> {
        match self.scalars.get(field)? {
            ScalarSlot::One(v) => Some(v),
            ScalarSlot::Many(_) => None,
        }
    }

    /// All scalar values of a `many` field, in assignment order
    pub fn scalars(&self, field: &str) -> &[PropertyValue] {
        match self.scalars.get(field) {
            Some(ScalarSlot::Many(vs)) => vs,
            Some(ScalarSlot::One(v)) => std::slice::from_ref(v),
            None => &[],
        }
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.scalar(field).and_then(PropertyValue::as_text)
    }

    pub fn boolean(&self, field: &str) -> Option<bool> {
        self.scalar(field).and_then(PropertyValue::as_boolean)
    }

    pub fn integer(&self, field: &str) -> Option<i64> {
        self.scalar(field).and_then(PropertyValue::as_integer)
    }

    /// Single link target of a `one`/`optional` field
    pub fn link(&self, field: &str) -> Option<&RawKey> {
        match self.links.get(field)? {
            LinkSlot::One(k) => Some(k),
            LinkSlot::Many(_) => None,
        }
    }

    /// All link targets of a field, in assignment order
    pub fn links(&self, field: &str) -> &[RawKey] {
        match self.links.get(field) {
            Some(LinkSlot::Many(ks)) => ks,
            Some(LinkSlot::One(k)) => std::slice::from_ref(k),
            None => &[],
        }
    }

    /// Nested child records of a field, in assignment order
    pub fn children(&self, field: &str) -> &[RawRecord] {
        self.nested.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Builder validating each assignment against the schema
///
/// Fails early: unknown fields, runtime-kind mismatches, and double
/// assignment of `one`/`optional` fields are rejected on the call that
/// introduces them. `build` checks required fields last.
#[derive(Debug)]
pub struct RawBuilder {
    key: RawKey,
    schema: Arc<EntitySchema>,
    namespace: Option<String>,
    scalars: IndexMap<String, ScalarSlot>,
    links: IndexMap<String, LinkSlot>,
    nested: IndexMap<String, Vec<RawRecord>>,
}

impl RawBuilder {
    pub fn new(key: impl Into<RawKey>, schema: Arc<EntitySchema>) -> Self {
        Self {
            key: key.into(),
            schema,
            namespace: None,
            scalars: IndexMap::new(),
            links: IndexMap::new(),
            nested: IndexMap::new(),
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Assign a scalar value
    pub fn scalar(mut self, field: &str, value: impl Into<PropertyValue>) -> Result<Self> {
        let value = value.into();
        let spec = self.schema.field(self.key.as_str(), field)?;
        let declared = match spec.kind() {
            FieldKind::Scalar(ty) => *ty,
            other => {
                return Err(self.mismatch(field, &other.describe(), &format!("scalar {}", value.kind())));
            }
        };
        if value.kind() != declared {
            return Err(self.mismatch(field, declared.label(), value.kind().label()));
        }
        match spec.cardinality() {
            Cardinality::Many => {
                let slot = self
                    .scalars
                    .entry(field.to_string())
                    .or_insert_with(|| ScalarSlot::Many(Vec::new()));
                match slot {
                    ScalarSlot::Many(vs) => vs.push(value),
                    ScalarSlot::One(_) => unreachable!("many field stored as one"),
                }
            }
            Cardinality::One | Cardinality::Optional => {
                if self.scalars.contains_key(field) {
                    return Err(ModelError::DuplicateAssignment {
                        key: self.key.to_string(),
                        field: field.to_string(),
                    });
                }
                self.scalars.insert(field.to_string(), ScalarSlot::One(value));
            }
        }
        Ok(self)
    }

    /// Assign a link to another record key
    pub fn link(mut self, field: &str, target: impl Into<RawKey>) -> Result<Self> {
        let target = target.into();
        let spec = self.schema.field(self.key.as_str(), field)?;
        if !matches!(spec.kind(), FieldKind::Link { .. }) {
            return Err(self.mismatch(field, &spec.kind().describe(), "link"));
        }
        match spec.cardinality() {
            Cardinality::Many => {
                let slot = self
                    .links
                    .entry(field.to_string())
                    .or_insert_with(|| LinkSlot::Many(Vec::new()));
                match slot {
                    LinkSlot::Many(ks) => ks.push(target),
                    LinkSlot::One(_) => unreachable!("many field stored as one"),
                }
            }
            Cardinality::One | Cardinality::Optional => {
                if self.links.contains_key(field) {
                    return Err(ModelError::DuplicateAssignment {
                        key: self.key.to_string(),
                        field: field.to_string(),
                    });
                }
                self.links.insert(field.to_string(), LinkSlot::One(target));
            }
        }
        Ok(self)
    }

    /// Attach a nested child record
    ///
    /// The child must have been built against the field's declared
    /// sub-schema. Child keys are local member names, not repository keys.
    pub fn child(mut self, field: &str, record: RawRecord) -> Result<Self> {
        let spec = self.schema.field(self.key.as_str(), field)?;
        let sub = match spec.kind() {
            FieldKind::Nested(sub) => sub,
            other => {
                return Err(self.mismatch(
                    field,
                    &other.describe(),
                    &format!("nested `{}`", record.schema().name()),
                ));
            }
        };
        if sub.name() != record.schema().name() {
            return Err(self.mismatch(
                field,
                &format!("nested `{}`", sub.name()),
                &format!("nested `{}`", record.schema().name()),
            ));
        }
        if !matches!(spec.cardinality(), Cardinality::Many) && self.nested.contains_key(field) {
            return Err(ModelError::DuplicateAssignment {
                key: self.key.to_string(),
                field: field.to_string(),
            });
        }
        self.nested.entry(field.to_string()).or_default().push(record);
        Ok(self)
    }

    /// Finish the record, checking required fields
    pub fn build(self) -> Result<RawRecord> {
        for spec in self.schema.fields() {
            if spec.required() && !self.has_value(spec) {
                return Err(ModelError::MissingRequiredField {
                    key: self.key.to_string(),
                    field: spec.name().to_string(),
                });
            }
        }
        Ok(RawRecord {
            key: self.key,
            schema: self.schema,
            namespace: self.namespace,
            scalars: self.scalars,
            links: self.links,
            nested: self.nested,
        })
    }

    fn has_value(&self, spec: &FieldSpec) -> bool {
        self.scalars.contains_key(spec.name())
            || self.links.contains_key(spec.name())
            || self.nested.contains_key(spec.name())
    }

    fn mismatch(&self, field: &str, expected: &str, found: &str) -> ModelError {
        ModelError::TypeMismatch {
            key: self.key.to_string(),
            field: field.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}
