//! Field customizations
//!
//! Customizations are supplied as a JSON object keyed by `schema.table.field`
//! (or `table.field` for relations without a schema). Keys are parsed into
//! structured [`FieldPath`]s once, when the map is loaded, and validated
//! before any generation starts.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::error::TableTypesError;
use crate::metadata::{RelationId, SchemaMetadata};

/// Fully qualified location of a table field
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    pub schema: Option<String>,
    pub table: String,
    pub field: String,
}

impl FieldPath {
    pub fn new(relation: &RelationId, field: &str) -> Self {
        Self {
            schema: relation.schema.clone(),
            table: relation.name.clone(),
            field: field.to_string(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{}.", schema)?;
        }
        write!(f, "{}.{}", self.table, self.field)
    }
}

impl FromStr for FieldPath {
    type Err = TableTypesError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = key.split('.').map(str::trim).collect();

        if parts.iter().any(|p| p.is_empty()) {
            return Err(malformed(key, "key contains an empty path component"));
        }

        match parts.as_slice() {
            [table, field] => Ok(Self {
                schema: None,
                table: table.to_string(),
                field: field.to_string(),
            }),
            [schema, table, field] => Ok(Self {
                schema: Some(schema.to_string()),
                table: table.to_string(),
                field: field.to_string(),
            }),
            _ => Err(malformed(
                key,
                "expected 'schema.table.field' or 'table.field'",
            )),
        }
    }
}

/// Overrides for a single field; `None` means the default policy applies
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldCustomization {
    /// Output type used verbatim instead of the mapped type
    #[serde(default)]
    pub property_type: Option<String>,
    /// Type inclusion for every usage context
    #[serde(default)]
    pub include_in_type: Option<bool>,
    /// Type inclusion for insert-oriented definitions, over `include_in_type`
    #[serde(default)]
    pub include_in_insert_type: Option<bool>,
    /// Type inclusion for query-oriented definitions, over `include_in_type`
    #[serde(default)]
    pub include_in_query_type: Option<bool>,
    #[serde(default)]
    pub include_in_insert_sql: Option<bool>,
}

impl FieldCustomization {
    fn validate(&self, key: &str) -> Result<(), TableTypesError> {
        if let Some(ty) = &self.property_type {
            if ty.trim().is_empty() {
                return Err(malformed(key, "propertyType must not be blank"));
            }
        }

        let in_insert_type = self.include_in_insert_type.or(self.include_in_type);
        if in_insert_type == Some(false) && self.include_in_insert_sql == Some(true) {
            return Err(malformed(
                key,
                "field is excluded from the insert type but included in insert SQL",
            ));
        }

        Ok(())
    }
}

/// Immutable map of field customizations for one generation run
#[derive(Debug, Clone, Default)]
pub struct Customizations {
    entries: BTreeMap<FieldPath, FieldCustomization>,
}

impl Customizations {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decode the string-keyed JSON customization format
    pub fn from_json(json: &str) -> Result<Self, TableTypesError> {
        let raw: HashMap<String, FieldCustomization> =
            serde_json::from_str(json).map_err(|e| TableTypesError::MalformedCustomization {
                key: "<document>".to_string(),
                message: e.to_string(),
            })?;

        Self::from_entries(raw)
    }

    /// Build from string-keyed entries, validating every entry
    pub fn from_entries<I>(raw: I) -> Result<Self, TableTypesError>
    where
        I: IntoIterator<Item = (String, FieldCustomization)>,
    {
        let mut raw: Vec<_> = raw.into_iter().collect();
        raw.sort_by(|a, b| a.0.cmp(&b.0));

        let mut entries = BTreeMap::new();
        for (key, customization) in raw {
            let path: FieldPath = key.parse()?;
            customization.validate(&key)?;

            if let Some(existing) = entries.get(&path) {
                if existing != &customization {
                    error!(key = ?key, path = %path, "Conflicting customizations for field");
                    return Err(malformed(
                        &key,
                        &format!("conflicts with another customization of '{}'", path),
                    ));
                }
                continue;
            }

            debug!(path = %path, customization = ?customization, "Loaded field customization");
            entries.insert(path, customization);
        }

        Ok(Self { entries })
    }

    pub fn get(&self, path: &FieldPath) -> Option<&FieldCustomization> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paths that match no table field in the metadata
    pub fn unmatched_paths(&self, metadata: &SchemaMetadata) -> Vec<&FieldPath> {
        self.entries
            .keys()
            .filter(|path| {
                !metadata.tables().any(|rel| {
                    rel.relation_id.schema == path.schema
                        && rel.relation_id.name == path.table
                        && rel.fields.iter().any(|f| f.name == path.field)
                })
            })
            .collect()
    }

    /// Log a warning for every customization that matches no field
    pub fn warn_unmatched(&self, metadata: &SchemaMetadata) {
        for path in self.unmatched_paths(metadata) {
            warn!(path = %path, "Customization does not match any table field, ignoring");
        }
    }
}

fn malformed(key: &str, message: &str) -> TableTypesError {
    TableTypesError::MalformedCustomization {
        key: key.to_string(),
        message: message.to_string(),
    }
}
