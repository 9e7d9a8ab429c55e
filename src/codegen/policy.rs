//! Field inclusion policy
//!
//! Decides per field whether it appears in a generated record (per usage
//! context) and in generated insert SQL. Customizations win when present;
//! otherwise columns the database always generates are left out of anything
//! insert-oriented.

use tracing::trace;

use super::Usage;
use crate::customize::{Customizations, FieldPath};
use crate::metadata::{Field, RelationMetadata};

pub struct FieldPolicy<'a> {
    customizations: &'a Customizations,
}

impl<'a> FieldPolicy<'a> {
    pub fn new(customizations: &'a Customizations) -> Self {
        Self { customizations }
    }

    /// Whether the field is a component of the record generated for `usage`
    pub fn include_in_type(&self, path: &FieldPath, field: &Field, usage: Usage) -> bool {
        let overridden = self.customizations.get(path).and_then(|c| match usage {
            Usage::Insert => c.include_in_insert_type.or(c.include_in_type),
            Usage::Query => c.include_in_query_type.or(c.include_in_type),
            Usage::Any => c.include_in_type,
        });

        let include = overridden.unwrap_or_else(|| match usage {
            Usage::Query => true,
            Usage::Insert | Usage::Any => !field.is_generated_always(),
        });

        trace!(
            field = %path,
            usage = ?usage,
            overridden = overridden.is_some(),
            include,
            "Type inclusion"
        );
        include
    }

    /// Whether the field is a column of the generated insert statement
    pub fn include_in_insert_sql(&self, path: &FieldPath, field: &Field) -> bool {
        self.customizations
            .get(path)
            .and_then(|c| c.include_in_insert_sql)
            .unwrap_or_else(|| !field.is_generated_always())
    }

    /// Fields of the record generated for `usage`, in declared order
    pub fn type_fields<'r>(&self, relation: &'r RelationMetadata, usage: Usage) -> Vec<&'r Field> {
        relation
            .fields
            .iter()
            .filter(|f| {
                let path = FieldPath::new(&relation.relation_id, &f.name);
                self.include_in_type(&path, f, usage)
            })
            .collect()
    }

    /// Columns of the generated insert statement, in declared order
    pub fn insert_sql_fields<'r>(&self, relation: &'r RelationMetadata) -> Vec<&'r Field> {
        relation
            .fields
            .iter()
            .filter(|f| {
                let path = FieldPath::new(&relation.relation_id, &f.name);
                self.include_in_insert_sql(&path, f)
            })
            .collect()
    }
}
