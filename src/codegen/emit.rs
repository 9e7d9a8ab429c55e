//! Metadata to definition translation
//!
//! Each table yields one record, or two when its insert shape differs from its
//! query shape (typically because of an always-generated identity column).
//! Each enumerated type yields one enum. Definitions are grouped into one
//! [`SchemaUnit`] per schema class.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, error, info, trace, warn};

use super::policy::FieldPolicy;
use super::types::TypeMapper;
use super::{
    sql, EnumConstant, EnumDefinition, GeneratedField, GeneratedTypeDefinition, RecordDefinition,
    SchemaUnit, Usage,
};
use crate::config::GenConfig;
use crate::customize::{Customizations, FieldPath};
use crate::error::TableTypesError;
use crate::metadata::{EnumType, Field, RelationKind, RelationMetadata, SchemaMetadata, DEFAULT_SCHEMA};
use crate::naming::{enum_constant_name, schema_class_name};

/// Translates schema metadata into generated type definitions
pub struct DefinitionEmitter<'a> {
    config: &'a GenConfig,
    customizations: &'a Customizations,
}

impl<'a> DefinitionEmitter<'a> {
    pub fn new(config: &'a GenConfig, customizations: &'a Customizations) -> Self {
        Self {
            config,
            customizations,
        }
    }

    /// Generate the definitions of every schema, ordered by schema name with the
    /// default schema first
    ///
    /// The first error aborts the whole run.
    pub fn emit(&self, metadata: &SchemaMetadata) -> Result<Vec<SchemaUnit>, TableTypesError> {
        info!(
            relations = metadata.relation_metadatas.len(),
            enums = metadata.enum_types.len(),
            "Generating definitions"
        );

        let mut units: BTreeMap<String, SchemaUnit> = BTreeMap::new();

        for relation in &metadata.relation_metadatas {
            if relation.relation_type != RelationKind::Table {
                debug!(
                    relation = %relation.relation_id,
                    kind = ?relation.relation_type,
                    "Skipping non-table relation"
                );
                continue;
            }

            let definitions = self.table_definitions(relation)?;
            self.unit_for(&mut units, relation.relation_id.schema.as_deref())?
                .definitions
                .extend(definitions);
        }

        for enum_type in &metadata.enum_types {
            let definition = self.enum_definition(enum_type);
            self.unit_for(&mut units, enum_type.schema.as_deref())?
                .definitions
                .push(GeneratedTypeDefinition::Enum(definition));
        }

        let units: Vec<SchemaUnit> = units.into_values().collect();
        info!(units = units.len(), "Definitions generated");
        Ok(units)
    }

    /// Records generated for one table
    pub fn table_definitions(
        &self,
        relation: &RelationMetadata,
    ) -> Result<Vec<GeneratedTypeDefinition>, TableTypesError> {
        let relation_name = relation.relation_id.to_string();
        let policy = FieldPolicy::new(self.customizations);

        let query_fields = policy.type_fields(relation, Usage::Query);
        let insert_fields = policy.type_fields(relation, Usage::Insert);

        let insert_sql_fields = policy.insert_sql_fields(relation);
        let returning: Vec<&Field> = relation
            .fields
            .iter()
            .filter(|f| f.is_generated_always())
            .collect();
        let all_fields: Vec<&Field> = relation.fields.iter().collect();

        let insert_sql = sql::insert_sql(
            &relation_name,
            &insert_sql_fields,
            &returning,
            self.config.naming.param,
        );
        let query_sql = sql::select_sql(&relation_name, &all_fields);

        let record_name = self.config.naming.table.apply(&relation.relation_id.name);

        let same_shape = query_fields
            .iter()
            .map(|f| &f.name)
            .eq(insert_fields.iter().map(|f| &f.name));

        let definitions = if same_shape {
            debug!(relation = %relation_name, record = %record_name, "Generating combined record");
            vec![self.record(
                relation,
                record_name,
                Usage::Any,
                &insert_fields,
                Some(insert_sql),
                Some(query_sql),
            )?]
        } else {
            let insert_name = format!("{}{}", record_name, self.config.insert_suffix);
            debug!(
                relation = %relation_name,
                record = %record_name,
                insert_record = %insert_name,
                "Generating separate query and insert records"
            );
            vec![
                self.record(
                    relation,
                    record_name,
                    Usage::Query,
                    &query_fields,
                    None,
                    Some(query_sql),
                )?,
                self.record(
                    relation,
                    insert_name,
                    Usage::Insert,
                    &insert_fields,
                    Some(insert_sql),
                    None,
                )?,
            ]
        };

        Ok(definitions)
    }

    fn record(
        &self,
        relation: &RelationMetadata,
        name: String,
        usage: Usage,
        fields: &[&Field],
        insert_sql: Option<String>,
        query_sql: Option<String>,
    ) -> Result<GeneratedTypeDefinition, TableTypesError> {
        let mapper = TypeMapper::new(
            self.customizations,
            &self.config.naming,
            &self.config.schema_class_prefix,
        );

        let fields = fields
            .iter()
            .map(|field| {
                let path = FieldPath::new(&relation.relation_id, &field.name);
                let type_name = mapper.map(&path, field)?;
                let name = self.config.naming.field.apply(&field.name);
                trace!(field = %path, property = %name, type_name = %type_name, "Mapped field");

                Ok(GeneratedField {
                    name,
                    type_name,
                    column: field.name.clone(),
                })
            })
            .collect::<Result<Vec<_>, TableTypesError>>()?;

        Ok(GeneratedTypeDefinition::Record(RecordDefinition {
            name,
            usage,
            relation: relation.relation_id.to_string(),
            comment: relation.comment.clone(),
            fields,
            insert_sql,
            query_sql,
        }))
    }

    /// Enum generated for one enumerated type
    pub fn enum_definition(&self, enum_type: &EnumType) -> EnumDefinition {
        let name = self.config.naming.user_type.apply(&enum_type.name);

        let constants: Vec<EnumConstant> = enum_type
            .labels
            .iter()
            .map(|label| EnumConstant {
                name: enum_constant_name(label),
                label: label.clone(),
            })
            .collect();

        let mut seen = HashSet::new();
        for constant in &constants {
            if !seen.insert(constant.name.as_str()) {
                warn!(
                    enum_type = %enum_type.type_name(),
                    constant = %constant.name,
                    "Distinct labels map to the same constant name"
                );
            }
        }

        debug!(enum_type = %enum_type.type_name(), generated = %name, "Generating enum");

        EnumDefinition {
            name,
            type_name: enum_type.type_name().to_string(),
            constants,
        }
    }

    /// Unit of a schema, keyed by schema name with the default schema as `""`
    ///
    /// Two schemas whose class names coincide would land in one Java file, so
    /// that is an error.
    fn unit_for<'u>(
        &self,
        units: &'u mut BTreeMap<String, SchemaUnit>,
        schema: Option<&str>,
    ) -> Result<&'u mut SchemaUnit, TableTypesError> {
        let schema = schema.filter(|s| !s.is_empty()).unwrap_or(DEFAULT_SCHEMA);
        let key = if schema == DEFAULT_SCHEMA { "" } else { schema };
        let class_name = schema_class_name(
            Some(schema),
            self.config.naming.schema,
            &self.config.schema_class_prefix,
        );

        let clash = units
            .iter()
            .find(|(k, u)| k.as_str() != key && u.class_name == class_name);
        if let Some((_, other)) = clash {
            error!(
                schema = %schema,
                other_schema = %other.schema,
                class = %class_name,
                "Schema class name clash"
            );
            return Err(TableTypesError::Config(format!(
                "Schemas '{}' and '{}' both map to class name '{}'",
                other.schema, schema, class_name
            )));
        }

        Ok(units
            .entry(key.to_string())
            .or_insert_with(|| SchemaUnit {
                schema: schema.to_string(),
                class_name,
                definitions: Vec::new(),
            }))
    }
}
