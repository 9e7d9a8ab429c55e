//! Database type to Java type mapping

use tracing::{error, trace};

use crate::customize::{Customizations, FieldPath};
use crate::error::TableTypesError;
use crate::metadata::{Field, TypeName};
use crate::naming::{schema_class_name, NamingStyleConfig};

/// Maps table fields to Java type names
pub struct TypeMapper<'a> {
    customizations: &'a Customizations,
    naming: &'a NamingStyleConfig,
    schema_class_prefix: &'a str,
}

impl<'a> TypeMapper<'a> {
    pub fn new(
        customizations: &'a Customizations,
        naming: &'a NamingStyleConfig,
        schema_class_prefix: &'a str,
    ) -> Self {
        Self {
            customizations,
            naming,
            schema_class_prefix,
        }
    }

    /// Java type for a field, including its nullability
    ///
    /// A customized property type is returned verbatim. User-defined types
    /// resolve to the generated type nested in their schema class.
    pub fn map(&self, path: &FieldPath, field: &Field) -> Result<String, TableTypesError> {
        if let Some(property_type) = self
            .customizations
            .get(path)
            .and_then(|c| c.property_type.as_ref())
        {
            trace!(field = %path, property_type = ?property_type, "Using customized type");
            return Ok(property_type.clone());
        }

        let (container, simple) = match &field.user_type {
            Some(user_type) if user_type.name.is_empty() => {
                return Err(unsupported(path, field));
            }
            Some(user_type) => (
                Some(self.user_type_class(user_type)),
                self.naming.user_type.apply(&user_type.name),
            ),
            None => (
                None,
                java_type(field)
                    .ok_or_else(|| unsupported(path, field))?
                    .to_string(),
            ),
        };

        Ok(with_nullability(
            field.is_nullable(),
            container.as_deref(),
            &simple,
        ))
    }

    /// Schema class holding the type generated for a user-defined database type
    pub fn user_type_class(&self, user_type: &TypeName) -> String {
        schema_class_name(
            user_type.schema.as_deref(),
            self.naming.schema,
            self.schema_class_prefix,
        )
    }
}

fn unsupported(path: &FieldPath, field: &Field) -> TableTypesError {
    error!(field = %path, database_type = ?field.database_type, "Unsupported database type");
    TableTypesError::UnsupportedType {
        field: path.to_string(),
        database_type: field.database_type.clone(),
    }
}

/// Bare Java type for a built-in database type, `None` when unrecognized
pub fn java_type(field: &Field) -> Option<&'static str> {
    let db_type = field.database_type.to_lowercase();

    let java_type = match db_type.as_str() {
        "float" | "float4" | "float8" | "real" | "double" | "double precision" => "double",
        "number" | "numeric" | "decimal" => "BigDecimal",
        "int" | "integer" | "bigint" | "smallint" | "int2" | "int4" | "int8" | "serial"
        | "smallserial" | "bigserial" | "serial2" | "serial4" | "serial8" => {
            match field.precision {
                Some(precision) if precision <= 9 => "int",
                _ => "long",
            }
        }
        "varchar" | "varchar2" | "character varying" | "text" | "longvarchar" | "char"
        | "character" | "bpchar" | "clob" | "xml" | "tsvector" => "String",
        "uuid" => "UUID",
        "timestamp with time zone" | "timestamptz" => "Instant",
        "timestamp" => "LocalDateTime",
        "date" => "LocalDate",
        "time" => "LocalTime",
        "bit" | "boolean" | "bool" => "boolean",
        "bytea" => "byte[]",
        "json" | "jsonb" => "JsonNode",
        "oid" => "Blob",
        other if other.starts_with("timestamp") => "String",
        _ => return None,
    };

    Some(java_type)
}

/// Apply the nullability marker to a type name
///
/// Nullable primitives become their boxed form. A type nested in a container
/// class carries the annotation on its simple name: `Public.@Nullable Mood`.
pub fn with_nullability(nullable: bool, container: Option<&str>, simple: &str) -> String {
    let simple = if nullable {
        format!("@Nullable {}", reference_type(simple))
    } else {
        simple.to_string()
    };

    match container {
        Some(container) => format!("{}.{}", container, simple),
        None => simple,
    }
}

fn reference_type(type_name: &str) -> &str {
    match type_name {
        "int" => "Integer",
        "long" => "Long",
        "double" => "Double",
        "float" => "Float",
        "boolean" => "Boolean",
        "char" => "Character",
        "short" => "Short",
        "byte" => "Byte",
        other => other,
    }
}
