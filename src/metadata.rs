//! Database metadata structures
//!
//! These types mirror the JSON document produced by the schema introspection
//! query and form the contract between that external provider and code
//! generation. Loosely typed markers in the document (identity generation,
//! user-defined type names) are decoded into closed types here so nothing
//! downstream compares raw strings.

use std::fmt;

use serde::{Deserialize, Deserializer};

use crate::error::TableTypesError;

/// Schema name assumed when a relation or type carries none
pub const DEFAULT_SCHEMA: &str = "public";

/// A complete parsed metadata document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaMetadata {
    pub dbms_name: String,
    pub dbms_version: String,
    #[serde(default)]
    pub major_version: Option<i32>,
    #[serde(default)]
    pub minor_version: Option<i32>,
    pub case_sensitivity: CaseSensitivity,
    pub relation_metadatas: Vec<RelationMetadata>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(default)]
    pub enum_types: Vec<EnumType>,
}

impl SchemaMetadata {
    /// Decode a metadata document from JSON text
    pub fn from_json(json: &str) -> Result<Self, TableTypesError> {
        serde_json::from_str(json).map_err(|e| TableTypesError::InvalidMetadata(e.to_string()))
    }

    /// Relations of kind `table`, in document order
    pub fn tables(&self) -> impl Iterator<Item = &RelationMetadata> {
        self.relation_metadatas
            .iter()
            .filter(|rel| rel.relation_type == RelationKind::Table)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseSensitivity {
    InsensitiveStoredLower,
    InsensitiveStoredUpper,
    InsensitiveStoredMixed,
    Sensitive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RelationKind {
    Table,
    View,
    Unknown,
}

impl From<String> for RelationKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "table" => RelationKind::Table,
            "view" => RelationKind::View,
            _ => RelationKind::Unknown,
        }
    }
}

/// Identity of a table or view
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub struct RelationId {
    #[serde(default)]
    pub schema: Option<String>,
    pub name: String,
}

impl RelationId {
    pub fn new(schema: Option<&str>, name: &str) -> Self {
        Self {
            schema: schema.map(str::to_string),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A table or view with its fields in declared column order
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationMetadata {
    pub relation_id: RelationId,
    pub relation_type: RelationKind,
    pub fields: Vec<Field>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Whether the database always supplies a column's value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentityGeneration {
    GeneratedAlways,
    #[default]
    NotGenerated,
}

impl IdentityGeneration {
    fn from_marker(marker: Option<&str>) -> Self {
        match marker {
            Some("ALWAYS") => IdentityGeneration::GeneratedAlways,
            _ => IdentityGeneration::NotGenerated,
        }
    }
}

/// Schema-qualified name of a user-defined type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    pub schema: Option<String>,
    pub name: String,
}

impl TypeName {
    /// Parse a possibly schema-qualified, possibly quoted type name such as
    /// `public.mood` or `"My Schema"."My Type"`.
    pub fn parse(raw: &str) -> Self {
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut quoted = false;
        let mut chars = raw.trim().chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '"' if quoted && chars.peek() == Some(&'"') => {
                    chars.next();
                    current.push('"');
                }
                '"' => quoted = !quoted,
                '.' if !quoted => parts.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
        parts.push(current);

        let name = parts.pop().unwrap_or_default();
        let schema = parts.pop().filter(|s| !s.is_empty());

        Self { schema, name }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A table column
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawField")]
pub struct Field {
    pub name: String,
    /// Declared type as reported by the database, compared case-insensitively
    pub database_type: String,
    /// Set when the declared type is user-defined (enum, domain, composite)
    pub user_type: Option<TypeName>,
    pub jdbc_type_code: Option<i32>,
    /// Unset is treated as nullable
    pub nullable: Option<bool>,
    pub primary_key_part_number: Option<i32>,
    pub length: Option<i32>,
    pub precision: Option<i32>,
    pub precision_radix: Option<i32>,
    pub fractional_digits: Option<i32>,
    pub identity: IdentityGeneration,
    pub comment: Option<String>,
}

impl Field {
    pub fn new(name: &str, database_type: &str) -> Self {
        Self {
            name: name.to_string(),
            database_type: database_type.to_string(),
            user_type: None,
            jdbc_type_code: None,
            nullable: None,
            primary_key_part_number: None,
            length: None,
            precision: None,
            precision_radix: None,
            fractional_digits: None,
            identity: IdentityGeneration::NotGenerated,
            comment: None,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn with_precision(mut self, precision: i32, fractional_digits: i32) -> Self {
        self.precision = Some(precision);
        self.fractional_digits = Some(fractional_digits);
        self
    }

    pub fn generated_always(mut self) -> Self {
        self.identity = IdentityGeneration::GeneratedAlways;
        self
    }

    pub fn user_defined(mut self) -> Self {
        self.user_type = Some(TypeName::parse(&self.database_type));
        self
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable.unwrap_or(true)
    }

    pub fn is_generated_always(&self) -> bool {
        self.identity == IdentityGeneration::GeneratedAlways
    }
}

/// Field as it appears in the document, before markers are decoded
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    name: String,
    database_type: String,
    #[serde(default)]
    jdbc_type_code: Option<i32>,
    #[serde(default)]
    nullable: Option<bool>,
    #[serde(default)]
    primary_key_part_number: Option<i32>,
    #[serde(default)]
    length: Option<i32>,
    #[serde(default)]
    precision: Option<i32>,
    #[serde(default)]
    precision_radix: Option<i32>,
    #[serde(default)]
    fractional_digits: Option<i32>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    identity_generation: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    is_user_defined_type: bool,
}

impl From<RawField> for Field {
    fn from(raw: RawField) -> Self {
        let user_type = raw
            .is_user_defined_type
            .then(|| TypeName::parse(&raw.database_type));

        Self {
            name: raw.name,
            database_type: raw.database_type,
            user_type,
            jdbc_type_code: raw.jdbc_type_code,
            nullable: raw.nullable,
            primary_key_part_number: raw.primary_key_part_number,
            length: raw.length,
            precision: raw.precision,
            precision_radix: raw.precision_radix,
            fractional_digits: raw.fractional_digits,
            identity: IdentityGeneration::from_marker(raw.identity_generation.as_deref()),
            comment: raw.comment,
        }
    }
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// An enumerated type defined in the database
#[derive(Debug, Clone, Deserialize)]
pub struct EnumType {
    #[serde(default)]
    pub schema: Option<String>,
    pub name: String,
    /// Labels in declaration order
    #[serde(alias = "values")]
    pub labels: Vec<String>,
}

impl EnumType {
    pub fn type_name(&self) -> TypeName {
        TypeName {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyComponent {
    pub foreign_key_field_name: String,
    pub primary_key_field_name: String,
}

/// Foreign key between a child (referencing) and parent (referenced) relation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    #[serde(default)]
    pub constraint_name: Option<String>,
    pub foreign_key_relation_id: RelationId,
    pub primary_key_relation_id: RelationId,
    pub foreign_key_components: Vec<ForeignKeyComponent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "dbmsName": "PostgreSQL",
        "dbmsVersion": "16.2",
        "majorVersion": 16,
        "minorVersion": 2,
        "caseSensitivity": "INSENSITIVE_STORED_LOWER",
        "relationMetadatas": [
            {
                "relationId": { "schema": "public", "name": "orders" },
                "relationType": "table",
                "fields": [
                    {
                        "name": "id",
                        "databaseType": "bigint",
                        "jdbcTypeCode": -5,
                        "nullable": false,
                        "primaryKeyPartNumber": 1,
                        "precision": 19,
                        "fractionalDigits": 0,
                        "identityGeneration": "ALWAYS"
                    },
                    {
                        "name": "customer_name",
                        "databaseType": "varchar",
                        "nullable": true,
                        "length": 200,
                        "identityGeneration": null
                    },
                    {
                        "name": "status",
                        "databaseType": "public.order_status",
                        "isUserDefinedType": true
                    }
                ],
                "comment": "Customer orders"
            },
            {
                "relationId": { "name": "order_totals" },
                "relationType": "view",
                "fields": []
            },
            {
                "relationId": { "name": "audit" },
                "relationType": "materialized view",
                "fields": []
            }
        ],
        "foreignKeys": [
            {
                "constraintName": "fk_order_customer",
                "foreignKeyRelationId": { "schema": "public", "name": "orders" },
                "primaryKeyRelationId": { "schema": "public", "name": "customers" },
                "foreignKeyComponents": [
                    { "foreignKeyFieldName": "customer_id", "primaryKeyFieldName": "id" }
                ]
            }
        ],
        "enumTypes": [
            { "schema": "public", "name": "order_status", "labels": ["new", "shipped"] }
        ]
    }"#;

    #[test]
    fn test_decode_document() {
        let md = SchemaMetadata::from_json(SAMPLE).unwrap();

        assert_eq!(md.dbms_name, "PostgreSQL");
        assert_eq!(md.case_sensitivity, CaseSensitivity::InsensitiveStoredLower);
        assert_eq!(md.relation_metadatas.len(), 3);
        assert_eq!(md.foreign_keys.len(), 1);
        assert_eq!(md.foreign_keys[0].foreign_key_components[0].primary_key_field_name, "id");
        assert_eq!(md.enum_types[0].labels, vec!["new", "shipped"]);
    }

    #[test]
    fn test_decode_relation_kinds() {
        let md = SchemaMetadata::from_json(SAMPLE).unwrap();
        let kinds: Vec<_> = md.relation_metadatas.iter().map(|r| r.relation_type).collect();

        assert_eq!(
            kinds,
            vec![RelationKind::Table, RelationKind::View, RelationKind::Unknown]
        );
        assert_eq!(md.tables().count(), 1);
    }

    #[test]
    fn test_decode_identity_marker() {
        let md = SchemaMetadata::from_json(SAMPLE).unwrap();
        let fields = &md.relation_metadatas[0].fields;

        assert!(fields[0].is_generated_always());
        assert!(!fields[1].is_generated_always());
        assert_eq!(fields[2].identity, IdentityGeneration::NotGenerated);
    }

    #[test]
    fn test_decode_nullability_defaults_to_nullable() {
        let md = SchemaMetadata::from_json(SAMPLE).unwrap();
        let fields = &md.relation_metadatas[0].fields;

        assert!(!fields[0].is_nullable());
        assert!(fields[1].is_nullable());
        assert_eq!(fields[2].nullable, None);
        assert!(fields[2].is_nullable());
    }

    #[test]
    fn test_decode_user_defined_type() {
        let md = SchemaMetadata::from_json(SAMPLE).unwrap();
        let fields = &md.relation_metadatas[0].fields;

        assert_eq!(fields[0].user_type, None);
        assert_eq!(
            fields[2].user_type,
            Some(TypeName {
                schema: Some("public".to_string()),
                name: "order_status".to_string(),
            })
        );
    }

    #[test]
    fn test_invalid_json() {
        let err = SchemaMetadata::from_json("{\"dbmsName\": 1}").unwrap_err();
        assert!(matches!(err, TableTypesError::InvalidMetadata(_)));
    }

    #[test]
    fn test_type_name_parse() {
        assert_eq!(
            TypeName::parse("mood"),
            TypeName {
                schema: None,
                name: "mood".to_string()
            }
        );
        assert_eq!(
            TypeName::parse("\"Sales\".\"Order.Kind\""),
            TypeName {
                schema: Some("Sales".to_string()),
                name: "Order.Kind".to_string()
            }
        );
        assert_eq!(TypeName::parse("\"say \"\"hi\"\"\"").name, "say \"hi\"");
    }

    #[test]
    fn test_relation_id_display() {
        assert_eq!(RelationId::new(Some("public"), "orders").to_string(), "public.orders");
        assert_eq!(RelationId::new(None, "orders").to_string(), "orders");
    }
}
