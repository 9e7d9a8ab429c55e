//! Java code generator
//!
//! Renders each schema unit as a final class holding one nested record per
//! table definition and one nested enum per enumerated type.

use std::collections::BTreeSet;
use std::fs;

use minijinja::Environment;
use tracing::{debug, info};

use crate::codegen::{
    CodeGenConfig, CodeGenerator, EnumDefinition, GeneratedTypeDefinition, RecordDefinition,
    SchemaUnit,
};
use crate::error::TableTypesError;

/// Java code generator
pub struct JavaGenerator {
    env: Environment<'static>,
}

impl JavaGenerator {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);

        env.add_template("schema", include_str!("templates/schema.java.jinja"))
            .expect("Failed to load java schema template");

        Self { env }
    }
}

impl Default for JavaGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator for JavaGenerator {
    fn generate(&self, units: &[SchemaUnit], config: &CodeGenConfig) -> Result<(), TableTypesError> {
        let output_dir = config.package_dir();
        info!(
            output = ?output_dir,
            package = ?config.package,
            units = units.len(),
            "Generating Java code"
        );

        // Render everything before touching the filesystem
        let sources = units
            .iter()
            .map(|unit| Ok((unit, self.render_unit(unit, &config.package)?)))
            .collect::<Result<Vec<_>, TableTypesError>>()?;

        fs::create_dir_all(&output_dir)?;
        debug!(path = ?output_dir, "Created output directory");

        for (unit, source) in sources {
            let file_path = output_dir.join(format!("{}.java", unit.class_name));
            fs::write(&file_path, source)?;
            debug!(
                schema = ?unit.schema,
                definitions = unit.definitions.len(),
                path = ?file_path,
                "Generated schema file"
            );
        }

        info!(files = units.len(), "Java code generation complete");

        Ok(())
    }
}

impl JavaGenerator {
    /// Render the source of one schema class
    pub fn render_unit(&self, unit: &SchemaUnit, package: &str) -> Result<String, TableTypesError> {
        let template = self
            .env
            .get_template("schema")
            .map_err(|e| TableTypesError::CodeGen {
                unit: unit.class_name.clone(),
                message: format!("Template error: {}", e),
            })?;

        let definitions: Vec<_> = unit
            .definitions
            .iter()
            .map(|def| match def {
                GeneratedTypeDefinition::Record(record) => record_context(record),
                GeneratedTypeDefinition::Enum(enum_def) => enum_context(enum_def),
            })
            .collect();

        let ctx = minijinja::context! {
            package => package,
            schema => &unit.schema,
            class_name => &unit.class_name,
            imports => collect_imports(unit),
            definitions => definitions,
        };

        template.render(ctx).map_err(|e| TableTypesError::CodeGen {
            unit: unit.class_name.clone(),
            message: format!("Render error: {}", e),
        })
    }
}

/// Build template context for a table record
fn record_context(record: &RecordDefinition) -> minijinja::Value {
    let comment = match &record.comment {
        Some(comment) if !comment.trim().is_empty() => javadoc_text(comment),
        _ => format!("Table {}", record.relation),
    };

    minijinja::context! {
        kind => "record",
        name => &record.name,
        comment => comment,
        relation => java_string(&record.relation),
        fields => record.fields.iter().map(|f| {
            minijinja::context! {
                name => &f.name,
                type_name => &f.type_name,
            }
        }).collect::<Vec<_>>(),
        insert_sql => record.insert_sql.as_deref().map(java_string),
        select_sql => record.query_sql.as_deref().map(java_string),
    }
}

/// Build template context for an enum
fn enum_context(enum_def: &EnumDefinition) -> minijinja::Value {
    minijinja::context! {
        kind => "enum",
        name => &enum_def.name,
        db_name => javadoc_text(&enum_def.type_name),
        type_name => java_string(&enum_def.type_name),
        constants => enum_def.constants.iter().map(|c| {
            minijinja::context! {
                name => &c.name,
                label => java_string(&c.label),
            }
        }).collect::<Vec<_>>(),
    }
}

/// Imports needed by the record components of a unit, sorted
fn collect_imports(unit: &SchemaUnit) -> Vec<&'static str> {
    let mut imports = BTreeSet::new();

    for record in unit.records() {
        for field in &record.fields {
            collect_type_imports(&field.type_name, &mut imports);
        }
    }

    imports.into_iter().collect()
}

/// Collect imports for the simple type names referenced in a type
///
/// Names preceded by `.` belong to a qualified name and need no import.
fn collect_type_imports(type_name: &str, imports: &mut BTreeSet<&'static str>) {
    let mut prev = None;
    let mut start = None;

    for (ix, c) in type_name.char_indices().chain(std::iter::once((type_name.len(), ' '))) {
        let is_ident = c.is_alphanumeric() || c == '_' || c == '$';
        match (is_ident, start) {
            (true, None) => start = Some((ix, prev)),
            (false, Some((begin, before))) => {
                if before != Some('.') {
                    if let Some(import) = import_for(&type_name[begin..ix]) {
                        imports.insert(import);
                    }
                }
                start = None;
            }
            _ => {}
        }
        prev = Some(c);
    }
}

fn import_for(simple_name: &str) -> Option<&'static str> {
    let import = match simple_name {
        "BigDecimal" => "java.math.BigDecimal",
        "BigInteger" => "java.math.BigInteger",
        "UUID" => "java.util.UUID",
        "Instant" => "java.time.Instant",
        "LocalDateTime" => "java.time.LocalDateTime",
        "LocalDate" => "java.time.LocalDate",
        "LocalTime" => "java.time.LocalTime",
        "OffsetDateTime" => "java.time.OffsetDateTime",
        "ZonedDateTime" => "java.time.ZonedDateTime",
        "Duration" => "java.time.Duration",
        "JsonNode" => "com.fasterxml.jackson.databind.JsonNode",
        "ObjectNode" => "com.fasterxml.jackson.databind.node.ObjectNode",
        "ArrayNode" => "com.fasterxml.jackson.databind.node.ArrayNode",
        "Blob" => "java.sql.Blob",
        "Clob" => "java.sql.Clob",
        "Timestamp" => "java.sql.Timestamp",
        // Common in customized property types
        "List" => "java.util.List",
        "ArrayList" => "java.util.ArrayList",
        "Map" => "java.util.Map",
        "HashMap" => "java.util.HashMap",
        "Set" => "java.util.Set",
        "HashSet" => "java.util.HashSet",
        "Collection" => "java.util.Collection",
        "Optional" => "java.util.Optional",
        "Nullable" => "org.checkerframework.checker.nullness.qual.Nullable",
        _ => return None,
    };
    Some(import)
}

/// Quote a value as a Java string literal
fn java_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Make text safe to place inside a Javadoc comment on one line
fn javadoc_text(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("*/", "*&#47;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{EnumConstant, GeneratedField, Usage};

    fn orders_unit() -> SchemaUnit {
        SchemaUnit {
            schema: "public".to_string(),
            class_name: "Public".to_string(),
            definitions: vec![
                GeneratedTypeDefinition::Record(RecordDefinition {
                    name: "Orders".to_string(),
                    usage: Usage::Query,
                    relation: "public.orders".to_string(),
                    comment: Some("Customer orders".to_string()),
                    fields: vec![
                        GeneratedField {
                            name: "id".to_string(),
                            type_name: "long".to_string(),
                            column: "id".to_string(),
                        },
                        GeneratedField {
                            name: "placedAt".to_string(),
                            type_name: "@Nullable Instant".to_string(),
                            column: "placed_at".to_string(),
                        },
                        GeneratedField {
                            name: "mood".to_string(),
                            type_name: "Public.@Nullable Mood".to_string(),
                            column: "mood".to_string(),
                        },
                    ],
                    insert_sql: None,
                    query_sql: Some("select id,placed_at,mood from public.orders".to_string()),
                }),
                GeneratedTypeDefinition::Enum(EnumDefinition {
                    name: "Mood".to_string(),
                    type_name: "public.mood".to_string(),
                    constants: vec![
                        EnumConstant {
                            name: "happy".to_string(),
                            label: "happy".to_string(),
                        },
                        EnumConstant {
                            name: "a_comma_b".to_string(),
                            label: "a,b".to_string(),
                        },
                    ],
                }),
            ],
        }
    }

    #[test]
    fn test_render_unit() {
        let source = JavaGenerator::new()
            .render_unit(&orders_unit(), "com.example.db")
            .unwrap();

        assert!(source.starts_with("package com.example.db;\n"));
        assert!(source.contains("import java.time.Instant;\n"));
        assert!(source.contains("import org.checkerframework.checker.nullness.qual.Nullable;\n"));
        assert!(source.contains("public final class Public\n{\n"));
        assert!(source.contains("  /** Customer orders */\n  public record Orders\n  (\n"));
        assert!(source.contains(
            "    long id,\n    @Nullable Instant placedAt,\n    Public.@Nullable Mood mood\n  )\n"
        ));
        assert!(source.contains("public static final String relationName = \"public.orders\";"));
        assert!(source.contains(
            "public static final String selectSql = \"select id,placed_at,mood from public.orders\";"
        ));
        assert!(!source.contains("insertSql"));
        assert!(source.contains("  public enum Mood\n  {\n    happy(\"happy\"),\n    a_comma_b(\"a,b\");\n"));
        assert!(source.contains("public static final String typeName = \"public.mood\";"));
        assert!(source.ends_with("}\n"));
    }

    #[test]
    fn test_render_default_comment_and_empty_enum() {
        let unit = SchemaUnit {
            schema: "sales".to_string(),
            class_name: "Sales".to_string(),
            definitions: vec![
                GeneratedTypeDefinition::Record(RecordDefinition {
                    name: "Invoices".to_string(),
                    usage: Usage::Any,
                    relation: "sales.invoices".to_string(),
                    comment: None,
                    fields: vec![],
                    insert_sql: Some("insert into sales.invoices() values()".to_string()),
                    query_sql: Some("select  from sales.invoices".to_string()),
                }),
                GeneratedTypeDefinition::Enum(EnumDefinition {
                    name: "Nothing".to_string(),
                    type_name: "sales.nothing".to_string(),
                    constants: vec![],
                }),
            ],
        };

        let source = JavaGenerator::new().render_unit(&unit, "db").unwrap();

        assert!(source.contains("/** Table sales.invoices */"));
        assert!(source.contains("insertSql = \"insert into sales.invoices() values()\";"));
        assert!(source.contains("  public enum Nothing\n  {\n    ;\n"));
        assert!(!source.contains("import "));
    }

    #[test]
    fn test_render_imports_for_customized_generic_type() {
        let unit = SchemaUnit {
            schema: "public".to_string(),
            class_name: "Public".to_string(),
            definitions: vec![GeneratedTypeDefinition::Record(RecordDefinition {
                name: "Orders".to_string(),
                usage: Usage::Any,
                relation: "public.orders".to_string(),
                comment: None,
                fields: vec![
                    GeneratedField {
                        name: "tags".to_string(),
                        type_name: "List<String>".to_string(),
                        column: "tags".to_string(),
                    },
                    GeneratedField {
                        name: "attrs".to_string(),
                        type_name: "Map<String, ObjectNode>".to_string(),
                        column: "attrs".to_string(),
                    },
                ],
                insert_sql: None,
                query_sql: Some("select tags,attrs from public.orders".to_string()),
            })],
        };

        let source = JavaGenerator::new().render_unit(&unit, "db").unwrap();

        assert!(source.contains(
            "import com.fasterxml.jackson.databind.node.ObjectNode;\nimport java.util.List;\nimport java.util.Map;\n"
        ));
        assert!(source.contains("    List<String> tags,\n    Map<String, ObjectNode> attrs\n"));
    }

    #[test]
    fn test_collect_type_imports() {
        let mut imports = BTreeSet::new();
        collect_type_imports("@Nullable BigDecimal", &mut imports);
        collect_type_imports("Map<UUID, JsonNode>", &mut imports);
        collect_type_imports("com.acme.Instant", &mut imports);
        collect_type_imports("Sales.@Nullable Kind", &mut imports);

        let imports: Vec<_> = imports.into_iter().collect();
        assert_eq!(
            imports,
            vec![
                "com.fasterxml.jackson.databind.JsonNode",
                "java.math.BigDecimal",
                "java.util.UUID",
                "org.checkerframework.checker.nullness.qual.Nullable",
            ]
        );
    }

    #[test]
    fn test_java_string() {
        assert_eq!(java_string("a,b"), "\"a,b\"");
        assert_eq!(java_string("say \"hi\"\\"), "\"say \\\"hi\\\"\\\\\"");
    }

    #[test]
    fn test_javadoc_text() {
        assert_eq!(javadoc_text("multi\n line */ comment"), "multi line *&#47; comment");
    }
}
