//! Code generation
//!
//! [`DefinitionEmitter`] translates parsed metadata into language-level type
//! definitions grouped per schema. A [`CodeGenerator`] then renders and writes
//! those definitions as source files.

use std::path::PathBuf;

use crate::error::TableTypesError;

pub mod emit;
pub mod java;
pub mod policy;
pub mod sql;
pub mod types;

pub use emit::DefinitionEmitter;
pub use java::JavaGenerator;

/// What a generated record is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    /// Creating new rows
    Insert,
    /// Reading existing rows
    Query,
    /// Both, when the insert and query shapes coincide
    Any,
}

/// One component of a generated record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedField {
    pub name: String,
    pub type_name: String,
    /// Source column name
    pub column: String,
}

/// Record generated for a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDefinition {
    pub name: String,
    pub usage: Usage,
    /// Fully qualified source relation (`schema.table` or `table`)
    pub relation: String,
    pub comment: Option<String>,
    pub fields: Vec<GeneratedField>,
    pub insert_sql: Option<String>,
    pub query_sql: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConstant {
    pub name: String,
    /// Original database label
    pub label: String,
}

/// Enum generated for a database enumerated type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDefinition {
    pub name: String,
    /// Database type name, schema-qualified when the schema is known
    pub type_name: String,
    pub constants: Vec<EnumConstant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedTypeDefinition {
    Record(RecordDefinition),
    Enum(EnumDefinition),
}

impl GeneratedTypeDefinition {
    pub fn name(&self) -> &str {
        match self {
            GeneratedTypeDefinition::Record(record) => &record.name,
            GeneratedTypeDefinition::Enum(enum_def) => &enum_def.name,
        }
    }
}

/// All definitions generated for one schema, emitted as one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaUnit {
    /// Database schema name
    pub schema: String,
    /// Name of the generated container class
    pub class_name: String,
    /// Table records in metadata order, followed by enums
    pub definitions: Vec<GeneratedTypeDefinition>,
}

impl SchemaUnit {
    pub fn records(&self) -> impl Iterator<Item = &RecordDefinition> {
        self.definitions.iter().filter_map(|def| match def {
            GeneratedTypeDefinition::Record(record) => Some(record),
            GeneratedTypeDefinition::Enum(_) => None,
        })
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumDefinition> {
        self.definitions.iter().filter_map(|def| match def {
            GeneratedTypeDefinition::Enum(enum_def) => Some(enum_def),
            GeneratedTypeDefinition::Record(_) => None,
        })
    }
}

/// Configuration for writing generated code
#[derive(Debug, Clone)]
pub struct CodeGenConfig {
    /// Base source directory, package directories are created beneath it
    pub output_path: PathBuf,
    /// Package of the generated sources
    pub package: String,
}

impl CodeGenConfig {
    pub fn new(output_path: PathBuf, package: impl Into<String>) -> Self {
        Self {
            output_path,
            package: package.into(),
        }
    }

    /// Directory the package's source files are written to
    pub fn package_dir(&self) -> PathBuf {
        self.package
            .split('.')
            .fold(self.output_path.clone(), |dir, part| dir.join(part))
    }
}

/// Trait for language-specific code generators
pub trait CodeGenerator {
    /// Render and write one source file per schema unit
    fn generate(&self, units: &[SchemaUnit], config: &CodeGenConfig) -> Result<(), TableTypesError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_package_dir() {
        let config = CodeGenConfig::new(PathBuf::from("src/main/java"), "com.example.db");
        assert_eq!(
            config.package_dir(),
            Path::new("src/main/java").join("com").join("example").join("db")
        );
    }
}
