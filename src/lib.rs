//! # tabletypes
//!
//! Generate typed table records and insert/select SQL from database metadata
//!
//! This crate provides a CLI tool and library that turn a database metadata
//! document into Java records (one or two per table) and enums (one per
//! enumerated type), grouped into one class per schema.

pub mod codegen;
pub mod config;
pub mod customize;
pub mod error;
pub mod metadata;
pub mod naming;

pub mod prelude {
    pub use crate::codegen::{
        CodeGenConfig, CodeGenerator, DefinitionEmitter, GeneratedTypeDefinition, JavaGenerator,
        SchemaUnit, Usage,
    };
    pub use crate::config::GenConfig;
    pub use crate::customize::{Customizations, FieldCustomization, FieldPath};
    pub use crate::error::TableTypesError;
    pub use crate::metadata::{EnumType, Field, RelationId, RelationMetadata, SchemaMetadata};
    pub use crate::naming::{FieldNameStyle, NamingStyle, NamingStyleConfig, ParamStyle};
}
