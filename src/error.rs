use thiserror::Error;

/// tabletypes errors
#[derive(Error, Debug)]
pub enum TableTypesError {
    #[error("Unsupported type for field '{field}' of type '{database_type}'")]
    UnsupportedType {
        field: String,
        database_type: String,
    },

    #[error("Missing required configuration: {0}")]
    MissingRequiredConfig(String),

    #[error("Malformed customization '{key}': {message}")]
    MalformedCustomization { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid database metadata: {0}")]
    InvalidMetadata(String),

    #[error("Code generation failed for '{unit}': {message}")]
    CodeGen { unit: String, message: String },

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
