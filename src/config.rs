//! Configuration loading
//!
//! Loads generation options from environment variables, optionally reading
//! from a .env file first. Command-line flags override individual values
//! through the `with_*` builders.

use std::{env, path::Path};

use tracing::{debug, error, trace, warn};

use crate::error::TableTypesError;
use crate::naming::{FieldNameStyle, NamingStyle, NamingStyleConfig, ParamStyle};

pub const ENV_PACKAGE: &str = "TABLETYPES_PACKAGE";
pub const ENV_SCHEMA_NAME_STYLE: &str = "TABLETYPES_SCHEMA_NAME_STYLE";
pub const ENV_TABLE_NAME_STYLE: &str = "TABLETYPES_TABLE_NAME_STYLE";
pub const ENV_TYPE_NAME_STYLE: &str = "TABLETYPES_TYPE_NAME_STYLE";
pub const ENV_FIELD_NAME_STYLE: &str = "TABLETYPES_FIELD_NAME_STYLE";
pub const ENV_PARAM_STYLE: &str = "TABLETYPES_PARAM_STYLE";
pub const ENV_SCHEMA_CLASS_PREFIX: &str = "TABLETYPES_SCHEMA_CLASS_PREFIX";
pub const ENV_INSERT_SUFFIX: &str = "TABLETYPES_INSERT_SUFFIX";

pub const DEFAULT_INSERT_SUFFIX: &str = "_Ins";

/// Generation options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenConfig {
    pub naming: NamingStyleConfig,
    /// Prepended to every schema class name
    pub schema_class_prefix: String,
    /// Appended to the record name of insert-only variants
    pub insert_suffix: String,
    /// Package of the generated sources (required)
    pub package: Option<String>,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            naming: NamingStyleConfig::default(),
            schema_class_prefix: String::new(),
            insert_suffix: DEFAULT_INSERT_SUFFIX.to_string(),
            package: None,
        }
    }
}

impl GenConfig {
    /// Load configuration from environment variables
    ///
    /// Recognized variables (all optional here, see [`GenConfig::validate`]):
    /// - TABLETYPES_PACKAGE
    /// - TABLETYPES_SCHEMA_NAME_STYLE (default: UPPER_CAMEL_CASE)
    /// - TABLETYPES_TABLE_NAME_STYLE (default: CAPITALIZE_WHOLE)
    /// - TABLETYPES_TYPE_NAME_STYLE (default: UPPER_CAMEL_CASE)
    /// - TABLETYPES_FIELD_NAME_STYLE (default: AS_IS)
    /// - TABLETYPES_PARAM_STYLE (default: AS_IS)
    /// - TABLETYPES_SCHEMA_CLASS_PREFIX (default: empty)
    /// - TABLETYPES_INSERT_SUFFIX (default: _Ins)
    pub fn from_env() -> Result<Self, TableTypesError> {
        debug!("Loading generation configuration from environment");
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TableTypesError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let naming = NamingStyleConfig {
            schema: parse_var(&lookup, ENV_SCHEMA_NAME_STYLE, defaults.naming.schema)?,
            table: parse_var(&lookup, ENV_TABLE_NAME_STYLE, defaults.naming.table)?,
            user_type: parse_var(&lookup, ENV_TYPE_NAME_STYLE, defaults.naming.user_type)?,
            field: parse_var(&lookup, ENV_FIELD_NAME_STYLE, defaults.naming.field)?,
            param: parse_var(&lookup, ENV_PARAM_STYLE, defaults.naming.param)?,
        };

        let schema_class_prefix = lookup(ENV_SCHEMA_CLASS_PREFIX).unwrap_or_else(|| {
            trace!("{} not set, using default", ENV_SCHEMA_CLASS_PREFIX);
            defaults.schema_class_prefix
        });

        let insert_suffix = lookup(ENV_INSERT_SUFFIX).unwrap_or_else(|| {
            trace!("{} not set, using default", ENV_INSERT_SUFFIX);
            defaults.insert_suffix
        });

        let package = lookup(ENV_PACKAGE);

        debug!(
            naming = ?naming,
            schema_class_prefix = ?schema_class_prefix,
            insert_suffix = ?insert_suffix,
            package = ?package,
            "Configuration loaded"
        );

        Ok(Self {
            naming,
            schema_class_prefix,
            insert_suffix,
            package,
        })
    }

    /// Load a .env file and then read configuration from environment
    pub fn load(env_file: &Path) -> Result<Self, TableTypesError> {
        if env_file.exists() {
            debug!(path = ?env_file, "Loading environment file");
            dotenvy::from_path(env_file).map_err(|e| {
                error!(path = ?env_file, error = ?e, "Failed to load environment file");
                TableTypesError::Config(format!("Failed to load {}: {}", env_file.display(), e))
            })?;
        } else {
            warn!(path = ?env_file, "Environment file not found, using existing environment");
        }

        Self::from_env()
    }

    pub fn with_naming(mut self, naming: NamingStyleConfig) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_schema_style(mut self, style: NamingStyle) -> Self {
        self.naming.schema = style;
        self
    }

    pub fn with_table_style(mut self, style: NamingStyle) -> Self {
        self.naming.table = style;
        self
    }

    pub fn with_type_style(mut self, style: NamingStyle) -> Self {
        self.naming.user_type = style;
        self
    }

    pub fn with_field_style(mut self, style: FieldNameStyle) -> Self {
        self.naming.field = style;
        self
    }

    pub fn with_param_style(mut self, style: ParamStyle) -> Self {
        self.naming.param = style;
        self
    }

    pub fn with_schema_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.schema_class_prefix = prefix.into();
        self
    }

    pub fn with_insert_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.insert_suffix = suffix.into();
        self
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// The configured package
    pub fn package(&self) -> Result<&str, TableTypesError> {
        match self.package.as_deref().map(str::trim) {
            Some(package) if !package.is_empty() => Ok(package),
            _ => {
                error!("No package configured");
                Err(TableTypesError::MissingRequiredConfig(format!(
                    "package ({} or --package)",
                    ENV_PACKAGE
                )))
            }
        }
    }

    /// Check required values before any generation starts
    pub fn validate(&self) -> Result<(), TableTypesError> {
        let package = self.package()?;
        if !package.split('.').all(is_java_identifier) {
            error!(package = ?package, "Invalid package name");
            return Err(TableTypesError::Config(format!(
                "'{}' is not a valid package name",
                package
            )));
        }

        if self.insert_suffix.is_empty() {
            error!("Insert suffix is empty");
            return Err(TableTypesError::MissingRequiredConfig(format!(
                "insert suffix ({} or --insert-suffix)",
                ENV_INSERT_SUFFIX
            )));
        }

        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, TableTypesError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr<Err = TableTypesError>,
{
    match lookup(key) {
        Some(value) => value.parse().map_err(|e| {
            error!(variable = key, value = ?value, error = ?e, "Invalid configuration value");
            TableTypesError::Config(format!("{} has invalid value '{}'", key, value))
        }),
        None => {
            trace!("{} not set, using default", key);
            Ok(default)
        }
    }
}

fn is_java_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}
