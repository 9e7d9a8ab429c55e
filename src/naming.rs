//! Naming styles
//!
//! Pure transforms from raw database identifiers to generated identifiers.
//! Every style is total: any input, including the empty string, yields a
//! deterministic output.

use std::str::FromStr;

use crate::error::TableTypesError;
use crate::metadata::DEFAULT_SCHEMA;

/// Style applied to schema, table and user-defined type names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NamingStyle {
    /// Identifier used verbatim
    #[default]
    AsIs,
    /// First character of the whole identifier upper-cased
    CapitalizeWhole,
    /// Split on `_`, first character of each part upper-cased, parts joined
    CapitalizeEachPart,
    /// Split on any non-alphanumeric character, each part capitalized, parts joined
    UpperCamelCase,
}

impl NamingStyle {
    pub fn apply(self, raw: &str) -> String {
        match self {
            NamingStyle::AsIs => raw.to_string(),
            NamingStyle::CapitalizeWhole => capitalize(raw),
            NamingStyle::CapitalizeEachPart => raw.split('_').map(capitalize).collect(),
            NamingStyle::UpperCamelCase => upper_camel_case(raw),
        }
    }
}

impl FromStr for NamingStyle {
    type Err = TableTypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_option(s).as_str() {
            "AS_IS" | "DB" => Ok(NamingStyle::AsIs),
            "CAPITALIZE_WHOLE" | "DB_INITCAP" => Ok(NamingStyle::CapitalizeWhole),
            "CAPITALIZE_EACH_PART" => Ok(NamingStyle::CapitalizeEachPart),
            "UPPER_CAMEL_CASE" | "CAMELCASE" => Ok(NamingStyle::UpperCamelCase),
            _ => Err(TableTypesError::Config(format!(
                "unknown naming style '{}'",
                s
            ))),
        }
    }
}

/// Style applied to generated record component names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldNameStyle {
    #[default]
    AsIs,
    LowerCamelCase,
    UpperCamelCase,
}

impl FieldNameStyle {
    pub fn apply(self, raw: &str) -> String {
        match self {
            FieldNameStyle::AsIs => raw.to_string(),
            FieldNameStyle::LowerCamelCase => lower_camel_case(raw),
            FieldNameStyle::UpperCamelCase => upper_camel_case(raw),
        }
    }
}

impl FromStr for FieldNameStyle {
    type Err = TableTypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_option(s).as_str() {
            "AS_IS" | "DB" => Ok(FieldNameStyle::AsIs),
            "LOWER_CAMEL_CASE" | "CAMELCASE" => Ok(FieldNameStyle::LowerCamelCase),
            "UPPER_CAMEL_CASE" => Ok(FieldNameStyle::UpperCamelCase),
            _ => Err(TableTypesError::Config(format!(
                "unknown field name style '{}'",
                s
            ))),
        }
    }
}

/// Style of parameter references in generated insert SQL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParamStyle {
    /// `:column_name`
    #[default]
    AsIs,
    /// `:columnName`
    CamelCase,
    /// `?`
    QuestionMark,
    /// `$1`, `$2`, ...
    DollarNumber,
}

impl FromStr for ParamStyle {
    type Err = TableTypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_option(s).as_str() {
            "AS_IS" | "DB" => Ok(ParamStyle::AsIs),
            "CAMEL_CASE" | "CAMELCASE" => Ok(ParamStyle::CamelCase),
            "QUESTION_MARK" | "QMARK" => Ok(ParamStyle::QuestionMark),
            "DOLLAR_NUMBER" | "DOLLAR_NUM" => Ok(ParamStyle::DollarNumber),
            _ => Err(TableTypesError::Config(format!(
                "unknown parameter style '{}'",
                s
            ))),
        }
    }
}

/// Style selections for every naming axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingStyleConfig {
    pub schema: NamingStyle,
    pub table: NamingStyle,
    pub user_type: NamingStyle,
    pub field: FieldNameStyle,
    pub param: ParamStyle,
}

impl Default for NamingStyleConfig {
    fn default() -> Self {
        Self {
            schema: NamingStyle::UpperCamelCase,
            table: NamingStyle::CapitalizeWhole,
            user_type: NamingStyle::UpperCamelCase,
            field: FieldNameStyle::AsIs,
            param: ParamStyle::AsIs,
        }
    }
}

/// Name of the container class generated for a schema
///
/// An absent or empty schema resolves as [`DEFAULT_SCHEMA`].
pub fn schema_class_name(schema: Option<&str>, style: NamingStyle, prefix: &str) -> String {
    let schema = schema.filter(|s| !s.is_empty()).unwrap_or(DEFAULT_SCHEMA);
    format!("{}{}", prefix, style.apply(schema))
}

/// Upper-case the first character, leaving the rest untouched
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Convert to UpperCamelCase
///
/// Parts written entirely in upper case are lower-cased after their first
/// character, so `ORDER_ITEMS` and `order_items` both become `OrderItems`.
pub fn upper_camel_case(s: &str) -> String {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let shouting = !part.chars().any(char::is_lowercase);
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(first) if shouting => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// Convert to lowerCamelCase
pub fn lower_camel_case(s: &str) -> String {
    let upper = upper_camel_case(s);
    let mut chars = upper.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Turn an enum label into a bare identifier usable as a constant name
///
/// Common punctuation is replaced with a descriptive token (`a,b` becomes
/// `a_comma_b`), whitespace with `_` and any other non-identifier character
/// with its code point (`&` becomes `_x26_`). Java keywords and the members of
/// the generated enum get a trailing `_`.
pub fn enum_constant_name(label: &str) -> String {
    if label.is_empty() {
        return "_empty_".to_string();
    }

    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            ',' => out.push_str("_comma_"),
            '/' => out.push_str("_slash_"),
            '.' => out.push_str("_dot_"),
            '-' => out.push_str("_dash_"),
            '(' => out.push_str("_lparen_"),
            ')' => out.push_str("_rparen_"),
            '[' => out.push_str("_lbracket_"),
            ']' => out.push_str("_rbracket_"),
            '{' => out.push_str("_lbrace_"),
            '}' => out.push_str("_rbrace_"),
            '<' => out.push_str("_lt_"),
            '>' => out.push_str("_gt_"),
            c if c.is_whitespace() => out.push('_'),
            c if c.is_alphanumeric() || c == '_' || c == '$' => out.push(c),
            c => out.push_str(&format!("_x{:x}_", c as u32)),
        }
    }

    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if RESERVED_CONSTANT_NAMES.contains(&out.as_str()) {
        out.push('_');
    }
    out
}

/// Names an enum constant cannot take: Java keywords and literals, plus the
/// members every generated enum declares
const RESERVED_CONSTANT_NAMES: &[&str] = &[
    "_", "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class",
    "const", "continue", "default", "do", "double", "else", "enum", "extends", "false", "final",
    "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
    "interface", "long", "native", "new", "null", "package", "private", "protected", "public",
    "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this", "throw",
    "throws", "transient", "true", "try", "void", "volatile", "while", "label", "typeName",
];

fn normalize_option(s: &str) -> String {
    s.trim().to_ascii_uppercase().replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STYLES: [NamingStyle; 4] = [
        NamingStyle::AsIs,
        NamingStyle::CapitalizeWhole,
        NamingStyle::CapitalizeEachPart,
        NamingStyle::UpperCamelCase,
    ];

    #[test]
    fn test_styles_on_snake_case() {
        assert_eq!(NamingStyle::AsIs.apply("order_line_items"), "order_line_items");
        assert_eq!(
            NamingStyle::CapitalizeWhole.apply("order_line_items"),
            "Order_line_items"
        );
        assert_eq!(
            NamingStyle::CapitalizeEachPart.apply("order_line_items"),
            "OrderLineItems"
        );
        assert_eq!(
            NamingStyle::UpperCamelCase.apply("order_line_items"),
            "OrderLineItems"
        );
    }

    #[test]
    fn test_capitalize_each_part_keeps_part_case() {
        assert_eq!(NamingStyle::CapitalizeEachPart.apply("ORDER_items"), "ORDERItems");
        assert_eq!(NamingStyle::CapitalizeEachPart.apply("order-items"), "Order-items");
    }

    #[test]
    fn test_upper_camel_case() {
        assert_eq!(upper_camel_case("ORDER_ITEMS"), "OrderItems");
        assert_eq!(upper_camel_case("createdAt"), "CreatedAt");
        assert_eq!(upper_camel_case("order-items 2"), "OrderItems2");
        assert_eq!(upper_camel_case("__id__"), "Id");
    }

    #[test]
    fn test_lower_camel_case() {
        assert_eq!(lower_camel_case("customer_name"), "customerName");
        assert_eq!(lower_camel_case("ID"), "id");
        assert_eq!(lower_camel_case("x"), "x");
    }

    #[test]
    fn test_styles_are_total() {
        for style in ALL_STYLES {
            for raw in ["", "a", "A", "nodelimiter", "_", "__", "é_ü"] {
                assert_eq!(style.apply(raw), style.apply(raw));
            }
            assert_eq!(style.apply(""), "");
            assert_eq!(style.apply("x").to_lowercase(), "x");
        }
        assert_eq!(NamingStyle::UpperCamelCase.apply("é_ü"), "ÉÜ");
    }

    #[test]
    fn test_field_name_styles() {
        assert_eq!(FieldNameStyle::AsIs.apply("customer_name"), "customer_name");
        assert_eq!(FieldNameStyle::LowerCamelCase.apply("customer_name"), "customerName");
        assert_eq!(FieldNameStyle::UpperCamelCase.apply("customer_name"), "CustomerName");
    }

    #[test]
    fn test_schema_class_name() {
        assert_eq!(
            schema_class_name(None, NamingStyle::UpperCamelCase, ""),
            "Public"
        );
        assert_eq!(
            schema_class_name(Some(""), NamingStyle::AsIs, "S_"),
            "S_public"
        );
        assert_eq!(
            schema_class_name(Some("sales_data"), NamingStyle::UpperCamelCase, "Db"),
            "DbSalesData"
        );
    }

    #[test]
    fn test_enum_constant_name() {
        assert_eq!(enum_constant_name("happy"), "happy");
        assert_eq!(enum_constant_name("a,b"), "a_comma_b");
        assert_eq!(enum_constant_name("in progress"), "in_progress");
        assert_eq!(enum_constant_name("a/b.c-d"), "a_slash_b_dot_c_dash_d");
        assert_eq!(enum_constant_name("(x)[y]{z}<w>"), "_lparen_x_rparen__lbracket_y_rbracket__lbrace_z_rbrace__lt_w_gt_");
        assert_eq!(enum_constant_name("1st"), "_1st");
        assert_eq!(enum_constant_name(""), "_empty_");
    }

    #[test]
    fn test_enum_constant_name_escapes_other_characters() {
        assert_eq!(enum_constant_name("rock&roll's+1"), "rock_x26_roll_x27_s_x2b_1");
        assert_eq!(enum_constant_name("%"), "_x25_");
        assert_eq!(enum_constant_name("caf\u{e9}"), "caf\u{e9}");
        assert_eq!(enum_constant_name("a$b_c"), "a$b_c");
    }

    #[test]
    fn test_enum_constant_name_avoids_reserved_names() {
        assert_eq!(enum_constant_name("default"), "default_");
        assert_eq!(enum_constant_name("class"), "class_");
        assert_eq!(enum_constant_name("label"), "label_");
        assert_eq!(enum_constant_name("typeName"), "typeName_");
        assert_eq!(enum_constant_name("_"), "__");
        assert_eq!(enum_constant_name("Default"), "Default");
    }

    #[test]
    fn test_parse_styles() {
        assert_eq!("AS_IS".parse::<NamingStyle>().unwrap(), NamingStyle::AsIs);
        assert_eq!("db_initcap".parse::<NamingStyle>().unwrap(), NamingStyle::CapitalizeWhole);
        assert_eq!(
            "capitalize-each-part".parse::<NamingStyle>().unwrap(),
            NamingStyle::CapitalizeEachPart
        );
        assert_eq!("CAMELCASE".parse::<FieldNameStyle>().unwrap(), FieldNameStyle::LowerCamelCase);
        assert_eq!("QMARK".parse::<ParamStyle>().unwrap(), ParamStyle::QuestionMark);
        assert_eq!("DOLLAR_NUMBER".parse::<ParamStyle>().unwrap(), ParamStyle::DollarNumber);

        let err = "SHOUTY".parse::<NamingStyle>().unwrap_err();
        assert!(err.to_string().contains("SHOUTY"));
    }
}
