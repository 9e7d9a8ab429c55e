//! Insert and select statement templates

use crate::metadata::{Field, TypeName};
use crate::naming::{lower_camel_case, ParamStyle};

/// `insert into <relation>(<columns>) values(<params>)`, with a `returning`
/// clause listing the columns the database always generates.
pub fn insert_sql(
    relation: &str,
    fields: &[&Field],
    returning: &[&Field],
    style: ParamStyle,
) -> String {
    let columns = join_names(fields);
    let params = fields
        .iter()
        .enumerate()
        .map(|(ix, f)| param_ref(f, ix, style))
        .collect::<Vec<_>>()
        .join(",");

    let mut sql = format!("insert into {}({}) values({})", relation, columns, params);
    if !returning.is_empty() {
        sql.push_str(" returning ");
        sql.push_str(&join_names(returning));
    }
    sql
}

/// `select <all columns> from <relation>`
pub fn select_sql(relation: &str, fields: &[&Field]) -> String {
    format!("select {} from {}", join_names(fields), relation)
}

/// Parameter reference for the field at position `ix` (0-based) of an insert
///
/// User-defined types get an explicit cast so the database can resolve the
/// literal's type.
pub fn param_ref(field: &Field, ix: usize, style: ParamStyle) -> String {
    let param = match style {
        ParamStyle::AsIs => format!(":{}", field.name),
        ParamStyle::CamelCase => format!(":{}", lower_camel_case(&field.name)),
        ParamStyle::QuestionMark => "?".to_string(),
        ParamStyle::DollarNumber => format!("${}", ix + 1),
    };

    match &field.user_type {
        Some(user_type) => format!("{}::{}", param, cast_type(user_type)),
        None => param,
    }
}

/// Type name as written in a cast, quoting the parts that need it
fn cast_type(type_name: &TypeName) -> String {
    match &type_name.schema {
        Some(schema) => format!("{}.{}", quote_ident(schema), quote_ident(&type_name.name)),
        None => quote_ident(&type_name.name),
    }
}

/// Quote an identifier unless it is a plain lower-case one
pub fn quote_ident(ident: &str) -> String {
    let mut chars = ident.chars();
    let plain = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '$');

    if plain {
        ident.to_string()
    } else {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }
}

fn join_names(fields: &[&Field]) -> String {
    fields
        .iter()
        .map(|f| f.name.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
