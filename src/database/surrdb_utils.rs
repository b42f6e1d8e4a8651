use crate::error::{AppError, AppResult};

/// Table and column names are spliced into SurrealQL, so only plain identifiers pass.
pub fn check_ident(name: &str) -> AppResult<&str> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(AppError::Generic {
            description: format!("invalid identifier `{name}`"),
        })
    }
}

/// SurrealQL string literal for `value`.
pub fn quote_str(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// `WHERE` condition for an equality predicate; `id` compares against the record id.
pub fn eq_condition(table: &str, column: &str, value: &str) -> AppResult<String> {
    let table = check_ident(table)?;
    let column = check_ident(column)?;
    let literal = quote_str(value);
    if column == "id" {
        Ok(format!("id = type::thing({}, {literal})", quote_str(table)))
    } else {
        Ok(format!("{column} = {literal}"))
    }
}
