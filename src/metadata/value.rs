//! Conversions between frontmatter values and spreadsheet cell text.

use chrono::NaiveDate;
use regex::Regex;
use serde_yaml::{Number, Value};
use std::sync::LazyLock;

static NUMERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+(\.\d+)?$").expect("valid regex"));

const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d", "%d.%m.%Y"];

/// Render a value the way it appears in a spreadsheet cell
///
/// Booleans become `TRUE`/`FALSE`, lists are joined with `", "` and nested
/// mappings are written as JSON.
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => render_bool(*b),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => items
            .iter()
            .map(render_cell)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Mapping(_) => render_json(value),
        Value::Tagged(tagged) => render_cell(&tagged.value),
    }
}

fn render_bool(b: bool) -> String {
    String::from(if b { "TRUE" } else { "FALSE" })
}

/// JSON text of a value; falls back to YAML for keys JSON cannot express
pub fn render_json(value: &Value) -> String {
    serde_json::to_string(value)
        .or_else(|_| serde_yaml::to_string(value).map(|s| s.trim_end().to_string()))
        .unwrap_or_default()
}

/// Interpret free cell text as a YAML scalar
///
/// `TRUE`/`FALSE` in any case become booleans. Plain numerals become numbers,
/// and numerals with an all-zero fraction (`2025.0`) become integers.
pub fn coerce_scalar(cell: &str) -> Value {
    let text = cell.trim();

    if text.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    if NUMERAL.is_match(text) {
        if let Ok(int) = text.parse::<i64>() {
            return Value::Number(int.into());
        }
        if let Ok(float) = text.parse::<f64>() {
            if float.fract() == 0.0 && float.abs() < i64::MAX as f64 {
                return Value::Number(Number::from(float as i64));
            }
            return Value::Number(Number::from(float));
        }
    }

    Value::String(text.to_string())
}

/// Split comma-separated cell text into a list of trimmed strings
pub fn coerce_list(cell: &str) -> Value {
    Value::Sequence(
        list_items(cell)
            .into_iter()
            .map(Value::String)
            .collect(),
    )
}

fn list_items(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a date written in one of the accepted layouts
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// Value written for an edited date cell: ISO when the text parses as a date
pub fn coerce_date(cell: &str) -> Value {
    match parse_date(cell) {
        Some(date) => Value::String(date.format("%Y-%m-%d").to_string()),
        None => coerce_scalar(cell),
    }
}

/// True when `cell` already describes `current`
///
/// Text equal to the rendered value always matches. Otherwise the cell is
/// coerced and compared to the stored value, so `true` matches `TRUE` and
/// `7` matches a stored `7`.
pub fn scalar_matches(cell: &str, current: Option<&Value>) -> bool {
    let current = current.unwrap_or(&Value::Null);
    if cell.trim() == render_cell(current).trim() {
        return true;
    }
    coerce_scalar(cell) == *current
}

/// Lists match when their items render identically in order
pub fn list_matches(cell: &str, current: Option<&Value>) -> bool {
    let current = current.unwrap_or(&Value::Null);
    if cell.trim() == render_cell(current).trim() {
        return true;
    }
    let stored: Vec<String> = match current {
        Value::Sequence(items) => items.iter().map(|v| render_cell(v).trim().to_string()).collect(),
        Value::Null => Vec::new(),
        other => vec![render_cell(other).trim().to_string()],
    };
    stored == list_items(cell)
}

/// Dates match when both sides parse to the same day
pub fn date_matches(cell: &str, current: Option<&Value>) -> bool {
    if scalar_matches(cell, current) {
        return true;
    }
    let stored = current.map(render_cell).unwrap_or_default();
    match (parse_date(cell), parse_date(&stored)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
