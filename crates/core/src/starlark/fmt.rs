//! Helpers producing Starlark-compatible literal text

use std::collections::BTreeMap;

const INDENT_WIDTH: usize = 4;

/// Returns the indent string for the given nesting level.
pub fn indentation(level: usize) -> String {
    " ".repeat(level * INDENT_WIDTH)
}

/// Returns a Starlark compatible bool token.
pub fn print_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Escapes a string so it can be embedded in a double-quoted Starlark literal.
///
/// Backslashes are escaped first so the escapes introduced for control
/// characters and quotes are not escaped a second time.
pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\t', "\\t")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('"', "\\\"")
}

/// Returns `s` as an escaped, double-quoted string literal.
pub fn quote(s: &str) -> String {
    format!("\"{}\"", escape_string(s))
}

/// Prints already formatted items as a list with one item per line.
pub fn print_list(items: &[String], level: usize) -> String {
    if items.is_empty() {
        return "[]".to_string();
    }
    let inner = indentation(level + 1);
    let mut out = String::from("[\n");
    for item in items {
        out.push_str(&inner);
        out.push_str(item);
        out.push_str(",\n");
    }
    out.push_str(&indentation(level));
    out.push(']');
    out
}

/// Prints already formatted items, keeping single-element lists on one line.
///
/// This is the layout used for configurable list values, where
/// `["a.c"] + select({...})` reads better than a three line base value.
pub fn print_compact_list(items: &[String], level: usize) -> String {
    match items {
        [] => "[]".to_string(),
        [single] => format!("[{single}]"),
        _ => print_list(items, level),
    }
}

/// Prints a dictionary whose values are already formatted, sorted by key.
pub fn print_dict(dict: &BTreeMap<String, String>, level: usize) -> String {
    if dict.is_empty() {
        return "{}".to_string();
    }
    let inner = indentation(level + 1);
    let items: Vec<String> = dict
        .iter()
        .map(|(key, value)| format!("{inner}{}: {value},", quote(key)))
        .collect();
    format!("{{\n{}\n{}}}", items.join("\n"), indentation(level))
}

/// Prints a dictionary of string keys to string values.
pub fn print_string_dict(dict: &BTreeMap<String, String>, level: usize) -> String {
    let quoted: BTreeMap<String, String> = dict
        .iter()
        .map(|(key, value)| (key.clone(), quote(value)))
        .collect();
    print_dict(&quoted, level)
}
