//! Rendering of configurable attributes as `select()` expressions
//!
//! List attributes concatenate one select per axis onto the base value:
//!
//! ```text
//! ["common.c"] + select({
//!     "//build/bazel_common_rules/platforms/arch:arm": ["arm.c"],
//!     "//conditions:default": [],
//! })
//! ```
//!
//! Scalar attributes cannot be concatenated, so they are collapsed into a
//! single select whose default branch is the base value.

use std::collections::BTreeMap;

use crate::attribute::axis::{CONDITIONS_DEFAULT, CONDITIONS_DEFAULT_SELECT_KEY, ConfigurationAxis};
use crate::attribute::configurable::{ConfigurableAttribute, ListValue, SelectValue};
use crate::error::Result;
use crate::starlark::indentation;

/// Renders a list attribute, or `None` when nothing would be emitted.
pub fn render_list<T: ListValue>(
    attr: &ConfigurableAttribute<T>,
    indent: usize,
) -> Result<Option<String>> {
    let mut selects = Vec::new();
    for (axis, values) in &attr.configurable_values {
        if let Some(rendered) = render_axis(axis, values, attr.emit_empty_list, indent)? {
            selects.push(rendered);
        }
    }

    let base = (!attr.value.is_zero()).then(|| attr.value.render(indent));
    let parts: Vec<String> = if attr.prepend {
        selects.into_iter().chain(base).collect()
    } else {
        base.into_iter().chain(selects).collect()
    };

    if parts.is_empty() {
        return Ok(attr.force_specify_empty_list.then(|| "[]".to_string()));
    }
    Ok(Some(parts.join(" + ")))
}

fn render_axis<T: SelectValue>(
    axis: &ConfigurationAxis,
    values: &BTreeMap<String, T>,
    emit_empty_list: bool,
    indent: usize,
) -> Result<Option<String>> {
    let default = values.get(CONDITIONS_DEFAULT);
    let default_is_set = default.is_some_and(|d| !d.is_zero());
    // Product variable selects always carry their empty branches so the
    // explicit default is never dropped.
    let keep_zero = emit_empty_list || default_is_set || axis.is_product_variable();

    let mut entries = BTreeMap::new();
    for (config, value) in values {
        if config == CONDITIONS_DEFAULT {
            continue;
        }
        if Some(value) == default && !axis.is_product_variable() {
            continue;
        }
        if value.is_zero() && !keep_zero {
            continue;
        }
        entries.insert(axis.select_key(config)?, value.render(indent + 1));
    }

    if entries.is_empty() {
        return Ok(default
            .filter(|d| !d.is_zero())
            .map(|d| d.render(indent)));
    }

    let default_literal = default
        .map(|d| d.render(indent + 1))
        .unwrap_or_else(|| T::NEUTRAL.to_string());
    Ok(Some(print_select(&entries, &default_literal, indent)))
}

/// Renders a scalar attribute, or `None` when nothing would be emitted.
pub fn render_scalar<V>(
    attr: &ConfigurableAttribute<Option<V>>,
    indent: usize,
) -> Result<Option<String>>
where
    Option<V>: SelectValue,
{
    let mut collapsed = attr.clone();
    collapsed.collapse()?;

    let mut explicit_default = None;
    let mut branches: Vec<(String, &Option<V>)> = Vec::new();
    for (axis, values) in &collapsed.configurable_values {
        for (config, value) in values {
            if config == CONDITIONS_DEFAULT {
                explicit_default = Some(value);
            } else {
                branches.push((axis.select_key(config)?, value));
            }
        }
    }

    let default = explicit_default.unwrap_or(&collapsed.value);
    let mut entries = BTreeMap::new();
    for (key, value) in branches {
        if value.is_zero() && default.is_zero() {
            continue;
        }
        entries.insert(key, value.render(indent + 1));
    }

    if entries.is_empty() {
        return Ok((!default.is_zero()).then(|| default.render(indent)));
    }
    Ok(Some(print_select(&entries, &default.render(indent + 1), indent)))
}

/// Prints a select with sorted branches and the default branch last.
fn print_select(entries: &BTreeMap<String, String>, default: &str, indent: usize) -> String {
    let inner = indentation(indent + 1);
    let mut out = String::from("select({\n");
    for (key, value) in entries {
        out.push_str(&format!("{inner}\"{key}\": {value},\n"));
    }
    out.push_str(&format!(
        "{inner}\"{CONDITIONS_DEFAULT_SELECT_KEY}\": {default},\n"
    ));
    out.push_str(&indentation(indent));
    out.push_str("})");
    out
}
