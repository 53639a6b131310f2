use std::collections::BTreeMap;

use crate::attribute::configurable::ConfigurableValue;
use crate::attribute::label::Label;
use crate::attribute::property::PropertyStruct;
use crate::error::Result;
use crate::starlark::{print_bool, print_dict, print_list, print_string_dict, quote};

/// A typed property value as produced by module conversion logic
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Optional(Option<Box<Value>>),
    List(Vec<Value>),
    Label(Label),
    Struct(PropertyStruct),
    StringMap(BTreeMap<String, String>),
    Configurable(ConfigurableValue),
}

impl Value {
    pub fn some(value: Value) -> Self {
        Value::Optional(Some(Box::new(value)))
    }

    pub fn none() -> Self {
        Value::Optional(None)
    }

    pub fn string_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::List(items.into_iter().map(|s| Value::String(s.into())).collect())
    }

    /// Whether this is the zero value of its kind.
    ///
    /// A present optional is never zero, so `Some(false)` is printed.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::String(s) => s.is_empty(),
            Value::Bool(b) => !b,
            Value::Int(i) => *i == 0,
            Value::UInt(u) => *u == 0,
            Value::Optional(v) => v.is_none(),
            Value::List(items) => items.is_empty(),
            Value::Label(label) => label.is_empty(),
            Value::Struct(s) => s.is_zero(),
            Value::StringMap(map) => map.is_empty(),
            Value::Configurable(c) => c.is_zero(),
        }
    }

    /// Kind name used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Optional(_) => "optional",
            Value::List(_) => "list",
            Value::Label(_) => "label",
            Value::Struct(_) => "struct",
            Value::StringMap(_) => "string_map",
            Value::Configurable(_) => "configurable",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<Label> for Value {
    fn from(label: Label) -> Self {
        Value::Label(label)
    }
}

impl From<PropertyStruct> for Value {
    fn from(s: PropertyStruct) -> Self {
        Value::Struct(s)
    }
}

impl From<ConfigurableValue> for Value {
    fn from(c: ConfigurableValue) -> Self {
        Value::Configurable(c)
    }
}

/// Prints `value` as a Starlark literal at the given indent level.
///
/// Returns `None` when the value should not produce an attribute at all.
pub fn print_value(value: &Value, indent: usize, emit_zero: bool) -> Result<Option<String>> {
    if !emit_zero && value.is_zero() {
        return Ok(None);
    }

    let printed = match value {
        Value::String(s) => Some(quote(s)),
        Value::Bool(b) => Some(print_bool(*b).to_string()),
        Value::Int(i) => Some(i.to_string()),
        Value::UInt(u) => Some(u.to_string()),
        Value::Optional(Some(inner)) => print_value(inner, indent, true)?,
        Value::Optional(None) => Some("None".to_string()),
        Value::List(items) => {
            let mut elements = Vec::with_capacity(items.len());
            for item in items {
                // unset optionals vanish instead of leaving a gap
                if matches!(item, Value::Optional(None)) {
                    continue;
                }
                if let Some(element) = print_value(item, indent + 1, true)? {
                    elements.push(element);
                }
            }
            if elements.is_empty() && !emit_zero {
                None
            } else {
                Some(print_list(&elements, indent))
            }
        }
        Value::Label(label) => Some(quote(&label.label)),
        Value::Struct(s) => {
            let props = s.extract(indent)?;
            (!props.is_empty()).then(|| print_dict(&props, indent))
        }
        Value::StringMap(map) => Some(print_string_dict(map, indent)),
        Value::Configurable(c) => c.render(indent)?,
    };
    Ok(printed)
}
