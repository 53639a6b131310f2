//! JSON description of a module graph.
//!
//! Property values are plain JSON, except for a few sentinel objects with a
//! single `$`-prefixed key that select the richer value kinds:
//!
//! ```json
//! {
//!   "Srcs": {"$label_list": {"value": ["a.cc"], "arch": {"arm": ["arm.cc"]}}},
//!   "Stem": {"$optional": null},
//!   "Common": {"$embed": {"Enabled": true}}
//! }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value as Json};

use crate::attribute::{
    ConfigurableAttribute, ConfigurableValue, ConfigurationAxis, FieldTag, Label, LabelList,
    Property, PropertyBag, PropertyStruct, SelectValue, Value,
};
use crate::convert::{TargetDescriptor, UnconvertedReason};
use crate::error::{Error, Result};
use crate::graph::memory::{DepRef, InMemoryGraph, ModuleNode};

#[derive(Debug, Deserialize)]
struct GraphFile {
    #[serde(default)]
    modules: Vec<ModuleEntry>,
}

#[derive(Debug, Deserialize)]
struct ModuleEntry {
    name: String,
    #[serde(default)]
    dir: String,
    #[serde(default)]
    variant: String,
    #[serde(rename = "type")]
    module_type: String,
    #[serde(default)]
    handcrafted: bool,
    #[serde(default)]
    convertible: bool,
    #[serde(default)]
    unconverted_reason: Option<UnconvertedReason>,
    #[serde(default)]
    deps: Vec<DepRef>,
    #[serde(default)]
    unconverted_deps: Vec<String>,
    #[serde(default)]
    missing_deps: Vec<String>,
    #[serde(default)]
    properties: Json,
    #[serde(default)]
    targets: Vec<TargetEntry>,
}

#[derive(Debug, Deserialize)]
struct TargetEntry {
    rule_class: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    package: String,
    #[serde(default)]
    bzl_load_location: String,
    #[serde(default)]
    attributes: Json,
}

/// Decodes a whole graph document.
pub fn decode_graph(json: &str) -> Result<InMemoryGraph> {
    let file: GraphFile = serde_json::from_str(json)?;
    let modules = file
        .modules
        .into_iter()
        .map(decode_module)
        .collect::<Result<Vec<_>>>()?;
    InMemoryGraph::new(modules)
}

fn decode_module(entry: ModuleEntry) -> Result<ModuleNode> {
    let properties = decode_bag(&entry.properties)
        .map_err(|e| Error::GraphDecode(format!("module {}: {}", entry.name, e)))?;
    let targets = entry
        .targets
        .into_iter()
        .map(|t| {
            let attributes = decode_bag(&t.attributes).map_err(|e| {
                Error::GraphDecode(format!("module {} target {}: {}", entry.name, t.name, e))
            })?;
            Ok(TargetDescriptor::new(t.rule_class, t.name)
                .with_package(t.package)
                .with_load_location(t.bzl_load_location)
                .with_attributes(attributes))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut node = ModuleNode::new(entry.name, entry.dir, entry.module_type)
        .with_variant(entry.variant)
        .with_properties(properties)
        .with_unconverted_deps(entry.unconverted_deps)
        .with_missing_deps(entry.missing_deps);
    node.handcrafted = entry.handcrafted;
    node.convertible = entry.convertible;
    node.unconverted_reason = entry.unconverted_reason;
    node.deps = entry.deps;
    node.targets = targets;
    Ok(node)
}

/// Decodes `{"StructName": {fields...}, ...}` into a bag of property structs.
pub fn decode_bag(json: &Json) -> Result<PropertyBag> {
    match json {
        Json::Null => Ok(PropertyBag::new()),
        Json::Object(structs) => structs
            .iter()
            .map(|(name, body)| decode_struct(name, body))
            .collect::<Result<Vec<_>>>()
            .map(|structs| PropertyBag { structs }),
        other => Err(Error::InvalidPropertyShape(kind_name(other).to_string())),
    }
}

/// Decodes one struct body, field by field.
pub fn decode_struct(name: &str, json: &Json) -> Result<PropertyStruct> {
    let Json::Object(fields) = json else {
        return Err(Error::InvalidPropertyShape(kind_name(json).to_string()));
    };
    let mut s = PropertyStruct::new(name);
    for (field, value) in fields {
        match sentinel(value) {
            Some(("$embed", inner)) => {
                s = s.with_embedded(decode_struct(field, inner)?);
            }
            Some(("$emit_zero", inner)) => {
                let value = decode_value(inner).map_err(|e| e.in_property(field))?;
                s = s.with_property(Property::new(field, value).emit_zero());
            }
            Some(("$mutated", inner)) => {
                let value = decode_value(inner).map_err(|e| e.in_property(field))?;
                s = s.with_property(Property::new(field, value).with_tag(FieldTag::Mutated));
            }
            Some(("$unexported", inner)) => {
                let value = decode_value(inner).map_err(|e| e.in_property(field))?;
                s = s.with_property(Property::new(field, value).with_tag(FieldTag::Unexported));
            }
            _ => {
                let value = decode_value(value).map_err(|e| e.in_property(field))?;
                s = s.with_property(Property::new(field, value));
            }
        }
    }
    Ok(s)
}

/// Decodes a single property value.
pub fn decode_value(json: &Json) -> Result<Value> {
    match json {
        Json::Null => Err(Error::UnsupportedFieldKind("null".to_string())),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::String(s) => Ok(Value::String(s.clone())),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::UInt(u))
            } else {
                Err(Error::UnsupportedFieldKind(format!("float {n}")))
            }
        }
        Json::Array(items) => items
            .iter()
            .map(decode_value)
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        Json::Object(_) => match sentinel(json) {
            Some((key, payload)) => decode_sentinel(key, payload),
            None => decode_struct("", json).map(Value::Struct),
        },
    }
}

fn decode_sentinel(key: &str, payload: &Json) -> Result<Value> {
    match key {
        "$label" => decode_label(payload).map(Value::Label),
        "$optional" => match payload {
            Json::Null => Ok(Value::none()),
            inner => decode_value(inner).map(Value::some),
        },
        "$string_map" => decode_string_map(payload).map(Value::StringMap),
        "$label_list" => {
            let attr = decode_configurable(payload, decode_label_list)?;
            Ok(Value::Configurable(ConfigurableValue::LabelList(attr)))
        }
        "$string_list" => {
            let attr = decode_configurable(payload, decode_string_list)?;
            Ok(Value::Configurable(ConfigurableValue::StringList(attr)))
        }
        "$configurable_label" => {
            let attr = decode_configurable(payload, |j| nullable(j, decode_label))?;
            Ok(Value::Configurable(ConfigurableValue::Label(attr)))
        }
        "$string" => {
            let attr = decode_configurable(payload, |j| nullable(j, decode_string))?;
            Ok(Value::Configurable(ConfigurableValue::String(attr)))
        }
        "$bool" => {
            let attr = decode_configurable(payload, |j| nullable(j, decode_bool))?;
            Ok(Value::Configurable(ConfigurableValue::Bool(attr)))
        }
        "$embed" | "$emit_zero" | "$mutated" | "$unexported" => Err(Error::InvalidPropertyShape(
            format!("{key} is only valid directly under a struct field"),
        )),
        other => Err(Error::UnsupportedFieldKind(other.to_string())),
    }
}

/// Splits `{"$key": payload}` into its parts.
fn sentinel(json: &Json) -> Option<(&str, &Json)> {
    match json {
        Json::Object(map) if map.len() == 1 => map
            .iter()
            .next()
            .filter(|(k, _)| k.starts_with('$'))
            .map(|(k, v)| (k.as_str(), v)),
        _ => None,
    }
}

/// Decodes either a bare value or a `{value, arch, os, ...}` payload.
fn decode_configurable<T, F>(payload: &Json, decode: F) -> Result<ConfigurableAttribute<T>>
where
    T: SelectValue,
    F: Fn(&Json) -> Result<T>,
{
    let Json::Object(map) = payload else {
        return Ok(ConfigurableAttribute::new(decode(payload)?));
    };
    let mut attr = ConfigurableAttribute::default();
    for (key, value) in map {
        match key.as_str() {
            "value" => attr.set_value(decode(value)?),
            "arch" => set_axis(&mut attr, ConfigurationAxis::Arch, value, &decode)?,
            "os" => set_axis(&mut attr, ConfigurationAxis::Os, value, &decode)?,
            "os_arch" => set_axis(&mut attr, ConfigurationAxis::OsArch, value, &decode)?,
            "os_and_in_apex" => {
                set_axis(&mut attr, ConfigurationAxis::OsAndInApex, value, &decode)?
            }
            "in_apex" => set_axis(&mut attr, ConfigurationAxis::InApex, value, &decode)?,
            "errorprone" => set_axis(&mut attr, ConfigurationAxis::ErrorProne, value, &decode)?,
            "product_variables" => {
                for (variable, configs) in object(value, key)? {
                    set_axis(
                        &mut attr,
                        ConfigurationAxis::product_variable(variable.as_str()),
                        configs,
                        &decode,
                    )?;
                }
            }
            "arch_variant_product_variables" => {
                for (variable, configs) in object(value, key)? {
                    set_axis(
                        &mut attr,
                        ConfigurationAxis::arch_variant_product_variable(variable.as_str()),
                        configs,
                        &decode,
                    )?;
                }
            }
            "prepend" => attr.prepend = decode_bool(value)?,
            "emit_empty_list" => attr.emit_empty_list = decode_bool(value)?,
            "force_specify_empty_list" => attr.force_specify_empty_list = decode_bool(value)?,
            other => {
                return Err(Error::GraphDecode(format!(
                    "unknown configurable attribute key {other}"
                )));
            }
        }
    }
    Ok(attr)
}

fn set_axis<T, F>(
    attr: &mut ConfigurableAttribute<T>,
    axis: ConfigurationAxis,
    configs: &Json,
    decode: &F,
) -> Result<()>
where
    T: SelectValue,
    F: Fn(&Json) -> Result<T>,
{
    for (config, value) in object(configs, axis.name())? {
        attr.set_select_value(axis.clone(), config, decode(value)?)?;
    }
    Ok(())
}

fn object<'a>(json: &'a Json, what: &str) -> Result<&'a Map<String, Json>> {
    match json {
        Json::Object(map) => Ok(map),
        other => Err(Error::GraphDecode(format!(
            "{what} must be an object, got {}",
            kind_name(other)
        ))),
    }
}

fn nullable<T>(json: &Json, decode: impl Fn(&Json) -> Result<T>) -> Result<Option<T>> {
    match json {
        Json::Null => Ok(None),
        other => decode(other).map(Some),
    }
}

fn decode_label(json: &Json) -> Result<Label> {
    match json {
        Json::String(s) => Ok(Label::new(s.as_str())),
        Json::Object(_) => Ok(Label::deserialize(json)?),
        other => Err(Error::UnsupportedFieldKind(format!(
            "label from {}",
            kind_name(other)
        ))),
    }
}

fn decode_label_list(json: &Json) -> Result<LabelList> {
    match json {
        Json::Array(items) => items
            .iter()
            .map(decode_label)
            .collect::<Result<Vec<_>>>()
            .map(LabelList),
        other => Err(Error::UnsupportedFieldKind(format!(
            "label list from {}",
            kind_name(other)
        ))),
    }
}

fn decode_string(json: &Json) -> Result<String> {
    match json {
        Json::String(s) => Ok(s.clone()),
        other => Err(Error::UnsupportedFieldKind(format!(
            "string from {}",
            kind_name(other)
        ))),
    }
}

fn decode_string_list(json: &Json) -> Result<Vec<String>> {
    match json {
        Json::Array(items) => items.iter().map(decode_string).collect(),
        other => Err(Error::UnsupportedFieldKind(format!(
            "string list from {}",
            kind_name(other)
        ))),
    }
}

fn decode_bool(json: &Json) -> Result<bool> {
    match json {
        Json::Bool(b) => Ok(*b),
        other => Err(Error::UnsupportedFieldKind(format!(
            "bool from {}",
            kind_name(other)
        ))),
    }
}

fn decode_string_map(json: &Json) -> Result<BTreeMap<String, String>> {
    object(json, "$string_map")?
        .iter()
        .map(|(k, v)| Ok((k.clone(), decode_string(v)?)))
        .collect()
}

fn kind_name(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ModuleGraph;
    use serde_json::json;

    #[test]
    fn test_declaration_order_is_kept() {
        use crate::attribute::DuplicatePolicy;

        let bag: Json =
            serde_json::from_str(r#"{"Zeta": {"Foo": "first"}, "Alpha": {"Foo": "last"}}"#).unwrap();
        let bag = decode_bag(&bag).unwrap();
        let names: Vec<&str> = bag.structs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
        let attrs = bag.extract(DuplicatePolicy::Overwrite).unwrap();
        assert_eq!(attrs.get("foo"), Some(r#""last""#));

        let body: Json =
            serde_json::from_str(r#"{"Stl": "libc++", "Base": {"$embed": {"Stl": "none"}}}"#).unwrap();
        let s = decode_struct("Props", &body).unwrap();
        assert_eq!(s.extract(0).unwrap()["stl"], r#""none""#);
    }

    #[test]
    fn test_plain_values() {
        assert_eq!(decode_value(&json!("x")).unwrap(), Value::String("x".into()));
        assert_eq!(decode_value(&json!(true)).unwrap(), Value::Bool(true));
        assert_eq!(decode_value(&json!(-3)).unwrap(), Value::Int(-3));
        assert_eq!(
            decode_value(&json!(u64::MAX)).unwrap(),
            Value::UInt(u64::MAX)
        );
        assert_eq!(
            decode_value(&json!(["a", "b"])).unwrap(),
            Value::string_list(["a", "b"])
        );
    }

    #[test]
    fn test_unsupported_kinds() {
        assert!(matches!(
            decode_value(&json!(null)),
            Err(Error::UnsupportedFieldKind(_))
        ));
        assert!(matches!(
            decode_value(&json!(1.5)),
            Err(Error::UnsupportedFieldKind(_))
        ));
        assert!(matches!(
            decode_value(&json!({"$tuple": [1]})),
            Err(Error::UnsupportedFieldKind(ref k)) if k == "$tuple"
        ));
    }

    #[test]
    fn test_struct_must_be_object() {
        let err = decode_struct("Props", &json!(["a"])).unwrap_err();
        assert!(matches!(err, Error::InvalidPropertyShape(ref k) if k == "array"));
    }

    #[test]
    fn test_null_field_names_property() {
        let err = decode_struct("Props", &json!({"Stem": null})).unwrap_err();
        assert!(err.to_string().starts_with("Error while parsing property: \"Stem\""));
    }

    #[test]
    fn test_optional() {
        assert_eq!(decode_value(&json!({"$optional": null})).unwrap(), Value::none());
        assert_eq!(
            decode_value(&json!({"$optional": ""})).unwrap(),
            Value::some(Value::String(String::new()))
        );
    }

    #[test]
    fn test_configurable_label_list() {
        let value = decode_value(&json!({"$label_list": {
            "value": ["//a"],
            "arch": {"arm": ["//arm"]},
            "product_variables": {"eng": {"eng": [":eng"]}},
            "prepend": true,
        }}))
        .unwrap();
        let Value::Configurable(ConfigurableValue::LabelList(attr)) = value else {
            panic!("expected label list attribute");
        };
        assert!(attr.prepend);
        assert_eq!(attr.value, LabelList::from_iter(["//a"]));
        assert_eq!(
            attr.select_value(&ConfigurationAxis::Arch, "arm").unwrap(),
            LabelList::from_iter(["//arm"])
        );
        assert_eq!(
            attr.select_value(&ConfigurationAxis::product_variable("eng"), "eng")
                .unwrap(),
            LabelList::from_iter([":eng"])
        );
    }

    #[test]
    fn test_configurable_rejects_unknown_config() {
        let err = decode_value(&json!({"$string_list": {"arch": {"sparc": ["x"]}}})).unwrap_err();
        assert_eq!(err.to_string(), "Unknown arch: sparc");
    }

    #[test]
    fn test_bare_configurable_payload() {
        let value = decode_value(&json!({"$bool": false})).unwrap();
        let Value::Configurable(ConfigurableValue::Bool(attr)) = value else {
            panic!("expected bool attribute");
        };
        assert_eq!(attr.value, Some(false));
    }

    #[test]
    fn test_embedded_and_tagged_fields() {
        let s = decode_struct(
            "Props",
            &json!({
                "Common": {"$embed": {"Enabled": true}},
                "Count": {"$emit_zero": 0},
                "Internal": {"$mutated": "x"},
            }),
        )
        .unwrap();
        let attrs = s.extract(0).unwrap();
        assert_eq!(attrs["enabled"], "True");
        assert_eq!(attrs["count"], "0");
        assert!(!attrs.contains_key("internal"));
        assert!(!attrs.contains_key("common"));
    }

    #[test]
    fn test_decode_graph() {
        let graph = decode_graph(
            &json!({
                "modules": [
                    {
                        "name": "foo",
                        "dir": "a",
                        "type": "custom",
                        "convertible": true,
                        "deps": ["bar"],
                        "targets": [{
                            "rule_class": "custom",
                            "name": "foo",
                            "package": "a",
                            "attributes": {"Attrs": {"Ramdisk": true}},
                        }],
                    },
                    {"name": "bar", "dir": "b", "type": "java_import"},
                ]
            })
            .to_string(),
        )
        .unwrap();

        assert_eq!(graph.len(), 2);
        let foo = graph.module(0).unwrap();
        assert_eq!(foo.targets[0].label(), "//a:foo");
        let mut deps = Vec::new();
        graph.visit_direct_deps(foo, &mut |d| deps.push(graph.module_name(d)));
        assert_eq!(deps, vec!["bar"]);
    }

    #[test]
    fn test_decode_graph_reports_module() {
        let err = decode_graph(
            &json!({"modules": [{"name": "foo", "type": "t", "properties": {"P": 3}}]}).to_string(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Graph decode error: module foo: properties must be a struct, got number"
        );
    }
}
