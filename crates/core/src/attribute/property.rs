use std::collections::BTreeMap;

use crate::attribute::value::{Value, print_value};
use crate::error::{Error, Result};

/// How a field takes part in attribute extraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldTag {
    /// An ordinary attribute
    #[default]
    Attribute,
    /// Bookkeeping written by mutators, never emitted
    Mutated,
    /// Not visible outside the module, never emitted
    Unexported,
}

/// A single named property
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: Value,
    pub tag: FieldTag,
    /// Print the value even when it is the zero value of its kind
    pub emit_zero: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            tag: FieldTag::Attribute,
            emit_zero: false,
        }
    }

    pub fn with_tag(mut self, tag: FieldTag) -> Self {
        self.tag = tag;
        self
    }

    pub fn emit_zero(mut self) -> Self {
        self.emit_zero = true;
        self
    }
}

/// A field of a property struct
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Property(Property),
    /// An embedded struct whose fields are promoted into the parent
    Embedded(PropertyStruct),
}

/// An ordered set of fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyStruct {
    pub name: String,
    pub fields: Vec<Field>,
}

impl PropertyStruct {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.fields.push(Field::Property(property));
        self
    }

    pub fn with_embedded(mut self, embedded: PropertyStruct) -> Self {
        self.fields.push(Field::Embedded(embedded));
        self
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn is_zero(&self) -> bool {
        self.fields.iter().all(|field| match field {
            Field::Property(p) => p.value.is_zero(),
            Field::Embedded(s) => s.is_zero(),
        })
    }

    /// Flattens the struct into attribute name to printed value, sorted by name.
    ///
    /// Values are printed one level deeper than `indent`.
    pub fn extract(&self, indent: usize) -> Result<BTreeMap<String, String>> {
        let mut props = BTreeMap::new();
        for field in &self.fields {
            match field {
                Field::Embedded(embedded) => {
                    props.extend(embedded.extract(indent)?);
                }
                Field::Property(property) => {
                    if property.tag != FieldTag::Attribute {
                        continue;
                    }
                    if !property.emit_zero && property.value.is_zero() {
                        continue;
                    }
                    let name = property_name_for_field(&property.name);
                    let printed = print_value(&property.value, indent + 1, property.emit_zero)
                        .map_err(|e| e.in_property(&name))?;
                    if let Some(printed) = printed {
                        props.insert(name, printed);
                    }
                }
            }
        }
        Ok(props)
    }
}

/// Maps a field name to its attribute name.
///
/// `Ramdisk` becomes `ramdisk`, `Target_required` becomes `target_required`
/// and `StringListProp` becomes `string_list_prop`.
pub fn property_name_for_field(field: &str) -> String {
    let mut name = String::with_capacity(field.len() + 4);
    let mut prev: Option<char> = None;
    for c in field.chars() {
        if c.is_uppercase() {
            if prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
                name.push('_');
            }
            name.extend(c.to_lowercase());
        } else {
            name.push(c);
        }
        prev = Some(c);
    }
    name
}

/// What to do when two structs of a bag produce the same attribute name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Report [`Error::DuplicatePropertyName`]
    Error,
    /// Keep the value from the later struct
    Overwrite,
}

/// The property structs describing one target
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    pub structs: Vec<PropertyStruct>,
}

static EMPTY_BAG: PropertyBag = PropertyBag::new();

impl PropertyBag {
    pub const fn new() -> Self {
        Self {
            structs: Vec::new(),
        }
    }

    /// A shared empty bag for modules without properties
    pub fn empty() -> &'static PropertyBag {
        &EMPTY_BAG
    }

    pub fn with_struct(mut self, s: PropertyStruct) -> Self {
        self.structs.push(s);
        self
    }

    pub fn push(&mut self, s: PropertyStruct) {
        self.structs.push(s);
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }

    /// Flattens every struct into one attribute map.
    pub fn extract(&self, policy: DuplicatePolicy) -> Result<BazelAttributes> {
        let mut attrs = BTreeMap::new();
        for s in &self.structs {
            for (name, value) in s.extract(0)? {
                if policy == DuplicatePolicy::Error {
                    if let Some(existing) = attrs.get(&name) {
                        return Err(Error::DuplicatePropertyName {
                            name,
                            existing: String::clone(existing),
                        });
                    }
                }
                attrs.insert(name, value);
            }
        }
        Ok(BazelAttributes { attrs })
    }
}

/// Printed attributes of one target, ordered by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BazelAttributes {
    attrs: BTreeMap<String, String>,
}

impl BazelAttributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.attrs.remove(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_name_for_field() {
        assert_eq!(property_name_for_field("Ramdisk"), "ramdisk");
        assert_eq!(property_name_for_field("Target_required"), "target_required");
        assert_eq!(property_name_for_field("StringListProp"), "string_list_prop");
        assert_eq!(property_name_for_field("Int64Ptr"), "int64_ptr");
        assert_eq!(property_name_for_field("already_snake"), "already_snake");
    }

    #[test]
    fn test_extract_skips_internal_and_zero_fields() {
        let s = PropertyStruct::new("Props")
            .with_property(Property::new("Ramdisk", true))
            .with_property(Property::new("Vendor", false))
            .with_property(Property::new("Owner", "").emit_zero())
            .with_property(Property::new("Mutated_name", "x").with_tag(FieldTag::Mutated))
            .with_property(Property::new("hidden", "x").with_tag(FieldTag::Unexported));
        let props = s.extract(0).unwrap();
        let names: Vec<&str> = props.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["owner", "ramdisk"]);
        assert_eq!(props["ramdisk"], "True");
        assert_eq!(props["owner"], r#""""#);
    }

    #[test]
    fn test_embedded_flattening_is_transparent() {
        let embedded = PropertyStruct::new("Common")
            .with_property(Property::new("Srcs", Value::string_list(["a.c"])))
            .with_property(Property::new("Stl", "none"));
        let nested = PropertyStruct::new("Props")
            .with_property(Property::new("Name", "foo"))
            .with_embedded(embedded);
        let flat = PropertyStruct::new("Props")
            .with_property(Property::new("Name", "foo"))
            .with_property(Property::new("Srcs", Value::string_list(["a.c"])))
            .with_property(Property::new("Stl", "none"));
        assert_eq!(nested.extract(0).unwrap(), flat.extract(0).unwrap());
    }

    #[test]
    fn test_embedded_last_write_wins() {
        let s = PropertyStruct::new("Props")
            .with_property(Property::new("Stl", "libc++"))
            .with_embedded(PropertyStruct::new("Override").with_property(Property::new("Stl", "none")));
        assert_eq!(s.extract(0).unwrap()["stl"], r#""none""#);
    }

    #[test]
    fn test_duplicate_policy() {
        let bag = PropertyBag::new()
            .with_struct(PropertyStruct::new("A").with_property(Property::new("Foo", "x")))
            .with_struct(PropertyStruct::new("B").with_property(Property::new("Foo", "x")));

        let err = bag.extract(DuplicatePolicy::Error).unwrap_err();
        match err {
            Error::DuplicatePropertyName { name, existing } => {
                assert_eq!(name, "foo");
                assert_eq!(existing, r#""x""#);
            }
            other => panic!("unexpected error: {other}"),
        }

        let attrs = bag.extract(DuplicatePolicy::Overwrite).unwrap();
        assert_eq!(attrs.get("foo"), Some(r#""x""#));
    }

    #[test]
    fn test_field_order_does_not_affect_output() {
        let a = PropertyStruct::new("P")
            .with_property(Property::new("Zeta", 1i64))
            .with_property(Property::new("Alpha", "a"));
        let b = PropertyStruct::new("P")
            .with_property(Property::new("Alpha", "a"))
            .with_property(Property::new("Zeta", 1i64));
        let left = PropertyBag::new().with_struct(a).extract(DuplicatePolicy::Error).unwrap();
        let right = PropertyBag::new().with_struct(b).extract(DuplicatePolicy::Error).unwrap();
        assert_eq!(
            left.iter().collect::<Vec<_>>(),
            right.iter().collect::<Vec<_>>()
        );
        assert_eq!(left.iter().next().map(|(k, _)| k), Some("alpha"));
    }

    #[test]
    fn test_empty_product_variable_select_survives_extraction() {
        use crate::attribute::{ConfigurationAxis, StringListAttribute};

        let mut cflags = StringListAttribute::new(vec![]);
        cflags
            .set_select_value(
                ConfigurationAxis::product_variable("malloc_zero_contents"),
                "malloc_zero_contents",
                vec![],
            )
            .unwrap();
        let s = PropertyStruct::new("Props").with_property(Property::new(
            "Cflags",
            Value::Configurable(cflags.into()),
        ));

        let props = s.extract(0).unwrap();
        assert_eq!(
            props.get("cflags").map(String::as_str),
            Some(
                r#"select({
        "//build/bazel/product_config/config_settings:malloc_zero_contents": [],
        "//conditions:default": [],
    })"#
            )
        );
    }
}
