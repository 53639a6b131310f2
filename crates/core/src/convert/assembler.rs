use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attribute::{BazelAttributes, DuplicatePolicy, PropertyBag, PropertyStruct};
use crate::bazel::{BazelLoad, BazelTarget};
use crate::error::Result;
use crate::graph::{Bp2BuildModule, ModuleGraph};
use crate::starlark::quote;

/// Rule class of the introspection targets
pub const SOONG_MODULE_RULE_CLASS: &str = "soong_module";

/// Property names never emitted on introspection targets
pub const IGNORED_PROP_NAMES: &[&str] = &[
    // emitted explicitly for every target
    "name",
    // reserved keywords
    "from",
    "in",
    "for",
    // reserved for tests
    "size",
    // interface typed, not printable
    "arch",
    "multilib",
    "target",
    // native to Bazel
    "visibility",
    "features",
    "versions_with_info",
];

/// One declarative rule a module converts to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetDescriptor {
    pub rule_class: String,
    /// Empty for unnamed rules such as `package()`
    pub target_name: String,
    pub target_package: String,
    /// `.bzl` file defining the rule class, empty for native rules
    pub bzl_load_location: String,
    pub attributes: PropertyBag,
}

impl TargetDescriptor {
    pub fn new(rule_class: impl Into<String>, target_name: impl Into<String>) -> Self {
        Self {
            rule_class: rule_class.into(),
            target_name: target_name.into(),
            ..Default::default()
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.target_package = package.into();
        self
    }

    pub fn with_load_location(mut self, location: impl Into<String>) -> Self {
        self.bzl_load_location = location.into();
        self
    }

    pub fn with_attributes(mut self, attributes: PropertyBag) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_struct(mut self, s: PropertyStruct) -> Self {
        self.attributes.push(s);
        self
    }

    /// Label of the target this descriptor produces
    pub fn label(&self) -> String {
        match self.target_package.as_str() {
            "" | "." => format!("//:{}", self.target_name),
            package => format!("//{}:{}", package, self.target_name),
        }
    }
}

/// How attributes are laid out inside a rule call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeLayout {
    /// One attribute per line
    #[default]
    Multiline,
    /// Every attribute on the rule's line
    Inline,
}

fn props_to_attributes(attrs: &BazelAttributes) -> String {
    attrs
        .iter()
        .map(|(name, value)| format!("    {name} = {value},\n"))
        .collect()
}

fn props_to_inline_attributes(attrs: &BazelAttributes) -> Vec<String> {
    attrs
        .iter()
        .map(|(name, value)| format!("{name} = {value}"))
        .collect()
}

/// Generates the target declared by `descriptor`.
///
/// Two property structs defining the same attribute are rejected.
pub fn generate_bazel_target(
    descriptor: &TargetDescriptor,
    layout: AttributeLayout,
) -> Result<BazelTarget> {
    let rule_class = &descriptor.rule_class;
    let target_name = &descriptor.target_name;

    let mut attrs = descriptor.attributes.extract(DuplicatePolicy::Error)?;
    // name is positional, never a generic attribute
    attrs.remove("name");

    let content = match layout {
        AttributeLayout::Multiline => {
            let attributes = props_to_attributes(&attrs);
            if target_name.is_empty() {
                format!("{rule_class}(\n{attributes})")
            } else {
                format!("{rule_class}(\n    name = \"{target_name}\",\n{attributes})")
            }
        }
        AttributeLayout::Inline => {
            let mut parts = Vec::with_capacity(attrs.len() + 1);
            if !target_name.is_empty() {
                parts.push(format!("name = \"{target_name}\""));
            }
            parts.extend(props_to_inline_attributes(&attrs));
            format!("{rule_class}({})", parts.join(", "))
        }
    };

    let loads = if descriptor.bzl_load_location.is_empty() {
        Vec::new()
    } else {
        vec![BazelLoad::new(&descriptor.bzl_load_location, rule_class)]
    };

    debug!(
        "Generated {} target {} with {} attributes",
        rule_class,
        descriptor.label(),
        attrs.len()
    );

    Ok(BazelTarget {
        name: target_name.clone(),
        package_name: descriptor.target_package.clone(),
        content,
        rule_class: rule_class.clone(),
        loads,
    })
}

/// Generates the introspection target for a module variant.
///
/// Duplicate properties overwrite each other; every direct dependency is
/// listed by its fully qualified label.
pub fn generate_soong_module_target<G: ModuleGraph>(
    graph: &G,
    module: &G::Module,
) -> Result<BazelTarget> {
    let mut attrs = module.properties().extract(DuplicatePolicy::Overwrite)?;
    for name in IGNORED_PROP_NAMES {
        attrs.remove(name);
    }

    let mut dep_labels = BTreeSet::new();
    graph.visit_direct_deps(module, &mut |dep| {
        dep_labels.insert(qualified_target_label(graph, dep));
    });
    let mut deps = String::from("[\n");
    for label in &dep_labels {
        deps.push_str(&format!("        {},\n", quote(label)));
    }
    deps.push_str("    ]");

    let name = target_name_with_variant(graph, module);
    let content = format!(
        "soong_module(\n    name = \"{}\",\n    soong_module_name = \"{}\",\n    soong_module_type = \"{}\",\n    soong_module_variant = \"{}\",\n    soong_module_deps = {},\n{})",
        name,
        graph.module_name(module),
        canonicalize_module_type(&graph.module_type(module)),
        graph.module_sub_dir(module),
        deps,
        props_to_attributes(&attrs),
    );

    Ok(BazelTarget {
        name,
        package_name: graph.module_dir(module),
        content,
        rule_class: SOONG_MODULE_RULE_CLASS.to_string(),
        loads: Vec::new(),
    })
}

/// The module name, suffixed with `--<variant>` for variant modules.
pub fn target_name_with_variant<G: ModuleGraph>(graph: &G, module: &G::Module) -> String {
    let name = graph.module_name(module);
    let sub_dir = graph.module_sub_dir(module);
    let name = if sub_dir.is_empty() {
        name
    } else {
        format!("{name}--{sub_dir}")
    };
    match name.strip_prefix("//") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

/// `//<dir>:<name>`, or `//:<name>` for the root directory.
pub fn qualified_target_label<G: ModuleGraph>(graph: &G, module: &G::Module) -> String {
    let dir = graph.module_dir(module);
    let name = target_name_with_variant(graph, module);
    match dir.as_str() {
        "" | "." => format!("//:{name}"),
        dir => format!("//{dir}:{name}"),
    }
}

/// Module types ending in `_test` are suffixed with `_` so they do not clash
/// with Bazel's test rule naming.
pub fn canonicalize_module_type(module_type: &str) -> String {
    if module_type.ends_with("_test") {
        format!("{module_type}_")
    } else {
        module_type.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{Property, Value};
    use crate::error::Error;
    use crate::graph::{InMemoryGraph, ModuleNode};

    #[test]
    fn test_named_target() {
        let descriptor = TargetDescriptor::new("custom", "foo").with_struct(
            PropertyStruct::new("Attrs")
                .with_property(Property::new("Ramdisk", true))
                .with_property(Property::new("Required", Value::string_list(["bar"]))),
        );
        let target = generate_bazel_target(&descriptor, AttributeLayout::Multiline).unwrap();
        assert_eq!(
            target.content,
            r#"custom(
    name = "foo",
    ramdisk = True,
    required = [
        "bar",
    ],
)"#
        );
        assert!(target.loads.is_empty());
    }

    #[test]
    fn test_unnamed_target_with_load() {
        let descriptor = TargetDescriptor::new("package", "")
            .with_load_location("//build/bazel/rules:package.bzl")
            .with_struct(PropertyStruct::new("Attrs").with_property(Property::new(
                "Default_visibility",
                Value::string_list(["//visibility:public"]),
            )));
        let target = generate_bazel_target(&descriptor, AttributeLayout::Multiline).unwrap();
        assert_eq!(
            target.content,
            "package(\n    default_visibility = [\n        \"//visibility:public\",\n    ],\n)"
        );
        assert_eq!(
            target.loads,
            vec![BazelLoad::new("//build/bazel/rules:package.bzl", "package")]
        );
    }

    #[test]
    fn test_name_attribute_is_positional() {
        let descriptor = TargetDescriptor::new("genrule", "gen").with_struct(
            PropertyStruct::new("Attrs")
                .with_property(Property::new("Name", "ignored"))
                .with_property(Property::new("Cmd", "touch $@")),
        );
        let target = generate_bazel_target(&descriptor, AttributeLayout::Multiline).unwrap();
        assert!(!target.content.contains("ignored"));
    }

    #[test]
    fn test_inline_layout_sorts_like_multiline() {
        let descriptor = TargetDescriptor::new("filegroup", "fg").with_struct(
            PropertyStruct::new("Attrs")
                .with_property(Property::new("Srcs", Value::string_list(["a"])))
                .with_property(Property::new("Path", "p")),
        );
        let target = generate_bazel_target(&descriptor, AttributeLayout::Inline).unwrap();
        assert_eq!(
            target.content,
            "filegroup(name = \"fg\", path = \"p\", srcs = [\n        \"a\",\n    ])"
        );
    }

    #[test]
    fn test_duplicate_attributes_across_structs() {
        let descriptor = TargetDescriptor::new("custom", "foo")
            .with_struct(PropertyStruct::new("A").with_property(Property::new("Foo", "x")))
            .with_struct(PropertyStruct::new("B").with_property(Property::new("Foo", "x")));
        let err = generate_bazel_target(&descriptor, AttributeLayout::Multiline).unwrap_err();
        assert!(matches!(err, Error::DuplicatePropertyName { ref name, .. } if name == "foo"));
    }

    #[test]
    fn test_soong_module_target() {
        let graph = InMemoryGraph::new(vec![
            ModuleNode::new("foo", "pkg", "cc_test")
                .with_variant("android_arm64")
                .with_dep("libbar")
                .with_dep("//libbaz")
                .with_properties(PropertyBag::new().with_struct(
                    PropertyStruct::new("Props")
                        .with_property(Property::new("Name", "foo"))
                        .with_property(Property::new("Visibility", Value::string_list(["//x"])))
                        .with_property(Property::new("Srcs", Value::string_list(["a.cc"]))),
                )),
            ModuleNode::new("libbar", ".", "cc_library"),
            ModuleNode::new("//libbaz", "other", "cc_library").with_variant("host"),
        ])
        .unwrap();
        let module = graph.module(0).unwrap();

        let target = generate_soong_module_target(&graph, module).unwrap();
        assert_eq!(target.name, "foo--android_arm64");
        assert_eq!(target.package_name, "pkg");
        assert_eq!(
            target.content,
            r#"soong_module(
    name = "foo--android_arm64",
    soong_module_name = "foo",
    soong_module_type = "cc_test_",
    soong_module_variant = "android_arm64",
    soong_module_deps = [
        "//:libbar",
        "//other:libbaz--host",
    ],
    srcs = [
        "a.cc",
    ],
)"#
        );
    }

    #[test]
    fn test_canonicalize_module_type() {
        assert_eq!(canonicalize_module_type("cc_test"), "cc_test_");
        assert_eq!(canonicalize_module_type("cc_library"), "cc_library");
    }
}
