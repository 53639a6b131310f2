//! Shared fixtures for the end-to-end conversion tests

use std::collections::BTreeMap;

use bp2bazel_core::{
    CodegenContext, CodegenMode, ConversionErrors, InMemoryGraph, Property, PropertyStruct,
    Result, TargetDescriptor, UnconvertedDepsMode, create_build_files, generate_bazel_targets,
};

/// A small zlib package: a two-target library, a hand-crafted dependency,
/// an unconvertible binary and the package module itself.
pub const ZLIB_GRAPH: &str = include_str!("../testdata/zlib_graph.json");

pub fn zlib_graph() -> Result<InMemoryGraph> {
    InMemoryGraph::from_json(ZLIB_GRAPH)
}

/// Builds a graph from a JSON array of module entries.
pub fn graph_from_modules(modules: serde_json::Value) -> Result<InMemoryGraph> {
    let document = serde_json::json!({ "modules": modules });
    InMemoryGraph::from_json(&document.to_string())
}

pub fn bp2build_context(strict: bool) -> CodegenContext {
    let unconverted_deps = if strict {
        UnconvertedDepsMode::Error
    } else {
        UnconvertedDepsMode::Warn
    };
    CodegenContext::new(CodegenMode::Bp2Build { unconverted_deps })
}

/// One property struct named `Attrs` holding `properties`.
pub fn attrs(properties: impl IntoIterator<Item = Property>) -> PropertyStruct {
    properties
        .into_iter()
        .fold(PropertyStruct::new("Attrs"), PropertyStruct::with_property)
}

/// A descriptor for a rule loaded from `//build/bazel/rules:<rule_class>.bzl`.
pub fn starlark_rule(rule_class: &str, name: &str, package: &str) -> TargetDescriptor {
    TargetDescriptor::new(rule_class, name)
        .with_package(package)
        .with_load_location(format!("//build/bazel/rules:{rule_class}.bzl"))
}

/// Runs a conversion and renders its BUILD files, keyed by path.
pub fn build_files(
    graph: &InMemoryGraph,
    ctx: &CodegenContext,
) -> std::result::Result<BTreeMap<String, String>, ConversionErrors> {
    let results = generate_bazel_targets(graph, ctx)?;
    Ok(create_build_files(&results.build_dir_to_targets, ctx.mode)
        .into_iter()
        .map(|file| (file.path(), file.contents))
        .collect())
}
