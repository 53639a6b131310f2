use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::bazel::{BazelTarget, BazelTargets};
use crate::convert::assembler::{
    AttributeLayout, canonicalize_module_type, generate_bazel_target,
    generate_soong_module_target, qualified_target_label,
};
use crate::convert::metrics::CodegenMetrics;
use crate::convert::mode::{CodegenContext, CodegenMode, UnconvertedDepsMode};
use crate::error::Error;
use crate::graph::{Bp2BuildModule, ModuleGraph};

/// Name of the catch-all filegroup appended to every directory
pub const ALL_SRCS_FILEGROUP: &str = "bp2build_all_srcs";

/// Module types skipped by the introspection view
const QUERYVIEW_BLOCKLIST: &[&str] = &["package"];

/// Targets grouped by directory, plus the counters of the run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionResults {
    pub build_dir_to_targets: BTreeMap<String, BazelTargets>,
    pub metrics: CodegenMetrics,
}

impl ConversionResults {
    pub fn target_count(&self) -> usize {
        self.build_dir_to_targets.values().map(BazelTargets::len).sum()
    }
}

/// Every error collected during a run, with the targets of the modules that succeeded
#[derive(Debug, thiserror::Error)]
#[error("conversion failed with {} error(s)", .errors.len())]
pub struct ConversionErrors {
    pub errors: Vec<Error>,
    pub partial: ConversionResults,
}

/// Converts every module of `graph` in a single traversal.
///
/// Per-module failures do not stop the traversal; they are collected and
/// returned together once every module has been visited.
pub fn generate_bazel_targets<G: ModuleGraph>(
    graph: &G,
    ctx: &CodegenContext,
) -> Result<ConversionResults, ConversionErrors> {
    let mut results = ConversionResults::default();
    let mut errors = Vec::new();

    graph.visit_all_modules(&mut |module| {
        let targets = match ctx.mode {
            CodegenMode::Bp2Build { unconverted_deps } => bp2build_targets(
                graph,
                module,
                ctx.layout,
                unconverted_deps,
                &mut results.metrics,
                &mut errors,
            ),
            CodegenMode::QueryView => queryview_targets(graph, module, &mut errors),
            CodegenMode::ApiBp2Build => {
                api_targets(graph, module, ctx.layout, &mut results.metrics, &mut errors)
            }
        };
        for target in targets {
            results
                .build_dir_to_targets
                .entry(target.package_name().to_string())
                .or_default()
                .push(target);
        }
    });

    if !errors.is_empty() {
        warn!("Conversion finished with {} errors", errors.len());
        return Err(ConversionErrors {
            errors,
            partial: results,
        });
    }

    if ctx.generate_filegroups {
        for (dir, targets) in results.build_dir_to_targets.iter_mut() {
            targets.push(all_srcs_filegroup(dir));
        }
    }

    info!(
        "Generated {} targets in {} directories ({} mode)",
        results.target_count(),
        results.build_dir_to_targets.len(),
        ctx.mode
    );
    Ok(results)
}

fn bp2build_targets<G: ModuleGraph>(
    graph: &G,
    module: &G::Module,
    layout: AttributeLayout,
    deps_mode: UnconvertedDepsMode,
    metrics: &mut CodegenMetrics,
    errors: &mut Vec<Error>,
) -> Vec<BazelTarget> {
    let name = graph.module_name(module);
    let dir = graph.module_dir(module);
    let module_type = graph.module_type(module);
    debug!("Visiting {} module {}:{}", module_type, dir, name);

    if module.is_handcrafted() {
        debug!("Skipping hand-crafted module {}:{}", dir, name);
        metrics.add_handcrafted_module(&name, &module_type);
        return Vec::new();
    }

    if !module.is_convertible() {
        let reason = module.unconverted_reason().unwrap_or_default();
        metrics.add_unconverted_module(&name, &module_type, reason);
        return Vec::new();
    }

    let targets = match assemble_targets(module, layout) {
        Ok(targets) => targets,
        Err(e) => {
            errors.push(e);
            return Vec::new();
        }
    };
    if targets.is_empty() {
        warn!("Convertible module {}:{} declared no targets", dir, name);
    }
    for target in &targets {
        metrics.increment_rule_class_count(&target.rule_class);
    }
    metrics.add_converted_module(&name, &module_type, &dir);

    let unconverted = module.unconverted_deps();
    if !unconverted.is_empty() {
        let msg = format!(
            "{} {}:{} depends on unconverted modules: {}",
            module_type,
            dir,
            name,
            unconverted.join(", ")
        );
        match deps_mode {
            UnconvertedDepsMode::Warn => {
                warn!("{}", msg);
                metrics.add_unconverted_deps_msg(msg);
            }
            UnconvertedDepsMode::Error => {
                errors.push(Error::UnconvertedDeps(msg));
                return Vec::new();
            }
        }
    }

    let missing = module.missing_deps();
    if !missing.is_empty() {
        let msg = format!(
            "{} {}:{} depends on missing modules: {}",
            module_type,
            dir,
            name,
            missing.join(", ")
        );
        match deps_mode {
            UnconvertedDepsMode::Warn => {
                warn!("{}", msg);
                metrics.add_missing_deps_msg(msg);
            }
            UnconvertedDepsMode::Error => {
                errors.push(Error::MissingDeps(msg));
                return Vec::new();
            }
        }
    }

    targets
}

fn queryview_targets<G: ModuleGraph>(
    graph: &G,
    module: &G::Module,
    errors: &mut Vec<Error>,
) -> Vec<BazelTarget> {
    let module_type = canonicalize_module_type(&graph.module_type(module));
    // names of these modules contain slashes and cannot map to a label
    if QUERYVIEW_BLOCKLIST.contains(&module_type.as_str()) {
        return Vec::new();
    }
    match generate_soong_module_target(graph, module) {
        Ok(target) => vec![target],
        Err(e) => {
            errors.push(e.in_target(qualified_target_label(graph, module)));
            Vec::new()
        }
    }
}

fn api_targets<G: ModuleGraph>(
    graph: &G,
    module: &G::Module,
    layout: AttributeLayout,
    metrics: &mut CodegenMetrics,
    errors: &mut Vec<Error>,
) -> Vec<BazelTarget> {
    if !module.is_convertible() {
        return Vec::new();
    }
    match assemble_targets(module, layout) {
        Ok(targets) => {
            for target in &targets {
                metrics.increment_rule_class_count(&target.rule_class);
            }
            metrics.add_converted_module(
                &graph.module_name(module),
                &graph.module_type(module),
                &graph.module_dir(module),
            );
            targets
        }
        Err(e) => {
            errors.push(e);
            Vec::new()
        }
    }
}

/// Assembles every declared target; the first failure aborts the module.
fn assemble_targets<M: Bp2BuildModule>(
    module: &M,
    layout: AttributeLayout,
) -> crate::error::Result<Vec<BazelTarget>> {
    module
        .bp2build_targets()
        .iter()
        .map(|descriptor| {
            generate_bazel_target(descriptor, layout).map_err(|e| e.in_target(descriptor.label()))
        })
        .collect()
}

fn all_srcs_filegroup(dir: &str) -> BazelTarget {
    BazelTarget {
        name: ALL_SRCS_FILEGROUP.to_string(),
        package_name: dir.to_string(),
        content: format!(
            "filegroup(name = \"{ALL_SRCS_FILEGROUP}\", srcs = glob([\"**/*\"]), tags = [\"manual\"])"
        ),
        rule_class: "filegroup".to_string(),
        loads: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{Property, PropertyBag, PropertyStruct};
    use crate::convert::assembler::TargetDescriptor;
    use crate::convert::metrics::{UnconvertedReason, UnconvertedReasonType};
    use crate::graph::{InMemoryGraph, ModuleNode};

    fn descriptor(name: &str) -> TargetDescriptor {
        TargetDescriptor::new("custom", name)
            .with_load_location("//build/bazel/rules:custom.bzl")
            .with_struct(PropertyStruct::new("Attrs").with_property(Property::new("Ramdisk", true)))
    }

    fn bp2build(mode: UnconvertedDepsMode) -> CodegenContext {
        CodegenContext::new(CodegenMode::Bp2Build {
            unconverted_deps: mode,
        })
    }

    #[test]
    fn test_handcrafted_module_is_skipped() {
        let graph = InMemoryGraph::new(vec![
            ModuleNode::new("foo", "a", "custom")
                .handcrafted()
                .with_target(descriptor("foo").with_package("a")),
        ])
        .unwrap();

        let results = generate_bazel_targets(&graph, &bp2build(UnconvertedDepsMode::Warn)).unwrap();
        assert_eq!(results.target_count(), 0);
        assert_eq!(results.metrics.handcrafted_modules(), ["foo".to_string()]);
        assert!(results.metrics.unconverted_modules().is_empty());
    }

    #[test]
    fn test_unconvertible_module_is_recorded() {
        let graph = InMemoryGraph::new(vec![
            ModuleNode::new("bar", "b", "java_import").with_unconverted_reason(
                UnconvertedReason::new(UnconvertedReasonType::TypeUnsupported, ""),
            ),
        ])
        .unwrap();

        let results = generate_bazel_targets(&graph, &bp2build(UnconvertedDepsMode::Warn)).unwrap();
        assert_eq!(results.target_count(), 0);
        assert_eq!(
            results.metrics.unconverted_modules()["bar"].reason_type,
            UnconvertedReasonType::TypeUnsupported
        );
        assert_eq!(results.metrics.unconverted_module_type_count("java_import"), 1);
    }

    #[test]
    fn test_targets_grouped_by_package() {
        let graph = InMemoryGraph::new(vec![
            ModuleNode::new("foo", "a", "custom")
                .convertible()
                .with_target(descriptor("foo").with_package("a"))
                .with_target(descriptor("foo_gen").with_package("a/gen")),
            ModuleNode::new("root", ".", "custom")
                .convertible()
                .with_target(descriptor("root")),
        ])
        .unwrap();

        let results = generate_bazel_targets(&graph, &bp2build(UnconvertedDepsMode::Warn)).unwrap();
        let dirs: Vec<&str> = results
            .build_dir_to_targets
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(dirs, vec![".", "a", "a/gen"]);
        assert_eq!(results.metrics.rule_class_count("custom"), 3);
        assert_eq!(results.metrics.converted_modules().len(), 2);
    }

    #[test]
    fn test_unconverted_deps_warn() {
        let graph = InMemoryGraph::new(vec![
            ModuleNode::new("foo", "a", "custom")
                .convertible()
                .with_target(descriptor("foo").with_package("a"))
                .with_unconverted_deps(["bar", "baz"])
                .with_missing_deps(["qux"]),
        ])
        .unwrap();

        let results = generate_bazel_targets(&graph, &bp2build(UnconvertedDepsMode::Warn)).unwrap();
        assert_eq!(results.target_count(), 1);
        assert_eq!(
            results.metrics.module_with_unconverted_deps_msgs(),
            ["custom a:foo depends on unconverted modules: bar, baz".to_string()]
        );
        assert_eq!(
            results.metrics.module_with_missing_deps_msgs(),
            ["custom a:foo depends on missing modules: qux".to_string()]
        );
    }

    #[test]
    fn test_unconverted_deps_error_keeps_other_modules() {
        let graph = InMemoryGraph::new(vec![
            ModuleNode::new("foo", "a", "custom")
                .convertible()
                .with_target(descriptor("foo").with_package("a"))
                .with_unconverted_deps(["bar"]),
            ModuleNode::new("ok", "b", "custom")
                .convertible()
                .with_target(descriptor("ok").with_package("b")),
        ])
        .unwrap();

        let err = generate_bazel_targets(&graph, &bp2build(UnconvertedDepsMode::Error)).unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(
            err.errors[0].to_string(),
            "custom a:foo depends on unconverted modules: bar"
        );
        assert!(err.partial.build_dir_to_targets.contains_key("b"));
        assert!(!err.partial.build_dir_to_targets.contains_key("a"));
    }

    #[test]
    fn test_errors_are_aggregated() {
        let duplicate = TargetDescriptor::new("custom", "dup")
            .with_struct(PropertyStruct::new("A").with_property(Property::new("Foo", "x")))
            .with_struct(PropertyStruct::new("B").with_property(Property::new("Foo", "y")));
        let graph = InMemoryGraph::new(vec![
            ModuleNode::new("dup1", "a", "custom")
                .convertible()
                .with_target(duplicate.clone().with_package("a")),
            ModuleNode::new("dup2", "b", "custom")
                .convertible()
                .with_target(duplicate.with_package("b")),
        ])
        .unwrap();

        let err = generate_bazel_targets(&graph, &bp2build(UnconvertedDepsMode::Warn)).unwrap_err();
        assert_eq!(err.errors.len(), 2);
        assert!(matches!(
            err.errors[0].root_cause(),
            Error::DuplicatePropertyName { name, .. } if name == "foo"
        ));
        assert!(err.errors[1].to_string().starts_with("Error generating target //b:dup"));
    }

    #[test]
    fn test_queryview_skips_package_modules() {
        let graph = InMemoryGraph::new(vec![
            ModuleNode::new("a/b", "a/b", "package"),
            ModuleNode::new("foo", "a/b", "genrule").with_properties(
                PropertyBag::new()
                    .with_struct(PropertyStruct::new("P").with_property(Property::new("Cmd", "x"))),
            ),
        ])
        .unwrap();

        let results = generate_bazel_targets(&graph, &CodegenContext::new(CodegenMode::QueryView))
            .unwrap();
        let targets = &results.build_dir_to_targets["a/b"];
        assert_eq!(targets.len(), 1);
        assert_eq!(targets.0[0].name, "foo");
    }

    #[test]
    fn test_api_mode_ignores_dependency_bookkeeping() {
        let graph = InMemoryGraph::new(vec![
            ModuleNode::new("api", "a", "custom")
                .convertible()
                .with_target(descriptor("api").with_package("a"))
                .with_unconverted_deps(["x"]),
            ModuleNode::new("skip", "a", "custom").handcrafted(),
        ])
        .unwrap();

        let results =
            generate_bazel_targets(&graph, &CodegenContext::new(CodegenMode::ApiBp2Build)).unwrap();
        assert_eq!(results.target_count(), 1);
        assert!(results.metrics.module_with_unconverted_deps_msgs().is_empty());
        assert!(results.metrics.handcrafted_modules().is_empty());
    }

    #[test]
    fn test_filegroups_appended_per_directory() {
        let graph = InMemoryGraph::new(vec![
            ModuleNode::new("foo", "a", "custom")
                .convertible()
                .with_target(descriptor("foo").with_package("a")),
            ModuleNode::new("bar", "b", "java_import"),
        ])
        .unwrap();

        let ctx = bp2build(UnconvertedDepsMode::Warn).with_filegroups(true);
        let results = generate_bazel_targets(&graph, &ctx).unwrap();
        assert_eq!(results.build_dir_to_targets.len(), 1);
        let targets = &results.build_dir_to_targets["a"];
        assert_eq!(targets.len(), 2);
        assert_eq!(
            targets.0[1].content,
            r#"filegroup(name = "bp2build_all_srcs", srcs = glob(["**/*"]), tags = ["manual"])"#
        );
    }
}
