use serde::{Deserialize, Serialize};

use crate::attribute::PropertyBag;
use crate::convert::{TargetDescriptor, UnconvertedReason};
use crate::error::{Error, Result};
use crate::graph::{Bp2BuildModule, ModuleGraph};

/// A dependency edge, by module name and optionally by variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DepRef {
    Name(String),
    Variant { name: String, variant: String },
}

impl DepRef {
    pub fn name(&self) -> &str {
        match self {
            DepRef::Name(name) | DepRef::Variant { name, .. } => name,
        }
    }

    pub fn variant(&self) -> Option<&str> {
        match self {
            DepRef::Name(_) => None,
            DepRef::Variant { variant, .. } => Some(variant),
        }
    }
}

impl From<&str> for DepRef {
    fn from(name: &str) -> Self {
        DepRef::Name(name.to_string())
    }
}

impl From<String> for DepRef {
    fn from(name: String) -> Self {
        DepRef::Name(name)
    }
}

/// One module variant of an [`InMemoryGraph`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleNode {
    pub name: String,
    pub dir: String,
    pub variant: String,
    pub module_type: String,
    pub handcrafted: bool,
    pub convertible: bool,
    pub unconverted_reason: Option<UnconvertedReason>,
    pub deps: Vec<DepRef>,
    pub unconverted_deps: Vec<String>,
    pub missing_deps: Vec<String>,
    pub targets: Vec<TargetDescriptor>,
    pub properties: PropertyBag,
    resolved_deps: Vec<usize>,
}

impl ModuleNode {
    pub fn new(
        name: impl Into<String>,
        dir: impl Into<String>,
        module_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            module_type: module_type.into(),
            ..Default::default()
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }

    pub fn with_dep(mut self, dep: impl Into<DepRef>) -> Self {
        self.deps.push(dep.into());
        self
    }

    pub fn handcrafted(mut self) -> Self {
        self.handcrafted = true;
        self
    }

    pub fn convertible(mut self) -> Self {
        self.convertible = true;
        self
    }

    pub fn with_unconverted_reason(mut self, reason: UnconvertedReason) -> Self {
        self.unconverted_reason = Some(reason);
        self
    }

    pub fn with_target(mut self, target: TargetDescriptor) -> Self {
        self.targets.push(target);
        self
    }

    pub fn with_properties(mut self, properties: PropertyBag) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_unconverted_deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unconverted_deps.extend(deps.into_iter().map(Into::into));
        self
    }

    pub fn with_missing_deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_deps.extend(deps.into_iter().map(Into::into));
        self
    }
}

impl Bp2BuildModule for ModuleNode {
    fn is_handcrafted(&self) -> bool {
        self.handcrafted
    }

    fn is_convertible(&self) -> bool {
        self.convertible
    }

    fn unconverted_reason(&self) -> Option<UnconvertedReason> {
        self.unconverted_reason.clone()
    }

    fn bp2build_targets(&self) -> &[TargetDescriptor] {
        &self.targets
    }

    fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    fn unconverted_deps(&self) -> &[String] {
        &self.unconverted_deps
    }

    fn missing_deps(&self) -> &[String] {
        &self.missing_deps
    }
}

/// A module graph held entirely in memory, visited in insertion order
#[derive(Debug, Clone, Default)]
pub struct InMemoryGraph {
    modules: Vec<ModuleNode>,
}

impl InMemoryGraph {
    /// Builds the graph, resolving every dependency edge.
    ///
    /// A dependency without a variant resolves to the first module with that name.
    pub fn new(mut modules: Vec<ModuleNode>) -> Result<Self> {
        let mut resolved = Vec::with_capacity(modules.len());
        for module in &modules {
            let indices = module
                .deps
                .iter()
                .map(|dep| resolve(&modules, module, dep))
                .collect::<Result<Vec<_>>>()?;
            resolved.push(indices);
        }
        for (module, indices) in modules.iter_mut().zip(resolved) {
            module.resolved_deps = indices;
        }
        Ok(Self { modules })
    }

    /// Decodes a graph from its JSON description.
    pub fn from_json(json: &str) -> Result<Self> {
        super::json::decode_graph(json)
    }

    pub fn module(&self, index: usize) -> Option<&ModuleNode> {
        self.modules.get(index)
    }

    pub fn modules(&self) -> &[ModuleNode] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

fn resolve(modules: &[ModuleNode], from: &ModuleNode, dep: &DepRef) -> Result<usize> {
    modules
        .iter()
        .position(|m| {
            m.name == dep.name() && dep.variant().is_none_or(|variant| m.variant == variant)
        })
        .ok_or_else(|| {
            let wanted = match dep.variant() {
                Some(variant) => format!("{} ({})", dep.name(), variant),
                None => dep.name().to_string(),
            };
            Error::GraphDecode(format!(
                "module {} depends on unknown module {}",
                from.name, wanted
            ))
        })
}

impl ModuleGraph for InMemoryGraph {
    type Module = ModuleNode;

    fn module_name(&self, module: &ModuleNode) -> String {
        module.name.clone()
    }

    fn module_dir(&self, module: &ModuleNode) -> String {
        module.dir.clone()
    }

    fn module_sub_dir(&self, module: &ModuleNode) -> String {
        module.variant.clone()
    }

    fn module_type(&self, module: &ModuleNode) -> String {
        module.module_type.clone()
    }

    fn visit_all_modules(&self, visit: &mut dyn FnMut(&ModuleNode)) {
        for module in &self.modules {
            visit(module);
        }
    }

    fn visit_direct_deps(&self, module: &ModuleNode, visit: &mut dyn FnMut(&ModuleNode)) {
        for dep in module.resolved_deps.iter().filter_map(|&i| self.modules.get(i)) {
            visit(dep);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_variant_deps() {
        let graph = InMemoryGraph::new(vec![
            ModuleNode::new("app", "a", "cc_binary")
                .with_dep(DepRef::Variant {
                    name: "lib".into(),
                    variant: "host".into(),
                })
                .with_dep("lib"),
            ModuleNode::new("lib", "b", "cc_library").with_variant("android"),
            ModuleNode::new("lib", "b", "cc_library").with_variant("host"),
        ])
        .unwrap();

        let mut variants = Vec::new();
        let app = graph.module(0).unwrap();
        graph.visit_direct_deps(app, &mut |dep| variants.push(dep.variant.clone()));
        assert_eq!(variants, vec!["host", "android"]);
    }

    #[test]
    fn test_unknown_dep() {
        let err = InMemoryGraph::new(vec![
            ModuleNode::new("app", "a", "cc_binary").with_dep("nope"),
        ])
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Graph decode error: module app depends on unknown module nope"
        );
    }

    #[test]
    fn test_visit_order_is_insertion_order() {
        let graph = InMemoryGraph::new(vec![
            ModuleNode::new("z", ".", "t"),
            ModuleNode::new("a", ".", "t"),
        ])
        .unwrap();
        let mut names = Vec::new();
        graph.visit_all_modules(&mut |m| names.push(graph.module_name(m)));
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn test_dep_ref_deserializes_both_shapes() {
        let deps: Vec<DepRef> =
            serde_json::from_str(r#"["a", {"name": "b", "variant": "host"}]"#).unwrap();
        assert_eq!(deps[0], DepRef::from("a"));
        assert_eq!(deps[1].variant(), Some("host"));
    }
}
