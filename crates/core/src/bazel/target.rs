use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

/// Rule class of the per-directory `package()` declaration
pub const PACKAGE_RULE_CLASS: &str = "package";

/// Symbols a target needs loaded from a `.bzl` file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BazelLoad {
    pub file: String,
    pub symbols: Vec<String>,
}

impl BazelLoad {
    pub fn new(file: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            symbols: vec![symbol.into()],
        }
    }
}

/// A generated target declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BazelTarget {
    pub name: String,
    pub package_name: String,
    pub content: String,
    pub rule_class: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub loads: Vec<BazelLoad>,
}

impl BazelTarget {
    /// Fully qualified label of the target
    pub fn label(&self) -> String {
        match self.package_name() {
            "." => format!("//:{}", self.name),
            package => format!("//{}:{}", package, self.name),
        }
    }

    /// Package of the target, `.` for the root of the tree
    pub fn package_name(&self) -> &str {
        if self.package_name.is_empty() {
            "."
        } else {
            &self.package_name
        }
    }

    pub fn is_package_rule(&self) -> bool {
        self.rule_class == PACKAGE_RULE_CLASS
    }
}

/// The targets generated for one directory, in generation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BazelTargets(pub Vec<BazelTarget>);

impl BazelTargets {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, target: BazelTarget) {
        self.0.push(target);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BazelTarget> {
        self.0.iter()
    }

    /// Sorts targets by name.
    pub fn sort(&mut self) {
        self.0.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// The hand-written `package()` rule, if the directory declares one
    pub fn package_rule(&self) -> Option<&BazelTarget> {
        self.0.iter().find(|t| t.is_package_rule())
    }

    /// Returns one `load()` line per `.bzl` file, files and symbols sorted and deduplicated.
    pub fn load_statements(&self) -> String {
        let mut by_file: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for load in self.0.iter().flat_map(|t| &t.loads) {
            by_file
                .entry(load.file.as_str())
                .or_default()
                .extend(load.symbols.iter().map(String::as_str));
        }
        by_file
            .iter()
            .map(|(file, symbols)| {
                let symbols: Vec<String> = symbols.iter().map(|s| format!("\"{s}\"")).collect();
                format!("load(\"{}\", {})", file, symbols.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The target bodies separated by blank lines, without loads or the package rule
impl fmt::Display for BazelTargets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bodies: Vec<&str> = self
            .0
            .iter()
            .filter(|t| !t.is_package_rule())
            .map(|t| t.content.as_str())
            .collect();
        f.write_str(&bodies.join("\n\n"))
    }
}

impl FromIterator<BazelTarget> for BazelTargets {
    fn from_iter<T: IntoIterator<Item = BazelTarget>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for BazelTargets {
    type Item = BazelTarget;
    type IntoIter = std::vec::IntoIter<BazelTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
