use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A reference to a Bazel target, e.g. `//foo/bar:baz`
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Label {
    /// The printed label
    pub label: String,
    /// Name of the module the label was resolved from, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_module_name: Option<String>,
}

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            original_module_name: None,
        }
    }

    pub fn with_original_module_name(mut self, name: impl Into<String>) -> Self {
        self.original_module_name = Some(name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_empty()
    }
}

impl From<&str> for Label {
    fn from(label: &str) -> Self {
        Label::new(label)
    }
}

/// An ordered list of labels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelList(pub Vec<Label>);

impl LabelList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds a list of package-relative labels (`:name`) from target names.
    pub fn from_target_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            names
                .into_iter()
                .map(|name| Label::new(format!(":{}", name.as_ref())))
                .collect(),
        )
    }

    pub fn add(&mut self, label: Label) {
        self.0.push(label);
    }

    pub fn append(&mut self, other: &LabelList) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.0.iter()
    }

    /// Returns a copy with duplicate labels removed, sorted by label text.
    pub fn unique_sorted(&self) -> LabelList {
        let unique: BTreeSet<&Label> = self.0.iter().collect();
        Self(unique.into_iter().cloned().collect())
    }
}

impl<L: Into<Label>> FromIterator<L> for LabelList {
    fn from_iter<T: IntoIterator<Item = L>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_sorted() {
        let list: LabelList = ["//b:b", ":a", "//b:b", ":c"].into_iter().collect();
        let unique = list.unique_sorted();
        let labels: Vec<&str> = unique.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["//b:b", ":a", ":c"]);
    }

    #[test]
    fn test_from_target_names() {
        let list = LabelList::from_target_names(["foo", "bar"]);
        assert_eq!(list.0[0].label, ":foo");
        assert_eq!(list.len(), 2);
    }
}
