use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Why a module was not converted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnconvertedReasonType {
    /// No conversion exists for this module
    #[default]
    Unsupported,
    /// No conversion exists for this module type
    TypeUnsupported,
    /// A property of the module has no conversion
    PropertyUnsupported,
    /// The module depends on a module that is not converted
    UnconvertedDep,
    /// Explicitly excluded from conversion
    Denylisted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnconvertedReason {
    pub reason_type: UnconvertedReasonType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
}

impl UnconvertedReason {
    pub fn new(reason_type: UnconvertedReasonType, detail: impl Into<String>) -> Self {
        Self {
            reason_type,
            detail: detail.into(),
        }
    }
}

/// Counters collected over one conversion run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CodegenMetrics {
    /// Generated targets per rule class
    rule_class_count: BTreeMap<String, u64>,
    converted_modules: Vec<String>,
    converted_module_type_count: BTreeMap<String, u64>,
    /// Converted module name to its directory
    converted_module_path_map: BTreeMap<String, String>,
    unconverted_modules: BTreeMap<String, UnconvertedReason>,
    unconverted_module_type_count: BTreeMap<String, u64>,
    handcrafted_modules: Vec<String>,
    handcrafted_module_type_count: BTreeMap<String, u64>,
    module_with_unconverted_deps_msgs: Vec<String>,
    module_with_missing_deps_msgs: Vec<String>,
}

impl CodegenMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_rule_class_count(&mut self, rule_class: &str) {
        *self
            .rule_class_count
            .entry(rule_class.to_string())
            .or_default() += 1;
    }

    pub fn add_converted_module(&mut self, name: &str, module_type: &str, dir: &str) {
        self.converted_modules.push(name.to_string());
        *self
            .converted_module_type_count
            .entry(module_type.to_string())
            .or_default() += 1;
        self.converted_module_path_map
            .insert(name.to_string(), dir.to_string());
    }

    pub fn add_unconverted_module(
        &mut self,
        name: &str,
        module_type: &str,
        reason: UnconvertedReason,
    ) {
        self.unconverted_modules.insert(name.to_string(), reason);
        *self
            .unconverted_module_type_count
            .entry(module_type.to_string())
            .or_default() += 1;
    }

    pub fn add_handcrafted_module(&mut self, name: &str, module_type: &str) {
        self.handcrafted_modules.push(name.to_string());
        *self
            .handcrafted_module_type_count
            .entry(module_type.to_string())
            .or_default() += 1;
    }

    pub fn add_unconverted_deps_msg(&mut self, msg: String) {
        self.module_with_unconverted_deps_msgs.push(msg);
    }

    pub fn add_missing_deps_msg(&mut self, msg: String) {
        self.module_with_missing_deps_msgs.push(msg);
    }

    pub fn rule_class_count(&self, rule_class: &str) -> u64 {
        self.rule_class_count.get(rule_class).copied().unwrap_or(0)
    }

    pub fn generated_target_count(&self) -> u64 {
        self.rule_class_count.values().sum()
    }

    pub fn converted_modules(&self) -> &[String] {
        &self.converted_modules
    }

    pub fn converted_module_path_map(&self) -> &BTreeMap<String, String> {
        &self.converted_module_path_map
    }

    pub fn unconverted_modules(&self) -> &BTreeMap<String, UnconvertedReason> {
        &self.unconverted_modules
    }

    pub fn unconverted_module_type_count(&self, module_type: &str) -> u64 {
        self.unconverted_module_type_count
            .get(module_type)
            .copied()
            .unwrap_or(0)
    }

    pub fn handcrafted_modules(&self) -> &[String] {
        &self.handcrafted_modules
    }

    pub fn module_with_unconverted_deps_msgs(&self) -> &[String] {
        &self.module_with_unconverted_deps_msgs
    }

    pub fn module_with_missing_deps_msgs(&self) -> &[String] {
        &self.module_with_missing_deps_msgs
    }

    /// Total modules seen in the direct conversion mode
    pub fn total_module_count(&self) -> usize {
        self.converted_modules.len() + self.unconverted_modules.len() + self.handcrafted_modules.len()
    }

    /// Human readable report, one line per rule class followed by totals
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (rule_class, count) in &self.rule_class_count {
            out.push_str(&format!("[bp2build] {rule_class}: {count} targets\n"));
        }
        out.push_str(&format!(
            "[bp2build] Converted {} modules to {} total generated BUILD targets. Included {} handcrafted BUILD targets. There are {} total modules.\n",
            self.converted_modules.len(),
            self.generated_target_count(),
            self.handcrafted_modules.len(),
            self.total_module_count(),
        ));
        out.push_str(&format!(
            "{} converted modules have unconverted deps:\n\t{}\n",
            self.module_with_unconverted_deps_msgs.len(),
            self.module_with_unconverted_deps_msgs.join("\n\t"),
        ));
        out.push_str(&format!(
            "{} converted modules have missing deps:\n\t{}\n",
            self.module_with_missing_deps_msgs.len(),
            self.module_with_missing_deps_msgs.join("\n\t"),
        ));
        out
    }
}
