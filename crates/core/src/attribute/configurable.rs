use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

use crate::attribute::axis::{ConfigurationAxis, OS_TO_ARCH};
use crate::attribute::label::{Label, LabelList};
use crate::attribute::select;
use crate::error::{Error, Result};
use crate::starlark::{print_bool, print_compact_list, quote};

/// A value that can appear on either side of a select branch
pub trait SelectValue: Clone + Default + PartialEq + Debug {
    /// Literal used for the default branch when no explicit default exists
    const NEUTRAL: &'static str;

    /// Kind name used in error messages
    const KIND: &'static str;

    /// Whether arch-variant product variables may be collapsed together with the arch axis
    const COLLAPSES_ARCH_VARIANTS: bool = false;

    fn is_zero(&self) -> bool;

    fn render(&self, indent: usize) -> String;
}

/// List values support concatenation across attributes
pub trait ListValue: SelectValue {
    fn extend_from(&mut self, other: &Self);
}

impl SelectValue for LabelList {
    const NEUTRAL: &'static str = "[]";
    const KIND: &'static str = "label list";

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn render(&self, indent: usize) -> String {
        let items: Vec<String> = self.iter().map(|l| quote(&l.label)).collect();
        print_compact_list(&items, indent)
    }
}

impl ListValue for LabelList {
    fn extend_from(&mut self, other: &Self) {
        self.append(other);
    }
}

impl SelectValue for Vec<String> {
    const NEUTRAL: &'static str = "[]";
    const KIND: &'static str = "string list";

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn render(&self, indent: usize) -> String {
        let items: Vec<String> = self.iter().map(|s| quote(s)).collect();
        print_compact_list(&items, indent)
    }
}

impl ListValue for Vec<String> {
    fn extend_from(&mut self, other: &Self) {
        self.extend(other.iter().cloned());
    }
}

impl SelectValue for Option<Label> {
    const NEUTRAL: &'static str = "None";
    const KIND: &'static str = "label";
    const COLLAPSES_ARCH_VARIANTS: bool = true;

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn render(&self, _indent: usize) -> String {
        match self {
            Some(label) => quote(&label.label),
            None => Self::NEUTRAL.to_string(),
        }
    }
}

impl SelectValue for Option<String> {
    const NEUTRAL: &'static str = "None";
    const KIND: &'static str = "string";

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn render(&self, _indent: usize) -> String {
        match self {
            Some(s) => quote(s),
            None => Self::NEUTRAL.to_string(),
        }
    }
}

impl SelectValue for Option<bool> {
    const NEUTRAL: &'static str = "None";
    const KIND: &'static str = "boolean";

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn render(&self, _indent: usize) -> String {
        match self {
            Some(b) => print_bool(*b).to_string(),
            None => Self::NEUTRAL.to_string(),
        }
    }
}

/// A base value plus per-axis overrides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigurableAttribute<T> {
    /// The unconfigured value
    pub value: T,
    /// Overrides keyed by axis, then by config name
    pub configurable_values: BTreeMap<ConfigurationAxis, BTreeMap<String, T>>,
    /// Render the selects before the base value
    pub prepend: bool,
    /// Keep select branches whose value is empty
    pub emit_empty_list: bool,
    /// Print `[]` rather than omitting the attribute when it ends up empty
    pub force_specify_empty_list: bool,
}

pub type LabelListAttribute = ConfigurableAttribute<LabelList>;
pub type StringListAttribute = ConfigurableAttribute<Vec<String>>;
pub type LabelAttribute = ConfigurableAttribute<Option<Label>>;
pub type StringAttribute = ConfigurableAttribute<Option<String>>;
pub type BoolAttribute = ConfigurableAttribute<Option<bool>>;

impl<T: SelectValue> ConfigurableAttribute<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            configurable_values: BTreeMap::new(),
            prepend: false,
            emit_empty_list: false,
            force_specify_empty_list: false,
        }
    }

    pub fn set_value(&mut self, value: T) {
        self.value = value;
    }

    /// Sets the value used when `config` is active on `axis`.
    pub fn set_select_value(
        &mut self,
        axis: ConfigurationAxis,
        config: &str,
        value: T,
    ) -> Result<()> {
        axis.validate(config)?;
        self.configurable_values
            .entry(axis)
            .or_default()
            .insert(config.to_string(), value);
        Ok(())
    }

    /// Returns the value for `config` on `axis`, or the type's empty value when unset.
    pub fn select_value(&self, axis: &ConfigurationAxis, config: &str) -> Result<T> {
        axis.validate(config)?;
        Ok(self
            .configurable_values
            .get(axis)
            .and_then(|values| values.get(config))
            .cloned()
            .unwrap_or_default())
    }

    pub fn sorted_configuration_axes(&self) -> Vec<&ConfigurationAxis> {
        self.configurable_values.keys().collect()
    }

    pub fn has_configurable_values(&self) -> bool {
        self.configurable_values.values().any(|values| !values.is_empty())
    }

    /// True when no configuration carries a value
    ///
    /// A product variable override counts even when empty.
    pub fn is_empty(&self) -> bool {
        self.value.is_zero()
            && !self.axis_has_values(ConfigurationAxis::is_product_variable)
            && self
                .configurable_values
                .values()
                .flat_map(|values| values.values())
                .all(SelectValue::is_zero)
    }

    /// True when the attribute should be omitted entirely
    pub fn is_zero(&self) -> bool {
        self.is_empty() && !self.force_specify_empty_list
    }

    fn axis_has_values(&self, pred: impl Fn(&ConfigurationAxis) -> bool) -> bool {
        self.configurable_values
            .iter()
            .any(|(axis, values)| pred(axis) && !values.is_empty())
    }
}

impl<T: ListValue> ConfigurableAttribute<T> {
    /// Appends the base value and every override of `other`.
    pub fn append(&mut self, other: &Self) -> &mut Self {
        self.force_specify_empty_list |= other.force_specify_empty_list;
        self.value.extend_from(&other.value);
        for (axis, other_values) in &other.configurable_values {
            let values = self.configurable_values.entry(axis.clone()).or_default();
            for (config, list) in other_values {
                values.entry(config.clone()).or_default().extend_from(list);
            }
        }
        self
    }
}

impl StringListAttribute {
    /// Removes items from every override that the base value already carries.
    ///
    /// Overrides left empty are dropped.
    pub fn deduplicate_axes_from_base(&mut self) {
        let base: BTreeSet<&String> = self.value.iter().collect();
        for values in self.configurable_values.values_mut() {
            values.retain(|_, list| {
                list.retain(|item| !base.contains(item));
                !list.is_empty()
            });
        }
    }
}

impl<V> ConfigurableAttribute<Option<V>>
where
    Option<V>: SelectValue,
{
    /// Reduces the attribute to at most one select.
    ///
    /// Arch and os overrides are merged into the os+arch axis, arch winning
    /// when both apply. Product variables cannot be combined with platform
    /// axes; their unset branches inherit the base value.
    pub fn collapse(&mut self) -> Result<()> {
        let has_arch = self.axis_has_values(|a| *a == ConfigurationAxis::Arch);
        let has_os = self.axis_has_values(|a| *a == ConfigurationAxis::Os);
        let has_os_arch = self.axis_has_values(|a| *a == ConfigurationAxis::OsArch);
        let has_product_variables = self.axis_has_values(ConfigurationAxis::is_product_variable);

        let mut arch_variant_exception = false;
        if has_product_variables && (has_arch || has_os || has_os_arch) {
            let all_arch_variant = self.configurable_values.keys().all(|axis| match axis {
                ConfigurationAxis::ProductVariable { arch_variant, .. } => *arch_variant,
                _ => true,
            });
            if !(Self::collapses_arch_variants() && has_arch && all_arch_variant) {
                return Err(Error::UncollapsibleAttribute(
                    <Option<V> as SelectValue>::KIND.to_string(),
                ));
            }
            arch_variant_exception = true;
        }

        if (has_os && has_arch) || (has_os_arch && (has_os || has_arch)) {
            for (os, arches) in OS_TO_ARCH {
                for arch in *arches {
                    let os_arch = format!("{os}_{arch}");
                    if !self.select_value(&ConfigurationAxis::OsArch, &os_arch)?.is_zero() {
                        continue;
                    }
                    let arch_value = self.select_value(&ConfigurationAxis::Arch, arch)?;
                    let os_value = self.select_value(&ConfigurationAxis::Os, os)?;
                    let merged = if arch_value.is_zero() { os_value } else { arch_value };
                    if !merged.is_zero() {
                        self.set_select_value(ConfigurationAxis::OsArch, &os_arch, merged)?;
                    }
                }
            }
            self.configurable_values.remove(&ConfigurationAxis::Arch);
            self.configurable_values.remove(&ConfigurationAxis::Os);
            let remaining = self
                .configurable_values
                .values()
                .filter(|values| !values.is_empty())
                .count();
            if remaining > 1 && !arch_variant_exception {
                return Err(Error::UncollapsibleAttribute(
                    <Option<V> as SelectValue>::KIND.to_string(),
                ));
            }
        } else if has_product_variables {
            let mut used_base_value = false;
            for (axis, values) in self.configurable_values.iter_mut() {
                if !axis.is_product_variable() {
                    continue;
                }
                for value in values.values_mut() {
                    if value.is_none() {
                        *value = self.value.clone();
                        used_base_value = true;
                    }
                }
            }
            if used_base_value {
                self.value = None;
            }
        }
        Ok(())
    }

    fn collapses_arch_variants() -> bool {
        <Option<V> as SelectValue>::COLLAPSES_ARCH_VARIANTS
    }
}

/// The configurable attribute kinds a property value can carry
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurableValue {
    LabelList(LabelListAttribute),
    StringList(StringListAttribute),
    Label(LabelAttribute),
    String(StringAttribute),
    Bool(BoolAttribute),
}

impl ConfigurableValue {
    pub fn is_zero(&self) -> bool {
        match self {
            ConfigurableValue::LabelList(attr) => attr.is_zero(),
            ConfigurableValue::StringList(attr) => attr.is_zero(),
            ConfigurableValue::Label(attr) => attr.is_zero(),
            ConfigurableValue::String(attr) => attr.is_zero(),
            ConfigurableValue::Bool(attr) => attr.is_zero(),
        }
    }

    /// Renders the value as a base literal chained with selects, if anything is set.
    pub fn render(&self, indent: usize) -> Result<Option<String>> {
        match self {
            ConfigurableValue::LabelList(attr) => select::render_list(attr, indent),
            ConfigurableValue::StringList(attr) => select::render_list(attr, indent),
            ConfigurableValue::Label(attr) => select::render_scalar(attr, indent),
            ConfigurableValue::String(attr) => select::render_scalar(attr, indent),
            ConfigurableValue::Bool(attr) => select::render_scalar(attr, indent),
        }
    }
}

impl From<LabelListAttribute> for ConfigurableValue {
    fn from(attr: LabelListAttribute) -> Self {
        ConfigurableValue::LabelList(attr)
    }
}

impl From<StringListAttribute> for ConfigurableValue {
    fn from(attr: StringListAttribute) -> Self {
        ConfigurableValue::StringList(attr)
    }
}

impl From<LabelAttribute> for ConfigurableValue {
    fn from(attr: LabelAttribute) -> Self {
        ConfigurableValue::Label(attr)
    }
}

impl From<StringAttribute> for ConfigurableValue {
    fn from(attr: StringAttribute) -> Self {
        ConfigurableValue::String(attr)
    }
}

impl From<BoolAttribute> for ConfigurableValue {
    fn from(attr: BoolAttribute) -> Self {
        ConfigurableValue::Bool(attr)
    }
}
