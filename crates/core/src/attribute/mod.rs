//! Typed attribute values and the select machinery for configurable values

pub mod axis;
pub mod configurable;
pub mod label;
pub mod property;
pub mod select;
pub mod substitution;
pub mod value;

pub use axis::{CONDITIONS_DEFAULT, ConfigurationAxis};
pub use configurable::{
    BoolAttribute, ConfigurableAttribute, ConfigurableValue, LabelAttribute, LabelListAttribute,
    SelectValue, StringAttribute, StringListAttribute,
};
pub use label::{Label, LabelList};
pub use property::{
    BazelAttributes, DuplicatePolicy, Field, FieldTag, Property, PropertyBag, PropertyStruct,
    property_name_for_field,
};
pub use substitution::{try_variable_substitution, try_variable_substitutions};
pub use value::{Value, print_value};
