//! bp2bazel - Convert a Soong module graph into Bazel BUILD targets
//!
//! This crate provides the conversion engine:
//! - Print typed attribute values as Starlark literals
//! - Flatten property structs into sorted attribute bags
//! - Render configurable (per-arch, per-os, per-product-variable) values as `select()` chains
//! - Assemble target declarations and drive a full pass over the module graph
pub mod attribute;
pub mod bazel;
pub mod config;
pub mod convert;
pub mod error;
pub mod graph;
pub mod starlark;

// Re-export commonly used types and traits
pub use attribute::{
    BoolAttribute, ConfigurableValue, ConfigurationAxis, DuplicatePolicy, Label, LabelAttribute,
    LabelList, LabelListAttribute, Property, PropertyBag, PropertyStruct, StringAttribute,
    StringListAttribute, Value,
};
pub use bazel::{BazelTarget, BazelTargets};
pub use config::CodegenConfig;
pub use convert::{
    AttributeLayout, BazelFile, CodegenContext, CodegenMetrics, CodegenMode, ConversionErrors,
    ConversionResults, TargetDescriptor, UnconvertedDepsMode, create_build_files,
    generate_bazel_targets,
};
pub use error::{Error, Result};
pub use graph::{Bp2BuildModule, InMemoryGraph, ModuleGraph, ModuleNode};
