//! Turning module graphs into per-directory Bazel targets

pub mod assembler;
pub mod build_files;
pub mod driver;
pub mod metrics;
pub mod mode;

pub use assembler::{
    AttributeLayout, TargetDescriptor, canonicalize_module_type, generate_bazel_target,
    generate_soong_module_target, qualified_target_label, target_name_with_variant,
};
pub use build_files::{BazelFile, GENERATED_BUILD_FILE_NAME, create_build_files};
pub use driver::{ConversionErrors, ConversionResults, generate_bazel_targets};
pub use metrics::{CodegenMetrics, UnconvertedReason, UnconvertedReasonType};
pub use mode::{CodegenContext, CodegenMode, UnconvertedDepsMode};
