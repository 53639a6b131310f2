//! Emitted Bazel targets and their load bookkeeping

pub mod target;

pub use target::{BazelLoad, BazelTarget, BazelTargets, PACKAGE_RULE_CLASS};
