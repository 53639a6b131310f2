//! Read-only access to the module graph being converted

pub mod json;
pub mod memory;

use crate::attribute::PropertyBag;
use crate::convert::{TargetDescriptor, UnconvertedReason};

pub use memory::{DepRef, InMemoryGraph, ModuleNode};

/// Traversal interface over an already resolved module graph
pub trait ModuleGraph {
    type Module: Bp2BuildModule;

    fn module_name(&self, module: &Self::Module) -> String;

    fn module_dir(&self, module: &Self::Module) -> String;

    /// Variant discriminator, empty for modules without variants
    fn module_sub_dir(&self, module: &Self::Module) -> String;

    fn module_type(&self, module: &Self::Module) -> String;

    /// Visits every module once, in graph order.
    fn visit_all_modules(&self, visit: &mut dyn FnMut(&Self::Module));

    /// Visits the direct dependencies of `module`.
    fn visit_direct_deps(&self, module: &Self::Module, visit: &mut dyn FnMut(&Self::Module));
}

/// Conversion capabilities a module may expose
pub trait Bp2BuildModule {
    /// Mapped to a manually maintained target, never regenerated
    fn is_handcrafted(&self) -> bool {
        false
    }

    fn is_convertible(&self) -> bool {
        false
    }

    /// Why the module is not convertible, when known
    fn unconverted_reason(&self) -> Option<UnconvertedReason> {
        None
    }

    /// The targets this module converts to
    fn bp2build_targets(&self) -> &[TargetDescriptor] {
        &[]
    }

    /// Raw module properties, used by the introspection view
    fn properties(&self) -> &PropertyBag {
        PropertyBag::empty()
    }

    fn unconverted_deps(&self) -> &[String] {
        &[]
    }

    fn missing_deps(&self) -> &[String] {
        &[]
    }
}
