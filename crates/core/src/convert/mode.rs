use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::convert::assembler::AttributeLayout;
use crate::error::Error;

/// What to do with a converted module that depends on unconverted or missing modules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnconvertedDepsMode {
    /// Record a message in the metrics and keep the module
    #[default]
    Warn,
    /// Fail the module
    Error,
}

/// The kind of output to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodegenMode {
    /// Targets buildable by Bazel directly
    Bp2Build { unconverted_deps: UnconvertedDepsMode },
    /// One `soong_module` target per module variant, for introspecting the graph
    QueryView,
    /// Targets for API surfaces only, without dependency bookkeeping
    ApiBp2Build,
}

impl Default for CodegenMode {
    fn default() -> Self {
        CodegenMode::Bp2Build {
            unconverted_deps: UnconvertedDepsMode::Warn,
        }
    }
}

impl CodegenMode {
    pub fn name(&self) -> &'static str {
        match self {
            CodegenMode::Bp2Build { .. } => "bp2build",
            CodegenMode::QueryView => "queryview",
            CodegenMode::ApiBp2Build => "api_bp2build",
        }
    }
}

impl fmt::Display for CodegenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CodegenMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bp2build" => Ok(CodegenMode::default()),
            "queryview" => Ok(CodegenMode::QueryView),
            "api_bp2build" => Ok(CodegenMode::ApiBp2Build),
            other => Err(Error::UnknownCodegenMode(other.to_string())),
        }
    }
}

/// Settings for one conversion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodegenContext {
    pub mode: CodegenMode,
    /// Append a `bp2build_all_srcs` filegroup to every directory with targets
    pub generate_filegroups: bool,
    pub layout: AttributeLayout,
}

impl CodegenContext {
    pub fn new(mode: CodegenMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn with_filegroups(mut self, generate_filegroups: bool) -> Self {
        self.generate_filegroups = generate_filegroups;
        self
    }

    pub fn with_layout(mut self, layout: AttributeLayout) -> Self {
        self.layout = layout;
        self
    }
}
