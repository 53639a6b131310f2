use std::collections::BTreeMap;

use serde::Serialize;

use crate::bazel::BazelTargets;
use crate::convert::mode::CodegenMode;

pub const GENERATED_BUILD_FILE_NAME: &str = "BUILD.bazel";

const BP2BUILD_HEADER: &str = "# READ THIS FIRST:
# This file was automatically generated by bp2build for the Bazel migration project.
# Feel free to edit or test it, but do *not* check it into your version control system.
";

const DEFAULT_PACKAGE_RULE: &str = "package(default_visibility = [\"//visibility:public\"])\n";

const SOONG_MODULE_PREAMBLE: &str = "package(default_visibility = [\"//visibility:public\"])
load(\"//:soong_module.bzl\", \"soong_module\")

";

/// A generated file, not yet written anywhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BazelFile {
    pub dir: String,
    pub basename: String,
    pub contents: String,
}

impl BazelFile {
    fn new(dir: &str, basename: &str, contents: String) -> Self {
        Self {
            dir: dir.to_string(),
            basename: basename.to_string(),
            contents,
        }
    }

    /// Path of the file relative to the output root
    pub fn path(&self) -> String {
        match self.dir.as_str() {
            "" | "." => self.basename.clone(),
            dir => format!("{}/{}", dir, self.basename),
        }
    }
}

/// Renders one BUILD file per directory, in directory order.
///
/// Targets inside a file are sorted by name.
pub fn create_build_files(
    dir_to_targets: &BTreeMap<String, BazelTargets>,
    mode: CodegenMode,
) -> Vec<BazelFile> {
    dir_to_targets
        .iter()
        .map(|(dir, targets)| {
            let mut targets = targets.clone();
            targets.sort();

            let mut contents = match mode {
                CodegenMode::Bp2Build { .. } => {
                    let mut header = String::from(BP2BUILD_HEADER);
                    header.push_str(&targets.load_statements());
                    header.push_str("\n\n");
                    match targets.package_rule() {
                        Some(rule) => header.push_str(&rule.content),
                        None => header.push_str(DEFAULT_PACKAGE_RULE),
                    }
                    header
                }
                CodegenMode::QueryView => String::from(SOONG_MODULE_PREAMBLE),
                CodegenMode::ApiBp2Build => String::new(),
            };
            if !contents.is_empty() {
                contents.push_str("\n\n");
            }
            contents.push_str(&targets.to_string());

            BazelFile::new(dir, GENERATED_BUILD_FILE_NAME, contents)
        })
        .collect()
}
