//! Configuration management for bp2bazel

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::convert::{AttributeLayout, CodegenContext, CodegenMode, UnconvertedDepsMode};
use crate::error::{Error, Result};

/// File name searched for next to the graph and in its ancestors
pub const CONFIG_FILE_NAME: &str = "bp2bazel.toml";

/// Environment variable turning unconverted dependencies into errors
pub const ERROR_UNCONVERTED_ENV: &str = "BP2BUILD_ERROR_UNCONVERTED";

/// Settings for a conversion run, as read from `bp2bazel.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CodegenConfig {
    /// `bp2build`, `queryview` or `api_bp2build`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error_on_unconverted_deps: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub generate_filegroups: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<AttributeLayout>,
}

impl CodegenConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CodegenConfig = toml::from_str(&content).map_err(|e| {
            Error::ConfigError(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Finds the nearest `bp2bazel.toml`, starting at `start` and walking up.
    pub fn find_config_file(start: &Path) -> Option<PathBuf> {
        let mut current = start;
        if current.is_file() {
            current = current.parent()?;
        }

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Some(config_path);
            }
            current = current.parent()?;
        }
    }

    /// Loads the nearest config file, or the defaults when there is none.
    pub fn discover(start: &Path) -> Result<Self> {
        match Self::find_config_file(start) {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Overlays environment settings read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ERROR_UNCONVERTED_ENV) {
            self.error_on_unconverted_deps = is_truthy(&value);
        }
    }

    pub fn codegen_mode(&self) -> Result<CodegenMode> {
        let mode = match &self.mode {
            Some(name) => name.parse::<CodegenMode>()?,
            None => CodegenMode::default(),
        };
        Ok(match mode {
            CodegenMode::Bp2Build { .. } if self.error_on_unconverted_deps => {
                CodegenMode::Bp2Build {
                    unconverted_deps: UnconvertedDepsMode::Error,
                }
            }
            other => other,
        })
    }

    pub fn codegen_context(&self) -> Result<CodegenContext> {
        Ok(CodegenContext::new(self.codegen_mode()?)
            .with_filegroups(self.generate_filegroups)
            .with_layout(self.layout.unwrap_or_default()))
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "y" | "yes" | "on" | "true"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let ctx = CodegenConfig::default().codegen_context().unwrap();
        assert_eq!(ctx, CodegenContext::default());
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            "mode = \"bp2build\"\nerror_on_unconverted_deps = true\ngenerate_filegroups = true\nlayout = \"inline\"\n",
        )
        .unwrap();

        let config = CodegenConfig::load_from_file(&path).unwrap();
        let ctx = config.codegen_context().unwrap();
        assert_eq!(
            ctx.mode,
            CodegenMode::Bp2Build {
                unconverted_deps: UnconvertedDepsMode::Error
            }
        );
        assert!(ctx.generate_filegroups);
        assert_eq!(ctx.layout, AttributeLayout::Inline);
    }

    #[test]
    fn test_invalid_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "mode = [").unwrap();
        let err = CodegenConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_find_config_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "").unwrap();
        let graph = nested.join("graph.json");
        fs::write(&graph, "{}").unwrap();

        let found = CodegenConfig::find_config_file(&graph).unwrap();
        assert_eq!(found, temp.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_apply_env() {
        for (value, expected) in [("1", true), ("yes", true), ("TRUE", true), ("0", false), ("", false)] {
            let mut config = CodegenConfig::default();
            config.apply_env(|key| (key == ERROR_UNCONVERTED_ENV).then(|| value.to_string()));
            assert_eq!(config.error_on_unconverted_deps, expected, "value {value:?}");
        }

        let mut config = CodegenConfig {
            error_on_unconverted_deps: true,
            ..Default::default()
        };
        config.apply_env(|_| None);
        assert!(config.error_on_unconverted_deps);
    }

    #[test]
    fn test_strict_only_affects_bp2build() {
        let config = CodegenConfig {
            mode: Some("queryview".into()),
            error_on_unconverted_deps: true,
            ..Default::default()
        };
        assert_eq!(config.codegen_mode().unwrap(), CodegenMode::QueryView);
    }

    #[test]
    fn test_unknown_mode() {
        let config = CodegenConfig {
            mode: Some("overlay".into()),
            ..Default::default()
        };
        assert!(matches!(
            config.codegen_mode(),
            Err(Error::UnknownCodegenMode(_))
        ));
    }
}
