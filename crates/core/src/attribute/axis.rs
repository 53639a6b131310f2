use std::fmt;

use crate::error::{Error, Result};

/// Config key naming the default branch of a select, as written in module definitions
pub const CONDITIONS_DEFAULT: &str = "conditions_default";

/// Select key of the default branch
pub const CONDITIONS_DEFAULT_SELECT_KEY: &str = "//conditions:default";

const ARCH_PACKAGE: &str = "//build/bazel_common_rules/platforms/arch";
const ARCH_VARIANT_PACKAGE: &str = "//build/bazel/platforms/arch/variants";
const OS_PACKAGE: &str = "//build/bazel_common_rules/platforms/os";
const OS_ARCH_PACKAGE: &str = "//build/bazel_common_rules/platforms/os_arch";
const PRODUCT_VARIABLE_PACKAGE: &str = "//build/bazel/product_config/config_settings";
const APEX_PACKAGE: &str = "//build/bazel/rules/apex";
const ERRORPRONE_DISABLED_KEY: &str = "//build/bazel/rules/java/errorprone:errorprone_globally_disabled";

pub const ERRORPRONE_DISABLED: &str = "errorprone_disabled";

/// Architectures and the optional CPU features that may be selected on
pub const ARCH_FEATURES: &[(&str, &[&str])] = &[
    ("arm", &["neon"]),
    ("arm64", &["dotprod"]),
    ("riscv64", &[]),
    (
        "x86",
        &[
            "ssse3", "sse4", "sse4_1", "sse4_2", "aes_ni", "avx", "avx2", "avx512", "popcnt",
            "movbe",
        ],
    ),
    (
        "x86_64",
        &[
            "ssse3", "sse4", "sse4_1", "sse4_2", "aes_ni", "avx", "avx2", "avx512", "popcnt",
        ],
    ),
];

/// Operating systems and the architectures each one supports
pub const OS_TO_ARCH: &[(&str, &[&str])] = &[
    ("android", &["arm", "arm64", "riscv64", "x86", "x86_64"]),
    ("darwin", &["arm64", "x86_64"]),
    ("linux_bionic", &["arm64", "x86_64"]),
    ("linux_glibc", &["x86", "x86_64"]),
    ("linux_musl", &["x86", "x86_64"]),
    ("windows", &["x86", "x86_64"]),
];

const OS_ARCHES: &[&str] = &[
    "android_arm",
    "android_arm64",
    "android_riscv64",
    "android_x86",
    "android_x86_64",
    "darwin_arm64",
    "darwin_x86_64",
    "linux_glibc_x86",
    "linux_glibc_x86_64",
    "linux_musl_arm",
    "linux_musl_arm64",
    "linux_musl_x86",
    "linux_musl_x86_64",
    "linux_bionic_arm64",
    "linux_bionic_x86_64",
    "windows_x86",
    "windows_x86_64",
];

const APEX_KEYS: &[&str] = &["android-in_apex", "system", "unbundled_app"];
const HOST_OSES: &[&str] = &["darwin", "linux_glibc", "linux_musl", "linux_bionic", "windows"];
const IN_APEX_KEYS: &[&str] = &["in_apex", "non_apex"];

/// An independent dimension a value can be configured along.
///
/// The derived ordering is the order selects are chained in: arch, then os,
/// then os+arch, then product variables by name, then the apex axes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigurationAxis {
    Arch,
    Os,
    OsArch,
    ProductVariable { name: String, arch_variant: bool },
    OsAndInApex,
    InApex,
    ErrorProne,
}

impl ConfigurationAxis {
    pub fn product_variable(name: impl Into<String>) -> Self {
        ConfigurationAxis::ProductVariable {
            name: name.into(),
            arch_variant: false,
        }
    }

    pub fn arch_variant_product_variable(name: impl Into<String>) -> Self {
        ConfigurationAxis::ProductVariable {
            name: name.into(),
            arch_variant: true,
        }
    }

    /// Name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            ConfigurationAxis::Arch => "arch",
            ConfigurationAxis::Os => "os",
            ConfigurationAxis::OsArch => "os+arch",
            ConfigurationAxis::ProductVariable { .. } => "product_variables",
            ConfigurationAxis::OsAndInApex => "os_in_apex",
            ConfigurationAxis::InApex => "in_apex config",
            ConfigurationAxis::ErrorProne => "errorprone config",
        }
    }

    pub fn is_product_variable(&self) -> bool {
        matches!(self, ConfigurationAxis::ProductVariable { .. })
    }

    /// Checks that `config` is a known discriminator of this axis.
    pub fn validate(&self, config: &str) -> Result<()> {
        let known = config == CONDITIONS_DEFAULT
            || match self {
                ConfigurationAxis::Arch => is_arch(config) || is_arch_variant(config),
                ConfigurationAxis::Os => os_names().any(|os| os == config),
                ConfigurationAxis::OsArch => OS_ARCHES.contains(&config),
                ConfigurationAxis::ProductVariable { .. } | ConfigurationAxis::OsAndInApex => true,
                ConfigurationAxis::InApex => IN_APEX_KEYS.contains(&config),
                ConfigurationAxis::ErrorProne => config == ERRORPRONE_DISABLED,
            };
        if known {
            Ok(())
        } else {
            Err(Error::UnknownDiscriminator {
                axis: self.name().to_string(),
                config: config.to_string(),
            })
        }
    }

    /// Returns the select key for `config` on this axis.
    pub fn select_key(&self, config: &str) -> Result<String> {
        self.validate(config)?;
        if config == CONDITIONS_DEFAULT {
            return Ok(CONDITIONS_DEFAULT_SELECT_KEY.to_string());
        }
        let key = match self {
            ConfigurationAxis::Arch if is_arch(config) => format!("{ARCH_PACKAGE}:{config}"),
            ConfigurationAxis::Arch => format!("{ARCH_VARIANT_PACKAGE}:{config}"),
            ConfigurationAxis::Os => format!("{OS_PACKAGE}:{config}"),
            ConfigurationAxis::OsArch => format!("{OS_ARCH_PACKAGE}:{config}"),
            ConfigurationAxis::ProductVariable { .. } => {
                format!("{PRODUCT_VARIABLE_PACKAGE}:{config}")
            }
            ConfigurationAxis::OsAndInApex if APEX_KEYS.contains(&config) => {
                format!("{APEX_PACKAGE}:{config}")
            }
            ConfigurationAxis::OsAndInApex if HOST_OSES.contains(&config) => {
                format!("{OS_PACKAGE}:{config}")
            }
            ConfigurationAxis::OsAndInApex => config.to_string(),
            ConfigurationAxis::InApex => format!("{APEX_PACKAGE}:{config}"),
            ConfigurationAxis::ErrorProne => ERRORPRONE_DISABLED_KEY.to_string(),
        };
        Ok(key)
    }
}

impl fmt::Display for ConfigurationAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationAxis::ProductVariable { name, .. } => {
                write!(f, "product_variables:{name}")
            }
            other => f.write_str(other.name()),
        }
    }
}

fn os_names() -> impl Iterator<Item = &'static str> {
    OS_TO_ARCH.iter().map(|(os, _)| *os)
}

fn is_arch(config: &str) -> bool {
    ARCH_FEATURES.iter().any(|(arch, _)| *arch == config)
}

/// `<arch>-<feature>[-<feature>...]` with features sorted, unique and supported by the arch
fn is_arch_variant(config: &str) -> bool {
    let mut parts = config.split('-');
    let Some(arch) = parts.next() else {
        return false;
    };
    let Some((_, features)) = ARCH_FEATURES.iter().find(|(name, _)| *name == arch) else {
        return false;
    };
    let selected: Vec<&str> = parts.collect();
    !selected.is_empty()
        && selected.windows(2).all(|pair| pair[0] < pair[1])
        && selected.iter().all(|feature| features.contains(feature))
}
