pub mod convert;
pub mod metrics;

pub use convert::convert_command;
pub use metrics::metrics_command;

use std::path::Path;

use anyhow::{Context, Result};
use bp2bazel_core::convert::AttributeLayout;
use bp2bazel_core::{CodegenConfig, CodegenContext, ConversionResults, InMemoryGraph};
use tracing::debug;

use crate::cli::ConversionArgs;
use crate::display::print_conversion_errors;

/// Resolves the run settings: config file, then environment, then flags.
pub fn resolve_config(args: &ConversionArgs) -> Result<CodegenConfig> {
    let mut config = match &args.config {
        Some(path) => CodegenConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CodegenConfig::discover(&args.graph)?,
    };
    config.apply_env(|key| std::env::var(key).ok());

    if let Some(mode) = &args.mode {
        config.mode = Some(mode.clone());
    }
    if args.strict {
        config.error_on_unconverted_deps = true;
    }
    if args.filegroups {
        config.generate_filegroups = true;
    }
    if args.inline {
        config.layout = Some(AttributeLayout::Inline);
    }
    debug!("Resolved config: {:?}", config);
    Ok(config)
}

pub fn load_graph(path: &Path) -> Result<InMemoryGraph> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph {}", path.display()))?;
    InMemoryGraph::from_json(&json)
        .with_context(|| format!("Failed to decode graph {}", path.display()))
}

/// Loads the graph and runs one conversion, reporting every error on failure.
pub fn run_conversion(args: &ConversionArgs) -> Result<(CodegenContext, ConversionResults)> {
    let config = resolve_config(args)?;
    let ctx = config.codegen_context()?;
    let graph = load_graph(&args.graph)?;

    match bp2bazel_core::generate_bazel_targets(&graph, &ctx) {
        Ok(results) => Ok((ctx, results)),
        Err(errors) => {
            print_conversion_errors(&errors);
            Err(errors.into())
        }
    }
}
