use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use bp2bazel_core::create_build_files;
use tracing::{debug, info};

use crate::cli::ConversionArgs;
use crate::commands::run_conversion;
use crate::display::print_build_files;

pub fn convert_command(args: &ConversionArgs, out_dir: Option<&Path>) -> Result<()> {
    debug!("Converting graph: {}", args.graph.display());

    let (ctx, results) = run_conversion(args)?;
    let files = create_build_files(&results.build_dir_to_targets, ctx.mode);

    let Some(out_dir) = out_dir else {
        print_build_files(&files);
        return Ok(());
    };

    for file in &files {
        let path = out_dir.join(file.path());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, &file.contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Wrote {}", path.display());
    }
    info!("Wrote {} BUILD files to {}", files.len(), out_dir.display());
    Ok(())
}
