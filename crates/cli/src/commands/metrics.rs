use anyhow::Result;
use tracing::debug;

use crate::cli::ConversionArgs;
use crate::commands::run_conversion;

pub fn metrics_command(args: &ConversionArgs, summary: bool) -> Result<()> {
    debug!("Collecting metrics for graph: {}", args.graph.display());

    let (_, results) = run_conversion(args)?;
    if summary {
        print!("{}", results.metrics.summary());
    } else {
        println!("{}", serde_json::to_string_pretty(&results.metrics)?);
    }
    Ok(())
}
