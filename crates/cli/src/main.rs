use anyhow::Result;
use clap::Parser;

use bp2bazel::Bp2Bazel;

fn main() -> Result<()> {
    // Initialize tracing based on RUST_LOG env var
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Bp2Bazel::parse();
    cli.command.execute()
}
