//! phetable binary.

use clap::Parser;
use phetable_cli::Cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    tracing::debug!("{:?}", cli);

    let summary = phetable_loader::run(&cli.inputs(), &cli.config(), &cli.output())?;

    tracing::info!(
        "Done: {} subjects, {} phecodes, {} unresolved codes",
        summary.subjects,
        summary.columns,
        summary.missing_codes
    );
    Ok(())
}
