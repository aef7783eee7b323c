//! Batch extraction command.

use std::path::Path;

use console::style;

use crate::batch;
use crate::cli::progress::ConsoleSink;
use crate::config::Settings;

/// Extract Q&A pairs from `input` and append them to the configured output.
pub async fn cmd_extract(settings: &Settings, input: &Path) -> anyhow::Result<()> {
    let processor = match settings.create_processor() {
        Ok(processor) => processor,
        Err(e) => {
            eprintln!("{} {}", style("✗").red(), e);
            std::process::exit(1);
        }
    };

    println!(
        "{} Extracting grounded Q&A pairs from {}",
        style("→").cyan(),
        input.display()
    );

    let sink = ConsoleSink::new();
    let summary = batch::run(input, &settings.output, &processor, &sink).await;
    sink.finish();

    let summary = summary?;
    tracing::info!(
        "Batch finished: {} files, {} records",
        summary.files,
        summary.records
    );
    Ok(())
}
