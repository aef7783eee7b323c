//! groundqa - citation-grounded Q&A extraction from PDF manuals.
//!
//! Sends PDF documents to Gemini, extracts question/answer pairs that carry
//! page citations and verbatim quotes, and appends them to a JSONL file.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if groundqa::cli::is_verbose() {
        "groundqa=info"
    } else {
        "groundqa=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    groundqa::cli::run().await
}
