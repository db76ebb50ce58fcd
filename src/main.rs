//! Command-line entry point: extract one dataset's archives with a progress bar.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use fanzip::{ArchiveProgressBar, Cli, ExtractError, ExtractionEngine};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = cli.config();
    if let Err(err) = config.check_layout().await {
        report_error(&err);
        return ExitCode::FAILURE;
    }

    let progress = Arc::new(ArchiveProgressBar::new(!cli.quiet));
    let engine = ExtractionEngine::new(&config.output_root).with_reporter(progress.clone());

    match engine.extract_directory(&config.source_dir).await {
        Ok(summary) => {
            progress.finish(&format!(
                "{} archives, {} files",
                summary.archives, summary.files
            ));
            ExitCode::SUCCESS
        }
        Err(err) => {
            progress.abandon("failed");
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "fanzip=debug" } else { "fanzip=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn report_error(err: &ExtractError) {
    eprintln!("error: {err}");
    for failure in err.failures() {
        eprintln!("  {failure}");
    }
}
