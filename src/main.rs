use std::process;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;

use changelog_release::config::{Args, RunConfig};
use changelog_release::{output, pipeline, ui};

fn init_tracing() {
    // Logs go to stderr; stdout carries the progress lines
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

fn fatal(err: anyhow::Error) -> ! {
    ui::display_error(&format!("{:#}", err));
    process::exit(1);
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => fatal(anyhow::Error::new(e).context("initialization error")),
    };

    let config = match RunConfig::try_from(args).context("initialization error") {
        Ok(config) => config,
        Err(e) => fatal(e),
    };
    let output_file = config.output_file.clone();

    let today = chrono::Local::now().date_naive();
    let outputs = match pipeline::run(config, today).await {
        Ok(outputs) => outputs,
        Err(e) => fatal(e),
    };

    if let Err(e) = output::write_outputs(output_file.as_deref(), &outputs) {
        fatal(anyhow::Error::new(e).context("error defining output"));
    }

    ui::display_success("success");
}
