use crate::cli::RunArgs;
use crate::client::HttpInferenceClient;
use crate::config::build_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use molbench::{engine::progress::ProgressReporter, workflows};
use tracing::info;

pub fn run(args: RunArgs) -> Result<()> {
    info!("Merging configuration from file, overrides and CLI arguments...");
    let config = build_config(&args)?;
    info!(
        "Results go to {:?}; evaluating up to {} molecules from {:?}.",
        config.output_dir, config.sampling.input_size, config.dataset.smiles
    );

    let client = HttpInferenceClient::new(&config.inference.url, config.inference.timeout)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Benchmarking model served at {}...", config.inference.url);
    info!("Invoking the benchmark workflow...");
    let summary = workflows::benchmark::run(&config, &client, &reporter)?;

    println!(
        "Benchmark of iteration {} finished on {} molecules.",
        summary.iteration, summary.data_size
    );
    if summary.outputs.is_empty() {
        println!("No metric was enabled; nothing was written.");
    }
    for output in &summary.outputs {
        println!(
            "  {:<30} {} row(s) -> {}",
            output.metric,
            output.rows,
            output.path.display()
        );
    }

    Ok(())
}
