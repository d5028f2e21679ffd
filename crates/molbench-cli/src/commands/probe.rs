use crate::cli::ProbeArgs;
use crate::client::HttpInferenceClient;
use crate::error::{CliError, Result};
use molbench::engine::inference::{InferenceClient, Readiness};
use std::time::Duration;
use tracing::info;

pub fn run(args: ProbeArgs) -> Result<()> {
    let client = HttpInferenceClient::new(&args.url, Duration::from_secs(args.timeout_secs))?;
    info!("Probing inference service at {}", args.url);

    match client.probe_iteration() {
        Readiness::Ready(iteration) => {
            println!("Service at {} is serving iteration {}.", args.url, iteration);
            Ok(())
        }
        Readiness::Unavailable(reason) => Err(CliError::Other(anyhow::anyhow!(
            "Service at {} is not ready: {}",
            args.url,
            reason
        ))),
    }
}
