use crate::core::io::dataset::{CsvFingerprintLoader, CsvSmilesLoader, LoadError};
use crate::core::io::results::ResultWriter;
use crate::core::io::traits::{FingerprintLoader, SmilesLoader};
use crate::core::models::fingerprints::FingerprintDataset;
use crate::core::models::molecules::SmilesDataset;
use crate::core::models::record::MetricRecord;
use crate::core::regression::registry::RegressorRegistry;
use crate::engine::config::BenchmarkConfig;
use crate::engine::error::EngineError;
use crate::engine::inference::{InferenceClient, Iteration};
use crate::engine::metrics::{Metric, MetricInput, enabled_metrics};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::readiness::wait_for_service;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct MetricOutput {
    pub metric: &'static str,
    pub path: PathBuf,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkSummary {
    pub iteration: Iteration,
    pub data_size: usize,
    pub outputs: Vec<MetricOutput>,
}

/// Runs a benchmark with the CSV datasets named in `config`, sleeping on the current thread
/// between readiness probes.
pub fn run(
    config: &BenchmarkConfig,
    client: &dyn InferenceClient,
    reporter: &ProgressReporter,
) -> Result<BenchmarkSummary, EngineError> {
    let smiles_loader =
        CsvSmilesLoader::new(&config.dataset.smiles).with_smiles_column(&config.dataset.smiles_column);
    let fingerprint_loader = CsvFingerprintLoader::new(&config.dataset.fingerprints);
    run_with(
        config,
        &smiles_loader,
        &fingerprint_loader,
        client,
        reporter,
        std::thread::sleep,
    )
}

#[instrument(skip_all, name = "benchmark_workflow")]
pub fn run_with<S, F>(
    config: &BenchmarkConfig,
    smiles_loader: &S,
    fingerprint_loader: &F,
    client: &dyn InferenceClient,
    reporter: &ProgressReporter,
    sleep: impl FnMut(Duration),
) -> Result<BenchmarkSummary, EngineError>
where
    S: SmilesLoader<Error = LoadError>,
    F: FingerprintLoader<Error = LoadError>,
{
    // === Phase 0: Output location, metrics and regressors ===
    let writer = ResultWriter::new(&config.output_dir);
    writer.ensure_directory()?;
    let metrics = enabled_metrics(&config.metrics, client);
    let registry = RegressorRegistry::standard();
    info!(
        "Benchmarking {} metric(s): {}",
        metrics.len(),
        metrics.iter().map(|m| m.name()).collect::<Vec<_>>().join(", ")
    );

    // === Phase 1: Datasets ===
    reporter.report(Progress::PhaseStart {
        name: "Loading Datasets",
    });
    let (smiles, fingerprints) = load_datasets(config, smiles_loader, fingerprint_loader)?;
    let data_size = smiles.len();
    reporter.report(Progress::Message(format!(
        "Evaluating {} molecule(s)",
        data_size
    )));
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Inference service ===
    reporter.report(Progress::PhaseStart {
        name: "Waiting for Inference Service",
    });
    let iteration = wait_for_service(client, &config.inference.retry, sleep)?;
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Metric sweeps ===
    let context = SweepContext {
        config,
        registry: &registry,
        smiles: &smiles,
        fingerprints: &fingerprints,
        iteration,
        writer: &writer,
        reporter,
    };
    let outputs = metrics
        .iter()
        .map(|metric| context.sweep(metric.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        "Benchmark of iteration {} complete: {} result file(s) written.",
        iteration,
        outputs.len()
    );
    Ok(BenchmarkSummary {
        iteration,
        data_size,
        outputs,
    })
}

fn load_datasets<S, F>(
    config: &BenchmarkConfig,
    smiles_loader: &S,
    fingerprint_loader: &F,
) -> Result<(SmilesDataset, FingerprintDataset), EngineError>
where
    S: SmilesLoader<Error = LoadError>,
    F: FingerprintLoader<Error = LoadError>,
{
    let mut smiles = smiles_loader.load(config.sampling.seq_len)?;
    let mut fingerprints = fingerprint_loader.load(smiles.ids())?;

    let data_size = config.sampling.effective_size(smiles.len());
    smiles.truncate(data_size);
    fingerprints.truncate(data_size);
    smiles
        .ensure_aligned_with(&fingerprints)
        .map_err(|source| EngineError::MisalignedDatasets { source })?;
    info!(
        "Evaluating {} molecule(s) (input_size {}).",
        data_size, config.sampling.input_size
    );
    Ok((smiles, fingerprints))
}

struct SweepContext<'a> {
    config: &'a BenchmarkConfig,
    registry: &'a RegressorRegistry,
    smiles: &'a SmilesDataset,
    fingerprints: &'a FingerprintDataset,
    iteration: Iteration,
    writer: &'a ResultWriter,
    reporter: &'a ProgressReporter<'a>,
}

impl SweepContext<'_> {
    fn sweep(&self, metric: &dyn Metric) -> Result<MetricOutput, EngineError> {
        let name = metric.name();
        info!("METRIC: {}", name);
        let variations = metric.variations(self.config, self.registry)?;
        self.reporter.report(Progress::MetricStart {
            name,
            variations: variations.len() as u64,
        });

        let mut results: Vec<MetricRecord> = Vec::with_capacity(variations.len());
        let mut path = self.writer.path_for(name, self.iteration);
        for variation in &variations {
            let entry = variation.as_name().and_then(|n| self.registry.get(n));
            let started = Instant::now();
            let mut record = metric.calculate(&MetricInput {
                smiles: self.smiles,
                fingerprints: self.fingerprints,
                top_k: variation,
                radius: variation,
                properties: self.smiles.properties(),
                estimator: entry.map(|e| &e.estimator),
                param_grid: entry.map(|e| &e.param_grid),
                num_samples: self.config.sampling.sample_size,
            })?;
            let run_time = started.elapsed().as_secs_f64();

            record.set("iteration", self.iteration.0);
            record.set("run_time", run_time);
            record.set("data_size", self.smiles.len());
            info!(
                "{} [{}] = {} ({:.3}s)",
                name,
                variation,
                record.get("value").map(ToString::to_string).unwrap_or_default(),
                run_time
            );
            results.push(record);
            path = self.writer.write(name, self.iteration, &results)?;
            self.reporter.report(Progress::VariationFinish {
                variation: variation.to_string(),
            });
        }

        self.reporter.report(Progress::MetricFinish);
        Ok(MetricOutput {
            metric: name,
            path,
            rows: results.len(),
        })
    }
}
