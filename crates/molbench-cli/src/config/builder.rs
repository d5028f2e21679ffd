use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileMetricsConfig, FileRadiusMetric};
use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use molbench::engine::config::{
    BenchmarkConfig, BenchmarkConfigBuilder, MetricSettings, ModelabilitySettings, SweepSettings,
};
use molbench::engine::readiness::RetryPolicy;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub fn build_config(args: &RunArgs) -> Result<BenchmarkConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let output_file = file_config.output.take().unwrap_or_default();
    let output_dir = args
        .output
        .clone()
        .or(output_file.path)
        .unwrap_or_else(|| PathBuf::from(&defaults.output_path));

    let sampling_file = file_config.sampling_spec.take().unwrap_or_default();
    let seq_len = sampling_file.seq_len.unwrap_or(defaults.seq_len);
    let sample_size = args
        .sample_size
        .or(sampling_file.sample_size)
        .unwrap_or(defaults.sample_size);
    let input_size = args
        .input_size
        .or(sampling_file.input_size)
        .unwrap_or(defaults.input_size);

    let dataset_file = file_config.dataset.take().unwrap_or_default();
    let smiles_path = dataset_file.smiles.ok_or_else(|| {
        CliError::Config(
            "`dataset.smiles` is required either in the config file or via -S.".to_string(),
        )
    })?;
    let fingerprints_path = dataset_file.fingerprints.ok_or_else(|| {
        CliError::Config(
            "`dataset.fingerprints` is required either in the config file or via -S.".to_string(),
        )
    })?;

    let inference_file = file_config.inference.take().unwrap_or_default();
    let url = args
        .url
        .clone()
        .or(inference_file.url)
        .unwrap_or_else(|| defaults.url.clone());
    let retry = RetryPolicy {
        max_attempts: inference_file.max_attempts.unwrap_or(defaults.max_attempts),
        interval: Duration::from_secs(
            inference_file
                .retry_interval_secs
                .unwrap_or(defaults.retry_interval_secs),
        ),
    };
    let timeout = Duration::from_secs(inference_file.timeout_secs.unwrap_or(defaults.timeout_secs));

    let metrics = merge_metrics(file_config.metric.take().unwrap_or_default(), &defaults);

    BenchmarkConfigBuilder::new()
        .output_dir(output_dir)
        .seq_len(seq_len)
        .sample_size(sample_size)
        .input_size(input_size)
        .smiles_path(smiles_path)
        .fingerprints_path(fingerprints_path)
        .smiles_column(
            dataset_file
                .smiles_column
                .unwrap_or_else(|| defaults.smiles_column.clone()),
        )
        .url(url)
        .timeout(timeout)
        .retry(retry)
        .metrics(metrics)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}

fn merge_metrics(file_val: FileMetricsConfig, defaults: &DefaultsConfig) -> MetricSettings {
    let radius_sweep = |m: Option<FileRadiusMetric>| {
        let m = m.unwrap_or_default();
        SweepSettings {
            enabled: m.enabled.unwrap_or(defaults.metric_enabled),
            values: m.radius.unwrap_or_else(|| defaults.radius.clone()),
        }
    };
    let nn = file_val.nearest_neighbor_correlation.unwrap_or_default();
    let modelability = file_val.modelability.unwrap_or_default();

    MetricSettings {
        validity: radius_sweep(file_val.validity),
        unique: radius_sweep(file_val.unique),
        novelty: radius_sweep(file_val.novelty),
        nearest_neighbor_correlation: SweepSettings {
            enabled: nn.enabled.unwrap_or(defaults.metric_enabled),
            values: nn.top_k.unwrap_or_else(|| defaults.top_k.clone()),
        },
        modelability: ModelabilitySettings {
            enabled: modelability.enabled.unwrap_or(defaults.metric_enabled),
            models: modelability.models,
        },
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

/// Accepts `1,2,5` as well as the TOML-like `[1, 2, 5]`.
fn parse_list<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<Vec<T>> {
    let inner = value.trim().trim_start_matches('[').trim_end_matches(']');
    inner
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| parse_value(key, item.trim_matches('"'), kind))
        .collect()
}

fn radius_metric<'a>(metrics: &'a mut FileMetricsConfig, name: &str) -> Option<&'a mut FileRadiusMetric> {
    let slot = match name {
        "validity" => &mut metrics.validity,
        "unique" => &mut metrics.unique,
        "novelty" => &mut metrics.novelty,
        _ => return None,
    };
    Some(slot.get_or_insert_with(Default::default))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    if set_values.is_empty() {
        return Ok(config);
    }
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        match key {
            "output.path" => {
                config.output.get_or_insert_with(Default::default).path =
                    Some(PathBuf::from(value_str.trim()));
            }
            "samplingSpec.seq_len" => {
                config.sampling_spec.get_or_insert_with(Default::default).seq_len =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "samplingSpec.sample_size" => {
                config.sampling_spec.get_or_insert_with(Default::default).sample_size =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "samplingSpec.input_size" => {
                config.sampling_spec.get_or_insert_with(Default::default).input_size =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "dataset.smiles" => {
                config.dataset.get_or_insert_with(Default::default).smiles =
                    Some(PathBuf::from(value_str.trim()));
            }
            "dataset.fingerprints" => {
                config.dataset.get_or_insert_with(Default::default).fingerprints =
                    Some(PathBuf::from(value_str.trim()));
            }
            "dataset.smiles_column" => {
                config.dataset.get_or_insert_with(Default::default).smiles_column =
                    Some(value_str.trim().to_string());
            }
            "inference.url" => {
                config.inference.get_or_insert_with(Default::default).url =
                    Some(value_str.trim().to_string());
            }
            "inference.timeout_secs" => {
                config.inference.get_or_insert_with(Default::default).timeout_secs =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "inference.max_attempts" => {
                config.inference.get_or_insert_with(Default::default).max_attempts =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "inference.retry_interval_secs" => {
                config
                    .inference
                    .get_or_insert_with(Default::default)
                    .retry_interval_secs = Some(parse_value(key, value_str, "integer")?);
            }
            _ => apply_metric_value(&mut config, key, value_str)?,
        }
    }
    Ok(config)
}

fn apply_metric_value(config: &mut FileConfig, key: &str, value_str: &str) -> Result<()> {
    let unsupported =
        || CliError::Config(format!("Unsupported configuration key for --set: '{}'", key));
    let Some(path) = key.strip_prefix("metric.") else {
        return Err(unsupported());
    };
    let Some((metric, field)) = path.split_once('.') else {
        return Err(unsupported());
    };
    let metrics = config.metric.get_or_insert_with(Default::default);

    match (metric, field) {
        ("nearestNeighborCorrelation", "enabled") => {
            metrics
                .nearest_neighbor_correlation
                .get_or_insert_with(Default::default)
                .enabled = Some(parse_value(key, value_str, "boolean")?);
        }
        ("nearestNeighborCorrelation", "top_k") => {
            metrics
                .nearest_neighbor_correlation
                .get_or_insert_with(Default::default)
                .top_k = Some(parse_list(key, value_str, "integer")?);
        }
        ("modelability", "enabled") => {
            metrics.modelability.get_or_insert_with(Default::default).enabled =
                Some(parse_value(key, value_str, "boolean")?);
        }
        ("modelability", "models") => {
            metrics.modelability.get_or_insert_with(Default::default).models =
                Some(parse_list(key, value_str, "model name")?);
        }
        (name, "enabled") => {
            radius_metric(metrics, name).ok_or_else(unsupported)?.enabled =
                Some(parse_value(key, value_str, "boolean")?);
        }
        (name, "radius") => {
            radius_metric(metrics, name).ok_or_else(unsupported)?.radius =
                Some(parse_list(key, value_str, "integer")?);
        }
        _ => return Err(unsupported()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    static TEST_DIR: Lazy<TempDir> = Lazy::new(|| tempdir().expect("Failed to create temp dir"));

    fn write_config_file(name: &str, content: &str) -> PathBuf {
        let file_path = TEST_DIR.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn args_with_datasets() -> RunArgs {
        RunArgs {
            set_values: vec![
                "dataset.smiles=data/molecules.csv".to_string(),
                "dataset.fingerprints=data/fingerprints.csv".to_string(),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn defaults_fill_everything_but_datasets() {
        let cfg = build_config(&args_with_datasets()).expect("build ok");
        let defaults = DefaultsConfig::default();

        assert_eq!(cfg.output_dir, PathBuf::from("results"));
        assert_eq!(cfg.sampling.seq_len, defaults.seq_len);
        assert_eq!(cfg.sampling.sample_size, defaults.sample_size);
        assert_eq!(cfg.sampling.input_size, defaults.input_size);
        assert_eq!(cfg.dataset.smiles, PathBuf::from("data/molecules.csv"));
        assert_eq!(cfg.dataset.smiles_column, "canonical_smiles");
        assert_eq!(cfg.inference.url, "http://localhost:8000");
        assert_eq!(cfg.inference.retry, RetryPolicy::default());
        assert_eq!(cfg.metrics.validity.values, vec![1, 2, 5]);
        assert_eq!(cfg.metrics.nearest_neighbor_correlation.values, vec![50, 100, 500]);
        assert!(cfg.metrics.modelability.enabled);
        assert_eq!(cfg.metrics.modelability.models, None);
    }

    #[test]
    fn missing_dataset_path_is_a_config_error() {
        let err = build_config(&RunArgs::default()).unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("dataset.smiles")));
    }

    #[test]
    fn build_config_reads_file_and_merges() {
        let cfg_path = write_config_file(
            "full.toml",
            r#"
            [output]
            path = "bench-out"

            [samplingSpec]
            seq_len = 256
            sample_size = 4
            input_size = 1000

            [dataset]
            smiles = "zinc.csv"
            fingerprints = "zinc_fp.csv"
            smiles_column = "smiles"

            [inference]
            url = "http://inference:9000"
            timeout_secs = 60
            max_attempts = 3
            retry_interval_secs = 2

            [metric.validity]
            enabled = true
            radius = [1, 2]

            [metric.unique]
            enabled = false

            [metric.nearestNeighborCorrelation]
            enabled = true
            top_k = [5]

            [metric.modelability]
            enabled = true
            models = ["linear regression", "elastic net"]
            "#,
        );
        let args = RunArgs {
            config: Some(cfg_path),
            ..Default::default()
        };
        let cfg = build_config(&args).expect("build ok");

        assert_eq!(cfg.output_dir, PathBuf::from("bench-out"));
        assert_eq!(cfg.sampling.seq_len, 256);
        assert_eq!(cfg.sampling.input_size, 1000);
        assert_eq!(cfg.dataset.smiles_column, "smiles");
        assert_eq!(cfg.inference.timeout, Duration::from_secs(60));
        assert_eq!(
            cfg.inference.retry,
            RetryPolicy {
                max_attempts: 3,
                interval: Duration::from_secs(2)
            }
        );
        assert_eq!(cfg.metrics.validity.values, vec![1, 2]);
        assert!(!cfg.metrics.unique.enabled);
        assert_eq!(cfg.metrics.nearest_neighbor_correlation.values, vec![5]);
        assert_eq!(
            cfg.metrics.modelability.models,
            Some(vec!["linear regression".to_string(), "elastic net".to_string()])
        );
    }

    #[test]
    fn cli_flags_override_set_values_and_file() {
        let cfg_path = write_config_file(
            "override.toml",
            r#"
            [samplingSpec]
            sample_size = 4
            input_size = 1000

            [dataset]
            smiles = "zinc.csv"
            fingerprints = "zinc_fp.csv"
            "#,
        );
        let args = RunArgs {
            config: Some(cfg_path),
            input_size: Some(-1),
            url: Some("http://cli:1234".to_string()),
            set_values: vec![
                "samplingSpec.input_size=50".to_string(),
                "samplingSpec.seq_len=128".to_string(),
                "inference.url=http://set:1".to_string(),
            ],
            ..Default::default()
        };
        let cfg = build_config(&args).expect("build ok");

        assert_eq!(cfg.sampling.input_size, -1);
        assert_eq!(cfg.sampling.seq_len, 128);
        assert_eq!(cfg.sampling.sample_size, 4);
        assert_eq!(cfg.inference.url, "http://cli:1234");
    }

    #[test]
    fn metric_set_values_accept_lists() {
        let mut args = args_with_datasets();
        args.set_values.extend([
            "metric.novelty.radius=[3, 4]".to_string(),
            "metric.nearestNeighborCorrelation.top_k=10,20".to_string(),
            "metric.modelability.models=\"elastic net\"".to_string(),
            "metric.validity.enabled=false".to_string(),
        ]);
        let cfg = build_config(&args).expect("build ok");

        assert_eq!(cfg.metrics.novelty.values, vec![3, 4]);
        assert_eq!(cfg.metrics.nearest_neighbor_correlation.values, vec![10, 20]);
        assert_eq!(cfg.metrics.modelability.models, Some(vec!["elastic net".to_string()]));
        assert!(!cfg.metrics.validity.enabled);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut args = args_with_datasets();
        args.set_values.push("metric.fidelity.enabled=true".to_string());
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));

        let cfg_path = write_config_file("unknown.toml", "[samplingSpec]\nbatch = 3\n");
        let args = RunArgs {
            config: Some(cfg_path),
            ..Default::default()
        };
        assert!(matches!(build_config(&args), Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn malformed_set_value_is_rejected() {
        let mut args = args_with_datasets();
        args.set_values.push("samplingSpec.seq_len".to_string());
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));

        let mut args = args_with_datasets();
        args.set_values.push("samplingSpec.seq_len=long".to_string());
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));
    }
}
