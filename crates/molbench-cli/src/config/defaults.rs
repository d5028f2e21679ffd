pub struct DefaultsConfig {
    pub output_path: String,
    pub seq_len: usize,
    pub sample_size: usize,
    pub input_size: i64,
    pub smiles_column: String,
    pub url: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_interval_secs: u64,
    pub metric_enabled: bool,
    pub radius: Vec<i64>,
    pub top_k: Vec<i64>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_path: "results".to_string(),
            seq_len: 512,
            sample_size: 10,
            input_size: 0,
            smiles_column: "canonical_smiles".to_string(),
            url: "http://localhost:8000".to_string(),
            timeout_secs: 300,
            max_attempts: 30,
            retry_interval_secs: 10,
            metric_enabled: true,
            radius: vec![1, 2, 5],
            top_k: vec![50, 100, 500],
        }
    }
}
