use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanSettings,
    pub validation: ValidationSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Files larger than this are skipped.
    pub max_file_size: u64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_file_size: 2_000_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Maximum concurrently in-flight authority calls.
    pub concurrency: usize,
    /// Minimum spacing between authority calls.
    pub rate_limit_ms: u64,
    pub sts_endpoint: String,
    pub region: String,
    pub timeout_secs: u64,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            concurrency: 8,
            rate_limit_ms: 500,
            sts_endpoint: "https://sts.amazonaws.com".to_string(),
            region: "us-east-1".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub directory: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: "results".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert!(config.validation.concurrency > 0);
        assert!(config.scan.max_file_size > 0);
        assert!(config.validation.sts_endpoint.starts_with("https://"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [validation]
            concurrency = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.validation.concurrency, 2);
        assert_eq!(config.validation.region, "us-east-1");
        assert_eq!(config.scan.max_file_size, 2_000_000);
    }
}
