use std::path::PathBuf;

use cartweek_core::{DashboardConfig, DataDir, EnrichConfig, EvalSet, SourceConfig};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default host for the HTTP API
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawCartweekConfig {
    #[serde(default)]
    pub data: RawDataConfig,

    #[serde(default)]
    pub source: RawSourceConfig,

    #[serde(default)]
    pub pipeline: RawPipelineConfig,

    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub dashboard: RawDashboardConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawDataConfig {
    /// Directory holding `raw/` and `processed/`
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSourceConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPipelineConfig {
    pub anchor_date: Option<NaiveDate>,
    pub eval_set: Option<EvalSet>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawDashboardConfig {
    pub top_departments: Option<usize>,
    pub top_aisles: Option<usize>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartweekConfig {
    pub data: DataConfig,
    pub source: SourceConfig,
    pub pipeline: EnrichConfig,
    pub server: ServerConfig,
    pub dashboard: DashboardConfig,
}

impl CartweekConfig {
    /// Data directory, unless overridden on the command line
    pub fn data_dir(&self, flag: Option<PathBuf>) -> DataDir {
        DataDir::new(flag.unwrap_or_else(|| self.data.dir.clone()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: cartweek_paths::data_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: cartweek_server::DEFAULT_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = CartweekConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7480);
        assert_eq!(config.pipeline.anchor_date.to_string(), "2023-10-01");
        assert_eq!(config.pipeline.eval_set, EvalSet::Prior);
        assert_eq!(config.dashboard.top_departments, 6);
        assert_eq!(config.dashboard.top_aisles, 5);
        assert!(config.data.dir.ends_with("cartweek"));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = CartweekConfig::default();
        config.data.dir = PathBuf::from("/srv/cartweek");
        config.server.port = 9000;
        config.pipeline.eval_set = EvalSet::Train;

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: CartweekConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.data.dir, PathBuf::from("/srv/cartweek"));
        assert_eq!(parsed.server.port, 9000);
        assert_eq!(parsed.pipeline.eval_set, EvalSet::Train);
    }

    #[test]
    fn test_raw_config_partial_parsing() {
        let toml_str = r#"
[pipeline]
anchor_date = "2024-01-07"

[server]
port = 9000
"#;
        let raw: RawCartweekConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(raw.server.port, Some(9000));
        assert!(raw.server.host.is_none());
        assert_eq!(
            raw.pipeline.anchor_date,
            NaiveDate::from_ymd_opt(2024, 1, 7)
        );
        assert!(raw.pipeline.eval_set.is_none());
        assert!(raw.data.dir.is_none());
    }

    #[test]
    fn test_data_dir_flag_wins() {
        let config = CartweekConfig::default();
        let dir = config.data_dir(Some(PathBuf::from("/tmp/elsewhere")));
        assert_eq!(dir.root(), PathBuf::from("/tmp/elsewhere"));
    }
}
