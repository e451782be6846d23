use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cartweek_core::{DashboardConfig, EnrichConfig, SourceConfig, default_anchor_date};

use super::types::{
    CartweekConfig, DEFAULT_HOST, DataConfig, RawCartweekConfig, RawDashboardConfig,
    RawDataConfig, RawPipelineConfig, RawServerConfig, RawSourceConfig, ServerConfig,
};

/// Environment variable that moves the project config directory
pub const PROJECT_CONFIG_DIR_ENV: &str = "CARTWEEK_PROJECT_CONFIG_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<CartweekConfig> {
        Self::load_from(
            Some(&Self::user_config_path()),
            &Self::project_config_path(),
        )
    }

    /// Load from explicit file locations; missing files are skipped
    pub fn load_from(user_path: Option<&Path>, project_path: &Path) -> Result<CartweekConfig> {
        let mut raw = RawCartweekConfig::default();

        // Layer 1: User config
        if let Some(user_path) = user_path
            && user_path.exists()
        {
            raw = Self::merge_raw(raw, Self::read(user_path)?);
        }

        // Layer 2: Project config
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read(project_path)?);
        }

        Ok(Self::finalize(raw))
    }

    fn read(path: &Path) -> Result<RawCartweekConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Get user config path (`$XDG_CONFIG_HOME/cartweek/config.toml`)
    pub fn user_config_path() -> PathBuf {
        cartweek_paths::config_dir().join("config.toml")
    }

    /// Get project config path
    /// Can be overridden with CARTWEEK_PROJECT_CONFIG_DIR
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var(PROJECT_CONFIG_DIR_ENV) {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".cartweek/config.toml")
        }
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawCartweekConfig, overlay: RawCartweekConfig) -> RawCartweekConfig {
        RawCartweekConfig {
            data: RawDataConfig {
                dir: overlay.data.dir.or(base.data.dir),
            },
            source: RawSourceConfig {
                base_url: overlay.source.base_url.or(base.source.base_url),
            },
            pipeline: RawPipelineConfig {
                anchor_date: overlay.pipeline.anchor_date.or(base.pipeline.anchor_date),
                eval_set: overlay.pipeline.eval_set.or(base.pipeline.eval_set),
            },
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
            },
            dashboard: RawDashboardConfig {
                top_departments: overlay
                    .dashboard
                    .top_departments
                    .or(base.dashboard.top_departments),
                top_aisles: overlay.dashboard.top_aisles.or(base.dashboard.top_aisles),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawCartweekConfig) -> CartweekConfig {
        let dashboard = DashboardConfig::default();
        CartweekConfig {
            data: match raw.data.dir {
                Some(dir) => DataConfig { dir },
                None => DataConfig::default(),
            },
            source: raw
                .source
                .base_url
                .map(SourceConfig::new)
                .unwrap_or_default(),
            pipeline: EnrichConfig {
                anchor_date: raw.pipeline.anchor_date.unwrap_or_else(default_anchor_date),
                eval_set: raw.pipeline.eval_set.unwrap_or_default(),
            },
            server: ServerConfig {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.server.port.unwrap_or(cartweek_server::DEFAULT_PORT),
            },
            dashboard: DashboardConfig {
                top_departments: raw
                    .dashboard
                    .top_departments
                    .unwrap_or(dashboard.top_departments),
                top_aisles: raw.dashboard.top_aisles.unwrap_or(dashboard.top_aisles),
            },
        }
    }
}
