use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use lakehouse_core::TIMESTAMP_FORMAT;
use lakehouse_generate::GeneratorConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const WAREHOUSE_FILE: &str = "warehouse.sqlite";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("toml decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// `[pipeline]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineSettings {
    pub random_seed: u64,
    pub days_back: i64,
    pub n_users: i64,
    pub avg_events_per_user: i64,
    pub avg_tickets_per_user: f64,
    pub reset_database: bool,
    /// Abort before export when any quality check fails.
    #[serde(default)]
    pub halt_on_quality_failure: bool,
    /// End of the sampling window, `YYYY-MM-DD HH:MM:SS`. Defaults to now.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_ts: Option<String>,
}

/// `[paths]` section. Relative entries are resolved against the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PathSettings {
    pub data_dir: PathBuf,
    pub sql_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            sql_dir: PathBuf::from("sql"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    pipeline: PipelineSettings,
    #[serde(default)]
    paths: PathSettings,
}

/// Fully resolved run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub pipeline: PipelineSettings,
    pub paths: PathSettings,
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_toml_str(&content, base_dir)
    }

    pub fn from_toml_str(content: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        let config = Self {
            pipeline: file.pipeline,
            paths: PathSettings {
                data_dir: resolve(base_dir, &file.paths.data_dir),
                sql_dir: resolve(base_dir, &file.paths.sql_dir),
            },
        };
        config.anchor()?;
        Ok(config)
    }

    /// Parsed `anchor_ts`, if one is configured.
    pub fn anchor(&self) -> Result<Option<NaiveDateTime>, ConfigError> {
        self.pipeline
            .anchor_ts
            .as_deref()
            .map(|value| {
                NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|err| {
                    ConfigError::Invalid(format!(
                        "anchor_ts '{value}' is not YYYY-MM-DD HH:MM:SS: {err}"
                    ))
                })
            })
            .transpose()
    }

    pub fn generator_config(&self) -> Result<GeneratorConfig, ConfigError> {
        let anchor = self.anchor()?.unwrap_or_else(GeneratorConfig::default_anchor);
        Ok(GeneratorConfig {
            seed: self.pipeline.random_seed,
            days_back: self.pipeline.days_back,
            n_users: self.pipeline.n_users,
            avg_events_per_user: self.pipeline.avg_events_per_user,
            avg_tickets_per_user: self.pipeline.avg_tickets_per_user,
            anchor,
        })
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.paths.data_dir.join("raw")
    }

    pub fn export_dir(&self) -> PathBuf {
        self.paths.data_dir.join("exports")
    }

    pub fn warehouse_path(&self) -> PathBuf {
        self.paths.data_dir.join(WAREHOUSE_FILE)
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.paths.sql_dir.join("staging")
    }

    pub fn marts_dir(&self) -> PathBuf {
        self.paths.sql_dir.join("marts")
    }
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[pipeline]
random_seed = 42
days_back = 120
n_users = 1500
avg_events_per_user = 18
avg_tickets_per_user = 0.18
reset_database = true
"#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = PipelineConfig::from_toml_str(MINIMAL, Path::new("/srv/lakehouse"))
            .expect("parse config");
        assert_eq!(config.pipeline.random_seed, 42);
        assert!(!config.pipeline.halt_on_quality_failure);
        assert_eq!(config.anchor().expect("anchor"), None);
        assert_eq!(config.raw_dir(), PathBuf::from("/srv/lakehouse/data/raw"));
        assert_eq!(
            config.warehouse_path(),
            PathBuf::from("/srv/lakehouse/data/warehouse.sqlite")
        );
        assert_eq!(config.marts_dir(), PathBuf::from("/srv/lakehouse/sql/marts"));
    }

    #[test]
    fn explicit_paths_and_anchor() {
        let content = format!(
            "{MINIMAL}halt_on_quality_failure = true\nanchor_ts = \"2024-09-30 18:30:00\"\n\n\
             [paths]\ndata_dir = \"/tmp/out\"\nsql_dir = \"../sql\"\n"
        );
        let config =
            PipelineConfig::from_toml_str(&content, Path::new("/srv/configs")).expect("parse");
        assert!(config.pipeline.halt_on_quality_failure);
        assert_eq!(config.export_dir(), PathBuf::from("/tmp/out/exports"));
        assert_eq!(config.staging_dir(), PathBuf::from("/srv/configs/../sql/staging"));

        let generator = config.generator_config().expect("generator config");
        assert_eq!(generator.seed, 42);
        assert_eq!(
            generator.anchor.format(TIMESTAMP_FORMAT).to_string(),
            "2024-09-30 18:30:00"
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let content = format!("{MINIMAL}worker_threads = 4\n");
        let err = PipelineConfig::from_toml_str(&content, Path::new(".")).unwrap_err();
        assert!(matches!(err, ConfigError::TomlDecode(_)));
    }

    #[test]
    fn missing_keys_are_rejected() {
        let err = PipelineConfig::from_toml_str("[pipeline]\nrandom_seed = 1\n", Path::new("."))
            .unwrap_err();
        assert!(matches!(err, ConfigError::TomlDecode(_)));
    }

    #[test]
    fn malformed_anchor_is_rejected() {
        let content = format!("{MINIMAL}anchor_ts = \"2024-09-30T18:30\"\n");
        let err = PipelineConfig::from_toml_str(&content, Path::new(".")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
