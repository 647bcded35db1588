use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    demographics::{DemographicTables, TableFiles},
    engine::EngineSettings,
    synthesizer::GenerationPolicy,
};

fn default_start_year() -> i32 {
    1950
}

fn default_end_year() -> i32 {
    2120
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_histogram_start() -> i32 {
    1950
}

fn default_histogram_end() -> i32 {
    2110
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Omit for a fresh tree on every run.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_start_year")]
    pub start_year: i32,
    #[serde(default = "default_end_year")]
    pub end_year: i32,
    /// Relative paths resolve against the scenario file's directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub tables: TableFiles,
    #[serde(default)]
    pub policy: GenerationPolicy,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_histogram_start")]
    pub histogram_start: i32,
    #[serde(default = "default_histogram_end")]
    pub histogram_end: i32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            histogram_start: default_histogram_start(),
            histogram_end: default_histogram_end(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let mut scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        if scenario.data_dir.is_relative() {
            let scenario_dir = path.parent().unwrap_or_else(|| Path::new("."));
            scenario.data_dir = scenario_dir.join(&scenario.data_dir);
        }
        scenario.validate()?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.start_year <= self.end_year,
            "start_year {} is after end_year {}",
            self.start_year,
            self.end_year
        );
        ensure!(
            self.report.histogram_start <= self.report.histogram_end,
            "histogram range {}..{} is empty",
            self.report.histogram_start,
            self.report.histogram_end
        );
        Ok(())
    }

    pub fn seed(&self, override_seed: Option<u64>) -> Option<u64> {
        override_seed.or(self.seed)
    }

    pub fn years(&self, start: Option<i32>, end: Option<i32>) -> (i32, i32) {
        (start.unwrap_or(self.start_year), end.unwrap_or(self.end_year))
    }

    pub fn data_dir(&self, override_dir: Option<PathBuf>) -> PathBuf {
        override_dir.unwrap_or_else(|| self.data_dir.clone())
    }

    pub fn load_tables(&self, data_dir: &Path) -> Result<DemographicTables> {
        DemographicTables::load(data_dir, &self.tables)
            .with_context(|| format!("Failed to load demographic tables for '{}'", self.name))
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            seed: self.seed,
            start_year: self.start_year,
            end_year: self.end_year,
            policy: self.policy,
        }
    }
}
