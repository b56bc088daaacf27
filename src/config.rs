use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_ENV: &str = "STUDENT_DASHBOARD_CONFIG";
pub const CONFIG_FILE: &str = "student-dashboard.json";
pub const DEFAULT_SOURCE: &str = "ListadoDeEstudiantesGrupo_050.xlsx";

/// Dashboard settings. Every field has a default, so an empty `{}` is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Roster opened on start-up.
    pub source: Option<PathBuf>,
    /// Where the top-N reports are written.
    pub output_dir: PathBuf,
    pub top_n: usize,
    pub top_height_file: String,
    pub top_weight_file: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: None,
            output_dir: PathBuf::from("."),
            top_n: 5,
            top_height_file: "Top5_Estatura.xlsx".to_string(),
            top_weight_file: "Top5_Peso.xlsx".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Resolve the configuration: `$STUDENT_DASHBOARD_CONFIG`, else
    /// `student-dashboard.json` in the working directory, else defaults.
    /// `source_arg` (first command-line argument) overrides `source`; with
    /// neither, the default roster is used when it exists.
    pub fn load(source_arg: Option<PathBuf>) -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None if Path::new(CONFIG_FILE).exists() => Self::from_file(Path::new(CONFIG_FILE))?,
            None => Self::default(),
        };

        if source_arg.is_some() {
            config.source = source_arg;
        } else if config.source.is_none() && Path::new(DEFAULT_SOURCE).exists() {
            config.source = Some(PathBuf::from(DEFAULT_SOURCE));
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn top_height_path(&self) -> PathBuf {
        self.output_dir.join(&self.top_height_file)
    }

    pub fn top_weight_path(&self) -> PathBuf {
        self.output_dir.join(&self.top_weight_file)
    }
}
