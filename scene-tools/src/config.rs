//! Tool configuration loaded from an optional JSON file.
use anyhow::{Context, Result};
use constants::query::{DEFAULT_HISTOGRAM_BINS, DEFAULT_QUERY_THRESHOLD, DEFAULT_TOP_FRACTION};
use embedding_query::Selection;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    #[default]
    Threshold,
    TopFraction,
}

/// Settings shared by all commands. Missing fields fall back to the crate defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Absolute similarity threshold for threshold mode.
    pub threshold: f32,
    /// Cut-off fraction for top-fraction mode.
    pub top_fraction: f32,
    pub histogram_bins: usize,
    pub selection_mode: SelectionMode,
    /// Where exported meshes go; defaults to the input file's directory.
    pub output_dir: Option<PathBuf>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_QUERY_THRESHOLD,
            top_fraction: DEFAULT_TOP_FRACTION,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            selection_mode: SelectionMode::default(),
            output_dir: None,
        }
    }
}

impl ToolConfig {
    /// Read the config file if one was given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn selection(&self) -> Selection {
        match self.selection_mode {
            SelectionMode::Threshold => Selection::Threshold(self.threshold),
            SelectionMode::TopFraction => Selection::TopFraction(self.top_fraction),
        }
    }

    /// Output directory, falling back to the directory holding `input`.
    pub fn output_dir_for(&self, input: &Path) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."))
                .to_path_buf()
        })
    }
}
