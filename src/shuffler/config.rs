use crate::error::{Result, ShufflerError};
use crate::store::StorageProvider;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_CARD_SUMMARY: &str = "Enter Card Summary";
const DEFAULT_SECTION_SUMMARY: &str = "Summary Description";

/// Configuration for a project, stored in `<project>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ShufflerConfig {
    /// Extensions to look for when importing directories (e.g. ".md", ".txt")
    #[serde(default = "default_import_ext")]
    pub import_ext: Vec<String>,

    /// Summary given to cards created without one
    #[serde(default = "default_card_summary")]
    pub card_summary: String,

    /// Summary given to sections created without one
    #[serde(default = "default_section_summary")]
    pub section_summary: String,
}

fn default_import_ext() -> Vec<String> {
    vec![".md".to_string(), ".txt".to_string()]
}

fn default_card_summary() -> String {
    DEFAULT_CARD_SUMMARY.to_string()
}

fn default_section_summary() -> String {
    DEFAULT_SECTION_SUMMARY.to_string()
}

impl Default for ShufflerConfig {
    fn default() -> Self {
        Self {
            import_ext: default_import_ext(),
            card_summary: default_card_summary(),
            section_summary: default_section_summary(),
        }
    }
}

impl ShufflerConfig {
    pub const KEYS: [&'static str; 3] = ["import-ext", "card-summary", "section-summary"];

    pub fn path(project_dir: &Path) -> PathBuf {
        project_dir.join(CONFIG_FILENAME)
    }

    /// Load config from the project directory, or return defaults if not found
    pub fn load<S: StorageProvider>(storage: &S, project_dir: &Path) -> Result<Self> {
        let config_path = Self::path(project_dir);
        if !storage.exists(&config_path) {
            return Ok(Self::default());
        }

        let content = storage.get(&config_path)?;
        let config: ShufflerConfig =
            serde_json::from_str(&content).map_err(ShufflerError::Serialization)?;
        Ok(config)
    }

    pub fn save<S: StorageProvider>(&self, storage: &S, project_dir: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(ShufflerError::Serialization)?;
        storage.put(&Self::path(project_dir), &content)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "import-ext" => Some(self.import_ext.join(",")),
            "card-summary" => Some(self.card_summary.clone()),
            "section-summary" => Some(self.section_summary.clone()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match key {
            "import-ext" => {
                let exts: Vec<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|ext| !ext.is_empty())
                    .map(normalize_ext)
                    .collect();
                if exts.is_empty() {
                    return Err("import-ext needs at least one extension".to_string());
                }
                self.import_ext = exts;
            }
            "card-summary" => self.card_summary = value.to_string(),
            "section-summary" => self.section_summary = value.to_string(),
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }

    /// Whether a file path carries one of the import extensions (case-insensitive).
    pub fn is_importable(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = format!(".{}", ext.to_lowercase());
        self.import_ext.iter().any(|e| e.to_lowercase() == ext)
    }
}

fn normalize_ext(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}
