//! Configuration documents and credential resolution
//!
//! Two concerns live here:
//! - The class configuration document (organization, department, class and
//!   task name lists) that populates selection inputs. Read at startup,
//!   rewritten wholesale on edits.
//! - External-service credential resolution with ENV → TOML priority.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Class configuration document
///
/// Persisted as TOML. Edits replace the whole document; there is no
/// per-field merge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassConfig {
    /// Organization name shown in report headers
    #[serde(default = "default_university")]
    pub university: String,

    /// Department name shown in report headers
    #[serde(default = "default_department")]
    pub department: String,

    /// Class group names offered in selection inputs
    #[serde(default = "default_classes")]
    pub classes: Vec<String>,

    /// Task names offered in selection inputs
    #[serde(default = "default_tasks")]
    pub tasks: Vec<String>,
}

fn default_university() -> String {
    "北海道大学".to_string()
}

fn default_department() -> String {
    "大学院メディア・コミュニケーション研究院".to_string()
}

fn default_classes() -> Vec<String> {
    vec![
        "英語特定技能演習（発信）".to_string(),
        "英語特定技能演習（受信）".to_string(),
        "英語I".to_string(),
        "英語II".to_string(),
    ]
}

fn default_tasks() -> Vec<String> {
    vec!["課題1".to_string(), "課題2".to_string(), "課題3".to_string()]
}

impl Default for ClassConfig {
    fn default() -> Self {
        Self {
            university: default_university(),
            department: default_department(),
            classes: default_classes(),
            tasks: default_tasks(),
        }
    }
}

impl ClassConfig {
    /// Load the document, falling back to built-in defaults when the file
    /// does not exist yet
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "Class config not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse class config failed: {}", e)))
    }

    /// Rewrite the document wholesale
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Serialize class config failed: {}", e)))?;
        std::fs::write(path, content)?;
        info!(path = %path.display(), "Class config saved");
        Ok(())
    }
}

/// Default class config location: `<config dir>/sesa/class_config.toml`
pub fn default_class_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("sesa").join("class_config.toml"))
        .unwrap_or_else(|| PathBuf::from("class_config.toml"))
}

/// Optional credential entries in the service TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialFile {
    pub azure_speech_region: Option<String>,
    pub azure_speech_key: Option<String>,
    pub openai_api_key: Option<String>,
}

/// Resolved external-service credentials
///
/// Azure credentials are required for any assessment; the OpenAI key is
/// optional and its absence degrades feedback to a placeholder.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub azure_region: String,
    pub azure_key: String,
    pub openai_api_key: Option<String>,
}

impl Credentials {
    /// Resolve credentials with ENV → TOML priority
    ///
    /// Returns a Config error when Azure credentials are missing from both
    /// sources; nothing else in the pipeline can proceed without them.
    pub fn resolve(toml_path: &Path) -> Result<Self> {
        let file: CredentialFile = if toml_path.exists() {
            let content = std::fs::read_to_string(toml_path)?;
            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Parse credentials TOML failed: {}", e)))?
        } else {
            CredentialFile::default()
        };

        let azure_region = resolve_entry("AZURE_SPEECH_REGION", file.azure_speech_region);
        let azure_key = resolve_entry("AZURE_SPEECH_KEY", file.azure_speech_key);
        let openai_api_key = resolve_entry("OPENAI_API_KEY", file.openai_api_key);

        let (azure_region, azure_key) = match (azure_region, azure_key) {
            (Some(region), Some(key)) => (region, key),
            _ => {
                return Err(Error::Config(
                    "AZURE_SPEECH_REGION / AZURE_SPEECH_KEY not configured. \
                     Set the environment variables or add azure_speech_region / \
                     azure_speech_key to the service TOML file."
                        .to_string(),
                ))
            }
        };

        if openai_api_key.is_none() {
            warn!("OPENAI_API_KEY not configured - narrative feedback will be skipped");
        }

        Ok(Self {
            azure_region,
            azure_key,
            openai_api_key,
        })
    }
}

/// ENV value wins over the TOML value; empty strings count as unset
fn resolve_entry(env_name: &str, toml_value: Option<String>) -> Option<String> {
    if let Ok(value) = std::env::var(env_name) {
        if !value.trim().is_empty() {
            return Some(value);
        }
    }
    toml_value.filter(|v| !v.trim().is_empty())
}

/// Default service TOML location: `<config dir>/sesa/sesa-pa.toml`
pub fn default_service_toml_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("sesa").join("sesa-pa.toml"))
        .unwrap_or_else(|| PathBuf::from("sesa-pa.toml"))
}
