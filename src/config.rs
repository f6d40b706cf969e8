//! # Configuration
//!
//! Deployment settings: where the lab document lives, how to reach the
//! completion API, who receives alert mail, and report defaults. Nothing
//! here changes how reports are laid out.
//!
//! Sources, lowest to highest priority: built-in defaults, a TOML file,
//! then `BIOLEDGER_*` environment variables.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LabError, Result};
use crate::report::ReportFormat;

pub const DEFAULT_CONFIG_FILE: &str = "bioledger.toml";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert AI assistant specializing in Biosafety and bio-related fields. You provide clear, precise, and authoritative responses to questions related to Biosafety protocols, Biohazards, GMOs (Genetically Modified Organisms), biosafety levels (BSL-1 to BSL-4), biosafety cabinets (BSC), and safe laboratory practices. You also offer guidance on research ethics, containment procedures, risk assessments, and biosafety audits in laboratory and industrial settings. Your answers are factual, concise, and based on established biosafety standards such as WHO, NIH, and CDC guidelines. Only answer questions that fall within these domains. If a question is outside this scope, politely guide the user back to biosafety-related topics. Limit your response to 150 words at maximum. Be professional, no need to add formatting elements like * in the response.";

pub const DEFAULT_GREETING: &str = "Namaste! How can I assist you today?";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub chat: ChatConfig,
    pub mail: MailConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("lab.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub model: String,
    pub system_prompt: String,
    pub greeting: String,
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key_env: "GROQ_API".to_string(),
            model: "llama3-8b-8192".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ChatConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        env::var(&self.api_key_env)
            .map_err(|_| LabError::Config(format!("environment variable {} is not set", self.api_key_env)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub sender: String,
    pub recipients: Vec<String>,
    /// Directory that queued alert mails are written to.
    pub outbox_dir: PathBuf,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender: "BioLedger Lab Safety <alerts@bioledger.local>".to_string(),
            recipients: Vec::new(),
            outbox_dir: PathBuf::from("outbox"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub default_format: ReportFormat,
    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_format: ReportFormat::Ieee,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Parse a config from TOML text. Missing keys take their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| LabError::Config(e.to_string()))
    }

    /// Load from `path` if given, else from `bioledger.toml` in the working
    /// directory if it exists, else defaults. Environment overrides apply last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::read_file(p)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::read_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| LabError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&text)
    }

    /// Apply `BIOLEDGER_*` overrides using `lookup` to read variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("BIOLEDGER_STORE") {
            self.store.path = PathBuf::from(path);
        }
        if let Some(url) = lookup("BIOLEDGER_CHAT_BASE_URL") {
            self.chat.base_url = url;
        }
        if let Some(model) = lookup("BIOLEDGER_CHAT_MODEL") {
            self.chat.model = model;
        }
        if let Some(list) = lookup("BIOLEDGER_MAIL_RECIPIENTS") {
            self.mail.recipients = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
    }
}
