//! Configuration and decoder file loading

use anyhow::{Context, Result};
use decoder_forest::{DecoderDefinition, LoaderConfig, OffsetPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    /// Decoder files, loaded in this order
    #[serde(default)]
    pub decoder_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Txt,
    Json,
}

/// Where a decoder's regex starts matching, as written in decoder files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegexOffset {
    AfterParent,
    AfterPrematch,
    AfterRegex,
}

impl From<RegexOffset> for OffsetPolicy {
    fn from(offset: RegexOffset) -> Self {
        match offset {
            // Only continuing after a previous regex chains two decoders
            RegexOffset::AfterRegex => OffsetPolicy::AfterPrevRegex,
            RegexOffset::AfterParent | RegexOffset::AfterPrematch => OffsetPolicy::None,
        }
    }
}

/// One `[[decoder]]` table of a decoder file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DecoderEntry {
    pub name: String,
    pub parent: Option<String>,
    /// Program name pattern; its presence scopes the decoder
    pub program_name: Option<String>,
    pub prematch: Option<String>,
    pub regex: Option<String>,
    /// External decoder plugin name
    pub plugin_decoder: Option<String>,
    /// First-time-seen field list
    pub fts: Option<String>,
    pub offset: Option<RegexOffset>,
}

#[derive(Debug, Deserialize)]
struct DecoderFile {
    #[serde(default)]
    decoder: Vec<DecoderEntry>,
}

/// A decoder entry that cannot be turned into a definition
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    #[error("Decoder entry #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("Decoder '{name}' has an empty parent reference")]
    EmptyParent { name: String },

    #[error("Decoder '{name}' declares an empty {field} pattern")]
    EmptyPattern { name: String, field: &'static str },
}

impl DecoderEntry {
    /// Convert the entry into the definition the catalog attaches
    pub fn to_definition(&self, index: usize) -> std::result::Result<DecoderDefinition, EntryError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(EntryError::EmptyName { index });
        }

        let patterns = [
            ("program_name", &self.program_name),
            ("prematch", &self.prematch),
            ("regex", &self.regex),
            ("plugin_decoder", &self.plugin_decoder),
            ("fts", &self.fts),
        ];
        for (field, value) in patterns {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(EntryError::EmptyPattern {
                    name: name.to_string(),
                    field,
                });
            }
        }

        let mut definition = DecoderDefinition::new(name)
            .with_program_name(self.program_name.is_some())
            .with_prematch(self.prematch.is_some())
            .with_regex(self.regex.is_some())
            .with_external_matcher(self.plugin_decoder.is_some())
            .with_first_time_seen(self.fts.is_some())
            .with_offset_policy(self.offset.map(OffsetPolicy::from).unwrap_or_default());

        if let Some(parent) = &self.parent {
            let parent = parent.trim();
            if parent.is_empty() {
                return Err(EntryError::EmptyParent {
                    name: name.to_string(),
                });
            }
            definition = definition.with_parent(parent);
        }

        Ok(definition)
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

/// Load the decoder definitions of one file, in declaration order
pub fn load_decoder_file(path: &Path) -> Result<Vec<DecoderDefinition>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read decoder file: {:?}", path))?;

    let definitions = parse_decoders(&content)
        .with_context(|| format!("Invalid decoder file: {:?}", path))?;

    log::info!("Loaded {} decoder(s) from {:?}", definitions.len(), path);
    Ok(definitions)
}

/// Parse decoder definitions from TOML text
pub fn parse_decoders(content: &str) -> Result<Vec<DecoderDefinition>> {
    let file: DecoderFile = toml::from_str(content).context("Failed to parse decoder TOML")?;

    let definitions = file
        .decoder
        .iter()
        .enumerate()
        .map(|(index, entry)| entry.to_definition(index))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(definitions)
}
