use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::domain::SIGNATURE_NAME_PREFIX;
use crate::error::SignatureError;

pub const DEFAULT_CONFIG_FILE: &str = "kira-sig.json";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub signature_prefix: Option<String>,
    #[serde(default)]
    pub metadata: Option<MetadataEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MetadataEntry {
    #[serde(default)]
    pub sample_column: Option<String>,
    #[serde(default)]
    pub disease_code_column: Option<String>,
    #[serde(default)]
    pub disease_name_column: Option<String>,
    #[serde(default)]
    pub delimiter: Option<String>,
}

/// Column names and delimiter of the sample metadata table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataColumns {
    pub sample: String,
    pub disease_code: String,
    pub disease_name: String,
    pub delimiter: u8,
}

impl Default for MetadataColumns {
    fn default() -> Self {
        Self {
            sample: "sample_name".to_string(),
            disease_code: "sj_diseases".to_string(),
            disease_name: "sj_long_disease_name".to_string(),
            delimiter: b',',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub signature_prefix: String,
    pub metadata: MetadataColumns,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            schema_version: 1,
            signature_prefix: SIGNATURE_NAME_PREFIX.to_string(),
            metadata: MetadataColumns::default(),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path`, or `kira-sig.json` from the working directory when no
    /// path is given. A missing default file resolves to the defaults.
    pub fn resolve(path: Option<&Utf8Path>) -> Result<ResolvedConfig, SignatureError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Utf8PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.as_std_path().exists() {
            return Ok(ResolvedConfig::default());
        }

        let content = fs::read_to_string(config_path.as_std_path())
            .map_err(|_| SignatureError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| SignatureError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, SignatureError> {
        let defaults = ResolvedConfig::default();
        let schema_version = config.schema_version.unwrap_or(defaults.schema_version);

        let signature_prefix = config
            .signature_prefix
            .unwrap_or(defaults.signature_prefix);

        let metadata = match config.metadata {
            Some(entry) => {
                let base = defaults.metadata;
                let delimiter = match entry.delimiter {
                    Some(value) => parse_delimiter(&value)?,
                    None => base.delimiter,
                };
                MetadataColumns {
                    sample: entry.sample_column.unwrap_or(base.sample),
                    disease_code: entry.disease_code_column.unwrap_or(base.disease_code),
                    disease_name: entry.disease_name_column.unwrap_or(base.disease_name),
                    delimiter,
                }
            }
            None => defaults.metadata,
        };

        Ok(ResolvedConfig {
            schema_version,
            signature_prefix,
            metadata,
        })
    }
}

/// Accepts a single ASCII character, or the escapes `\t` and `tab`.
pub fn parse_delimiter(value: &str) -> Result<u8, SignatureError> {
    if matches!(value, "\\t" | "tab") {
        return Ok(b'\t');
    }
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(SignatureError::InvalidConfig(format!(
            "delimiter must be a single ASCII character, got '{value}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn empty_config_resolves_to_defaults() {
        let resolved = ConfigLoader::resolve_config(Config::default()).unwrap();
        assert_eq!(resolved, ResolvedConfig::default());
    }

    #[test]
    fn parse_delimiters() {
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert_eq!(parse_delimiter("\t").unwrap(), b'\t');
        assert_eq!(parse_delimiter("\\t").unwrap(), b'\t');
        assert_matches!(parse_delimiter(";;"), Err(SignatureError::InvalidConfig(_)));
    }
}
