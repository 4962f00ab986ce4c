use std::collections::HashMap;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::SignatureError;

pub const HEADER_DELIMITER: char = '|';
pub const UNKNOWN_DISEASE: &str = "Unknown";
pub const SIGNATURE_NAME_DELIMITER: char = '-';
pub const SIGNATURE_NAME_PREFIX: &str = "SBS";
pub const SAMPLE_SUFFIX_DELIMITER: char = '_';

const MAX_SIGNATURE_NAME_COMPONENTS: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Html => write!(f, "html"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Disease {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Disease {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: None,
        }
    }

    pub fn with_code(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: Some(code.into()),
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN_DISEASE)
    }
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{code}{HEADER_DELIMITER}{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// One matrix column: a sample name, its disease, and a sparse map of
/// signature contributions. A missing key means a contribution of zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub name: String,
    pub disease: Disease,
    pub contributions: HashMap<String, u64>,
}

impl Sample {
    pub fn new(name: impl Into<String>, disease: Disease) -> Self {
        Self {
            name: name.into(),
            disease,
            contributions: HashMap::new(),
        }
    }

    pub fn from_header(header: &str) -> Result<Self, SignatureError> {
        let (name, disease) = parse_header(header)?;
        Ok(Self::new(name, disease))
    }

    pub fn contribution(&self, signature: &str) -> u64 {
        self.contributions.get(signature).copied().unwrap_or(0)
    }
}

/// Splits a column header into the sample name and its disease label.
///
/// Only the first `|` separates; everything after it is kept verbatim as the
/// disease name. Headers without a delimiter get the `Unknown` disease.
pub fn parse_header(header: &str) -> Result<(String, Disease), SignatureError> {
    if header.is_empty() {
        return Err(SignatureError::EmptyHeader);
    }

    match header.split_once(HEADER_DELIMITER) {
        Some((name, disease)) => Ok((name.to_string(), Disease::new(disease))),
        None => Ok((header.to_string(), Disease::unknown())),
    }
}

/// Rewrites `<family>-<position>[-<suffix>]` to `SBS<position>`, stripping
/// leading zeros from the position.
pub fn normalize_signature_name(raw: &str) -> Result<String, SignatureError> {
    normalize_signature_name_with_prefix(raw, SIGNATURE_NAME_PREFIX)
}

pub fn normalize_signature_name_with_prefix(
    raw: &str,
    prefix: &str,
) -> Result<String, SignatureError> {
    let mut components = raw.splitn(MAX_SIGNATURE_NAME_COMPONENTS + 1, SIGNATURE_NAME_DELIMITER);
    let position = components
        .nth(1)
        .ok_or_else(|| SignatureError::InvalidSignatureName(raw.to_string()))?;

    let position = position.trim_start_matches('0');
    if position.is_empty() {
        return Err(SignatureError::InvalidSignatureName(raw.to_string()));
    }

    Ok(format!("{prefix}{position}"))
}

/// Drops the trailing `_<id>` segment of a raw sample name.
pub fn strip_sample_suffix(raw: &str) -> Result<&str, SignatureError> {
    raw.rsplit_once(SAMPLE_SUFFIX_DELIMITER)
        .map(|(name, _)| name)
        .ok_or_else(|| SignatureError::InvalidSampleName(raw.to_string()))
}
