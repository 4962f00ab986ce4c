use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SignatureError {
    #[error("invalid header: empty input")]
    EmptyHeader,

    #[error("missing headers in {0}")]
    MissingHeaders(String),

    #[error("invalid signature name: {0}")]
    #[diagnostic(help("signature identifiers look like `<family>-<position>`, e.g. `SBS-05`"))]
    InvalidSignatureName(String),

    #[error("invalid sample name '{0}'")]
    #[diagnostic(help("raw sample names carry a trailing `_<id>` suffix"))]
    InvalidSampleName(String),

    #[error("invalid contribution '{value}' for signature {signature} (line {line})")]
    InvalidContribution {
        value: String,
        signature: String,
        line: u64,
    },

    #[error("row for signature {signature} has {found} values, expected {expected} (line {line})")]
    RowLength {
        signature: String,
        expected: usize,
        found: usize,
        line: u64,
    },

    #[error("metadata table is missing column '{0}'")]
    MissingMetadataColumn(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(Utf8PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("malformed delimited input: {0}")]
    Csv(String),

    #[error("failed to serialize payload: {0}")]
    Serialize(String),

    #[error("failed to render template: {0}")]
    Render(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl SignatureError {
    pub(crate) fn csv(err: csv::Error) -> Self {
        SignatureError::Csv(err.to_string())
    }
}
