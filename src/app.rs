use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use serde::Serialize;
use tracing::info;

use crate::config::ResolvedConfig;
use crate::domain::OutputFormat;
use crate::error::SignatureError;
use crate::fs_util::{write_atomic, write_bytes_atomic};
use crate::matrix::read_signature_activities_from_path;
use crate::payload::{Payload, generator, render_html, render_json};
use crate::prepare::{ActivityMerger, JoinReport, read_sample_info_from_path};
use crate::reconcile::normalize_data_with_prefix;

#[derive(Debug, Clone)]
pub struct VisualizeRequest {
    pub query: Utf8PathBuf,
    pub reference: Utf8PathBuf,
    pub output: Utf8PathBuf,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisualizeResult {
    pub output: String,
    pub format: String,
    pub generator: String,
    pub signatures: usize,
    pub reference_samples: usize,
    pub query_samples: usize,
    pub generated_at: String,
}

#[derive(Debug, Clone)]
pub struct PrepareRequest {
    pub sample_info: Utf8PathBuf,
    pub activities: Vec<Utf8PathBuf>,
    /// `None` writes the matrix to stdout.
    pub output: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrepareResult {
    pub output: Option<String>,
    pub inputs: usize,
    pub samples: usize,
    pub signatures: usize,
    pub unmatched: Vec<String>,
    pub generated_at: String,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// Forwards progress events to the tracing subscriber.
pub struct LogSink;

impl ProgressSink for LogSink {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => info!(elapsed_ms = elapsed.as_millis() as u64, "{}", event.message),
            None => info!("{}", event.message),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct App {
    config: ResolvedConfig,
}

impl App {
    pub fn new(config: ResolvedConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Reads both cohorts, reconciles them and writes the rendered payload.
    pub fn visualize(
        &self,
        request: VisualizeRequest,
        sink: &dyn ProgressSink,
    ) -> Result<VisualizeResult, SignatureError> {
        let start = Instant::now();

        sink.event(ProgressEvent {
            message: format!("phase=Read; reference {}", request.reference),
            elapsed: None,
        });
        let reference = read_signature_activities_from_path(&request.reference)?;

        sink.event(ProgressEvent {
            message: format!("phase=Read; query {}", request.query),
            elapsed: None,
        });
        let query = read_signature_activities_from_path(&request.query)?;

        sink.event(ProgressEvent {
            message: "phase=Reconcile; aligning signatures".to_string(),
            elapsed: Some(start.elapsed()),
        });
        let dataset =
            normalize_data_with_prefix(&reference, &query, &self.config.signature_prefix)?;

        let signatures = dataset.signatures.len();
        let reference_samples = dataset.reference.len();
        let query_samples = dataset.query.len();

        let payload = Payload::from(dataset);
        let generator = generator();
        let rendered = match request.format {
            OutputFormat::Html => render_html(&payload, &generator)?,
            OutputFormat::Json => render_json(&payload)?,
        };

        sink.event(ProgressEvent {
            message: format!("phase=Write; {}", request.output),
            elapsed: Some(start.elapsed()),
        });
        write_bytes_atomic(&request.output, rendered.as_bytes())?;

        sink.event(ProgressEvent {
            message: "phase=Done".to_string(),
            elapsed: Some(start.elapsed()),
        });

        Ok(VisualizeResult {
            output: request.output.to_string(),
            format: request.format.to_string(),
            generator,
            signatures,
            reference_samples,
            query_samples,
            generated_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Merges raw activity files and joins them against the sample metadata.
    pub fn prepare(
        &self,
        request: PrepareRequest,
        sink: &dyn ProgressSink,
    ) -> Result<PrepareResult, SignatureError> {
        let start = Instant::now();

        sink.event(ProgressEvent {
            message: format!("phase=Read; sample info {}", request.sample_info),
            elapsed: None,
        });
        let diseases = read_sample_info_from_path(&request.sample_info, &self.config.metadata)?;

        let mut merger = ActivityMerger::new();
        for path in &request.activities {
            sink.event(ProgressEvent {
                message: format!("phase=Read; activities {path}"),
                elapsed: Some(start.elapsed()),
            });
            merger.add_activities_from_path(path)?;
        }

        sink.event(ProgressEvent {
            message: "phase=Join; writing consolidated matrix".to_string(),
            elapsed: Some(start.elapsed()),
        });
        let report = match &request.output {
            Some(path) => {
                let mut report = JoinReport::default();
                write_atomic(path, |writer| {
                    report = merger.write_matrix(&diseases, writer)?;
                    Ok(())
                })?;
                report
            }
            None => merger.write_matrix(&diseases, std::io::stdout().lock())?,
        };

        sink.event(ProgressEvent {
            message: "phase=Done".to_string(),
            elapsed: Some(start.elapsed()),
        });

        Ok(PrepareResult {
            output: request.output.as_ref().map(|path| path.to_string()),
            inputs: request.activities.len(),
            samples: report.samples,
            signatures: report.signatures,
            unmatched: report.unmatched,
            generated_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}
