use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::{Read, Write};

use camino::Utf8Path;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::MetadataColumns;
use crate::domain::{Disease, HEADER_DELIMITER, strip_sample_suffix};
use crate::error::SignatureError;
use crate::fs_util::open_input;
use crate::matrix::{ROW_LABEL, parse_contribution, record_line, split_row, tsv_reader};

/// Reads the sample metadata table into `sample name -> disease`.
pub fn read_sample_info<R: Read>(
    reader: R,
    columns: &MetadataColumns,
) -> Result<HashMap<String, Disease>, SignatureError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(columns.delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers().map_err(SignatureError::csv)?.clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| SignatureError::MissingMetadataColumn(name.to_string()))
    };
    let sample_idx = position(columns.sample.as_str())?;
    let code_idx = position(columns.disease_code.as_str())?;
    let name_idx = position(columns.disease_name.as_str())?;

    let mut diseases = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(SignatureError::csv)?;
        let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();
        diseases.insert(
            field(sample_idx),
            Disease::with_code(field(name_idx), field(code_idx)),
        );
    }

    Ok(diseases)
}

pub fn read_sample_info_from_path(
    path: &Utf8Path,
    columns: &MetadataColumns,
) -> Result<HashMap<String, Disease>, SignatureError> {
    let diseases = read_sample_info(open_input(path)?, columns)?;
    debug!(path = %path, samples = diseases.len(), "read sample metadata");
    Ok(diseases)
}

/// Outcome of writing a consolidated matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    pub samples: usize,
    pub signatures: usize,
    pub unmatched: Vec<String>,
}

/// Accumulates raw per-sample activity files into one matrix.
///
/// Contributions are keyed by the raw sample name as it appears in the input
/// headers, so a raw name repeated across files merges into one column. The
/// suffix-stripped name is used only for the metadata lookup and the emitted
/// header.
#[derive(Debug, Default)]
pub struct ActivityMerger {
    signatures: BTreeSet<String>,
    samples: BTreeMap<String, HashMap<String, u64>>,
}

impl ActivityMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_activities<R: Read>(&mut self, reader: R) -> Result<(), SignatureError> {
        self.add_labeled(reader, "input")
    }

    pub fn add_activities_from_path(&mut self, path: &Utf8Path) -> Result<(), SignatureError> {
        self.add_labeled(open_input(path)?, path.as_str())?;
        debug!(
            path = %path,
            samples = self.samples.len(),
            signatures = self.signatures.len(),
            "merged activities"
        );
        Ok(())
    }

    fn add_labeled<R: Read>(&mut self, reader: R, source: &str) -> Result<(), SignatureError> {
        let mut records = tsv_reader(reader).into_records();

        let headers = records
            .next()
            .transpose()
            .map_err(SignatureError::csv)?
            .ok_or_else(|| SignatureError::MissingHeaders(source.to_string()))?;
        let sample_names = headers.iter().skip(1).map(str::to_string).collect::<Vec<_>>();

        // A file is merged only once every row has parsed. Samples exist only
        // through data rows, so a header-only file adds no columns.
        let mut signatures = BTreeSet::new();
        let mut samples = BTreeMap::<String, HashMap<String, u64>>::new();

        for record in records {
            let record = record.map_err(SignatureError::csv)?;
            let line = record_line(&record);
            let (signature, values) = split_row(&record, sample_names.len(), line)?;

            for (name, value) in sample_names.iter().zip(values) {
                let contribution = parse_contribution(value, signature, line)?;
                samples
                    .entry(name.clone())
                    .or_default()
                    .insert(signature.to_string(), contribution);
            }

            signatures.insert(signature.to_string());
        }

        self.signatures.extend(signatures);
        for (name, contributions) in samples {
            self.samples.entry(name).or_default().extend(contributions);
        }

        Ok(())
    }

    pub fn signatures(&self) -> impl Iterator<Item = &str> {
        self.signatures.iter().map(String::as_str)
    }

    pub fn sample_names(&self) -> impl Iterator<Item = &str> {
        self.samples.keys().map(String::as_str)
    }

    /// Builds the disease-annotated header row. Every raw name is stripped
    /// before anything is returned, so a malformed name fails the whole join.
    pub fn headers(
        &self,
        diseases: &HashMap<String, Disease>,
    ) -> Result<(Vec<String>, Vec<String>), SignatureError> {
        let mut headers = Vec::with_capacity(self.samples.len() + 1);
        let mut unmatched = Vec::new();
        headers.push(ROW_LABEL.to_string());

        for raw_name in self.samples.keys() {
            let name = strip_sample_suffix(raw_name)?;
            match diseases.get(name) {
                Some(disease) => headers.push(format!("{name}{HEADER_DELIMITER}{disease}")),
                None => {
                    headers.push(name.to_string());
                    unmatched.push(name.to_string());
                }
            }
        }

        Ok((headers, unmatched))
    }

    pub fn write_matrix<W: Write>(
        &self,
        diseases: &HashMap<String, Disease>,
        writer: W,
    ) -> Result<JoinReport, SignatureError> {
        let (headers, unmatched) = self.headers(diseases)?;
        for name in &unmatched {
            warn!("unknown sample name '{name}'");
        }

        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);
        writer.write_record(&headers).map_err(SignatureError::csv)?;

        for signature in &self.signatures {
            let mut row = Vec::with_capacity(self.samples.len() + 1);
            row.push(signature.clone());
            row.extend(self.samples.values().map(|contributions| {
                contributions
                    .get(signature)
                    .copied()
                    .unwrap_or(0)
                    .to_string()
            }));
            writer.write_record(&row).map_err(SignatureError::csv)?;
        }

        writer
            .flush()
            .map_err(|err| SignatureError::Filesystem(err.to_string()))?;

        Ok(JoinReport {
            samples: self.samples.len(),
            signatures: self.signatures.len(),
            unmatched,
        })
    }
}
