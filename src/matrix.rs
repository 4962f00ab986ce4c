use std::io::Read;

use camino::Utf8Path;
use csv::StringRecord;
use tracing::debug;

use crate::domain::Sample;
use crate::error::SignatureError;
use crate::fs_util::open_input;

pub const ROW_LABEL: &str = "Samples";

/// Signature identifiers in order of appearance plus one sample per column.
#[derive(Debug, Clone, Default)]
pub struct SignatureActivities {
    pub signatures: Vec<String>,
    pub samples: Vec<Sample>,
}

pub fn read_signature_activities<R: Read>(reader: R) -> Result<SignatureActivities, SignatureError> {
    read_labeled(reader, "input")
}

pub fn read_signature_activities_from_path(
    path: &Utf8Path,
) -> Result<SignatureActivities, SignatureError> {
    let reader = open_input(path)?;
    let activities = read_labeled(reader, path.as_str())?;
    debug!(
        path = %path,
        signatures = activities.signatures.len(),
        samples = activities.samples.len(),
        "read signature activities"
    );
    Ok(activities)
}

fn read_labeled<R: Read>(reader: R, source: &str) -> Result<SignatureActivities, SignatureError> {
    let mut records = tsv_reader(reader).into_records();

    let headers = records
        .next()
        .transpose()
        .map_err(SignatureError::csv)?
        .filter(|headers| headers.iter().any(|cell| !cell.is_empty()))
        .ok_or_else(|| SignatureError::MissingHeaders(source.to_string()))?;

    let mut samples = headers
        .iter()
        .skip(1)
        .map(Sample::from_header)
        .collect::<Result<Vec<_>, _>>()?;

    let mut signatures = Vec::new();

    for record in records {
        let record = record.map_err(SignatureError::csv)?;
        let line = record_line(&record);
        let (signature, values) = split_row(&record, samples.len(), line)?;

        for (sample, value) in samples.iter_mut().zip(values) {
            let contribution = parse_contribution(value, signature, line)?;
            sample
                .contributions
                .insert(signature.to_string(), contribution);
        }

        signatures.push(signature.to_string());
    }

    Ok(SignatureActivities {
        signatures,
        samples,
    })
}

/// Tab-separated reader shared by every matrix input. Header handling is left
/// to callers so an absent header row can be reported.
pub(crate) fn tsv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
}

/// Splits a data row into its signature label and exactly `width` value
/// cells.
pub(crate) fn split_row(
    record: &StringRecord,
    width: usize,
    line: u64,
) -> Result<(&str, impl Iterator<Item = &str>), SignatureError> {
    let signature = record.get(0).unwrap_or_default();
    let found = record.len().saturating_sub(1);
    if found != width {
        return Err(SignatureError::RowLength {
            signature: signature.to_string(),
            expected: width,
            found,
            line,
        });
    }
    Ok((signature, record.iter().skip(1)))
}

pub(crate) fn parse_contribution(
    value: &str,
    signature: &str,
    line: u64,
) -> Result<u64, SignatureError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| SignatureError::InvalidContribution {
            value: value.to_string(),
            signature: signature.to_string(),
            line,
        })
}

pub(crate) fn record_line(record: &StringRecord) -> u64 {
    record.position().map(|pos| pos.line()).unwrap_or_default()
}
