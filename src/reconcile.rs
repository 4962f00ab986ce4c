use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{SIGNATURE_NAME_PREFIX, Sample, normalize_signature_name_with_prefix};
use crate::error::SignatureError;
use crate::matrix::SignatureActivities;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseName {
    pub name: String,
}

/// A sample whose contributions are dense and positionally aligned to
/// [`ReconciledDataset::signatures`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedSample {
    pub name: String,
    pub disease: DiseaseName,
    pub contributions: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledDataset {
    pub signatures: Vec<String>,
    pub reference: Vec<NormalizedSample>,
    pub query: Vec<NormalizedSample>,
}

/// Sorted, deduplicated union of raw signature identifiers.
pub fn unify_signatures<'a, I>(signatures: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    signatures
        .into_iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Expands each sample's sparse contributions onto `signatures`, zero-filling
/// absent entries.
pub fn normalize_samples(signatures: &[String], samples: &[Sample]) -> Vec<NormalizedSample> {
    samples
        .iter()
        .map(|sample| NormalizedSample {
            name: sample.name.clone(),
            disease: DiseaseName {
                name: sample.disease.name.clone(),
            },
            contributions: signatures
                .iter()
                .map(|signature| sample.contribution(signature))
                .collect(),
        })
        .collect()
}

pub fn normalize_data(
    reference: &SignatureActivities,
    query: &SignatureActivities,
) -> Result<ReconciledDataset, SignatureError> {
    normalize_data_with_prefix(reference, query, SIGNATURE_NAME_PREFIX)
}

/// Aligns both cohorts on the unified signature axis, then canonicalizes the
/// axis names. Canonical names keep the raw sort order.
pub fn normalize_data_with_prefix(
    reference: &SignatureActivities,
    query: &SignatureActivities,
    prefix: &str,
) -> Result<ReconciledDataset, SignatureError> {
    let raw_signatures = unify_signatures(
        reference
            .signatures
            .iter()
            .chain(query.signatures.iter()),
    );

    let reference_samples = normalize_samples(&raw_signatures, &reference.samples);
    let query_samples = normalize_samples(&raw_signatures, &query.samples);

    let signatures = raw_signatures
        .iter()
        .map(|signature| normalize_signature_name_with_prefix(signature, prefix))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ReconciledDataset {
        signatures,
        reference: reference_samples,
        query: query_samples,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::domain::Disease;

    fn sample(name: &str, disease: &str, contributions: &[(&str, u64)]) -> Sample {
        let mut sample = Sample::new(name, Disease::new(disease));
        for (signature, value) in contributions {
            sample.contributions.insert(signature.to_string(), *value);
        }
        sample
    }

    fn activities(signatures: &[&str], samples: Vec<Sample>) -> SignatureActivities {
        SignatureActivities {
            signatures: signatures.iter().map(|s| s.to_string()).collect(),
            samples,
        }
    }

    #[test]
    fn reconciles_reference_and_query() {
        let reference = activities(
            &["SBS-01", "SBS-02"],
            vec![sample("A", "LUAD", &[("SBS-01", 3), ("SBS-02", 0)])],
        );
        let query = activities(
            &["SBS-02", "SBS-03"],
            vec![sample("B", "BRCA", &[("SBS-02", 5), ("SBS-03", 7)])],
        );

        let dataset = normalize_data(&reference, &query).unwrap();

        assert_eq!(dataset.signatures, vec!["SBS1", "SBS2", "SBS3"]);
        assert_eq!(dataset.reference[0].name, "A");
        assert_eq!(dataset.reference[0].disease.name, "LUAD");
        assert_eq!(dataset.reference[0].contributions, vec![3, 0, 0]);
        assert_eq!(dataset.query[0].contributions, vec![0, 5, 7]);
    }

    #[test]
    fn sorts_on_raw_identifiers() {
        // "SBS-10" sorts before "SBS-2" on the raw axis and keeps that order.
        let reference = activities(
            &["SBS-2", "SBS-10"],
            vec![sample("A", "X", &[("SBS-2", 1), ("SBS-10", 2)])],
        );
        let query = activities(&[], vec![]);

        let dataset = normalize_data(&reference, &query).unwrap();

        assert_eq!(dataset.signatures, vec!["SBS10", "SBS2"]);
        assert_eq!(dataset.reference[0].contributions, vec![2, 1]);
    }

    #[test]
    fn canonical_collisions_are_not_resorted() {
        let reference = activities(
            &["SBS-05", "SBS-5"],
            vec![sample("A", "X", &[("SBS-05", 1), ("SBS-5", 2)])],
        );
        let query = activities(&[], vec![]);

        let dataset = normalize_data(&reference, &query).unwrap();

        assert_eq!(dataset.signatures, vec!["SBS5", "SBS5"]);
        assert_eq!(dataset.reference[0].contributions, vec![1, 2]);
    }

    #[test]
    fn every_sample_matches_axis_length() {
        let reference = activities(
            &["SBS-01", "SBS-04"],
            vec![
                sample("A", "X", &[("SBS-01", 1)]),
                sample("B", "Y", &[("SBS-04", 2)]),
            ],
        );
        let query = activities(&["SBS-02"], vec![sample("C", "Z", &[("SBS-02", 9)])]);

        let dataset = normalize_data(&reference, &query).unwrap();

        for sample in dataset.reference.iter().chain(dataset.query.iter()) {
            assert_eq!(sample.contributions.len(), dataset.signatures.len());
        }
        assert_eq!(dataset.reference[1].contributions, vec![0, 0, 2]);
    }

    #[test]
    fn malformed_identifier_fails() {
        let reference = activities(&["Unnamed"], vec![]);
        let query = activities(&[], vec![]);

        assert_matches!(
            normalize_data(&reference, &query),
            Err(SignatureError::InvalidSignatureName(name)) if name == "Unnamed"
        );
    }
}
