use kira_signatures::matrix::read_signature_activities;
use kira_signatures::reconcile::normalize_data;

#[test]
fn end_to_end_scenario() {
    let reference = read_signature_activities("Samples\tA|LUAD\nSBS-01\t3\nSBS-02\t0\n".as_bytes())
        .unwrap();
    let query = read_signature_activities("Samples\tB|BRCA\nSBS-02\t5\nSBS-03\t7\n".as_bytes())
        .unwrap();

    let dataset = normalize_data(&reference, &query).unwrap();

    assert_eq!(dataset.signatures, vec!["SBS1", "SBS2", "SBS3"]);
    assert_eq!(dataset.reference[0].name, "A");
    assert_eq!(dataset.reference[0].disease.name, "LUAD");
    assert_eq!(dataset.reference[0].contributions, vec![3, 0, 0]);
    assert_eq!(dataset.query[0].name, "B");
    assert_eq!(dataset.query[0].disease.name, "BRCA");
    assert_eq!(dataset.query[0].contributions, vec![0, 5, 7]);
}

#[test]
fn zero_fills_signatures_missing_from_a_sample() {
    let reference = read_signature_activities(
        std::fs::File::open("tests/fixtures/reference.tsv").unwrap(),
    )
    .unwrap();
    let query =
        read_signature_activities(std::fs::File::open("tests/fixtures/query.tsv").unwrap())
            .unwrap();

    let dataset = normalize_data(&reference, &query).unwrap();

    assert_eq!(
        dataset.signatures,
        vec!["SBS1", "SBS2", "SBS5", "SBS13", "SBS18"]
    );
    for sample in dataset.reference.iter().chain(dataset.query.iter()) {
        assert_eq!(sample.contributions.len(), dataset.signatures.len());
    }

    // SBS-02 and SBS-13 appear only in the query cohort
    for sample in &dataset.reference {
        assert_eq!(sample.contributions[1], 0);
        assert_eq!(sample.contributions[3], 0);
    }
    assert_eq!(dataset.reference[1].contributions, vec![48, 0, 0, 0, 210]);
    assert_eq!(dataset.query[0].contributions, vec![0, 0, 14, 3, 0]);
    assert_eq!(dataset.query[1].disease.name, "Unknown");
    assert_eq!(dataset.query[1].contributions, vec![0, 22, 9, 0, 0]);
}

#[test]
fn sample_order_follows_columns() {
    let reference = read_signature_activities(
        "Samples\tZ\tA\tM\nSBS-01\t1\t2\t3\n".as_bytes(),
    )
    .unwrap();
    let query = read_signature_activities("Samples\n".as_bytes()).unwrap();

    let dataset = normalize_data(&reference, &query).unwrap();

    let names: Vec<_> = dataset.reference.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Z", "A", "M"]);
    assert!(dataset.query.is_empty());
}

#[test]
fn reconciliation_is_deterministic() {
    let reference_text = std::fs::read_to_string("tests/fixtures/reference.tsv").unwrap();
    let query_text = std::fs::read_to_string("tests/fixtures/query.tsv").unwrap();

    let run = || {
        let reference = read_signature_activities(reference_text.as_bytes()).unwrap();
        let query = read_signature_activities(query_text.as_bytes()).unwrap();
        serde_json::to_string(&normalize_data(&reference, &query).unwrap()).unwrap()
    };

    assert_eq!(run(), run());
}
