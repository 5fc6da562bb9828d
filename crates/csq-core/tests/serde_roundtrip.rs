use csq_core::{CsqError, ErrorInfo, RunMetadata, Xy};

#[test]
fn metadata_round_trip_yaml() {
    let metadata = RunMetadata {
        date: "2023-08-01T14:36:10+02:00".into(),
        figuresdir: "figures/gaussian-01082023".into(),
        cpu: "M1".into(),
        ram: "16GB".into(),
        completiontime: "1.2ms".into(),
        ..RunMetadata::new("spread-of-couplings", "spread-of-couplings")
    };

    let yaml = serde_yaml::to_string(&metadata).expect("serialize");
    let decoded: RunMetadata = serde_yaml::from_str(&yaml).expect("deserialize");
    assert_eq!(decoded, metadata);
}

#[test]
fn metadata_accepts_partial_documents() {
    let yaml = "simulationid: spread-of-couplings\nsimulation: spread-of-couplings\n";
    let decoded: RunMetadata = serde_yaml::from_str(yaml).expect("deserialize");
    assert_eq!(decoded.simulationid, "spread-of-couplings");
    assert!(decoded.date.is_empty());
    assert!(decoded.figuresdir.is_empty());
}

#[test]
fn samples_round_trip_exactly() {
    let samples = vec![Xy::new(0.0, 0.0), Xy::new(0.001, 1.0 / 3.0), Xy::new(1.499, 1e-17)];
    let yaml = serde_yaml::to_string(&samples).expect("serialize");
    let decoded: Vec<Xy> = serde_yaml::from_str(&yaml).expect("deserialize");
    assert_eq!(decoded, samples);
}

#[test]
fn errors_round_trip_json() {
    let err = CsqError::Config(ErrorInfo::new("missing-field", "dt").with_context("field", "dt"));
    let json = serde_json::to_string(&err).expect("serialize");
    assert!(json.contains("\"family\":\"Config\""));
    let decoded: CsqError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
}
