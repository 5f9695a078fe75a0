use super::{patients, structure_of};
use crate::analyser::logic::classify::{ColumnEvidence, classify_values, evaluate_rules};
use crate::analyser::logic::*;
use crate::config::ClassifierThresholds;
use anyhow::Result;
use polars::prelude::*;

fn strings(values: &[Option<&str>]) -> Vec<Option<String>> {
    values.iter().map(|v| v.map(str::to_owned)).collect()
}

fn classify(values: &[Option<&str>]) -> ColumnProfile {
    classify_values("col", &strings(values), &ClassifierThresholds::default()).unwrap()
}

#[test]
fn test_patient_columns_are_classified() -> Result<()> {
    let structure = structure_of(&patients(200)?);
    assert_eq!(structure.kind_of("age"), Some(ColumnKind::NumericContinuous));
    assert_eq!(structure.kind_of("diagnosis"), Some(ColumnKind::Binary));
    assert_eq!(structure.kind_of("code"), Some(ColumnKind::Categorical));
    assert_eq!(structure.column_profiles.len(), 5, "One profile per column");
    Ok(())
}

#[test]
fn test_all_missing_is_categorical() {
    let profile = classify(&[None, Some("nan"), Some("  "), Some("N/A")]);
    assert_eq!(profile.detected_type, ColumnKind::Categorical);
    assert_eq!(profile.rule, ClassificationRule::AllMissing);
    assert_eq!(profile.missing_count, 4);
    assert_eq!(profile.distinct_count, 0);
}

#[test]
fn test_empty_column_is_categorical() {
    let profile = classify(&[]);
    assert_eq!(profile.detected_type, ColumnKind::Categorical);
    assert_eq!(profile.row_count, 0);
}

#[test]
fn test_dates_win_over_numbers() {
    let profile = classify(&[
        Some("2024-01-05"),
        Some("2024-02-11"),
        Some("05/03/2024"),
        Some("2024-04-01 10:00:00"),
        None,
    ]);
    assert_eq!(profile.detected_type, ColumnKind::Date);
    assert_eq!(profile.rule, ClassificationRule::DateParse);
    assert!((profile.confidence - 1.0).abs() < 1e-9);
}

#[test]
fn test_mostly_dates_below_threshold_is_not_date() {
    let mut values = vec![Some("2024-01-05"); 7];
    values.extend([Some("soon"), Some("later"), Some("never")]);
    let profile = classify(&values);
    assert_ne!(profile.detected_type, ColumnKind::Date);
}

#[test]
fn test_low_cardinality_integers_are_discrete() {
    let values: Vec<String> = (0..400).map(|i| (i % 5).to_string()).collect();
    let values: Vec<Option<&str>> = values.iter().map(|v| Some(v.as_str())).collect();
    let profile = classify(&values);
    assert_eq!(profile.detected_type, ColumnKind::NumericDiscrete);
}

#[test]
fn test_fractional_values_are_continuous() {
    let values: Vec<String> = (0..400).map(|i| format!("{}.5", i % 5)).collect();
    let values: Vec<Option<&str>> = values.iter().map(|v| Some(v.as_str())).collect();
    assert_eq!(classify(&values).detected_type, ColumnKind::NumericContinuous);
}

#[test]
fn test_currency_and_percent_parse_as_numbers() {
    let profile = classify(&[
        Some("$1,200"),
        Some("$950"),
        Some("€ 1.050,25"),
        Some("12%"),
        Some("7"),
    ]);
    assert!(profile.detected_type.is_numeric());
    assert_eq!(profile.rule, ClassificationRule::NumericParse);
}

#[test]
fn test_boolean_spellings_fold_to_binary() {
    let profile = classify(&[Some("Sí"), Some("no"), Some("YES"), Some("N"), Some("si")]);
    assert_eq!(profile.detected_type, ColumnKind::Binary);
    assert_eq!(profile.distinct_count, 2);
    assert_eq!(profile.sample_values.first().map(String::as_str), Some("Yes"));
}

#[test]
fn test_binary_numbers_stay_numeric() {
    // 0/1 parses as numeric before the two-value rule is reached.
    let values: Vec<Option<&str>> = (0..100)
        .map(|i| Some(if i % 2 == 0 { "0" } else { "1" }))
        .collect();
    assert!(classify(&values).detected_type.is_numeric());
}

#[test]
fn test_mixed_codes_are_categorical() {
    let codes = ["3A", "3B", "3C", "4B", "5B", "5C", "6"];
    let values: Vec<Option<&str>> = codes.iter().chain(&codes).map(|c| Some(*c)).collect();
    let profile = classify(&values);
    assert_eq!(profile.detected_type, ColumnKind::Categorical);
    assert_eq!(profile.rule, ClassificationRule::LowCardinality);
    assert_eq!(profile.distinct_count, 7);
    assert!(profile.confidence < 1.0, "Partly numeric column is less certain");
}

#[test]
fn test_short_unique_column_is_text() {
    let ids: Vec<String> = (1..=24).map(|i| format!("P{i:03}")).collect();
    let values: Vec<Option<&str>> = ids.iter().map(|v| Some(v.as_str())).collect();
    let profile = classify(&values);
    assert_eq!(profile.detected_type, ColumnKind::Text);
    assert_eq!(profile.rule, ClassificationRule::TextFallback);

    // One repeat is enough to read the same labels as categories.
    let mut repeated = values.clone();
    repeated.push(Some("P001"));
    assert_eq!(classify(&repeated).detected_type, ColumnKind::Categorical);
}

#[test]
fn test_free_text_falls_back_to_text() {
    let values: Vec<String> = (0..200).map(|i| format!("note number {i}")).collect();
    let values: Vec<Option<&str>> = values.iter().map(|v| Some(v.as_str())).collect();
    let profile = classify(&values);
    assert_eq!(profile.detected_type, ColumnKind::Text);
    assert_eq!(profile.rule, ClassificationRule::TextFallback);
}

#[test]
fn test_sample_values_are_capped() {
    let values: Vec<String> = (0..50).map(|i| format!("v{i}")).collect();
    let values: Vec<Option<&str>> = values.iter().map(|v| Some(v.as_str())).collect();
    let profile = classify(&values);
    assert_eq!(profile.sample_values.len(), ClassifierThresholds::default().sample_size);
}

#[test]
fn test_thresholds_are_respected() {
    let evidence = ColumnEvidence {
        row_count: 10,
        missing_count: 0,
        distinct_count: 10,
        date_matches: 0,
        numeric_matches: 7,
        all_integer: true,
    };
    let strict = ClassifierThresholds::default();
    assert_ne!(evaluate_rules(&evidence, &strict).kind, ColumnKind::NumericContinuous);

    let lenient = ClassifierThresholds {
        numeric_threshold: 0.6,
        ..ClassifierThresholds::default()
    };
    assert_eq!(
        evaluate_rules(&evidence, &lenient).kind,
        ColumnKind::NumericContinuous
    );
}

#[test]
fn test_classify_typed_polars_column() -> Result<()> {
    let col = Column::from(Series::new("flag".into(), vec![Some(true), Some(false), None]));
    let profile = classify_column(&col, &ClassifierThresholds::default());
    assert_eq!(profile.detected_type, ColumnKind::Binary);
    assert_eq!(profile.missing_count, 1);
    Ok(())
}
