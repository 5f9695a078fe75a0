use super::{patients, structure_of};
use crate::analyser::logic::profiling::{calculate_buckets, summarize_labels, summarize_numbers};
use crate::analyser::logic::*;
use crate::config::StatisticsSettings;
use anyhow::Result;
use polars::prelude::*;

fn settings() -> StatisticsSettings {
    StatisticsSettings::default()
}

#[test]
fn test_numeric_summary_values() -> Result<()> {
    let summary = summarize_numbers(
        "x",
        vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), None],
        10,
    )?;
    assert_eq!(summary.count, 4);
    assert_eq!(summary.missing, 1);
    assert_eq!(summary.mean, Some(2.5));
    assert_eq!(summary.median, Some(2.5));
    assert_eq!(summary.min, Some(1.0));
    assert_eq!(summary.max, Some(4.0));
    assert_eq!(summary.q25, Some(1.75));
    assert_eq!(summary.q75, Some(3.25));
    let std = summary.std.unwrap();
    assert!((std - 1.290_994_448_735_805_6).abs() < 1e-9, "Sample std, got {std}");
    Ok(())
}

#[test]
fn test_buckets_cover_every_value() -> Result<()> {
    let values = vec![Some(1.0), Some(1.0), Some(2.0), Some(3.0), Some(10.0)];
    let summary = summarize_numbers("x", values, 10)?;
    assert_eq!(summary.distribution_buckets.len(), 10);
    let total: usize = summary.distribution_buckets.iter().map(|b| b.count).sum();
    assert_eq!(total, 5);
    assert_eq!(summary.distribution_buckets.last().unwrap().count, 1, "Max in last bucket");
    assert_eq!(summary.distribution_buckets[0].lower, 1.0);
    assert!((summary.distribution_buckets[9].upper - 10.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_single_value_buckets_are_centred() {
    let ca = Float64Chunked::from_slice("x".into(), &[2.0, 2.0, 2.0]);
    let buckets = calculate_buckets(&ca, Some(2.0), Some(2.0), 10);
    assert_eq!(buckets.len(), 10);
    assert_eq!(buckets[5].count, 3);
    assert!(buckets[5].lower <= 2.0 && 2.0 < buckets[5].upper);
    assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 3);
}

#[test]
fn test_single_observation_has_no_std() -> Result<()> {
    let summary = summarize_numbers("x", vec![Some(7.0)], 10)?;
    assert_eq!(summary.std, None);
    assert_eq!(summary.median, Some(7.0));
    Ok(())
}

#[test]
fn test_all_missing_numbers_produce_no_nan() -> Result<()> {
    let summary = summarize_numbers("x", vec![None, None], 10)?;
    assert_eq!(summary.count, 0);
    assert_eq!(summary.missing, 2);
    assert!(summary.mean.is_none() && summary.median.is_none() && summary.std.is_none());
    assert!(summary.distribution_buckets.is_empty());
    Ok(())
}

#[test]
fn test_label_frequencies_and_truncation() -> Result<()> {
    let labels: Vec<Option<String>> = ["a", "b", "a", "c", "a", "b", "d"]
        .iter()
        .map(|s| Some((*s).to_owned()))
        .chain([None])
        .collect();
    let summary = summarize_labels(&labels, Some(2))?;

    assert_eq!(summary.count, 7);
    assert_eq!(summary.missing, 1);
    assert_eq!(summary.distinct_count, 4);
    assert_eq!(summary.frequency.len(), 2);
    assert_eq!(summary.frequency.get("a"), Some(&3));
    assert_eq!(summary.frequency.get("b"), Some(&2));
    assert_eq!(summary.other_count, 2);
    assert_eq!(summary.percentages.get("a"), Some(&42.86));
    Ok(())
}

#[test]
fn test_summary_routes_columns_by_kind() -> Result<()> {
    let df = patients(120)?;
    let structure = structure_of(&df);
    let stats = summarize(&df, &structure, df.height(), &settings(), Vec::new())?;

    assert!(stats.success);
    assert_eq!(stats.total_records, 120);
    assert_eq!(stats.filtered_records, 120);
    assert!(stats.numeric_stats.contains_key("age"));
    assert!(stats.categorical_stats.contains_key("diagnosis"));
    assert!(stats.categorical_stats.contains_key("code"));
    assert!(!stats.numeric_stats.contains_key("code"));
    Ok(())
}

#[test]
fn test_dates_and_text_are_not_summarised() -> Result<()> {
    let notes: Vec<String> = (0..80).map(|i| format!("free text {i}")).collect();
    let dates: Vec<String> = (0..80).map(|i| format!("2024-01-{:02}", i % 28 + 1)).collect();
    let df = df!("note" => notes, "visit" => dates)?;
    let structure = structure_of(&df);
    assert_eq!(structure.kind_of("note"), Some(ColumnKind::Text));
    assert_eq!(structure.kind_of("visit"), Some(ColumnKind::Date));

    let stats = summarize(&df, &structure, 80, &settings(), Vec::new())?;
    assert!(stats.numeric_stats.is_empty());
    assert!(stats.categorical_stats.is_empty());
    Ok(())
}

#[test]
fn test_empty_subset_short_circuits() -> Result<()> {
    let df = patients(30)?;
    let structure = structure_of(&df);
    let empty = df.head(Some(0));
    let stats = summarize(&empty, &structure, 30, &settings(), Vec::new())?;

    assert!(stats.success);
    assert!(stats.is_empty_result());
    assert_eq!(stats.total_records, 30);
    assert!(stats.numeric_stats.is_empty());
    assert!(stats.categorical_stats.is_empty());
    Ok(())
}

#[test]
fn test_all_missing_column_reports_empty_frequency() -> Result<()> {
    let df = df!(
        "age" => [30.0, 40.0, 50.0],
        "blank" => [None::<&str>, None, None]
    )?;
    let structure = structure_of(&df);
    let stats = summarize(&df, &structure, 3, &settings(), Vec::new())?;

    let blank = stats.categorical_stats.get("blank").expect("blank is categorical");
    assert!(blank.frequency.is_empty());
    assert_eq!(blank.missing, 3);
    Ok(())
}
