use super::patients;
use crate::analyser::logic::*;
use crate::error::DatalensError;
use anyhow::Result;
use polars::prelude::*;

#[test]
fn test_numeric_range_is_inclusive() -> Result<()> {
    let df = df!("age" => [29.0, 30.0, 40.0, 50.0, 51.0])?;
    let outcome = apply_filters(&df, &FilterSpec::new().with_range("age", 30.0, 50.0))?;
    assert_eq!(outcome.initial_count, 5);
    assert_eq!(outcome.filtered_count, 3);
    assert!(outcome.skipped.is_empty());
    Ok(())
}

#[test]
fn test_range_on_text_numbers_and_missing() -> Result<()> {
    let df = df!("income" => [Some("$1,000"), Some("2,500"), None, Some("n/a"), Some("900")])?;
    let outcome = apply_filters(&df, &FilterSpec::new().with_range("income", 950.0, 3000.0))?;
    assert_eq!(outcome.filtered_count, 2, "Missing and unparseable rows never match");
    Ok(())
}

#[test]
fn test_equality_is_prefix_match() -> Result<()> {
    let df = df!("code" => ["3A", "3B", "3C", "4B", "5B", "5C", "6", "33"])?;
    let outcome = apply_filters(&df, &FilterSpec::new().with_equals("code", "3"))?;

    let kept = values::string_values(outcome.table.column("code")?)?;
    let kept: Vec<&str> = kept.iter().flatten().map(String::as_str).collect();
    assert_eq!(kept, vec!["3A", "3B", "3C", "33"]);
    assert!(!kept.contains(&"4B"));
    Ok(())
}

#[test]
fn test_equality_folds_boolean_spellings() -> Result<()> {
    let df = df!("smoker" => ["Yes", "No", "Yes", "Nancy"])?;
    for spelling in ["Yes", "yes", "si", " Sí "] {
        let outcome = apply_filters(&df, &FilterSpec::new().with_equals("smoker", spelling))?;
        assert_eq!(outcome.filtered_count, 2, "{spelling}");
    }

    // A raw prefix still matches on its own.
    let outcome = apply_filters(&df, &FilterSpec::new().with_equals("smoker", "N"))?;
    assert_eq!(outcome.filtered_count, 2, "No and Nancy");
    Ok(())
}

#[test]
fn test_equality_on_numeric_column_uses_string_form() -> Result<()> {
    let df = df!("stage" => [1_i64, 2, 12, 21])?;
    let outcome = apply_filters(&df, &FilterSpec::new().with_equals("stage", "1"))?;
    assert_eq!(outcome.filtered_count, 2, "Matches 1 and 12");
    Ok(())
}

#[test]
fn test_unknown_column_is_skipped_not_fatal() -> Result<()> {
    let df = df!("age" => [20.0, 40.0, 60.0])?;
    let spec = FilterSpec::new()
        .with_range("age", 30.0, 70.0)
        .with_equals("missing_col", "x");
    let outcome = apply_filters(&df, &spec)?;

    assert_eq!(outcome.filtered_count, 2, "Valid clause still applied");
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].column, "missing_col");
    assert!(outcome.skipped[0].reason.contains("Unknown column"));
    Ok(())
}

#[test]
fn test_range_on_text_column_is_type_mismatch() -> Result<()> {
    let df = df!("name" => ["ana", "bo"])?;
    let col = df.column("name")?;
    let err = filter::range_mask(col, 0.0, 1.0).unwrap_err();
    assert!(matches!(err, DatalensError::FilterTypeMismatch { .. }));

    let outcome = apply_filters(&df, &FilterSpec::new().with_range("name", 0.0, 1.0))?;
    assert_eq!(outcome.filtered_count, 2, "Skipped clause keeps every row");
    assert_eq!(outcome.skipped.len(), 1);
    Ok(())
}

#[test]
fn test_nan_bounds_are_rejected() -> Result<()> {
    let df = df!("x" => [1.0, 2.0])?;
    let outcome = apply_filters(&df, &FilterSpec::new().with_range("x", f64::NAN, 3.0))?;
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.filtered_count, 2);
    Ok(())
}

#[test]
fn test_filter_to_zero_rows_is_valid() -> Result<()> {
    let df = patients(50)?;
    let outcome = apply_filters(&df, &FilterSpec::new().with_range("age", 500.0, 600.0))?;
    assert_eq!(outcome.filtered_count, 0);
    assert_eq!(outcome.table.width(), df.width(), "Schema survives an empty result");
    Ok(())
}

#[test]
fn test_clauses_intersect() -> Result<()> {
    let df = patients(300)?;
    let by_age = FilterSpec::new().with_range("age", 30.0, 50.0);
    let by_code = FilterSpec::new().with_equals("code", "3");
    let both = by_age.clone().with_equals("code", "3");

    let a = apply_filters(&df, &by_age)?.filtered_count;
    let b = apply_filters(&df, &by_code)?.filtered_count;
    let ab = apply_filters(&df, &both)?.filtered_count;
    assert!(ab <= a.min(b));
    assert!(ab > 0);
    Ok(())
}

#[test]
fn test_missing_spec_passes_through() -> Result<()> {
    let df = patients(10)?;
    let outcome = filter::apply_optional(&df, None)?;
    assert_eq!(outcome.filtered_count, 10);
    let empty = filter::apply_optional(&df, Some(&FilterSpec::new()))?;
    assert_eq!(empty.filtered_count, 10);
    Ok(())
}
