use crate::analyser::logic::*;
use anyhow::Result;
use polars::prelude::*;

#[test]
fn test_clean_table_normalizes_tokens() -> Result<()> {
    let name = Series::new("name".into(), vec!["  Alice  ", "Bob", "nan", "Dana"]);
    let smoker = Series::new("smoker".into(), vec!["Sí", "no", "Y", "NULL"]);
    let df = DataFrame::new(vec![Column::from(name), Column::from(smoker)])?;

    let (cleaned, report) = clean_table(&df)?;

    let names = values::string_values(cleaned.column("name")?)?;
    assert_eq!(names[0].as_deref(), Some("Alice"), "Whitespace trimmed");
    assert_eq!(names[2], None, "Missing sentinel becomes null");

    let smoker = values::string_values(cleaned.column("smoker")?)?;
    assert_eq!(
        smoker,
        vec![Some("Yes".to_owned()), Some("No".to_owned()), Some("Yes".to_owned()), None]
    );

    assert!(report.missing_before.is_empty(), "No real nulls before cleaning");
    assert_eq!(report.missing_after.get("name"), Some(&1));
    assert_eq!(report.missing_after.get("smoker"), Some(&1));
    Ok(())
}

#[test]
fn test_clean_table_drops_duplicates_keeping_first() -> Result<()> {
    let id = Series::new("id".into(), vec!["1", "2", "1", "3", "2 "]);
    let grade = Series::new("grade".into(), vec!["a", "b", "a", "c", "b"]);
    let df = DataFrame::new(vec![Column::from(id), Column::from(grade)])?;

    let (cleaned, report) = clean_table(&df)?;

    assert_eq!(report.initial_rows, 5);
    assert_eq!(report.final_rows, 3);
    assert_eq!(report.duplicates_removed, 2, "Trimmed '2 ' duplicates '2'");
    let ids = values::string_values(cleaned.column("id")?)?;
    assert_eq!(
        ids,
        vec![Some("1".to_owned()), Some("2".to_owned()), Some("3".to_owned())],
        "Order of first occurrences is kept"
    );
    Ok(())
}

#[test]
fn test_clean_table_leaves_numeric_columns_alone() -> Result<()> {
    let values = Series::new("x".into(), vec![Some(1.5), None, Some(2.5)]);
    let df = DataFrame::new(vec![Column::from(values)])?;

    let (cleaned, report) = clean_table(&df)?;

    assert_eq!(cleaned.column("x")?.dtype(), &DataType::Float64);
    assert_eq!(report.missing_before.get("x"), Some(&1));
    assert_eq!(report.missing_after, report.missing_before);
    Ok(())
}

#[test]
fn test_clean_table_is_idempotent() -> Result<()> {
    let df = df!("a" => ["x ", "x", "N/A", "y"], "b" => ["1", "1", "2", "3"])?;
    let (once, _) = clean_table(&df)?;
    let (twice, report) = clean_table(&once)?;
    assert!(once.equals_missing(&twice));
    assert_eq!(report.duplicates_removed, 0);
    Ok(())
}
