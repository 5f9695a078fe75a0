//! Column type classification.
//!
//! Each column is reduced to a [`ColumnEvidence`] (counts of values that parse
//! as dates or numbers, cardinality, missingness) and then run through an
//! ordered rule list. The first rule that fires decides the type and reports a
//! confidence, so every column gets exactly one of the six kinds.

use super::types::{ClassificationRule, ColumnKind, ColumnProfile, StructureAnalysis};
use super::values;
use crate::config::ClassifierThresholds;
use anyhow::Result;
use polars::prelude::*;

/// What the rules look at. Computed once per column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnEvidence {
    pub row_count: usize,
    pub missing_count: usize,
    pub distinct_count: usize,
    pub date_matches: usize,
    pub numeric_matches: usize,
    /// Every value that parsed as a number is integral.
    pub all_integer: bool,
}

impl ColumnEvidence {
    pub fn from_values(values: &[Option<String>]) -> Result<Self> {
        let mut missing_count = 0;
        let mut date_matches = 0;
        let mut numeric_matches = 0;
        let mut all_integer = true;

        for value in values {
            let Some(v) = value else {
                missing_count += 1;
                continue;
            };
            if values::parse_date(v).is_some() {
                date_matches += 1;
            }
            if let Some(n) = values::parse_number(v) {
                numeric_matches += 1;
                if n.fract() != 0.0 {
                    all_integer = false;
                }
            }
        }

        Ok(Self {
            row_count: values.len(),
            missing_count,
            distinct_count: values::distinct_labels(values)?,
            date_matches,
            numeric_matches,
            all_integer: all_integer && numeric_matches > 0,
        })
    }

    pub fn non_missing(&self) -> usize {
        self.row_count - self.missing_count
    }

    fn fraction(&self, matches: usize) -> f64 {
        match self.non_missing() {
            0 => 0.0,
            n => matches as f64 / n as f64,
        }
    }

    fn cardinality_ratio(&self) -> f64 {
        match self.row_count {
            0 => 0.0,
            n => self.distinct_count as f64 / n as f64,
        }
    }
}

/// Outcome of the rule list for one column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    pub kind: ColumnKind,
    pub rule: ClassificationRule,
    pub confidence: f64,
}

type Rule = fn(&ColumnEvidence, &ClassifierThresholds) -> Option<Classification>;

/// Evaluated top to bottom; the last rule always fires.
pub const RULES: [(ClassificationRule, Rule); 6] = [
    (ClassificationRule::AllMissing, all_missing_rule),
    (ClassificationRule::DateParse, date_rule),
    (ClassificationRule::NumericParse, numeric_rule),
    (ClassificationRule::TwoDistinctValues, binary_rule),
    (ClassificationRule::LowCardinality, categorical_rule),
    (ClassificationRule::TextFallback, text_rule),
];

fn all_missing_rule(ev: &ColumnEvidence, _: &ClassifierThresholds) -> Option<Classification> {
    (ev.non_missing() == 0).then_some(Classification {
        kind: ColumnKind::Categorical,
        rule: ClassificationRule::AllMissing,
        confidence: 1.0,
    })
}

pub fn date_rule(ev: &ColumnEvidence, t: &ClassifierThresholds) -> Option<Classification> {
    let fraction = ev.fraction(ev.date_matches);
    (fraction >= t.date_threshold).then_some(Classification {
        kind: ColumnKind::Date,
        rule: ClassificationRule::DateParse,
        confidence: fraction,
    })
}

pub fn numeric_rule(ev: &ColumnEvidence, t: &ClassifierThresholds) -> Option<Classification> {
    let fraction = ev.fraction(ev.numeric_matches);
    if fraction < t.numeric_threshold {
        return None;
    }
    let discrete = ev.all_integer
        && ev.cardinality_ratio() < t.discrete_ratio
        && ev.distinct_count <= t.discrete_max_distinct;
    Some(Classification {
        kind: if discrete {
            ColumnKind::NumericDiscrete
        } else {
            ColumnKind::NumericContinuous
        },
        rule: ClassificationRule::NumericParse,
        confidence: fraction,
    })
}

pub fn binary_rule(ev: &ColumnEvidence, _: &ClassifierThresholds) -> Option<Classification> {
    (ev.distinct_count == 2).then_some(Classification {
        kind: ColumnKind::Binary,
        rule: ClassificationRule::TwoDistinctValues,
        confidence: 1.0,
    })
}

pub fn categorical_rule(ev: &ColumnEvidence, t: &ClassifierThresholds) -> Option<Classification> {
    // A column with no repeated value is an identifier, however short.
    let repeats = ev.distinct_count < ev.non_missing();
    let low = ev.distinct_count <= t.categorical_max_distinct
        || ev.cardinality_ratio() <= t.categorical_ratio;
    (repeats && low).then(|| Classification {
        kind: ColumnKind::Categorical,
        rule: ClassificationRule::LowCardinality,
        // Mixed columns rescued from the numeric rule are less certain.
        confidence: 1.0 - ev.fraction(ev.numeric_matches.max(ev.date_matches)) / 2.0,
    })
}

fn text_rule(ev: &ColumnEvidence, _: &ClassifierThresholds) -> Option<Classification> {
    Some(Classification {
        kind: ColumnKind::Text,
        rule: ClassificationRule::TextFallback,
        confidence: ev.fraction(ev.distinct_count).min(1.0),
    })
}

pub fn evaluate_rules(ev: &ColumnEvidence, thresholds: &ClassifierThresholds) -> Classification {
    RULES
        .iter()
        .find_map(|(_, rule)| rule(ev, thresholds))
        .unwrap_or(Classification {
            kind: ColumnKind::Text,
            rule: ClassificationRule::TextFallback,
            confidence: 0.0,
        })
}

/// Classifies already-extracted cell values.
pub fn classify_values(
    name: &str,
    raw: &[Option<String>],
    thresholds: &ClassifierThresholds,
) -> Result<ColumnProfile> {
    let normalized: Vec<Option<String>> = raw
        .iter()
        .map(|v| v.as_deref().and_then(values::normalize_token))
        .collect();
    let evidence = ColumnEvidence::from_values(&normalized)?;
    let decision = evaluate_rules(&evidence, thresholds);

    tracing::debug!(
        column = name,
        kind = decision.kind.as_str(),
        rule = ?decision.rule,
        confidence = decision.confidence,
        "classified column"
    );

    Ok(ColumnProfile {
        name: name.to_owned(),
        detected_type: decision.kind,
        row_count: evidence.row_count,
        distinct_count: evidence.distinct_count,
        missing_count: evidence.missing_count,
        sample_values: normalized
            .into_iter()
            .flatten()
            .take(thresholds.sample_size)
            .collect(),
        confidence: decision.confidence,
        rule: decision.rule,
    })
}

/// Classifies a table column. Never fails: a column that cannot be read as
/// text degrades to `text` with zero confidence.
pub fn classify_column(col: &Column, thresholds: &ClassifierThresholds) -> ColumnProfile {
    let name = col.name().to_string();
    let profile =
        values::string_values(col).and_then(|raw| classify_values(&name, &raw, thresholds));
    match profile {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!("Column '{name}' is unreadable, treating as text: {e:#}");
            ColumnProfile {
                name,
                detected_type: ColumnKind::Text,
                row_count: col.len(),
                distinct_count: 0,
                missing_count: col.null_count(),
                sample_values: Vec::new(),
                confidence: 0.0,
                rule: ClassificationRule::Unreadable,
            }
        }
    }
}

/// One classifier pass over the whole table.
pub fn analyse_structure(df: &DataFrame, thresholds: &ClassifierThresholds) -> StructureAnalysis {
    StructureAnalysis {
        row_count: df.height(),
        column_profiles: df
            .get_columns()
            .iter()
            .map(|col| classify_column(col, thresholds))
            .collect(),
    }
}
