//! Cohort summaries and comparisons split by outcome

use itertools::Itertools;
use serde::Serialize;

use crate::algorithm::statistics::{
    ContingencyResult, Summary, TestResult, chi2_contingency, frequencies, mann_whitney_u,
    shapiro_wilk, spearman, summarize, value_counts,
};
use crate::error::{CardioError, Result};
use crate::models::CohortRecord;
use crate::reader::Cohort;
use crate::utils::logging::log_warning;

use super::format::{format_pvalue, normality_text, percentage_text, range_text, summary_text};
use super::parameter::{CARDIO, CATALOGUE, Parameter};

/// Summary of one continuous parameter
#[derive(Debug, Clone, Serialize)]
pub struct ContinuousRow {
    /// Column name
    pub parameter: &'static str,
    /// Descriptive statistics
    pub summary: Summary,
    /// Shapiro-Wilk result, absent when the test cannot be computed
    pub normality: Option<TestResult>,
}

/// Count and share of one modality
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalityShare {
    /// Modality key as stored in the cohort
    pub key: &'static str,
    /// Display name
    pub name: &'static str,
    /// Number of records
    pub count: usize,
    /// Fraction of the records
    pub share: f64,
}

/// Distribution of one categorical parameter
#[derive(Debug, Clone, Serialize)]
pub struct CategoricalRow {
    /// Column name
    pub parameter: &'static str,
    /// Records counted
    pub total: usize,
    /// Shares in catalogue order
    pub shares: Vec<ModalityShare>,
}

/// Per-group description used in outcome comparisons
#[derive(Debug, Clone, Serialize)]
pub enum GroupDescription {
    /// Mean and spread of a continuous parameter
    Continuous(Summary),
    /// Modality shares of a categorical parameter
    Categorical(Vec<ModalityShare>),
}

impl GroupDescription {
    fn render(&self) -> String {
        match self {
            Self::Continuous(summary) => summary_text(summary),
            Self::Categorical(shares) => shares
                .iter()
                .map(|s| format!("{} {}", s.name, percentage_text(s.share)))
                .join(", "),
        }
    }
}

/// A parameter compared between subjects with and without the outcome
#[derive(Debug, Clone, Serialize)]
pub struct CardioComparison {
    /// Column name
    pub parameter: &'static str,
    /// Subjects without cardiovascular disease
    pub without_disease: GroupDescription,
    /// Subjects with cardiovascular disease
    pub with_disease: GroupDescription,
    /// Mann-Whitney U (continuous) or chi-square (categorical) p-value
    pub p_value: f64,
}

fn unknown_column(parameter: &Parameter) -> CardioError {
    CardioError::MissingColumn {
        column: parameter.name.to_string(),
    }
}

fn collect_continuous<'a, I>(records: I, parameter: &Parameter) -> Result<Vec<f64>>
where
    I: IntoIterator<Item = &'a CohortRecord>,
{
    records
        .into_iter()
        .map(|r| r.continuous(parameter.name).ok_or_else(|| unknown_column(parameter)))
        .collect()
}

fn collect_modalities<'a, I>(records: I, parameter: &Parameter) -> Result<Vec<String>>
where
    I: IntoIterator<Item = &'a CohortRecord>,
{
    records
        .into_iter()
        .map(|r| r.modality(parameter.name).ok_or_else(|| unknown_column(parameter)))
        .collect()
}

/// Values of a continuous parameter across the cohort
///
/// # Errors
/// Returns `MissingColumn` if the parameter is not a continuous column.
pub fn continuous_values(records: &[CohortRecord], parameter: &Parameter) -> Result<Vec<f64>> {
    collect_continuous(records, parameter)
}

/// Modality keys of a categorical parameter across the cohort
///
/// # Errors
/// Returns `MissingColumn` if the parameter is not a categorical column.
pub fn modality_values(records: &[CohortRecord], parameter: &Parameter) -> Result<Vec<String>> {
    collect_modalities(records, parameter)
}

fn shares<I>(values: I, parameter: &Parameter) -> Vec<ModalityShare>
where
    I: IntoIterator<Item = String>,
{
    let counts = value_counts(values);
    let modalities = parameter.modalities();
    frequencies(&counts, modalities.iter().map(|(key, _)| *key))
        .into_iter()
        .zip(modalities)
        .map(|((_, count, share), (key, name))| ModalityShare {
            key,
            name,
            count,
            share,
        })
        .collect()
}

/// Descriptive statistics and normality of a continuous parameter
///
/// # Errors
/// Returns `MissingColumn` for a non-continuous parameter and
/// `InsufficientData` for an empty cohort.
pub fn continuous_row(records: &[CohortRecord], parameter: &Parameter) -> Result<ContinuousRow> {
    let values = continuous_values(records, parameter)?;
    let summary = summarize(&values)?;
    let normality = match shapiro_wilk(&values) {
        Ok(result) => Some(result),
        Err(e) => {
            log::debug!("No normality test for {}: {e}", parameter.name);
            None
        }
    };
    Ok(ContinuousRow {
        parameter: parameter.name,
        summary,
        normality,
    })
}

/// Modality counts and shares of a categorical parameter
///
/// # Errors
/// Returns `MissingColumn` for a non-categorical parameter.
pub fn categorical_row(records: &[CohortRecord], parameter: &Parameter) -> Result<CategoricalRow> {
    let values = modality_values(records, parameter)?;
    Ok(CategoricalRow {
        parameter: parameter.name,
        total: values.len(),
        shares: shares(values, parameter),
    })
}

/// Cross-tabulate two categorical parameters
///
/// Rows follow `rows`' modalities and columns follow `columns`'. Modalities
/// absent from the cohort are left out so the table can be tested.
///
/// # Errors
/// Returns `MissingColumn` if either parameter is not categorical.
pub fn contingency_table(
    records: &[CohortRecord],
    rows: &Parameter,
    columns: &Parameter,
) -> Result<Vec<Vec<usize>>> {
    let row_values = modality_values(records, rows)?;
    let col_values = modality_values(records, columns)?;
    let row_keys = rows.modalities();
    let col_keys = columns.modalities();

    let mut table = vec![vec![0usize; col_keys.len()]; row_keys.len()];
    for (r, c) in row_values.iter().zip(&col_values) {
        let i = row_keys.iter().position(|(key, _)| key == r);
        let j = col_keys.iter().position(|(key, _)| key == c);
        if let (Some(i), Some(j)) = (i, j) {
            table[i][j] += 1;
        }
    }

    let keep_cols = (0..col_keys.len())
        .filter(|&j| table.iter().any(|row| row[j] > 0))
        .collect_vec();
    Ok(table
        .into_iter()
        .filter(|row| row.iter().any(|&n| n > 0))
        .map(|row| keep_cols.iter().map(|&j| row[j]).collect())
        .collect())
}

/// Chi-square test of independence between two categorical parameters
///
/// # Errors
/// Returns `MissingColumn` for a non-categorical parameter and
/// `InsufficientData` when fewer than two modalities are observed on
/// either side.
pub fn association(
    records: &[CohortRecord],
    first: &Parameter,
    second: &Parameter,
) -> Result<ContingencyResult> {
    chi2_contingency(&contingency_table(records, first, second)?)
}

/// Spearman correlation between two continuous parameters
///
/// # Errors
/// Returns `MissingColumn` for a non-continuous parameter and
/// `InsufficientData` for too few records or a constant column.
pub fn correlation(records: &[CohortRecord], first: &Parameter, second: &Parameter) -> Result<TestResult> {
    spearman(
        &continuous_values(records, first)?,
        &continuous_values(records, second)?,
    )
}

/// Compare a parameter between subjects with and without the outcome
///
/// Continuous parameters are compared with the Mann-Whitney U test,
/// categorical ones with a chi-square test against `cardio`.
///
/// # Errors
/// Returns `MissingColumn` for an unknown parameter and `InsufficientData`
/// when one of the groups is empty or the test cannot be computed.
pub fn compare_by_cardio(records: &[CohortRecord], parameter: &Parameter) -> Result<CardioComparison> {
    let (with, without): (Vec<&CohortRecord>, Vec<&CohortRecord>) =
        records.iter().partition(|r| r.cardio);

    let group = |rows: &[&CohortRecord]| -> Result<GroupDescription> {
        if parameter.is_categorical() {
            let values = collect_modalities(rows.iter().copied(), parameter)?;
            Ok(GroupDescription::Categorical(shares(values, parameter)))
        } else {
            let values = collect_continuous(rows.iter().copied(), parameter)?;
            Ok(GroupDescription::Continuous(summarize(&values)?))
        }
    };

    let p_value = if parameter.is_categorical() {
        association(records, parameter, &CARDIO)?.p_value
    } else {
        mann_whitney_u(
            &collect_continuous(without.iter().copied(), parameter)?,
            &collect_continuous(with.iter().copied(), parameter)?,
        )?
        .p_value
    };

    Ok(CardioComparison {
        parameter: parameter.name,
        without_disease: group(&without)?,
        with_disease: group(&with)?,
        p_value,
    })
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

/// Render a plain-text report of a cleaned cohort
///
/// Sections: cleaning report, continuous parameters, categorical
/// parameters and the comparison by cardiovascular disease. Statistics
/// that cannot be computed are shown as `n/a` and logged.
#[must_use]
pub fn generate_summary(cohort: &Cohort) -> String {
    let records = &cohort.records;
    let mut summary = String::new();

    summary.push_str("Cohort Summary:\n");
    summary.push_str(&format!("  Subjects: {}\n", records.len()));
    summary.push_str(&format!(
        "  With cardiovascular disease: {}\n\n",
        records.iter().filter(|r| r.cardio).count()
    ));
    summary.push_str(&cohort.report.to_string());
    summary.push_str("\n\n");

    summary.push_str("Continuous parameters:\n");
    for parameter in CATALOGUE.iter().filter(|p| !p.is_categorical()) {
        match continuous_row(records, parameter) {
            Ok(row) => {
                let s = &row.summary;
                summary.push_str(&format!(
                    "  {:<36} {:<14} {:<16} 95% [{:.1} - {:.1}]  {}\n",
                    truncate_string(&parameter.label(), 36),
                    summary_text(s),
                    range_text(s.min, s.max),
                    s.p2_5,
                    s.p97_5,
                    row.normality.as_ref().map_or_else(|| "n/a".to_string(), normality_text),
                ));
            }
            Err(e) => {
                log_warning(&format!("Could not summarize {}: {e}", parameter.name), None);
                summary.push_str(&format!("  {:<36} n/a\n", parameter.label()));
            }
        }
    }

    summary.push_str("\nCategorical parameters:\n");
    for parameter in CATALOGUE.iter().filter(|p| p.is_categorical()) {
        match categorical_row(records, parameter) {
            Ok(row) => {
                summary.push_str(&format!("  {}\n", parameter.label()));
                for share in &row.shares {
                    summary.push_str(&format!(
                        "    {:<34} {:>8} ({})\n",
                        truncate_string(share.name, 34),
                        share.count,
                        percentage_text(share.share)
                    ));
                }
            }
            Err(e) => {
                log_warning(&format!("Could not summarize {}: {e}", parameter.name), None);
            }
        }
    }

    summary.push_str("\nComparison by cardiovascular disease (without | with):\n");
    for parameter in CATALOGUE.iter().filter(|p| p.name != CARDIO.name) {
        match compare_by_cardio(records, parameter) {
            Ok(cmp) => summary.push_str(&format!(
                "  {}: {} | {} ({})\n",
                parameter.label(),
                cmp.without_disease.render(),
                cmp.with_disease.render(),
                format_pvalue(cmp.p_value)
            )),
            Err(e) => {
                log_warning(&format!("Could not compare {}: {e}", parameter.name), None);
                summary.push_str(&format!("  {}: n/a\n", parameter.label()));
            }
        }
    }

    summary
}
