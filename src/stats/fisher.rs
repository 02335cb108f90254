//! One-sided exact enrichment test on 2×2 contingency tables
//!
//! For every trait token of a column the annotation counts form the table
//!
//! ```text
//! | sample_with    | back_with    |
//! | sample_without | back_without |
//! ```
//!
//! and the one-sided "greater" Fisher exact test asks how probable it is
//! to draw at least `sample_with` trait annotations when drawing
//! `sample_with + sample_without` annotations from the pooled table. That
//! tail probability is the survival function of the hypergeometric
//! distribution, evaluated with `statrs`.
//!
//! # Examples
//!
//! ```no_run
//! use cpgea::parser;
//! use cpgea::stats::fisher::{trait_enrichment, EnrichmentOptions};
//!
//! let background = parser::background::parse("background.tsv").unwrap();
//! let sample = parser::sample::parse("sample.txt").unwrap();
//!
//! let mut options = EnrichmentOptions::default();
//! options.pvalue_threshold = 0.01;
//!
//! // the results are sorted ascending by p-value
//! for e in trait_enrichment(&background, &sample, &options).unwrap() {
//!     println!("{}\t{}\t{:e}\t({})", e.column(), e.trait_name(), e.pvalue(), e.odds_ratio());
//! }
//! ```

use statrs::distribution::{DiscreteCDF, Hypergeometric};
use tracing::{debug, warn};

use crate::stats::{f64_from_u64, Enrichment, TraitCounts};
use crate::table::BackgroundTable;
use crate::{CpgeaError, CpgeaResult};

/// Parameters of an enrichment run
#[derive(Debug, Clone)]
pub struct EnrichmentOptions {
    /// Strict upper bound for significant p-values
    pub pvalue_threshold: f64,
    /// Case-insensitive substring selecting the trait columns to test
    pub columns_contain: String,
    /// Test only the first matching trait column instead of all of them
    pub first_column_only: bool,
}

impl Default for EnrichmentOptions {
    fn default() -> Self {
        EnrichmentOptions {
            pvalue_threshold: 0.05,
            columns_contain: "human".to_string(),
            first_column_only: false,
        }
    }
}

/// A 2×2 table of annotation counts for one (column, trait) pair
///
/// Cell values are clamped to zero at construction: annotation counts can
/// disagree with column totals in edge cases and a negative difference
/// must not propagate into the test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContingencyTable {
    sample_with: u64,
    back_with: u64,
    sample_without: u64,
    back_without: u64,
}

impl ContingencyTable {
    /// Builds the table for one trait token from the sample and
    /// background counts of the same column
    pub fn from_counts(sample: &TraitCounts, background: &TraitCounts, token: &str) -> Self {
        let sample_with = sample.count(token);
        let back_with = background.count(token);
        ContingencyTable {
            sample_with,
            back_with,
            sample_without: sample.total_annotations().saturating_sub(sample_with),
            back_without: background.total_annotations().saturating_sub(back_with),
        }
    }

    /// The number of sample annotations carrying the trait
    pub fn sample_with(&self) -> u64 {
        self.sample_with
    }

    /// The number of background annotations carrying the trait
    pub fn back_with(&self) -> u64 {
        self.back_with
    }

    /// The number of sample annotations not carrying the trait
    pub fn sample_without(&self) -> u64 {
        self.sample_without
    }

    /// The number of background annotations not carrying the trait
    pub fn back_without(&self) -> u64 {
        self.back_without
    }

    /// The sum of all four cells
    pub fn total(&self) -> u64 {
        self.sample_with + self.back_with + self.sample_without + self.back_without
    }

    /// The number of annotations carrying the trait anywhere in the table
    pub fn with_total(&self) -> u64 {
        self.sample_with + self.back_with
    }
}

/// Runs the one-sided "greater" exact test on the table
///
/// Returns the odds-ratio point estimate and the p-value. The odds ratio
/// is `(sample_with * back_without) / (sample_without * back_with)`, or
/// `f64::INFINITY` when a denominator cell is zero.
///
/// # Errors
///
/// Returns [`CpgeaError::TestFailed`] if the hypergeometric distribution
/// rejects the table's margins
pub fn exact_test_greater(table: &ContingencyTable) -> CpgeaResult<(f64, f64)> {
    let hyper = Hypergeometric::new(
        // all annotations in the table
        // ==> population
        table.total(),
        // annotations carrying the trait
        // ==> successes
        table.with_total(),
        // annotations in the sample
        // ==> draws
        table.sample_with() + table.sample_without(),
    )
    .map_err(|err| CpgeaError::TestFailed(err.to_string()))?;

    // subtracting 1, because we want to test including sample_with
    // e.g. "7 or more", but sf by default calculates "more than 7"
    let pvalue = if table.sample_with() == 0 {
        1.0
    } else {
        hyper.sf(table.sample_with() - 1)
    };

    let odds_ratio = if table.sample_without() > 0 && table.back_with() > 0 {
        (f64_from_u64(table.sample_with()) * f64_from_u64(table.back_without()))
            / (f64_from_u64(table.sample_without()) * f64_from_u64(table.back_with()))
    } else {
        f64::INFINITY
    };

    Ok((odds_ratio, pvalue))
}

/// Calculates the trait enrichment of the sample probes compared to the
/// full background table
///
/// For every selected trait column the annotation counts are built twice,
/// once over the background and once over the sample-joined rows, and
/// every trait token of the background universe is put through the exact
/// test. Traits whose table is all zero, or that have no annotation in
/// either dataset, are excluded without error; a trait whose table the
/// test rejects is logged and skipped.
///
/// The returned results carry only traits with `pvalue <
/// options.pvalue_threshold` and are sorted ascending by p-value (stable,
/// ties keep discovery order). An empty result is a meaningful outcome,
/// not a failure, including the case of a sample that shares no probe
/// with the background.
///
/// # Errors
///
/// Never fails on statistical grounds; propagates nothing but errors of
/// the join that are structural rather than "no overlap"
pub fn trait_enrichment(
    background: &BackgroundTable,
    sample_ids: &[String],
    options: &EnrichmentOptions,
) -> CpgeaResult<Vec<Enrichment>> {
    let joined = match background.subset(sample_ids) {
        Ok(rows) => rows,
        Err(CpgeaError::EmptyJoin) => {
            debug!("sample does not overlap the background, no trait can be enriched");
            Vec::new()
        }
        Err(err) => return Err(err),
    };

    let mut columns = background.matching_columns(&options.columns_contain);
    if options.first_column_only {
        columns.truncate(1);
    }

    let mut results = Vec::new();
    for (position, column) in columns {
        let back_counts = TraitCounts::from_cells(background.rows().map(|row| row.cell(position)));
        let sample_counts =
            TraitCounts::from_cells(joined.iter().map(|row| row.cell(position)));
        debug!(
            "Column {}: {} background and {} sample annotations, {} traits",
            column,
            back_counts.total_annotations(),
            sample_counts.total_annotations(),
            back_counts.len()
        );

        for token in back_counts.tokens() {
            let table = ContingencyTable::from_counts(&sample_counts, &back_counts, token);
            if table.total() == 0 || table.with_total() == 0 {
                continue;
            }
            match exact_test_greater(&table) {
                Ok((odds_ratio, pvalue)) => {
                    if pvalue < options.pvalue_threshold {
                        results.push(Enrichment::new(
                            column,
                            token,
                            odds_ratio,
                            pvalue,
                            table.sample_with(),
                            sample_counts.total_annotations(),
                            table.back_with(),
                            back_counts.total_annotations(),
                        ));
                    }
                }
                Err(err) => {
                    warn!(
                        "Skipping trait {:?} in column {}: {} (table: {:?})",
                        token, column, err, table
                    );
                }
            }
        }
    }

    results.sort_by(|a, b| a.pvalue().total_cmp(&b.pvalue()));
    Ok(results)
}
