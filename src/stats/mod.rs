//! Statistical analyses for trait annotations and enrichment
//!
//! This module contains the annotation counting machinery and the
//! one-sided exact test used to decide whether a trait is
//! over-represented in a probe sample compared to the full background.
//!
//! Annotation cells are multi-valued: a probe can carry a single trait
//! label or a `;`-joined list of labels. Single-valued and multi-valued
//! cells are tracked separately because a multi-valued cell counts once
//! per embedded token while a single-valued cell counts once per cell;
//! collapsing the two upfront would lose the distinction needed to
//! reproduce exact annotation counts.

use std::collections::{HashMap, HashSet};

use smallvec::SmallVec;

pub mod fisher;

/// Splits one annotation cell into its trait tokens
///
/// An empty cell yields no tokens, a cell without a `;` separator yields
/// exactly one token and a `;`-joined cell yields one token per segment.
/// Tokens are neither trimmed nor deduplicated: adjacent separators
/// produce empty-string tokens, which are preserved literally.
///
/// # Examples
///
/// ```
/// use cpgea::stats::trait_tokens;
///
/// assert!(trait_tokens("").is_empty());
/// assert_eq!(trait_tokens("cancer").as_slice(), ["cancer"]);
/// assert_eq!(trait_tokens("a;;b").as_slice(), ["a", "", "b"]);
/// ```
pub fn trait_tokens(cell: &str) -> SmallVec<[&str; 4]> {
    if cell.is_empty() {
        SmallVec::new()
    } else {
        cell.split(';').collect()
    }
}

/// Annotation counts for one trait column over one dataset
///
/// Built fresh per column, either over the full background or over the
/// sample-joined subset; never merged across columns. The count of a
/// token is the number of single-valued cells holding exactly that token
/// plus its exact-match occurrences across all multi-valued cells.
#[derive(Debug, Default)]
pub struct TraitCounts {
    /// One count per single-valued cell
    singles: HashMap<String, u64>,
    /// One entry per token of every multi-valued cell, in row order
    /// then in-cell order
    multis: Vec<String>,
    /// Every distinct token in first-appearance order
    order: Vec<String>,
}

impl TraitCounts {
    /// Builds the counts from the cell values of one column
    ///
    /// `None` and empty-string cells contribute to neither structure.
    pub fn from_cells<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut singles: HashMap<String, u64> = HashMap::new();
        let mut multis: Vec<String> = Vec::new();
        let mut order: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for cell in cells {
            let Some(value) = cell else { continue };
            if value.is_empty() {
                continue;
            }
            if value.contains(';') {
                for token in trait_tokens(value) {
                    if seen.insert(token.to_string()) {
                        order.push(token.to_string());
                    }
                    multis.push(token.to_string());
                }
            } else {
                if seen.insert(value.to_string()) {
                    order.push(value.to_string());
                }
                *singles.entry(value.to_string()).or_insert(0) += 1;
            }
        }
        TraitCounts {
            singles,
            multis,
            order,
        }
    }

    /// The number of annotations carrying the given token
    pub fn count(&self, token: &str) -> u64 {
        let in_multis = self.multis.iter().filter(|entry| *entry == token).count() as u64;
        self.singles.get(token).copied().unwrap_or(0) + in_multis
    }

    /// The total number of annotations in the column
    ///
    /// Every token of every non-empty cell is counted exactly once.
    pub fn total_annotations(&self) -> u64 {
        self.singles.values().sum::<u64>() + self.multis.len() as u64
    }

    /// Every distinct token, in first-appearance order
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// The number of distinct tokens
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the column holds no annotations
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// The outcome of the exact test for one (column, trait) pair
///
/// Only produced for traits whose p-value passes the significance
/// threshold. Results are collected sorted ascending by p-value, ties
/// keeping discovery order.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    column: String,
    trait_name: String,
    odds_ratio: f64,
    pvalue: f64,
    sample_with: u64,
    sample_total: u64,
    background_with: u64,
    background_total: u64,
}

impl Enrichment {
    /// Constructs an `Enrichment` result row
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        column: &str,
        trait_name: &str,
        odds_ratio: f64,
        pvalue: f64,
        sample_with: u64,
        sample_total: u64,
        background_with: u64,
        background_total: u64,
    ) -> Self {
        Enrichment {
            column: column.to_string(),
            trait_name: trait_name.to_string(),
            odds_ratio,
            pvalue,
            sample_with,
            sample_total,
            background_with,
            background_total,
        }
    }

    /// The trait column the test ran on
    pub fn column(&self) -> &str {
        &self.column
    }

    /// The trait token that is enriched
    pub fn trait_name(&self) -> &str {
        &self.trait_name
    }

    /// The point estimate of the odds ratio
    ///
    /// `f64::INFINITY` when the denominator of the estimate contains a
    /// zero cell
    pub fn odds_ratio(&self) -> f64 {
        self.odds_ratio
    }

    /// The p-value of the one-sided exact test
    ///
    /// The p-value indicates the probability of observing at least as
    /// many trait annotations in the sample by chance
    pub fn pvalue(&self) -> f64 {
        self.pvalue
    }

    /// The number of sample annotations carrying the trait
    pub fn sample_with(&self) -> u64 {
        self.sample_with
    }

    /// The total number of sample annotations in the column
    pub fn sample_total(&self) -> u64 {
        self.sample_total
    }

    /// The number of background annotations carrying the trait
    pub fn background_with(&self) -> u64 {
        self.background_with
    }

    /// The total number of background annotations in the column
    pub fn background_total(&self) -> u64 {
        self.background_total
    }
}

/// We have to frequently do divisions starting with u64 values
/// and need to return f64 values. To ensure some kind of safety
/// we use this method to panic in case of overflows.
fn f64_from_u64(n: u64) -> f64 {
    let intermediate: u32 = n
        .try_into()
        .expect("cannot safely create f64 from large u64");
    intermediate.into()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tokens_of_empty_cell() {
        assert!(trait_tokens("").is_empty());
    }

    #[test]
    fn tokens_of_single_cell() {
        assert_eq!(trait_tokens("cancer").as_slice(), ["cancer"]);
    }

    #[test]
    fn token_count_matches_separator_count() {
        for s in ["a", "a;b", "a;b;c", "a;;b", ";a", "a;", ";;"] {
            let expected = 1 + s.matches(';').count();
            assert_eq!(trait_tokens(s).len(), expected, "input {s:?}");
        }
    }

    #[test]
    fn empty_tokens_are_preserved() {
        assert_eq!(trait_tokens("a;;b").as_slice(), ["a", "", "b"]);
        assert_eq!(trait_tokens(";a").as_slice(), ["", "a"]);
    }

    #[test]
    fn single_and_multi_cells_are_tracked_separately() {
        let cells = [
            Some("cancer"),
            Some("cancer;diabetes"),
            Some("cancer"),
            None,
        ];
        let counts = TraitCounts::from_cells(cells);

        // two single-valued cells plus one multi occurrence
        assert_eq!(counts.count("cancer"), 3);
        assert_eq!(counts.count("diabetes"), 1);
        assert_eq!(counts.count("obesity"), 0);
    }

    #[test]
    fn totals_conserve_every_token() {
        let cells = [
            Some("a"),
            Some("b;c"),
            None,
            Some(""),
            Some("a;;b"),
            Some("d"),
        ];
        let counts = TraitCounts::from_cells(cells);

        // non-missing cells: a, b;c, a;;b, d -> 1 + 2 + 3 + 1 tokens
        assert_eq!(counts.total_annotations(), 7);
        // the empty-string token from "a;;b" is a real token
        assert_eq!(counts.count(""), 1);
    }

    #[test]
    fn tokens_iterate_in_first_appearance_order() {
        let cells = [Some("b"), Some("a;b"), Some("c"), Some("a")];
        let counts = TraitCounts::from_cells(cells);
        let order: Vec<&str> = counts.tokens().collect();
        assert_eq!(order, vec!["b", "a", "c"]);
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn empty_column() {
        let counts = TraitCounts::from_cells([None, Some("")]);
        assert!(counts.is_empty());
        assert_eq!(counts.total_annotations(), 0);
    }
}
