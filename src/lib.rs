//! Trait enrichment analysis for DNA-methylation probe panels
//!
//! `cpgea` takes a list of CpG probe identifiers (the sample) and a
//! precomputed background annotation table that maps every known probe to
//! zero or more biological traits. For every trait it builds a 2×2
//! contingency table of annotation counts and runs a one-sided exact test
//! to decide whether the trait is over-represented in the sample relative
//! to the background.
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
//! let options = EnrichmentOptions::default();
//! let enrichments = trait_enrichment(&background, &sample, &options).unwrap();
//!
//! for e in &enrichments {
//!     println!("{}\t{}\t{:e}", e.column(), e.trait_name(), e.pvalue());
//! }
//! ```

use thiserror::Error;

pub mod parser;
pub mod report;
pub mod stats;
pub mod table;

pub use stats::Enrichment;
pub use table::{BackgroundRow, BackgroundTable};

/// The error type used throughout the crate
#[derive(Error, Debug)]
pub enum CpgeaError {
    /// A file could not be opened for reading
    #[error("unable to open file: {0}")]
    CannotOpenFile(String),
    /// An input file does not have the required structure
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The sample does not share a single probe with the background
    #[error("no sample probe is present in the background")]
    EmptyJoin,
    /// The exact test rejected a contingency table
    #[error("exact test failed: {0}")]
    TestFailed(String),
    /// The results could not be persisted
    #[error("unable to write results: {0}")]
    CannotWriteOutput(String),
}

/// Crate-wide `Result` alias
pub type CpgeaResult<T> = Result<T, CpgeaError>;
