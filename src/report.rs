//! Writing the significant-results file
//!
//! Results are written as comma-separated values with a fixed header.
//! The header row is always present, so a run that found nothing still
//! leaves a parseable file behind and downstream consumers can tell
//! "ran, found nothing" apart from "did not run". The file is assembled
//! in a temporary location and moved into place on success, so a failed
//! run never leaves a partial results file.

use std::io::BufWriter;
use std::path::Path;

use csv::WriterBuilder;
use tempfile::NamedTempFile;

use crate::stats::Enrichment;
use crate::{CpgeaError, CpgeaResult};

/// The column names of the results file, in output order
pub const HEADER: [&str; 8] = [
    "Trait Column",
    "Trait",
    "Odds Ratio",
    "P-Value",
    "Sample with Trait",
    "Sample Total Annotations",
    "Background with Trait",
    "Background Total Annotations",
];

/// Writes the enrichment results to `path`
///
/// The results are expected in their final order (ascending p-value).
///
/// # Errors
///
/// [`CpgeaError::CannotWriteOutput`] with the destination path and cause
/// if the file cannot be created, written or moved into place
pub fn write_results<P: AsRef<Path>>(path: P, results: &[Enrichment]) -> CpgeaResult<()> {
    let path = path.as_ref();
    let target = path.display().to_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let tmp = NamedTempFile::new_in(dir)
        .map_err(|err| CpgeaError::CannotWriteOutput(format!("{target}: {err}")))?;
    let mut writer = WriterBuilder::new().from_writer(BufWriter::new(tmp));

    writer
        .write_record(HEADER)
        .map_err(|err| CpgeaError::CannotWriteOutput(format!("{target}: {err}")))?;
    for enrichment in results {
        writer
            .write_record(&record(enrichment))
            .map_err(|err| CpgeaError::CannotWriteOutput(format!("{target}: {err}")))?;
    }

    let buffer = writer
        .into_inner()
        .map_err(|err| CpgeaError::CannotWriteOutput(format!("{target}: {err}")))?;
    let tmp = buffer
        .into_inner()
        .map_err(|err| CpgeaError::CannotWriteOutput(format!("{target}: {err}")))?;
    tmp.persist(path)
        .map_err(|err| CpgeaError::CannotWriteOutput(format!("{target}: {err}")))?;
    Ok(())
}

fn record(enrichment: &Enrichment) -> [String; 8] {
    [
        enrichment.column().to_string(),
        enrichment.trait_name().to_string(),
        enrichment.odds_ratio().to_string(),
        enrichment.pvalue().to_string(),
        enrichment.sample_with().to_string(),
        enrichment.sample_total().to_string(),
        enrichment.background_with().to_string(),
        enrichment.background_total().to_string(),
    ]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_results_produce_a_header_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        write_results(&path, &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Trait Column,Trait,Odds Ratio,P-Value,Sample with Trait,\
             Sample Total Annotations,Background with Trait,Background Total Annotations"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn rows_keep_their_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let results = vec![
            Enrichment::new("human_c2", "cancer", 2.0, 0.01, 2, 3, 2, 4),
            Enrichment::new("human_c2", "diabetes", 1.5, 0.04, 1, 3, 1, 4),
        ];
        write_results(&path, &results).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "human_c2,cancer,2,0.01,2,3,2,4");
        assert_eq!(lines[2], "human_c2,diabetes,1.5,0.04,1,3,1,4");
    }

    #[test]
    fn existing_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        std::fs::write(&path, "stale").unwrap();
        write_results(&path, &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Trait Column,"));
    }

    #[test]
    fn unwritable_destination_fails() {
        let res = write_results("/nonexistent-dir/results.csv", &[]);
        assert!(matches!(res, Err(CpgeaError::CannotWriteOutput(_))));
    }
}
