//! The background annotation table
//!
//! The table is produced upstream by a one-time ETL step and maps every
//! known probe to an ENTREZ gene ID and to zero or more trait columns.
//! It is loaded once per analysis run and never mutated afterwards.

use std::collections::HashMap;

use crate::{CpgeaError, CpgeaResult};

/// A single genomic probe with its annotation cells
///
/// One `BackgroundRow` corresponds to one line of the background table.
/// The trait cells are stored in table column order; a cell is `None`
/// when the source field was empty.
#[derive(Debug, Clone)]
pub struct BackgroundRow {
    probe_id: String,
    entrez_id: String,
    cells: Vec<Option<String>>,
}

impl BackgroundRow {
    /// Initializes a new row
    ///
    /// This method should rarely, if ever, be used directly. Rows are
    /// created by the background parser and added to the table through
    /// [`BackgroundTable::add_row`].
    pub fn new(probe_id: &str, entrez_id: &str, cells: Vec<Option<String>>) -> Self {
        BackgroundRow {
            probe_id: probe_id.to_string(),
            entrez_id: entrez_id.to_string(),
            cells,
        }
    }

    /// The unique probe identifier, e.g. `cg00000029`
    pub fn probe_id(&self) -> &str {
        &self.probe_id
    }

    /// The `;`-joined ENTREZ gene IDs mapped to this probe
    pub fn entrez_id(&self) -> &str {
        &self.entrez_id
    }

    /// The annotation cell at the given column position
    ///
    /// Returns `None` if the cell is empty or the position is out of range
    pub fn cell(&self, position: usize) -> Option<&str> {
        self.cells.get(position).and_then(|cell| cell.as_deref())
    }
}

/// The full background annotation table
///
/// Owns all [`BackgroundRow`]s together with the names of the annotation
/// columns (everything beyond the `probeID` and `ENTREZID` key columns,
/// in file order) and a probe-id lookup for the sample join.
#[derive(Debug, Default)]
pub struct BackgroundTable {
    columns: Vec<String>,
    rows: Vec<BackgroundRow>,
    probes: HashMap<String, usize>,
}

impl BackgroundTable {
    /// Initializes an empty table with the given annotation column names
    pub fn new(columns: Vec<String>) -> Self {
        BackgroundTable {
            columns,
            rows: Vec::new(),
            probes: HashMap::new(),
        }
    }

    /// Adds one row to the table
    ///
    /// # Errors
    ///
    /// Returns [`CpgeaError::InvalidInput`] if the row does not have one
    /// cell per annotation column
    pub fn add_row(&mut self, row: BackgroundRow) -> CpgeaResult<()> {
        if row.cells.len() != self.columns.len() {
            return Err(CpgeaError::InvalidInput(format!(
                "probe {} has {} annotation cells, expected {}",
                row.probe_id,
                row.cells.len(),
                self.columns.len()
            )));
        }
        self.probes.insert(row.probe_id.clone(), self.rows.len());
        self.rows.push(row);
        Ok(())
    }

    /// The names of all annotation columns, in file order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All annotation columns whose name contains `substring`
    ///
    /// The match is case-insensitive on both sides. Returned in file
    /// order as `(position, name)` pairs.
    pub fn matching_columns(&self, substring: &str) -> Vec<(usize, &str)> {
        let needle = substring.to_lowercase();
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, col)| col.to_lowercase().contains(&needle))
            .map(|(position, col)| (position, col.as_str()))
            .collect()
    }

    /// The row for the given probe identifier
    pub fn row_by_probe(&self, probe_id: &str) -> Option<&BackgroundRow> {
        self.probes.get(probe_id).map(|idx| &self.rows[*idx])
    }

    /// All rows of the table
    pub fn rows(&self) -> impl Iterator<Item = &BackgroundRow> {
        self.rows.iter()
    }

    /// The number of rows in the table
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Inner-joins the sample probe identifiers against the table
    ///
    /// Every returned row is a background row whose probe ID occurs in the
    /// sample. Sample probes without a background match are silently
    /// dropped; duplicate sample IDs produce duplicate joined rows.
    ///
    /// # Errors
    ///
    /// Returns [`CpgeaError::EmptyJoin`] if not a single sample probe is
    /// present in the table, so the caller can tell "no overlap" apart
    /// from a parse failure
    pub fn subset(&self, sample_ids: &[String]) -> CpgeaResult<Vec<&BackgroundRow>> {
        let joined: Vec<&BackgroundRow> = sample_ids
            .iter()
            .filter_map(|probe_id| self.row_by_probe(probe_id))
            .collect();
        if joined.is_empty() {
            return Err(CpgeaError::EmptyJoin);
        }
        Ok(joined)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn table() -> BackgroundTable {
        let mut table = BackgroundTable::new(vec![
            "human_c2".to_string(),
            "Human_H".to_string(),
            "mouse_m5".to_string(),
        ]);
        for (probe, cell) in [
            ("cg01", Some("cancer")),
            ("cg02", Some("cancer;diabetes")),
            ("cg03", None),
        ] {
            table
                .add_row(BackgroundRow::new(
                    probe,
                    "1234",
                    vec![cell.map(String::from), None, None],
                ))
                .unwrap();
        }
        table
    }

    #[test]
    fn lookup_by_probe() {
        let table = table();
        assert_eq!(table.len(), 3);
        assert_eq!(table.row_by_probe("cg02").unwrap().cell(0), Some("cancer;diabetes"));
        assert!(table.row_by_probe("cg99").is_none());
    }

    #[test]
    fn rejects_ragged_row() {
        let mut table = table();
        let row = BackgroundRow::new("cg04", "99", vec![None]);
        assert!(table.add_row(row).is_err());
    }

    #[test]
    fn matching_columns_case_insensitive() {
        let table = table();
        let cols: Vec<&str> = table
            .matching_columns("HUMAN")
            .into_iter()
            .map(|(_, name)| name)
            .collect();
        assert_eq!(cols, vec!["human_c2", "Human_H"]);
        assert!(table.matching_columns("zebrafish").is_empty());
    }

    #[test]
    fn subset_is_inner_join() {
        let table = table();
        let ids = vec![
            "cg02".to_string(),
            "cg77".to_string(),
            "cg02".to_string(),
            "cg03".to_string(),
        ];
        let joined = table.subset(&ids).unwrap();
        // cg77 dropped, duplicate cg02 kept twice
        assert_eq!(joined.len(), 3);
        for row in &joined {
            assert!(ids.contains(&row.probe_id().to_string()));
            assert!(table.row_by_probe(row.probe_id()).is_some());
        }
    }

    #[test]
    fn subset_without_overlap_fails() {
        let table = table();
        let ids = vec!["cg88".to_string(), "cg99".to_string()];
        assert!(matches!(table.subset(&ids), Err(CpgeaError::EmptyJoin)));
    }
}
