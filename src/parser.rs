//! Parsing the background annotation table and the uploaded sample list

/// Module to parse the tab-separated background annotation table
///
/// The table is produced by the annotation ETL and must carry a `probeID`
/// and an `ENTREZID` column; every other column is treated as a trait
/// annotation column. Rows whose `ENTREZID` cell is empty are dropped
/// right at load time, before any counting happens.
pub mod background {
    use std::fs::File;
    use std::io::{BufReader, Read};
    use std::path::Path;

    use csv::ReaderBuilder;

    use crate::table::{BackgroundRow, BackgroundTable};
    use crate::{CpgeaError, CpgeaResult};

    const PROBE_COLUMN: &str = "probeID";
    const ENTREZ_COLUMN: &str = "ENTREZID";

    /// Parses the background table from a tab-separated file
    ///
    /// # Errors
    ///
    /// [`CpgeaError::CannotOpenFile`] if the file cannot be opened,
    /// [`CpgeaError::InvalidInput`] if the header misses a required
    /// column or a row has the wrong number of fields
    pub fn parse<P: AsRef<Path>>(file: P) -> CpgeaResult<BackgroundTable> {
        let filename = file.as_ref().display().to_string();
        let fh =
            File::open(&file).map_err(|_| CpgeaError::CannotOpenFile(filename.clone()))?;
        from_reader(BufReader::new(fh), &filename)
    }

    /// Parses the background table from any reader
    pub fn from_reader<R: Read>(reader: R, source: &str) -> CpgeaResult<BackgroundTable> {
        let mut tsv = ReaderBuilder::new().delimiter(b'\t').from_reader(reader);

        let headers = tsv
            .headers()
            .map_err(|err| CpgeaError::InvalidInput(format!("{source}: {err}")))?
            .clone();

        let probe_pos = column_position(&headers, PROBE_COLUMN, source)?;
        let entrez_pos = column_position(&headers, ENTREZ_COLUMN, source)?;

        // every column beyond the two key columns is an annotation column
        let annotation_pos: Vec<usize> = (0..headers.len())
            .filter(|pos| *pos != probe_pos && *pos != entrez_pos)
            .collect();
        let columns: Vec<String> = annotation_pos
            .iter()
            .map(|pos| headers[*pos].to_string())
            .collect();

        let mut table = BackgroundTable::new(columns);
        for record in tsv.records() {
            let record =
                record.map_err(|err| CpgeaError::InvalidInput(format!("{source}: {err}")))?;
            let Some(entrez_id) = record.get(entrez_pos).filter(|id| !id.is_empty()) else {
                continue;
            };
            let probe_id = record.get(probe_pos).ok_or_else(|| {
                CpgeaError::InvalidInput(format!("{source}: record without a probe ID"))
            })?;
            let cells = annotation_pos
                .iter()
                .map(|pos| {
                    record
                        .get(*pos)
                        .filter(|cell| !cell.is_empty())
                        .map(String::from)
                })
                .collect();
            table.add_row(BackgroundRow::new(probe_id, entrez_id, cells))?;
        }
        Ok(table)
    }

    fn column_position(
        headers: &csv::StringRecord,
        name: &str,
        source: &str,
    ) -> CpgeaResult<usize> {
        headers.iter().position(|header| header == name).ok_or_else(|| {
            CpgeaError::InvalidInput(format!("{source}: missing required column {name}"))
        })
    }

    #[cfg(test)]
    mod test {
        use super::*;

        const TABLE: &str = "probeID\tENTREZID\thuman_c2\thuman_H\n\
            cg01\t123\tcancer\tt1\n\
            cg02\t456\tcancer;diabetes\t\n\
            cg03\t\tobesity\tt2\n\
            cg04\t789\t\tt2\n";

        #[test]
        fn parses_columns_and_rows() {
            let table = from_reader(TABLE.as_bytes(), "test").unwrap();
            assert_eq!(table.columns(), ["human_c2", "human_H"]);
            // cg03 has no ENTREZID and is dropped
            assert_eq!(table.len(), 3);
            assert!(table.row_by_probe("cg03").is_none());
        }

        #[test]
        fn empty_cells_are_absent() {
            let table = from_reader(TABLE.as_bytes(), "test").unwrap();
            let row = table.row_by_probe("cg04").unwrap();
            assert_eq!(row.cell(0), None);
            assert_eq!(row.cell(1), Some("t2"));
        }

        #[test]
        fn multi_valued_cells_stay_joined() {
            let table = from_reader(TABLE.as_bytes(), "test").unwrap();
            let row = table.row_by_probe("cg02").unwrap();
            assert_eq!(row.cell(0), Some("cancer;diabetes"));
        }

        #[test]
        fn key_columns_can_appear_anywhere() {
            let shuffled = "human_c2\tprobeID\tENTREZID\ncancer\tcg01\t123\n";
            let table = from_reader(shuffled.as_bytes(), "test").unwrap();
            assert_eq!(table.columns(), ["human_c2"]);
            assert_eq!(table.row_by_probe("cg01").unwrap().cell(0), Some("cancer"));
        }

        #[test]
        fn missing_probe_column_fails() {
            let headerless = "id\tENTREZID\thuman_c2\ncg01\t123\tcancer\n";
            let res = from_reader(headerless.as_bytes(), "test");
            assert!(matches!(res, Err(CpgeaError::InvalidInput(_))));
        }

        #[test]
        fn missing_entrez_column_fails() {
            let headerless = "probeID\thuman_c2\ncg01\tcancer\n";
            let res = from_reader(headerless.as_bytes(), "test");
            assert!(matches!(res, Err(CpgeaError::InvalidInput(_))));
        }

        #[test]
        fn ragged_row_fails() {
            let ragged = "probeID\tENTREZID\thuman_c2\ncg01\t123\n";
            let res = from_reader(ragged.as_bytes(), "test");
            assert!(res.is_err());
        }
    }
}

/// Module to parse the uploaded sample file
///
/// The sample is a header-free list of probe identifiers, one per line.
pub mod sample {
    use std::fs::File;
    use std::io::{BufRead, BufReader};
    use std::path::Path;

    use crate::{CpgeaError, CpgeaResult};

    /// Parses the sample probe identifiers
    ///
    /// Blank lines are skipped; duplicates are kept in upload order.
    ///
    /// # Errors
    ///
    /// [`CpgeaError::CannotOpenFile`] if the file cannot be opened,
    /// [`CpgeaError::InvalidInput`] if a line holds more than one column
    pub fn parse<P: AsRef<Path>>(file: P) -> CpgeaResult<Vec<String>> {
        let filename = file.as_ref().display().to_string();
        let fh =
            File::open(&file).map_err(|_| CpgeaError::CannotOpenFile(filename.clone()))?;
        from_reader(BufReader::new(fh), &filename)
    }

    /// Parses the sample list from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R, source: &str) -> CpgeaResult<Vec<String>> {
        let mut ids = Vec::new();
        for line in reader.lines() {
            let line =
                line.map_err(|err| CpgeaError::InvalidInput(format!("{source}: {err}")))?;
            let id = line.trim();
            if id.is_empty() {
                continue;
            }
            if id.contains(',') || id.contains('\t') {
                return Err(CpgeaError::InvalidInput(format!(
                    "{source}: expected a single probe ID per line, got {id:?}"
                )));
            }
            ids.push(id.to_string());
        }
        Ok(ids)
    }

}
