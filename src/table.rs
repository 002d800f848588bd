use crate::record::{HEADER, Record};

/// In-memory image of the worksheet: the fixed header plus the data rows,
/// each exactly four cells wide.
///
/// The table is always the *entire* sheet content. It is built fresh from
/// the remote values on every submission, mutated in memory, written back
/// whole, and then dropped; nothing is cached between submissions.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// Number of columns the sheet uses.
    pub const WIDTH: usize = 4;

    /// Build a table from the raw value grid returned by the API.
    ///
    /// The first row is taken as the header; remaining rows are clipped or
    /// padded to four cells, and rows whose cells are all empty are
    /// discarded. A blank sheet (or blank first row) gets the canonical
    /// header so the write-back always produces a labeled sheet.
    pub fn from_values(values: Vec<Vec<String>>) -> Self {
        let mut iter = values.into_iter();

        let header = match iter.next() {
            Some(first) => {
                let first = normalize_row(first);
                if is_blank_row(&first) {
                    canonical_header()
                } else {
                    first
                }
            }
            None => canonical_header(),
        };

        let rows = iter
            .map(normalize_row)
            .filter(|row| !is_blank_row(row))
            .collect();

        SheetTable { header, rows }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Data rows currently in the table (header excluded).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Append one record as the final row. No deduplication, no sorting.
    pub fn push_record(&mut self, record: &Record) {
        self.rows.push(record.to_cells().to_vec());
    }

    /// The full grid to write back: header first, then every data row.
    pub fn to_values(&self) -> Vec<Vec<String>> {
        let mut values = Vec::with_capacity(self.rows.len() + 1);
        values.push(self.header.clone());
        values.extend(self.rows.iter().cloned());
        values
    }
}

/// Clip a raw row to the first four cells and pad short rows with empties.
fn normalize_row(row: Vec<String>) -> Vec<String> {
    let mut row = row;
    row.truncate(SheetTable::WIDTH);
    while row.len() < SheetTable::WIDTH {
        row.push(String::new());
    }
    row
}

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

fn canonical_header() -> Vec<String> {
    HEADER.iter().map(|name| name.to_string()).collect()
}
