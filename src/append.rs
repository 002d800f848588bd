use crate::record::Record;
use crate::sheets::{SheetError, SheetsClient, spreadsheet_id_from_url};
use crate::table::SheetTable;

/// What the append operation needs from a spreadsheet backend: list the
/// worksheet tabs, read the table, write the table. [`SheetsClient`] is the
/// production implementation; tests use an in-memory one.
#[allow(async_fn_in_trait)]
pub trait SheetBackend {
    async fn worksheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>, SheetError>;

    async fn read_table(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
    ) -> Result<Vec<Vec<String>>, SheetError>;

    async fn write_table(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        values: &[Vec<String>],
    ) -> Result<(), SheetError>;
}

impl SheetBackend for SheetsClient {
    async fn worksheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>, SheetError> {
        SheetsClient::worksheet_titles(self, spreadsheet_id).await
    }

    async fn read_table(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
    ) -> Result<Vec<Vec<String>>, SheetError> {
        SheetsClient::read_table(self, spreadsheet_id, worksheet).await
    }

    async fn write_table(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        values: &[Vec<String>],
    ) -> Result<(), SheetError> {
        SheetsClient::write_table(self, spreadsheet_id, worksheet, values).await
    }
}

/// Row counts reported back to the form after a successful append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendReport {
    /// Data rows that survived empty-row pruning.
    pub kept_rows: usize,
    /// Data rows written back, i.e. `kept_rows + 1`.
    pub written_rows: usize,
}

/// Append one record to the named worksheet of the spreadsheet behind
/// `sheet_url`.
///
/// The sequence is a full read-modify-write:
/// 1. resolve the spreadsheet id from the URL;
/// 2. resolve the worksheet by exact name against the tab list
///    ([`SheetError::WorksheetNotFound`] if absent);
/// 3. fetch the worksheet's content, first four columns, header first;
/// 4. drop rows whose cells are all empty;
/// 5. append the record as the last row;
/// 6. write the whole table back in a single update starting at A1.
///
/// Nothing spans the steps transactionally: a failure before step 6 leaves
/// the remote sheet untouched, while a failure inside the single write call
/// is the backend's problem. Two submissions racing on the same worksheet
/// are last-writer-wins; this tool is meant for one operator at a time.
pub async fn append_record<B: SheetBackend>(
    backend: &B,
    sheet_url: &str,
    worksheet: &str,
    record: &Record,
) -> Result<AppendReport, SheetError> {
    let spreadsheet_id = spreadsheet_id_from_url(sheet_url)?;

    let titles = backend.worksheet_titles(&spreadsheet_id).await?;
    if !titles.iter().any(|title| title == worksheet) {
        return Err(SheetError::WorksheetNotFound(worksheet.to_string()));
    }

    let raw = backend.read_table(&spreadsheet_id, worksheet).await?;
    let mut table = SheetTable::from_values(raw);
    let kept_rows = table.row_count();

    table.push_record(record);
    backend
        .write_table(&spreadsheet_id, worksheet, &table.to_values())
        .await?;

    log::info!(
        "appended record for '{}' to worksheet '{}' ({} -> {} rows)",
        record.name(),
        worksheet,
        kept_rows,
        table.row_count()
    );

    Ok(AppendReport {
        kept_rows,
        written_rows: table.row_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Sex;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Backend over a HashMap of worksheets, mimicking one reachable
    /// spreadsheet.
    struct InMemoryBackend {
        spreadsheet_id: String,
        worksheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
    }

    impl InMemoryBackend {
        fn new(spreadsheet_id: &str) -> Self {
            InMemoryBackend {
                spreadsheet_id: spreadsheet_id.to_string(),
                worksheets: Mutex::new(HashMap::new()),
            }
        }

        fn set_worksheet(&self, name: &str, values: Vec<Vec<String>>) {
            self.worksheets
                .lock()
                .unwrap()
                .insert(name.to_string(), values);
        }

        fn worksheet(&self, name: &str) -> Option<Vec<Vec<String>>> {
            self.worksheets.lock().unwrap().get(name).cloned()
        }
    }

    impl SheetBackend for InMemoryBackend {
        async fn worksheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>, SheetError> {
            if spreadsheet_id != self.spreadsheet_id {
                return Err(SheetError::SpreadsheetNotFound);
            }
            Ok(self.worksheets.lock().unwrap().keys().cloned().collect())
        }

        async fn read_table(
            &self,
            spreadsheet_id: &str,
            worksheet: &str,
        ) -> Result<Vec<Vec<String>>, SheetError> {
            if spreadsheet_id != self.spreadsheet_id {
                return Err(SheetError::SpreadsheetNotFound);
            }
            self.worksheets
                .lock()
                .unwrap()
                .get(worksheet)
                .cloned()
                .ok_or_else(|| SheetError::WorksheetNotFound(worksheet.to_string()))
        }

        async fn write_table(
            &self,
            spreadsheet_id: &str,
            worksheet: &str,
            values: &[Vec<String>],
        ) -> Result<(), SheetError> {
            if spreadsheet_id != self.spreadsheet_id {
                return Err(SheetError::SpreadsheetNotFound);
            }
            self.worksheets
                .lock()
                .unwrap()
                .insert(worksheet.to_string(), values.to_vec());
            Ok(())
        }
    }

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    fn url_for(id: &str) -> String {
        format!("https://docs.google.com/spreadsheets/d/{}/edit#gid=0", id)
    }

    const HEADER_ROW: &[&str] = &["Child Name", "Sex", "Age (Months)", "Height (cm)"];

    #[tokio::test]
    async fn append_adds_exactly_one_row() {
        let backend = InMemoryBackend::new("sheet-1");
        backend.set_worksheet(
            "Sheet1",
            grid(&[
                HEADER_ROW,
                &["Alice", "Female", "12", "75.5"],
                &["Caro", "Female", "30", "88.2"],
            ]),
        );
        let record = Record::new("Bob", Sex::Male, 24, 85.0).unwrap();

        let report = append_record(&backend, &url_for("sheet-1"), "Sheet1", &record)
            .await
            .unwrap();

        assert_eq!(report.kept_rows, 2);
        assert_eq!(report.written_rows, 3);
        let rows = backend.worksheet("Sheet1").unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3], vec!["Bob", "Male", "24", "85.0"]);
    }

    #[tokio::test]
    async fn empty_rows_never_survive_the_append() {
        let backend = InMemoryBackend::new("sheet-1");
        backend.set_worksheet(
            "Sheet1",
            grid(&[
                HEADER_ROW,
                &["", "", "", ""],
                &["Alice", "Female", "12", "75.5"],
                &["", "", "", ""],
                &["", "", "", ""],
            ]),
        );
        let record = Record::new("Bob", Sex::Male, 24, 85.0).unwrap();

        append_record(&backend, &url_for("sheet-1"), "Sheet1", &record)
            .await
            .unwrap();

        let rows = backend.worksheet("Sheet1").unwrap();
        assert_eq!(
            rows,
            grid(&[
                HEADER_ROW,
                &["Alice", "Female", "12", "75.5"],
                &["Bob", "Male", "24", "85.0"],
            ])
        );
    }

    #[tokio::test]
    async fn unknown_spreadsheet_reports_not_found_and_writes_nothing() {
        let backend = InMemoryBackend::new("sheet-1");
        backend.set_worksheet("Sheet1", grid(&[HEADER_ROW]));
        let record = Record::new("Bob", Sex::Male, 24, 85.0).unwrap();

        let result = append_record(&backend, &url_for("other-sheet"), "Sheet1", &record).await;

        assert!(matches!(result, Err(SheetError::SpreadsheetNotFound)));
        assert_eq!(backend.worksheet("Sheet1").unwrap(), grid(&[HEADER_ROW]));
    }

    #[tokio::test]
    async fn unknown_worksheet_reports_its_name() {
        let backend = InMemoryBackend::new("sheet-1");
        backend.set_worksheet("Sheet1", grid(&[HEADER_ROW]));
        let record = Record::new("Bob", Sex::Male, 24, 85.0).unwrap();

        let result = append_record(&backend, &url_for("sheet-1"), "Sheet2", &record).await;

        match result {
            Err(SheetError::WorksheetNotFound(name)) => assert_eq!(name, "Sheet2"),
            other => panic!("expected WorksheetNotFound, got {:?}", other),
        }
        assert_eq!(backend.worksheet("Sheet1").unwrap(), grid(&[HEADER_ROW]));
    }

    #[tokio::test]
    async fn blank_worksheet_gets_header_plus_record() {
        let backend = InMemoryBackend::new("sheet-1");
        backend.set_worksheet("Sheet1", Vec::new());
        let record = Record::new("Alice", Sex::Female, 12, 75.5).unwrap();

        append_record(&backend, &url_for("sheet-1"), "Sheet1", &record)
            .await
            .unwrap();

        assert_eq!(
            backend.worksheet("Sheet1").unwrap(),
            grid(&[HEADER_ROW, &["Alice", "Female", "12", "75.5"]])
        );
    }

    // The end-to-end property from the original tool: Alice is already in
    // the sheet, Bob is submitted, the sheet ends with both in order.
    #[tokio::test]
    async fn alice_then_bob_end_to_end() {
        let backend = InMemoryBackend::new("growth");
        backend.set_worksheet(
            "Sheet1",
            grid(&[HEADER_ROW, &["Alice", "Female", "12", "75.5"]]),
        );
        let record = Record::new("Bob", Sex::Male, 24, 85.0).unwrap();

        append_record(&backend, &url_for("growth"), "Sheet1", &record)
            .await
            .unwrap();

        assert_eq!(
            backend.worksheet("Sheet1").unwrap(),
            grid(&[
                HEADER_ROW,
                &["Alice", "Female", "12", "75.5"],
                &["Bob", "Male", "24", "85.0"],
            ])
        );
    }
}
