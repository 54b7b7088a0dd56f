//! In-memory tracker table: a header row plus data rows of string cells.

use serde::Serialize;

use crate::config::TABLE_HEADERS;

/// Column holding the message identifier when the header does not name it.
const DEFAULT_MESSAGE_ID_COLUMN: usize = 6;
const DEFAULT_STATUS_COLUMN: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Empty table with the tracker header row.
    pub fn with_default_headers() -> Self {
        Self {
            headers: TABLE_HEADERS.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Install the tracker header row, but only if no header is present yet.
    pub fn ensure_headers(&mut self) {
        if self.headers.iter().all(|h| h.trim().is_empty()) {
            self.headers = TABLE_HEADERS.iter().map(|h| h.to_string()).collect();
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column named `name`, if the header row has it.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    pub fn message_id_column(&self) -> usize {
        self.column("Message ID").unwrap_or(DEFAULT_MESSAGE_ID_COLUMN)
    }

    pub fn status_column(&self) -> usize {
        self.column("Status").unwrap_or(DEFAULT_STATUS_COLUMN)
    }

    /// Lay out a row given in `TABLE_HEADERS` order under this table's header.
    ///
    /// Columns the header does not name stay empty. The message id always
    /// lands in [`Table::message_id_column`] so later merges find it.
    pub fn align_row(&self, row: &[String]) -> Vec<String> {
        let id_column = self.message_id_column();
        let width = self.headers.len().max(id_column + 1);
        let field = |index: usize| row.get(index).cloned().unwrap_or_default();

        (0..width)
            .map(|column| {
                if column == id_column {
                    return field(DEFAULT_MESSAGE_ID_COLUMN);
                }
                self.headers
                    .get(column)
                    .and_then(|h| TABLE_HEADERS.iter().position(|name| *name == h.trim()))
                    .map(field)
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Cell value, treating short rows as having empty trailing cells.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_headers_locate_columns() {
        let table = Table::with_default_headers();
        assert_eq!(table.message_id_column(), 6);
        assert_eq!(table.status_column(), 2);
        assert!(table.is_empty());
    }

    #[test]
    fn ensure_headers_keeps_existing_header() {
        let mut table = Table {
            headers: vec!["Status".to_string(), "Message ID".to_string()],
            rows: Vec::new(),
        };
        table.ensure_headers();
        assert_eq!(table.headers.len(), 2);
        assert_eq!(table.message_id_column(), 1);
        assert_eq!(table.status_column(), 0);
    }

    #[test]
    fn ensure_headers_fills_blank_header() {
        let mut table = Table::default();
        table.ensure_headers();
        assert_eq!(table.headers.len(), 8);
        assert_eq!(table.headers[0], "Company");
    }

    fn default_row() -> Vec<String> {
        TABLE_HEADERS.iter().map(|h| format!("{h} value")).collect()
    }

    #[test]
    fn align_row_keeps_default_layout() {
        let table = Table::with_default_headers();
        assert_eq!(table.align_row(&default_row()), default_row());
    }

    #[test]
    fn align_row_follows_reordered_header() {
        let table = Table {
            headers: vec![
                "Message ID".to_string(),
                "Notes".to_string(),
                " Status ".to_string(),
                "Company".to_string(),
            ],
            rows: Vec::new(),
        };
        let row = table.align_row(&default_row());
        assert_eq!(row, ["Message ID value", "", "Status value", "Company value"]);
    }

    #[test]
    fn align_row_without_id_header_uses_fallback_column() {
        let table = Table {
            headers: vec!["Company".to_string(), "Status".to_string()],
            rows: Vec::new(),
        };
        let row = table.align_row(&default_row());
        assert_eq!(row.len(), 7);
        assert_eq!(row[0], "Company value");
        assert_eq!(row[1], "Status value");
        assert_eq!(row[6], "Message ID value");
        assert_eq!(table.message_id_column(), 6);
    }

    #[test]
    fn short_rows_read_as_empty_cells() {
        let table = Table {
            headers: Table::with_default_headers().headers,
            rows: vec![vec!["Acme".to_string()]],
        };
        assert_eq!(table.cell(0, 0), "Acme");
        assert_eq!(table.cell(0, 6), "");
        assert_eq!(table.cell(5, 0), "");
    }
}
