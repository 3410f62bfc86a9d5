use crate::ingest::encoding::TextEncoding;

#[derive(Debug, Clone)]
pub struct RawTable {
    /// Column names exactly as they appear in the header row.
    pub headers: Vec<String>,
    /// Each data row, padded with empty strings to the header width.
    pub rows: Vec<Vec<String>>,
    /// Encoding that decoded the file.
    pub encoding: TextEncoding,
    /// Field delimiter that tokenised the file.
    pub delimiter: u8,
}

impl RawTable {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.headers.len()
    }
}
