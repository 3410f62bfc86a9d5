// src/ingest/mod.rs
pub mod encoding;
pub mod raw_table;

pub use encoding::{TextEncoding, CANDIDATES};
pub use raw_table::RawTable;

use csv::ReaderBuilder;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Field delimiters, tried in order. Each one gets a full pass over
/// [`CANDIDATES`] before the next is considered.
pub const DELIMITERS: [u8; 2] = [b',', b';'];

/// Why a single encoding/delimiter combination was rejected.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("bytes are not valid {0}")]
    Decode(TextEncoding),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("record {record} has {found} fields, header has {expected}")]
    TooManyFields {
        record: usize,
        expected: usize,
        found: usize,
    },
    #[error("no header row")]
    Empty,
    #[error("header has a single column")]
    SingleColumn,
}

#[derive(Debug)]
pub struct Attempt {
    pub encoding: TextEncoding,
    pub delimiter: u8,
    pub error: AttemptError,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/'{}': {}",
            self.encoding,
            self.delimiter as char,
            self.error
        )
    }
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("지원 인코딩/구분자 조합으로 읽을 수 없습니다 ({})", summarize(.attempts))]
    Unreadable { attempts: Vec<Attempt> },
}

fn summarize(attempts: &[Attempt]) -> String {
    attempts
        .iter()
        .map(Attempt::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse `raw` as CSV, trying every delimiter × encoding combination in
/// priority order and returning the first that parses.
///
/// The buffer is only borrowed, so each attempt starts from the first byte.
#[tracing::instrument(level = "info", skip(raw), fields(bytes = raw.len()))]
pub fn read_csv_safely(raw: &[u8]) -> Result<RawTable, ReadError> {
    let mut attempts = Vec::with_capacity(DELIMITERS.len() * CANDIDATES.len());

    for &delimiter in &DELIMITERS {
        for &encoding in &CANDIDATES {
            match parse_with(raw, encoding, delimiter) {
                Ok(table) => {
                    info!(
                        %encoding,
                        delimiter = %(delimiter as char),
                        columns = table.num_columns(),
                        rows = table.num_rows(),
                        "parsed CSV"
                    );
                    return Ok(table);
                }
                Err(error) => {
                    debug!(%encoding, delimiter = %(delimiter as char), %error, "attempt rejected");
                    attempts.push(Attempt {
                        encoding,
                        delimiter,
                        error,
                    });
                }
            }
        }
    }

    warn!(attempts = attempts.len(), "no encoding/delimiter combination parsed");
    Err(ReadError::Unreadable { attempts })
}

/// One attempt: strict decode, then tokenise with `delimiter`.
///
/// Short records are padded (the missing cells simply have no value);
/// records wider than the header reject the attempt.
pub fn parse_with(
    raw: &[u8],
    encoding: TextEncoding,
    delimiter: u8,
) -> Result<RawTable, AttemptError> {
    let text = encoding
        .decode(raw)
        .ok_or(AttemptError::Decode(encoding))?;

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    match headers.len() {
        0 => return Err(AttemptError::Empty),
        1 => return Err(AttemptError::SingleColumn),
        _ => {}
    }

    let width = headers.len();
    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        if record.len() > width {
            return Err(AttemptError::TooManyFields {
                record: idx + 1,
                expected: width,
                found: record.len(),
            });
        }
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(RawTable {
        headers,
        rows,
        encoding,
        delimiter,
    })
}
