//! Tokenizes `Date,Category,Amount` CSV text into raw rows.
//!
//! Only tokenization happens here; every row, however malformed, is handed to
//! validation so it shows up in the load report instead of vanishing.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::warn;

use crate::errors::Result;
use crate::ledger::RawRecord;

const DATE_COLUMN: usize = 0;
const CATEGORY_COLUMN: usize = 1;
const AMOUNT_COLUMN: usize = 2;

/// Reads every data row from `reader`. The first line is treated as a header.
/// Short rows yield empty fields; rows the CSV layer cannot decode at all are
/// logged and skipped.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    if !looks_like_expected_header(&headers) {
        warn!(header = ?headers, "unexpected CSV header; reading columns by position");
    }

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        match result {
            Ok(record) => rows.push(to_raw(&record)),
            Err(err) => warn!(row = index + 1, error = %err, "unreadable CSV row skipped"),
        }
    }
    Ok(rows)
}

pub fn read_csv_str(text: &str) -> Result<Vec<RawRecord>> {
    read_csv(text.as_bytes())
}

fn to_raw(record: &StringRecord) -> RawRecord {
    let field = |column: usize| record.get(column).unwrap_or_default().to_string();
    RawRecord::new(
        field(DATE_COLUMN),
        field(CATEGORY_COLUMN),
        field(AMOUNT_COLUMN),
    )
}

fn looks_like_expected_header(headers: &StringRecord) -> bool {
    let expected = ["date", "category", "amount"];
    headers.len() >= expected.len()
        && expected
            .iter()
            .zip(headers.iter())
            .all(|(want, got)| got.trim().eq_ignore_ascii_case(want))
}
