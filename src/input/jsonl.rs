use std::io::BufRead;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::input::{InputError, open_maybe_gz};

/// Reads one JSON value per line. Blank lines are skipped; the record index in
/// parse errors counts only non-blank lines.
pub fn load_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, InputError> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();
    let mut records = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let read = reader
            .read_line(&mut buf)
            .map_err(|e| InputError::io(path, e))?;
        if read == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim();
        if line.is_empty() {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|source| InputError::Parse {
            path: path.to_path_buf(),
            line: line_no,
            index: records.len(),
            source,
        })?;
        records.push(record);
    }

    if records.is_empty() {
        return Err(InputError::Empty(path.to_path_buf()));
    }

    Ok(records)
}
