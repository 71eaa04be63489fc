//! JSON Lines record loading.
//!
//! One self-contained JSON object per line. A malformed line or a record
//! without a numeric `timestamp_ms` fails the whole source; bad lines are
//! never silently skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use contracts::{ContractError, Record, RecordError, TIMESTAMP_FIELD};
use tracing::info;

/// Read every record from a JSON Lines source.
///
/// Blank lines are tolerated (trailing newlines); anything else that does
/// not parse into a timestamped object aborts the load with the offending
/// 1-based line number.
pub fn load_records(path: &Path) -> Result<Vec<Record>, ContractError> {
    let file = File::open(path).map_err(|source| ContractError::SourceRead {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|source| ContractError::SourceRead {
            path: path.to_path_buf(),
            source,
        })?;

        if line.trim().is_empty() {
            continue;
        }

        let value: serde_json::Value = serde_json::from_str(&line)
            .map_err(|e| ContractError::record_parse(path, line_no, e.to_string()))?;

        let record = Record::from_value(value).map_err(|e| match e {
            RecordError::NotAnObject => {
                ContractError::record_parse(path, line_no, e.to_string())
            }
            RecordError::MissingTimestamp => ContractError::MissingTimestamp {
                path: path.to_path_buf(),
                line: line_no,
                field: TIMESTAMP_FIELD,
            },
            RecordError::NonFiniteTimestamp(value) => ContractError::NonFiniteTimestamp {
                path: path.to_path_buf(),
                line: line_no,
                value,
            },
        })?;

        records.push(record);
    }

    info!(
        path = %path.display(),
        records = records.len(),
        "Loaded record source"
    );

    Ok(records)
}
