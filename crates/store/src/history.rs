use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use progress_core::TimeSeries;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};

/// Loads the persisted series. A missing file is an empty series; an
/// unreadable or malformed one is an error so it never gets overwritten.
pub fn load_series(path: &Path) -> Result<TimeSeries> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "no history file yet; starting a new series");
            return Ok(TimeSeries::new());
        }
        Err(err) => return Err(StoreError::io(path, err)),
    };
    let series: TimeSeries = serde_json::from_slice(&data).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    if series.is_normalized() {
        debug!(path = %path.display(), entries = series.len(), "loaded history");
        return Ok(series);
    }
    warn!(path = %path.display(), "history out of order or duplicated; normalizing");
    Ok(TimeSeries::from_counts(series.entries().iter().copied()))
}

/// Pretty JSON with a trailing newline, stable for a given series.
pub fn encode_series(series: &TimeSeries) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(series)?;
    bytes.push(b'\n');
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn missing_file_is_empty_series() {
        let dir = tempfile::tempdir().expect("tempdir");
        let series = load_series(&dir.path().join("absent.json")).expect("load");
        assert!(series.is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json").expect("write");
        let err = load_series(&path).expect_err("should fail");
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn out_of_order_file_is_normalized() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.json");
        fs::write(
            &path,
            r#"{"daily_counts":[
                {"date":"2024-01-02","words":650},
                {"date":"2024-01-01","words":500},
                {"date":"2024-01-02","words":660}
            ]}"#,
        )
        .expect("write");
        let series = load_series(&path).expect("load");
        assert_eq!(series.len(), 2);
        assert!(series.is_normalized());
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).expect("date");
        assert_eq!(series.get(day), Some(660));
    }

    #[test]
    fn encoding_is_stable() {
        let mut series = TimeSeries::new();
        series.upsert(NaiveDate::from_ymd_opt(2024, 1, 1).expect("date"), 500);
        let first = encode_series(&series).expect("encode");
        let second = encode_series(&series).expect("encode");
        assert_eq!(first, second);
        assert!(first.ends_with(b"}\n"));
    }
}
