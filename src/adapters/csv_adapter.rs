//! CSV file data adapter.
//!
//! One file per instrument, `{dir}/{code}{suffix}`, with a header row naming
//! `Date, Open, High, Low, Close, Adj Close, Volume` in any column order.

use crate::domain::error::PullbackError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_FILE_SUFFIX: &str = "_data_his.csv";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvAdapter {
    base_path: PathBuf,
    suffix: String,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self::with_suffix(base_path, DEFAULT_FILE_SUFFIX)
    }

    pub fn with_suffix(base_path: PathBuf, suffix: impl Into<String>) -> Self {
        Self {
            base_path,
            suffix: suffix.into(),
        }
    }

    pub fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}{}", code, self.suffix))
    }
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    adjusted_close: usize,
    volume: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, PullbackError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| PullbackError::Data {
                    reason: format!("missing {} column", name),
                })
        };
        Ok(Columns {
            date: find("Date")?,
            open: find("Open")?,
            high: find("High")?,
            low: find("Low")?,
            close: find("Close")?,
            adjusted_close: find("Adj Close")?,
            volume: find("Volume")?,
        })
    }
}

fn field<'r>(record: &'r csv::StringRecord, index: usize, name: &str) -> Result<&'r str, PullbackError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| PullbackError::Data {
            reason: format!("missing {} value", name),
        })
}

fn price(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, PullbackError> {
    let raw = field(record, index, name)?;
    let value: f64 = raw.parse().map_err(|e| PullbackError::Data {
        reason: format!("invalid {} value {:?}: {}", name, raw, e),
    })?;
    if !value.is_finite() {
        return Err(PullbackError::Data {
            reason: format!("non-finite {} value {:?}", name, raw),
        });
    }
    if value <= 0.0 {
        return Err(PullbackError::Data {
            reason: format!("non-positive {} value {:?}", name, raw),
        });
    }
    Ok(value)
}

// Some exports write volume as a float ("1234.0").
fn volume(record: &csv::StringRecord, index: usize) -> Result<i64, PullbackError> {
    let raw = field(record, index, "volume")?;
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(v);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v as i64),
        _ => Err(PullbackError::Data {
            reason: format!("invalid volume value {:?}", raw),
        }),
    }
}

impl DataPort for CsvAdapter {
    fn fetch_series(&self, code: &str) -> Result<Vec<PriceBar>, PullbackError> {
        let path = self.csv_path(code);
        let content = fs::read_to_string(&path).map_err(|e| PullbackError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| PullbackError::Data {
            reason: format!("CSV header error: {}", e),
        })?;
        let cols = Columns::locate(headers)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| PullbackError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = field(&record, cols.date, "date")?;
            let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).map_err(|e| {
                PullbackError::Data {
                    reason: format!("invalid date format {:?}: {}", date_str, e),
                }
            })?;

            bars.push(PriceBar {
                date,
                open: price(&record, cols.open, "open")?,
                high: price(&record, cols.high, "high")?,
                low: price(&record, cols.low, "low")?,
                close: price(&record, cols.close, "close")?,
                adjusted_close: price(&record, cols.adjusted_close, "adj close")?,
                volume: volume(&record, cols.volume)?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, PullbackError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| PullbackError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PullbackError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(code) = name_str.strip_suffix(self.suffix.as_str()) {
                if !code.is_empty() {
                    symbols.push(code.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: &str = "Date,Open,High,Low,Close,Adj Close,Volume\n";

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = format!(
            "{}2024-01-17,110.0,120.0,105.0,115.0,114.5,55000\n\
             2024-01-15,100.0,110.0,90.0,105.0,104.5,50000\n\
             2024-01-16,105.0,115.0,100.0,110.0,109.5,60000\n",
            HEADER
        );

        fs::write(path.join("LLY_data_his.csv"), csv_content).unwrap();
        fs::write(path.join("UNH_data_his.csv"), HEADER).unwrap();
        fs::write(path.join("notes.txt"), "ignore me").unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_series_returns_sorted_bars() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_series("LLY").unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].adjusted_close, 104.5);
        assert_eq!(bars[0].volume, 50000);
        assert_eq!(bars[2].date, NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
    }

    #[test]
    fn columns_found_by_header_name() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("JNJ_data_his.csv"),
            "Volume,Adj Close,Date,Close,Low,High,Open\n1200.0,9.5,2024-03-01,10.0,9.0,11.0,9.8\n",
        )
        .unwrap();
        let bars = CsvAdapter::new(dir.path().to_path_buf())
            .fetch_series("JNJ")
            .unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].open, 9.8);
        assert_eq!(bars[0].adjusted_close, 9.5);
        assert_eq!(bars[0].volume, 1200);
    }

    #[test]
    fn header_only_file_is_empty() {
        let (_dir, path) = setup_test_data();
        assert!(CsvAdapter::new(path).fetch_series("UNH").unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_error() {
        let (_dir, path) = setup_test_data();
        let result = CsvAdapter::new(path).fetch_series("XYZ");
        assert!(matches!(result, Err(PullbackError::Data { .. })));
    }

    #[test]
    fn missing_column_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("ABT_data_his.csv"),
            "Date,Open,High,Low,Close,Volume\n2024-01-02,1,2,0.5,1.5,100\n",
        )
        .unwrap();
        let err = CsvAdapter::new(dir.path().to_path_buf())
            .fetch_series("ABT")
            .unwrap_err();
        assert!(err.to_string().contains("Adj Close"));
    }

    #[test]
    fn non_finite_price_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("MRK_data_his.csv"),
            format!("{}2024-01-02,1,NaN,0.5,1.5,1.5,100\n", HEADER),
        )
        .unwrap();
        let err = CsvAdapter::new(dir.path().to_path_buf())
            .fetch_series("MRK")
            .unwrap_err();
        assert!(err.to_string().contains("non-finite high"));
    }

    #[test]
    fn non_positive_price_rejected() {
        for (row, field) in [
            ("2024-01-02,1,2,0.5,1.5,0,100\n", "non-positive adj close"),
            ("2024-01-02,1,2,-0.5,1.5,1.5,100\n", "non-positive low"),
        ] {
            let dir = TempDir::new().unwrap();
            fs::write(
                dir.path().join("BMY_data_his.csv"),
                format!("{}{}", HEADER, row),
            )
            .unwrap();
            let err = CsvAdapter::new(dir.path().to_path_buf())
                .fetch_series("BMY")
                .unwrap_err();
            assert!(err.to_string().contains(field), "{}", err);
        }
    }

    #[test]
    fn unparseable_value_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("PFE_data_his.csv"),
            format!("{}2024-01-02,null,2,0.5,1.5,1.5,100\n", HEADER),
        )
        .unwrap();
        let result = CsvAdapter::new(dir.path().to_path_buf()).fetch_series("PFE");
        assert!(matches!(result, Err(PullbackError::Data { reason }) if reason.contains("open")));
    }

    #[test]
    fn list_symbols_matches_suffix() {
        let (_dir, path) = setup_test_data();
        let symbols = CsvAdapter::new(path).list_symbols().unwrap();
        assert_eq!(symbols, vec!["LLY", "UNH"]);
    }

    #[test]
    fn custom_suffix() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ZTS.csv"), HEADER).unwrap();
        fs::write(dir.path().join("LLY_data_his.csv"), HEADER).unwrap();
        let adapter = CsvAdapter::with_suffix(dir.path().to_path_buf(), ".csv");

        assert_eq!(adapter.csv_path("ZTS"), dir.path().join("ZTS.csv"));
        // "LLY_data_his.csv" also ends in ".csv"
        assert_eq!(adapter.list_symbols().unwrap(), vec!["LLY_data_his", "ZTS"]);
    }
}
