use crate::data::validation::validate_bars;
use crate::error::EngineError;
use csv::{ReaderBuilder, StringRecord};
use shared::models::Bar;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Loads bars from kline exports.
///
/// Header: `start,open,high,low,close,volume[,turnover]`, comma delimited,
/// `start` in epoch milliseconds. Columns are located by header name so their
/// order does not matter. Rows may come in any order; the result is sorted
/// oldest first and validated.
pub struct BarCsvLoader;

impl BarCsvLoader {
    pub fn load_bars_from_csv(file_path: &Path) -> Result<Vec<Bar>, EngineError> {
        let file = File::open(file_path)?;
        Self::load_bars(BufReader::new(file))
    }

    pub fn load_bars<R: Read>(reader: R) -> Result<Vec<Bar>, EngineError> {
        let mut rdr = ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();

        let mut bars = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = result?;
            bars.push(Self::parse_record(&record, &headers, line)?);
        }

        bars.sort_by_key(|b| b.start_time);
        validate_bars(&bars)?;
        Ok(bars)
    }

    fn parse_record(record: &StringRecord, headers: &StringRecord, line: usize) -> Result<Bar, EngineError> {
        let start_str = Self::required_field(record, headers, "start", line)?;
        let start_time = start_str.parse::<i64>().map_err(|e| {
            EngineError::CsvDataFormatError(format!("Error parsing 'start' at line {}: {}", line, e))
        })?;

        let number = |name: &str| -> Result<f64, EngineError> {
            let raw = Self::required_field(record, headers, name, line)?;
            raw.parse::<f64>().map_err(|e| {
                EngineError::CsvDataFormatError(format!("Error parsing '{}' at line {}: {}", name, line, e))
            })
        };

        let turnover = match Self::get_field(record, headers, "turnover") {
            Some(raw) if !raw.is_empty() => Some(raw.parse::<f64>().map_err(|e| {
                EngineError::CsvDataFormatError(format!("Error parsing 'turnover' at line {}: {}", line, e))
            })?),
            _ => None,
        };

        Ok(Bar {
            start_time,
            open: number("open")?,
            high: number("high")?,
            low: number("low")?,
            close: number("close")?,
            volume: number("volume")?,
            turnover,
        })
    }

    fn required_field<'a>(
        record: &'a StringRecord,
        headers: &StringRecord,
        name: &str,
        line: usize,
    ) -> Result<&'a str, EngineError> {
        Self::get_field(record, headers, name)
            .ok_or_else(|| EngineError::CsvDataFormatError(format!("Missing '{}' field in CSV record at line {}", name, line)))
    }

    fn get_field<'a>(record: &'a StringRecord, headers: &StringRecord, name: &str) -> Option<&'a str> {
        headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name))
            .and_then(|pos| record.get(pos))
    }
}
