//! CSV file tick feed.
//!
//! Expected header: `traded_at,instrument,price,quantity[,price_volume]`.
//! Rows are streamed in file order; a malformed row is reported as a
//! `Feed` error at its position in the stream.

use crate::domain::error::TickbarsError;
use crate::domain::tick::Tick;
use crate::ports::tick_port::{TickFeed, TickPort};
use chrono::NaiveDateTime;
use csv::StringRecord;
use std::path::PathBuf;
use std::str::FromStr;

const TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

pub struct CsvTickAdapter {
    path: PathBuf,
}

impl CsvTickAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn field<'r>(
    record: &'r StringRecord,
    idx: usize,
    name: &str,
    line: u64,
) -> Result<&'r str, TickbarsError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| TickbarsError::Feed {
            reason: format!("line {}: missing {} column", line, name),
        })
}

fn parse_number<T>(raw: &str, name: &str, line: u64) -> Result<T, TickbarsError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e| TickbarsError::Feed {
        reason: format!("line {}: invalid {} value: {}", line, name, e),
    })
}

fn parse_time(raw: &str, line: u64) -> Result<NaiveDateTime, TickbarsError> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| TickbarsError::Feed {
            reason: format!("line {}: invalid traded_at '{}'", line, raw),
        })
}

pub fn parse_tick(record: &StringRecord, line: u64) -> Result<Tick, TickbarsError> {
    let traded_at = parse_time(field(record, 0, "traded_at", line)?, line)?;
    let instrument = field(record, 1, "instrument", line)?;
    if instrument.is_empty() {
        return Err(TickbarsError::Feed {
            reason: format!("line {}: empty instrument", line),
        });
    }
    let price: i64 = parse_number(field(record, 2, "price", line)?, "price", line)?;
    let quantity: u64 = parse_number(field(record, 3, "quantity", line)?, "quantity", line)?;
    if quantity == 0 {
        return Err(TickbarsError::Feed {
            reason: format!("line {}: zero quantity", line),
        });
    }

    match record.get(4).map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => {
            let price_volume: f64 = parse_number(raw, "price_volume", line)?;
            Ok(Tick::with_price_volume(
                instrument,
                price,
                quantity,
                price_volume,
                traded_at,
            ))
        }
        None => Ok(Tick::new(instrument, price, quantity, traded_at)),
    }
}

impl TickPort for CsvTickAdapter {
    fn ticks(&self) -> Result<TickFeed<'_>, TickbarsError> {
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| TickbarsError::Feed {
                reason: format!("failed to open {}: {}", self.path.display(), e),
            })?;

        let feed = reader.into_records().map(|result| {
            let record = result.map_err(|e| TickbarsError::Feed {
                reason: format!("CSV parse error: {}", e),
            })?;
            let line = record.position().map_or(0, |p| p.line());
            parse_tick(&record, line)
        });
        Ok(Box::new(feed))
    }
}
