#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tickbars::domain::error::TickbarsError;
use tickbars::domain::tick::Tick;
use tickbars::ports::tick_port::{TickFeed, TickPort};

/// In-memory tick feed; an error can be injected at a given position.
pub struct MockTickPort {
    pub ticks: Vec<Tick>,
    pub fail_at: Option<(usize, String)>,
}

impl MockTickPort {
    pub fn new(ticks: Vec<Tick>) -> Self {
        Self {
            ticks,
            fail_at: None,
        }
    }

    pub fn with_error_at(mut self, index: usize, reason: &str) -> Self {
        self.fail_at = Some((index, reason.to_string()));
        self
    }
}

impl TickPort for MockTickPort {
    fn ticks(&self) -> Result<TickFeed<'_>, TickbarsError> {
        let feed = self.ticks.iter().enumerate().map(move |(i, tick)| {
            match &self.fail_at {
                Some((at, reason)) if *at == i => Err(TickbarsError::Feed {
                    reason: reason.clone(),
                }),
                _ => Ok(tick.clone()),
            }
        });
        Ok(Box::new(feed))
    }
}

pub fn session_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 14)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

/// Tick `seq` seconds after the session start.
pub fn tick_at(instrument: &str, price: i64, qty: u64, seq: i64) -> Tick {
    Tick::new(
        instrument,
        price,
        qty,
        session_start() + TimeDelta::seconds(seq),
    )
}

/// One tick per second on a single instrument.
pub fn ticks(instrument: &str, prices_and_qty: &[(i64, u64)]) -> Vec<Tick> {
    prices_and_qty
        .iter()
        .enumerate()
        .map(|(i, &(p, q))| tick_at(instrument, p, q, i as i64))
        .collect()
}
