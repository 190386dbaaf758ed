//! Bar segmentation policies.
//!
//! A policy decides, for the bar in progress and the next tick, whether the
//! bar is complete and the tick must open a new one.

use chrono::{DurationRound, NaiveDateTime, TimeDelta};
use tracing::warn;

use crate::domain::bar::Bar;
use crate::domain::error::TickbarsError;
use crate::domain::tick::Tick;

#[derive(Debug, Clone, Copy)]
pub enum BarPolicy {
    /// Close once the bar holds this many ticks.
    TickCount(u64),
    /// Clock buckets aligned to multiples of the interval since the epoch.
    TimeInterval(TimeDelta),
    /// Close once the bar's volume reaches this size.
    Volume(u64),
    /// Close when the next tick would widen the range past this many ticks.
    PriceRange(i64),
    /// Caller-supplied predicate.
    Predicate(fn(&Bar, &Tick) -> bool),
}

impl BarPolicy {
    pub fn validate(&self) -> Result<(), TickbarsError> {
        match *self {
            BarPolicy::TickCount(0) => Err(TickbarsError::invalid_window(
                "tick count",
                "must be positive",
            )),
            BarPolicy::TimeInterval(d) if !d.num_nanoseconds().is_some_and(|ns| ns > 0) => {
                Err(TickbarsError::invalid_window(
                    "time interval",
                    "must be positive and fit in i64 nanoseconds",
                ))
            }
            BarPolicy::Volume(0) => Err(TickbarsError::invalid_window(
                "bar volume",
                "must be positive",
            )),
            BarPolicy::PriceRange(r) if r <= 0 => Err(TickbarsError::invalid_window(
                "price range",
                "must be positive",
            )),
            _ => Ok(()),
        }
    }

    pub fn should_close(&self, bar: &Bar, tick: &Tick) -> bool {
        match *self {
            BarPolicy::TickCount(n) => bar.count() >= n,
            BarPolicy::TimeInterval(d) => tick.traded_at >= bar.seed_time() + d,
            BarPolicy::Volume(v) => bar.volume() >= v,
            BarPolicy::PriceRange(r) => {
                let high = bar.high().price.max(tick.price);
                let low = bar.low().price.min(tick.price);
                high - low > r
            }
            BarPolicy::Predicate(f) => f(bar, tick),
        }
    }

    /// Start marker for a bar opened by `tick`.
    pub fn seed_time(&self, tick: &Tick) -> NaiveDateTime {
        match *self {
            BarPolicy::TimeInterval(d) => match tick.traded_at.duration_trunc(d) {
                Ok(start) => start,
                Err(e) => {
                    // Only reachable outside the i64-nanosecond timestamp range.
                    warn!(traded_at = %tick.traded_at, error = %e, "cannot align bucket");
                    tick.traded_at
                }
            },
            _ => tick.traded_at,
        }
    }
}
