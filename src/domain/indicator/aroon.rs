//! Aroon Up / Aroon Down over a fixed-count window.
//!
//! For the last P samples, with `i` the 0-based position of the extremum in
//! the window (earliest occurrence on ties):
//! periods_since = P - (i + 1)
//! AROON(P) = (P - periods_since) * (100 / P)
//! Warmup: nothing is emitted before P samples.
//!
//! Inputs must be finite; NaN has no defined ordering here.

use std::collections::VecDeque;

use crate::domain::error::TickbarsError;
use crate::domain::indicator::StreamingIndicator;

/// Which extremum drives the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    /// Aroon Up
    Max,
    /// Aroon Down
    Min,
}

impl Extremum {
    /// `candidate` strictly beats `current`.
    fn beats(self, candidate: f64, current: f64) -> bool {
        match self {
            Extremum::Max => candidate > current,
            Extremum::Min => candidate < current,
        }
    }
}

fn check_period(period: usize) -> Result<(), TickbarsError> {
    if period == 0 {
        return Err(TickbarsError::invalid_window("aroon period", "must be positive"));
    }
    Ok(())
}

fn aroon_value(period: usize, index_from_start: usize) -> f64 {
    let periods_since = period - (index_from_start + 1);
    (period - periods_since) as f64 * (100.0 / period as f64)
}

/// Rescans the whole window on every sample.
#[derive(Debug, Clone)]
pub struct NaiveAroon {
    period: usize,
    extremum: Extremum,
    window: VecDeque<f64>,
}

impl NaiveAroon {
    pub fn new(period: usize, extremum: Extremum) -> Result<Self, TickbarsError> {
        check_period(period)?;
        Ok(Self {
            period,
            extremum,
            window: VecDeque::with_capacity(period + 1),
        })
    }
}

impl StreamingIndicator for NaiveAroon {
    type Input = f64;
    type Output = f64;

    fn next(&mut self, value: f64) -> Option<f64> {
        self.window.push_back(value);
        if self.window.len() > self.period {
            self.window.pop_front();
        }
        if self.window.len() < self.period {
            return None;
        }

        let mut best = 0;
        for (i, &v) in self.window.iter().enumerate().skip(1) {
            if self.extremum.beats(v, self.window[best]) {
                best = i;
            }
        }
        Some(aroon_value(self.period, best))
    }

    fn reset(&mut self) {
        self.window.clear();
    }
}

/// Monotonic deque of (sequence number, value); O(1) amortized.
///
/// Entries are only popped from the back when strictly beaten, so among equal
/// values the earliest stays in front.
#[derive(Debug, Clone)]
pub struct IncrementalAroon {
    period: usize,
    extremum: Extremum,
    deque: VecDeque<(usize, f64)>,
    seen: usize,
}

impl IncrementalAroon {
    pub fn new(period: usize, extremum: Extremum) -> Result<Self, TickbarsError> {
        check_period(period)?;
        Ok(Self {
            period,
            extremum,
            deque: VecDeque::with_capacity(period),
            seen: 0,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl StreamingIndicator for IncrementalAroon {
    type Input = f64;
    type Output = f64;

    fn next(&mut self, value: f64) -> Option<f64> {
        let seq = self.seen;
        self.seen += 1;

        while self
            .deque
            .front()
            .is_some_and(|&(i, _)| i + self.period <= seq)
        {
            self.deque.pop_front();
        }
        while self
            .deque
            .back()
            .is_some_and(|&(_, v)| self.extremum.beats(value, v))
        {
            self.deque.pop_back();
        }
        self.deque.push_back((seq, value));

        if self.seen < self.period {
            return None;
        }
        let window_start = self.seen - self.period;
        self.deque
            .front()
            .map(|&(i, _)| aroon_value(self.period, i - window_start))
    }

    fn reset(&mut self) {
        self.deque.clear();
        self.seen = 0;
    }
}

pub fn aroon_up(period: usize) -> Result<IncrementalAroon, TickbarsError> {
    IncrementalAroon::new(period, Extremum::Max)
}

pub fn aroon_down(period: usize) -> Result<IncrementalAroon, TickbarsError> {
    IncrementalAroon::new(period, Extremum::Min)
}

/// Aroon Up minus Aroon Down.
#[derive(Debug, Clone)]
pub struct AroonOscillator {
    up: IncrementalAroon,
    down: IncrementalAroon,
}

impl AroonOscillator {
    pub fn new(period: usize) -> Result<Self, TickbarsError> {
        Ok(Self {
            up: aroon_up(period)?,
            down: aroon_down(period)?,
        })
    }
}

impl StreamingIndicator for AroonOscillator {
    type Input = f64;
    type Output = f64;

    fn next(&mut self, value: f64) -> Option<f64> {
        let up = self.up.next(value);
        let down = self.down.next(value);
        Some(up? - down?)
    }

    fn reset(&mut self) {
        self.up.reset();
        self.down.reset();
    }
}
