//! Streaming window indicators.
//!
//! Every windowed statistic comes as a pair of implementations behind
//! [`StreamingIndicator`]: a naive one that recomputes over the whole window
//! on each input, and an incremental one that updates running state. The two
//! must produce the same output for every input sequence.
//!
//! - `vwap`: volume-windowed moving VWAP
//! - `aroon`: Aroon up/down over a fixed-count window
//! - `sum`: rolling sum and simple moving average

pub mod aroon;
pub mod sum;
pub mod vwap;

use std::fmt;

/// A push-driven indicator: one input in, at most one output out.
pub trait StreamingIndicator {
    type Input;
    type Output;

    /// Consume one input; `None` until the window has filled.
    fn next(&mut self, input: Self::Input) -> Option<Self::Output>;

    /// Forget all window state, keeping the configuration.
    fn reset(&mut self);

    /// Feed a whole sequence and collect the emitted outputs.
    fn run<I>(&mut self, inputs: I) -> Vec<Self::Output>
    where
        I: IntoIterator<Item = Self::Input>,
        Self: Sized,
    {
        inputs.into_iter().filter_map(|x| self.next(x)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Vwap { window_volume: u64 },
    AroonUp(usize),
    AroonDown(usize),
    AroonOscillator(usize),
    Sum(usize),
    Sma(usize),
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Vwap { window_volume } => write!(f, "MVWAP({})", window_volume),
            IndicatorType::AroonUp(period) => write!(f, "AROON_UP({})", period),
            IndicatorType::AroonDown(period) => write!(f, "AROON_DOWN({})", period),
            IndicatorType::AroonOscillator(period) => write!(f, "AROON_OSC({})", period),
            IndicatorType::Sum(period) => write!(f, "SUM({})", period),
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
        }
    }
}
