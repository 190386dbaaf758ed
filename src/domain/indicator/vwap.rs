//! Volume-windowed moving VWAP.
//!
//! The trailing window is bounded by traded quantity rather than sample
//! count: it always holds exactly the most recent `window_volume` units. When
//! the oldest sample only partly falls outside, it is split and the inner part
//! stays in the window at the same price.
//!
//! MVWAP(W) = sum(price * qty over the last W units) / W
//! Nothing is emitted until W units have been seen.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use tracing::trace;

use crate::domain::error::TickbarsError;
use crate::domain::indicator::StreamingIndicator;
use crate::domain::tick::WindowSample;

fn check_window(window_volume: u64) -> Result<(), TickbarsError> {
    if window_volume == 0 {
        return Err(TickbarsError::invalid_window(
            "window_volume",
            "must be positive",
        ));
    }
    Ok(())
}

/// Incremental engine: running totals, O(1) amortized per sample.
#[derive(Debug, Clone)]
pub struct VolumeVwap {
    window_volume: u64,
    queue: VecDeque<WindowSample>,
    total_price_volume: f64,
    total_volume: u64,
    reconcile_interval: Option<NonZeroUsize>,
    since_reconcile: usize,
}

impl VolumeVwap {
    pub fn new(window_volume: u64) -> Result<Self, TickbarsError> {
        check_window(window_volume)?;
        Ok(Self {
            window_volume,
            queue: VecDeque::new(),
            total_price_volume: 0.0,
            total_volume: 0,
            reconcile_interval: None,
            since_reconcile: 0,
        })
    }

    /// Re-base the running price-volume on the queue every `every` samples.
    pub fn with_reconcile_interval(mut self, every: Option<NonZeroUsize>) -> Self {
        self.reconcile_interval = every;
        self
    }

    pub fn on_sample(&mut self, quantity: u64, price: f64) -> Option<f64> {
        let sample = WindowSample::new(quantity, price);
        self.queue.push_back(sample);
        self.total_price_volume += sample.price_volume();
        self.total_volume += quantity;

        self.settle();

        if let Some(every) = self.reconcile_interval {
            self.since_reconcile += 1;
            if self.since_reconcile >= every.get() {
                self.reconcile();
            }
        }

        if self.total_volume >= self.window_volume {
            Some(self.total_price_volume / self.window_volume as f64)
        } else {
            None
        }
    }

    fn settle(&mut self) {
        while self.total_volume > self.window_volume {
            let excess = self.total_volume - self.window_volume;
            let Some(head) = self.queue.front_mut() else {
                break;
            };
            if head.quantity > excess {
                head.quantity -= excess;
                self.total_price_volume -= head.price * excess as f64;
                self.total_volume -= excess;
                trace!(excess, kept = head.quantity, price = head.price, "split window head");
            } else if let Some(old) = self.queue.pop_front() {
                self.total_price_volume -= old.price_volume();
                self.total_volume -= old.quantity;
            }
        }
    }

    /// Reserved roll-adjustment input; currently has no effect.
    pub fn on_offset(&mut self, offset: f64) {
        trace!(offset, "offset ignored");
    }

    /// Recompute the running totals from the queue.
    pub fn reconcile(&mut self) {
        self.total_price_volume = self.recomputed_price_volume();
        self.total_volume = self.queue.iter().map(|s| s.quantity).sum();
        self.since_reconcile = 0;
    }

    pub fn recomputed_price_volume(&self) -> f64 {
        self.queue.iter().map(WindowSample::price_volume).sum()
    }

    /// Absolute gap between the running price-volume and a fresh fold.
    pub fn drift(&self) -> f64 {
        (self.total_price_volume - self.recomputed_price_volume()).abs()
    }

    pub fn window_volume(&self) -> u64 {
        self.window_volume
    }

    pub fn total_volume(&self) -> u64 {
        self.total_volume
    }

    pub fn total_price_volume(&self) -> f64 {
        self.total_price_volume
    }

    pub fn samples(&self) -> impl Iterator<Item = &WindowSample> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl StreamingIndicator for VolumeVwap {
    type Input = WindowSample;
    type Output = f64;

    fn next(&mut self, input: WindowSample) -> Option<f64> {
        self.on_sample(input.quantity, input.price)
    }

    fn reset(&mut self) {
        self.queue.clear();
        self.total_price_volume = 0.0;
        self.total_volume = 0;
        self.since_reconcile = 0;
    }
}

/// Reference engine: walks back from the newest sample on every input.
#[derive(Debug, Clone)]
pub struct NaiveVolumeVwap {
    window_volume: u64,
    samples: VecDeque<WindowSample>,
}

impl NaiveVolumeVwap {
    pub fn new(window_volume: u64) -> Result<Self, TickbarsError> {
        check_window(window_volume)?;
        Ok(Self {
            window_volume,
            samples: VecDeque::new(),
        })
    }
}

impl StreamingIndicator for NaiveVolumeVwap {
    type Input = WindowSample;
    type Output = f64;

    fn next(&mut self, input: WindowSample) -> Option<f64> {
        self.samples.push_back(input);

        // Drop samples that lie wholly outside the window.
        let mut total: u64 = self.samples.iter().map(|s| s.quantity).sum();
        while let Some(front) = self.samples.front() {
            if total - front.quantity < self.window_volume {
                break;
            }
            total -= front.quantity;
            self.samples.pop_front();
        }

        let mut remaining = self.window_volume;
        let mut price_volume = 0.0;
        for sample in self.samples.iter().rev() {
            let take = sample.quantity.min(remaining);
            price_volume += sample.price * take as f64;
            remaining -= take;
            if remaining == 0 {
                break;
            }
        }

        if remaining == 0 {
            Some(price_volume / self.window_volume as f64)
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.samples.clear();
    }
}
