//! Rolling sum over the last N samples, and a simple moving average.
//!
//! SUM(n)[i] = P[i-n+1] + ... + P[i]
//! SMA(n)[i] = SUM(n)[i] / n
//! Warmup: nothing is emitted before n samples.

use std::collections::VecDeque;
use std::ops::{Add, Sub};

use crate::domain::error::TickbarsError;
use crate::domain::indicator::StreamingIndicator;

fn check_period(period: usize) -> Result<(), TickbarsError> {
    if period == 0 {
        return Err(TickbarsError::invalid_window("sum window", "must be positive"));
    }
    Ok(())
}

/// Folds the whole window on every sample.
#[derive(Debug, Clone)]
pub struct NaiveSum<T> {
    period: usize,
    window: VecDeque<T>,
}

impl<T> NaiveSum<T> {
    pub fn new(period: usize) -> Result<Self, TickbarsError> {
        check_period(period)?;
        Ok(Self {
            period,
            window: VecDeque::with_capacity(period + 1),
        })
    }
}

impl<T> StreamingIndicator for NaiveSum<T>
where
    T: Copy + Default + Add<Output = T>,
{
    type Input = T;
    type Output = T;

    fn next(&mut self, value: T) -> Option<T> {
        self.window.push_back(value);
        if self.window.len() > self.period {
            self.window.pop_front();
        }
        if self.window.len() < self.period {
            return None;
        }
        Some(self.window.iter().fold(T::default(), |acc, &x| acc + x))
    }

    fn reset(&mut self) {
        self.window.clear();
    }
}

/// Running total: add the new sample, subtract the one leaving the window.
#[derive(Debug, Clone)]
pub struct IncrementalSum<T> {
    period: usize,
    window: VecDeque<T>,
    total: T,
}

impl<T: Default> IncrementalSum<T> {
    pub fn new(period: usize) -> Result<Self, TickbarsError> {
        check_period(period)?;
        Ok(Self {
            period,
            window: VecDeque::with_capacity(period + 1),
            total: T::default(),
        })
    }
}

impl<T> IncrementalSum<T>
where
    T: Copy + Default + Add<Output = T>,
{
    /// Sum of the queued samples, folded fresh.
    pub fn recomputed(&self) -> T {
        self.window.iter().fold(T::default(), |acc, &x| acc + x)
    }
}

impl<T> StreamingIndicator for IncrementalSum<T>
where
    T: Copy + Default + Add<Output = T> + Sub<Output = T>,
{
    type Input = T;
    type Output = T;

    fn next(&mut self, value: T) -> Option<T> {
        self.window.push_back(value);
        self.total = self.total + value;
        if self.window.len() > self.period {
            if let Some(old) = self.window.pop_front() {
                self.total = self.total - old;
            }
        }
        (self.window.len() == self.period).then_some(self.total)
    }

    fn reset(&mut self) {
        self.window.clear();
        self.total = T::default();
    }
}

/// Simple moving average kept as a running mean.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    window: VecDeque<f64>,
    mean: f64,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, TickbarsError> {
        check_period(period)?;
        Ok(Self {
            period,
            window: VecDeque::with_capacity(period + 1),
            mean: 0.0,
        })
    }
}

impl StreamingIndicator for Sma {
    type Input = f64;
    type Output = f64;

    fn next(&mut self, value: f64) -> Option<f64> {
        self.window.push_back(value);
        let n = self.period as f64;
        if self.window.len() < self.period {
            return None;
        }
        if self.window.len() == self.period {
            self.mean = self.window.iter().sum::<f64>() / n;
        } else if let Some(old) = self.window.pop_front() {
            self.mean += (value - old) / n;
        }
        Some(self.mean)
    }

    fn reset(&mut self) {
        self.window.clear();
        self.mean = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // stockcharts.com moving-average worksheet
    const CLOSES: [f64; 30] = [
        22.2734, 22.1940, 22.0847, 22.1741, 22.1840, 22.1344, 22.2337, 22.4323, 22.2436, 22.2933,
        22.1542, 22.3926, 22.3816, 22.6109, 23.3558, 24.0519, 23.7530, 23.8324, 23.9516, 23.6338,
        23.8225, 23.8722, 23.6537, 23.1870, 23.0976, 23.3260, 22.6805, 23.0976, 22.4025, 22.1725,
    ];

    #[test]
    fn zero_period_rejected() {
        assert!(NaiveSum::<i64>::new(0).is_err());
        assert!(IncrementalSum::<f64>::new(0).is_err());
        assert!(Sma::new(0).is_err());
    }

    #[test]
    fn integer_sums() {
        let data = [1i64, 2, 3, 4, 5];
        assert_eq!(NaiveSum::new(3).unwrap().run(data), vec![6, 9, 12]);
        assert_eq!(IncrementalSum::new(3).unwrap().run(data), vec![6, 9, 12]);
    }

    #[test]
    fn worksheet_sum_and_sma_agree() {
        let naive = NaiveSum::new(10).unwrap().run(CLOSES);
        let fast = IncrementalSum::new(10).unwrap().run(CLOSES);
        let sma = Sma::new(10).unwrap().run(CLOSES);

        assert_eq!(naive.len(), 21);
        assert_eq!(fast.len(), 21);
        assert_eq!(sma.len(), 21);
        for ((n, f), s) in naive.iter().zip(&fast).zip(&sma) {
            assert_abs_diff_eq!(*n, *f, epsilon = 1e-9);
            assert_abs_diff_eq!(*n / 10.0, *s, epsilon = 1e-9);
        }
        // first 10-day SMA on the worksheet
        assert_abs_diff_eq!(sma[0], 22.22475, epsilon = 1e-9);
        assert_eq!(format!("{:.2}", sma[20]), "23.13");
    }

    #[test]
    fn recomputed_matches_running_total() {
        let mut sum = IncrementalSum::new(4).unwrap();
        for v in [3i64, -1, 7, 2, 9, -4] {
            sum.next(v);
        }
        assert_eq!(sum.recomputed(), 7 + 2 + 9 - 4);
    }

    #[test]
    fn reset_restarts_warmup() {
        let mut sum = IncrementalSum::new(2).unwrap();
        assert_eq!(sum.next(1u32), None);
        assert_eq!(sum.next(2), Some(3));
        sum.reset();
        assert_eq!(sum.next(5), None);
        assert_eq!(sum.next(5), Some(10));
    }
}
