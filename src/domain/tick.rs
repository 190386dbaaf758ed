//! Trade tick and window sample representations.

use chrono::NaiveDateTime;

/// A single trade print on one instrument.
///
/// `price_volume` is carried separately from `price * quantity` because
/// instruments with a contract multiplier precompute it upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub instrument_id: String,
    pub price: i64,
    pub quantity: u64,
    pub price_volume: f64,
    pub traded_at: NaiveDateTime,
}

impl Tick {
    pub fn new(
        instrument_id: impl Into<String>,
        price: i64,
        quantity: u64,
        traded_at: NaiveDateTime,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            price,
            quantity,
            price_volume: price as f64 * quantity as f64,
            traded_at,
        }
    }

    pub fn with_price_volume(
        instrument_id: impl Into<String>,
        price: i64,
        quantity: u64,
        price_volume: f64,
        traded_at: NaiveDateTime,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            price,
            quantity,
            price_volume,
            traded_at,
        }
    }

    /// (quantity, price) view used by the volume-windowed VWAP.
    pub fn sample(&self) -> WindowSample {
        WindowSample::new(self.quantity, self.price as f64)
    }
}

/// A (quantity, price) pair held in a volume-bounded window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSample {
    pub quantity: u64,
    pub price: f64,
}

impl WindowSample {
    pub fn new(quantity: u64, price: f64) -> Self {
        Self { quantity, price }
    }

    pub fn price_volume(&self) -> f64 {
        self.price * self.quantity as f64
    }
}
