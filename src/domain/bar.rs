//! OHLC bar with continuous-contract roll adjustment.
//!
//! A bar may open on one instrument and close on another when the feed rolls
//! from an expiring contract to the next one. `roll_offset` accumulates the
//! price gap of every roll seen inside the bar, and `price_volume_sum` is
//! re-based on each roll so `vwap()` stays on the latest instrument's price
//! level.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::domain::tick::Tick;

/// Candle body colour, from close versus open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillColor {
    Flat,
    Up,
    Down,
}

/// Which price (or composite) of a bar to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceType {
    Open,
    High,
    Low,
    Close,
    /// (high + low) / 2
    Hl,
    /// (high + low + close) / 3
    Hlc,
    /// (open + high + low + close) / 4
    Ohlc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    open: Tick,
    high: Tick,
    low: Tick,
    close: Tick,
    volume: u64,
    count: u64,
    price_volume_sum: f64,
    roll_offset: i64,
    seed_time: NaiveDateTime,
}

impl Bar {
    /// Seed a bar from its first tick; the bar starts at the tick's time.
    pub fn new(tick: Tick) -> Self {
        let seed_time = tick.traded_at;
        Self::with_seed(tick, seed_time)
    }

    /// Seed a bar whose interval starts at `seed_time` (e.g. a clock bucket).
    pub fn with_seed(tick: Tick, seed_time: NaiveDateTime) -> Self {
        Self {
            open: tick.clone(),
            high: tick.clone(),
            low: tick.clone(),
            volume: tick.quantity,
            count: 1,
            price_volume_sum: tick.price_volume,
            roll_offset: 0,
            seed_time,
            close: tick,
        }
    }

    fn accumulate(&mut self, tick: &Tick) {
        self.count += 1;
        self.volume += tick.quantity;
        self.price_volume_sum += tick.price_volume;
    }

    /// Fold one more tick into the bar.
    pub fn add(&mut self, tick: Tick) {
        if self.high.price < tick.price {
            self.high = tick.clone();
        } else if self.low.price > tick.price {
            self.low = tick.clone();
        }

        if tick.instrument_id != self.close.instrument_id {
            let diff = tick.price - self.close.price;
            self.roll_offset += diff;
            // Re-base the volume already in the bar onto the new contract.
            self.price_volume_sum += self.volume as f64 * diff as f64;
            debug!(
                from = %self.close.instrument_id,
                to = %tick.instrument_id,
                diff,
                roll_offset = self.roll_offset,
                "instrument roll inside bar"
            );
        }

        self.accumulate(&tick);
        self.close = tick;
    }

    pub fn open(&self) -> &Tick {
        &self.open
    }

    pub fn high(&self) -> &Tick {
        &self.high
    }

    pub fn low(&self) -> &Tick {
        &self.low
    }

    pub fn close(&self) -> &Tick {
        &self.close
    }

    pub fn volume(&self) -> u64 {
        self.volume
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn price_volume_sum(&self) -> f64 {
        self.price_volume_sum
    }

    pub fn roll_offset(&self) -> i64 {
        self.roll_offset
    }

    pub fn seed_time(&self) -> NaiveDateTime {
        self.seed_time
    }

    /// Volume-weighted average price on the closing instrument's level.
    ///
    /// `None` while the bar holds no volume (only zero-quantity ticks).
    pub fn vwap(&self) -> Option<f64> {
        (self.volume > 0).then(|| self.price_volume_sum / self.volume as f64)
    }

    pub fn range(&self) -> i64 {
        self.high.price - self.low.price
    }

    pub fn fill_color(&self) -> FillColor {
        if self.close.price == self.open.price {
            FillColor::Flat
        } else if self.close.price > self.open.price {
            FillColor::Up
        } else {
            FillColor::Down
        }
    }

    pub fn price(&self, kind: PriceType) -> f64 {
        let (o, h, l, c) = (
            self.open.price as f64,
            self.high.price as f64,
            self.low.price as f64,
            self.close.price as f64,
        );
        match kind {
            PriceType::Open => o,
            PriceType::High => h,
            PriceType::Low => l,
            PriceType::Close => c,
            PriceType::Hl => (h + l) / 2.0,
            PriceType::Hlc => (h + l + c) / 3.0,
            PriceType::Ohlc => (o + h + l + c) / 4.0,
        }
    }

    /// Roll offset relative to the previous bar.
    ///
    /// Adds the open/close gap when the roll happened exactly on the bar
    /// boundary, which the intra-bar `roll_offset` cannot see.
    pub fn effective_offset(&self, prev: &Bar) -> i64 {
        self.effective_offset_from_tick(prev.close())
    }

    /// Same as [`Bar::effective_offset`] against a raw previous tick, for the
    /// first bar of a stream.
    pub fn effective_offset_from_tick(&self, prev_close: &Tick) -> i64 {
        let mut offset = self.roll_offset;
        if prev_close.instrument_id != self.open.instrument_id {
            offset += self.open.price - prev_close.price;
        }
        offset
    }

    /// max(range, |high - prev_close|, |low - prev_close|) with the previous
    /// close shifted by this bar's intra-bar roll offset.
    ///
    /// A roll exactly at the bar boundary is not accounted for.
    pub fn true_range(&self, prev: &Bar) -> i64 {
        let adj_prev_close = prev.close.price + self.roll_offset;
        let high_gap = (self.high.price - adj_prev_close).abs();
        let low_gap = (self.low.price - adj_prev_close).abs();
        self.range().max(high_gap).max(low_gap)
    }

    /// (up move, true range, down move) against the previous bar.
    ///
    /// Moves are raw price differences; rolls are not adjusted for.
    pub fn directional_movement(&self, prev: &Bar) -> (i64, i64, i64) {
        (
            self.high.price - prev.high.price,
            self.true_range(prev),
            prev.low.price - self.low.price,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, sec)
            .unwrap()
    }

    fn tick(instrument: &str, price: i64, qty: u64, sec: u32) -> Tick {
        Tick::new(instrument, price, qty, at(sec))
    }

    fn build(ticks: Vec<Tick>) -> Bar {
        let mut iter = ticks.into_iter();
        let mut bar = Bar::new(iter.next().unwrap());
        for t in iter {
            bar.add(t);
        }
        bar
    }

    #[test]
    fn seeded_bar_is_degenerate() {
        let bar = Bar::new(tick("ESH4", 100, 10, 0));
        assert_eq!(bar.open(), bar.high());
        assert_eq!(bar.high(), bar.low());
        assert_eq!(bar.low(), bar.close());
        assert_eq!(bar.count(), 1);
        assert_eq!(bar.volume(), 10);
        assert_eq!(bar.roll_offset(), 0);
        assert_eq!(bar.seed_time(), at(0));
        assert_eq!(bar.range(), 0);
    }

    #[test]
    fn three_ticks_same_instrument() {
        let bar = build(vec![
            tick("ESH4", 100, 10, 0),
            tick("ESH4", 102, 10, 1),
            tick("ESH4", 101, 10, 2),
        ]);
        assert_eq!(bar.open().price, 100);
        assert_eq!(bar.high().price, 102);
        assert_eq!(bar.low().price, 100);
        assert_eq!(bar.close().price, 101);
        assert_eq!(bar.volume(), 30);
        assert_eq!(bar.count(), 3);
        assert_eq!(bar.range(), 2);
        assert_eq!(bar.roll_offset(), 0);
        assert!((bar.vwap().unwrap() - 101.0).abs() < 1e-12);
        assert_eq!(bar.fill_color(), FillColor::Up);
    }

    #[test]
    fn equal_price_keeps_first_extreme_tick() {
        let bar = build(vec![
            tick("ESH4", 100, 1, 0),
            tick("ESH4", 105, 1, 1),
            tick("ESH4", 105, 1, 2),
        ]);
        assert_eq!(bar.high().traded_at, at(1));
    }

    #[test]
    fn roll_rebases_vwap() {
        let bar = build(vec![
            tick("ESH4", 100, 10, 0),
            tick("ESH4", 102, 10, 1),
            tick("ESM4", 110, 5, 2),
        ]);
        assert_eq!(bar.roll_offset(), 8);
        assert_eq!(bar.open().instrument_id, "ESH4");
        assert_eq!(bar.close().instrument_id, "ESM4");
        // pre-roll prices shifted by +8
        let expected = (108.0 * 10.0 + 110.0 * 10.0 + 110.0 * 5.0) / 25.0;
        assert!((bar.vwap().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn multiple_rolls_accumulate() {
        let bar = build(vec![
            tick("A", 100, 1, 0),
            tick("B", 104, 1, 1),
            tick("C", 101, 1, 2),
        ]);
        assert_eq!(bar.roll_offset(), 4 - 3);
    }

    #[test]
    fn zero_quantity_bar_has_no_vwap() {
        let mut bar = Bar::new(tick("ESH4", 100, 0, 0));
        assert_eq!(bar.volume(), 0);
        assert_eq!(bar.vwap(), None);
        bar.add(tick("ESH4", 101, 0, 1));
        assert_eq!(bar.vwap(), None);
        bar.add(tick("ESH4", 102, 4, 2));
        assert_eq!(bar.vwap(), Some(102.0));
    }

    #[test]
    fn fill_colors() {
        assert_eq!(
            build(vec![tick("A", 100, 1, 0), tick("A", 100, 1, 1)]).fill_color(),
            FillColor::Flat
        );
        assert_eq!(
            build(vec![tick("A", 100, 1, 0), tick("A", 99, 1, 1)]).fill_color(),
            FillColor::Down
        );
    }

    #[test]
    fn composite_prices() {
        let bar = build(vec![
            tick("A", 100, 1, 0),
            tick("A", 104, 1, 1),
            tick("A", 98, 1, 2),
            tick("A", 102, 1, 3),
        ]);
        assert!((bar.price(PriceType::Hl) - 101.0).abs() < f64::EPSILON);
        assert!((bar.price(PriceType::Hlc) - 304.0 / 3.0).abs() < 1e-12);
        assert!((bar.price(PriceType::Ohlc) - 101.0).abs() < f64::EPSILON);
        assert!((bar.price(PriceType::Close) - 102.0).abs() < f64::EPSILON);
    }

    #[test]
    fn effective_offset_same_instrument() {
        let prev = build(vec![tick("A", 100, 1, 0), tick("A", 101, 1, 1)]);
        let bar = build(vec![tick("A", 103, 1, 2)]);
        assert_eq!(bar.effective_offset(&prev), 0);
    }

    #[test]
    fn effective_offset_roll_at_boundary() {
        let prev = build(vec![tick("A", 100, 1, 0), tick("A", 102, 1, 1)]);
        let bar = build(vec![tick("B", 110, 1, 2), tick("B", 112, 1, 3)]);
        assert_eq!(bar.effective_offset(&prev), 8);
        assert_eq!(bar.effective_offset_from_tick(prev.close()), 8);
    }

    #[test]
    fn effective_offset_combines_boundary_and_intra_bar_rolls() {
        let prev = build(vec![tick("A", 100, 1, 0)]);
        let bar = build(vec![tick("B", 105, 1, 1), tick("C", 108, 1, 2)]);
        assert_eq!(bar.effective_offset(&prev), 3 + 5);
    }

    #[test]
    fn true_range_gap_up() {
        let prev = build(vec![tick("A", 95, 1, 0), tick("A", 100, 1, 1)]);
        let bar = build(vec![tick("A", 105, 1, 2), tick("A", 108, 1, 3)]);
        assert_eq!(bar.true_range(&prev), 8);
    }

    #[test]
    fn true_range_uses_intra_bar_offset() {
        let prev = build(vec![tick("A", 100, 1, 0)]);
        // open on A, roll to B inside the bar: offset +10
        let bar = build(vec![tick("A", 101, 1, 1), tick("B", 111, 1, 2)]);
        // adj prev close = 110, high 111, low 101 -> max(10, 1, 9)
        assert_eq!(bar.true_range(&prev), 10);
    }

    #[test]
    fn true_range_ignores_roll_at_boundary() {
        let prev = build(vec![tick("A", 100, 1, 0), tick("A", 102, 1, 1)]);
        let bar = build(vec![tick("B", 110, 1, 2), tick("B", 112, 1, 3), tick("B", 109, 1, 4)]);
        // Known limitation: the boundary gap of 8 is not removed, so the
        // unadjusted close of 102 drives the result.
        assert_eq!(bar.true_range(&prev), 10);
    }

    #[test]
    fn directional_movement_triple() {
        let prev = build(vec![tick("A", 100, 1, 0), tick("A", 104, 1, 1), tick("A", 98, 1, 2)]);
        let bar = build(vec![tick("A", 101, 1, 3), tick("A", 107, 1, 4), tick("A", 99, 1, 5)]);
        let (up, tr, down) = bar.directional_movement(&prev);
        assert_eq!(up, 3);
        assert_eq!(tr, 9);
        assert_eq!(down, -1);
    }
}
