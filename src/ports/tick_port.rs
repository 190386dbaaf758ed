//! Tick source port trait.

use crate::domain::error::TickbarsError;
use crate::domain::tick::Tick;

/// Sequential, fallible tick feed in delivery order.
pub type TickFeed<'a> = Box<dyn Iterator<Item = Result<Tick, TickbarsError>> + 'a>;

pub trait TickPort {
    /// Open the feed. Per-row errors are yielded inside the feed and must be
    /// passed on to the consumer untouched.
    fn ticks(&self) -> Result<TickFeed<'_>, TickbarsError>;
}
