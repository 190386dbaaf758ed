//! Tick-to-bar aggregation.
//!
//! [`BarBuilder`] is the single owner of the bar in progress: it seeds a bar
//! on the first tick, adds ticks until the policy says the bar is complete,
//! then hands the finished bar out and seeds the next one from the tick that
//! closed it. Every consumer builds its own builder; there is no shared state.

use tracing::debug;

use crate::domain::bar::Bar;
use crate::domain::error::TickbarsError;
use crate::domain::segmentation::BarPolicy;
use crate::domain::tick::Tick;

#[derive(Debug, Clone)]
pub struct BarBuilder {
    policy: BarPolicy,
    current: Option<Bar>,
}

impl BarBuilder {
    pub fn new(policy: BarPolicy) -> Result<Self, TickbarsError> {
        policy.validate()?;
        Ok(Self {
            policy,
            current: None,
        })
    }

    pub fn policy(&self) -> &BarPolicy {
        &self.policy
    }

    /// Feed one tick; returns the bar it completed, if any.
    pub fn on_tick(&mut self, tick: Tick) -> Option<Bar> {
        if let Some(bar) = self.current.as_mut() {
            if !self.policy.should_close(bar, &tick) {
                bar.add(tick);
                return None;
            }
        }

        let seed = self.policy.seed_time(&tick);
        let done = self.current.replace(Bar::with_seed(tick, seed));
        if let Some(ref bar) = done {
            debug!(
                instrument = %bar.close().instrument_id,
                count = bar.count(),
                volume = bar.volume(),
                "bar closed"
            );
        }
        done
    }

    /// The bar being built, if any tick has arrived since the last flush.
    pub fn in_progress(&self) -> Option<&Bar> {
        self.current.as_ref()
    }

    /// Hand out the partial bar at end of input.
    pub fn flush(&mut self) -> Option<Bar> {
        self.current.take()
    }

    /// Drop the partial bar without emitting it.
    pub fn reset(&mut self) {
        self.current = None;
    }
}

/// Iterator adapter turning a fallible tick feed into a fallible bar feed.
///
/// Source errors are yielded as-is and end the stream. At end of input the
/// partial bar is dropped unless [`BarStream::flush_on_end`] was set.
pub struct BarStream<I> {
    source: I,
    builder: BarBuilder,
    flush_on_end: bool,
    done: bool,
}

impl<I, E> BarStream<I>
where
    I: Iterator<Item = Result<Tick, E>>,
{
    pub fn new(source: I, policy: BarPolicy) -> Result<Self, TickbarsError> {
        Ok(Self {
            source,
            builder: BarBuilder::new(policy)?,
            flush_on_end: false,
            done: false,
        })
    }

    pub fn flush_on_end(mut self, flush: bool) -> Self {
        self.flush_on_end = flush;
        self
    }
}

impl<I, E> Iterator for BarStream<I>
where
    I: Iterator<Item = Result<Tick, E>>,
{
    type Item = Result<Bar, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.source.next() {
                Some(Ok(tick)) => {
                    if let Some(bar) = self.builder.on_tick(tick) {
                        return Some(Ok(bar));
                    }
                }
                Some(Err(e)) => {
                    self.done = true;
                    self.builder.reset();
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    return if self.flush_on_end {
                        self.builder.flush().map(Ok)
                    } else {
                        self.builder.reset();
                        None
                    };
                }
            }
        }
    }
}

/// One bar over an entire finite tick sequence.
pub fn aggregate<I>(ticks: I) -> Option<Bar>
where
    I: IntoIterator<Item = Tick>,
{
    ticks.into_iter().fold(None, |bar, tick| match bar {
        Some(mut bar) => {
            bar.add(tick);
            Some(bar)
        }
        None => Some(Bar::new(tick)),
    })
}

/// One bar per pre-bucketed window of ticks; empty windows yield nothing.
pub fn aggregate_windows<W, I>(windows: W) -> Vec<Bar>
where
    W: IntoIterator<Item = I>,
    I: IntoIterator<Item = Tick>,
{
    windows.into_iter().filter_map(aggregate).collect()
}
