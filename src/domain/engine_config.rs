//! Engine configuration.
//!
//! Reads the `[bars]`, `[vwap]`, `[aroon]`, `[sum]` and `[logging]` sections
//! through a [`ConfigPort`] and validates every value before any engine is
//! built. Missing keys take the defaults below; present but invalid keys are
//! errors.

use std::num::NonZeroUsize;

use chrono::TimeDelta;
use tracing::warn;

use crate::domain::error::TickbarsError;
use crate::domain::indicator::aroon::Extremum;
use crate::domain::segmentation::BarPolicy;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_BAR_SIZE: u64 = 100;
pub const DEFAULT_WINDOW_VOLUME: u64 = 500;
pub const DEFAULT_AROON_PERIOD: u64 = 25;
pub const DEFAULT_SUM_WINDOW: u64 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";

const KNOWN_SECTIONS: [&str; 5] = ["bars", "vwap", "aroon", "sum", "logging"];

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub bar_policy: BarPolicy,
    pub flush_on_end: bool,
    pub window_volume: u64,
    pub reconcile_interval: Option<NonZeroUsize>,
    pub aroon_period: usize,
    pub aroon_direction: Extremum,
    pub sum_window: usize,
    pub log_level: String,
}

impl EngineConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TickbarsError> {
        for section in config.sections() {
            if !KNOWN_SECTIONS.contains(&section.as_str()) {
                warn!(section = %section, "ignoring unknown config section");
            }
        }

        let bar_policy = parse_bar_policy(config)?;
        bar_policy.validate()?;

        let reconcile = read_u64(config, "vwap", "reconcile_interval", 0)?;

        Ok(Self {
            bar_policy,
            flush_on_end: read_flag(config, "bars", "flush_on_end", false)?,
            window_volume: read_positive(
                config,
                "vwap",
                "window_volume",
                DEFAULT_WINDOW_VOLUME,
            )?,
            reconcile_interval: NonZeroUsize::new(reconcile as usize),
            aroon_period: read_positive(config, "aroon", "period", DEFAULT_AROON_PERIOD)?
                as usize,
            aroon_direction: parse_direction(config)?,
            sum_window: read_positive(config, "sum", "window", DEFAULT_SUM_WINDOW)? as usize,
            log_level: config
                .get_string("logging", "level")
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TickbarsError {
    TickbarsError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn read_u64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: u64,
) -> Result<u64, TickbarsError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            invalid(
                section,
                key,
                format!("expected a non-negative integer, got '{}'", raw),
            )
        }),
    }
}

fn read_flag(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: bool,
) -> Result<bool, TickbarsError> {
    if config.get_string(section, key).is_none() {
        return Ok(default);
    }
    config
        .get_bool(section, key)
        .ok_or_else(|| invalid(section, key, "expected true/false, yes/no or 1/0"))
}

fn read_positive(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: u64,
) -> Result<u64, TickbarsError> {
    let value = read_u64(config, section, key, default)?;
    if value == 0 {
        return Err(invalid(section, key, format!("{} must be positive", key)));
    }
    Ok(value)
}

fn parse_bar_policy(config: &dyn ConfigPort) -> Result<BarPolicy, TickbarsError> {
    let size = read_positive(config, "bars", "size", DEFAULT_BAR_SIZE)?;
    let kind = config
        .get_string("bars", "policy")
        .unwrap_or_else(|| "ticks".to_string());

    match kind.trim().to_lowercase().as_str() {
        "ticks" => Ok(BarPolicy::TickCount(size)),
        "volume" => Ok(BarPolicy::Volume(size)),
        "range" => {
            let range =
                i64::try_from(size).map_err(|_| invalid("bars", "size", "range too large"))?;
            Ok(BarPolicy::PriceRange(range))
        }
        "time" => {
            let secs =
                i64::try_from(size).map_err(|_| invalid("bars", "size", "interval too large"))?;
            TimeDelta::try_seconds(secs)
                .map(BarPolicy::TimeInterval)
                .ok_or_else(|| invalid("bars", "size", "interval too large"))
        }
        other => Err(invalid(
            "bars",
            "policy",
            format!("unknown policy '{}', expected ticks, time, volume or range", other),
        )),
    }
}

fn parse_direction(config: &dyn ConfigPort) -> Result<Extremum, TickbarsError> {
    match config.get_string("aroon", "direction") {
        None => Ok(Extremum::Max),
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "up" => Ok(Extremum::Max),
            "down" => Ok(Extremum::Min),
            other => Err(invalid(
                "aroon",
                "direction",
                format!("unknown direction '{}', expected up or down", other),
            )),
        },
    }
}
