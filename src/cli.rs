//! CLI definition and dispatch.
//!
//! The binary is a host pipeline around the library: it replays a CSV tick
//! feed through one engine and writes the derived stream as CSV on stdout.

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::info;

use crate::adapters::csv_adapter::CsvTickAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::bar::Bar;
use crate::domain::builder::BarStream;
use crate::domain::engine_config::EngineConfig;
use crate::domain::error::TickbarsError;
use crate::domain::indicator::aroon::{Extremum, IncrementalAroon, NaiveAroon};
use crate::domain::indicator::sum::{IncrementalSum, NaiveSum};
use crate::domain::indicator::vwap::VolumeVwap;
use crate::domain::indicator::{IndicatorType, StreamingIndicator};
use crate::logging;
use crate::ports::tick_port::{TickFeed, TickPort};

#[derive(Parser, Debug)]
#[command(name = "tickbars", about = "Tick feed bar and indicator replay")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build OHLC bars from a tick feed
    Bars {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        ticks: PathBuf,
    },
    /// Volume-windowed moving VWAP over every tick
    Vwap {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        ticks: PathBuf,
    },
    /// Aroon up/down over bar closes
    Aroon {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        ticks: PathBuf,
        /// Use the full-rescan implementation
        #[arg(long)]
        naive: bool,
    },
    /// Rolling sum and moving average over bar closes
    Sum {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        ticks: PathBuf,
        /// Use the full-rescan implementation
        #[arg(long)]
        naive: bool,
    },
    /// Validate an engine configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Bars { config, ticks } => replay(&config, &ticks, write_bars),
        Command::Vwap { config, ticks } => replay(&config, &ticks, write_vwap),
        Command::Aroon {
            config,
            ticks,
            naive,
        } => replay(&config, &ticks, |feed, cfg, out| {
            write_aroon(feed, cfg, naive, out)
        }),
        Command::Sum {
            config,
            ticks,
            naive,
        } => replay(&config, &ticks, |feed, cfg, out| {
            write_sum(feed, cfg, naive, out)
        }),
        Command::Validate { config } => load_engine_config(&config).map(|cfg| {
            eprintln!("{}: ok ({:?})", config.display(), cfg.bar_policy);
            0
        }),
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_engine_config(path: &Path) -> Result<EngineConfig, TickbarsError> {
    let adapter = FileConfigAdapter::from_file(path)?;
    EngineConfig::from_config(&adapter)
}

fn replay<F>(config_path: &Path, ticks_path: &Path, write: F) -> Result<usize, TickbarsError>
where
    F: FnOnce(TickFeed<'_>, &EngineConfig, &mut dyn Write) -> Result<usize, TickbarsError>,
{
    let cfg = load_engine_config(config_path)?;
    logging::init(&cfg.log_level);

    let adapter = CsvTickAdapter::new(ticks_path.to_path_buf());
    let feed = adapter.ticks()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let rows = write(feed, &cfg, &mut out)?;
    info!(rows, ticks = %ticks_path.display(), "replay finished");
    Ok(rows)
}

fn csv_writer(out: &mut dyn Write) -> csv::Writer<&mut dyn Write> {
    csv::Writer::from_writer(out)
}

fn flush(mut writer: csv::Writer<&mut dyn Write>) -> Result<(), TickbarsError> {
    writer.flush()?;
    Ok(())
}

fn csv_err(e: csv::Error) -> TickbarsError {
    TickbarsError::Io(io::Error::from(e))
}

fn bars<'a>(
    feed: TickFeed<'a>,
    cfg: &EngineConfig,
) -> Result<BarStream<TickFeed<'a>>, TickbarsError> {
    Ok(BarStream::new(feed, cfg.bar_policy)?.flush_on_end(cfg.flush_on_end))
}

/// One row per completed bar.
pub fn write_bars(
    feed: TickFeed<'_>,
    cfg: &EngineConfig,
    out: &mut dyn Write,
) -> Result<usize, TickbarsError> {
    let mut writer = csv_writer(out);
    writer
        .write_record([
            "seed_time",
            "open_instrument",
            "close_instrument",
            "open",
            "high",
            "low",
            "close",
            "volume",
            "count",
            "vwap",
            "roll_offset",
            "effective_offset",
            "true_range",
        ])
        .map_err(csv_err)?;

    let mut prev: Option<Bar> = None;
    let mut rows = 0;
    for bar in bars(feed, cfg)? {
        let bar = bar?;
        let (effective_offset, true_range) = match &prev {
            Some(p) => (bar.effective_offset(p), bar.true_range(p).to_string()),
            None => (bar.roll_offset(), String::new()),
        };
        writer
            .write_record([
                bar.seed_time().to_string(),
                bar.open().instrument_id.clone(),
                bar.close().instrument_id.clone(),
                bar.open().price.to_string(),
                bar.high().price.to_string(),
                bar.low().price.to_string(),
                bar.close().price.to_string(),
                bar.volume().to_string(),
                bar.count().to_string(),
                bar.vwap().map(|v| v.to_string()).unwrap_or_default(),
                bar.roll_offset().to_string(),
                effective_offset.to_string(),
                true_range,
            ])
            .map_err(csv_err)?;
        prev = Some(bar);
        rows += 1;
    }
    flush(writer)?;
    Ok(rows)
}

/// One row per tick once the volume window has filled.
pub fn write_vwap(
    feed: TickFeed<'_>,
    cfg: &EngineConfig,
    out: &mut dyn Write,
) -> Result<usize, TickbarsError> {
    let kind = IndicatorType::Vwap {
        window_volume: cfg.window_volume,
    };
    let mut vwap =
        VolumeVwap::new(cfg.window_volume)?.with_reconcile_interval(cfg.reconcile_interval);

    let mut writer = csv_writer(out);
    writer
        .write_record(["traded_at", "instrument", kind.to_string().as_str()])
        .map_err(csv_err)?;

    let mut rows = 0;
    for tick in feed {
        let tick = tick?;
        if let Some(value) = vwap.on_sample(tick.quantity, tick.price as f64) {
            writer
                .write_record([
                    tick.traded_at.to_string(),
                    tick.instrument_id,
                    value.to_string(),
                ])
                .map_err(csv_err)?;
            rows += 1;
        }
    }
    flush(writer)?;
    Ok(rows)
}

fn replay_closes(
    feed: TickFeed<'_>,
    cfg: &EngineConfig,
    kind: IndicatorType,
    indicator: &mut dyn StreamingIndicator<Input = f64, Output = f64>,
    out: &mut dyn Write,
) -> Result<usize, TickbarsError> {
    let mut writer = csv_writer(out);
    writer
        .write_record(["seed_time", "close", kind.to_string().as_str()])
        .map_err(csv_err)?;

    let mut rows = 0;
    for bar in bars(feed, cfg)? {
        let bar = bar?;
        if let Some(value) = indicator.next(bar.close().price as f64) {
            writer
                .write_record([
                    bar.seed_time().to_string(),
                    bar.close().price.to_string(),
                    value.to_string(),
                ])
                .map_err(csv_err)?;
            rows += 1;
        }
    }
    flush(writer)?;
    Ok(rows)
}

pub fn write_aroon(
    feed: TickFeed<'_>,
    cfg: &EngineConfig,
    naive: bool,
    out: &mut dyn Write,
) -> Result<usize, TickbarsError> {
    let period = cfg.aroon_period;
    let direction = cfg.aroon_direction;
    let kind = match direction {
        Extremum::Max => IndicatorType::AroonUp(period),
        Extremum::Min => IndicatorType::AroonDown(period),
    };
    let mut indicator: Box<dyn StreamingIndicator<Input = f64, Output = f64>> = if naive {
        Box::new(NaiveAroon::new(period, direction)?)
    } else {
        Box::new(IncrementalAroon::new(period, direction)?)
    };
    replay_closes(feed, cfg, kind, indicator.as_mut(), out)
}

pub fn write_sum(
    feed: TickFeed<'_>,
    cfg: &EngineConfig,
    naive: bool,
    out: &mut dyn Write,
) -> Result<usize, TickbarsError> {
    let window = cfg.sum_window;
    let mut indicator: Box<dyn StreamingIndicator<Input = f64, Output = f64>> = if naive {
        Box::new(NaiveSum::<f64>::new(window)?)
    } else {
        Box::new(IncrementalSum::<f64>::new(window)?)
    };
    replay_closes(feed, cfg, IndicatorType::Sum(window), indicator.as_mut(), out)
}
