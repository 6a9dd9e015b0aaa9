//! Stderr logging for generator runs.
//!
//! Records from the `pictogram_*` crates pass at the requested level, while
//! everything else (image decoders, dependencies) is held to `WARN` or
//! quieter. Lines look like `[  1.204s W synth::generator] skipping ...`.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

const PIPELINE_PREFIX: &str = "pictogram_";

/// `RUST_LOG` fallback for [`init_tracing`].
#[cfg(feature = "tracing")]
pub const DEFAULT_TRACING_FILTER: &str = "warn,pictogram_core=info,pictogram_synth=info";

struct RunLogger {
    pipeline: LevelFilter,
    others: LevelFilter,
    started: Instant,
}

impl RunLogger {
    fn new(level: LevelFilter) -> Self {
        Self {
            pipeline: level,
            others: level.min(LevelFilter::Warn),
            started: Instant::now(),
        }
    }

    fn threshold(&self, target: &str) -> LevelFilter {
        if is_pipeline_target(target) {
            self.pipeline
        } else {
            self.others
        }
    }
}

fn is_pipeline_target(target: &str) -> bool {
    target.starts_with(PIPELINE_PREFIX)
}

fn short_target(target: &str) -> &str {
    target.strip_prefix(PIPELINE_PREFIX).unwrap_or(target)
}

fn level_tag(level: Level) -> char {
    match level {
        Level::Error => 'E',
        Level::Warn => 'W',
        Level::Info => 'I',
        Level::Debug => 'D',
        Level::Trace => 'T',
    }
}

impl Log for RunLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.threshold(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:7.3}s {} {}] {}",
            self.started.elapsed().as_secs_f64(),
            level_tag(record.level()),
            short_target(record.target()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<RunLogger> = OnceLock::new();

/// Install the run logger: `pictogram_*` records at `level`, other crates at
/// `level` capped to `WARN`.
///
/// Only the first call installs anything; later calls return `Ok(())`.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| RunLogger::new(level));
    log::set_logger(logger)?;
    log::set_max_level(logger.pipeline.max(logger.others));
    Ok(())
}

/// Install a `tracing` subscriber. `RUST_LOG` wins; otherwise
/// [`DEFAULT_TRACING_FILTER`] applies.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TRACING_FILTER));
    let builder = fmt().with_env_filter(filter).with_target(true);
    let _ = if json {
        builder.json().with_current_span(true).finish().try_init()
    } else {
        builder.compact().finish().try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependencies_are_capped_at_warn() {
        let logger = RunLogger::new(LevelFilter::Debug);
        assert_eq!(logger.threshold("pictogram_synth::generator"), LevelFilter::Debug);
        assert_eq!(logger.threshold("png::decoder"), LevelFilter::Warn);

        let quiet = RunLogger::new(LevelFilter::Error);
        assert_eq!(quiet.threshold("image::codecs"), LevelFilter::Error);
    }

    #[test]
    fn targets_are_shortened() {
        assert_eq!(short_target("pictogram_synth::plan"), "synth::plan");
        assert_eq!(short_target("image::io"), "image::io");
        assert_eq!(level_tag(Level::Warn), 'W');
    }

    #[test]
    fn repeated_init_keeps_first_level() {
        init_with_level(LevelFilter::Debug).unwrap();
        init_with_level(LevelFilter::Trace).unwrap();
        log::debug!("logger installed");
        assert_eq!(log::max_level(), LevelFilter::Debug);
    }
}
