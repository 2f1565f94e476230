use crate::config::{LOG_DIR, LOG_LEVEL};
use crate::error::{Error, Result};
use crate::format::RecordFormat;
use crate::level::Severity;
use crate::settings::Setting;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{Dispatch, debug};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{self, Rotation},
};
use tracing_subscriber::{Layer, Registry, filter::filter_fn, fmt, layer::SubscriberExt};

/// Name of the log file created inside the configured log directory.
pub const LOG_FILE_NAME: &str = "ekrhizoc.log";

static INSTALLED: AtomicBool = AtomicBool::new(false);

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Where a [`Logger`] writes its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Colorized lines on stderr.
    Console,
    /// Plain lines appended to this file.
    File(PathBuf),
}

/// A configured logger with exactly one output.
///
/// Nothing is global until [`Logger::install`] is called. Keep the handle alive for as long
/// as the process logs: dropping it flushes and stops the file writer.
#[derive(Debug)]
pub struct Logger {
    dispatch: Dispatch,
    level: Severity,
    output: Output,
    _guard: Option<WorkerGuard>,
}

impl Logger {
    /// Minimum severity this logger emits.
    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Dispatcher for scoped use, e.g. `tracing::dispatcher::with_default`.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Make this logger the process-wide default.
    ///
    /// Only the first call in a process takes effect; later calls keep the existing output
    /// and return `Ok`. Fails if a dispatcher was set globally by something else.
    pub fn install(&self) -> Result<()> {
        if INSTALLED.swap(true, Ordering::SeqCst) {
            debug!("logger already installed, keeping the existing output");
            return Ok(());
        }
        if let Err(e) = tracing::dispatcher::set_global_default(self.dispatch.clone()) {
            INSTALLED.store(false, Ordering::SeqCst);
            return Err(Error::Install(e));
        }

        // Panic hook to route panics through tracing (to reach the log file).
        install_panic_hook();
        Ok(())
    }
}

/// Build a logger from a level setting, a directory setting and a verbosity.
///
/// - Base level: the level setting's name, or `WARNING` if it names no level.
/// - Effective level: base lowered one tier per verbosity step, capped at two steps.
/// - Output: `<dir>/ekrhizoc.log` if the directory setting is non-empty, else stderr.
///
/// A non-empty directory that does not exist is an error; it is never created.
pub fn init_logger(
    verbosity: i32,
    level_setting: &Setting<&'static str>,
    dir_setting: &Setting<&'static str>,
) -> Result<Logger> {
    let base = Severity::from_name(&level_setting.resolve()?).unwrap_or(Severity::WARNING);
    let level = base.lowered(verbosity);

    let filter = filter_fn(move |meta| Severity::of(meta) >= level)
        .with_max_level_hint(level.level_filter());

    let log_dir = dir_setting.resolve()?;

    let (layer, output, guard): (BoxedLayer, Output, Option<WorkerGuard>) = if log_dir.is_empty() {
        // Console layer (colorized, to stderr).
        let layer = fmt::layer()
            .with_ansi(true)
            .event_format(RecordFormat::colored())
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed();
        (layer, Output::Console, None)
    } else {
        let dir = Path::new(&log_dir);
        if !dir.is_dir() {
            return Err(Error::NotADirectory(dir.to_path_buf()));
        }

        let appender = rolling::Builder::new()
            .rotation(Rotation::NEVER)
            .filename_prefix(LOG_FILE_NAME)
            .build(dir)
            .map_err(|source| Error::LogFile {
                dir: dir.to_path_buf(),
                source,
            })?;

        let (nb, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .with_ansi(false)
            .event_format(RecordFormat::plain())
            .with_writer(nb)
            .with_filter(filter)
            .boxed();
        (layer, Output::File(dir.join(LOG_FILE_NAME)), Some(guard))
    };

    let subscriber = Registry::default().with(layer);

    Ok(Logger {
        dispatch: Dispatch::new(subscriber),
        level,
        output,
        _guard: guard,
    })
}

/// [`init_logger`] with the declared `E6C_LOG_LEVEL` and `E6C_LOG_DIR` settings.
pub fn init_logger_from_env(verbosity: i32) -> Result<Logger> {
    init_logger(verbosity, &LOG_LEVEL, &LOG_DIR)
}

/// Install a panic hook that logs panics as critical events.
fn install_panic_hook() {
    // Only install once; subsequent calls keep the first hook.
    static ONCE: std::sync::Once = std::sync::Once::new();
    ONCE.call_once(|| {
        let default = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(|l| format!("{}:{}", l.file(), l.line()))
                .unwrap_or_default();
            if let Some(s) = info.payload().downcast_ref::<&str>() {
                crate::critical!(target: "panic", location = %location, "panic: {}", s);
            } else if let Some(s) = info.payload().downcast_ref::<String>() {
                crate::critical!(target: "panic", location = %location, "panic: {}", s);
            } else {
                crate::critical!(target: "panic", location = %location, "panic occurred");
            }
            // Still call the default hook so backtraces (if enabled) print to stderr.
            default(info);
        }));
    });
}
