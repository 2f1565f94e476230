use std::fmt;

use tracing::{Level, Metadata};
use tracing_subscriber::filter::LevelFilter;

/// Field that promotes an `ERROR` event to [`Severity::CRITICAL`].
pub const CRITICAL_FIELD: &str = "critical";

/// Numeric severity on a scale of 10-unit named tiers.
///
/// Higher is more severe. A logger set to severity `n` emits every event whose
/// severity is at least `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Severity(i32);

impl Severity {
    pub const NOTSET: Self = Self(0);
    pub const TRACE: Self = Self(5);
    pub const DEBUG: Self = Self(10);
    pub const INFO: Self = Self(20);
    pub const WARNING: Self = Self(30);
    pub const ERROR: Self = Self(40);
    pub const CRITICAL: Self = Self(50);

    /// Distance between two adjacent named tiers.
    pub const STEP: i32 = 10;

    /// Highest verbosity that still lowers the level.
    pub const MAX_VERBOSITY: i32 = 2;

    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Case-insensitive lookup of a level name.
    pub fn from_name(name: &str) -> Option<Self> {
        let level = match name.trim().to_ascii_uppercase().as_str() {
            "NOTSET" => Self::NOTSET,
            "TRACE" => Self::TRACE,
            "DEBUG" => Self::DEBUG,
            "INFO" => Self::INFO,
            "WARNING" | "WARN" => Self::WARNING,
            "ERROR" => Self::ERROR,
            "CRITICAL" | "FATAL" => Self::CRITICAL,
            _ => return None,
        };
        Some(level)
    }

    /// Drops one tier per unit of verbosity, at most [`Self::MAX_VERBOSITY`] tiers.
    /// Negative verbosity raises the level instead.
    pub fn lowered(self, verbosity: i32) -> Self {
        let verbosity = verbosity.min(Self::MAX_VERBOSITY);
        Self(self.0.saturating_sub(verbosity.saturating_mul(Self::STEP)))
    }

    /// Severity of an event or span from its static metadata.
    pub fn of(meta: &Metadata<'_>) -> Self {
        match *meta.level() {
            Level::TRACE => Self::TRACE,
            Level::DEBUG => Self::DEBUG,
            Level::INFO => Self::INFO,
            Level::WARN => Self::WARNING,
            _ if meta.fields().field(CRITICAL_FIELD).is_some() => Self::CRITICAL,
            _ => Self::ERROR,
        }
    }

    /// Most verbose `tracing` level that can still pass a threshold of `self`.
    pub fn level_filter(self) -> LevelFilter {
        if self <= Self::TRACE {
            LevelFilter::TRACE
        } else if self <= Self::DEBUG {
            LevelFilter::DEBUG
        } else if self <= Self::INFO {
            LevelFilter::INFO
        } else if self <= Self::WARNING {
            LevelFilter::WARN
        } else if self <= Self::CRITICAL {
            LevelFilter::ERROR
        } else {
            LevelFilter::OFF
        }
    }

    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::NOTSET => "NOTSET",
            Self::TRACE => "TRACE",
            Self::DEBUG => "DEBUG",
            Self::INFO => "INFO",
            Self::WARNING => "WARNING",
            Self::ERROR => "ERROR",
            Self::CRITICAL => "CRITICAL",
            _ => return None,
        })
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Level {}", self.0),
        }
    }
}
