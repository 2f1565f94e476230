//! Start-up plumbing for the ekrhizoc crawler: typed settings read from `E6C_*`
//! environment variables, and a logger built from them.

pub mod config;
pub mod error;
pub mod format;
pub mod level;
pub mod logger;
pub mod settings;

pub use error::{Error, Result, SettingError};
pub use level::Severity;
pub use logger::{Logger, Output, init_logger, init_logger_from_env};
pub use settings::{Setting, SettingInfo, SettingKind};

#[doc(hidden)]
pub use tracing as __tracing;

/// Emit an `ERROR` event that the logger reports as `CRITICAL`.
///
/// Accepts the same arguments as [`tracing::error!`].
#[macro_export]
macro_rules! critical {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::__tracing::error!(target: $target, critical = true, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__tracing::error!(critical = true, $($arg)+)
    };
}
