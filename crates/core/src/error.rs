use std::path::PathBuf;

use thiserror::Error;

use crate::settings::SettingKind;

/// Failure to turn an environment value into a typed setting.
#[derive(Debug, Error)]
pub enum SettingError {
    #[error("{var}={value:?} cannot be read as {kind}: {reason}")]
    Invalid {
        var: String,
        value: String,
        kind: SettingKind,
        reason: String,
    },
    #[error("{var} is set but is not valid unicode")]
    NotUnicode { var: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Setting(#[from] SettingError),

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to open log file in {}: {source}", .dir.display())]
    LogFile {
        dir: PathBuf,
        #[source]
        source: tracing_appender::rolling::InitError,
    },

    #[error("failed to install logger: {0}")]
    Install(#[from] tracing::dispatcher::SetGlobalDefaultError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
