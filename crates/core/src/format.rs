//! Line format shared by console and file output.
//!
//! `<time> - <target> - <LEVEL> - <message> (<file>:<line>)`, optionally wrapped in an
//! ANSI color pair picked by severity.

use std::fmt::{self, Write as _};
use std::path::Path;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{ChronoLocal, FormatTime};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::level::{CRITICAL_FIELD, Severity};

pub const GREY: &str = "\x1b[38;21m";
pub const YELLOW: &str = "\x1b[33;21m";
pub const RED: &str = "\x1b[31;21m";
pub const BOLD_RED: &str = "\x1b[31;1m";
pub const RESET: &str = "\x1b[0m";

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Escape prefix for a record of the given severity.
pub fn color_for(severity: Severity) -> &'static str {
    if severity >= Severity::CRITICAL {
        BOLD_RED
    } else if severity >= Severity::ERROR {
        RED
    } else if severity >= Severity::WARNING {
        YELLOW
    } else {
        GREY
    }
}

/// Event formatter used by every output of the logger.
#[derive(Debug, Clone)]
pub struct RecordFormat<T = ChronoLocal> {
    timer: T,
    colored: bool,
}

impl RecordFormat {
    pub fn plain() -> Self {
        Self {
            timer: ChronoLocal::new(TIME_FORMAT.to_string()),
            colored: false,
        }
    }

    pub fn colored() -> Self {
        Self {
            colored: true,
            ..Self::plain()
        }
    }
}

impl<T> RecordFormat<T> {
    pub fn with_timer<T2>(self, timer: T2) -> RecordFormat<T2> {
        RecordFormat {
            timer,
            colored: self.colored,
        }
    }
}

impl<S, N, T> FormatEvent<S, N> for RecordFormat<T>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
    T: FormatTime,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let severity = Severity::of(meta);

        let mut fields = FieldVisitor::default();
        event.record(&mut fields);

        let file = meta
            .file()
            .and_then(|f| Path::new(f).file_name())
            .map(|f| f.to_string_lossy())
            .unwrap_or_else(|| "?".into());

        if self.colored {
            writer.write_str(color_for(severity))?;
        }
        self.timer.format_time(&mut writer)?;
        write!(
            writer,
            " - {} - {} - {}{} ({}:{})",
            meta.target(),
            severity,
            fields.message,
            fields.extra,
            file,
            meta.line().unwrap_or(0),
        )?;
        if self.colored {
            writer.write_str(RESET)?;
        }
        writeln!(writer)
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    extra: String,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.record_debug(field, &value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => {
                let _ = write!(self.message, "{value:?}");
            }
            CRITICAL_FIELD => {}
            name => {
                let _ = write!(self.extra, " {name}={value:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;
    use tracing_subscriber::prelude::*;

    use super::*;

    struct FixedTime;

    impl FormatTime for FixedTime {
        fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
            w.write_str("2024-01-02 03:04:05,678")
        }
    }

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = Buffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn render(format: RecordFormat<FixedTime>, emit: fn()) -> String {
        let buf = Buffer::default();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(buf.clone()),
        );
        tracing::subscriber::with_default(subscriber, emit);
        let bytes = buf.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn plain() -> RecordFormat<FixedTime> {
        RecordFormat::plain().with_timer(FixedTime)
    }

    fn colored() -> RecordFormat<FixedTime> {
        RecordFormat::colored().with_timer(FixedTime)
    }

    fn fetch_failed() {
        tracing::error!(target: "ekrhizoc::crawler", status = 503, "fetch failed");
    }

    fn disk_gone() {
        crate::critical!(target: "ekrhizoc::store", "disk gone");
    }

    fn slow_host() {
        tracing::warn!(target: "ekrhizoc", "slow host");
    }

    fn explicit_message() {
        tracing::info!(target: "ekrhizoc", message = "frontier empty", depth = "3");
    }

    fn queued() {
        tracing::info!(target: "ekrhizoc", "queued");
    }

    #[test]
    fn plain_line_layout() {
        let line = render(plain(), fetch_failed);
        assert!(
            line.starts_with(
                "2024-01-02 03:04:05,678 - ekrhizoc::crawler - ERROR - fetch failed status=503 (format.rs:"
            ),
            "{line:?}"
        );
        assert!(line.ends_with(")\n"), "{line:?}");
        assert!(!line.contains('\x1b'));
    }

    #[test]
    fn colored_error_wraps_plain_content_in_red() {
        let plain = render(plain(), fetch_failed);
        let colored = render(colored(), fetch_failed);
        assert_eq!(
            colored,
            format!("{RED}{}{RESET}\n", plain.trim_end_matches('\n'))
        );
    }

    #[test]
    fn critical_is_bold_red_and_hides_marker_field() {
        let line = render(colored(), disk_gone);
        assert!(line.starts_with(BOLD_RED), "{line:?}");
        assert!(line.contains(" - CRITICAL - disk gone ("), "{line:?}");
        assert!(!line.contains("critical=true"));
        assert!(line.ends_with(&format!("{RESET}\n")));
    }

    #[test]
    fn str_message_is_unquoted_and_str_fields_are_quoted() {
        let line = render(plain(), explicit_message);
        assert!(
            line.contains(" - INFO - frontier empty depth=\"3\" (format.rs:"),
            "{line:?}"
        );
    }

    #[test]
    fn colors_by_severity() {
        assert!(render(colored(), slow_host).starts_with(YELLOW));
        assert!(render(colored(), queued).starts_with(GREY));
        assert_eq!(color_for(Severity::DEBUG), GREY);
        assert_eq!(color_for(Severity::TRACE), GREY);
    }
}
