use std::fmt;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Renders `<timestamp> | <level> | <message> key=value …`, one line per event.
///
/// The timestamp is local time, `YYYY-MM-DD HH:MM:SS`. Levels are spelled
/// `TRACE`, `DEBUG`, `INFO`, `WARNING` and `ERROR`. Structured fields follow
/// the message in the order they were recorded.
#[derive(Debug, Default, Clone, Copy)]
pub struct PipeFormat;

impl<S, N> FormatEvent<S, N> for PipeFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} | {} | ",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            level_name(*event.metadata().level()),
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::TRACE => "TRACE",
        Level::DEBUG => "DEBUG",
        Level::INFO => "INFO",
        Level::WARN => "WARNING",
        Level::ERROR => "ERROR",
    }
}
