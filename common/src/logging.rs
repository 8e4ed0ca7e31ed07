use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};
use log::Record;
use std::fmt::Arguments;
use thiserror::Error;

pub const DEFAULT_FORMAT: &str = "[$Y-$m-$D $H:$M $LEVEL] $MESSAGE";

// Longer placeholders go first: `$M` is a prefix of `$MESSAGE`.
const PLACEHOLDERS: [&str; 9] = [
    "$MESSAGE", "$TARGET", "$LEVEL", "$Y", "$m", "$D", "$H", "$M", "$S",
];

#[derive(Error, Debug)]
pub enum LogError {
    #[error("Logger initialization error.")]
    SetLoggerError(log::SetLoggerError),
}

impl LogError {
    pub fn additional_info(&self) -> Option<String> {
        match self {
            LogError::SetLoggerError(err) => Some(err.to_string()),
        }
    }
}

pub fn parse_format(format: &str, message: &Arguments, record: &Record) -> String {
    format_line(format, &Local::now(), message, record)
}

/// Expands every placeholder of `format`. Text coming from the message itself
/// is never expanded.
pub fn format_line<Tz: TimeZone>(
    format: &str, time: &DateTime<Tz>, message: &Arguments, record: &Record,
) -> String {
    let value = |placeholder: &str| match placeholder {
        "$MESSAGE" => message.to_string(),
        "$TARGET" => record.target().to_string(),
        "$LEVEL" => record.level().as_str().to_string(),
        "$Y" => format!("{:04}", time.year()),
        "$m" => format!("{:02}", time.month()),
        "$D" => format!("{:02}", time.day()),
        "$H" => format!("{:02}", time.hour()),
        "$M" => format!("{:02}", time.minute()),
        "$S" => format!("{:02}", time.second()),
        _ => placeholder.to_string(),
    };

    let mut line = String::with_capacity(format.len());
    let mut rest = format.trim();
    while let Some(start) = rest.find('$') {
        line.push_str(&rest[..start]);
        rest = &rest[start..];

        match PLACEHOLDERS.iter().find(|placeholder| rest.starts_with(*placeholder)) {
            Some(placeholder) => {
                line.push_str(&value(placeholder));
                rest = &rest[placeholder.len()..];
            },
            None => {
                line.push('$');
                rest = &rest[1..];
            },
        }
    }
    line.push_str(rest);

    line
}
