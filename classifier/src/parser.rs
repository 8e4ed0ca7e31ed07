use crate::counts::FlowCounts;
use crate::layout::{CUSTOM_FIELDS, FieldLayout, FieldPositions, LogFormat};
use crate::lookup::{COLUMN_PORT, COLUMN_PROTOCOL, LookupKey, LookupTable, Port};
use crate::policy::MalformedPolicy;
use crate::protocols::{ProtocolRegistry, UNKNOWN_PROTOCOL};
use std::io;
use std::io::BufRead;
use std::num::IntErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Streams flow log records, classifies them and accumulates counts.
pub struct LogParser<'a> {
    table: &'a LookupTable,
    registry: &'a ProtocolRegistry,
    custom_layout: FieldLayout,
    policy: MalformedPolicy,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParseSummary {
    pub counts: FlowCounts,
    pub parsed: usize,
    pub skipped: usize,
}

impl<'a> LogParser<'a> {
    pub fn new(table: &'a LookupTable, registry: &'a ProtocolRegistry) -> Self {
        Self {
            table,
            registry,
            custom_layout: FieldLayout::new(&CUSTOM_FIELDS),
            policy: MalformedPolicy::default(),
        }
    }

    pub fn with_custom_layout(mut self, layout: FieldLayout) -> Self {
        self.custom_layout = layout;
        self
    }

    pub fn with_policy(mut self, policy: MalformedPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn layout(&self, format: LogFormat) -> FieldLayout {
        match format {
            LogFormat::Default => FieldLayout::default(),
            LogFormat::Custom => self.custom_layout.clone(),
        }
    }

    pub fn parse(&self, path: &Path, format: LogFormat) -> Result<ParseSummary, ParserError> {
        let file = std::fs::File::open(path).map_err(|source| ParserError::InvalidInput {
            path: path.to_path_buf(),
            source,
        })?;

        let summary = self.parse_reader(io::BufReader::new(file), format)?;
        log::info!(
            "Flow logs {} parsed: {} records, {} lines skipped.",
            path.display(),
            summary.parsed,
            summary.skipped
        );

        Ok(summary)
    }

    pub fn parse_reader<R: BufRead>(
        &self, reader: R, format: LogFormat,
    ) -> Result<ParseSummary, ParserError> {
        // Resolved once, not per line.
        let positions = self.layout(format).resolve()?;
        log::debug!(
            "Format {format}: {COLUMN_PORT} at {}, {COLUMN_PROTOCOL} at {}.",
            positions.port,
            positions.protocol
        );

        let mut summary = ParseSummary::default();
        for (index, bytes) in reader.split(b'\n').enumerate() {
            let bytes = bytes.map_err(ParserError::IOError)?;
            let line_number = index + 1;

            // Undecodable bytes are a bad line, not a read failure.
            let result = match String::from_utf8(bytes) {
                Ok(line) => {
                    let record = line.trim();
                    if record.is_empty() {
                        continue;
                    }
                    self.parse_record(record, &positions)
                },
                Err(_) => Err(LineError::InvalidUtf8),
            };

            match result {
                Ok(key) => {
                    let tag = self.table.classify(&key);
                    summary.counts.record(key, tag);
                    summary.parsed += 1;
                },
                Err(reason) => match self.policy {
                    MalformedPolicy::Abort => {
                        return Err(ParserError::MalformedLogLine {
                            line: line_number,
                            reason,
                        });
                    },
                    MalformedPolicy::Skip => {
                        log::warn!("Flow log line {line_number} skipped: {reason}.");
                        summary.skipped += 1;
                    },
                },
            }
        }

        Ok(summary)
    }

    fn parse_record(
        &self, record: &str, positions: &FieldPositions,
    ) -> Result<LookupKey, LineError> {
        let fields: Vec<&str> = record.split_whitespace().collect();
        if fields.len() < positions.required() {
            return Err(LineError::TooFewFields {
                expected: positions.required(),
                actual: fields.len(),
            });
        }

        let port_raw = fields.get(positions.port).copied().unwrap_or_default();
        let port = port_raw
            .parse::<Port>()
            .map_err(|_| LineError::PortInvalid(port_raw.to_string()))?;

        let protocol_raw = fields.get(positions.protocol).copied().unwrap_or_default();
        let protocol = match protocol_raw.parse::<i64>() {
            Ok(number) => self.registry.name(number),
            // Still an integer, just never a registered one.
            Err(err)
                if matches!(err.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) =>
            {
                UNKNOWN_PROTOCOL
            },
            Err(_) => return Err(LineError::ProtocolInvalid(protocol_raw.to_string())),
        };

        Ok(LookupKey::new(port, protocol))
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum LineError {
    #[error("expected at least {expected} fields, found {actual}")]
    TooFewFields { expected: usize, actual: usize },

    #[error("destination port `{0}` is not a number in 0..=65535")]
    PortInvalid(String),

    #[error("protocol `{0}` is not a number")]
    ProtocolInvalid(String),

    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Flow log file can't be opened: {path}.")]
    InvalidInput { path: PathBuf, source: io::Error },

    #[error("Unsupported flow log format: `{0}`. Expected `default` or `custom`.")]
    UnsupportedFormat(String),

    #[error("Flow log layout has no `{0}` field.")]
    MissingField(&'static str),

    #[error("Malformed flow log line {line}: {reason}.")]
    MalformedLogLine { line: usize, reason: LineError },

    #[error("IO Error.")]
    IOError(io::Error),
}

impl ParserError {
    pub fn additional_info(&self) -> Option<String> {
        match self {
            ParserError::InvalidInput { source, .. } => Some(source.to_string()),
            ParserError::IOError(err) => Some(err.to_string()),
            _ => None,
        }
    }
}
