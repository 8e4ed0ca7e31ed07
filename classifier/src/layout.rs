use crate::lookup::{COLUMN_PORT, COLUMN_PROTOCOL};
use crate::parser::ParserError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumString};

// AWS VPC Flow Logs, version 2 default record
// https://docs.aws.amazon.com/vpc/latest/userguide/flow-log-records.html
pub const DEFAULT_FIELDS: [&str; 14] = [
    "version",
    "account-id",
    "interface-id",
    "srcaddr",
    "dstaddr",
    "srcport",
    "dstport",
    "protocol",
    "packets",
    "bytes",
    "start",
    "end",
    "action",
    "log-status",
];

pub const CUSTOM_FIELDS: [&str; 11] = [
    "srcaddr",
    "dstaddr",
    "srcport",
    "dstport",
    "protocol",
    "packets",
    "bytes",
    "start",
    "end",
    "action",
    "log-status",
];

#[derive(Clone, Copy, Debug, Default, Display, EnumString, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    #[default]
    Default,
    Custom,
}

impl LogFormat {
    pub fn parse(value: &str) -> Result<Self, ParserError> {
        Self::from_str(value.trim())
            .map_err(|_| ParserError::UnsupportedFormat(value.to_string()))
    }
}

/// Ordered field names of a whitespace-separated flow log record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldLayout {
    fields: Vec<String>,
}

impl FieldLayout {
    pub fn new<S: AsRef<str>>(fields: &[S]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|field| field.as_ref().trim().to_string())
                .collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Last occurrence wins if a name is listed twice.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().rposition(|field| field == name)
    }

    pub fn resolve(&self) -> Result<FieldPositions, ParserError> {
        Ok(FieldPositions {
            port: self
                .position(COLUMN_PORT)
                .ok_or(ParserError::MissingField(COLUMN_PORT))?,
            protocol: self
                .position(COLUMN_PROTOCOL)
                .ok_or(ParserError::MissingField(COLUMN_PROTOCOL))?,
        })
    }
}

impl Default for FieldLayout {
    fn default() -> Self {
        Self::new(&DEFAULT_FIELDS)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldPositions {
    pub port: usize,
    pub protocol: usize,
}

impl FieldPositions {
    /// Minimal number of fields a record must have.
    pub fn required(&self) -> usize {
        self.port.max(self.protocol) + 1
    }
}
