use crate::policy::MalformedPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const UNTAGGED: &str = "Untagged";

pub const COLUMN_PORT: &str = "dstport";
pub const COLUMN_PROTOCOL: &str = "protocol";
pub const COLUMN_TAG: &str = "tag";

pub type Port = u16;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LookupKey {
    pub port: Port,
    pub protocol: String,
}

impl LookupKey {
    pub fn new(port: Port, protocol: &str) -> Self {
        Self {
            port,
            protocol: protocol.trim().to_lowercase(),
        }
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.port, self.protocol)
    }
}

/// (destination port, protocol) to tag mapping. Immutable once loaded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LookupTable {
    table: HashMap<LookupKey, String>,
    skipped: usize,
}

impl LookupTable {
    pub fn load(path: &Path, policy: MalformedPolicy) -> Result<Self, LookupError> {
        let file = std::fs::File::open(path).map_err(|source| LookupError::InvalidInput {
            path: path.to_path_buf(),
            source,
        })?;

        let table = Self::from_reader(io::BufReader::new(file), policy)?;
        log::debug!(
            "Lookup table {} loaded: {} entries, {} rows skipped.",
            path.display(),
            table.len(),
            table.skipped
        );

        Ok(table)
    }

    pub fn from_reader<R: io::Read>(
        reader: R, policy: MalformedPolicy,
    ) -> Result<Self, LookupError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let columns = Columns::resolve(reader.headers()?)?;

        let mut table = HashMap::new();
        let mut skipped: usize = 0;
        for result in reader.records() {
            let record = result?;
            // Blank line. `,,` has every field and is malformed instead.
            if record.len() <= 1 && record.iter().all(str::is_empty) {
                continue;
            }

            match columns.parse(&record) {
                // Later rows overwrite earlier ones for the same key.
                Ok((key, tag)) => {
                    table.insert(key, tag);
                },
                Err(reason) => {
                    let row = record.position().map(|position| position.line()).unwrap_or(0);
                    match policy {
                        MalformedPolicy::Abort => {
                            return Err(LookupError::MalformedLookupRow { row, reason });
                        },
                        MalformedPolicy::Skip => {
                            log::warn!("Lookup row {row} skipped: {reason}.");
                            skipped += 1;
                        },
                    }
                },
            }
        }

        Ok(Self { table, skipped })
    }

    /// Never fails: unknown keys are `Untagged`.
    pub fn lookup(&self, port: Port, protocol: &str) -> &str {
        self.classify(&LookupKey::new(port, protocol))
    }

    pub fn classify(&self, key: &LookupKey) -> &str {
        self.table.get(key).map(String::as_str).unwrap_or(UNTAGGED)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl FromIterator<(LookupKey, String)> for LookupTable {
    fn from_iter<T: IntoIterator<Item = (LookupKey, String)>>(iter: T) -> Self {
        Self {
            table: iter.into_iter().collect(),
            skipped: 0,
        }
    }
}

struct Columns {
    port: usize,
    protocol: usize,
    tag: usize,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, LookupError> {
        let position = |name: &'static str| {
            (0..headers.len())
                .rev()
                .find(|&index| headers.get(index).is_some_and(|header| header.trim() == name))
                .ok_or(LookupError::MissingColumn(name))
        };

        Ok(Self {
            port: position(COLUMN_PORT)?,
            protocol: position(COLUMN_PROTOCOL)?,
            tag: position(COLUMN_TAG)?,
        })
    }

    fn parse(&self, record: &csv::StringRecord) -> Result<(LookupKey, String), RowError> {
        let field = |index: usize, name: &'static str| {
            record
                .get(index)
                .map(str::trim)
                .ok_or(RowError::FieldMissing(name))
        };

        let port_raw = field(self.port, COLUMN_PORT)?;
        let port = port_raw
            .parse::<Port>()
            .map_err(|_| RowError::PortInvalid(port_raw.to_string()))?;
        let protocol = field(self.protocol, COLUMN_PROTOCOL)?;
        let tag = field(self.tag, COLUMN_TAG)?;

        Ok((LookupKey::new(port, protocol), tag.to_string()))
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum RowError {
    #[error("field `{0}` is missing")]
    FieldMissing(&'static str),

    #[error("destination port `{0}` is not a number in 0..=65535")]
    PortInvalid(String),
}

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Lookup table file can't be opened: {path}.")]
    InvalidInput { path: PathBuf, source: io::Error },

    #[error("Lookup table has no `{0}` column.")]
    MissingColumn(&'static str),

    #[error("Malformed lookup table row {row}: {reason}.")]
    MalformedLookupRow { row: u64, reason: RowError },

    #[error("CSV Error.")]
    Csv(#[from] csv::Error),
}

impl LookupError {
    pub fn additional_info(&self) -> Option<String> {
        match self {
            LookupError::InvalidInput { source, .. } => Some(source.to_string()),
            LookupError::Csv(err) => Some(err.to_string()),
            _ => None,
        }
    }
}
