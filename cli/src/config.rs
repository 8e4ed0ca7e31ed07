use classifier::layout::CUSTOM_FIELDS;
use classifier::policy::MalformedPolicy;
use classifier::protocols::{ProtocolNumber, ProtocolRegistry};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const CONFIG_FILENAME: &str = "config.toml";

const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;
const DEFAULT_LOGS_FORMAT: &str = "default";
const DEFAULT_LOOKUP_FILEPATH: &str = "data/lookup.csv";
const DEFAULT_FLOWLOGS_FILEPATH: &str = "data/flowlogs.txt";
const DEFAULT_OUTPUT_FILEPATH: &str = "data/output/report.txt";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub log_format: String,
    pub log_level: LevelFilter,

    pub logs_format: String,
    pub lookup_filepath: PathBuf,
    pub flowlogs_filepath: PathBuf,
    pub output_filepath: PathBuf,

    pub on_malformed: MalformedPolicy,
    pub custom_fields: Vec<String>,
    pub protocols: BTreeMap<ProtocolNumber, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_format: common::logging::DEFAULT_FORMAT.to_string(),
            log_level: DEFAULT_LOG_LEVEL,

            logs_format: DEFAULT_LOGS_FORMAT.to_string(),
            lookup_filepath: PathBuf::from(DEFAULT_LOOKUP_FILEPATH),
            flowlogs_filepath: PathBuf::from(DEFAULT_FLOWLOGS_FILEPATH),
            output_filepath: PathBuf::from(DEFAULT_OUTPUT_FILEPATH),

            on_malformed: MalformedPolicy::default(),
            custom_fields: CUSTOM_FIELDS.iter().map(|field| field.to_string()).collect(),
            protocols: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Missing file: defaults are written to `path` and used.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path);
        if data.is_err() {
            let config = Config::default();
            config.save_to_file(path)?;
            return Ok(config);
        }

        Self::from_toml(&data.unwrap_or_default())
    }

    pub fn from_toml(data: &str) -> Result<Self, ConfigError> {
        let dto: ConfigDto =
            toml::from_str(data).map_err(ConfigError::TomlDeserializationError)?;
        dto.into_config()
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let data = toml::to_string(&ConfigDto::from(self))
            .map_err(ConfigError::TomlSerializationError)?;

        common::io::create_parent_directories(path).map_err(ConfigError::IOError)?;
        std::fs::write(path, data).map_err(ConfigError::IOError)?;

        Ok(())
    }

    pub fn protocol_registry(&self) -> ProtocolRegistry {
        self.protocols
            .iter()
            .fold(ProtocolRegistry::default(), |registry, (number, name)| {
                registry.with(*number, name)
            })
    }
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
struct ConfigDto {
    log_format: String,
    log_level: String,

    logs_format: String,
    lookup_filepath: PathBuf,
    flowlogs_filepath: PathBuf,
    output_filepath: PathBuf,

    on_malformed: String,
    custom_fields: Vec<String>,
    protocols: BTreeMap<String, String>,
}

impl Default for ConfigDto {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ConfigDto {
    fn from(config: &Config) -> Self {
        Self {
            log_format: config.log_format.clone(),
            log_level: config.log_level.to_string().to_lowercase(),

            logs_format: config.logs_format.clone(),
            lookup_filepath: config.lookup_filepath.clone(),
            flowlogs_filepath: config.flowlogs_filepath.clone(),
            output_filepath: config.output_filepath.clone(),

            on_malformed: config.on_malformed.to_string(),
            custom_fields: config.custom_fields.clone(),
            protocols: config
                .protocols
                .iter()
                .map(|(number, name)| (number.to_string(), name.clone()))
                .collect(),
        }
    }
}

impl ConfigDto {
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let protocols = self
            .protocols
            .into_iter()
            .map(|(number, name)| {
                number
                    .trim()
                    .parse::<ProtocolNumber>()
                    .map(|number| (number, name))
                    .map_err(|_| ConfigError::WrongProtocolNumber(number))
            })
            .collect::<Result<BTreeMap<ProtocolNumber, String>, ConfigError>>()?;

        Ok(Config {
            log_format: self.log_format,
            log_level: LevelFilter::from_str(&self.log_level)
                .map_err(|_| ConfigError::UnknownLogLevel)?,

            logs_format: self.logs_format,
            lookup_filepath: self.lookup_filepath,
            flowlogs_filepath: self.flowlogs_filepath,
            output_filepath: self.output_filepath,

            on_malformed: parse_policy(&self.on_malformed)?,
            custom_fields: self.custom_fields,
            protocols,
        })
    }
}

pub fn parse_policy(value: &str) -> Result<MalformedPolicy, ConfigError> {
    MalformedPolicy::from_str(value.trim()).map_err(|_| ConfigError::UnknownPolicy)
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO Error.")]
    IOError(#[from] std::io::Error),

    #[error("TOML Serialization Error.")]
    TomlSerializationError(#[from] toml::ser::Error),

    #[error("TOML Deserialization Error.")]
    TomlDeserializationError(#[from] toml::de::Error),

    #[error("Unknown log level.")]
    UnknownLogLevel,

    #[error("Unknown malformed input policy. Expected `abort` or `skip`.")]
    UnknownPolicy,

    #[error("Protocol number `{0}` is not in 0..=255.")]
    WrongProtocolNumber(String),
}

impl ConfigError {
    pub fn additional_info(&self) -> Option<String> {
        match self {
            ConfigError::IOError(err) => Some(err.to_string()),
            ConfigError::TomlSerializationError(err) => Some(err.to_string()),
            ConfigError::TomlDeserializationError(err) => Some(err.to_string()),
            _ => None,
        }
    }
}
