use crate::config::{CONFIG_FILENAME, Config, ConfigError};
use clap::Parser;
use std::path::PathBuf;

/// Parse flow logs, tag every record by destination port and protocol,
/// and write a count report.
#[derive(Parser, Debug)]
#[command(name = "flowtag")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file. Created with defaults if missing
    #[arg(long = "config", value_name = "FILE", default_value = CONFIG_FILENAME)]
    pub config: PathBuf,

    /// Flow log format: default or custom
    #[arg(long = "logs_format", value_name = "FORMAT")]
    pub logs_format: Option<String>,

    /// Lookup table (CSV with dstport, protocol, tag columns)
    #[arg(long = "lookup_filepath", value_name = "FILE")]
    pub lookup_filepath: Option<PathBuf>,

    /// Flow log file
    #[arg(long = "flowlogs_filepath", value_name = "FILE")]
    pub flowlogs_filepath: Option<PathBuf>,

    /// Report location. Only the directory part is used
    #[arg(long = "output_filepath", value_name = "FILE")]
    pub output_filepath: Option<PathBuf>,

    /// Malformed input handling: abort or skip
    #[arg(long = "on_malformed", value_name = "POLICY")]
    pub on_malformed: Option<String>,
}

impl Args {
    /// Flags given on the command line take precedence over the config file.
    pub fn apply(self, config: &mut Config) -> Result<(), ConfigError> {
        if let Some(value) = self.logs_format {
            config.logs_format = value;
        }
        if let Some(value) = self.lookup_filepath {
            config.lookup_filepath = value;
        }
        if let Some(value) = self.flowlogs_filepath {
            config.flowlogs_filepath = value;
        }
        if let Some(value) = self.output_filepath {
            config.output_filepath = value;
        }
        if let Some(value) = self.on_malformed {
            config.on_malformed = crate::config::parse_policy(&value)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classifier::policy::MalformedPolicy;

    #[test]
    fn test_no_flags_keep_config() {
        let args = Args::try_parse_from(["flowtag"]).unwrap();
        assert_eq!(args.config, PathBuf::from(CONFIG_FILENAME));

        let mut config = Config::default();
        args.apply(&mut config).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "flowtag",
            "--logs_format",
            "custom",
            "--lookup_filepath",
            "tables/lookup.csv",
            "--flowlogs_filepath",
            "logs/vpc.txt",
            "--output_filepath",
            "out/report.txt",
            "--on_malformed",
            "skip",
        ])
        .unwrap();

        let mut config = Config::default();
        args.apply(&mut config).unwrap();

        assert_eq!(config.logs_format, "custom");
        assert_eq!(config.lookup_filepath, PathBuf::from("tables/lookup.csv"));
        assert_eq!(config.flowlogs_filepath, PathBuf::from("logs/vpc.txt"));
        assert_eq!(config.output_filepath, PathBuf::from("out/report.txt"));
        assert_eq!(config.on_malformed, MalformedPolicy::Skip);
    }

    #[test]
    fn test_wrong_policy() {
        let args = Args::try_parse_from(["flowtag", "--on_malformed", "retry"]).unwrap();

        let mut config = Config::default();
        assert!(matches!(
            args.apply(&mut config),
            Err(ConfigError::UnknownPolicy)
        ));
    }
}
