use crate::config::Config;
use classifier::layout::{FieldLayout, LogFormat};
use classifier::lookup::{LookupError, LookupTable};
use classifier::parser::{LogParser, ParserError};
use classifier::report::{Clock, ReportError, ReportWriter};
use std::path::PathBuf;
use thiserror::Error;

/// Lookup table, then flow logs, then report. Any failure aborts the run.
pub fn start<C: Clock>(config: &Config, writer: &ReportWriter<C>) -> Result<PathBuf, RunError> {
    let format = LogFormat::parse(&config.logs_format)?;
    let registry = config.protocol_registry();

    let table = LookupTable::load(&config.lookup_filepath, config.on_malformed)?;
    log::info!("Lookup table loaded: {} entries.", table.len());

    let parser = LogParser::new(&table, &registry)
        .with_custom_layout(FieldLayout::new(&config.custom_fields))
        .with_policy(config.on_malformed);
    let summary = parser.parse(&config.flowlogs_filepath, format)?;

    Ok(writer.write(&config.output_filepath, &summary.counts)?)
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Lookup table error. {0}")]
    Lookup(#[from] LookupError),

    #[error("Flow log error. {0}")]
    Parser(#[from] ParserError),

    #[error("Report error. {0}")]
    Report(#[from] ReportError),
}

impl RunError {
    pub fn additional_info(&self) -> Option<String> {
        match self {
            RunError::Lookup(err) => err.additional_info(),
            RunError::Parser(err) => err.additional_info(),
            RunError::Report(err) => err.additional_info(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use classifier::report::FixedClock;
    use std::collections::HashSet;
    use std::io::Write;

    const LOOKUP_PATH: &str = "../classifier/resources/lookup.csv";
    const FLOW_LOGS_PATH: &str = "../classifier/resources/flowlogs.txt";

    fn writer() -> ReportWriter<FixedClock> {
        ReportWriter::with_clock(FixedClock(NaiveDate::from_ymd_opt(2024, 8, 14).unwrap()))
    }

    fn config(output: PathBuf) -> Config {
        Config {
            lookup_filepath: PathBuf::from(LOOKUP_PATH),
            flowlogs_filepath: PathBuf::from(FLOW_LOGS_PATH),
            output_filepath: output,
            ..Config::default()
        }
    }

    #[test]
    fn test_full_run() {
        let root = tempfile::tempdir().unwrap();
        let config = config(root.path().join("output").join("report.txt"));

        let path = start(&config, &writer()).unwrap();

        assert_eq!(path, root.path().join("output").join("report_2024-08-14.txt"));
        let report = std::fs::read_to_string(&path).unwrap();
        let lines: HashSet<&str> = report.lines().collect();
        let expected = [
            "Tag Counts:",
            "Tag,Count",
            "sv_P2,3",
            "sv_P1,2",
            "email,3",
            "sv_P5,1",
            "Untagged,9",
            "Port/Protocol Combination Counts:",
            "Port,Protocol,Count",
            "443,tcp,2",
            "68,udp,1",
            "0,icmp,1",
            "31,unknown,1",
        ];
        for line in expected {
            assert!(lines.contains(line), "missing line: {line}");
        }
        // 2 section titles, 2 headers, 5 tags, 17 combinations and the separator.
        assert_eq!(report.lines().count(), 27);
    }

    #[test]
    fn test_unsupported_format_before_parsing() {
        let root = tempfile::tempdir().unwrap();
        let mut config = config(root.path().join("report.txt"));
        config.logs_format = "ipfix".to_string();
        // Would fail too, but the format is checked first.
        config.lookup_filepath = root.path().join("missing.csv");

        let result = start(&config, &writer());

        assert!(matches!(
            result,
            Err(RunError::Parser(ParserError::UnsupportedFormat(_)))
        ));
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_lookup_table() {
        let root = tempfile::tempdir().unwrap();
        let mut config = config(root.path().join("report.txt"));
        config.lookup_filepath = root.path().join("missing.csv");

        let err = start(&config, &writer()).unwrap_err();

        assert!(matches!(err, RunError::Lookup(LookupError::InvalidInput { .. })));
        assert!(err.additional_info().is_some());
    }

    #[test]
    fn test_malformed_line_writes_no_report() {
        let root = tempfile::tempdir().unwrap();
        let logs = root.path().join("flowlogs.txt");
        let mut file = std::fs::File::create(&logs).unwrap();
        writeln!(file, "2 1 eni 1.1.1.1 2.2.2.2 1000 443 6 1 1 1 1 ACCEPT OK").unwrap();
        writeln!(file, "2 1 eni 1.1.1.1").unwrap();

        let output = root.path().join("output").join("report.txt");
        let mut config = config(output.clone());
        config.flowlogs_filepath = logs;

        let result = start(&config, &writer());
        assert!(matches!(
            result,
            Err(RunError::Parser(ParserError::MalformedLogLine { line: 2, .. }))
        ));
        assert!(!root.path().join("output").exists());

        config.on_malformed = classifier::policy::MalformedPolicy::Skip;
        let path = start(&config, &writer()).unwrap();
        let report = std::fs::read_to_string(path).unwrap();
        assert!(report.lines().any(|line| line == "443,tcp,1"));
    }
}
