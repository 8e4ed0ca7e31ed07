use crate::counts::FlowCounts;
use chrono::{Local, NaiveDate};
use std::fmt::Write;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const REPORT_TITLE: &str = "report";
pub const REPORT_EXTENSION: &str = "txt";

pub const SECTION_TAGS: &str = "Tag Counts:";
pub const HEADER_TAGS: &str = "Tag,Count";
pub const SECTION_PORT_PROTOCOLS: &str = "Port/Protocol Combination Counts:";
pub const HEADER_PORT_PROTOCOLS: &str = "Port,Protocol,Count";

/// Source of the date stamped into report file names.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub struct ReportWriter<C: Clock = SystemClock> {
    clock: C,
}

impl Default for ReportWriter<SystemClock> {
    fn default() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> ReportWriter<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// `<directory of path_prefix>/report_<YYYY-MM-DD>.txt`
    pub fn destination(&self, path_prefix: &Path) -> PathBuf {
        let file_name =
            common::io::dated_file_name(REPORT_TITLE, self.clock.today(), REPORT_EXTENSION);
        common::io::parent_directory(path_prefix).join(file_name)
    }

    /// Overwrites any report already written for the same day.
    pub fn write(&self, path_prefix: &Path, counts: &FlowCounts) -> Result<PathBuf, ReportError> {
        let path = self.destination(path_prefix);

        common::io::create_parent_directories(&path).map_err(|source| {
            ReportError::IOError {
                path: common::io::parent_directory(&path),
                source,
            }
        })?;
        std::fs::write(&path, render(counts)).map_err(|source| ReportError::IOError {
            path: path.clone(),
            source,
        })?;

        log::info!("Report saved: {}.", path.display());
        Ok(path)
    }
}

pub fn render(counts: &FlowCounts) -> String {
    let mut report = String::new();

    // Writing into a String can't fail.
    let _ = writeln!(report, "{SECTION_TAGS}");
    let _ = writeln!(report, "{HEADER_TAGS}");
    for (tag, count) in counts.sorted_tags() {
        let _ = writeln!(report, "{tag},{count}");
    }

    let _ = writeln!(report);
    let _ = writeln!(report, "{SECTION_PORT_PROTOCOLS}");
    let _ = writeln!(report, "{HEADER_PORT_PROTOCOLS}");
    for (key, count) in counts.sorted_port_protocols() {
        let _ = writeln!(report, "{key},{count}");
    }

    report
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Report can't be written: {path}.")]
    IOError { path: PathBuf, source: io::Error },
}

impl ReportError {
    pub fn additional_info(&self) -> Option<String> {
        match self {
            ReportError::IOError { source, .. } => Some(source.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{LookupKey, UNTAGGED};
    use std::collections::HashSet;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 14).unwrap()
    }

    fn sample() -> FlowCounts {
        let mut counts = FlowCounts::default();
        counts.record(LookupKey::new(443, "tcp"), "sv_P2");
        counts.record(LookupKey::new(443, "tcp"), "sv_P2");
        counts.record(LookupKey::new(68, "udp"), "sv_P2");
        counts.record(LookupKey::new(31, "unknown"), UNTAGGED);
        counts
    }

    #[test]
    fn test_destination() {
        let writer = ReportWriter::with_clock(FixedClock(date()));

        assert_eq!(
            writer.destination(Path::new("data/output/report.txt")),
            PathBuf::from("data/output/report_2024-08-14.txt")
        );
        assert_eq!(
            writer.destination(Path::new("anything.csv")),
            PathBuf::from("./report_2024-08-14.txt")
        );
    }

    #[test]
    fn test_render() {
        let expected = "Tag Counts:\n\
                        Tag,Count\n\
                        Untagged,1\n\
                        sv_P2,3\n\
                        \n\
                        Port/Protocol Combination Counts:\n\
                        Port,Protocol,Count\n\
                        31,unknown,1\n\
                        68,udp,1\n\
                        443,tcp,2\n";

        assert_eq!(render(&sample()), expected);
    }

    #[test]
    fn test_render_empty() {
        let report = render(&FlowCounts::default());
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(
            lines,
            vec![
                SECTION_TAGS,
                HEADER_TAGS,
                "",
                SECTION_PORT_PROTOCOLS,
                HEADER_PORT_PROTOCOLS
            ]
        );
    }

    #[test]
    fn test_write_creates_directories() {
        let root = tempfile::tempdir().unwrap();
        let prefix = root.path().join("nested").join("output").join("report.txt");
        let writer = ReportWriter::with_clock(FixedClock(date()));

        let path = writer.write(&prefix, &sample()).unwrap();

        assert_eq!(
            path,
            root.path().join("nested").join("output").join("report_2024-08-14.txt")
        );
        let written = std::fs::read_to_string(&path).unwrap();
        let lines: HashSet<&str> = written.lines().collect();
        for line in ["sv_P2,3", "Untagged,1", "443,tcp,2", "68,udp,1", "31,unknown,1"] {
            assert!(lines.contains(line), "missing line: {line}");
        }
    }

    #[test]
    fn test_write_overwrites() {
        let root = tempfile::tempdir().unwrap();
        let prefix = root.path().join("report.txt");
        let writer = ReportWriter::with_clock(FixedClock(date()));

        writer.write(&prefix, &sample()).unwrap();
        let path = writer.write(&prefix, &FlowCounts::default()).unwrap();

        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            render(&FlowCounts::default())
        );
    }

    #[test]
    fn test_write_failure() {
        let root = tempfile::tempdir().unwrap();
        // A regular file where the output directory should be.
        let blocker = root.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let writer = ReportWriter::with_clock(FixedClock(date()));

        let result = writer.write(&blocker.join("report.txt"), &sample());

        let err = result.unwrap_err();
        assert!(matches!(err, ReportError::IOError { .. }));
        assert!(err.additional_info().is_some());
    }

    #[test]
    fn test_system_clock() {
        let writer = ReportWriter::<SystemClock>::default();
        let name = writer.destination(Path::new("out/report.txt"));

        let expected = common::io::dated_file_name(
            REPORT_TITLE,
            Local::now().date_naive(),
            REPORT_EXTENSION,
        );
        assert_eq!(name, Path::new("out").join(expected));
    }
}
