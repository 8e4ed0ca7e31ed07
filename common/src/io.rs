use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `<title>_<YYYY-MM-DD>.<extension>`, spaces in the title become dashes.
pub fn dated_file_name(title: &str, date: NaiveDate, extension: &str) -> String {
    let title_formatted = title.trim().replace(" ", "-");
    let date = date.format(DATE_FORMAT);
    format!("{title_formatted}_{date}.{extension}")
}

/// Directory part of a path. Bare file names resolve to the current directory.
pub fn parent_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

pub fn create_parent_directories(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent_path) = path.parent() {
        if parent_path.as_os_str().is_empty() {
            return Ok(());
        }
        return fs::create_dir_all(parent_path);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dated_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();

        assert_eq!(dated_file_name("report", date, "txt"), "report_2024-03-07.txt");
        assert_eq!(
            dated_file_name(" flow tagger ", date, "log"),
            "flow-tagger_2024-03-07.log"
        );
    }

    #[test]
    fn test_parent_directory() {
        assert_eq!(
            parent_directory(Path::new("data/output/report.txt")),
            PathBuf::from("data/output")
        );
        assert_eq!(parent_directory(Path::new("report.txt")), PathBuf::from("."));
    }

    #[test]
    fn test_create_parent_directories() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("a").join("b").join("report.txt");

        create_parent_directories(&file).unwrap();
        assert!(root.path().join("a").join("b").is_dir());

        // Already existing directories are fine.
        create_parent_directories(&file).unwrap();
        create_parent_directories(Path::new("report.txt")).unwrap();
    }
}
