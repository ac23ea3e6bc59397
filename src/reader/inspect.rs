use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::core::config::DataConfig;
use crate::core::error::{ErrorKind, Result};
use crate::reader::loader::{discover_files, CsvRecordReader};
use crate::schema::schema::{HeaderReport, SalesField};

/// What `verify` found about one data file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: Option<DateTime<Utc>>,
    pub header: HeaderReport,
    pub rows: usize,
    /// First rows as (customer name, date, final amount)
    pub preview: Vec<[String; 3]>,
}

/// What `verify` found about a data directory
#[derive(Debug, Clone, Serialize)]
pub struct DataReport {
    pub data_dir: PathBuf,
    pub files: Vec<FileReport>,
    /// Directory contents, filled only when no data file was found
    pub listing: Vec<String>,
}

impl DataReport {
    pub fn is_ok(&self) -> bool {
        !self.files.is_empty() && self.files.iter().all(|f| f.header.is_complete())
    }

    pub fn total_rows(&self) -> usize {
        self.files.iter().map(|f| f.rows).sum()
    }
}

pub fn inspect_file(path: &Path, preview_rows: usize) -> Result<FileReport> {
    let metadata = fs::metadata(path)?;
    let mut reader = CsvRecordReader::open(path)?;
    let header = reader.header().clone();

    let mut rows = 0;
    let mut preview = Vec::new();
    while let Some(fields) = reader.next_fields()? {
        if preview.len() < preview_rows {
            preview.push([
                fields.get(SalesField::CustomerName).to_string(),
                fields.get(SalesField::Date).to_string(),
                fields.get(SalesField::FinalAmount).to_string(),
            ]);
        }
        rows += 1;
    }

    Ok(FileReport {
        path: path.to_path_buf(),
        size_bytes: metadata.len(),
        modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        header,
        rows,
        preview,
    })
}

/// Inspect every data file the server would load.
///
/// A directory without data files is reported with its listing rather than
/// as an error; a missing directory is an error.
pub fn verify(config: &DataConfig, preview_rows: usize) -> Result<DataReport> {
    let files = match discover_files(config) {
        Ok(files) => files,
        Err(err) if err.kind == ErrorKind::NotFound && config.data_dir.is_dir() => {
            let mut listing: Vec<String> = fs::read_dir(&config.data_dir)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect();
            listing.sort();
            return Ok(DataReport {
                data_dir: config.data_dir.clone(),
                files: Vec::new(),
                listing,
            });
        }
        Err(err) => return Err(err),
    };

    let files = files
        .iter()
        .map(|path| inspect_file(path, preview_rows))
        .collect::<Result<Vec<_>>>()?;

    Ok(DataReport {
        data_dir: config.data_dir.clone(),
        files,
        listing: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(dir: &Path) -> DataConfig {
        DataConfig { data_dir: dir.to_path_buf(), ..DataConfig::default() }
    }

    #[test]
    fn reports_rows_and_preview() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("sales_data.csv"),
            "Customer Name,Date,Final Amount\nAlice,2022-05-01,10\nBob,2021-01-01,20\nCara,2020-01-01,30\n",
        )
        .unwrap();

        let report = verify(&config(dir.path()), 2).unwrap();
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.total_rows(), 3);

        let file = &report.files[0];
        assert_eq!(file.preview.len(), 2);
        assert_eq!(file.preview[1], ["Bob".to_string(), "2021-01-01".to_string(), "20".to_string()]);
        assert!(file.size_bytes > 0);
        // only three of the sixteen columns are present
        assert!(!report.is_ok());
    }

    #[test]
    fn empty_directory_lists_its_contents() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("readme.txt"), "hi").unwrap();
        let report = verify(&config(dir.path()), 3).unwrap();
        assert!(report.files.is_empty());
        assert_eq!(report.listing, vec!["readme.txt"]);
        assert!(!report.is_ok());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(verify(&config(&dir.path().join("missing")), 3).is_err());
    }

    #[test]
    fn complete_header_is_ok() {
        let dir = TempDir::new().unwrap();
        let header: Vec<&str> = SalesField::ALL.iter().map(|f| f.header()).collect();
        fs::write(dir.path().join("sales_data.csv"), format!("{}\n", header.join(","))).unwrap();
        let report = verify(&config(dir.path()), 3).unwrap();
        assert!(report.is_ok());
        assert_eq!(report.total_rows(), 0);
    }
}
