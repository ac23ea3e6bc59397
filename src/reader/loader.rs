use std::fs::{self, File};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use csv::{ReaderBuilder, StringRecord, Trim};
use regex::Regex;
use crate::core::config::{DataConfig, SourceMode};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Record, RecordFields, RecordId};
use crate::reader::source::{RecordSource, ScanScope, Visit};
use crate::schema::schema::{HeaderReport, SalesField};

/// Locate the CSV files of a data directory.
///
/// Chunk files `<chunk_prefix><N>.csv` win and are ordered by `N`; without
/// any, the single `file_name` is used.
pub fn discover_files(config: &DataConfig) -> Result<Vec<PathBuf>> {
    let dir = &config.data_dir;
    if !dir.is_dir() {
        return Err(Error::not_found(format!("data directory {} does not exist", dir.display())));
    }

    let pattern = format!(r"^{}(\d+)\.csv$", regex::escape(&config.chunk_prefix));
    let chunk_name = Regex::new(&pattern)
        .map_err(|e| Error::invalid_config(format!("bad chunk prefix: {}", e)))?;

    let mut chunks: Vec<(u64, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(number) = chunk_name
            .captures(name)
            .and_then(|caps| caps[1].parse::<u64>().ok())
        {
            chunks.push((number, entry.path()));
        }
    }

    if !chunks.is_empty() {
        chunks.sort_by_key(|(number, _)| *number);
        return Ok(chunks.into_iter().map(|(_, path)| path).collect());
    }

    let single = dir.join(&config.file_name);
    if single.is_file() {
        return Ok(vec![single]);
    }

    Err(Error::not_found(format!(
        "no CSV data in {}: expected {} or {}<N>.csv",
        dir.display(),
        config.file_name,
        config.chunk_prefix
    )))
}

fn file_error(path: &Path, err: impl Into<Error>) -> Error {
    let err = err.into();
    Error::new(err.kind, format!("{}: {}", path.display(), err.context))
}

/// Row reader for one CSV file; columns are matched to fields by header name.
pub struct CsvRecordReader {
    path: PathBuf,
    reader: csv::Reader<File>,
    columns: Vec<Option<SalesField>>,
    header: HeaderReport,
    row: StringRecord,
}

impl CsvRecordReader {
    pub fn open(path: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::Headers)
            .from_path(path)
            .map_err(|e| file_error(path, e))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| file_error(path, e))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let columns = headers.iter().map(|h| SalesField::from_header(h)).collect();
        let header = HeaderReport::from_headers(headers.iter().map(String::as_str));
        if !header.is_complete() {
            tracing::warn!(
                file = %path.display(),
                missing = ?header.missing,
                "CSV header lacks columns; they will read as empty"
            );
        }

        Ok(CsvRecordReader {
            path: path.to_path_buf(),
            reader,
            columns,
            header,
            row: StringRecord::new(),
        })
    }

    pub fn header(&self) -> &HeaderReport {
        &self.header
    }

    pub fn next_fields(&mut self) -> Result<Option<RecordFields>> {
        let more = self
            .reader
            .read_record(&mut self.row)
            .map_err(|e| file_error(&self.path, e))?;
        if !more {
            return Ok(None);
        }

        let mut fields = RecordFields::default();
        for (value, column) in self.row.iter().zip(&self.columns) {
            if let Some(field) = column {
                fields.set(*field, value);
            }
        }
        Ok(Some(fields))
    }
}

/// Stream the rows of one file into `visit`; the file is closed as soon as it breaks.
pub fn for_each_fields<F>(path: &Path, mut visit: F) -> Result<ControlFlow<()>>
where
    F: FnMut(RecordFields) -> ControlFlow<()>,
{
    let mut reader = CsvRecordReader::open(path)?;
    while let Some(fields) = reader.next_fields()? {
        if visit(fields).is_break() {
            return Ok(ControlFlow::Break(()));
        }
    }
    Ok(ControlFlow::Continue(()))
}

/// Every record of the data directory, held in memory
pub struct Dataset {
    records: Vec<Arc<Record>>,
    files: Vec<PathBuf>,
}

impl Dataset {
    pub fn load(config: &DataConfig) -> Result<Self> {
        let files = discover_files(config)?;
        Self::load_files(files)
    }

    pub fn load_files(files: Vec<PathBuf>) -> Result<Self> {
        if files.is_empty() {
            return Err(Error::new(ErrorKind::NotFound, "no CSV files to load".to_string()));
        }

        let mut records = Vec::new();
        for path in &files {
            let before = records.len();
            for_each_fields(path, |fields| {
                let id = RecordId(records.len() as u64);
                records.push(Arc::new(Record::new(id, fields)));
                ControlFlow::Continue(())
            })?;

            let loaded = records.len() - before;
            if loaded == 0 {
                tracing::warn!(file = %path.display(), "CSV file has no rows");
            } else {
                tracing::debug!(file = %path.display(), rows = loaded, "CSV file loaded");
            }
        }

        tracing::info!(files = files.len(), records = records.len(), "dataset loaded");
        Ok(Dataset { records, files })
    }

    /// Build a dataset from rows already in memory.
    pub fn from_fields<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = RecordFields>,
    {
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, fields)| Arc::new(Record::new(RecordId(i as u64), fields)))
            .collect();
        Dataset { records, files: Vec::new() }
    }

    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for Dataset {
    fn mode(&self) -> SourceMode {
        SourceMode::InMemory
    }

    fn files(&self) -> &[PathBuf] {
        &self.files
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.records.len())
    }

    // The whole dataset is already in memory, so a preview is a full scan.
    fn scan(&self, _scope: ScanScope, visit: &mut Visit<'_>) -> Result<ControlFlow<()>> {
        for record in &self.records {
            if visit(Arc::clone(record)).is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}
