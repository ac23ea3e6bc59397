use std::fs::{self, File};
use std::path::{Path, PathBuf};
use csv::{ByteRecord, ReaderBuilder, WriterBuilder};
use serde::Serialize;
use crate::core::config::DataConfig;
use crate::core::error::{Error, Result};

/// One chunk file written by the splitter
#[derive(Debug, Clone, Serialize)]
pub struct ChunkInfo {
    pub path: PathBuf,
    pub rows: usize,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    pub input: PathBuf,
    pub rows: usize,
    pub chunks: Vec<ChunkInfo>,
}

struct OpenChunk {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows: usize,
}

impl OpenChunk {
    fn finish(mut self) -> Result<ChunkInfo> {
        self.writer.flush()?;
        drop(self.writer);
        let size_bytes = fs::metadata(&self.path)?.len();
        tracing::info!(file = %self.path.display(), rows = self.rows, "chunk written");
        Ok(ChunkInfo { path: self.path, rows: self.rows, size_bytes })
    }
}

/// Splits a large CSV into numbered chunk files, each repeating the header
pub struct CsvSplitter {
    output_dir: PathBuf,
    prefix: String,
    chunk_size: usize,
}

impl CsvSplitter {
    pub fn new(output_dir: impl Into<PathBuf>, prefix: impl Into<String>, chunk_size: usize) -> Self {
        CsvSplitter {
            output_dir: output_dir.into(),
            prefix: prefix.into(),
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(&config.data_dir, &config.chunk_prefix, config.split_chunk_size)
    }

    /// Chunk numbers start at 1.
    pub fn chunk_path(&self, number: usize) -> PathBuf {
        self.output_dir.join(format!("{}{}.csv", self.prefix, number))
    }

    pub fn split(&self, input: &Path) -> Result<SplitReport> {
        if !input.is_file() {
            return Err(Error::not_found(format!("input file {} not found", input.display())));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(input)?;
        let header = reader.byte_headers()?.clone();
        fs::create_dir_all(&self.output_dir)?;

        tracing::info!(
            input = %input.display(),
            chunk_size = self.chunk_size,
            "splitting CSV"
        );

        let mut chunks = Vec::new();
        let mut open: Option<OpenChunk> = None;
        let mut row = ByteRecord::new();
        let mut total = 0;

        while reader.read_byte_record(&mut row)? {
            let mut chunk = match open.take() {
                Some(chunk) => chunk,
                None => {
                    let path = self.chunk_path(chunks.len() + 1);
                    let mut writer = WriterBuilder::new().flexible(true).from_path(&path)?;
                    writer.write_byte_record(&header)?;
                    OpenChunk { writer, path, rows: 0 }
                }
            };

            chunk.writer.write_byte_record(&row)?;
            chunk.rows += 1;
            total += 1;

            if chunk.rows >= self.chunk_size {
                chunks.push(chunk.finish()?);
            } else {
                open = Some(chunk);
            }
        }

        if let Some(last) = open.take() {
            chunks.push(last.finish()?);
        }

        tracing::info!(rows = total, files = chunks.len(), "split complete");
        Ok(SplitReport { input: input.to_path_buf(), rows: total, chunks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn input(dir: &TempDir, rows: usize) -> PathBuf {
        let mut body = String::from("Customer Name,Quantity\n");
        for i in 0..rows {
            body.push_str(&format!("c{},{}\n", i, i));
        }
        let path = dir.path().join("sales_data.csv");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn splits_into_chunks_with_headers() {
        let dir = TempDir::new().unwrap();
        let path = input(&dir, 5);
        let splitter = CsvSplitter::new(dir.path(), "sales_data_part", 2);
        let report = splitter.split(&path).unwrap();

        assert_eq!(report.rows, 5);
        let rows: Vec<usize> = report.chunks.iter().map(|c| c.rows).collect();
        assert_eq!(rows, vec![2, 2, 1]);

        let third = fs::read_to_string(splitter.chunk_path(3)).unwrap();
        assert_eq!(third, "Customer Name,Quantity\nc4,4\n");
        assert!(report.chunks.iter().all(|c| c.size_bytes > 0));
    }

    #[test]
    fn exact_multiple_leaves_no_empty_chunk() {
        let dir = TempDir::new().unwrap();
        let path = input(&dir, 4);
        let report = CsvSplitter::new(dir.path(), "part", 2).split(&path).unwrap();
        assert_eq!(report.chunks.len(), 2);
        assert!(!dir.path().join("part3.csv").exists());
    }

    #[test]
    fn header_only_input_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = input(&dir, 0);
        let report = CsvSplitter::new(dir.path(), "part", 10).split(&path).unwrap();
        assert_eq!(report.rows, 0);
        assert!(report.chunks.is_empty());
    }

    #[test]
    fn missing_input_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = CsvSplitter::new(dir.path(), "part", 10)
            .split(&dir.path().join("none.csv"))
            .unwrap_err();
        assert_eq!(err.kind, crate::core::error::ErrorKind::NotFound);
    }

    #[test]
    fn chunks_load_back_in_order() {
        let dir = TempDir::new().unwrap();
        let path = input(&dir, 25);
        let out = dir.path().join("chunks");
        CsvSplitter::new(&out, "sales_data_part", 10).split(&path).unwrap();

        let config = DataConfig { data_dir: out, ..DataConfig::default() };
        let dataset = crate::reader::loader::Dataset::load(&config).unwrap();
        assert_eq!(dataset.len(), 25);
        assert_eq!(dataset.records()[24].customer_name(), "c24");
    }
}
