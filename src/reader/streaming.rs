use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;
use crate::core::config::{DataConfig, SourceMode};
use crate::core::error::Result;
use crate::core::types::{Record, RecordId};
use crate::reader::loader::{discover_files, for_each_fields};
use crate::reader::source::{RecordSource, ScanScope, Visit};

/// Source that re-reads the CSV chunks on every scan.
///
/// Nothing is held between scans; record ids are assigned in read order, so
/// they are stable as long as the files do not change.
pub struct ChunkedSource {
    files: Vec<PathBuf>,
}

impl ChunkedSource {
    pub fn open(config: &DataConfig) -> Result<Self> {
        let files = discover_files(config)?;
        tracing::info!(files = files.len(), dir = %config.data_dir.display(), "streaming source ready");
        Ok(ChunkedSource { files })
    }

    pub fn from_files(files: Vec<PathBuf>) -> Self {
        ChunkedSource { files }
    }
}

impl RecordSource for ChunkedSource {
    fn mode(&self) -> SourceMode {
        SourceMode::Streaming
    }

    fn files(&self) -> &[PathBuf] {
        &self.files
    }

    fn len_hint(&self) -> Option<usize> {
        None
    }

    fn scan(&self, scope: ScanScope, visit: &mut Visit<'_>) -> Result<ControlFlow<()>> {
        let files = match scope {
            ScanScope::All => &self.files[..],
            ScanScope::Preview => &self.files[..self.files.len().min(1)],
        };

        let mut next_id = 0u64;
        for path in files {
            let flow = for_each_fields(path, |fields| {
                let record = Arc::new(Record::new(RecordId(next_id), fields));
                next_id += 1;
                visit(record)
            })?;

            if flow.is_break() {
                tracing::debug!(file = %path.display(), rows = next_id, "scan stopped early");
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}
