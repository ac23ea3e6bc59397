use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;
use crate::core::config::SourceMode;
use crate::core::error::Result;
use crate::core::types::Record;

/// How much of a source a scan covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanScope {
    /// Every record in ingestion order
    All,
    /// A representative prefix; chunked sources read only their first file
    Preview,
}

/// Visitor callback; `Break` stops the scan and releases the underlying reader
pub type Visit<'a> = dyn FnMut(Arc<Record>) -> ControlFlow<()> + 'a;

/// A read-only sequence of sales records
pub trait RecordSource: Send + Sync {
    fn mode(&self) -> SourceMode;

    /// Files backing this source, in scan order
    fn files(&self) -> &[PathBuf];

    /// Total number of records, when known without a scan
    fn len_hint(&self) -> Option<usize>;

    /// Feed records to `visit` in ingestion order until it breaks or the
    /// source is exhausted. Returns `Break` when the visitor stopped early.
    fn scan(&self, scope: ScanScope, visit: &mut Visit<'_>) -> Result<ControlFlow<()>>;
}
