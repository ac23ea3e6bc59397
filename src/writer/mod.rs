pub mod splitter;

pub use splitter::{CsvSplitter, SplitReport};
