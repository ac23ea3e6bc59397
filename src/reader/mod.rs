pub mod source;
pub mod loader;
pub mod streaming;
pub mod inspect;

pub use loader::Dataset;
pub use source::{RecordSource, ScanScope};
pub use streaming::ChunkedSource;
