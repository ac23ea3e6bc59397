pub mod executor;
pub mod facets;
pub mod results;
pub mod selector;
pub mod summary;
