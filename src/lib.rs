pub mod core;
pub mod schema;
pub mod query;
pub mod scoring;
pub mod search;
pub mod reader;
pub mod writer;
pub mod api;

pub use crate::core::config::Config;
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::query::ast::Query;
pub use crate::query::parser::QueryParser;
pub use crate::search::executor::QueryEngine;
