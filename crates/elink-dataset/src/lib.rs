//! elink Dataset - JSON-lines article datasets
//!
//! Reads and writes datasets stored as one article per line and
//! summarizes them with mention and linking statistics.

use elink_core::ElinkError;
use thiserror::Error;

pub mod reader;
pub mod stats;

pub use reader::{ArticleReader, ArticleWriter};
pub use stats::DatasetStats;

/// Errors raised while reading or writing a dataset
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: ElinkError,
    },
}

pub type Result<T> = std::result::Result<T, DatasetError>;
