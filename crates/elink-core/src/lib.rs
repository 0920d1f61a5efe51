//! elink Core - Article and entity mention models
//!
//! This crate defines the interchange format of the entity-linking dataset
//! pipeline:
//! - Character spans and the insertion-ordered span map
//! - Entity mentions with recognition and linking metadata
//! - Articles with derived span ids and per-character coverage
//! - JSON dictionary (de)serialization in evaluation and gold formats
//! - Common error types and configuration

pub mod article;
pub mod config;
pub mod coverage;
pub mod mention;
pub mod span;

pub use article::{Article, ArticleRecord, Hyperlink, Section};
pub use config::{AppConfig, ConfigError, LoggingConfig, OutputConfig};
pub use coverage::{compute_coverage, NO_MENTION};
pub use mention::{EntityMention, MentionRecord};
pub use span::{Span, SpanMap};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for elink operations
#[derive(Error, Debug)]
pub enum ElinkError {
    #[error("Malformed article data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid article id: {value}")]
    InvalidId { value: String },

    #[error("Span {span} out of range for text of length {text_len}")]
    SpanOutOfRange { span: Span, text_len: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, ElinkError>;
