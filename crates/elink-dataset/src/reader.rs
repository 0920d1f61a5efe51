//! JSON-lines reader and writer
//!
//! Each non-blank line holds one article in its dictionary form.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use elink_core::Article;

use crate::{DatasetError, Result};

// ============================================================================
// Reader
// ============================================================================

/// Iterator over the articles of a JSON-lines dataset
pub struct ArticleReader<R> {
    lines: std::io::Lines<R>,
    line: usize,
}

impl ArticleReader<BufReader<File>> {
    /// Open a dataset file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Opening dataset {}", path.display());
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ArticleReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }

    /// Line number of the most recently read line (1-based)
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for ArticleReader<R> {
    type Item = Result<Article>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(DatasetError::Io(e))),
            };
            self.line += 1;

            if line.trim().is_empty() {
                continue;
            }

            let line_number = self.line;
            return Some(Article::from_json(&line).map_err(|source| {
                tracing::warn!("Malformed article on line {}: {}", line_number, source);
                DatasetError::Line {
                    line: line_number,
                    source,
                }
            }));
        }
    }
}

// ============================================================================
// Writer
// ============================================================================

/// Writes articles one per line
pub struct ArticleWriter<W: Write> {
    writer: W,
    evaluation_format: bool,
    written: usize,
}

impl ArticleWriter<BufWriter<File>> {
    /// Create (or truncate) a dataset file
    pub fn create(path: impl AsRef<Path>, evaluation_format: bool) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Writing dataset {}", path.display());
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file), evaluation_format))
    }
}

impl<W: Write> ArticleWriter<W> {
    /// `evaluation_format = false` writes the gold format
    pub fn new(writer: W, evaluation_format: bool) -> Self {
        Self {
            writer,
            evaluation_format,
            written: 0,
        }
    }

    pub fn write(&mut self, article: &Article) -> Result<()> {
        writeln!(self.writer, "{}", article.to_json(self.evaluation_format))?;
        self.written += 1;
        Ok(())
    }

    /// Number of articles written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the inner writer
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

// ============================================================================
// Tests
// ============================================================================
