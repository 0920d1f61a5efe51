//! Articles annotated with entity mentions
//!
//! An [`Article`] owns its text, its mentions keyed by span, and the
//! derived lookup structures: span ids, the span insertion list and the
//! per-character coverage array. The derived state is rebuilt every time
//! mentions are added, so it always reflects the current mention set.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::coverage::{check_bounds, compute_coverage, NO_MENTION};
use crate::mention::{present, span_value};
use crate::{ElinkError, EntityMention, Result, Span, SpanMap};

/// Raw markup link: span of the anchor text and the link target
pub type Hyperlink = (Span, String);

/// Section boundary: span of the section and its heading
pub type Section = (Span, String);

// ============================================================================
// Wire record
// ============================================================================

/// Dictionary form of an article as it appears in dataset files
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleRecord {
    /// Integer id, or a string holding one
    pub id: Value,

    pub title: String,

    pub text: String,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default, deserialize_with = "present")]
    pub hyperlinks: Option<Vec<Hyperlink>>,

    #[serde(default, deserialize_with = "present")]
    pub title_synonyms: Option<Vec<Span>>,

    #[serde(default, deserialize_with = "present")]
    pub sections: Option<Vec<Section>>,

    #[serde(default)]
    pub evaluation_span: Option<Span>,

    #[serde(default, deserialize_with = "present")]
    pub entity_mentions: Option<Vec<EntityMention>>,
}

impl TryFrom<ArticleRecord> for Article {
    type Error = ElinkError;

    fn try_from(record: ArticleRecord) -> Result<Self> {
        let id = coerce_id(&record.id)?;

        let mut article = Article::new(id, record.title, record.text);
        article.hyperlinks = record.hyperlinks.unwrap_or_default();
        article.title_synonyms = record.title_synonyms.unwrap_or_default();
        article.url = record.url;
        article.sections = record.sections;
        if let Some(evaluation_span) = record.evaluation_span {
            article.evaluation_span = evaluation_span;
        }
        article.add_entity_mentions(record.entity_mentions.unwrap_or_default())?;

        Ok(article)
    }
}

/// Coerce a JSON id to an integer the way dataset producers wrote them:
/// plain integers, floats, or decimal strings.
fn coerce_id(value: &Value) -> Result<i64> {
    let id = match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };

    id.ok_or_else(|| ElinkError::InvalidId {
        value: value.to_string(),
    })
}

// ============================================================================
// Article
// ============================================================================

/// A document with its entity mentions and derived coverage
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "ArticleRecord")]
pub struct Article {
    /// Document id, unique within a dataset
    pub id: i64,

    pub title: String,

    /// Body text; every span is a character offset into it
    text: String,

    /// Length of `text` in characters
    text_len: usize,

    pub hyperlinks: Vec<Hyperlink>,

    /// Spans of `text` that render the title differently
    pub title_synonyms: Vec<Span>,

    pub url: Option<String>,

    entity_mentions: SpanMap<EntityMention>,

    span_to_span_id: SpanMap<usize>,

    spans: Vec<Span>,

    entity_coverage: Vec<usize>,

    /// Region of `text` considered during evaluation
    pub evaluation_span: Span,

    /// `None` when the source had no section information
    pub sections: Option<Vec<Section>>,
}

impl Article {
    /// Create an article without mentions.
    ///
    /// The evaluation span covers the whole text and the coverage array is
    /// all zeros.
    pub fn new(id: i64, title: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let text_len = text.chars().count();
        Self {
            id,
            title: title.into(),
            text,
            text_len,
            hyperlinks: Vec::new(),
            title_synonyms: Vec::new(),
            url: None,
            entity_mentions: SpanMap::new(),
            span_to_span_id: SpanMap::new(),
            spans: Vec::new(),
            entity_coverage: vec![NO_MENTION; text_len],
            evaluation_span: Span::new(0, text_len),
            sections: None,
        }
    }

    pub fn with_hyperlinks(mut self, hyperlinks: Vec<Hyperlink>) -> Self {
        self.hyperlinks = hyperlinks;
        self
    }

    pub fn with_title_synonyms(mut self, title_synonyms: Vec<Span>) -> Self {
        self.title_synonyms = title_synonyms;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_evaluation_span(mut self, evaluation_span: impl Into<Span>) -> Self {
        self.evaluation_span = evaluation_span.into();
        self
    }

    pub fn with_sections(mut self, sections: Vec<Section>) -> Self {
        self.sections = Some(sections);
        self
    }

    /// Add the initial mentions
    pub fn with_entity_mentions<I>(mut self, mentions: I) -> Result<Self>
    where
        I: IntoIterator<Item = EntityMention>,
    {
        self.add_entity_mentions(mentions)?;
        Ok(self)
    }

    /// Index `mentions` and rebuild the coverage array.
    ///
    /// A mention whose span is already present replaces the old mention in
    /// place. Every mention gets the id `span_to_span_id.len() + 1` at the
    /// time it is added, even when its span already had one. Coverage is
    /// then rewritten from the full mention set, later mentions winning on
    /// overlap.
    ///
    /// Fails without touching the article if any span reaches past the end
    /// of the text.
    pub fn add_entity_mentions<I>(&mut self, mentions: I) -> Result<()>
    where
        I: IntoIterator<Item = EntityMention>,
    {
        let mentions: Vec<EntityMention> = mentions.into_iter().collect();
        for mention in &mentions {
            check_bounds(mention.span(), self.text_len)?;
        }

        for mention in mentions {
            let span = mention.span();
            self.entity_mentions.insert(span, mention);

            // ids start at 1; 0 marks uncovered characters
            let span_id = self.span_to_span_id.len() + 1;
            self.span_to_span_id.insert(span, span_id);
            self.spans.push(span);
        }

        self.entity_coverage = compute_coverage(
            self.text_len,
            self.entity_mentions.keys(),
            &self.span_to_span_id,
        )?;
        Ok(())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the text in characters
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    /// Mentions keyed by span, in insertion order
    pub fn entity_mentions(&self) -> &SpanMap<EntityMention> {
        &self.entity_mentions
    }

    pub fn mention(&self, span: impl Into<Span>) -> Option<&EntityMention> {
        self.entity_mentions.get(&span.into())
    }

    /// Mutable access for linking; the span itself cannot change
    pub fn mention_mut(&mut self, span: impl Into<Span>) -> Option<&mut EntityMention> {
        self.entity_mentions.get_mut(&span.into())
    }

    pub fn span_to_span_id(&self) -> &SpanMap<usize> {
        &self.span_to_span_id
    }

    /// Every span ever added, in order, duplicates included
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn entity_coverage(&self) -> &[usize] {
        &self.entity_coverage
    }

    /// The mention whose id the coverage array holds at `position`
    pub fn mention_at(&self, position: usize) -> Option<&EntityMention> {
        match self.entity_coverage.get(position) {
            Some(&NO_MENTION) | None => None,
            Some(_) => self
                .entity_mentions
                .values()
                .rev()
                .find(|mention| mention.span().contains(position)),
        }
    }

    /// Number of characters covered by at least one mention
    pub fn covered_characters(&self) -> usize {
        self.entity_coverage
            .iter()
            .filter(|&&id| id != NO_MENTION)
            .count()
    }

    /// Characters of the text inside `span`
    pub fn span_text(&self, span: impl Into<Span>) -> Option<&str> {
        let span = span.into();
        if span.begin > span.end || span.end > self.text_len {
            return None;
        }
        let start = byte_offset(&self.text, span.begin);
        let end = byte_offset(&self.text, span.end);
        self.text.get(start..end)
    }

    pub fn linked_mentions(&self) -> impl Iterator<Item = &EntityMention> + '_ {
        self.entity_mentions.values().filter(|m| m.is_linked())
    }

    /// Mentions in their natural (span) order
    pub fn sorted_mentions(&self) -> Vec<&EntityMention> {
        let mut mentions: Vec<_> = self.entity_mentions.values().collect();
        mentions.sort_by(|a, b| a.cmp_by_span(b));
        mentions
    }

    /// Whether `span` lies inside the evaluation span
    pub fn in_evaluation_span(&self, span: impl Into<Span>) -> bool {
        self.evaluation_span.encloses(span.into())
    }

    // ------------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------------

    /// Dictionary form of the article.
    ///
    /// `evaluation_format` is passed through to every mention.
    pub fn to_value(&self, evaluation_format: bool) -> Value {
        let mut map = Map::new();
        map.insert("id".to_string(), Value::from(self.id));
        map.insert("title".to_string(), Value::from(self.title.as_str()));
        map.insert("text".to_string(), Value::from(self.text.as_str()));
        if let Some(url) = &self.url {
            map.insert("url".to_string(), Value::from(url.as_str()));
        }
        map.insert(
            "hyperlinks".to_string(),
            labelled_spans_value(&self.hyperlinks),
        );
        map.insert(
            "title_synonyms".to_string(),
            Value::Array(self.title_synonyms.iter().copied().map(span_value).collect()),
        );
        if let Some(sections) = &self.sections {
            map.insert("sections".to_string(), labelled_spans_value(sections));
        }
        map.insert(
            "evaluation_span".to_string(),
            span_value(self.evaluation_span),
        );
        map.insert(
            "entity_mentions".to_string(),
            Value::Array(
                self.entity_mentions
                    .values()
                    .map(|mention| mention.to_value(evaluation_format))
                    .collect(),
            ),
        );
        Value::Object(map)
    }

    /// Single-line JSON, as stored in JSON-lines datasets
    pub fn to_json(&self, evaluation_format: bool) -> String {
        self.to_value(evaluation_format).to_string()
    }

    pub fn to_json_pretty(&self, evaluation_format: bool) -> String {
        format!("{:#}", self.to_value(evaluation_format))
    }

    /// Rebuild an article from its dictionary form
    pub fn from_value(value: &Value) -> Result<Self> {
        let record = ArticleRecord::deserialize(value)?;
        Self::try_from(record)
    }

    /// Parse an article from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let record: ArticleRecord = serde_json::from_str(json)?;
        Self::try_from(record)
    }
}

impl Serialize for Article {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value(true).serialize(serializer)
    }
}

fn labelled_spans_value(entries: &[(Span, String)]) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|(span, label)| Value::Array(vec![span_value(*span), Value::from(label.as_str())]))
            .collect(),
    )
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(offset, _)| offset)
}

// ============================================================================
// Tests
// ============================================================================
