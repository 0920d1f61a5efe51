//! Entity mentions
//!
//! An [`EntityMention`] is a span of article text that some recognizer
//! proposed as a mention, optionally linked to a knowledge-base entity.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{Result, Span};

// ============================================================================
// Wire record
// ============================================================================

/// Dictionary form of a mention as it appears in dataset files.
///
/// Every key except `span` may be missing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MentionRecord {
    pub span: Span,

    #[serde(rename = "id", default)]
    pub entity_id: Option<String>,

    #[serde(default)]
    pub recognized_by: Option<String>,

    #[serde(default)]
    pub linked_by: Option<String>,

    #[serde(default)]
    pub referenced_span: Option<Span>,

    #[serde(default, deserialize_with = "present")]
    pub candidates: Option<Vec<String>>,

    #[serde(default)]
    pub contained: Option<bool>,
}

/// Optional collection key: may be missing, but an explicit `null` is a
/// shape error like any other non-sequence value.
pub(crate) fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl From<MentionRecord> for EntityMention {
    fn from(record: MentionRecord) -> Self {
        let mut mention = EntityMention::new(record.span);
        mention.recognized_by = record.recognized_by;
        mention.entity_id = record.entity_id;
        mention.linked_by = record.linked_by;
        mention.referenced_span = record.referenced_span;
        mention.contained = record.contained;
        // a missing key falls back to the empty default
        mention.candidates = record
            .candidates
            .map(|ids| ids.into_iter().collect())
            .unwrap_or_default();
        mention
    }
}

// ============================================================================
// EntityMention
// ============================================================================

/// A recognized and possibly linked span of text
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "MentionRecord")]
pub struct EntityMention {
    /// Identity key inside an article; fixed at construction
    span: Span,

    /// Component that proposed the span
    pub recognized_by: Option<String>,

    /// Linked knowledge-base entity, `None` while unlinked
    pub entity_id: Option<String>,

    /// Component that performed the linking
    pub linked_by: Option<String>,

    /// Entity ids considered while linking
    pub candidates: BTreeSet<String>,

    /// Span of the mention this one refers to
    pub referenced_span: Option<Span>,

    /// Whether the mention is nested inside another mention
    pub contained: Option<bool>,
}

impl EntityMention {
    /// Create an unlinked mention with no candidates
    pub fn new(span: impl Into<Span>) -> Self {
        Self {
            span: span.into(),
            recognized_by: None,
            entity_id: None,
            linked_by: None,
            candidates: BTreeSet::new(),
            referenced_span: None,
            contained: None,
        }
    }

    /// Set the recognizer
    pub fn with_recognized_by(mut self, recognized_by: impl Into<String>) -> Self {
        self.recognized_by = Some(recognized_by.into());
        self
    }

    /// Link at construction time
    pub fn with_link(mut self, entity_id: impl Into<String>, linked_by: impl Into<String>) -> Self {
        self.link(entity_id, linked_by);
        self
    }

    /// Set the entity id alone, leaving `linked_by` untouched
    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Set the linking candidates
    pub fn with_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates = candidates.into_iter().map(Into::into).collect();
        self
    }

    /// Set the referenced span
    pub fn with_referenced_span(mut self, span: impl Into<Span>) -> Self {
        self.referenced_span = Some(span.into());
        self
    }

    /// Set the contained flag
    pub fn with_contained(mut self, contained: bool) -> Self {
        self.contained = Some(contained);
        self
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Link this mention to an entity. The id is not checked against any
    /// knowledge base.
    pub fn link(&mut self, entity_id: impl Into<String>, linked_by: impl Into<String>) {
        self.entity_id = Some(entity_id.into());
        self.linked_by = Some(linked_by.into());
    }

    pub fn is_linked(&self) -> bool {
        self.entity_id.is_some()
    }

    /// Whether this mention's span intersects `span`
    pub fn overlaps(&self, span: impl Into<Span>) -> bool {
        self.span.overlaps(span.into())
    }

    /// Natural ordering of mentions: by span, ignoring every other field.
    ///
    /// Use with `sort_by`, e.g. `mentions.sort_by(EntityMention::cmp_by_span)`.
    pub fn cmp_by_span(&self, other: &Self) -> Ordering {
        self.span.cmp(&other.span)
    }

    /// Dictionary form of the mention.
    ///
    /// The evaluation format carries the provenance fields; without it only
    /// `span` and `id` are written, which is the gold answer format.
    pub fn to_value(&self, evaluation_format: bool) -> Value {
        let mut map = Map::new();
        map.insert("span".to_string(), span_value(self.span));
        if let Some(entity_id) = &self.entity_id {
            map.insert("id".to_string(), Value::from(entity_id.as_str()));
        }

        if evaluation_format {
            if let Some(recognized_by) = &self.recognized_by {
                map.insert(
                    "recognized_by".to_string(),
                    Value::from(recognized_by.as_str()),
                );
            }
            if let Some(linked_by) = &self.linked_by {
                map.insert("linked_by".to_string(), Value::from(linked_by.as_str()));
            }
            if let Some(referenced_span) = self.referenced_span {
                map.insert("referenced_span".to_string(), span_value(referenced_span));
            }
            // BTreeSet iterates in sorted order
            map.insert(
                "candidates".to_string(),
                Value::Array(self.candidates.iter().map(|c| Value::from(c.as_str())).collect()),
            );
            if let Some(contained) = self.contained {
                map.insert("contained".to_string(), Value::Bool(contained));
            }
        }

        Value::Object(map)
    }

    /// Serialize to a JSON string
    pub fn to_json(&self, evaluation_format: bool) -> String {
        self.to_value(evaluation_format).to_string()
    }

    /// Rebuild a mention from its dictionary form
    pub fn from_value(value: &Value) -> Result<Self> {
        let record = MentionRecord::deserialize(value)?;
        Ok(record.into())
    }

    /// Parse a mention from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let record: MentionRecord = serde_json::from_str(json)?;
        Ok(record.into())
    }
}

impl Serialize for EntityMention {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value(true).serialize(serializer)
    }
}

impl fmt::Display for EntityMention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value(true))
    }
}

pub(crate) fn span_value(span: Span) -> Value {
    Value::Array(vec![Value::from(span.begin), Value::from(span.end)])
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_mention() -> EntityMention {
        EntityMention::new((4, 10))
            .with_recognized_by("spacy")
            .with_link("Q64", "popular_entities")
            .with_candidates(["Q64", "Q1022", "Q152"])
            .with_referenced_span((0, 3))
            .with_contained(false)
    }

    #[test]
    fn test_new_mention_defaults() {
        let mention = EntityMention::new((0, 5));
        assert_eq!(mention.span(), Span::new(0, 5));
        assert!(mention.candidates.is_empty());
        assert!(!mention.is_linked());
        assert!(mention.contained.is_none());
    }

    #[test]
    fn test_link_sets_both_fields() {
        let mut mention = EntityMention::new((0, 5));
        mention.link("Q42", "prior");

        assert!(mention.is_linked());
        assert_eq!(mention.entity_id.as_deref(), Some("Q42"));
        assert_eq!(mention.linked_by.as_deref(), Some("prior"));
    }

    #[test]
    fn test_evaluation_format() {
        let value = full_mention().to_value(true);
        assert_eq!(
            value,
            json!({
                "span": [4, 10],
                "id": "Q64",
                "recognized_by": "spacy",
                "linked_by": "popular_entities",
                "referenced_span": [0, 3],
                "candidates": ["Q1022", "Q152", "Q64"],
                "contained": false
            })
        );
    }

    #[test]
    fn test_gold_format_omits_provenance() {
        let value = full_mention().to_value(false);
        assert_eq!(value, json!({"span": [4, 10], "id": "Q64"}));
    }

    #[test]
    fn test_unlinked_mention_has_no_id() {
        let value = EntityMention::new((1, 2)).to_value(true);
        assert_eq!(value, json!({"span": [1, 2], "candidates": []}));

        let gold = EntityMention::new((1, 2)).to_value(false);
        assert_eq!(gold, json!({"span": [1, 2]}));
    }

    #[test]
    fn test_from_value_roundtrip() {
        let original = full_mention();
        let restored = EntityMention::from_value(&original.to_value(true)).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn test_from_value_missing_keys() {
        let mention = EntityMention::from_value(&json!({"span": [2, 7]})).unwrap();
        assert_eq!(mention, EntityMention::new((2, 7)));
        assert!(mention.candidates.is_empty());

        let explicit_empty =
            EntityMention::from_value(&json!({"span": [2, 7], "candidates": []})).unwrap();
        assert_eq!(mention, explicit_empty);
    }

    #[test]
    fn test_from_value_requires_span() {
        assert!(EntityMention::from_value(&json!({"id": "Q1"})).is_err());
        assert!(EntityMention::from_value(&json!({"span": "0-3"})).is_err());
    }

    #[test]
    fn test_null_candidates_rejected() {
        assert!(EntityMention::from_value(&json!({"span": [0, 3], "candidates": null})).is_err());
        // scalar fields accept null as absent
        let mention =
            EntityMention::from_value(&json!({"span": [0, 3], "id": null, "contained": null}))
                .unwrap();
        assert_eq!(mention, EntityMention::new((0, 3)));
    }

    #[test]
    fn test_duplicate_candidates_collapse() {
        let mention =
            EntityMention::from_value(&json!({"span": [0, 1], "candidates": ["Q2", "Q1", "Q2"]}))
                .unwrap();
        assert_eq!(mention.candidates.len(), 2);
    }

    #[test]
    fn test_overlaps() {
        let mention = EntityMention::new((3, 6));
        assert!(mention.overlaps((5, 9)));
        assert!(!mention.overlaps((6, 9)));
        assert!(!mention.overlaps((0, 3)));
    }

    #[test]
    fn test_sort_by_span() {
        let mut mentions = vec![
            EntityMention::new((5, 8)),
            EntityMention::new((0, 4)).with_entity_id("Q1"),
            EntityMention::new((0, 2)),
        ];
        mentions.sort_by(EntityMention::cmp_by_span);

        let spans: Vec<_> = mentions.iter().map(EntityMention::span).collect();
        assert_eq!(spans, vec![Span::new(0, 2), Span::new(0, 4), Span::new(5, 8)]);
    }

    #[test]
    fn test_display_is_evaluation_dict() {
        let mention = EntityMention::new((0, 1)).with_entity_id("Q5");
        let rendered: Value = serde_json::from_str(&mention.to_string()).unwrap();
        assert_eq!(rendered, mention.to_value(true));
    }

    #[test]
    fn test_serde_deserialize_matches_from_json() {
        let json = r#"{"span": [0, 4], "id": "Q90", "linked_by": "x"}"#;
        let via_serde: EntityMention = serde_json::from_str(json).unwrap();
        let via_helper = EntityMention::from_json(json).unwrap();
        assert_eq!(via_serde, via_helper);
        assert!(via_serde.recognized_by.is_none());
    }
}
