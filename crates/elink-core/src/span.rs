//! Character spans and the insertion-ordered span map
//!
//! A [`Span`] is a half-open `[begin, end)` interval of character offsets.
//! On the wire it is a two-element array `[begin, end]`.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Span
// ============================================================================

/// Half-open character interval into a document's text.
///
/// Ordering is by `begin`, then `end`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Span {
    /// First character offset (inclusive)
    pub begin: usize,

    /// Last character offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span. `begin <= end` is assumed, not checked.
    pub const fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    /// Number of characters covered
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Half-open intersection test.
    ///
    /// A zero-length span never overlaps anything, itself included.
    pub fn overlaps(&self, other: Span) -> bool {
        self.begin < other.end && self.end > other.begin
    }

    /// Whether the character at `position` lies inside this span
    pub fn contains(&self, position: usize) -> bool {
        self.begin <= position && position < self.end
    }

    /// Whether `other` lies entirely inside this span
    pub fn encloses(&self, other: Span) -> bool {
        self.begin <= other.begin && other.end <= self.end
    }
}

impl From<(usize, usize)> for Span {
    fn from((begin, end): (usize, usize)) -> Self {
        Self { begin, end }
    }
}

impl From<Span> for (usize, usize) {
    fn from(span: Span) -> Self {
        (span.begin, span.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.begin, self.end)
    }
}

// ============================================================================
// SpanMap
// ============================================================================

/// Map keyed by [`Span`] that iterates in insertion order.
///
/// Re-inserting an existing span replaces the value but keeps the span's
/// original position.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanMap<V> {
    entries: Vec<(Span, V)>,
    index: HashMap<Span, usize>,
}

impl<V> Default for SpanMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> SpanMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace, returning the previous value for `span`
    pub fn insert(&mut self, span: Span, value: V) -> Option<V> {
        match self.index.get(&span) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position].1, value)),
            None => {
                self.index.insert(span, self.entries.len());
                self.entries.push((span, value));
                None
            }
        }
    }

    pub fn get(&self, span: &Span) -> Option<&V> {
        self.index.get(span).map(|&position| &self.entries[position].1)
    }

    pub fn get_mut(&mut self, span: &Span) -> Option<&mut V> {
        self.index
            .get(span)
            .map(|&position| &mut self.entries[position].1)
    }

    pub fn contains_key(&self, span: &Span) -> bool {
        self.index.contains_key(span)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Span, &V)> + '_ {
        self.entries.iter().map(|(span, value)| (*span, value))
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = Span> + '_ {
        self.entries.iter().map(|(span, _)| *span)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + '_ {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn values_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut V> + '_ {
        self.entries.iter_mut().map(|(_, value)| value)
    }
}

impl<V> FromIterator<(Span, V)> for SpanMap<V> {
    fn from_iter<I: IntoIterator<Item = (Span, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (span, value) in iter {
            map.insert(span, value);
        }
        map
    }
}

// ============================================================================
// Tests
// ============================================================================
