//! Dataset statistics
//!
//! Counts mentions, links and candidates over a set of articles, along
//! with how much of the text the mentions cover.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use elink_core::Article;

/// Aggregate statistics over a dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    /// Number of articles
    pub articles: usize,
    /// Distinct mention spans
    pub mentions: usize,
    /// Mentions with an entity id
    pub linked_mentions: usize,
    /// Mentions with at least one candidate
    pub mentions_with_candidates: usize,
    /// Sum of candidate set sizes
    pub total_candidates: usize,
    /// Mentions per recognizer
    pub recognized_by: BTreeMap<String, usize>,
    /// Linked mentions per linker
    pub linked_by: BTreeMap<String, usize>,
    /// Characters of text
    pub characters: usize,
    /// Characters covered by a mention
    pub covered_characters: usize,
}

impl DatasetStats {
    /// Statistics over a collection of articles
    pub fn from_articles<'a, I>(articles: I) -> Self
    where
        I: IntoIterator<Item = &'a Article>,
    {
        let mut stats = Self::default();
        for article in articles {
            stats.add_article(article);
        }
        stats
    }

    /// Fold one article into the statistics
    pub fn add_article(&mut self, article: &Article) {
        self.articles += 1;
        self.characters += article.text_len();
        self.covered_characters += article.covered_characters();

        for mention in article.entity_mentions().values() {
            self.mentions += 1;
            if !mention.candidates.is_empty() {
                self.mentions_with_candidates += 1;
            }
            self.total_candidates += mention.candidates.len();
            if let Some(recognizer) = &mention.recognized_by {
                *self.recognized_by.entry(recognizer.clone()).or_default() += 1;
            }
            if mention.is_linked() {
                self.linked_mentions += 1;
                if let Some(linker) = &mention.linked_by {
                    *self.linked_by.entry(linker.clone()).or_default() += 1;
                }
            }
        }
    }

    /// Combine statistics of two dataset parts
    pub fn merge(&mut self, other: &DatasetStats) {
        self.articles += other.articles;
        self.mentions += other.mentions;
        self.linked_mentions += other.linked_mentions;
        self.mentions_with_candidates += other.mentions_with_candidates;
        self.total_candidates += other.total_candidates;
        self.characters += other.characters;
        self.covered_characters += other.covered_characters;
        for (name, count) in &other.recognized_by {
            *self.recognized_by.entry(name.clone()).or_default() += count;
        }
        for (name, count) in &other.linked_by {
            *self.linked_by.entry(name.clone()).or_default() += count;
        }
    }

    /// Fraction of mentions that are linked
    pub fn link_rate(&self) -> f32 {
        if self.mentions == 0 {
            0.0
        } else {
            self.linked_mentions as f32 / self.mentions as f32
        }
    }

    /// Fraction of characters covered by mentions
    pub fn coverage_ratio(&self) -> f32 {
        if self.characters == 0 {
            0.0
        } else {
            self.covered_characters as f32 / self.characters as f32
        }
    }

    /// Mean candidate set size over mentions that have candidates
    pub fn mean_candidates(&self) -> f32 {
        if self.mentions_with_candidates == 0 {
            0.0
        } else {
            self.total_candidates as f32 / self.mentions_with_candidates as f32
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use elink_core::EntityMention;

    fn sample_article() -> Article {
        Article::new(1, "Paris", "Paris is in France")
            .with_entity_mentions(vec![
                EntityMention::new((0, 5))
                    .with_recognized_by("ner")
                    .with_candidates(["Q90", "Q167646"])
                    .with_link("Q90", "prior"),
                EntityMention::new((12, 18)).with_recognized_by("ner"),
            ])
            .unwrap()
    }

    #[test]
    fn test_article_stats() {
        let article = sample_article();
        let stats = DatasetStats::from_articles([&article]);

        assert_eq!(stats.articles, 1);
        assert_eq!(stats.mentions, 2);
        assert_eq!(stats.linked_mentions, 1);
        assert_eq!(stats.mentions_with_candidates, 1);
        assert_eq!(stats.total_candidates, 2);
        assert_eq!(stats.recognized_by.get("ner"), Some(&2));
        assert_eq!(stats.linked_by.get("prior"), Some(&1));
        assert_eq!(stats.characters, 18);
        assert_eq!(stats.covered_characters, 11);
    }

    #[test]
    fn test_rates() {
        let article = sample_article();
        let stats = DatasetStats::from_articles([&article]);

        assert!((stats.link_rate() - 0.5).abs() < 0.001);
        assert!((stats.coverage_ratio() - 11.0 / 18.0).abs() < 0.001);
        assert!((stats.mean_candidates() - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_empty_stats() {
        let stats = DatasetStats::default();
        assert_eq!(stats.link_rate(), 0.0);
        assert_eq!(stats.coverage_ratio(), 0.0);
        assert_eq!(stats.mean_candidates(), 0.0);
    }

    #[test]
    fn test_merge() {
        let article = sample_article();
        let mut left = DatasetStats::from_articles([&article]);
        let right = DatasetStats::from_articles([&article]);
        left.merge(&right);

        assert_eq!(left.articles, 2);
        assert_eq!(left.mentions, 4);
        assert_eq!(left.recognized_by.get("ner"), Some(&4));
        assert_eq!(left, DatasetStats::from_articles([&article, &article]));
    }
}
