//! File-based dataset tests: write, read back, summarize.

use elink_core::{Article, EntityMention, Span};
use elink_dataset::{ArticleReader, ArticleWriter, DatasetError, DatasetStats};
use std::io::Write;

fn articles() -> Vec<Article> {
    vec![
        Article::new(1, "Berlin", "Berlin is the capital of Germany.")
            .with_url("https://en.wikipedia.org/wiki/Berlin")
            .with_title_synonyms(vec![Span::new(0, 6)])
            .with_hyperlinks(vec![(Span::new(25, 32), "Germany".to_string())])
            .with_entity_mentions(vec![
                EntityMention::new((0, 6))
                    .with_recognized_by("ner")
                    .with_candidates(["Q64", "Q821244"])
                    .with_link("Q64", "prior"),
                EntityMention::new((25, 32))
                    .with_recognized_by("hyperlink")
                    .with_link("Q183", "hyperlink"),
            ])
            .unwrap(),
        Article::new(2, "Empty", "Nothing to see here.")
            .with_sections(vec![(Span::new(0, 20), "Lead".to_string())]),
    ]
}

#[test]
fn evaluation_format_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("articles.jsonl");

    let mut writer = ArticleWriter::create(&path, true).unwrap();
    for article in &articles() {
        writer.write(article).unwrap();
    }
    writer.flush().unwrap();

    let restored: Vec<Article> = ArticleReader::open(&path)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(restored, articles());
}

#[test]
fn gold_format_drops_provenance() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gold.jsonl");

    let mut writer = ArticleWriter::create(&path, false).unwrap();
    for article in &articles() {
        writer.write(article).unwrap();
    }
    writer.flush().unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(!contents.contains("recognized_by"));
    assert!(!contents.contains("candidates"));

    let restored: Vec<Article> = ArticleReader::open(&path)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let berlin = restored[0].mention((0, 6)).unwrap();
    assert_eq!(berlin.entity_id.as_deref(), Some("Q64"));
    assert!(berlin.candidates.is_empty());
    assert!(berlin.linked_by.is_none());
}

#[test]
fn stats_over_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("articles.jsonl");
    let mut writer = ArticleWriter::create(&path, true).unwrap();
    for article in &articles() {
        writer.write(article).unwrap();
    }
    writer.flush().unwrap();

    let mut stats = DatasetStats::default();
    for article in ArticleReader::open(&path).unwrap() {
        stats.add_article(&article.unwrap());
    }

    assert_eq!(stats.articles, 2);
    assert_eq!(stats.mentions, 2);
    assert_eq!(stats.linked_mentions, 2);
    assert_eq!(stats.linked_by.get("hyperlink"), Some(&1));
    assert_eq!(stats.covered_characters, 13);
}

#[test]
fn malformed_line_is_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"id": 1, "title": "a", "text": "abc"}}"#).unwrap();
    writeln!(file, r#"{{"id": 2, "title": "b", "text": "ab", "entity_mentions": [{{"span": [0, 9]}}]}}"#)
        .unwrap();
    file.flush().unwrap();

    let results: Vec<_> = ArticleReader::open(file.path()).unwrap().collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(DatasetError::Line { line: 2, .. })));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ArticleReader::open(dir.path().join("missing.jsonl"));
    assert!(matches!(result, Err(DatasetError::Io(_))));
}
