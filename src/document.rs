// src/document.rs
use crate::error::{Result, RoundtripError};

use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const SAMPLE_TEXT: &str = "<div><p>Lorem ipsum dolor sit amet, consectetur adipiscing elit. Duis tristique eros quam, et \
porttitor dui fringilla eu. Aenean eget dapibus magna. Vestibulum ante ipsum primis in faucibus \
orci luctus et ultrices posuere cubilia curae; Pellentesque ornare vulputate blandit. \
Pellentesque habitant morbi tristique senectus et netus et malesuada fames ac turpis egestas. \
Vestibulum in quam finibus, suscipit felis a, imperdiet risus. Proin quis tellus vel nisl \
vehicula rhoncus ac at tortor. Donec imperdiet vestibulum dolor, vitae porta velit mattis quis. \
Mauris libero augue, placerat et diam pharetra, ornare auctor lectus.</p><p>Praesent metus \
turpis, dignissim eget sollicitudin non, ullamcorper in nunc. Nunc et aliquet mi. Cras \
convallis pulvinar suscipit. Praesent tristique, massa vel fringilla consectetur, mauris massa \
pellentesque nibh, ac maximus sem velit convallis felis. Nunc nisl ligula, faucibus et nunc in, \
porttitor rutrum sem. Proin condimentum lacus sed posuere imperdiet. Duis tempus ut libero id \
pulvinar.</p><p>Praesent lorem dolor, ornare a sollicitudin at, porttitor at lacus. Ut \
ultricies orci a odio ullamcorper egestas sed nec ex. Proin venenatis semper eleifend. Nullam \
congue mi ante, eleifend porta ante consequat et. Etiam felis diam, interdum id malesuada \
congue, porta ut felis. Integer porttitor at urna vel gravida. Praesent lobortis egestas \
vehicula. Donec sit amet pulvinar elit, eget tempor nisi. In hac habitasse platea dictumst. In \
auctor hendrerit vulputate. Aenean eu ornare quam, ut semper massa. Sed ac cursus augue. Sed \
pulvinar ante a mi sagittis, non finibus eros tempus. Maecenas condimentum lorem a orci maximus \
porttitor. Aenean congue luctus metus, a vulputate enim ornare id. Donec malesuada tincidunt \
blandit.</p><p>Sed et enim sit amet nulla lobortis aliquam eu sed elit. In ac enim at odio \
accumsan aliquam sed sodales massa. Aliquam bibendum et ipsum eleifend molestie. Nullam viverra \
gravida orci. In nec nisl in lorem bibendum pulvinar. Nulla viverra ac mi id pharetra. Etiam \
tortor odio, bibendum a efficitur et, rutrum et tortor. Nunc condimentum elementum risus eget \
luctus. Mauris blandit nec arcu ac dignissim. Vestibulum blandit ligula quis dolor vulputate \
condimentum. Curabitur lacinia odio sed commodo scelerisque. Mauris a ex \
velit.</p><p>Pellentesque quis leo quis lectus ultrices aliquam vitae quis augue. Mauris semper \
convallis tellus, at iaculis enim rhoncus eget. Ut elementum ante a justo vestibulum malesuada. \
Nulla magna arcu, aliquet at semper at, lobortis in mi. Proin pharetra leo ac nunc elementum, a \
congue est pharetra. Donec eget velit sed magna faucibus viverra at vel lacus. Nunc nulla \
risus, tincidunt vitae facilisis ut, molestie quis felis. Cras pharetra tellus dui, sed finibus \
eros rhoncus non. Quisque dapibus porttitor lectus, id hendrerit velit. In erat leo, faucibus \
ut varius a, semper sed risus. Phasellus tristique iaculis luctus. Donec quis lacus vel leo \
lacinia eleifend sodales et nisi. Sed a semper libero.</p></div>";

/// The record inserted when no document file is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub label: String,
    pub slug: String,
    pub description: String,
    pub text: String,
    pub tags: Vec<String>,
}

impl Article {
    pub fn sample() -> Self {
        Self {
            label: "Article A".to_string(),
            slug: "article-a".to_string(),
            description: "The first article".to_string(),
            text: SAMPLE_TEXT.to_string(),
            tags: vec!["text".to_string(), "article".to_string(), "node".to_string()],
        }
    }

    pub fn to_document(&self) -> Result<Document> {
        Ok(bson::to_document(self)?)
    }
}

/// Loads a single document from a YAML or JSON file. The top level must be a mapping.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Document> {
    let text = fs::read_to_string(path.as_ref())?;
    let value: serde_json::Value = serde_yaml::from_str(&text)?;
    object_to_document(value, &format!("{}", path.as_ref().display()))
}

/// Parses a JSON filter. Blank input means "match everything".
pub fn parse_filter(text: &str) -> Result<Document> {
    if text.trim().is_empty() {
        return Ok(Document::new());
    }
    let value: serde_json::Value = serde_json::from_str(text)?;
    object_to_document(value, "filter")
}

fn object_to_document(value: serde_json::Value, origin: &str) -> Result<Document> {
    if !value.is_object() {
        return Err(RoundtripError::InvalidDocument(format!(
            "{} must be a mapping, got {}",
            origin,
            json_kind(&value)
        )));
    }
    match bson::to_bson(&value)? {
        Bson::Document(doc) => Ok(doc),
        other => Err(RoundtripError::InvalidDocument(format!(
            "{} converted to {:?} instead of a document",
            origin,
            other.element_type()
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a sequence",
        serde_json::Value::Object(_) => "a mapping",
    }
}

/// True when every field of `expected` except `_id` is present and equal in `found`.
pub fn fields_match(expected: &Document, found: &Document) -> bool {
    expected
        .iter()
        .filter(|(key, _)| key.as_str() != "_id")
        .all(|(key, value)| found.get(key) == Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId};
    use std::io::Write;

    #[test]
    fn sample_article_has_no_id_and_ordered_tags() {
        let doc = Article::sample().to_document().unwrap();
        assert!(!doc.contains_key("_id"));
        assert_eq!(doc.get_str("label").unwrap(), "Article A");
        assert_eq!(doc.get_str("slug").unwrap(), "article-a");
        assert_eq!(doc.get_str("description").unwrap(), "The first article");
        assert!(doc.get_str("text").unwrap().starts_with("<div><p>Lorem ipsum"));
        let tags: Vec<&str> = doc
            .get_array("tags")
            .unwrap()
            .iter()
            .filter_map(Bson::as_str)
            .collect();
        assert_eq!(tags, ["text", "article", "node"]);
    }

    #[test]
    fn sample_text_keeps_all_five_paragraphs() {
        let text = Article::sample().text;
        assert_eq!(text.matches("<p>").count(), 5);
        assert_eq!(text.matches("</p>").count(), 5);
        assert!(text.contains("<p>Sed et enim sit amet nulla"));
        assert!(text.contains("<p>Pellentesque quis leo quis lectus"));
        assert!(text.ends_with("Sed a semper libero.</p></div>"));
        assert_eq!(text.len(), 3020);
    }

    #[test]
    fn loads_yaml_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "label: Article B\nslug: article-b\ntags:\n  - rust\n  - mongo").unwrap();

        let doc = load_document(file.path()).unwrap();
        assert_eq!(doc.get_str("label").unwrap(), "Article B");
        assert_eq!(doc.get_array("tags").unwrap().len(), 2);
    }

    #[test]
    fn loads_json_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"label": "Article C", "tags": []}}"#).unwrap();

        let doc = load_document(file.path()).unwrap();
        assert_eq!(doc, doc! { "label": "Article C", "tags": [] });
    }

    #[test]
    fn rejects_non_mapping_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "- just\n- a list").unwrap();

        let err = load_document(file.path()).unwrap_err();
        assert!(matches!(err, RoundtripError::InvalidDocument(_)));
        assert!(err.to_string().contains("a sequence"));
    }

    #[test]
    fn missing_document_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_document(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, RoundtripError::Io(_)));
    }

    #[test]
    fn blank_filter_matches_everything() {
        assert!(parse_filter("").unwrap().is_empty());
        assert!(parse_filter("  {}  ").unwrap().is_empty());
    }

    #[test]
    fn filter_keeps_operators() {
        let filter = parse_filter(r#"{"tags": {"$in": ["node"]}}"#).unwrap();
        assert_eq!(filter, doc! { "tags": { "$in": ["node"] } });
    }

    #[test]
    fn filter_must_be_object() {
        assert!(matches!(
            parse_filter("[1, 2]").unwrap_err(),
            RoundtripError::InvalidDocument(_)
        ));
        assert!(matches!(parse_filter("{").unwrap_err(), RoundtripError::Json(_)));
    }

    #[test]
    fn fields_match_ignores_storage_id() {
        let inserted = Article::sample().to_document().unwrap();
        let mut found = inserted.clone();
        found.insert("_id", ObjectId::new());
        assert!(fields_match(&inserted, &found));

        found.insert("slug", "article-z");
        assert!(!fields_match(&inserted, &found));

        found.remove("slug");
        assert!(!fields_match(&inserted, &found));
    }
}
