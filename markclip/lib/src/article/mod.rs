//! The unit of conversion: rendered-page content plus its metadata.

mod extract;

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Keys with a dedicated field; metadata never shadows them.
const RESERVED_KEYS: &[&str] = &["content", "title", "baseURI", "keywords", "math"];

/// A math expression found in the page, keyed by element id in [`Article::math`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathInfo {
    /// TeX source.
    pub tex: String,
    /// Rendered as `$..$` when true, `$$..$$` otherwise.
    pub inline: bool,
}

/// A readable article ready for conversion.
///
/// Every field except `content` (and `math`) is available to templates:
/// `{title}`, `{baseURI}`, `{keywords}` and any metadata key such as
/// `{pageTitle}`, `{byline}` or `{og:title}`.
///
/// ## Examples
///
/// ```
/// use markclip_lib::Article;
///
/// let article = Article::new("<p>Hello</p>", "https://example.com/post")
///     .with_title("Hello World")
///     .with_keywords(["rust", "markdown"])
///     .with_metadata("byline", "Ada");
///
/// assert_eq!(article.metadata["byline"], "Ada");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// HTML fragment to render.
    pub content: String,
    /// Absolute URL relative links and images resolve against.
    pub base_uri: String,
    pub title: String,
    pub keywords: Option<Vec<String>>,
    /// Element id → math expression.
    pub math: HashMap<String, MathInfo>,
    /// Extra template values in insertion order.
    pub metadata: IndexMap<String, String>,
}

impl Article {
    pub fn new(content: impl Into<String>, base_uri: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            base_uri: base_uri.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = Some(keywords.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_metadata(key, value);
        self
    }

    pub fn with_math(mut self, id: impl Into<String>, tex: impl Into<String>, inline: bool) -> Self {
        self.math.insert(
            id.into(),
            MathInfo {
                tex: tex.into(),
                inline,
            },
        );
        self
    }

    /// Replaces the content with a caller-chosen selection.
    pub fn with_selection(mut self, selection: impl Into<String>) -> Self {
        self.content = selection.into();
        self
    }

    /// Adds a metadata value unless the key is reserved or already present.
    ///
    /// Returns whether the value was stored.
    pub fn insert_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if RESERVED_KEYS.contains(&key.as_str()) || self.metadata.contains_key(&key) {
            return false;
        }
        self.metadata.insert(key, value.into());
        true
    }

    /// Template keys and their values in substitution order:
    /// `title`, `baseURI`, every metadata key, then `keywords`.
    pub fn template_values(&self) -> Vec<(&str, String)> {
        let mut values = Vec::with_capacity(self.metadata.len() + 3);
        values.push(("title", self.title.clone()));
        values.push(("baseURI", self.base_uri.clone()));
        for (key, value) in &self.metadata {
            values.push((key.as_str(), value.clone()));
        }
        values.push((
            "keywords",
            self.keywords
                .as_ref()
                .map(|keywords| keywords.join(","))
                .unwrap_or_default(),
        ));
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_values_follow_insertion_order() {
        let article = Article::new("<p/>", "https://ex.com/")
            .with_title("T")
            .with_metadata("zeta", "z")
            .with_metadata("alpha", "a")
            .with_keywords(["k1", "k2"]);

        let keys: Vec<_> = article.template_values().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["title", "baseURI", "zeta", "alpha", "keywords"]);
        assert_eq!(article.template_values()[4].1, "k1,k2");
    }

    #[test]
    fn content_is_never_a_template_value() {
        let article = Article::new("<p>secret</p>", "").with_metadata("content", "x");
        assert!(article.template_values().iter().all(|(k, _)| *k != "content"));
        assert!(article.metadata.is_empty());
    }

    #[test]
    fn first_metadata_value_wins() {
        let mut article = Article::default();
        assert!(article.insert_metadata("author", "first"));
        assert!(!article.insert_metadata("author", "second"));
        assert_eq!(article.metadata["author"], "first");
    }

    #[test]
    fn selection_replaces_content_only() {
        let article = Article::new("<p>all</p>", "https://ex.com/")
            .with_title("T")
            .with_selection("<p>part</p>");
        assert_eq!(article.content, "<p>part</p>");
        assert_eq!(article.title, "T");
    }
}
