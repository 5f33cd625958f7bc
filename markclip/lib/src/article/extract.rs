//! Building an [`Article`] from a whole HTML document.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};
use url::Url;

use super::{Article, MathInfo};
use crate::dom::{Element, Node};
use crate::render::PRESERVED_BREAK;

static HIGHLIGHT_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"highlight-(?:text|source)-([a-z0-9]+)").expect("valid highlight class regex")
});

static LANGUAGE_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"language-([a-z0-9]+)").expect("valid language class regex"));

/// Metadata aliases filled from well-known `<meta>` tags.
const META_ALIASES: &[(&str, &[&str])] = &[
    ("excerpt", &["description", "og:description", "twitter:description"]),
    ("byline", &["author", "article:author"]),
    ("siteName", &["og:site_name"]),
];

impl Article {
    /// Extracts an article from a full HTML page.
    ///
    /// The content is the document's `<body>`. Page title, URL parts,
    /// keywords and every `<meta>` tag become template metadata. Math
    /// sources and code-language hints are tagged with ids the renderer
    /// understands.
    #[instrument(name = "extract_article", skip(html), fields(bytes = html.len()))]
    pub fn from_html(html: &str, base_uri: &str) -> Self {
        let mut root = Element::parse_document(html);

        let head = root.child_elements().find(|el| el.name == "head").cloned();
        let base_uri = head
            .as_ref()
            .and_then(|head| head.find(&|el: &Element| el.name == "base" && el.attr("href").is_some()))
            .and_then(|base| base.attr("href"))
            .map_or_else(|| base_uri.to_string(), |href| join_base(base_uri, href));

        let mut article = Article::new(String::new(), base_uri);

        let page_title = head
            .as_ref()
            .and_then(|head| head.find(&|el: &Element| el.name == "title"))
            .map(|title| title.text_content().split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        article.title = page_title.clone();
        article.insert_metadata("pageTitle", page_title);
        insert_url_parts(&mut article);

        if let Some(head) = &head {
            harvest_meta(head, &mut article);
        }

        let Some(body) = root.child_elements_mut().find(|el| el.name == "body") else {
            return article;
        };
        tag_math(body, &mut article);
        tag_code_languages(body);
        article.content = body.inner_html();

        debug!(
            title = %article.title,
            metadata = article.metadata.len(),
            math = article.math.len(),
            "extracted article"
        );
        article
    }
}

/// Resolves a `<base href>` against the page URL.
fn join_base(page: &str, href: &str) -> String {
    match Url::parse(page).and_then(|page| page.join(href)) {
        Ok(url) => url.to_string(),
        Err(_) => href.to_string(),
    }
}

/// `hash`, `host`, `origin`, `hostname`, `pathname`, `port`, `protocol` and
/// `search` of the base URI, formatted the way a browser's `Location` does.
fn insert_url_parts(article: &mut Article) {
    let Ok(url) = Url::parse(&article.base_uri) else {
        return;
    };
    let hostname = url.host_str().unwrap_or_default().to_string();
    let port = url.port().map(|port| port.to_string()).unwrap_or_default();
    let host = if port.is_empty() {
        hostname.clone()
    } else {
        format!("{hostname}:{port}")
    };
    let parts = [
        ("hash", url.fragment().filter(|f| !f.is_empty()).map(|f| format!("#{f}"))),
        ("host", Some(host)),
        ("origin", Some(url.origin().ascii_serialization())),
        ("hostname", Some(hostname)),
        ("pathname", Some(url.path().to_string())),
        ("port", Some(port)),
        ("protocol", Some(format!("{}:", url.scheme()))),
        ("search", url.query().filter(|q| !q.is_empty()).map(|q| format!("?{q}"))),
    ];
    for (key, value) in parts {
        article.insert_metadata(key, value.unwrap_or_default());
    }
}

fn harvest_meta(head: &Element, article: &mut Article) {
    let mut metas: Vec<(String, String)> = Vec::new();
    head.walk(&mut |el| {
        if el.name != "meta" {
            return;
        }
        let key = el
            .attr("name")
            .filter(|name| !name.is_empty())
            .or_else(|| el.attr("property"));
        if let (Some(key), Some(content)) = (key, el.attr("content"))
            && !key.is_empty()
            && !content.is_empty()
        {
            metas.push((key.to_string(), content.to_string()));
        }
    });

    if let Some((_, keywords)) = metas.iter().find(|(key, _)| key == "keywords") {
        article.keywords = Some(keywords.split(',').map(|k| k.trim().to_string()).collect());
    }

    for (alias, sources) in META_ALIASES {
        let value = sources
            .iter()
            .find_map(|source| metas.iter().find(|(key, _)| key == source));
        if let Some((_, value)) = value {
            article.insert_metadata(*alias, value.clone());
        }
    }

    for (key, value) in metas {
        article.insert_metadata(key, value);
    }
}

/// Records MathJax and KaTeX sources in [`Article::math`] under fresh ids.
fn tag_math(body: &mut Element, article: &mut Article) {
    let mut found: Vec<MathInfo> = Vec::new();
    body.walk_mut(&mut |el| {
        let info = if el.name == "script"
            && el.id().is_some_and(|id| id.starts_with("MathJax-Element-"))
        {
            let inline = el
                .attr("type")
                .is_some_and(|kind| !kind.contains("mode=display"));
            Some(MathInfo {
                tex: el.text_content(),
                inline,
            })
        } else if el.has_class("katex-mathml") {
            el.find(&|d: &Element| d.name == "annotation").map(|annotation| MathInfo {
                tex: annotation.text_content(),
                inline: true,
            })
        } else {
            None
        };

        if let Some(info) = info {
            el.set_attr("id", format!("math-{}", found.len()));
            found.push(info);
        }
    });

    for (index, info) in found.into_iter().enumerate() {
        article.math.insert(format!("math-{index}"), info);
    }
}

/// Marks code blocks with `code-lang-<lang>` ids and preserves `<br>` in `<pre>`.
fn tag_code_languages(body: &mut Element) {
    body.walk_mut(&mut |el| {
        let class = el.attr("class").unwrap_or_default();
        let Some(language) = HIGHLIGHT_CLASS
            .captures(class)
            .and_then(|caps| caps.get(1))
            .map(|lang| lang.as_str().to_string())
        else {
            return;
        };
        if let Some(Node::Element(pre)) = el.children.first_mut()
            && pre.name == "pre"
        {
            pre.set_attr("id", format!("code-lang-{language}"));
        }
    });

    body.walk_mut(&mut |el| {
        let language = el
            .attr("class")
            .and_then(|class| LANGUAGE_CLASS.captures(class))
            .and_then(|caps| caps.get(1))
            .map(|lang| lang.as_str().to_string());
        if let Some(language) = language {
            el.set_attr("id", format!("code-lang-{language}"));
        }
    });

    body.walk_mut(&mut |el| {
        if el.name == "pre" {
            el.walk_mut(&mut |inner| {
                if inner.name == "br" {
                    inner.name = PRESERVED_BREAK.to_string();
                }
            });
        }
    });

    body.walk_mut(&mut |el| {
        if !el.has_class("codehilite") {
            return;
        }
        for pre in el.child_elements_mut().filter(|child| child.name == "pre") {
            let plain = !pre.first_child_is("code")
                && !pre.attr("class").is_some_and(|class| class.contains("language"));
            if plain {
                pre.set_attr("id", "code-lang-text");
            }
        }
    });
}
