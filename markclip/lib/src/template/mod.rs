//! `{placeholder}` expansion for titles, folders, image prefixes and
//! front/back-matter.
//!
//! Expansion runs in a fixed order:
//!
//! 1. every template key of the [`Article`] (`{key}`, `{key:kebab}`,
//!    `{key:snake}`, `{key:camel}`, `{key:pascal}`);
//! 2. `{date:FORMAT}` with the current local time (see [`format_date`]);
//! 3. `{keywords}` / `{keywords:SEP}`;
//! 4. any `{...}` still left is deleted.
//!
//! Expansion never fails: unknown or malformed placeholders become empty text.

mod case;
mod date;

use std::borrow::Cow;
use std::fmt::Display;
use std::sync::LazyLock;

use chrono::{DateTime, Local, TimeZone};
use regex::{Captures, Regex};

use crate::article::Article;
use crate::sanitize::sanitize_filename;

pub use case::{camel, kebab, pascal, snake};
pub use date::format_date;

static DATE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{date:(.+?)\}").expect("valid date placeholder regex"));

static KEYWORDS_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{keywords(?::([^}]*))?\}").expect("valid keywords placeholder regex")
});

static LEFTOVER_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{.*?\}").expect("valid placeholder regex"));

/// Expands `template` against `article` using the current local time.
///
/// With a non-empty `disallowed`, every non-empty value is passed through
/// [`sanitize_filename`] before substitution.
///
/// ## Examples
///
/// ```
/// use markclip_lib::{Article, template};
///
/// let article = Article::new("", "https://ex.com/").with_title("Hello World");
/// assert_eq!(template::expand("{title:kebab}.md", &article, None), "hello-world.md");
/// assert_eq!(template::expand("{nope}x", &article, None), "x");
/// ```
pub fn expand(template: &str, article: &Article, disallowed: Option<&str>) -> String {
    expand_at(template, article, disallowed, &Local::now())
}

/// [`expand`] with an explicit timestamp for `{date:...}`.
pub fn expand_at<Tz>(
    template: &str,
    article: &Article,
    disallowed: Option<&str>,
    now: &DateTime<Tz>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let disallowed = disallowed.filter(|chars| !chars.is_empty());
    let mut out = template.to_string();

    for (key, value) in article.template_values() {
        if !out.contains(&format!("{{{key}")) {
            continue;
        }
        let value = match disallowed {
            Some(chars) if !value.is_empty() => sanitize_filename(&value, Some(chars)),
            _ => value,
        };
        out = substitute_key(&out, key, &value);
    }

    out = DATE_PLACEHOLDER
        .replace_all(&out, |caps: &Captures<'_>| format_date(&caps[1], now))
        .into_owned();

    let keywords = article.keywords.as_deref().unwrap_or_default();
    out = KEYWORDS_PLACEHOLDER
        .replace_all(&out, |caps: &Captures<'_>| {
            let separator = caps
                .get(1)
                .map(|sep| unescape_separator(sep.as_str()))
                .unwrap_or(Cow::Borrowed(","));
            keywords.join(&*separator)
        })
        .into_owned();

    LEFTOVER_PLACEHOLDER.replace_all(&out, "").into_owned()
}

fn substitute_key(template: &str, key: &str, value: &str) -> String {
    let mut out = template.replace(&format!("{{{key}}}"), value);
    if !out.contains(&format!("{{{key}:")) {
        return out;
    }
    let variants: [(&str, fn(&str) -> String); 4] = [
        ("kebab", kebab),
        ("snake", snake),
        ("camel", camel),
        ("pascal", pascal),
    ];
    for (name, transform) in variants {
        let placeholder = format!("{{{key}:{name}}}");
        if out.contains(&placeholder) {
            out = out.replace(&placeholder, &transform(value));
        }
    }
    out
}

/// Resolves backslash escapes in a keyword separator.
///
/// Understands the JSON string escapes (`\n`, `\t`, `\r`, `\b`, `\f`, `\/`,
/// `\\`, `\"`, `\uXXXX`). A separator with any other escape is used as-is.
fn unescape_separator(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let unescaped = match chars.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('/') => '/',
            Some('\\') => '\\',
            Some('"') => '"',
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(c) if hex.len() == 4 => c,
                    _ => return Cow::Borrowed(raw),
                }
            }
            _ => return Cow::Borrowed(raw),
        };
        out.push(unescaped);
    }
    Cow::Owned(out)
}
