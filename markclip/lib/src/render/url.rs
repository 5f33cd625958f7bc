use url::Url;

/// Makes `href` absolute against `base_uri`.
///
/// Absolute URLs come back unchanged. Root-relative paths are joined to the
/// base's origin, protocol-relative ones take the base's scheme, and
/// anything else is appended to the base URL (adding a `/` when the base
/// does not end in one). An unparseable base leaves `href` as it is.
///
/// ## Examples
///
/// ```
/// use markclip_lib::render::resolve_url;
///
/// assert_eq!(resolve_url("/x", "https://ex.com/a/"), "https://ex.com/x");
/// assert_eq!(resolve_url("pic.png", "https://ex.com/a/"), "https://ex.com/a/pic.png");
/// assert_eq!(resolve_url("https://other.org/", "https://ex.com/"), "https://other.org/");
/// ```
pub fn resolve_url(href: &str, base_uri: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    let Ok(base) = Url::parse(base_uri) else {
        return href.to_string();
    };

    if href.starts_with("//") {
        format!("{}:{href}", base.scheme())
    } else if href.starts_with('/') {
        format!("{}{href}", base.origin().ascii_serialization())
    } else {
        let base = base.as_str();
        let separator = if base.ends_with('/') { "" } else { "/" };
        format!("{base}{separator}{href}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls_are_untouched() {
        assert_eq!(resolve_url("https://a.org/x?y=1", "https://ex.com/"), "https://a.org/x?y=1");
        assert_eq!(
            resolve_url("data:image/png;base64,AAAA", "https://ex.com/"),
            "data:image/png;base64,AAAA"
        );
        assert_eq!(resolve_url("mailto:me@ex.com", "https://ex.com/"), "mailto:me@ex.com");
    }

    #[test]
    fn root_relative_uses_the_origin() {
        assert_eq!(resolve_url("/img/a.png", "https://ex.com:8443/deep/page"), "https://ex.com:8443/img/a.png");
    }

    #[test]
    fn relative_is_appended_to_the_base() {
        assert_eq!(resolve_url("pic.png", "https://ex.com/a/"), "https://ex.com/a/pic.png");
        assert_eq!(resolve_url("pic.png", "https://ex.com/a"), "https://ex.com/a/pic.png");
        assert_eq!(resolve_url("pic.png", "https://ex.com"), "https://ex.com/pic.png");
    }

    #[test]
    fn protocol_relative_takes_the_base_scheme() {
        assert_eq!(resolve_url("//cdn.ex.com/a.png", "https://ex.com/"), "https://cdn.ex.com/a.png");
    }

    #[test]
    fn unparseable_base_leaves_href_alone() {
        assert_eq!(resolve_url("pic.png", "not a url"), "pic.png");
        assert_eq!(resolve_url("/x", ""), "/x");
    }
}
