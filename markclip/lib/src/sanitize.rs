//! File-name sanitizing.
//!
//! Generated names (clip titles, image file names, folder templates) pass
//! through [`sanitize_filename`] before they touch a path.

/// Characters never allowed in a generated file name.
const ILLEGAL: &[char] = &['/', '?', '<', '>', '\\', ':', '*', '|', '"'];

/// Strips characters that are illegal in file names.
///
/// Removes `< > : " / \ | ? *`, turns non-breaking spaces into regular
/// spaces and removes every character of `extra_disallowed`. Each extra
/// character is matched literally, so `.` removes dots and nothing else.
///
/// Empty input comes back unchanged. The result may itself be empty.
///
/// ## Examples
///
/// ```
/// use markclip_lib::sanitize_filename;
///
/// assert_eq!(sanitize_filename("a/b:c?.md", None), "abc.md");
/// assert_eq!(sanitize_filename("[draft] #1", Some("[]#^")), "draft 1");
/// ```
pub fn sanitize_filename(name: &str, extra_disallowed: Option<&str>) -> String {
    if name.is_empty() {
        return String::new();
    }

    let extra = extra_disallowed.unwrap_or("");
    name.chars()
        .filter(|c| !ILLEGAL.contains(c))
        .map(|c| if c == '\u{a0}' { ' ' } else { c })
        .filter(|c| !extra.contains(*c))
        .collect()
}

/// Sanitizes each `/`-separated segment of `path` on its own.
///
/// Separators survive; everything between them is cleaned with
/// [`sanitize_filename`].
pub fn sanitize_path(path: &str, extra_disallowed: Option<&str>) -> String {
    path.split('/')
        .map(|segment| sanitize_filename(segment, extra_disallowed))
        .collect::<Vec<_>>()
        .join("/")
}
