//! Case transforms for `{key:kebab}`, `{key:snake}`, `{key:camel}` and
//! `{key:pascal}` placeholders.

/// `Hello World` → `hello-world`
pub fn kebab(value: &str) -> String {
    value.replace(' ', "-").to_lowercase()
}

/// `Hello World` → `hello_world`
pub fn snake(value: &str) -> String {
    value.replace(' ', "_").to_lowercase()
}

/// `Hello World` → `helloWorld`
pub fn camel(value: &str) -> String {
    with_first(&join_words(value), |c| c.to_lowercase().collect())
}

/// `Hello World` → `HelloWorld`
pub fn pascal(value: &str) -> String {
    with_first(&join_words(value), |c| c.to_uppercase().collect())
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Drops each space together with upper-casing the character after it.
///
/// A space followed by whitespace drops both.
fn join_words(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(&next) if c == ' ' && !is_line_terminator(next) => {
                chars.next();
                if !next.is_whitespace() {
                    out.extend(next.to_uppercase());
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn with_first(value: &str, map: impl Fn(char) -> String) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if !is_line_terminator(first) => map(first) + chars.as_str(),
        _ => value.to_string(),
    }
}
