//! vCard text escaping.

/// Escapes a text value for use in a vCard property.
///
/// Backslash, comma, semicolon, colon, and line breaks gain a backslash
/// prefix. Escaping the colon goes beyond RFC 2426, which only requires
/// comma, semicolon, and backslash, but [`unescape_text`] reverses it, so
/// round trips stay lossless.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            ',' => result.push_str("\\,"),
            ';' => result.push_str("\\;"),
            ':' => result.push_str("\\:"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            _ => result.push(c),
        }
    }

    result
}

/// Reverses [`escape_text`].
///
/// Also accepts `\t` for tab, which other producers emit. Unknown escape
/// sequences and a trailing lone backslash pass through unchanged.
#[must_use]
pub fn unescape_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some(',') => result.push(','),
            Some(';') => result.push(';'),
            Some(':') => result.push(':'),
            Some('\\') => result.push('\\'),
            Some(other) => {
                result.push(c);
                result.push(other);
            }
            None => result.push(c),
        }
    }

    result
}
