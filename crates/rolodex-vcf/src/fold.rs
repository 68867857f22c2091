//! vCard line folding.

/// Maximum characters per physical line, counting the continuation space.
const MAX_LINE_CHARS: usize = 75;

/// Folds a property line to the 75-character limit.
///
/// The first physical line keeps 75 characters; every continuation line
/// holds a single leading space plus up to 74 more. Folding counts
/// characters rather than octets, so multi-byte text folds late rather
/// than mid-character.
#[must_use]
pub fn fold_line(line: &str) -> String {
    if line.chars().count() <= MAX_LINE_CHARS {
        return line.to_string();
    }

    let mut result = String::with_capacity(line.len() + line.len() / MAX_LINE_CHARS * 2);
    let mut current = 0;

    for c in line.chars() {
        if current == MAX_LINE_CHARS {
            result.push_str("\n ");
            current = 1;
        }
        result.push(c);
        current += 1;
    }

    result
}
