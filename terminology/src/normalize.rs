/// Normalize a term, alias or lookup string into an index key.
///
/// Lowercases, turns every character that is neither alphanumeric nor
/// whitespace into a space, collapses whitespace runs and trims.
/// `"Congestive  Heart-Failure."` becomes `"congestive heart failure"`.
pub fn normalize(s: &str) -> String {
    let mut key = String::with_capacity(s.len());
    let mut pending_space = false;
    for c in s.chars() {
        if c.is_alphanumeric() {
            if pending_space && !key.is_empty() {
                key.push(' ');
            }
            pending_space = false;
            key.extend(c.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    key
}

/// Word characters for boundary checks: letters, digits and underscore.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Lowercase and collapse whitespace, keeping punctuation.
/// Distinct folded surfaces get distinct matchers.
pub(crate) fn fold_surface(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
