//! Handle detection in post text.

/// Handle of the reposted account when the text is a classic `RT @handle:`.
///
/// The colon is required; `RT @handle` without it yields `None`.
pub fn retweet_handle(text: &str) -> Option<String> {
    if !text.starts_with("RT @") {
        return None;
    }
    let token = text.split_whitespace().nth(1)?;
    let handle = token.strip_prefix('@')?.strip_suffix(':')?;
    Some(handle.to_string())
}

/// Reply target taken from a leading `@handle` token, with every `@` removed.
pub fn leading_mention(text: &str) -> Option<String> {
    if !text.starts_with('@') {
        return None;
    }
    text.split_whitespace()
        .next()
        .map(|token| token.replace('@', ""))
}
