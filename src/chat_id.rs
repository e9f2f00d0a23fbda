//! Chat-ID normalization
//!
//! Telegram targets come in several spellings: `@username` references,
//! bare numeric ids, and channel/supergroup ids carrying the `-100`
//! prefix. The rest of the app only ever sees the canonical form
//! produced here.

/// Normalize a chat target to its canonical form.
///
/// - `@username` references pass through unchanged.
/// - Purely numeric input gets the `-100` channel prefix (an existing
///   prefix is stripped first, so the result never doubles up).
/// - Input already starting with `-100` passes through unchanged.
/// - Input starting with `-` but not `-100` gets `100` inserted after
///   the sign.
/// - Anything else, including the empty string, passes through.
pub fn normalize_chat_id(input: &str) -> String {
    if input.starts_with('@') {
        return input.to_string();
    }

    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        return format!("-100{}", input.strip_prefix("-100").unwrap_or(input));
    }

    if input.starts_with("-100") {
        return input.to_string();
    }

    if let Some(rest) = input.strip_prefix('-') {
        return format!("-100{}", rest);
    }

    input.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_unchanged() {
        assert_eq!(normalize_chat_id("@mychannel"), "@mychannel");
    }

    #[test]
    fn test_numeric_gets_prefix() {
        assert_eq!(normalize_chat_id("123456"), "-100123456");
    }

    #[test]
    fn test_canonical_unchanged() {
        assert_eq!(normalize_chat_id("-100123456"), "-100123456");
    }

    #[test]
    fn test_negative_gets_100_inserted() {
        assert_eq!(normalize_chat_id("-123456"), "-100123456");
    }

    #[test]
    fn test_empty_unchanged() {
        assert_eq!(normalize_chat_id(""), "");
    }

    #[test]
    fn test_other_text_unchanged() {
        assert_eq!(normalize_chat_id("not a chat id"), "not a chat id");
    }

    #[test]
    fn test_idempotent_on_canonical_forms() {
        for input in ["@mychannel", "123456", "-100123456", "-123456", ""] {
            let once = normalize_chat_id(input);
            assert_eq!(normalize_chat_id(&once), once, "input: {input:?}");
        }
    }
}
