//! Topic tags written inline as `[Tag] question`.

/// Separator replacing whitespace inside multi-word tags.
pub const TAG_WORD_SEPARATOR: &str = "-";

/// Split a leading `[tag]` off user input.
///
/// Returns `(tag, question)`. Whitespace inside the brackets collapses to
/// `-`, so `[Multi Word Tag] q` gives `("Multi-Word-Tag", "q")`. Input
/// without a leading tag, or with an unterminated one, comes back whole
/// (trimmed) with an empty tag.
pub fn parse_tagged_input(input: &str) -> (String, String) {
    let trimmed = input.trim();

    let Some(rest) = trimmed.strip_prefix('[') else {
        return (String::new(), trimmed.to_string());
    };
    let Some(end) = rest.find(']') else {
        return (String::new(), trimmed.to_string());
    };

    let tag = rest[..end]
        .split_whitespace()
        .map(|word| word.replace('|', ""))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(TAG_WORD_SEPARATOR);
    let question = rest[end + 1..].trim().to_string();

    (tag, question)
}
