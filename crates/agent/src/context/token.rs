//! Length measures for prompt budgeting.
//!
//! Budgets are counted in whitespace-separated words, a rough proxy for
//! tokens. [`LengthMeasure`] isolates that choice so an exact tokenizer can
//! be dropped in without touching the assembler.
//!
//! The debug report also shows an estimated token count, using a
//! character heuristic: 1 token ≈ 4 characters.

/// Measures how "long" a piece of text is against a budget.
pub trait LengthMeasure: Send + Sync {
    /// Length of `text` in budget units.
    fn length_of(&self, text: &str) -> usize;

    /// The longest prefix of `text` whose length is at most `budget`,
    /// with units joined by single spaces.
    fn truncate(&self, text: &str, budget: usize) -> String;
}

/// Whitespace word count. The default measure.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCount;

impl LengthMeasure for WordCount {
    fn length_of(&self, text: &str) -> usize {
        word_count(text)
    }

    fn truncate(&self, text: &str, budget: usize) -> String {
        first_words(text, budget)
    }
}

/// Counts tokens for a given model, for diagnostics only.
///
/// The default, [`CharHeuristic`], is a model-independent estimate and
/// ignores `model`. Plug in a real tokenizer through
/// `ContextAssembler::with_token_counter` for exact per-model counts.
pub trait TokenCounter: Send + Sync {
    fn count_tokens(&self, model: &str, text: &str) -> usize;
}

/// Character-based token estimate, model independent.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharHeuristic;

impl TokenCounter for CharHeuristic {
    fn count_tokens(&self, _model: &str, text: &str) -> usize {
        estimate_tokens(text)
    }
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// The first `n` words of `text`, joined by single spaces.
pub fn first_words(text: &str, n: usize) -> String {
    text.split_whitespace().take(n).collect::<Vec<_>>().join(" ")
}

/// Estimate the token count for a string. Rounds up.
pub fn estimate_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    text.len().div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_count_ignores_repeated_whitespace() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count("  Who is\tits \n mayor? "), 4);
    }

    #[test]
    fn first_words_normalizes_spacing() {
        assert_eq!(first_words("a  b\nc d", 3), "a b c");
        assert_eq!(first_words("a b", 10), "a b");
        assert_eq!(first_words("a b", 0), "");
    }

    #[test]
    fn word_count_measure_truncates_within_budget() {
        let measure = WordCount;
        let cut = measure.truncate("one two three four five", 3);
        assert_eq!(cut, "one two three");
        assert_eq!(measure.length_of(&cut), 3);
    }

    #[test]
    fn empty_string_is_zero_tokens() {
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn four_chars_is_one_token() {
        assert_eq!(estimate_tokens("test"), 1);
    }

    #[test]
    fn five_chars_rounds_up() {
        assert_eq!(estimate_tokens("hello"), 2);
    }

    #[test]
    fn heuristic_counter_ignores_model() {
        let text = "a".repeat(100);
        assert_eq!(CharHeuristic.count_tokens("gpt-3.5-turbo", &text), 25);
        assert_eq!(CharHeuristic.count_tokens("text-davinci-003", &text), 25);
    }
}
