//! Closed-class word lists used by the phrase chunker.

/// The standard English stop-word list.
pub const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// Determiners and possessive pronouns. These may open a phrase but are
/// dropped from it afterwards.
pub const LEADERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "my", "your", "his", "her", "its", "our",
    "their", "some", "any", "each", "all", "both", "no",
];

/// Articles. An article and a lone noun before a preposition are dropped.
pub const ARTICLES: &[&str] = &["a", "an", "the"];

/// Prepositions from the stop-word list.
pub const PREPOSITIONS: &[&str] = &[
    "about", "above", "after", "against", "at", "before", "below", "between", "by", "down",
    "during", "for", "from", "in", "into", "of", "off", "on", "out", "over", "through", "to",
    "under", "until", "up", "with",
];

/// Auxiliary verbs. A following `-ing` form is read as a verb, not a noun.
pub const AUXILIARIES: &[&str] = &[
    "am", "is", "are", "was", "were", "be", "been", "being", "has", "have", "had", "do", "does",
    "did", "will", "would", "shall", "should", "can", "could", "may", "might", "must",
];

/// Contraction suffixes split off a word during tokenization.
pub const CLITICS: &[&str] = &["'s", "n't", "'re", "'ve", "'ll", "'d", "'m"];

pub fn is_stop_word(word: &str) -> bool {
    contains_ignore_case(STOP_WORDS, word)
}

pub fn is_leader(word: &str) -> bool {
    contains_ignore_case(LEADERS, word)
}

pub fn is_article(word: &str) -> bool {
    contains_ignore_case(ARTICLES, word)
}

pub fn is_preposition(word: &str) -> bool {
    contains_ignore_case(PREPOSITIONS, word)
}

pub fn is_auxiliary(word: &str) -> bool {
    contains_ignore_case(AUXILIARIES, word)
}

fn contains_ignore_case(list: &[&str], word: &str) -> bool {
    list.iter().any(|w| w.eq_ignore_ascii_case(word))
}
