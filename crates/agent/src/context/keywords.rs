//! Keyword extraction: noun-phrase chunking and ranking.
//!
//! Text is tokenized (punctuation and contraction suffixes split off) and
//! cut into noun-like phrases with a closed-class lexicon instead of a
//! statistical tagger:
//!
//! - a determiner or possessive pronoun may open a phrase;
//! - a possessive `'s` following a noun opens a new phrase;
//! - content words extend the current phrase;
//! - everything else (other stop words, numbers, punctuation, verb
//!   participles) ends it.
//!
//! An article followed by a single noun and then a preposition
//! (`the capital of`) is the head of a prepositional phrase and is not
//! emitted.
//!
//! A phrase is kept only if it contains a content word. Stop words are then
//! removed and the remaining words lowercased.

use std::collections::HashMap;

use super::stopwords::{self, CLITICS};

/// Extract noun-like phrases from `text` and rank them.
///
/// With `weight_recent`, the phrase at position `i` contributes `i + 1`
/// to its score, so later mentions count more. Without it, phrases are
/// ranked by frequency. Ties keep first-seen order.
pub fn extract_ranked_phrases(text: &str, weight_recent: bool) -> Vec<String> {
    let phrases = chunk_phrases(text);

    let mut scores: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (position, phrase) in phrases.iter().enumerate() {
        let weight = if weight_recent { position + 1 } else { 1 };
        let slot = *index.entry(phrase.as_str()).or_insert_with(|| {
            scores.push((phrase.as_str(), 0));
            scores.len() - 1
        });
        scores[slot].1 += weight;
    }

    // sort_by is stable, equal scores stay in first-seen order
    scores.sort_by(|a, b| b.1.cmp(&a.1));
    scores.into_iter().map(|(p, _)| p.to_string()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Leader,
    Content,
    Boundary,
}

/// Cut `text` into stop-word-free phrases in order of appearance.
fn chunk_phrases(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let mut phrases = Vec::new();
    let mut current: Vec<(&str, Class)> = Vec::new();
    let mut prev: Option<(&str, Class)> = None;

    for token in &tokens {
        let class = classify(token, prev);
        match class {
            Class::Leader => {
                flush(&mut current, &mut phrases);
                current.push((token.as_str(), class));
            }
            Class::Content => current.push((token.as_str(), class)),
            Class::Boundary if stopwords::is_preposition(token) && is_bare_head(&current) => {
                current.clear();
            }
            Class::Boundary => flush(&mut current, &mut phrases),
        }
        prev = Some((token.as_str(), class));
    }
    flush(&mut current, &mut phrases);

    phrases
}

/// An article and exactly one content word.
fn is_bare_head(current: &[(&str, Class)]) -> bool {
    matches!(
        current,
        [(article, Class::Leader), (_, Class::Content)] if stopwords::is_article(article)
    )
}

fn flush(current: &mut Vec<(&str, Class)>, phrases: &mut Vec<String>) {
    if current.iter().any(|(_, class)| *class == Class::Content) {
        let words: Vec<String> = current
            .iter()
            .map(|(word, _)| *word)
            .filter(|word| !stopwords::is_stop_word(word))
            .map(str::to_lowercase)
            .collect();
        if !words.is_empty() {
            phrases.push(words.join(" "));
        }
    }
    current.clear();
}

fn classify(token: &str, prev: Option<(&str, Class)>) -> Class {
    if token.eq_ignore_ascii_case("'s") {
        // Possessive after a noun, contraction after anything else
        return match prev {
            Some((_, Class::Content)) => Class::Leader,
            _ => Class::Boundary,
        };
    }
    if CLITICS.iter().any(|c| c.eq_ignore_ascii_case(token)) {
        return Class::Boundary;
    }
    if !token.chars().any(char::is_alphabetic) || token.chars().any(|c| c.is_ascii_digit()) {
        return Class::Boundary;
    }
    if stopwords::is_leader(token) {
        return Class::Leader;
    }
    if stopwords::is_stop_word(token) {
        return Class::Boundary;
    }
    let after_auxiliary = prev.is_some_and(|(word, _)| stopwords::is_auxiliary(word));
    if is_verb_form(token, after_auxiliary) {
        return Class::Boundary;
    }
    Class::Content
}

/// Past participles (`founded`, but not `speed`) and progressive forms
/// directly after an auxiliary (`is running`).
fn is_verb_form(word: &str, after_auxiliary: bool) -> bool {
    let lower = word.to_lowercase();
    if lower.chars().count() <= 4 {
        return false;
    }
    (lower.ends_with("ed") && !lower.ends_with("eed")) || (after_auxiliary && lower.ends_with("ing"))
}

/// Split on whitespace, then peel punctuation off both ends of each word
/// and split contraction suffixes (`Australia's` -> `Australia`, `'s`).
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();

    for raw in text.split_whitespace() {
        let raw = raw.replace('\u{2019}', "'");
        let start = raw.find(char::is_alphanumeric);
        let end = raw
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_alphanumeric())
            .map(|(i, c)| i + c.len_utf8());

        let (Some(start), Some(end)) = (start, end) else {
            tokens.push(raw);
            continue;
        };

        if start > 0 {
            tokens.push(raw[..start].to_string());
        }
        push_word(&raw[start..end], &mut tokens);
        if end < raw.len() {
            tokens.push(raw[end..].to_string());
        }
    }

    tokens
}

fn push_word(word: &str, tokens: &mut Vec<String>) {
    for clitic in CLITICS {
        if word.len() > clitic.len() {
            let split = word.len() - clitic.len();
            if word.is_char_boundary(split) && word[split..].eq_ignore_ascii_case(clitic) {
                tokens.push(word[..split].to_string());
                tokens.push(word[split..].to_string());
                return;
            }
        }
    }
    tokens.push(word.to_string());
}
