//! Word tokenizer
//!
//! A word is a maximal run of letters from the language's alphabet. Any other
//! character (digits, punctuation, letters of another script) separates words.

use crate::morphology::Language;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RUSSIAN_WORD: Regex = Regex::new(r"(?i)[а-яё]+").expect("valid regex");
    static ref ENGLISH_WORD: Regex = Regex::new(r"(?i)[a-z]+").expect("valid regex");
}

fn word_regex(language: Language) -> &'static Regex {
    match language {
        Language::Russian => &RUSSIAN_WORD,
        Language::English => &ENGLISH_WORD,
    }
}

/// A word together with its byte range in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSpan<'a> {
    pub word: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Iterates over the words of `text` in order, keeping their original case
pub fn word_spans(text: &str, language: Language) -> impl Iterator<Item = WordSpan<'_>> {
    word_regex(language).find_iter(text).map(|m| WordSpan {
        word: m.as_str(),
        start: m.start(),
        end: m.end(),
    })
}

/// Splits `text` into words
///
/// Order is preserved and duplicates are kept. Case is not changed; callers
/// that need lowercase words lowercase the text first.
pub fn tokenize(text: &str, language: Language) -> Vec<String> {
    word_spans(text, language)
        .map(|span| span.word.to_string())
        .collect()
}
