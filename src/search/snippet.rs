//! Snippet generation
//!
//! A snippet is a sentence-aligned excerpt of a page's text around the first
//! word matching the query, with every matching word wrapped in `<b>`.
//! Positions are counted in characters, not bytes.

use crate::lemma::Lemmatizer;
use crate::text::{strip_markup, word_spans};
use std::collections::{HashMap, HashSet};

/// Target length of a snippet in characters
pub const SNIPPET_LENGTH: usize = 200;

/// How far a snippet end may move to reach a sentence boundary
const END_TOLERANCE: usize = SNIPPET_LENGTH / 4;

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Builds the highlighted snippet of a stored page
///
/// When no word of the page matches `lemmas`, the first
/// [`SNIPPET_LENGTH`] characters of the text are returned as they are.
pub fn snippet(html: &str, lemmatizer: &Lemmatizer, lemmas: &HashSet<String>) -> String {
    let text = strip_markup(html);
    let chars: Vec<char> = text.chars().collect();
    let mut matcher = Matcher::new(lemmatizer, lemmas);

    let first_match = word_spans(&text, lemmatizer.language())
        .find(|span| matcher.matches(span.word))
        .map(|span| text[..span.start].chars().count());

    let Some(position) = first_match else {
        return chars.iter().take(SNIPPET_LENGTH).collect();
    };

    let begin = excerpt_begin(&chars, position);
    let end = excerpt_end(&chars, begin);
    let excerpt: String = chars[begin..end].iter().collect();

    highlight(excerpt.trim(), lemmatizer, &mut matcher)
}

/// Start of the excerpt: just after the last sentence end within half a
/// snippet before the match, or failing that the first space of that window.
/// A window reaching the text start begins at 0 when it holds no sentence end.
fn excerpt_begin(chars: &[char], position: usize) -> usize {
    let window_start = position.saturating_sub(SNIPPET_LENGTH / 2);
    let window = &chars[window_start..position];
    if let Some(index) = window.iter().rposition(|&c| is_terminator(c)) {
        return window_start + index + 1;
    }
    if window_start == 0 {
        return 0;
    }
    if let Some(index) = window.iter().position(|&c| c == ' ') {
        return window_start + index + 1;
    }
    window_start
}

/// End of the excerpt: just after a sentence end near one snippet length
/// from `begin`, or failing that the next space
fn excerpt_end(chars: &[char], begin: usize) -> usize {
    let target = begin + SNIPPET_LENGTH;
    if target >= chars.len() {
        return chars.len();
    }

    let from = target.saturating_sub(END_TOLERANCE).max(begin);
    let to = (target + END_TOLERANCE).min(chars.len());
    if let Some(index) = chars[from..to].iter().rposition(|&c| is_terminator(c)) {
        return from + index + 1;
    }
    if let Some(index) = chars[from..].iter().position(|&c| c == ' ') {
        return from + index;
    }
    target
}

/// Wraps every matching word of `excerpt` in `<b>` tags
fn highlight(excerpt: &str, lemmatizer: &Lemmatizer, matcher: &mut Matcher<'_>) -> String {
    let mut highlighted = String::with_capacity(excerpt.len() + 16);
    let mut copied = 0;

    for span in word_spans(excerpt, lemmatizer.language()) {
        if !matcher.matches(span.word) {
            continue;
        }
        highlighted.push_str(&excerpt[copied..span.start]);
        highlighted.push_str("<b>");
        highlighted.push_str(span.word);
        highlighted.push_str("</b>");
        copied = span.end;
    }

    highlighted.push_str(&excerpt[copied..]);
    highlighted
}

/// Memoizes the lemma test per lowercase word
struct Matcher<'a> {
    lemmatizer: &'a Lemmatizer,
    lemmas: &'a HashSet<String>,
    known: HashMap<String, bool>,
}

impl<'a> Matcher<'a> {
    fn new(lemmatizer: &'a Lemmatizer, lemmas: &'a HashSet<String>) -> Self {
        Self {
            lemmatizer,
            lemmas,
            known: HashMap::new(),
        }
    }

    fn matches(&mut self, word: &str) -> bool {
        let word = word.to_lowercase();
        if let Some(&matched) = self.known.get(&word) {
            return matched;
        }
        let matched = self.lemmatizer.matches(&word, self.lemmas);
        self.known.insert(word, matched);
        matched
    }
}
