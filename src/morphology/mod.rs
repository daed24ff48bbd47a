//! Morphological analysis
//!
//! The analyzer reduces a surface word to every dictionary reading it may
//! have, each tagged with a coarse part of speech. Consumers only rely on the
//! [`Morphology`] trait; [`StemmerMorphology`] is the built-in implementation.

mod stemmer;

pub use stemmer::StemmerMorphology;

use rust_stemmers::Algorithm;
use std::fmt;
use thiserror::Error;

/// Errors raised while constructing an analyzer
#[derive(Debug, Error)]
pub enum MorphologyError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

/// Coarse part-of-speech classes used by the lemma filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Preposition,
    Conjunction,
    Interjection,
    Particle,
    /// Any open-class word (noun, verb, adjective, ...)
    Content,
}

impl PartOfSpeech {
    /// Returns true for the function-word classes excluded from indexing
    pub fn is_restricted(&self) -> bool {
        !matches!(self, PartOfSpeech::Content)
    }
}

/// One morphological reading of a word
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WordForm {
    pub lemma: String,
    pub part_of_speech: PartOfSpeech,
}

impl WordForm {
    pub fn new(lemma: impl Into<String>, part_of_speech: PartOfSpeech) -> Self {
        Self {
            lemma: lemma.into(),
            part_of_speech,
        }
    }
}

/// Languages supported by the built-in analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Russian,
    English,
}

impl Language {
    /// Parses a configured language name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "russian" | "ru" => Some(Language::Russian),
            "english" | "en" => Some(Language::English),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Russian => "russian",
            Language::English => "english",
        }
    }

    /// Snowball algorithm for this language
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Language::Russian => Algorithm::Russian,
            Language::English => Algorithm::English,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Contract of a morphological analyzer
///
/// `analyze` never fails; an analyzer that cannot be built reports the
/// problem from its constructor.
pub trait Morphology: Send + Sync {
    /// Language whose alphabet the analyzer understands
    fn language(&self) -> Language;

    /// Returns every reading of `word`. The word is expected in lowercase.
    fn analyze(&self, word: &str) -> Vec<WordForm>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_name() {
        assert_eq!(Language::from_name("russian"), Some(Language::Russian));
        assert_eq!(Language::from_name("English"), Some(Language::English));
        assert_eq!(Language::from_name(" EN "), Some(Language::English));
        assert_eq!(Language::from_name("klingon"), None);
    }

    #[test]
    fn test_restricted_parts_of_speech() {
        assert!(PartOfSpeech::Preposition.is_restricted());
        assert!(PartOfSpeech::Conjunction.is_restricted());
        assert!(PartOfSpeech::Interjection.is_restricted());
        assert!(PartOfSpeech::Particle.is_restricted());
        assert!(!PartOfSpeech::Content.is_restricted());
    }

    #[test]
    fn test_language_display() {
        assert_eq!(Language::Russian.to_string(), "russian");
        assert_eq!(Language::English.to_string(), "english");
    }
}
