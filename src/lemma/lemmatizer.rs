//! Text to lemma statistics

use crate::config::LemmatizerConfig;
use crate::morphology::{Language, Morphology, MorphologyError, StemmerMorphology};
use crate::text::tokenize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Reduces text to lemmas using a morphological analyzer
///
/// Cloning is cheap; clones share the analyzer.
#[derive(Clone)]
pub struct Lemmatizer {
    morphology: Arc<dyn Morphology>,
}

impl fmt::Debug for Lemmatizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lemmatizer")
            .field("language", &self.morphology.language())
            .finish()
    }
}

impl Lemmatizer {
    pub fn new(morphology: Arc<dyn Morphology>) -> Self {
        Self { morphology }
    }

    /// Builds a lemmatizer backed by the built-in stemmer analyzer
    ///
    /// # Errors
    ///
    /// Fails when the configured language is not supported. Nothing can be
    /// indexed or searched without an analyzer, so callers treat this as fatal.
    pub fn from_config(config: &LemmatizerConfig) -> Result<Self, MorphologyError> {
        let morphology = StemmerMorphology::from_name(&config.language)?;
        Ok(Self::new(Arc::new(morphology)))
    }

    pub fn language(&self) -> Language {
        self.morphology.language()
    }

    /// Lemmas of every non-restricted reading of `word`
    ///
    /// Empty when the word is unknown to the alphabet or when all of its
    /// readings are function words.
    pub fn word_lemmas(&self, word: &str) -> Vec<String> {
        let word = word.to_lowercase();
        let mut lemmas: Vec<String> = Vec::new();

        for form in self.morphology.analyze(&word) {
            if form.part_of_speech.is_restricted() || lemmas.contains(&form.lemma) {
                continue;
            }
            lemmas.push(form.lemma);
        }

        lemmas
    }

    /// Counts lemma occurrences in `text`
    ///
    /// Every occurrence of a word adds one to each of its distinct
    /// non-restricted lemmas. Words whose every reading is a preposition,
    /// conjunction, interjection or particle are skipped.
    pub fn lemma_statistics(&self, text: &str) -> HashMap<String, u32> {
        let lowercase = text.to_lowercase();
        let mut statistics = HashMap::new();

        for word in tokenize(&lowercase, self.language()) {
            for lemma in self.word_lemmas(&word) {
                *statistics.entry(lemma).or_insert(0) += 1;
            }
        }

        statistics
    }

    /// Distinct lemmas of `text`
    pub fn lemma_set(&self, text: &str) -> HashSet<String> {
        self.lemma_statistics(text).into_keys().collect()
    }

    /// Returns true if any reading of `word` is one of `lemmas`
    pub fn matches(&self, word: &str, lemmas: &HashSet<String>) -> bool {
        self.word_lemmas(word)
            .iter()
            .any(|lemma| lemmas.contains(lemma))
    }
}
