//! Snowball-backed analyzer with closed-class function-word dictionaries

use super::{Language, Morphology, MorphologyError, PartOfSpeech, WordForm};
use lazy_static::lazy_static;
use rust_stemmers::Stemmer;
use std::collections::HashMap;

use super::PartOfSpeech::{Conjunction, Content, Interjection, Particle, Preposition};

type Dictionary = HashMap<&'static str, &'static [PartOfSpeech]>;

lazy_static! {
    static ref RUSSIAN_FUNCTION_WORDS: Dictionary = {
        let entries: &[(&str, &'static [PartOfSpeech])] = &[
            // prepositions
            ("в", &[Preposition]), ("во", &[Preposition]), ("на", &[Preposition]),
            ("с", &[Preposition]), ("со", &[Preposition]), ("к", &[Preposition]),
            ("ко", &[Preposition]), ("по", &[Preposition]), ("о", &[Preposition, Interjection]),
            ("об", &[Preposition]), ("обо", &[Preposition]), ("от", &[Preposition]),
            ("до", &[Preposition]), ("из", &[Preposition]), ("у", &[Preposition]),
            ("за", &[Preposition]), ("над", &[Preposition]), ("под", &[Preposition]),
            ("при", &[Preposition]), ("про", &[Preposition]), ("для", &[Preposition]),
            ("без", &[Preposition]), ("через", &[Preposition]), ("между", &[Preposition]),
            ("перед", &[Preposition]), ("среди", &[Preposition]),
            ("около", &[Preposition, Content]), ("вокруг", &[Preposition, Content]),
            ("после", &[Preposition, Content]), ("кроме", &[Preposition]),
            // conjunctions
            ("и", &[Conjunction, Particle]), ("а", &[Conjunction, Particle]),
            ("но", &[Conjunction]), ("или", &[Conjunction]), ("либо", &[Conjunction]),
            ("да", &[Conjunction, Particle]), ("если", &[Conjunction]),
            ("чтобы", &[Conjunction]), ("чтоб", &[Conjunction]), ("зато", &[Conjunction]),
            ("однако", &[Conjunction, Content]), ("тоже", &[Conjunction, Content]),
            ("также", &[Conjunction, Content]), ("хотя", &[Conjunction, Particle]),
            ("потому", &[Conjunction, Content]), ("когда", &[Conjunction, Content]),
            // particles
            ("не", &[Particle]), ("ни", &[Particle, Conjunction]), ("же", &[Particle]),
            ("бы", &[Particle]), ("б", &[Particle]), ("ли", &[Particle]),
            ("ль", &[Particle]), ("вот", &[Particle]), ("вон", &[Particle, Content]),
            ("лишь", &[Particle]), ("даже", &[Particle]), ("ведь", &[Particle]),
            ("только", &[Particle, Content]), ("уж", &[Particle]), ("разве", &[Particle]),
            ("неужели", &[Particle]), ("пусть", &[Particle]), ("пускай", &[Particle]),
            // interjections
            ("ах", &[Interjection]), ("ох", &[Interjection]), ("эх", &[Interjection]),
            ("ой", &[Interjection]), ("ай", &[Interjection]), ("ну", &[Interjection, Particle]),
            ("увы", &[Interjection]), ("ура", &[Interjection]), ("эй", &[Interjection]),
            ("ага", &[Interjection]), ("ого", &[Interjection]), ("ух", &[Interjection]),
        ];
        entries.iter().copied().collect()
    };

    static ref ENGLISH_FUNCTION_WORDS: Dictionary = {
        let entries: &[(&str, &'static [PartOfSpeech])] = &[
            // prepositions
            ("in", &[Preposition]), ("on", &[Preposition]), ("at", &[Preposition]),
            ("of", &[Preposition]), ("to", &[Preposition, Particle]), ("for", &[Preposition, Conjunction]),
            ("from", &[Preposition]), ("with", &[Preposition]), ("without", &[Preposition]),
            ("by", &[Preposition]), ("about", &[Preposition]), ("into", &[Preposition]),
            ("onto", &[Preposition]), ("upon", &[Preposition]), ("under", &[Preposition]),
            ("between", &[Preposition]), ("among", &[Preposition]), ("through", &[Preposition]),
            ("during", &[Preposition]), ("against", &[Preposition]), ("towards", &[Preposition]),
            ("toward", &[Preposition]), ("within", &[Preposition]), ("via", &[Preposition]),
            ("over", &[Preposition, Content]), ("like", &[Preposition, Content]),
            ("round", &[Preposition, Content]), ("past", &[Preposition, Content]),
            ("before", &[Preposition, Conjunction]), ("after", &[Preposition, Conjunction]),
            ("since", &[Preposition, Conjunction]), ("until", &[Preposition, Conjunction]),
            // conjunctions
            ("and", &[Conjunction]), ("or", &[Conjunction]), ("but", &[Conjunction]),
            ("nor", &[Conjunction]), ("yet", &[Conjunction, Content]), ("so", &[Conjunction, Content]),
            ("if", &[Conjunction]), ("because", &[Conjunction]), ("although", &[Conjunction]),
            ("though", &[Conjunction]), ("unless", &[Conjunction]), ("whereas", &[Conjunction]),
            ("while", &[Conjunction, Content]), ("whether", &[Conjunction]),
            // particles
            ("not", &[Particle]), ("up", &[Particle, Preposition]), ("off", &[Particle, Preposition]),
            ("out", &[Particle, Preposition]), ("just", &[Particle, Content]),
            ("only", &[Particle, Content]),
            // interjections
            ("oh", &[Interjection]), ("ah", &[Interjection]), ("wow", &[Interjection]),
            ("hey", &[Interjection]), ("alas", &[Interjection]), ("oops", &[Interjection]),
            ("ouch", &[Interjection]), ("hello", &[Interjection, Content]),
            ("well", &[Interjection, Content]), ("hmm", &[Interjection]),
        ];
        entries.iter().copied().collect()
    };
}

/// Analyzer combining a Snowball stemmer with a function-word dictionary
///
/// Dictionary words produce one reading per listed class; the function-word
/// readings keep the surface form as their lemma and a `Content` entry maps
/// to the stem. Every other word has a single `Content` reading.
pub struct StemmerMorphology {
    language: Language,
    stemmer: Stemmer,
    function_words: &'static Dictionary,
}

impl StemmerMorphology {
    pub fn new(language: Language) -> Self {
        let function_words: &'static Dictionary = match language {
            Language::Russian => &RUSSIAN_FUNCTION_WORDS,
            Language::English => &ENGLISH_FUNCTION_WORDS,
        };

        Self {
            language,
            stemmer: Stemmer::create(language.algorithm()),
            function_words,
        }
    }

    /// Builds the analyzer for a configured language name
    pub fn from_name(name: &str) -> Result<Self, MorphologyError> {
        Language::from_name(name)
            .map(Self::new)
            .ok_or_else(|| MorphologyError::UnsupportedLanguage(name.to_string()))
    }

    fn stem(&self, word: &str) -> String {
        // The Russian stemmer treats "ё" and "е" differently; folding keeps
        // both spellings on the same lemma.
        let folded = word.replace('ё', "е");
        self.stemmer.stem(&folded).into_owned()
    }
}

impl Morphology for StemmerMorphology {
    fn language(&self) -> Language {
        self.language
    }

    fn analyze(&self, word: &str) -> Vec<WordForm> {
        if word.is_empty() {
            return Vec::new();
        }

        match self.function_words.get(word) {
            Some(classes) => classes
                .iter()
                .map(|&pos| match pos {
                    Content => WordForm::new(self.stem(word), Content),
                    restricted => WordForm::new(word, restricted),
                })
                .collect(),
            None => vec![WordForm::new(self.stem(word), Content)],
        }
    }
}
