//! Lemma extraction and inverted index maintenance

mod indexer;
mod lemmatizer;

pub use indexer::LemmaIndexer;
pub use lemmatizer::Lemmatizer;
