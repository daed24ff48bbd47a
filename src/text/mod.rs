//! Text normalization
//!
//! Turns stored HTML into plain text and plain text into words of the
//! configured language.

mod markup;
mod tokenizer;

pub use markup::{extract_title, strip_markup};
pub use tokenizer::{tokenize, word_spans, WordSpan};
