//! HTML to plain text

use scraper::{Html, Node, Selector};

/// Elements whose text is never rendered
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that start a new line of text when rendered
const BLOCK_ELEMENTS: &[&str] = &[
    "html", "head", "title", "body", "address", "article", "aside", "blockquote", "dd", "div",
    "dl", "dt", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Returns the rendered text of an HTML document
///
/// Tags, attributes and hidden elements (scripts, styles) are discarded. Text
/// from different block elements is separated by a space and runs of
/// whitespace collapse to a single space. Malformed markup is recovered by
/// the HTML5 parser; this never fails.
pub fn strip_markup(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::with_capacity(html.len() / 2);
    let mut last_block = None;
    let mut pending_break = false;

    for node in document.root_element().descendants() {
        match node.value() {
            Node::Element(element) if element.name() == "br" => pending_break = true,
            Node::Text(fragment) => {
                let hidden = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .map_or(false, |e| HIDDEN_ELEMENTS.contains(&e.name()))
                });
                if hidden {
                    continue;
                }

                let block = node
                    .ancestors()
                    .find(|ancestor| {
                        ancestor
                            .value()
                            .as_element()
                            .map_or(false, |e| BLOCK_ELEMENTS.contains(&e.name()))
                    })
                    .map(|ancestor| ancestor.id());

                if pending_break || (last_block.is_some() && block != last_block) {
                    text.push(' ');
                }
                pending_break = false;
                last_block = block;

                let fragment: &str = fragment;
                text.push_str(fragment);
            }
            _ => {}
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts the first non-empty `<title>` of a document
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}
