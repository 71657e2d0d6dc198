//! Speakable text from Markdown step instructions.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// Strips Markdown markup so a speech engine reads the words, not the
/// syntax. Block boundaries become sentence breaks.
#[must_use]
pub fn speakable_text(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    for event in Parser::new(markdown) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak | Event::Start(Tag::Item) => {
                push_separator(&mut out, " ");
            }
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item) => {
                end_sentence(&mut out);
            }
            _ => {}
        }
    }
    out.trim().to_owned()
}

fn push_separator(out: &mut String, separator: &str) {
    if !out.is_empty() && !out.ends_with(char::is_whitespace) {
        out.push_str(separator);
    }
}

fn end_sentence(out: &mut String) {
    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    if out.is_empty() {
        return;
    }
    if !out.ends_with(['.', '!', '?', ':']) {
        out.push('.');
    }
    out.push(' ');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speakable_text_drops_emphasis_markup() {
        assert_eq!(
            speakable_text("Keep the comb **flat** against the _scalp_."),
            "Keep the comb flat against the scalp."
        );
    }

    #[test]
    fn test_speakable_text_joins_list_items_as_sentences() {
        let text = speakable_text("Prepare:\n\n- clips\n- comb\n- scissors");

        assert_eq!(text, "Prepare: clips. comb. scissors.");
    }

    #[test]
    fn test_speakable_text_keeps_plain_text_unchanged() {
        assert_eq!(
            speakable_text("Section the hair into four quadrants."),
            "Section the hair into four quadrants."
        );
    }
}
