//! Markdown layout: event stream to styled, wrapped lines.
//!
//! The renderer works line-by-line: parse the markdown into a flat list of
//! [`Line`]s with a text class each, then let the pagination pass map
//! classes to fonts and leading. Inline emphasis is flattened to plain
//! text; block structure (headings, paragraphs, code, lists, rules) is
//! what survives into the PDF.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// Wrap column for body text and list items.
const BODY_WRAP_COLS: usize = 92;

/// Wrap column for code lines (Courier is wider than Helvetica).
const MONO_WRAP_COLS: usize = 84;

/// Width of a thematic break, in dashes.
const RULE_COLS: usize = 48;

/// Visual class of one laid-out line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextClass {
    /// Heading with its markdown level (1-6).
    Heading(u8),
    Body,
    Mono,
}

/// One line of output; empty text is vertical spacing only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line {
    pub text: String,
    pub class: TextClass,
}

impl Line {
    fn blank() -> Self {
        Self { text: String::new(), class: TextClass::Body }
    }
}

/// Lay a markdown document out as a flat list of styled lines.
pub(crate) fn layout(markdown: &str) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::new();
    let mut inline = String::new();
    let mut heading_level: Option<u8> = None;
    let mut in_code_block = false;
    let mut list_depth = 0usize;

    fn flush(lines: &mut Vec<Line>, inline: &mut String, class: TextClass, prefix: &str) {
        let text = inline.trim();
        if !text.is_empty() {
            let cols = match class {
                TextClass::Mono => MONO_WRAP_COLS,
                _ => BODY_WRAP_COLS,
            };
            for (i, wrapped) in wrap(text, cols.saturating_sub(prefix.len())).into_iter().enumerate()
            {
                let lead = if i == 0 { prefix.to_string() } else { " ".repeat(prefix.len()) };
                lines.push(Line { text: format!("{lead}{wrapped}"), class });
            }
        }
        inline.clear();
    }

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                inline.clear();
                heading_level = Some(level as u8);
            }
            Event::End(TagEnd::Heading(_)) => {
                let level = heading_level.take().unwrap_or(1);
                flush(&mut lines, &mut inline, TextClass::Heading(level), "");
                lines.push(Line::blank());
            }
            Event::Start(Tag::Paragraph) => inline.clear(),
            Event::End(TagEnd::Paragraph) => {
                // Inside a list item the item end does the flushing.
                if list_depth == 0 {
                    flush(&mut lines, &mut inline, TextClass::Body, "");
                    lines.push(Line::blank());
                }
            }
            Event::Start(Tag::CodeBlock(_)) => {
                in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                lines.push(Line::blank());
            }
            Event::Start(Tag::List(_)) => list_depth += 1,
            Event::End(TagEnd::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
                if list_depth == 0 {
                    lines.push(Line::blank());
                }
            }
            Event::Start(Tag::Item) => inline.clear(),
            Event::End(TagEnd::Item) => {
                let indent = "  ".repeat(list_depth.saturating_sub(1));
                let prefix = format!("{indent}- ");
                flush(&mut lines, &mut inline, TextClass::Body, &prefix);
            }
            Event::Text(text) => {
                if in_code_block {
                    for code_line in text.lines() {
                        for wrapped in wrap_hard(code_line, MONO_WRAP_COLS) {
                            lines.push(Line { text: wrapped, class: TextClass::Mono });
                        }
                    }
                } else {
                    inline.push_str(&text);
                }
            }
            Event::Code(code) => inline.push_str(&code),
            Event::SoftBreak | Event::HardBreak => inline.push(' '),
            Event::Rule => {
                lines.push(Line { text: "-".repeat(RULE_COLS), class: TextClass::Body });
                lines.push(Line::blank());
            }
            _ => {}
        }
    }

    // Unterminated trailing inline content still gets emitted.
    flush(&mut lines, &mut inline, TextClass::Body, "");

    while lines.last().is_some_and(|line| line.text.is_empty()) {
        lines.pop();
    }
    lines
}

/// Word-wrap at `cols`; overlong words are kept whole on their own line.
fn wrap(text: &str, cols: usize) -> Vec<String> {
    let mut wrapped = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > cols {
            wrapped.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        wrapped.push(current);
    }
    wrapped
}

/// Hard wrap preserving leading whitespace (for code lines).
fn wrap_hard(line: &str, cols: usize) -> Vec<String> {
    if line.len() <= cols {
        return vec![line.to_string()];
    }
    line.chars()
        .collect::<Vec<_>>()
        .chunks(cols)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_gets_its_level() {
        let lines = layout("# Title");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Title");
        assert_eq!(lines[0].class, TextClass::Heading(1));

        let lines = layout("### Deep");
        assert_eq!(lines[0].class, TextClass::Heading(3));
    }

    #[test]
    fn paragraph_wraps_at_body_width() {
        let text = "word ".repeat(60);
        let lines = layout(&text);
        assert!(lines.len() > 1, "60 words must not fit one line");
        for line in &lines {
            assert!(line.text.len() <= BODY_WRAP_COLS);
            assert_eq!(line.class, TextClass::Body);
        }
    }

    #[test]
    fn code_block_is_monospace_verbatim() {
        let lines = layout("```\nlet x = 1;\nlet y = 2;\n```");
        let code: Vec<_> = lines.iter().filter(|l| l.class == TextClass::Mono).collect();
        assert_eq!(code.len(), 2);
        assert_eq!(code[0].text, "let x = 1;");
        assert_eq!(code[1].text, "let y = 2;");
    }

    #[test]
    fn list_items_get_bullets() {
        let lines = layout("- first\n- second");
        let items: Vec<_> = lines.iter().filter(|l| !l.text.is_empty()).collect();
        assert_eq!(items[0].text, "- first");
        assert_eq!(items[1].text, "- second");
    }

    #[test]
    fn inline_code_flattens_into_text() {
        let lines = layout("call `connect()` first");
        assert_eq!(lines[0].text, "call connect() first");
    }

    #[test]
    fn rule_renders_as_dashes() {
        let lines = layout("above\n\n---\n\nbelow");
        assert!(lines.iter().any(|l| l.text.chars().all(|c| c == '-') && !l.text.is_empty()));
    }

    #[test]
    fn blank_input_produces_no_lines() {
        assert!(layout("").is_empty());
        assert!(layout("   \n\n").is_empty());
    }

    #[test]
    fn soft_breaks_join_with_spaces() {
        let lines = layout("one\ntwo");
        assert_eq!(lines[0].text, "one two");
    }
}
