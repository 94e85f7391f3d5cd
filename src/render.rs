//! Markdown rendering for the terminal.
//!
//! Answers, the welcome screen, and help text are Markdown. They are parsed
//! with pulldown-cmark and printed with crossterm styling when stdout is a
//! terminal, or as plain text otherwise.

use crossterm::style::{Attribute, Color, ContentStyle};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

const RULE_WIDTH: usize = 40;

/// Turns Markdown into text for the terminal.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Colour when stdout is a terminal.
    pub fn for_stdout() -> Self {
        Self::new(atty::is(atty::Stream::Stdout))
    }

    /// Render `markdown`. The result always ends with exactly one newline.
    pub fn render(&self, markdown: &str) -> String {
        let options =
            Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS;
        let mut writer = Writer::new(self.color);
        for event in Parser::new_ext(markdown, options) {
            writer.event(event);
        }
        writer.finish()
    }

    /// Style a one-line status message, e.g. an error.
    pub fn error(&self, text: &str) -> String {
        if self.color {
            let mut style = ContentStyle::new();
            style.foreground_color = Some(Color::Red);
            style.apply(text).to_string()
        } else {
            text.to_string()
        }
    }
}

#[derive(Default)]
struct Writer {
    color: bool,
    out: String,
    heading: bool,
    strong: usize,
    emphasis: usize,
    strikethrough: usize,
    quote: usize,
    code_block: bool,
    /// One entry per open list: the next number, or `None` for bullets.
    lists: Vec<Option<u64>>,
    /// Set right after a list marker is written.
    item_fresh: bool,
    links: Vec<String>,
}

impl Writer {
    fn new(color: bool) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if self.code_block {
                    self.code_lines(&text);
                } else {
                    self.text(&text);
                }
            }
            Event::Code(code) => self.inline_code(&code),
            Event::SoftBreak | Event::HardBreak => {
                self.out.push('\n');
                self.indent();
            }
            Event::Rule => {
                self.blank_line();
                let rule = "─".repeat(RULE_WIDTH);
                let styled = self.styled(&rule, self.fg(Color::DarkGrey));
                self.out.push_str(&styled);
                self.out.push('\n');
            }
            Event::TaskListMarker(checked) => {
                self.out.push_str(if checked { "[x] " } else { "[ ] " });
            }
            Event::Html(html) | Event::InlineHtml(html) => self.out.push_str(&html),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.lists.is_empty() {
                    self.blank_line();
                } else if !self.item_fresh {
                    self.newline();
                    self.indent();
                }
            }
            Tag::Heading { .. } => {
                self.blank_line();
                self.heading = true;
            }
            Tag::BlockQuote(_) => {
                self.blank_line();
                self.quote += 1;
            }
            Tag::CodeBlock(kind) => {
                self.blank_line();
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() && !self.color {
                        self.out.push_str(&format!("    [{}]\n", lang));
                    }
                }
                self.code_block = true;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.blank_line();
                } else {
                    self.newline();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.newline();
                let depth = self.lists.len().saturating_sub(1);
                self.out.push_str(&"  ".repeat(depth));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.out.push_str(&marker);
                self.item_fresh = true;
            }
            Tag::Table(_) => self.blank_line(),
            Tag::TableCell => {
                if !self.at_line_start() {
                    self.out.push_str(" | ");
                }
            }
            Tag::Emphasis => self.emphasis += 1,
            Tag::Strong => self.strong += 1,
            Tag::Strikethrough => self.strikethrough += 1,
            Tag::Link { dest_url, .. } => self.links.push(dest_url.to_string()),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.newline(),
            TagEnd::Heading(_) => {
                self.heading = false;
                self.newline();
            }
            TagEnd::BlockQuote(_) => {
                self.quote = self.quote.saturating_sub(1);
                self.newline();
            }
            TagEnd::CodeBlock => self.code_block = false,
            TagEnd::List(_) => {
                self.lists.pop();
                self.newline();
            }
            TagEnd::Item => {
                self.item_fresh = false;
                self.newline();
            }
            TagEnd::TableHead | TagEnd::TableRow => self.newline(),
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Strikethrough => self.strikethrough = self.strikethrough.saturating_sub(1),
            TagEnd::Link => {
                if let Some(url) = self.links.pop() {
                    let url = format!(" ({})", url);
                    let styled = self.styled(&url, self.fg(Color::DarkGrey));
                    self.out.push_str(&styled);
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.quote > 0 && self.at_line_start() {
            self.out.push_str("│ ");
        }
        let styled = self.styled(text, self.inline_style());
        self.out.push_str(&styled);
        self.item_fresh = false;
    }

    fn inline_code(&mut self, code: &str) {
        if self.color {
            let styled = self.styled(code, self.fg(Color::Yellow));
            self.out.push_str(&styled);
        } else {
            self.out.push('`');
            self.out.push_str(code);
            self.out.push('`');
        }
        self.item_fresh = false;
    }

    fn code_lines(&mut self, text: &str) {
        for line in text.lines() {
            let styled = self.styled(line, self.fg(Color::Green));
            self.out.push_str("    ");
            self.out.push_str(&styled);
            self.out.push('\n');
        }
    }

    fn inline_style(&self) -> ContentStyle {
        let mut style = ContentStyle::new();
        if self.heading {
            style.foreground_color = Some(Color::Cyan);
            style.attributes.set(Attribute::Bold);
        }
        if self.strong > 0 {
            style.attributes.set(Attribute::Bold);
        }
        if self.emphasis > 0 {
            style.attributes.set(Attribute::Italic);
        }
        if self.strikethrough > 0 {
            style.attributes.set(Attribute::CrossedOut);
        }
        if self.quote > 0 {
            style.attributes.set(Attribute::Dim);
        }
        if !self.links.is_empty() {
            style.attributes.set(Attribute::Underlined);
        }
        style
    }

    fn fg(&self, color: Color) -> ContentStyle {
        let mut style = ContentStyle::new();
        style.foreground_color = Some(color);
        style
    }

    fn styled(&self, text: &str, style: ContentStyle) -> String {
        if self.color && style != ContentStyle::new() {
            style.apply(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Continuation indent inside list items.
    fn indent(&mut self) {
        if !self.lists.is_empty() {
            self.out.push_str(&"  ".repeat(self.lists.len()));
        }
    }

    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    fn newline(&mut self) {
        if !self.at_line_start() {
            self.out.push('\n');
        }
    }

    fn blank_line(&mut self) {
        self.newline();
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn finish(self) -> String {
        let mut out = self.out.trim_end().to_string();
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(markdown: &str) -> String {
        Renderer::new(false).render(markdown)
    }

    #[test]
    fn test_paragraphs_and_headings() {
        let out = plain("# Title\n\nFirst paragraph.\n\nSecond **bold** one.");
        assert_eq!(out, "Title\n\nFirst paragraph.\n\nSecond bold one.\n");
    }

    #[test]
    fn test_lists() {
        let out = plain("- one\n- two\n  - nested\n\n1. first\n2. second");
        assert_eq!(
            out,
            "• one\n• two\n  • nested\n\n1. first\n2. second\n"
        );
    }

    #[test]
    fn test_inline_code_keeps_backticks_without_color() {
        assert_eq!(plain("call `len()` here"), "call `len()` here\n");
    }

    #[test]
    fn test_code_block_is_indented() {
        let out = plain("```python\nxs = [1, 2]\nprint(xs)\n```");
        assert_eq!(out, "    [python]\n    xs = [1, 2]\n    print(xs)\n");
    }

    #[test]
    fn test_rule_and_link() {
        let out = plain("see [docs](https://docs.python.org)\n\n---\n\nend");
        assert!(out.starts_with("see docs (https://docs.python.org)\n\n"));
        assert!(out.contains(&"─".repeat(RULE_WIDTH)));
        assert!(out.ends_with("end\n"));
    }

    #[test]
    fn test_color_emits_escape_codes() {
        let out = Renderer::new(true).render("## Heading\n\n**bold**");
        assert!(out.contains("\u{1b}["));
        assert!(out.contains("Heading"));
    }

    #[test]
    fn test_error_plain() {
        assert_eq!(Renderer::new(false).error("❌ boom"), "❌ boom");
    }
}
