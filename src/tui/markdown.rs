//! Bot replies are Markdown; this turns them into ratatui `Text`.
//!
//! Walks `pulldown_cmark` events and keeps a small amount of block state
//! (quote depth, list nesting, the open code block). Fenced code with a known
//! language goes through syntect. User messages never pass through here:
//! [`literal`] renders them verbatim.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEMES: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const CODE_THEME: &str = "base16-ocean.dark";
const CODE_INDENT: &str = "  ";
const QUOTE_BAR: &str = "▎ ";

/// Render Markdown `content`, using `base` for unstyled text.
pub fn render(content: &str, base: Style) -> Text<'static> {
    let mut renderer = Renderer::new(base);
    for event in Parser::new_ext(content, Options::ENABLE_STRIKETHROUGH) {
        renderer.event(event);
    }
    renderer.finish()
}

/// Render `content` verbatim, one `Line` per source line.
pub fn literal(content: &str, style: Style) -> Text<'static> {
    let lines: Vec<Line<'static>> = content
        .lines()
        .map(|line| Line::from(Span::styled(expand_tabs(line), style)))
        .collect();
    Text::from(lines)
}

fn expand_tabs(s: &str) -> String {
    // ratatui renders \t as zero-width
    s.replace('\t', "    ")
}

struct CodeBlock {
    highlighter: Option<HighlightLines<'static>>,
}

struct Renderer {
    base: Style,
    lines: Vec<Line<'static>>,
    /// Spans of the line being built.
    spans: Vec<Span<'static>>,
    styles: Vec<Style>,
    quote_depth: usize,
    /// None = bullet list, Some(n) = ordered list at item n.
    lists: Vec<Option<u64>>,
    code: Option<CodeBlock>,
    link: Option<String>,
    /// A blank line is owed before the next block.
    gap: bool,
}

impl Renderer {
    fn new(base: Style) -> Self {
        Self {
            base,
            lines: Vec::new(),
            spans: Vec::new(),
            styles: Vec::new(),
            quote_depth: 0,
            lists: Vec::new(),
            code: None,
            link: None,
            gap: false,
        }
    }

    fn finish(mut self) -> Text<'static> {
        self.flush();
        Text::from(self.lines)
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or(self.base)
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn pop_style(&mut self) {
        self.styles.pop();
    }

    fn prefix(&self) -> Vec<Span<'static>> {
        let bar = Style::default().fg(Color::DarkGray);
        (0..self.quote_depth)
            .map(|_| Span::styled(QUOTE_BAR, bar))
            .collect()
    }

    fn emit(&mut self, spans: Vec<Span<'static>>) {
        let mut line = self.prefix();
        line.extend(spans);
        self.lines.push(Line::from(line));
    }

    /// Close the line under construction, if any.
    fn flush(&mut self) {
        if !self.spans.is_empty() {
            let spans = std::mem::take(&mut self.spans);
            self.emit(spans);
        }
    }

    fn start_block(&mut self) {
        self.flush();
        if self.gap && !self.lines.is_empty() {
            self.emit(Vec::new());
        }
        self.gap = false;
    }

    fn end_block(&mut self) {
        self.flush();
        self.gap = true;
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(text) => {
                if self.code.is_some() {
                    self.code_text(&text);
                } else {
                    let style = self.style();
                    self.spans.push(Span::styled(expand_tabs(&text), style));
                }
            }
            Event::Code(code) => {
                let style = self.style().fg(Color::Yellow).add_modifier(Modifier::BOLD);
                self.spans.push(Span::styled(code.to_string(), style));
            }
            Event::Html(raw) | Event::InlineHtml(raw) => {
                let style = self.style();
                self.spans.push(Span::styled(raw.trim_end().to_string(), style));
            }
            Event::SoftBreak => self.spans.push(Span::raw(" ")),
            Event::HardBreak => {
                self.flush();
            }
            Event::Rule => {
                self.start_block();
                self.emit(vec![Span::styled(
                    "─".repeat(32),
                    Style::default().fg(Color::DarkGray),
                )]);
                self.gap = true;
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            // Paragraphs inside list items continue the item's line.
            Tag::Paragraph if self.lists.is_empty() => self.start_block(),
            Tag::Heading { level, .. } => {
                self.start_block();
                self.push_style(heading_style(level));
            }
            Tag::BlockQuote(_) => {
                self.start_block();
                self.quote_depth += 1;
                self.push_style(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => {
                self.start_block();
                let lang = match &kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or("").to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                };
                if !lang.is_empty() {
                    self.emit(vec![Span::styled(
                        lang.clone(),
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::ITALIC),
                    )]);
                }
                let highlighter = SYNTAXES
                    .find_syntax_by_token(&lang)
                    .filter(|_| !lang.is_empty())
                    .zip(THEMES.themes.get(CODE_THEME))
                    .map(|(syntax, theme)| HighlightLines::new(syntax, theme));
                self.code = Some(CodeBlock { highlighter });
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.start_block();
                } else {
                    self.flush();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.spans.push(Span::styled(
                    format!("{}{}", "  ".repeat(depth), marker),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link = Some(dest_url.to_string());
                self.push_style(Style::default().add_modifier(Modifier::UNDERLINED));
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if self.lists.is_empty() {
                    self.end_block();
                } else {
                    self.flush();
                }
            }
            TagEnd::Heading(_) => {
                self.pop_style();
                self.end_block();
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.pop_style();
                self.gap = true;
            }
            TagEnd::CodeBlock => {
                self.code = None;
                self.gap = true;
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.gap = true;
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.link.take() {
                    self.spans.push(Span::styled(
                        format!(" <{url}>"),
                        Style::default().fg(Color::Cyan),
                    ));
                }
            }
            _ => {}
        }
    }

    fn code_text(&mut self, text: &str) {
        let plain = Style::default().fg(Color::Gray);
        let mut rendered = Vec::new();
        for source_line in LinesWithEndings::from(text) {
            let highlighted = self
                .code
                .as_mut()
                .and_then(|block| block.highlighter.as_mut())
                .and_then(|hl| hl.highlight_line(source_line, &SYNTAXES).ok());
            let mut spans = vec![Span::raw(CODE_INDENT)];
            match highlighted {
                Some(ranges) => {
                    spans.extend(ranges.into_iter().filter_map(|(style, fragment)| {
                        let fragment = expand_tabs(fragment.trim_end_matches('\n'));
                        (!fragment.is_empty()).then(|| {
                            let fg = style.foreground;
                            Span::styled(fragment, Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)))
                        })
                    }));
                }
                None => spans.push(Span::styled(
                    expand_tabs(source_line.trim_end_matches('\n')),
                    plain,
                )),
            }
            rendered.push(spans);
        }
        for spans in rendered {
            self.emit(spans);
        }
    }
}

fn heading_style(level: HeadingLevel) -> Style {
    match level {
        HeadingLevel::H1 => Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        _ => Style::default().add_modifier(Modifier::BOLD),
    }
}
