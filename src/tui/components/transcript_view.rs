//! # TranscriptView Component
//!
//! Scrollable view of the open conversation.
//!
//! ## Responsibilities
//!
//! - One bordered block per transcript entry: bot replies rendered from
//!   Markdown, user messages shown literally
//! - The typing indicator, drawn after the last entry while a reply is due
//! - Stick-to-bottom scrolling with a "new content below" flag for the
//!   title bar
//!
//! ## Architecture
//!
//! `TranscriptView` is a transient component (created each frame) wrapping
//! `&'a mut TranscriptState` (persistent state) and the `Transcript` (props).
//! Parsed Markdown is cached per entry and only rebuilt when the entry text
//! changes, so long conversations don't re-parse on every frame.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Wrap};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::transcript::{Entry, Sender, Transcript};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;
use crate::tui::markdown;

/// Height of the typing indicator block (one line plus borders).
const INDICATOR_HEIGHT: u16 = 3;
const INDICATOR_FRAMES: [&str; 4] = ["●∙∙", "∙●∙", "∙∙●", "∙●∙"];

struct CachedEntry {
    source: String,
    sender: Sender,
    text: Text<'static>,
}

pub struct TranscriptState {
    pub scroll_state: ScrollViewState,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Content below the viewport that the user hasn't scrolled to.
    pub has_unseen_content: bool,
    viewport_height: u16,
    content_height: u16,
    cache: Vec<CachedEntry>,
}

impl Default for TranscriptState {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            stick_to_bottom: true,
            has_unseen_content: false,
            viewport_height: 0,
            content_height: 0,
            cache: Vec::new(),
        }
    }

    /// Forget scroll position and cached renders (new or switched chat).
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn max_offset(&self) -> u16 {
        self.content_height.saturating_sub(self.viewport_height)
    }

    fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position { x: current.x, y: max_y });
        }
    }

    fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        if self.scroll_state.offset().y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position { x: 0, y: max_y });
        }
    }

    /// Rendered text for entry `index`, rebuilt only if the entry changed.
    fn text_for(&mut self, index: usize, entry: &Entry) -> &Text<'static> {
        let stale = self
            .cache
            .get(index)
            .is_none_or(|c| c.sender != entry.sender || c.source != entry.text);
        if stale {
            let cached = CachedEntry {
                source: entry.text.clone(),
                sender: entry.sender,
                text: render_entry(entry),
            };
            if index < self.cache.len() {
                self.cache[index] = cached;
            } else {
                self.cache.push(cached);
            }
        }
        &self.cache[index].text
    }
}

fn sender_style(sender: Sender) -> Style {
    match sender {
        Sender::User => Style::default().fg(Color::Cyan),
        Sender::Bot => Style::default().fg(Color::Green),
    }
}

fn render_entry(entry: &Entry) -> Text<'static> {
    let style = sender_style(entry.sender);
    let content = entry.text.trim_end();
    match entry.sender {
        Sender::User => markdown::literal(content, style),
        Sender::Bot => markdown::render(content, style),
    }
}

fn entry_block(sender: Sender) -> Block<'static> {
    let style = sender_style(sender);
    Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(style.add_modifier(Modifier::DIM))
        .title(sender.label())
        .title_style(style)
        .padding(Padding::horizontal(1))
}

pub struct TranscriptView<'a> {
    pub transcript: &'a Transcript,
    pub typing_visible: bool,
    pub spinner_frame: usize,
    pub state: &'a mut TranscriptState,
}

impl<'a> TranscriptView<'a> {
    pub fn new(
        transcript: &'a Transcript,
        typing_visible: bool,
        spinner_frame: usize,
        state: &'a mut TranscriptState,
    ) -> Self {
        Self {
            transcript,
            typing_visible,
            spinner_frame,
            state,
        }
    }
}

impl Component for TranscriptView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar

        self.state.cache.truncate(self.transcript.len());

        let mut blocks: Vec<(Paragraph<'static>, u16)> = Vec::new();
        for (i, entry) in self.transcript.entries().iter().enumerate() {
            let text = self.state.text_for(i, entry).clone();
            let paragraph = Paragraph::new(text)
                .block(entry_block(entry.sender))
                .wrap(Wrap { trim: false });
            let height = (paragraph.line_count(content_width) as u16).max(INDICATOR_HEIGHT);
            blocks.push((paragraph, height));
        }
        if self.typing_visible {
            let dots = INDICATOR_FRAMES[self.spinner_frame % INDICATOR_FRAMES.len()];
            let paragraph = Paragraph::new(Line::from(Span::styled(
                dots,
                sender_style(Sender::Bot).add_modifier(Modifier::BOLD),
            )))
            .block(entry_block(Sender::Bot));
            blocks.push((paragraph, INDICATOR_HEIGHT));
        }

        self.state.content_height = blocks.iter().map(|(_, h)| *h).sum();
        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let mut scroll_view = ScrollView::new(Size::new(content_width, self.state.content_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y = 0u16;
        for (paragraph, height) in blocks {
            scroll_view.render_widget(paragraph, Rect::new(0, y, content_width, height));
            y = y.saturating_add(height);
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }
        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);

        self.state.has_unseen_content = !self.state.stick_to_bottom
            && self.state.scroll_state.offset().y < self.state.max_offset();
    }
}

impl EventHandler for TranscriptState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}
