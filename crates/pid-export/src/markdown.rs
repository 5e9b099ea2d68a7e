//! Markdown handling for the report summary.
//!
//! HTML output goes through `pulldown_cmark::html` with raw HTML demoted to
//! text and script-capable link targets neutralized. RTF and WordprocessingML
//! work from a flat list of styled paragraphs instead.

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
}

// ─── HTML ────────────────────────────────────────────────────────────────

/// Render markdown to an HTML fragment that is safe to embed.
pub fn to_html(markdown: &str) -> String {
    let events = Parser::new_ext(markdown, options()).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_url(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_url(&dest_url) => Event::Start(Tag::Image {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        other => other,
    });
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn is_safe_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    match lower.split_once(':') {
        // Relative or fragment.
        None => true,
        Some((scheme, _)) if scheme.contains(['/', '?', '#']) => true,
        Some((scheme, _)) => matches!(scheme, "http" | "https" | "mailto"),
    }
}

// ─── Paragraphs ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    Heading(u8),
    Body,
    Bullet,
    Numbered(u64),
    Code,
}

/// A span of uniformly formatted text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub style: ParagraphStyle,
    pub runs: Vec<Run>,
}

impl Paragraph {
    fn new(style: ParagraphStyle) -> Self {
        Self {
            style,
            runs: Vec::new(),
        }
    }

    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }
}

#[derive(Default)]
struct Flattener {
    out: Vec<Paragraph>,
    current: Option<Paragraph>,
    /// Next number for each open list; `None` for bullet lists.
    lists: Vec<Option<u64>>,
    bold: usize,
    italic: usize,
    in_table_cell: bool,
}

impl Flattener {
    fn flush(&mut self) {
        if let Some(p) = self.current.take()
            && !p.is_blank()
        {
            self.out.push(p);
        }
    }

    fn open(&mut self, style: ParagraphStyle) {
        self.flush();
        self.current = Some(Paragraph::new(style));
    }

    fn push(&mut self, text: &str, code: bool) {
        let run = Run {
            text: text.to_string(),
            bold: self.bold > 0,
            italic: self.italic > 0,
            code,
        };
        let para = self
            .current
            .get_or_insert_with(|| Paragraph::new(ParagraphStyle::Body));
        match para.runs.last_mut() {
            Some(last)
                if last.bold == run.bold && last.italic == run.italic && last.code == run.code =>
            {
                last.text.push_str(&run.text);
            }
            _ => para.runs.push(run),
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.open(ParagraphStyle::Heading(heading_level(level)))
            }
            Event::Start(Tag::Paragraph) => {
                // A loose list item wraps its text in a paragraph; keep the item style.
                let in_fresh_item = self
                    .current
                    .as_ref()
                    .is_some_and(|p| p.runs.is_empty() && p.style != ParagraphStyle::Body);
                if !in_fresh_item {
                    self.open(ParagraphStyle::Body);
                }
            }
            Event::Start(Tag::List(start)) => {
                self.flush();
                self.lists.push(start);
            }
            Event::Start(Tag::Item) => {
                let style = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let style = ParagraphStyle::Numbered(*n);
                        *n += 1;
                        style
                    }
                    _ => ParagraphStyle::Bullet,
                };
                self.open(style);
            }
            Event::Start(Tag::CodeBlock(_)) => self.open(ParagraphStyle::Code),
            Event::Start(Tag::Strong) => self.bold += 1,
            Event::Start(Tag::Emphasis) => self.italic += 1,
            Event::Start(Tag::TableRow | Tag::TableHead) => self.open(ParagraphStyle::Body),
            Event::Start(Tag::TableCell) => {
                if self.in_table_cell {
                    self.push(" | ", false);
                }
                self.in_table_cell = true;
            }
            Event::End(TagEnd::Strong) => self.bold = self.bold.saturating_sub(1),
            Event::End(TagEnd::Emphasis) => self.italic = self.italic.saturating_sub(1),
            Event::End(TagEnd::List(_)) => {
                self.flush();
                self.lists.pop();
            }
            Event::End(TagEnd::TableRow | TagEnd::TableHead) => {
                self.in_table_cell = false;
                self.flush();
            }
            Event::End(
                TagEnd::Heading(_) | TagEnd::Paragraph | TagEnd::Item | TagEnd::CodeBlock,
            ) => self.flush(),
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                self.push(&text, false)
            }
            Event::Code(text) => self.push(&text, true),
            Event::SoftBreak => self.push(" ", false),
            Event::HardBreak => self.push("\n", false),
            _ => {}
        }
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Flatten markdown into styled paragraphs. Code block text keeps its
/// trailing newline trimmed.
pub fn paragraphs(markdown: &str) -> Vec<Paragraph> {
    let mut f = Flattener::default();
    for event in Parser::new_ext(markdown, options()) {
        f.event(event);
    }
    f.flush();
    for p in &mut f.out {
        if p.style == ParagraphStyle::Code
            && let Some(last) = p.runs.last_mut()
        {
            let trimmed = last.text.trim_end_matches('\n').len();
            last.text.truncate(trimmed);
        }
    }
    f.out
}
