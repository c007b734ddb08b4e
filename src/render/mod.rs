//! Paginates a [`Report`] into fixed-size pages of positioned primitives.
//!
//! One forward pass draws every section in a fixed order onto a single
//! vertical cursor; a second pass stamps the footer once the page count is
//! known. Rendering never fails: absent fields fall back to zero or empty.

pub mod layout;
mod sections;

use crate::config::Config;
use crate::policy::Rgb;
use crate::report::Report;
use crate::sanitize::{sanitize, sanitize_folded};
use layout::{Block, CONTENT_BOTTOM, CONTENT_TOP, FOOTER_BASELINE, FOOTER_TOP, MARGIN, PAGE_WIDTH};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Normal,
    Bold,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        fill: Option<Rgb>,
        #[serde(skip_serializing_if = "Option::is_none")]
        stroke: Option<Rgb>,
    },
    /// `y` is the baseline.
    Text {
        x: f64,
        y: f64,
        content: String,
        size: f64,
        weight: FontWeight,
        color: Rgb,
        align: Align,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_width: Option<f64>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub number: usize,
    pub primitives: Vec<Primitive>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text { content, .. } => Some(content.as_str()),
            Primitive::Rect { .. } => None,
        })
    }
}

/// The exported artifact: page geometry plus the rendered pages.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub unit: &'static str,
    pub page_width: f64,
    pub page_height: f64,
    pub generated_at: String,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(pages: Vec<Page>, generated_at: &str) -> Self {
        Self {
            unit: "mm",
            page_width: layout::PAGE_WIDTH,
            page_height: layout::PAGE_HEIGHT,
            generated_at: generated_at.to_string(),
            pages,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub title: String,
    /// Footer timestamp, identical on every page.
    pub generated_at: String,
    pub fold_compatibility: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: "SALLA OPERATIONS REPORT".into(),
            generated_at: String::new(),
            fold_compatibility: false,
        }
    }
}

impl RenderOptions {
    pub fn from_config(cfg: &Config, generated_at: &str) -> Self {
        Self {
            title: cfg.render.title.clone(),
            generated_at: generated_at.to_string(),
            fold_compatibility: cfg.render.fold_compatibility,
        }
    }
}

pub fn render(report: &Report, opts: &RenderOptions) -> Vec<Page> {
    let mut canvas = Canvas::new(opts.fold_compatibility);
    sections::draw_all(&mut canvas, report, opts);
    let mut pages = canvas.into_pages();
    stamp_footers(&mut pages, &opts.generated_at);
    debug!(pages = pages.len(), "document rendered");
    pages
}

fn stamp_footers(pages: &mut [Page], generated_at: &str) {
    let total = pages.len();
    let style = TextStyle::new(7.0, FontWeight::Italic, Rgb::hex(0x6b7280));
    for page in pages.iter_mut() {
        page.primitives.push(Primitive::Rect {
            x: 0.0,
            y: FOOTER_TOP,
            w: PAGE_WIDTH,
            h: layout::PAGE_HEIGHT - FOOTER_TOP,
            fill: Some(Rgb::hex(0xf3f4f6)),
            stroke: None,
        });
        page.primitives.push(style.at(
            MARGIN,
            FOOTER_BASELINE,
            format!("Generated: {}", sanitize(generated_at)),
        ));
        page.primitives.push(style.at(
            PAGE_WIDTH - MARGIN - 20.0,
            FOOTER_BASELINE,
            format!("Page {} of {}", page.number, total),
        ));
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct TextStyle {
    pub size: f64,
    pub weight: FontWeight,
    pub color: Rgb,
    pub align: Align,
}

impl TextStyle {
    pub(crate) fn new(size: f64, weight: FontWeight, color: Rgb) -> Self {
        Self {
            size,
            weight,
            color,
            align: Align::Left,
        }
    }

    pub(crate) fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }

    pub(crate) fn at(&self, x: f64, y: f64, content: String) -> Primitive {
        Primitive::Text {
            x,
            y,
            content,
            size: self.size,
            weight: self.weight,
            color: self.color,
            align: self.align,
            max_width: None,
        }
    }
}

/// The single mutable cursor of a render pass: the page being drawn and `y`.
pub(crate) struct Canvas {
    done: Vec<Page>,
    page: Page,
    pub y: f64,
    fold: bool,
}

impl Canvas {
    fn new(fold: bool) -> Self {
        Self {
            done: Vec::new(),
            page: Page {
                number: 1,
                primitives: Vec::new(),
            },
            y: CONTENT_TOP,
            fold,
        }
    }

    /// Document text passes through here before it becomes a primitive.
    pub(crate) fn clean(&self, text: &str) -> String {
        if self.fold {
            sanitize_folded(text)
        } else {
            sanitize(text)
        }
    }

    fn new_page(&mut self) {
        let next = self.page.number + 1;
        let finished = std::mem::replace(
            &mut self.page,
            Page {
                number: next,
                primitives: Vec::new(),
            },
        );
        self.done.push(finished);
        self.y = CONTENT_TOP;
        debug!(page = next, "page break");
    }

    /// Breaks to a new page when the cursor is past the block's threshold or
    /// `height` would cross the content bottom. A fresh page never breaks.
    pub(crate) fn ensure_space(&mut self, block: Block, height: f64) {
        if self.y <= CONTENT_TOP {
            return;
        }
        let rule = block.rule();
        let past_threshold = rule.break_threshold.is_some_and(|t| self.y > t);
        if past_threshold || self.y + height > CONTENT_BOTTOM {
            self.new_page();
        }
    }

    pub(crate) fn ensure_block(&mut self, block: Block) {
        self.ensure_space(block, block.rule().estimated_height);
    }

    pub(crate) fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: Option<Rgb>, stroke: Option<Rgb>) {
        self.page.primitives.push(Primitive::Rect {
            x,
            y,
            w,
            h,
            fill,
            stroke,
        });
    }

    pub(crate) fn text(&mut self, x: f64, y: f64, content: String, style: TextStyle) {
        if content.is_empty() {
            return;
        }
        self.page.primitives.push(style.at(x, y, content));
    }

    pub(crate) fn text_wrapped(&mut self, x: f64, y: f64, content: String, style: TextStyle, max_width: f64) {
        if content.is_empty() {
            return;
        }
        let mut p = style.at(x, y, content);
        if let Primitive::Text { max_width: mw, .. } = &mut p {
            *mw = Some(max_width);
        }
        self.page.primitives.push(p);
    }

    fn into_pages(mut self) -> Vec<Page> {
        self.done.push(self.page);
        self.done
    }
}
