// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::text::escape_markup;
use crate::model::{Block, BlockDocument, BlockKind, InlineSpan};

/// Renders a note as an embeddable `<article>` fragment.
///
/// The note title is the `<h1>`; block headings shift down one level (capped at `<h6>`).
/// Consecutive list items of the same kind share one list element.
pub fn render_note_html(note: &BlockDocument) -> String {
    let mut out = String::from("<article>\n");
    out.push_str(&format!("<h1>{}</h1>\n", escape_markup(note.title())));
    write_blocks(&mut out, note.blocks());
    out.push_str("</article>\n");
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Numbered,
    Check,
}

impl ListKind {
    fn of(kind: &BlockKind) -> Option<Self> {
        match kind {
            BlockKind::BulletListItem => Some(Self::Bullet),
            BlockKind::NumberedListItem => Some(Self::Numbered),
            BlockKind::CheckListItem { .. } => Some(Self::Check),
            _ => None,
        }
    }

    fn open(self) -> &'static str {
        match self {
            Self::Bullet => "<ul>\n",
            Self::Numbered => "<ol>\n",
            Self::Check => "<ul class=\"checklist\">\n",
        }
    }

    fn close(self) -> &'static str {
        match self {
            Self::Bullet | Self::Check => "</ul>\n",
            Self::Numbered => "</ol>\n",
        }
    }
}

fn write_blocks(out: &mut String, blocks: &[Block]) {
    let mut open_list: Option<ListKind> = None;

    for block in blocks {
        let list = ListKind::of(block.kind());
        if open_list != list {
            if let Some(open) = open_list {
                out.push_str(open.close());
            }
            if let Some(list) = list {
                out.push_str(list.open());
            }
            open_list = list;
        }
        write_block(out, block);
    }

    if let Some(open) = open_list {
        out.push_str(open.close());
    }
}

fn write_block(out: &mut String, block: &Block) {
    let content = render_spans(block.content());
    match block.kind() {
        BlockKind::Paragraph => {
            out.push_str(&format!("<p>{content}</p>\n"));
            write_blocks(out, block.children());
        }
        BlockKind::Heading { level } => {
            let tag = (level.saturating_add(1)).clamp(2, 6);
            out.push_str(&format!("<h{tag}>{content}</h{tag}>\n"));
            write_blocks(out, block.children());
        }
        BlockKind::BulletListItem | BlockKind::NumberedListItem => {
            out.push_str(&format!("<li>{content}"));
            write_nested(out, block);
            out.push_str("</li>\n");
        }
        BlockKind::CheckListItem { checked } => {
            let checked = if *checked { " checked" } else { "" };
            out.push_str(&format!(
                "<li><input type=\"checkbox\" disabled{checked}> {content}"
            ));
            write_nested(out, block);
            out.push_str("</li>\n");
        }
        BlockKind::Quote => {
            out.push_str(&format!("<blockquote>{content}"));
            write_nested(out, block);
            out.push_str("</blockquote>\n");
        }
        BlockKind::CodeBlock { language } => {
            let class = language
                .as_deref()
                .map(|language| format!(" class=\"language-{}\"", escape_markup(language)))
                .unwrap_or_default();
            let code = escape_markup(&block.plain_text());
            out.push_str(&format!("<pre><code{class}>{code}</code></pre>\n"));
            write_blocks(out, block.children());
        }
    }
}

fn write_nested(out: &mut String, block: &Block) {
    if block.children().is_empty() {
        return;
    }
    out.push('\n');
    write_blocks(out, block.children());
}

fn render_spans(spans: &[InlineSpan]) -> String {
    spans.iter().map(render_span).collect()
}

fn render_span(span: &InlineSpan) -> String {
    let mut html = escape_markup(&span.text);
    let styles = span.styles;
    for (enabled, tag) in [
        (styles.code, "code"),
        (styles.strike, "s"),
        (styles.underline, "u"),
        (styles.italic, "em"),
        (styles.bold, "strong"),
    ] {
        if enabled {
            html = format!("<{tag}>{html}</{tag}>");
        }
    }
    match &span.link {
        Some(href) if is_safe_href(href) => {
            html = format!("<a href=\"{}\">{html}</a>", escape_markup(href));
        }
        _ => {}
    }
    html
}

const LINK_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Relative references and `http`/`https`/`mailto` URLs. Other links render as plain text.
fn is_safe_href(href: &str) -> bool {
    // Browsers drop tabs, newlines and surrounding controls before reading the scheme.
    let compact = href
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace() && !ch.is_control())
        .collect::<String>();
    match compact.find(|ch: char| matches!(ch, ':' | '/' | '?' | '#')) {
        Some(at) if compact[at..].starts_with(':') => {
            let scheme = compact[..at].to_ascii_lowercase();
            LINK_SCHEMES.contains(&scheme.as_str())
        }
        _ => true,
    }
}
