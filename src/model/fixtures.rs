// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::block::{Block, BlockDocument, BlockKind, InlineSpan, SpanStyles};
use super::canvas::{CanvasDocument, Connector, Point, Shape, ShapeKind, Style};
use super::ids::{BlockId, ConnectorId, DocumentId, ShapeId};

pub(crate) fn did(value: &str) -> DocumentId {
    DocumentId::new(value).expect("document id")
}

pub(crate) fn sid(value: &str) -> ShapeId {
    ShapeId::new(value).expect("shape id")
}

pub(crate) fn cid(value: &str) -> ConnectorId {
    ConnectorId::new(value).expect("connector id")
}

pub(crate) fn bid(value: &str) -> BlockId {
    BlockId::new(value).expect("block id")
}

/// a -> b, a -> c, b -> d, c -> d, plus a styled label on a.
pub(crate) fn canvas_small_dag() -> CanvasDocument {
    let mut doc = CanvasDocument::new(did("m:dag"), "Small DAG");

    let mut a = Shape::labeled(ShapeKind::Concept, "A").with_position(Point::new(0.0, 0.0));
    a.set_style(Style {
        stroke: Some("#333".to_owned()),
        fill: Some("#ffd".to_owned()),
    });
    a.properties_mut().insert("color".to_owned(), "yellow".to_owned());
    doc.shapes_mut().insert(sid("a"), a);
    doc.shapes_mut().insert(
        sid("b"),
        Shape::labeled(ShapeKind::Rectangle, "B").with_position(Point::new(-100.0, 120.0)),
    );
    doc.shapes_mut().insert(
        sid("c"),
        Shape::labeled(ShapeKind::Ellipse, "C").with_position(Point::new(100.0, 120.0)),
    );
    doc.shapes_mut().insert(
        sid("d"),
        Shape::new(ShapeKind::Text).with_position(Point::new(0.0, 240.5)),
    );

    doc.connectors_mut()
        .insert(cid("ab"), Connector::new(sid("a"), sid("b")).with_label("has"));
    doc.connectors_mut().insert(cid("ac"), Connector::new(sid("a"), sid("c")));
    doc.connectors_mut().insert(cid("bd"), Connector::new(sid("b"), sid("d")));
    doc.connectors_mut().insert(cid("cd"), Connector::new(sid("c"), sid("d")));

    doc
}

/// A note with a heading section, a nested list and an orphan paragraph.
pub(crate) fn note_biology() -> BlockDocument {
    let bold = InlineSpan {
        text: "membrane".to_owned(),
        styles: SpanStyles {
            bold: true,
            ..SpanStyles::default()
        },
        link: None,
    };

    BlockDocument::new(did("n:bio"), "Biology").with_blocks(vec![
        Block::paragraph(bid("intro"), "Intro text"),
        Block::heading(bid("cell"), 1, "Cell"),
        Block::new(
            bid("cell-p"),
            BlockKind::Paragraph,
            vec![InlineSpan::plain("has a "), bold],
        ),
        Block::heading(bid("nucleus"), 2, "Nucleus"),
        Block::new(
            bid("nucleus-li"),
            BlockKind::BulletListItem,
            vec![InlineSpan::plain("holds DNA")],
        )
        .with_children(vec![Block::new(
            bid("nucleus-li-check"),
            BlockKind::CheckListItem { checked: true },
            vec![InlineSpan::plain("reviewed")],
        )]),
        Block::heading(bid("tissue"), 1, "Tissue"),
    ])
}

/// One chain of bullet items `d1 > d2 > ... > d<depth>`; the innermost item is bold.
pub(crate) fn note_nested_chain(depth: usize) -> BlockDocument {
    let innermost = InlineSpan {
        text: format!("level {depth}"),
        styles: SpanStyles {
            bold: true,
            ..SpanStyles::default()
        },
        link: None,
    };
    let mut block = Block::new(
        bid(&format!("d{depth}")),
        BlockKind::BulletListItem,
        vec![innermost],
    );
    for level in (1..depth).rev() {
        block = Block::new(
            bid(&format!("d{level}")),
            BlockKind::BulletListItem,
            vec![InlineSpan::plain(format!("level {level}"))],
        )
        .with_children(vec![block]);
    }
    BlockDocument::new(did("n:deep"), "Deep").with_blocks(vec![block])
}
