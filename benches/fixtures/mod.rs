// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use notemap::model::{
    Block, BlockDocument, BlockId, BlockKind, CanvasDocument, Connector, ConnectorId, DocumentId,
    InlineSpan, Point, Shape, ShapeId, ShapeKind,
};
use notemap::ops::{apply_canvas_ops, CanvasOp};

#[derive(Debug, Clone, Copy)]
pub enum Case {
    Small,
    Medium,
    Large,
}

impl Case {
    pub fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    fn size(self) -> usize {
        match self {
            Self::Small => 16,
            Self::Medium => 200,
            Self::Large => 2_000,
        }
    }
}

pub const CASES: [Case; 3] = [Case::Small, Case::Medium, Case::Large];

pub fn shape_id(idx: usize) -> ShapeId {
    ShapeId::new(format!("s{idx:05}")).expect("shape id")
}

pub fn connector_id(idx: usize) -> ConnectorId {
    ConnectorId::new(format!("c{idx:05}")).expect("connector id")
}

fn kind_for(idx: usize) -> ShapeKind {
    match idx % 5 {
        0 => ShapeKind::Concept,
        1 => ShapeKind::Rectangle,
        2 => ShapeKind::Ellipse,
        3 => ShapeKind::Sticky,
        _ => ShapeKind::Text,
    }
}

/// A grid of shapes where every shape links to its right and lower neighbour.
pub fn canvas(case: Case) -> CanvasDocument {
    let count = case.size();
    let columns = (count as f64).sqrt().ceil() as usize;
    let mut doc = CanvasDocument::new(
        DocumentId::new(format!("bench:canvas:{}", case.id())).expect("document id"),
        format!("bench canvas {}", case.id()),
    );

    let mut ops = Vec::with_capacity(count * 3);
    for idx in 0..count {
        let (row, col) = (idx / columns, idx % columns);
        ops.push(CanvasOp::AddShape {
            shape_id: shape_id(idx),
            shape: Shape::labeled(kind_for(idx), format!("concept {idx}"))
                .with_position(Point::new(col as f64 * 200.0, row as f64 * 120.0)),
        });
    }

    let mut edge = 0;
    for idx in 0..count {
        for next in [idx + 1, idx + columns] {
            if next >= count || (next == idx + 1 && next % columns == 0) {
                continue;
            }
            let mut connector = Connector::new(shape_id(idx), shape_id(next));
            if edge % 4 == 0 {
                connector = connector.with_label(format!("rel {edge}"));
            }
            ops.push(CanvasOp::AddConnector {
                connector_id: connector_id(edge),
                connector,
            });
            edge += 1;
        }
    }

    apply_canvas_ops(&mut doc, &ops).expect("fixture ops");
    doc
}

fn block_id(idx: usize, suffix: &str) -> BlockId {
    BlockId::new(format!("b{idx:05}{suffix}")).expect("block id")
}

/// Sections of `h1`/`h2` headings, each followed by a paragraph and a short nested list.
pub fn note(case: Case) -> BlockDocument {
    let sections = case.size();
    let mut blocks = Vec::with_capacity(sections * 3);
    for idx in 0..sections {
        let level = if idx % 4 == 0 { 1 } else { 2 };
        blocks.push(Block::heading(
            block_id(idx, "h"),
            level,
            format!("Section {idx}"),
        ));
        blocks.push(Block::paragraph(
            block_id(idx, "p"),
            format!("Paragraph {idx} with   some  spacing to collapse"),
        ));
        blocks.push(
            Block::new(
                block_id(idx, "l"),
                BlockKind::BulletListItem,
                vec![InlineSpan::plain(format!("point {idx}"))],
            )
            .with_children(vec![Block::new(
                block_id(idx, "c"),
                BlockKind::CheckListItem {
                    checked: idx % 2 == 0,
                },
                vec![InlineSpan::plain("checked off")],
            )]),
        );
    }

    BlockDocument::new(
        DocumentId::new(format!("bench:note:{}", case.id())).expect("document id"),
        format!("bench note {}", case.id()),
    )
    .with_blocks(blocks)
}
