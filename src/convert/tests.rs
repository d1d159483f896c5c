// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::rstest;

use super::{convert, convert_with_id, UNTITLED_HEADING, UNTITLED_NOTE};
use crate::model::fixtures::{bid, cid, did, note_biology, sid};
use crate::model::{Block, BlockDocument, BlockKind, InlineSpan, ShapeKind};

fn label_of(canvas: &crate::model::CanvasDocument, shape: &str) -> String {
    canvas.shapes()[&sid(shape)]
        .label()
        .unwrap_or_default()
        .to_owned()
}

fn item(id: &str, kind: BlockKind, text: &str) -> Block {
    Block::new(bid(id), kind, vec![InlineSpan::plain(text)])
}

#[test]
fn cells_note_becomes_one_shape_with_folded_paragraph() {
    let note = BlockDocument::new(did("n:cells"), "Cells").with_blocks(vec![
        Block::heading(bid("h"), 1, "Cell"),
        Block::paragraph(bid("p"), "basic unit"),
    ]);

    let result = convert(&note);
    let canvas = result.canvas();
    assert_eq!(canvas.shapes().len(), 1);
    assert!(canvas.connectors().is_empty());

    let label = label_of(canvas, "s:h");
    assert!(label.starts_with("Cell"));
    assert!(label.contains("basic unit"));
    assert_eq!(canvas.revision(), 0);
    assert_eq!(result.source_block_document_id(), &did("n:cells"));
}

#[rstest]
#[case::titled("Empty", "Empty")]
#[case::untitled("   ", UNTITLED_NOTE)]
fn empty_note_yields_single_root_shape(#[case] title: &str, #[case] expected_label: &str) {
    let note = BlockDocument::new(did("n:empty"), title);
    let canvas = convert(&note).into_canvas();

    assert_eq!(canvas.shapes().len(), 1);
    assert!(canvas.connectors().is_empty());
    assert_eq!(label_of(&canvas, "s:root"), expected_label);
}

#[test]
fn conversion_does_not_mutate_the_note() {
    let note = note_biology();
    let before = note.clone();
    let _ = convert(&note);
    assert_eq!(note, before);
}

#[test]
fn biology_note_builds_sections_and_root() {
    let result = convert_with_id(&note_biology(), did("m:bio"));
    let canvas = result.canvas();

    assert_eq!(canvas.id(), &did("m:bio"));
    assert_eq!(canvas.title(), "From note: Biology");

    let ids = canvas.shapes().keys().map(|id| id.to_string()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["s:cell", "s:nucleus", "s:root", "s:tissue"]);
    assert!(canvas
        .shapes()
        .values()
        .all(|shape| shape.kind() == ShapeKind::Concept));

    assert_eq!(label_of(canvas, "s:root"), "Biology\nIntro text");
    assert_eq!(label_of(canvas, "s:cell"), "Cell\nhas a membrane");
    assert_eq!(label_of(canvas, "s:nucleus"), "Nucleus\n• holds DNA\n[x] reviewed");
    assert_eq!(label_of(canvas, "s:tissue"), "Tissue");

    assert_eq!(canvas.connectors().len(), 1);
    let connector = &canvas.connectors()[&cid("c:1")];
    assert_eq!(connector.from(), &sid("s:cell"));
    assert_eq!(connector.to(), &sid("s:nucleus"));
    assert!(canvas.dangling_connectors().is_empty());
}

#[test]
fn heading_levels_nest_and_close_sections() {
    let note = BlockDocument::new(did("n:levels"), "Levels").with_blocks(vec![
        Block::heading(bid("a"), 1, "A"),
        Block::heading(bid("a1"), 2, "A1"),
        Block::heading(bid("a1x"), 3, "A1x"),
        Block::heading(bid("a2"), 2, "A2"),
        Block::paragraph(bid("a2-p"), "under a2"),
        Block::heading(bid("b"), 1, "B"),
    ]);

    let canvas = convert_with_id(&note, did("m:levels")).into_canvas();
    let edges = canvas
        .connectors()
        .iter()
        .map(|(id, c)| (id.to_string(), c.from().to_string(), c.to().to_string()))
        .collect::<Vec<_>>();
    assert_eq!(
        edges,
        vec![
            ("c:1".to_owned(), "s:a".to_owned(), "s:a1".to_owned()),
            ("c:2".to_owned(), "s:a1".to_owned(), "s:a1x".to_owned()),
            ("c:3".to_owned(), "s:a".to_owned(), "s:a2".to_owned()),
        ]
    );
    assert_eq!(label_of(&canvas, "s:a2"), "A2\nunder a2");
    assert!(!canvas.shapes().contains_key(&sid("s:root")));
}

#[test]
fn nested_heading_children_become_connected_shapes() {
    let note = BlockDocument::new(did("n:nested"), "Nested").with_blocks(vec![Block::heading(
        bid("top"),
        1,
        "Top",
    )
    .with_children(vec![
        Block::paragraph(bid("top-p"), "detail"),
        Block::heading(bid("inner"), 2, "  Inner   topic "),
    ])]);

    let canvas = convert_with_id(&note, did("m:nested")).into_canvas();
    assert_eq!(label_of(&canvas, "s:top"), "Top\ndetail");
    assert_eq!(label_of(&canvas, "s:inner"), "Inner topic");
    let connector = &canvas.connectors()[&cid("c:1")];
    assert_eq!(connector.from(), &sid("s:top"));
    assert_eq!(connector.to(), &sid("s:inner"));
}

#[test]
fn list_runs_are_numbered_and_checks_marked() {
    let note = BlockDocument::new(did("n:lists"), "Lists").with_blocks(vec![
        Block::heading(bid("h"), 1, ""),
        item("n1", BlockKind::NumberedListItem, "first"),
        item("n2", BlockKind::NumberedListItem, "second"),
        item("gap", BlockKind::Paragraph, "   "),
        item("n3", BlockKind::NumberedListItem, "again"),
        item("todo", BlockKind::CheckListItem { checked: false }, "open"),
    ]);

    let canvas = convert(&note).into_canvas();
    assert_eq!(
        label_of(&canvas, "s:h"),
        format!("{UNTITLED_HEADING}\n1. first\n2. second\n1. again\n[ ] open")
    );
}

#[test]
fn root_shape_avoids_block_id_collision() {
    let note = BlockDocument::new(did("n:collide"), "Collide").with_blocks(vec![
        Block::paragraph(bid("orphan"), "orphan text"),
        Block::heading(bid("root"), 1, "Heading called root"),
    ]);

    let canvas = convert(&note).into_canvas();
    assert_eq!(label_of(&canvas, "s:root-1"), "Collide\norphan text");
    assert_eq!(label_of(&canvas, "s:root"), "Heading called root");
}

#[test]
fn layout_places_children_below_parents_deterministically() {
    let first = convert_with_id(&note_biology(), did("m:bio")).into_canvas();
    let second = convert_with_id(&note_biology(), did("m:bio")).into_canvas();
    assert_eq!(first, second);

    let cell = &first.shapes()[&sid("s:cell")];
    let nucleus = &first.shapes()[&sid("s:nucleus")];
    assert!(nucleus.position().y > cell.position().y + cell.size().height);
    assert!(nucleus.size().width >= 120.0);

    let top_layer_y = [sid("s:root"), sid("s:cell"), sid("s:tissue")]
        .iter()
        .map(|id| first.shapes()[id].position().y)
        .collect::<Vec<_>>();
    assert!(top_layer_y.iter().all(|y| *y == 0.0));
}
