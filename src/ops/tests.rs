// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::{fixture, rstest};

use crate::error::ErrorKind;
use crate::model::fixtures::{
    bid, canvas_small_dag, cid, did, note_biology, note_nested_chain, sid,
};
use crate::model::{
    Block, BlockDocument, BlockKind, CanvasDocument, Connector, InlineSpan, Point, Shape, ShapeKind,
    Size,
};

use super::{
    apply_block_ops, apply_canvas_ops, ApplyError, BlockOp, CanvasOp, ConnectorPatch, ElementKind,
    ElementRef, ShapePatch,
};

#[fixture]
fn dag() -> CanvasDocument {
    canvas_small_dag()
}

#[fixture]
fn bio() -> BlockDocument {
    note_biology()
}

#[test]
fn add_shape_and_connector_records_added_refs() {
    let mut doc = CanvasDocument::new(did("m:1"), "Map");
    let ops = [
        CanvasOp::AddShape {
            shape_id: sid("x"),
            shape: Shape::labeled(ShapeKind::Concept, "X"),
        },
        CanvasOp::AddShape {
            shape_id: sid("y"),
            shape: Shape::labeled(ShapeKind::Concept, "Y"),
        },
        CanvasOp::AddConnector {
            connector_id: cid("xy"),
            connector: Connector::new(sid("x"), sid("y")),
        },
    ];

    let result = apply_canvas_ops(&mut doc, &ops).expect("apply");
    assert_eq!(result.applied, 3);
    assert_eq!(
        result.delta.added,
        vec![
            ElementRef::Shape(sid("x")),
            ElementRef::Shape(sid("y")),
            ElementRef::Connector(cid("xy")),
        ]
    );
    assert!(result.delta.removed.is_empty());
    assert_eq!(doc.shapes().len(), 2);
    assert_eq!(doc.revision(), 0);
}

#[rstest]
#[case::two_connectors("b", &["ab", "bd"])]
#[case::two_outgoing("a", &["ab", "ac"])]
#[case::two_incoming("d", &["bd", "cd"])]
fn remove_shape_cascades_exactly_its_connectors(
    mut dag: CanvasDocument,
    #[case] shape: &str,
    #[case] expected_removed: &[&str],
) {
    let before = dag.connectors().len();
    let result = apply_canvas_ops(&mut dag, &[CanvasOp::RemoveShape { shape_id: sid(shape) }])
        .expect("apply");

    let mut expected = expected_removed
        .iter()
        .map(|id| ElementRef::Connector(cid(id)))
        .collect::<Vec<_>>();
    expected.insert(0, ElementRef::Shape(sid(shape)));
    assert_eq!(result.delta.removed, expected);

    assert_eq!(dag.connectors().len(), before - expected_removed.len());
    assert!(dag.dangling_connectors().is_empty());
    assert!(!dag.shapes().contains_key(&sid(shape)));
}

#[rstest]
fn failed_batch_leaves_document_untouched(mut dag: CanvasDocument) {
    let before = dag.clone();
    let ops = [
        CanvasOp::RemoveShape { shape_id: sid("a") },
        CanvasOp::AddConnector {
            connector_id: cid("zz"),
            connector: Connector::new(sid("b"), sid("ghost")),
        },
    ];

    let err = apply_canvas_ops(&mut dag, &ops).expect_err("dangling endpoint");
    assert_eq!(
        err,
        ApplyError::MissingEndpoint {
            connector_id: cid("zz"),
            shape_id: sid("ghost"),
        }
    );
    assert_eq!(err.kind(), ErrorKind::InvalidMutation);
    assert_eq!(dag, before);
}

#[rstest]
fn read_only_rejects_every_mutation(mut dag: CanvasDocument) {
    dag.set_read_only(true);
    let before = dag.clone();

    let err = apply_canvas_ops(
        &mut dag,
        &[CanvasOp::SetTitle {
            title: "Renamed".to_owned(),
        }],
    )
    .expect_err("read-only");
    assert_eq!(err.kind(), ErrorKind::ReadOnlyViolation);
    assert_eq!(dag, before);

    dag.set_read_only(false);
    apply_canvas_ops(
        &mut dag,
        &[CanvasOp::SetTitle {
            title: "Renamed".to_owned(),
        }],
    )
    .expect("writable again");
    assert_eq!(dag.title(), "Renamed");
}

#[rstest]
fn update_shape_patch_preserves_unrelated_fields(mut dag: CanvasDocument) {
    let result = apply_canvas_ops(
        &mut dag,
        &[CanvasOp::UpdateShape {
            shape_id: sid("a"),
            patch: ShapePatch {
                position: Some(Point::new(12.0, 34.0)),
                label: Some(None),
                ..ShapePatch::default()
            },
        }],
    )
    .expect("apply");
    assert_eq!(result.delta.updated, vec![ElementRef::Shape(sid("a"))]);

    let shape = &dag.shapes()[&sid("a")];
    assert_eq!(shape.position(), Point::new(12.0, 34.0));
    assert_eq!(shape.label(), None);
    assert_eq!(shape.style().fill.as_deref(), Some("#ffd"));
    assert_eq!(shape.properties().get("color").map(String::as_str), Some("yellow"));
}

#[rstest]
fn update_connector_retarget_must_resolve(mut dag: CanvasDocument) {
    let err = apply_canvas_ops(
        &mut dag,
        &[CanvasOp::UpdateConnector {
            connector_id: cid("ab"),
            patch: ConnectorPatch {
                to: Some(sid("nope")),
                ..ConnectorPatch::default()
            },
        }],
    )
    .expect_err("missing endpoint");
    assert_eq!(err.kind(), ErrorKind::InvalidMutation);

    apply_canvas_ops(
        &mut dag,
        &[CanvasOp::UpdateConnector {
            connector_id: cid("ab"),
            patch: ConnectorPatch {
                to: Some(sid("d")),
                label: Some(Some("owns".to_owned())),
                ..ConnectorPatch::default()
            },
        }],
    )
    .expect("retarget");
    let connector = &dag.connectors()[&cid("ab")];
    assert_eq!(connector.from(), &sid("a"));
    assert_eq!(connector.to(), &sid("d"));
    assert_eq!(connector.label(), Some("owns"));
}

#[rstest]
fn duplicate_and_unknown_ids_are_invalid_mutations(mut dag: CanvasDocument) {
    let err = apply_canvas_ops(
        &mut dag,
        &[CanvasOp::AddShape {
            shape_id: sid("a"),
            shape: Shape::new(ShapeKind::Sticky),
        }],
    )
    .expect_err("duplicate");
    assert_eq!(
        err,
        ApplyError::AlreadyExists {
            kind: ElementKind::Shape,
            element_id: "a".to_owned(),
        }
    );

    let err = apply_canvas_ops(&mut dag, &[CanvasOp::RemoveConnector { connector_id: cid("zz") }])
        .expect_err("unknown");
    assert_eq!(err.kind(), ErrorKind::InvalidMutation);
}

#[test]
fn self_loops_and_parallel_connectors_are_allowed() {
    let mut doc = CanvasDocument::new(did("m:multi"), "Multi");
    let ops = [
        CanvasOp::AddShape {
            shape_id: sid("a"),
            shape: Shape::new(ShapeKind::Concept),
        },
        CanvasOp::AddConnector {
            connector_id: cid("loop"),
            connector: Connector::new(sid("a"), sid("a")),
        },
        CanvasOp::AddConnector {
            connector_id: cid("loop2"),
            connector: Connector::new(sid("a"), sid("a")),
        },
    ];
    apply_canvas_ops(&mut doc, &ops).expect("apply");

    let result = apply_canvas_ops(&mut doc, &[CanvasOp::RemoveShape { shape_id: sid("a") }])
        .expect("remove");
    assert_eq!(result.delta.removed.len(), 3);
    assert!(doc.is_empty());
}

#[test]
fn shape_added_then_removed_in_one_batch_is_reported_removed() {
    let mut doc = CanvasDocument::new(did("m:1"), "Map");
    let result = apply_canvas_ops(
        &mut doc,
        &[
            CanvasOp::AddShape {
                shape_id: sid("tmp"),
                shape: Shape::new(ShapeKind::Text),
            },
            CanvasOp::RemoveShape { shape_id: sid("tmp") },
        ],
    )
    .expect("apply");
    assert!(result.delta.added.is_empty());
    assert_eq!(result.delta.removed, vec![ElementRef::Shape(sid("tmp"))]);
}

#[rstest]
#[case::front(0, &["new", "intro", "cell", "cell-p", "nucleus", "nucleus-li", "tissue"])]
#[case::middle(2, &["intro", "cell", "new", "cell-p", "nucleus", "nucleus-li", "tissue"])]
#[case::past_the_end(99, &["intro", "cell", "cell-p", "nucleus", "nucleus-li", "tissue", "new"])]
fn insert_block_at_top_level(
    mut bio: BlockDocument,
    #[case] index: usize,
    #[case] expected: &[&str],
) {
    apply_block_ops(
        &mut bio,
        &[BlockOp::InsertBlock {
            parent: None,
            index,
            block: Block::paragraph(bid("new"), "fresh"),
        }],
    )
    .expect("insert");

    let order = bio
        .blocks()
        .iter()
        .map(|block| block.id().to_string())
        .collect::<Vec<_>>();
    assert_eq!(order, expected);
}

#[rstest]
fn insert_block_rejects_ids_already_in_the_tree(mut bio: BlockDocument) {
    let block = Block::paragraph(bid("fresh"), "x")
        .with_children(vec![Block::paragraph(bid("nucleus-li-check"), "dup")]);
    let err = apply_block_ops(
        &mut bio,
        &[BlockOp::InsertBlock {
            parent: Some(bid("cell")),
            index: 0,
            block,
        }],
    )
    .expect_err("duplicate nested id");
    assert_eq!(err.kind(), ErrorKind::InvalidMutation);
    assert!(bio.find(&bid("fresh")).is_none());
}

#[rstest]
fn insert_block_under_unknown_parent_fails(mut bio: BlockDocument) {
    let err = apply_block_ops(
        &mut bio,
        &[BlockOp::InsertBlock {
            parent: Some(bid("ghost")),
            index: 0,
            block: Block::paragraph(bid("fresh"), "x"),
        }],
    )
    .expect_err("unknown parent");
    assert_eq!(
        err,
        ApplyError::NotFound {
            kind: ElementKind::Block,
            element_id: "ghost".to_owned(),
        }
    );
}

#[rstest]
fn remove_block_removes_subtree(mut bio: BlockDocument) {
    let result = apply_block_ops(&mut bio, &[BlockOp::RemoveBlock { block_id: bid("nucleus-li") }])
        .expect("remove");
    assert_eq!(
        result.delta.removed,
        vec![
            ElementRef::Block(bid("nucleus-li")),
            ElementRef::Block(bid("nucleus-li-check")),
        ]
    );
    assert_eq!(bio.block_count(), 5);
}

#[rstest]
fn reorder_into_own_descendant_is_cycle_rejected(mut bio: BlockDocument) {
    let before = bio.clone();
    let err = apply_block_ops(
        &mut bio,
        &[BlockOp::ReorderBlock {
            block_id: bid("nucleus-li"),
            new_parent: Some(bid("nucleus-li-check")),
            index: 0,
        }],
    )
    .expect_err("cycle");
    assert_eq!(err.kind(), ErrorKind::CycleRejected);
    assert_eq!(bio, before);

    let err = apply_block_ops(
        &mut bio,
        &[BlockOp::ReorderBlock {
            block_id: bid("nucleus-li"),
            new_parent: Some(bid("nucleus-li")),
            index: 0,
        }],
    )
    .expect_err("self parent");
    assert_eq!(err.kind(), ErrorKind::CycleRejected);
}

#[rstest]
fn reorder_moves_subtree_under_new_parent(mut bio: BlockDocument) {
    let result = apply_block_ops(
        &mut bio,
        &[BlockOp::ReorderBlock {
            block_id: bid("nucleus-li"),
            new_parent: Some(bid("intro")),
            index: 5,
        }],
    )
    .expect("reorder");
    assert_eq!(result.delta.updated, vec![ElementRef::Block(bid("nucleus-li"))]);

    let intro = bio.find(&bid("intro")).expect("intro");
    assert_eq!(intro.children().len(), 1);
    assert!(intro.contains(&bid("nucleus-li-check")));
    assert!(bio.duplicate_block_ids().is_empty());
    assert_eq!(bio.block_count(), 7);
}

#[rstest]
fn edit_content_and_retitle(mut bio: BlockDocument) {
    let result = apply_block_ops(
        &mut bio,
        &[
            BlockOp::EditContent {
                block_id: bid("nucleus-li-check"),
                content: vec![InlineSpan::plain("double-checked")],
            },
            BlockOp::SetTitle {
                title: "Cell biology".to_owned(),
            },
        ],
    )
    .expect("apply");
    assert_eq!(
        result.delta.updated,
        vec![ElementRef::Title, ElementRef::Block(bid("nucleus-li-check"))]
    );
    assert_eq!(bio.title(), "Cell biology");
    assert_eq!(
        bio.find(&bid("nucleus-li-check")).expect("block").plain_text(),
        "double-checked"
    );
}

#[rstest]
#[case::zero(0)]
#[case::seven(7)]
fn set_kind_rejects_out_of_range_heading(mut bio: BlockDocument, #[case] level: u8) {
    let err = apply_block_ops(
        &mut bio,
        &[BlockOp::SetKind {
            block_id: bid("intro"),
            kind: BlockKind::Heading { level },
        }],
    )
    .expect_err("bad level");
    assert_eq!(err.kind(), ErrorKind::InvalidMutation);
}

#[rstest]
fn read_only_note_rejects_edits(mut bio: BlockDocument) {
    bio.set_read_only(true);
    let err = apply_block_ops(&mut bio, &[BlockOp::RemoveBlock { block_id: bid("intro") }])
        .expect_err("read-only");
    assert_eq!(
        err,
        ApplyError::ReadOnly {
            document_id: did("n:bio")
        }
    );
}

#[rstest]
#[case::nan_position(CanvasOp::AddShape {
    shape_id: sid("n"),
    shape: Shape::new(ShapeKind::Concept).with_position(Point::new(f64::NAN, 0.0)),
})]
#[case::infinite_size(CanvasOp::AddShape {
    shape_id: sid("n"),
    shape: Shape::new(ShapeKind::Concept).with_size(Size::new(f64::INFINITY, 10.0)),
})]
#[case::patched_nan_position(CanvasOp::UpdateShape {
    shape_id: sid("a"),
    patch: ShapePatch {
        position: Some(Point::new(0.0, f64::NAN)),
        ..ShapePatch::default()
    },
})]
#[case::patched_negative_infinity(CanvasOp::UpdateShape {
    shape_id: sid("b"),
    patch: ShapePatch {
        size: Some(Size::new(40.0, f64::NEG_INFINITY)),
        ..ShapePatch::default()
    },
})]
fn non_finite_geometry_is_rejected(mut dag: CanvasDocument, #[case] op: CanvasOp) {
    let before = dag.clone();
    let err = apply_canvas_ops(&mut dag, &[op]).expect_err("non-finite");
    assert!(matches!(err, ApplyError::NonFiniteGeometry { .. }));
    assert_eq!(err.kind(), ErrorKind::InvalidMutation);
    assert_eq!(dag, before);
}

#[test]
fn insert_below_the_deepest_level_is_too_deep() {
    let mut doc = note_nested_chain(BlockDocument::MAX_DEPTH);
    let last = format!("d{}", BlockDocument::MAX_DEPTH);
    let parent_of_last = format!("d{}", BlockDocument::MAX_DEPTH - 1);

    apply_block_ops(
        &mut doc,
        &[BlockOp::InsertBlock {
            parent: Some(bid(&parent_of_last)),
            index: 1,
            block: Block::paragraph(bid("sibling"), "fits"),
        }],
    )
    .expect("last level still fits");

    let err = apply_block_ops(
        &mut doc,
        &[BlockOp::InsertBlock {
            parent: Some(bid(&last)),
            index: 0,
            block: Block::paragraph(bid("below"), "too deep"),
        }],
    )
    .expect_err("too deep");
    assert_eq!(
        err,
        ApplyError::TooDeep {
            block_id: bid("below"),
            depth: BlockDocument::MAX_DEPTH + 1,
        }
    );
    assert_eq!(doc.depth(), BlockDocument::MAX_DEPTH);
}

#[test]
fn reorder_counts_the_height_of_the_moved_subtree() {
    let mut doc = note_nested_chain(BlockDocument::MAX_DEPTH);
    apply_block_ops(
        &mut doc,
        &[BlockOp::InsertBlock {
            parent: None,
            index: 1,
            block: Block::paragraph(bid("pair"), "pair")
                .with_children(vec![Block::paragraph(bid("pair-child"), "child")]),
        }],
    )
    .expect("insert pair");

    let move_under = |level: usize| BlockOp::ReorderBlock {
        block_id: bid("pair"),
        new_parent: Some(bid(&format!("d{level}"))),
        index: 0,
    };

    let err = apply_block_ops(&mut doc, &[move_under(BlockDocument::MAX_DEPTH - 1)])
        .expect_err("too deep");
    assert_eq!(err.kind(), ErrorKind::InvalidMutation);
    assert_eq!(doc.level_of(&bid("pair")), Some(1));

    apply_block_ops(&mut doc, &[move_under(BlockDocument::MAX_DEPTH - 2)]).expect("fits");
    assert_eq!(doc.depth(), BlockDocument::MAX_DEPTH);
}
