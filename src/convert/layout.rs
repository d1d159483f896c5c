// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use crate::model::{CanvasDocument, Point, ShapeId, Size};

const CHAR_WIDTH: f64 = 8.0;
const LINE_HEIGHT: f64 = 18.0;
const PADDING: f64 = 16.0;
const MIN_WIDTH: f64 = 120.0;
const MAX_WIDTH: f64 = 320.0;
const H_GAP: f64 = 40.0;
const V_GAP: f64 = 80.0;

/// Size that fits `label` at the renderer's nominal font metrics.
pub(crate) fn size_for_label(label: &str) -> Size {
    let longest = label.lines().map(|line| line.chars().count()).max().unwrap_or(0);
    let lines = label.lines().count().max(1);
    let width = (longest as f64 * CHAR_WIDTH + 2.0 * PADDING).clamp(MIN_WIDTH, MAX_WIDTH);
    let height = lines as f64 * LINE_HEIGHT + 2.0 * PADDING;
    Size::new(width, height)
}

/// Deterministic layered layout, top-down.
///
/// - `order` is shape creation order and breaks ties inside a layer.
/// - `edges` must list parents before children (true for conversion output).
/// - A shape's layer is its longest distance from a shape with no incoming edge.
/// - Within a layer, shapes are sorted by the mean position of their parents (one downward sweep).
pub(crate) fn layered(
    canvas: &mut CanvasDocument,
    order: &[ShapeId],
    edges: &[(ShapeId, ShapeId)],
) {
    let rank = order
        .iter()
        .enumerate()
        .map(|(index, shape_id)| (shape_id.clone(), index))
        .collect::<BTreeMap<_, _>>();

    let mut layer_of = order
        .iter()
        .map(|shape_id| (shape_id.clone(), 0usize))
        .collect::<BTreeMap<_, _>>();
    let mut parents = BTreeMap::<ShapeId, Vec<ShapeId>>::new();
    for (from, to) in edges {
        let from_layer = layer_of.get(from).copied().unwrap_or(0);
        let to_layer = layer_of.get(to).copied().unwrap_or(0);
        layer_of.insert(to.clone(), to_layer.max(from_layer + 1));
        parents.entry(to.clone()).or_default().push(from.clone());
    }

    let max_layer = layer_of.values().copied().max().unwrap_or(0);
    let mut layers = vec![Vec::<ShapeId>::new(); max_layer + 1];
    for shape_id in order {
        let layer = layer_of.get(shape_id).copied().unwrap_or(0);
        layers[layer].push(shape_id.clone());
    }

    for layer_index in 1..layers.len() {
        let prev_positions = layers[layer_index - 1]
            .iter()
            .enumerate()
            .map(|(position, shape_id)| (shape_id.clone(), position))
            .collect::<BTreeMap<_, _>>();
        sort_layer_by_barycenter(&mut layers[layer_index], &prev_positions, &parents, &rank);
    }

    let mut top = 0.0;
    for layer in &layers {
        let sizes = layer
            .iter()
            .map(|shape_id| {
                canvas
                    .shapes()
                    .get(shape_id)
                    .map(|shape| size_for_label(shape.label().unwrap_or_default()))
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>();

        let total_width = sizes.iter().map(|size| size.width).sum::<f64>()
            + H_GAP * sizes.len().saturating_sub(1) as f64;
        let tallest = sizes.iter().map(|size| size.height).fold(0.0, f64::max);

        let mut left = -total_width / 2.0;
        for (shape_id, size) in layer.iter().zip(sizes) {
            if let Some(shape) = canvas.shapes_mut().get_mut(shape_id) {
                shape.set_position(Point::new(left, top));
                shape.set_size(size);
            }
            left += size.width + H_GAP;
        }
        top += tallest + V_GAP;
    }
}

fn sort_layer_by_barycenter(
    layer: &mut [ShapeId],
    prev_positions: &BTreeMap<ShapeId, usize>,
    parents: &BTreeMap<ShapeId, Vec<ShapeId>>,
    rank: &BTreeMap<ShapeId, usize>,
) {
    let barycenter = |shape_id: &ShapeId| {
        parents
            .get(shape_id)
            .map(|from| {
                from.iter()
                    .filter_map(|parent| prev_positions.get(parent).copied())
                    .fold((0usize, 0usize), |(sum, count), pos| (sum + pos, count + 1))
            })
            .and_then(|(sum, count)| (count > 0).then_some((sum, count)))
    };
    let rank_of = |shape_id: &ShapeId| rank.get(shape_id).copied().unwrap_or(usize::MAX);

    layer.sort_by(|a, b| match (barycenter(a), barycenter(b)) {
        (None, None) => rank_of(a).cmp(&rank_of(b)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (Some((sum_a, count_a)), Some((sum_b, count_b))) => {
            // sum_a/count_a vs sum_b/count_b without floats.
            let left = (sum_a as u128) * (count_b as u128);
            let right = (sum_b as u128) * (count_a as u128);
            left.cmp(&right).then_with(|| rank_of(a).cmp(&rank_of(b)))
        }
    });
}
