// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Canvas/block mutation helpers used by `apply_canvas_ops` and `apply_block_ops`.
/// Keeps `ops::mod` focused on public op types and orchestration.
fn apply_canvas_op(
    doc: &mut CanvasDocument,
    op: &CanvasOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        CanvasOp::AddShape { shape_id, shape } => {
            if doc.shapes().contains_key(shape_id) {
                return Err(ApplyError::AlreadyExists {
                    kind: ElementKind::Shape,
                    element_id: shape_id.to_string(),
                });
            }
            ensure_finite(shape_id, Some(shape.position()), Some(shape.size()))?;
            doc.shapes_mut().insert(shape_id.clone(), shape.clone());
            delta.record_added(ElementRef::Shape(shape_id.clone()));
            Ok(())
        }
        CanvasOp::UpdateShape { shape_id, patch } => {
            let Some(existing) = doc.shapes_mut().get_mut(shape_id) else {
                return Err(shape_not_found(shape_id));
            };
            ensure_finite(shape_id, patch.position, patch.size)?;

            if let Some(kind) = patch.kind {
                existing.set_kind(kind);
            }
            if let Some(label) = &patch.label {
                existing.set_label(label.clone());
            }
            if let Some(position) = patch.position {
                existing.set_position(position);
            }
            if let Some(size) = patch.size {
                existing.set_size(size);
            }
            if let Some(style) = &patch.style {
                existing.set_style(style.clone());
            }
            if let Some(properties) = &patch.properties {
                *existing.properties_mut() = properties.clone();
            }
            delta.record_updated(ElementRef::Shape(shape_id.clone()));
            Ok(())
        }
        CanvasOp::RemoveShape { shape_id } => {
            if doc.shapes_mut().remove(shape_id).is_none() {
                return Err(shape_not_found(shape_id));
            }
            let removed_connector_ids = doc
                .connectors_of(shape_id)
                .map(|(connector_id, _)| connector_id.clone())
                .collect::<Vec<_>>();
            doc.connectors_mut()
                .retain(|_, connector| !connector.touches(shape_id));
            for connector_id in removed_connector_ids {
                delta.record_removed(ElementRef::Connector(connector_id));
            }
            delta.record_removed(ElementRef::Shape(shape_id.clone()));
            Ok(())
        }
        CanvasOp::AddConnector {
            connector_id,
            connector,
        } => {
            if doc.connectors().contains_key(connector_id) {
                return Err(ApplyError::AlreadyExists {
                    kind: ElementKind::Connector,
                    element_id: connector_id.to_string(),
                });
            }
            ensure_endpoint(doc, connector_id, connector.from())?;
            ensure_endpoint(doc, connector_id, connector.to())?;
            doc.connectors_mut()
                .insert(connector_id.clone(), connector.clone());
            delta.record_added(ElementRef::Connector(connector_id.clone()));
            Ok(())
        }
        CanvasOp::UpdateConnector {
            connector_id,
            patch,
        } => {
            let Some(existing) = doc.connectors().get(connector_id) else {
                return Err(connector_not_found(connector_id));
            };

            let from = patch.from.clone().unwrap_or_else(|| existing.from().clone());
            let to = patch.to.clone().unwrap_or_else(|| existing.to().clone());
            ensure_endpoint(doc, connector_id, &from)?;
            ensure_endpoint(doc, connector_id, &to)?;

            let Some(existing) = doc.connectors_mut().get_mut(connector_id) else {
                return Err(connector_not_found(connector_id));
            };
            existing.set_endpoints(from, to);
            if let Some(label) = &patch.label {
                existing.set_label(label.clone());
            }
            if let Some(style) = &patch.style {
                existing.set_style(style.clone());
            }
            if let Some(properties) = &patch.properties {
                *existing.properties_mut() = properties.clone();
            }
            delta.record_updated(ElementRef::Connector(connector_id.clone()));
            Ok(())
        }
        CanvasOp::RemoveConnector { connector_id } => {
            if doc.connectors_mut().remove(connector_id).is_none() {
                return Err(connector_not_found(connector_id));
            }
            delta.record_removed(ElementRef::Connector(connector_id.clone()));
            Ok(())
        }
        CanvasOp::SetTitle { title } => {
            doc.set_title(title.clone());
            delta.record_updated(ElementRef::Title);
            Ok(())
        }
    }
}

fn ensure_endpoint(
    doc: &CanvasDocument,
    connector_id: &ConnectorId,
    shape_id: &ShapeId,
) -> Result<(), ApplyError> {
    if doc.shapes().contains_key(shape_id) {
        return Ok(());
    }
    Err(ApplyError::MissingEndpoint {
        connector_id: connector_id.clone(),
        shape_id: shape_id.clone(),
    })
}

fn shape_not_found(shape_id: &ShapeId) -> ApplyError {
    ApplyError::NotFound {
        kind: ElementKind::Shape,
        element_id: shape_id.to_string(),
    }
}

fn ensure_finite(
    shape_id: &ShapeId,
    position: Option<Point>,
    size: Option<Size>,
) -> Result<(), ApplyError> {
    let finite = position.map_or(true, |position| position.is_finite())
        && size.map_or(true, |size| size.is_finite());
    if finite {
        Ok(())
    } else {
        Err(ApplyError::NonFiniteGeometry {
            shape_id: shape_id.clone(),
        })
    }
}

/// Level of the deepest block once `height` levels hang under `parent`.
fn nested_depth(
    doc: &BlockDocument,
    parent: Option<&BlockId>,
    height: usize,
) -> Result<usize, ApplyError> {
    let parent_level = match parent {
        None => 0,
        Some(parent_id) => doc
            .level_of(parent_id)
            .ok_or_else(|| block_not_found(parent_id))?,
    };
    Ok(parent_level + height)
}

fn ensure_depth(block_id: &BlockId, depth: usize) -> Result<(), ApplyError> {
    if depth > BlockDocument::MAX_DEPTH {
        return Err(ApplyError::TooDeep {
            block_id: block_id.clone(),
            depth,
        });
    }
    Ok(())
}

fn connector_not_found(connector_id: &ConnectorId) -> ApplyError {
    ApplyError::NotFound {
        kind: ElementKind::Connector,
        element_id: connector_id.to_string(),
    }
}

fn block_not_found(block_id: &BlockId) -> ApplyError {
    ApplyError::NotFound {
        kind: ElementKind::Block,
        element_id: block_id.to_string(),
    }
}

fn apply_block_op(
    doc: &mut BlockDocument,
    op: &BlockOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        BlockOp::InsertBlock {
            parent,
            index,
            block,
        } => {
            let mut incoming = HashSet::new();
            for block_id in block.subtree_ids() {
                if !incoming.insert(block_id) || doc.find(block_id).is_some() {
                    return Err(ApplyError::AlreadyExists {
                        kind: ElementKind::Block,
                        element_id: block_id.to_string(),
                    });
                }
            }
            validate_heading_levels(block)?;
            let depth = nested_depth(doc, parent.as_ref(), block.height())?;
            ensure_depth(block.id(), depth)?;

            let Some(siblings) = doc.siblings_mut(parent.as_ref()) else {
                return Err(block_not_found(parent.as_ref().unwrap_or(block.id())));
            };
            let index = (*index).min(siblings.len());
            siblings.insert(index, block.clone());

            for block_id in block.subtree_ids() {
                delta.record_added(ElementRef::Block(block_id.clone()));
            }
            Ok(())
        }
        BlockOp::RemoveBlock { block_id } => {
            let Some((_, removed)) = doc.take(block_id) else {
                return Err(block_not_found(block_id));
            };
            for removed_id in removed.subtree_ids() {
                delta.record_removed(ElementRef::Block(removed_id.clone()));
            }
            Ok(())
        }
        BlockOp::ReorderBlock {
            block_id,
            new_parent,
            index,
        } => {
            let Some(moving) = doc.find(block_id) else {
                return Err(block_not_found(block_id));
            };
            if let Some(new_parent) = new_parent {
                if moving.contains(new_parent) {
                    return Err(ApplyError::CycleRejected {
                        block_id: block_id.clone(),
                        new_parent: new_parent.clone(),
                    });
                }
            }
            let depth = nested_depth(doc, new_parent.as_ref(), moving.height())?;
            ensure_depth(block_id, depth)?;

            let Some((_, moved)) = doc.take(block_id) else {
                return Err(block_not_found(block_id));
            };
            let Some(siblings) = doc.siblings_mut(new_parent.as_ref()) else {
                return Err(block_not_found(block_id));
            };
            let index = (*index).min(siblings.len());
            siblings.insert(index, moved);

            delta.record_updated(ElementRef::Block(block_id.clone()));
            Ok(())
        }
        BlockOp::EditContent { block_id, content } => {
            let Some(block) = doc.find_mut(block_id) else {
                return Err(block_not_found(block_id));
            };
            block.set_content(content.clone());
            delta.record_updated(ElementRef::Block(block_id.clone()));
            Ok(())
        }
        BlockOp::SetKind { block_id, kind } => {
            check_heading_level(block_id, kind)?;
            let Some(block) = doc.find_mut(block_id) else {
                return Err(block_not_found(block_id));
            };
            block.set_kind(kind.clone());
            delta.record_updated(ElementRef::Block(block_id.clone()));
            Ok(())
        }
        BlockOp::SetTitle { title } => {
            doc.set_title(title.clone());
            delta.record_updated(ElementRef::Title);
            Ok(())
        }
    }
}

fn validate_heading_levels(block: &Block) -> Result<(), ApplyError> {
    check_heading_level(block.id(), block.kind())?;
    block.children().iter().try_for_each(validate_heading_levels)
}

fn check_heading_level(block_id: &BlockId, kind: &BlockKind) -> Result<(), ApplyError> {
    match kind.heading_level() {
        Some(level) if !(1..=BlockKind::MAX_HEADING_LEVEL).contains(&level) => {
            Err(ApplyError::InvalidHeadingLevel {
                block_id: block_id.clone(),
                level,
            })
        }
        _ => Ok(()),
    }
}
