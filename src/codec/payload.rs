// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::DecodeError;
use crate::model::{
    Block, BlockDocument, BlockId, BlockKind, CanvasDocument, Connector, ConnectorId, DocumentId,
    Id, InlineSpan, Point, Shape, ShapeId, ShapeKind, Size, SpanStyles, Style,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CanvasPayloadJson {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    shapes: Vec<ShapeJson>,
    #[serde(default)]
    connectors: Vec<ConnectorJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ShapeJson {
    id: String,
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    position: PointJson,
    size: SizeJson,
    #[serde(default)]
    style: StyleJson,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PointJson {
    x: f64,
    y: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct SizeJson {
    width: f64,
    height: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StyleJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fill: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConnectorJson {
    id: String,
    from: String,
    to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default)]
    style: StyleJson,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BlockPayloadJson {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    blocks: Vec<BlockJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BlockJson {
    id: String,
    #[serde(flatten)]
    kind: BlockKindJson,
    #[serde(default)]
    content: Vec<InlineSpanJson>,
    #[serde(default)]
    children: Vec<BlockJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum BlockKindJson {
    Paragraph,
    Heading {
        level: u8,
    },
    BulletListItem,
    NumberedListItem,
    CheckListItem {
        #[serde(default)]
        checked: bool,
    },
    Quote,
    CodeBlock {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InlineSpanJson {
    text: String,
    #[serde(default, skip_serializing_if = "SpanStylesJson::is_plain")]
    styles: SpanStylesJson,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    link: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct SpanStylesJson {
    #[serde(default, skip_serializing_if = "is_false")]
    bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    strike: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    code: bool,
}

impl SpanStylesJson {
    fn is_plain(&self) -> bool {
        !(self.bold || self.italic || self.underline || self.strike || self.code)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn to_payload_value<T: Serialize>(payload: &T) -> Value {
    // Payload structs hold only strings, numbers, bools and string-keyed maps.
    serde_json::to_value(payload).expect("payload structs always serialize to JSON")
}

fn parse_id<T>(field: &'static str, value: String) -> Result<Id<T>, DecodeError> {
    Id::new(value.clone())
        .map_err(|err| DecodeError::malformed(format!("invalid {field} {value:?}: {err}")))
}

fn check_payload_id(expected: &DocumentId, found: String) -> Result<(), DecodeError> {
    let found: DocumentId = parse_id("document id", found)?;
    if &found != expected {
        return Err(DecodeError::malformed(format!(
            "payload belongs to document {found}, not {expected}"
        )));
    }
    Ok(())
}

fn style_to_json(style: &Style) -> StyleJson {
    StyleJson {
        stroke: style.stroke.clone(),
        fill: style.fill.clone(),
    }
}

fn style_from_json(style: StyleJson) -> Style {
    Style {
        stroke: style.stroke,
        fill: style.fill,
    }
}

pub(super) fn encode_canvas(doc: &CanvasDocument) -> Value {
    let payload = CanvasPayloadJson {
        id: doc.id().to_string(),
        title: doc.title().to_owned(),
        shapes: doc
            .shapes()
            .iter()
            .map(|(shape_id, shape)| ShapeJson {
                id: shape_id.to_string(),
                kind: shape.kind().as_str().to_owned(),
                label: shape.label().map(ToOwned::to_owned),
                position: PointJson {
                    x: shape.position().x,
                    y: shape.position().y,
                },
                size: SizeJson {
                    width: shape.size().width,
                    height: shape.size().height,
                },
                style: style_to_json(shape.style()),
                properties: shape.properties().clone(),
            })
            .collect(),
        connectors: doc
            .connectors()
            .iter()
            .map(|(connector_id, connector)| ConnectorJson {
                id: connector_id.to_string(),
                from: connector.from().to_string(),
                to: connector.to().to_string(),
                label: connector.label().map(ToOwned::to_owned),
                style: style_to_json(connector.style()),
                properties: connector.properties().clone(),
            })
            .collect(),
    };
    to_payload_value(&payload)
}

pub(super) fn decode_canvas(
    id: &DocumentId,
    payload: Value,
    revision: u64,
) -> Result<CanvasDocument, DecodeError> {
    let payload: CanvasPayloadJson = serde_json::from_value(payload)
        .map_err(|err| DecodeError::malformed(format!("canvas payload: {err}")))?;
    check_payload_id(id, payload.id)?;

    let mut doc = CanvasDocument::new(id.clone(), payload.title);
    doc.set_revision(revision);

    for shape_json in payload.shapes {
        let shape_id: ShapeId = parse_id("shape id", shape_json.id)?;
        let kind = shape_json
            .kind
            .parse::<ShapeKind>()
            .map_err(|err| DecodeError::malformed(err.to_string()))?;

        let mut shape = Shape::new(kind)
            .with_position(Point::new(shape_json.position.x, shape_json.position.y))
            .with_size(Size::new(shape_json.size.width, shape_json.size.height));
        shape.set_label(shape_json.label);
        shape.set_style(style_from_json(shape_json.style));
        *shape.properties_mut() = shape_json.properties;

        if doc.shapes_mut().insert(shape_id.clone(), shape).is_some() {
            return Err(DecodeError::malformed(format!("duplicate shape id {shape_id}")));
        }
    }

    for connector_json in payload.connectors {
        let connector_id: ConnectorId = parse_id("connector id", connector_json.id)?;
        let from: ShapeId = parse_id("connector endpoint", connector_json.from)?;
        let to: ShapeId = parse_id("connector endpoint", connector_json.to)?;

        let mut connector = Connector::new(from, to);
        connector.set_label(connector_json.label);
        connector.set_style(style_from_json(connector_json.style));
        *connector.properties_mut() = connector_json.properties;

        if doc
            .connectors_mut()
            .insert(connector_id.clone(), connector)
            .is_some()
        {
            return Err(DecodeError::malformed(format!(
                "duplicate connector id {connector_id}"
            )));
        }
    }

    if let Some(dangling) = doc.dangling_connectors().first() {
        return Err(DecodeError::malformed(format!(
            "connector {dangling} references a shape that does not exist"
        )));
    }

    Ok(doc)
}

fn block_kind_to_json(kind: &BlockKind) -> BlockKindJson {
    match kind {
        BlockKind::Paragraph => BlockKindJson::Paragraph,
        BlockKind::Heading { level } => BlockKindJson::Heading { level: *level },
        BlockKind::BulletListItem => BlockKindJson::BulletListItem,
        BlockKind::NumberedListItem => BlockKindJson::NumberedListItem,
        BlockKind::CheckListItem { checked } => BlockKindJson::CheckListItem { checked: *checked },
        BlockKind::Quote => BlockKindJson::Quote,
        BlockKind::CodeBlock { language } => BlockKindJson::CodeBlock {
            language: language.clone(),
        },
    }
}

fn block_kind_from_json(kind: BlockKindJson) -> Result<BlockKind, DecodeError> {
    Ok(match kind {
        BlockKindJson::Paragraph => BlockKind::Paragraph,
        BlockKindJson::Heading { level } => {
            if !(1..=BlockKind::MAX_HEADING_LEVEL).contains(&level) {
                return Err(DecodeError::malformed(format!(
                    "heading level {level} is outside 1..={}",
                    BlockKind::MAX_HEADING_LEVEL
                )));
            }
            BlockKind::Heading { level }
        }
        BlockKindJson::BulletListItem => BlockKind::BulletListItem,
        BlockKindJson::NumberedListItem => BlockKind::NumberedListItem,
        BlockKindJson::CheckListItem { checked } => BlockKind::CheckListItem { checked },
        BlockKindJson::Quote => BlockKind::Quote,
        BlockKindJson::CodeBlock { language } => BlockKind::CodeBlock { language },
    })
}

fn block_to_json(block: &Block) -> BlockJson {
    BlockJson {
        id: block.id().to_string(),
        kind: block_kind_to_json(block.kind()),
        content: block
            .content()
            .iter()
            .map(|span| InlineSpanJson {
                text: span.text.clone(),
                styles: SpanStylesJson {
                    bold: span.styles.bold,
                    italic: span.styles.italic,
                    underline: span.styles.underline,
                    strike: span.styles.strike,
                    code: span.styles.code,
                },
                link: span.link.clone(),
            })
            .collect(),
        children: block.children().iter().map(block_to_json).collect(),
    }
}

fn block_from_json(block: BlockJson) -> Result<Block, DecodeError> {
    let id: BlockId = parse_id("block id", block.id)?;
    let kind = block_kind_from_json(block.kind)?;
    let content = block
        .content
        .into_iter()
        .map(|span| InlineSpan {
            text: span.text,
            styles: SpanStyles {
                bold: span.styles.bold,
                italic: span.styles.italic,
                underline: span.styles.underline,
                strike: span.styles.strike,
                code: span.styles.code,
            },
            link: span.link,
        })
        .collect();
    let children = block
        .children
        .into_iter()
        .map(block_from_json)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Block::new(id, kind, content).with_children(children))
}

pub(super) fn encode_block(doc: &BlockDocument) -> Value {
    let payload = BlockPayloadJson {
        id: doc.id().to_string(),
        title: doc.title().to_owned(),
        blocks: doc.blocks().iter().map(block_to_json).collect(),
    };
    to_payload_value(&payload)
}

pub(super) fn decode_block(
    id: &DocumentId,
    payload: Value,
    revision: u64,
) -> Result<BlockDocument, DecodeError> {
    let payload: BlockPayloadJson = serde_json::from_value(payload)
        .map_err(|err| DecodeError::malformed(format!("block payload: {err}")))?;
    check_payload_id(id, payload.id)?;

    let blocks = payload
        .blocks
        .into_iter()
        .map(block_from_json)
        .collect::<Result<Vec<_>, _>>()?;

    let mut doc = BlockDocument::new(id.clone(), payload.title).with_blocks(blocks);
    doc.set_revision(revision);

    if let Some(duplicate) = doc.duplicate_block_ids().first() {
        return Err(DecodeError::malformed(format!("duplicate block id {duplicate}")));
    }
    if doc.depth() > BlockDocument::MAX_DEPTH {
        return Err(DecodeError::malformed(format!(
            "blocks nest {} levels deep (max {})",
            doc.depth(),
            BlockDocument::MAX_DEPTH
        )));
    }

    Ok(doc)
}
