// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use super::ids::{ConnectorId, DocumentId, ShapeId};

/// Visual primitive used to draw a [`Shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShapeKind {
    #[default]
    Concept,
    Rectangle,
    Ellipse,
    Text,
    Sticky,
}

impl ShapeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Concept => "concept",
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Text => "text",
            Self::Sticky => "sticky",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown shape kind: {value:?}")]
pub struct ParseShapeKindError {
    value: String,
}

impl FromStr for ShapeKind {
    type Err = ParseShapeKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "concept" => Ok(Self::Concept),
            "rectangle" => Ok(Self::Rectangle),
            "ellipse" => Ok(Self::Ellipse),
            "text" => Ok(Self::Text),
            "sticky" => Ok(Self::Sticky),
            other => Err(ParseShapeKindError {
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// NaN and infinities have no JSON form.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_finite(&self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: 160.0,
            height: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Style {
    pub stroke: Option<String>,
    pub fill: Option<String>,
}

/// A node of the concept map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shape {
    kind: ShapeKind,
    label: Option<String>,
    position: Point,
    size: Size,
    style: Style,
    properties: BTreeMap<String, String>,
}

impl Shape {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn labeled(kind: ShapeKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: ShapeKind) {
        self.kind = kind;
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label<T: Into<String>>(&mut self, label: Option<T>) {
        self.label = label.map(Into::into);
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.properties
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }
}

/// A directed edge between two shapes of the same document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connector {
    from: ShapeId,
    to: ShapeId,
    label: Option<String>,
    style: Style,
    properties: BTreeMap<String, String>,
}

impl Connector {
    pub fn new(from: ShapeId, to: ShapeId) -> Self {
        Self {
            from,
            to,
            label: None,
            style: Style::default(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn from(&self) -> &ShapeId {
        &self.from
    }

    pub fn to(&self) -> &ShapeId {
        &self.to
    }

    pub fn set_endpoints(&mut self, from: ShapeId, to: ShapeId) {
        self.from = from;
        self.to = to;
    }

    pub fn touches(&self, shape_id: &ShapeId) -> bool {
        &self.from == shape_id || &self.to == shape_id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label<T: Into<String>>(&mut self, label: Option<T>) {
        self.label = label.map(Into::into);
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.properties
    }
}

/// A concept map: shapes plus the connectors between them.
///
/// Collections are keyed by id so iteration order (and therefore snapshot
/// bytes) is deterministic. Writers outside the crate go through
/// [`crate::ops::apply_canvas_ops`], which keeps every connector endpoint
/// resolvable.
#[derive(Debug, Clone)]
pub struct CanvasDocument {
    id: DocumentId,
    title: String,
    shapes: BTreeMap<ShapeId, Shape>,
    connectors: BTreeMap<ConnectorId, Connector>,
    revision: u64,
    read_only: bool,
}

impl CanvasDocument {
    /// An empty map at revision 0.
    pub fn new(id: DocumentId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            shapes: BTreeMap::new(),
            connectors: BTreeMap::new(),
            revision: 0,
            read_only: false,
        }
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub(crate) fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn shapes(&self) -> &BTreeMap<ShapeId, Shape> {
        &self.shapes
    }

    pub(crate) fn shapes_mut(&mut self) -> &mut BTreeMap<ShapeId, Shape> {
        &mut self.shapes
    }

    pub fn connectors(&self) -> &BTreeMap<ConnectorId, Connector> {
        &self.connectors
    }

    pub(crate) fn connectors_mut(&mut self) -> &mut BTreeMap<ConnectorId, Connector> {
        &mut self.connectors
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.connectors.is_empty()
    }

    /// Connectors with `shape_id` as either endpoint.
    pub fn connectors_of<'a>(
        &'a self,
        shape_id: &'a ShapeId,
    ) -> impl Iterator<Item = (&'a ConnectorId, &'a Connector)> + 'a {
        self.connectors
            .iter()
            .filter(move |(_, connector)| connector.touches(shape_id))
    }

    pub fn neighbors<'a>(&'a self, shape_id: &'a ShapeId) -> BTreeSet<&'a ShapeId> {
        self.connectors_of(shape_id)
            .map(|(_, connector)| {
                if connector.from() == shape_id {
                    connector.to()
                } else {
                    connector.from()
                }
            })
            .collect()
    }

    pub fn dangling_connectors(&self) -> Vec<&ConnectorId> {
        self.connectors
            .iter()
            .filter(|(_, connector)| {
                !self.shapes.contains_key(connector.from())
                    || !self.shapes.contains_key(connector.to())
            })
            .map(|(id, _)| id)
            .collect()
    }
}

/// Structural equality: the session-local read-only flag is not part of the
/// document's content.
impl PartialEq for CanvasDocument {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.shapes == other.shapes
            && self.connectors == other.connectors
            && self.revision == other.revision
    }
}

#[cfg(test)]
mod tests {
    use super::{CanvasDocument, Connector, Point, Shape, ShapeKind, Size};
    use crate::model::{ConnectorId, DocumentId, ShapeId};

    fn sid(value: &str) -> ShapeId {
        ShapeId::new(value).expect("shape id")
    }

    #[test]
    fn new_document_is_empty_at_revision_zero() {
        let doc = CanvasDocument::new(DocumentId::new("m1").expect("doc id"), "Map");
        assert!(doc.is_empty());
        assert_eq!(doc.revision(), 0);
        assert!(!doc.is_read_only());
    }

    #[test]
    fn neighbors_follow_connectors_in_both_directions() {
        let mut doc = CanvasDocument::new(DocumentId::new("m1").expect("doc id"), "Map");
        for id in ["a", "b", "c"] {
            doc.shapes_mut().insert(sid(id), Shape::new(ShapeKind::Concept));
        }
        doc.connectors_mut().insert(
            ConnectorId::new("ab").expect("connector id"),
            Connector::new(sid("a"), sid("b")),
        );
        doc.connectors_mut().insert(
            ConnectorId::new("ca").expect("connector id"),
            Connector::new(sid("c"), sid("a")),
        );

        let a = sid("a");
        let neighbors = doc.neighbors(&a);
        assert_eq!(neighbors.len(), 2);
        assert!(doc.dangling_connectors().is_empty());

        let owned = doc
            .neighbors(&sid("a"))
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(owned, vec![sid("b"), sid("c")]);
        assert!(doc.neighbors(&sid("missing")).is_empty());
    }

    #[test]
    fn dangling_connectors_lists_unresolved_endpoints() {
        let mut doc = CanvasDocument::new(DocumentId::new("m1").expect("doc id"), "Map");
        doc.shapes_mut().insert(sid("a"), Shape::new(ShapeKind::Concept));
        let dangling = ConnectorId::new("a-gone").expect("connector id");
        doc.connectors_mut()
            .insert(dangling.clone(), Connector::new(sid("a"), sid("gone")));
        assert_eq!(doc.dangling_connectors(), vec![&dangling]);
    }

    #[test]
    fn geometry_finiteness() {
        assert!(Point::new(1.0, -2.5).is_finite());
        assert!(!Point::new(f64::NAN, 0.0).is_finite());
        assert!(Size::default().is_finite());
        assert!(!Size::new(10.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn read_only_flag_does_not_affect_equality() {
        let a = CanvasDocument::new(DocumentId::new("m1").expect("doc id"), "Map");
        let mut b = a.clone();
        b.set_read_only(true);
        assert_eq!(a, b);
    }

    #[test]
    fn shape_kind_round_trips_through_str() {
        for kind in [
            ShapeKind::Concept,
            ShapeKind::Rectangle,
            ShapeKind::Ellipse,
            ShapeKind::Text,
            ShapeKind::Sticky,
        ] {
            assert_eq!(kind.as_str().parse::<ShapeKind>(), Ok(kind));
        }
        assert!("hexagon".parse::<ShapeKind>().is_err());
    }
}
