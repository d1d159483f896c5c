// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt::Write as _;

use super::text::{escape_markup, fmt_num, truncate_with_ellipsis};
use crate::model::{CanvasDocument, Point, Shape, ShapeKind};

const MARGIN: f64 = 20.0;
const CHAR_WIDTH: f64 = 8.0;
const LINE_HEIGHT: f64 = 18.0;
const TEXT_PADDING: f64 = 16.0;
const DEFAULT_STROKE: &str = "#333333";
const DEFAULT_FILL: &str = "#ffffff";
const STICKY_FILL: &str = "#fff59d";

/// Renders a concept map as a standalone SVG document.
///
/// Connectors are drawn first (center to center) so shapes paint over them. The viewBox is fitted
/// to the shapes plus a fixed margin.
pub fn render_canvas_svg(canvas: &CanvasDocument) -> String {
    let (min_x, min_y, max_x, max_y) = bounds(canvas);
    let width = max_x - min_x + 2.0 * MARGIN;
    let height = max_y - min_y + 2.0 * MARGIN;

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" width="{}" height="{}" font-family="sans-serif" font-size="14">"#,
        fmt_num(min_x - MARGIN),
        fmt_num(min_y - MARGIN),
        fmt_num(width),
        fmt_num(height),
        fmt_num(width),
        fmt_num(height),
    );
    let _ = writeln!(out, "  <title>{}</title>", escape_markup(canvas.title()));

    for (connector_id, connector) in canvas.connectors() {
        let (Some(from), Some(to)) = (
            canvas.shapes().get(connector.from()),
            canvas.shapes().get(connector.to()),
        ) else {
            continue;
        };
        let a = center(from);
        let b = center(to);
        let stroke = connector.style().stroke.as_deref().unwrap_or(DEFAULT_STROKE);
        let _ = writeln!(
            out,
            r#"  <line data-id="{}" x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" />"#,
            escape_markup(connector_id.as_str()),
            fmt_num(a.x),
            fmt_num(a.y),
            fmt_num(b.x),
            fmt_num(b.y),
            escape_markup(stroke),
        );
        if let Some(label) = connector.label() {
            let _ = writeln!(
                out,
                r#"  <text x="{}" y="{}" text-anchor="middle">{}</text>"#,
                fmt_num((a.x + b.x) / 2.0),
                fmt_num((a.y + b.y) / 2.0),
                escape_markup(label),
            );
        }
    }

    for (shape_id, shape) in canvas.shapes() {
        let _ = writeln!(out, r#"  <g data-id="{}">"#, escape_markup(shape_id.as_str()));
        write_outline(&mut out, shape);
        write_label(&mut out, shape);
        out.push_str("  </g>\n");
    }

    out.push_str("</svg>\n");
    out
}

fn bounds(canvas: &CanvasDocument) -> (f64, f64, f64, f64) {
    let mut shapes = canvas.shapes().values();
    let Some(first) = shapes.next() else {
        return (0.0, 0.0, 0.0, 0.0);
    };
    let start = (
        first.position().x,
        first.position().y,
        first.position().x + first.size().width,
        first.position().y + first.size().height,
    );
    shapes.fold(start, |(min_x, min_y, max_x, max_y), shape| {
        let p = shape.position();
        let s = shape.size();
        (
            min_x.min(p.x),
            min_y.min(p.y),
            max_x.max(p.x + s.width),
            max_y.max(p.y + s.height),
        )
    })
}

fn center(shape: &Shape) -> Point {
    Point::new(
        shape.position().x + shape.size().width / 2.0,
        shape.position().y + shape.size().height / 2.0,
    )
}

fn write_outline(out: &mut String, shape: &Shape) {
    let p = shape.position();
    let s = shape.size();
    let stroke = escape_markup(shape.style().stroke.as_deref().unwrap_or(DEFAULT_STROKE));
    let default_fill = match shape.kind() {
        ShapeKind::Sticky => STICKY_FILL,
        _ => DEFAULT_FILL,
    };
    let fill = escape_markup(shape.style().fill.as_deref().unwrap_or(default_fill));

    let _ = match shape.kind() {
        ShapeKind::Ellipse => writeln!(
            out,
            r#"    <ellipse cx="{}" cy="{}" rx="{}" ry="{}" stroke="{stroke}" fill="{fill}" />"#,
            fmt_num(p.x + s.width / 2.0),
            fmt_num(p.y + s.height / 2.0),
            fmt_num(s.width / 2.0),
            fmt_num(s.height / 2.0),
        ),
        ShapeKind::Text => Ok(()),
        ShapeKind::Concept | ShapeKind::Rectangle | ShapeKind::Sticky => {
            let radius = if shape.kind() == ShapeKind::Concept { 8.0 } else { 0.0 };
            writeln!(
                out,
                r#"    <rect x="{}" y="{}" width="{}" height="{}" rx="{}" stroke="{stroke}" fill="{fill}" />"#,
                fmt_num(p.x),
                fmt_num(p.y),
                fmt_num(s.width),
                fmt_num(s.height),
                fmt_num(radius),
            )
        }
    };
}

fn write_label(out: &mut String, shape: &Shape) {
    let Some(label) = shape.label() else {
        return;
    };
    let lines = label.lines().collect::<Vec<_>>();
    if lines.is_empty() {
        return;
    }

    let c = center(shape);
    let max_chars = ((shape.size().width - TEXT_PADDING) / CHAR_WIDTH).max(1.0) as usize;
    let first_baseline = c.y - (lines.len() as f64 - 1.0) * LINE_HEIGHT / 2.0;

    let _ = write!(
        out,
        r#"    <text x="{}" y="{}" text-anchor="middle" dominant-baseline="middle">"#,
        fmt_num(c.x),
        fmt_num(first_baseline),
    );
    for (index, line) in lines.iter().enumerate() {
        let dy = if index == 0 { 0.0 } else { LINE_HEIGHT };
        let _ = write!(
            out,
            r#"<tspan x="{}" dy="{}">{}</tspan>"#,
            fmt_num(c.x),
            fmt_num(dy),
            escape_markup(&truncate_with_ellipsis(line, max_chars)),
        );
    }
    out.push_str("</text>\n");
}
