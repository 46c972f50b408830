//! SVG 导出
//!
//! 世界坐标直接作为 SVG 用户坐标（两者都是 Y 轴向下），
//! `viewBox` 取文档包围盒外扩边距。旋转角为视觉逆时针，
//! 而 SVG 的 `rotate()` 正角为顺时针，所以写出时取负。

use crate::error::FileError;
use draft_core::geometry::{Dimension, DimensionKind, Geometry, Text, TitleBlock};
use draft_core::intersect::describe_arc;
use draft_core::math::{midpoint, BoundingBox2, Point2};
use draft_core::properties::Properties;
use draft_core::shape::Shape;
use std::fmt::Write as _;
use std::path::Path;

/// 导出选项
#[derive(Debug, Clone)]
pub struct SvgOptions {
    /// 包围盒外扩边距（世界单位）
    pub margin: f64,
    /// 背景色，`None` 时透明
    pub background: Option<String>,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            margin: 10.0,
            background: None,
        }
    }
}

/// 标题栏字段布局：2 行 × 4 列
const TITLE_BLOCK_ROWS: usize = 2;
const TITLE_BLOCK_COLS: usize = 4;

/// XML 文本转义
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// 描边属性
fn stroke_attrs(props: &Properties, filled: bool) -> String {
    let fill = if filled && props.is_filled() {
        escape(&props.fill)
    } else {
        "none".to_string()
    };
    let mut attrs = format!(
        r#"stroke="{}" stroke-width="{}" fill="{}""#,
        escape(&props.color),
        props.stroke_width,
        fill
    );
    if let Some(dash) = props.line_type.dash_array(props.stroke_width) {
        attrs.push_str(&format!(r#" stroke-dasharray="{dash}""#));
    }
    attrs
}

/// 绕点旋转的 transform 属性（无旋转时为空）
fn rotate_attr(rotation: f64, pivot: Point2) -> String {
    if rotation == 0.0 {
        String::new()
    } else {
        format!(
            r#" transform="rotate({} {} {})""#,
            -rotation, pivot.x, pivot.y
        )
    }
}

fn write_line(svg: &mut String, a: Point2, b: Point2, attrs: &str) -> std::fmt::Result {
    writeln!(
        svg,
        r#"  <line x1="{}" y1="{}" x2="{}" y2="{}" {attrs}/>"#,
        a.x, a.y, b.x, b.y
    )
}

fn write_label(
    svg: &mut String,
    at: Point2,
    text: &str,
    font_size: f64,
    color: &str,
) -> std::fmt::Result {
    writeln!(
        svg,
        r#"  <text x="{}" y="{}" font-size="{}" fill="{}" text-anchor="middle" dominant-baseline="central">{}</text>"#,
        at.x,
        at.y,
        font_size,
        escape(color),
        escape(text)
    )
}

fn write_dimension(svg: &mut String, d: &Dimension, props: &Properties) -> std::fmt::Result {
    let attrs = stroke_attrs(props, false);
    for (a, b) in d.segments() {
        write_line(svg, a, b, &attrs)?;
    }
    let label_at = match d.sub_type {
        DimensionKind::Linear => {
            let (a, b) = d.dimension_line();
            midpoint(a, b)
        }
        DimensionKind::Radial | DimensionKind::Diameter => d.offset_point,
    };
    write_label(svg, label_at, &d.display_text(), d.font_size(), &props.color)
}

fn write_text(svg: &mut String, t: &Text, props: &Properties) -> std::fmt::Result {
    writeln!(
        svg,
        r#"  <text x="{}" y="{}" font-size="{}" fill="{}" dominant-baseline="hanging"{}>{}</text>"#,
        t.x,
        t.y,
        t.font_size,
        escape(&props.color),
        rotate_attr(t.rotation, t.anchor()),
        escape(&t.content)
    )
}

fn write_title_block(svg: &mut String, tb: &TitleBlock, props: &Properties) -> std::fmt::Result {
    let attrs = stroke_attrs(props, true);
    writeln!(svg, r#"  <g{}>"#, rotate_attr(tb.rotation, tb.center()))?;
    writeln!(
        svg,
        r#"  <rect x="{}" y="{}" width="{}" height="{}" {attrs}/>"#,
        tb.x, tb.y, tb.width, tb.height
    )?;

    let cell_w = tb.width / TITLE_BLOCK_COLS as f64;
    let cell_h = tb.height / TITLE_BLOCK_ROWS as f64;
    let line_attrs = stroke_attrs(props, false);
    for row in 1..TITLE_BLOCK_ROWS {
        let y = tb.y + cell_h * row as f64;
        write_line(
            svg,
            Point2::new(tb.x, y),
            Point2::new(tb.x + tb.width, y),
            &line_attrs,
        )?;
    }
    for col in 1..TITLE_BLOCK_COLS {
        let x = tb.x + cell_w * col as f64;
        write_line(
            svg,
            Point2::new(x, tb.y),
            Point2::new(x, tb.y + tb.height),
            &line_attrs,
        )?;
    }

    let data = &tb.data;
    let fields = [
        ("Company", &data.company),
        ("Project", &data.project),
        ("Sheet", &data.sheet),
        ("Scale", &data.scale),
        ("Revision", &data.revision),
        ("Drawn", &data.drawn_by),
        ("Checked", &data.checked_by),
        ("Date", &data.date),
    ];
    let font_size = cell_h * 0.3 * tb.font_scale.unwrap_or(1.0);
    let line_gap = font_size * tb.line_spacing.unwrap_or(1.2);
    let letter_spacing = tb
        .letter_spacing
        .map(|s| format!(r#" letter-spacing="{s}""#))
        .unwrap_or_default();
    for (i, (label, value)) in fields.iter().enumerate() {
        let x = tb.x + cell_w * (i % TITLE_BLOCK_COLS) as f64 + font_size * 0.4;
        let y = tb.y + cell_h * (i / TITLE_BLOCK_COLS) as f64 + font_size * 0.4;
        writeln!(
            svg,
            r#"  <text x="{x}" y="{y}" font-size="{}" fill="{}" dominant-baseline="hanging"{letter_spacing}><tspan>{label}</tspan><tspan x="{x}" dy="{line_gap}">{}</tspan></text>"#,
            font_size * 0.7,
            escape(&props.color),
            escape(value)
        )?;
    }
    writeln!(svg, "  </g>")
}

fn write_shape(svg: &mut String, shape: &Shape) -> std::fmt::Result {
    let props = &shape.properties;
    match &shape.geometry {
        Geometry::Line(l) => write_line(svg, l.p1, l.p2, &stroke_attrs(props, false)),
        Geometry::Rectangle(r) => writeln!(
            svg,
            r#"  <rect x="{}" y="{}" width="{}" height="{}" {}{}/>"#,
            r.x,
            r.y,
            r.width,
            r.height,
            stroke_attrs(props, true),
            rotate_attr(r.rotation, r.center())
        ),
        Geometry::Circle(c) => match c.arc_span() {
            Some((start, end)) => writeln!(
                svg,
                r#"  <path d="{}" {}/>"#,
                describe_arc(c.center(), c.r, start, end),
                stroke_attrs(props, false)
            ),
            None => writeln!(
                svg,
                r#"  <circle cx="{}" cy="{}" r="{}" {}/>"#,
                c.cx,
                c.cy,
                c.r,
                stroke_attrs(props, true)
            ),
        },
        Geometry::Dimension(d) => write_dimension(svg, d, props),
        Geometry::Text(t) => write_text(svg, t, props),
        Geometry::Symbol(s) => {
            let half = s.size / 2.0;
            writeln!(
                svg,
                r#"  <g{}><rect x="{}" y="{}" width="{}" height="{}" {}/></g>"#,
                rotate_attr(s.rotation, s.center()),
                s.x - half,
                s.y - half,
                s.size,
                s.size,
                stroke_attrs(props, true)
            )?;
            write_label(svg, s.center(), &s.name, s.size * 0.3, &props.color)
        }
        Geometry::TitleBlock(tb) => write_title_block(svg, tb, props),
    }
}

/// 导出为 SVG 文本
pub fn export_svg(shapes: &[Shape], options: &SvgOptions) -> Result<String, FileError> {
    let bounds = shapes
        .iter()
        .fold(BoundingBox2::empty(), |acc, s| acc.union(&s.geometry.bounding_box()));
    let view = if bounds.is_empty() {
        BoundingBox2::new(Point2::origin(), Point2::new(100.0, 100.0))
    } else {
        bounds.expanded(options.margin)
    };

    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="{} {} {w} {h}">"#,
        view.min.x,
        view.min.y,
        w = view.width(),
        h = view.height()
    )?;
    if let Some(bg) = &options.background {
        writeln!(
            svg,
            r#"  <rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
            view.min.x,
            view.min.y,
            view.width(),
            view.height(),
            escape(bg)
        )?;
    }
    for shape in shapes {
        write_shape(&mut svg, shape)?;
    }
    writeln!(svg, "</svg>")?;
    Ok(svg)
}

/// 导出 SVG 到文件
pub fn save_svg(shapes: &[Shape], path: &Path, options: &SvgOptions) -> Result<(), FileError> {
    let svg = export_svg(shapes, options)?;
    std::fs::write(path, svg)?;
    tracing::info!("Exported {} shapes to {}", shapes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use draft_core::geometry::{Circle, Line, Rectangle};
    use draft_core::properties::LineType;

    fn shape(geometry: Geometry) -> Shape {
        Shape::new(geometry, Properties::default())
    }

    #[test]
    fn test_empty_document() {
        let svg = export_svg(&[], &SvgOptions::default()).expect("Failed to export");
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="0 0 100 100""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_line_and_dash_array() {
        let mut line = shape(Geometry::Line(Line::new(
            Point2::new(0.0, 0.0),
            Point2::new(50.0, 0.0),
        )));
        line.properties = line.properties.with_line_type(LineType::Dashed);

        let svg = export_svg(&[line], &SvgOptions::default()).expect("Failed to export");
        assert!(svg.contains(r#"<line x1="0" y1="0" x2="50" y2="0""#));
        assert!(svg.contains(r#"stroke-dasharray="6 4""#));
        assert!(svg.contains(r#"viewBox="-10 -10 70 20""#));
    }

    #[test]
    fn test_arc_uses_path() {
        let arc = shape(Geometry::Circle(Circle::arc(
            Point2::new(0.0, 0.0),
            10.0,
            0.0,
            90.0,
        )));
        let full = shape(Geometry::Circle(Circle::new(Point2::new(0.0, 0.0), 10.0)));

        let svg = export_svg(&[arc, full], &SvgOptions::default()).expect("Failed to export");
        assert!(svg.contains("<path d=\"M 10 0 A 10 10 0 0 0"));
        assert!(svg.contains(r#"<circle cx="0" cy="0" r="10""#));
    }

    #[test]
    fn test_rotation_and_fill() {
        let mut rect = shape(Geometry::Rectangle(
            Rectangle::new(0.0, 0.0, 10.0, 20.0).with_rotation(30.0),
        ));
        rect.properties.fill = "#123456".to_string();

        let svg = export_svg(&[rect], &SvgOptions::default()).expect("Failed to export");
        assert!(svg.contains(r##"fill="#123456""##));
        assert!(svg.contains(r#"transform="rotate(-30 5 10)""#));
    }

    #[test]
    fn test_text_is_escaped() {
        let text = shape(Geometry::Text(Text::new(
            Point2::new(1.0, 2.0),
            "A < B & C",
            12.0,
        )));
        let svg = export_svg(&[text], &SvgOptions::default()).expect("Failed to export");
        assert!(svg.contains("A &lt; B &amp; C"));
    }

    #[test]
    fn test_save_svg() {
        let file_path = std::env::temp_dir().join("draftcad_test_export.svg");
        let dim = shape(Geometry::Dimension(Dimension::new(
            DimensionKind::Linear,
            Point2::new(0.0, 0.0),
            Point2::new(40.0, 0.0),
            Point2::new(20.0, -10.0),
        )));

        save_svg(&[dim], &file_path, &SvgOptions::default()).expect("Failed to save");
        let content = std::fs::read_to_string(&file_path).expect("Failed to read");
        assert!(content.contains(">40.00</text>"));

        std::fs::remove_file(&file_path).ok();
    }
}
