//! DraftCAD 原生文档格式（JSON）
//!
//! 文档是图形对象组成的 JSON 数组，每个对象带 `id`、`type`、几何字段和 `properties`。
//! 读取时忽略未知字段；无法解析的条目记录警告后跳过。

use crate::error::FileError;
use draft_core::document::DocumentStore;
use draft_core::shape::Shape;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// 从 JSON 文本解析图形列表
pub fn from_json_str(text: &str) -> Result<Vec<Shape>, FileError> {
    parse_value(serde_json::from_str(text)?)
}

/// 从读取器解析图形列表
pub fn read_shapes(reader: impl Read) -> Result<Vec<Shape>, FileError> {
    parse_value(serde_json::from_reader(reader)?)
}

fn parse_value(value: Value) -> Result<Vec<Shape>, FileError> {
    let Value::Array(items) = value else {
        return Err(FileError::InvalidFormat(
            "document must be a JSON array of shapes".to_string(),
        ));
    };

    let total = items.len();
    let shapes: Vec<Shape> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Shape>(item) {
            Ok(shape) => Some(shape),
            Err(err) => {
                tracing::warn!(index, %err, "skipping unreadable shape");
                None
            }
        })
        .collect();

    if shapes.len() < total {
        tracing::warn!("{} of {} shapes could not be read", total - shapes.len(), total);
    }
    Ok(shapes)
}

/// 序列化为带缩进的 JSON 文本
pub fn to_json_string(shapes: &[Shape]) -> Result<String, FileError> {
    Ok(serde_json::to_string_pretty(shapes)?)
}

/// 保存图形到文件
pub fn save(shapes: &[Shape], path: &Path) -> Result<(), FileError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, shapes)?;
    writer.flush()?;

    tracing::info!("Saved {} shapes to {}", shapes.len(), path.display());
    Ok(())
}

/// 从文件加载图形（id 原样保留）
pub fn load(path: &Path) -> Result<Vec<Shape>, FileError> {
    let file = File::open(path)?;
    let shapes = read_shapes(BufReader::new(file))?;

    tracing::info!("Loaded {} shapes from {}", shapes.len(), path.display());
    Ok(shapes)
}

/// 加载文件并整体替换文档，返回通过校验的图形数量
pub fn load_into(store: &mut DocumentStore, path: &Path) -> Result<usize, FileError> {
    let shapes = load(path)?;
    Ok(store.load_shapes(shapes))
}

/// 让每个图形经过文档校验（丢弃非有限值、重复 id，规范化尺寸）
pub fn normalize_shapes(shapes: Vec<Shape>) -> Vec<Shape> {
    let mut store = DocumentStore::new(1);
    store.load_shapes(shapes);
    store.shapes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use draft_core::geometry::{Circle, Geometry, Line, Rectangle};
    use draft_core::math::Point2;
    use draft_core::properties::Properties;
    use draft_core::shape::ShapeId;

    fn sample() -> Vec<Shape> {
        vec![
            Shape::with_id(
                "line-1",
                Geometry::Line(Line::new(Point2::new(0.0, 0.0), Point2::new(100.0, 100.0))),
                Properties::default(),
            ),
            Shape::with_id(
                "arc-1",
                Geometry::Circle(Circle::arc(Point2::new(10.0, 10.0), 5.0, 0.0, 90.0)),
                Properties::default().with_color("#FF0000"),
            ),
        ]
    }

    #[test]
    fn test_save_load_roundtrip() {
        let file_path = std::env::temp_dir().join("draftcad_test_document.json");

        let shapes = sample();
        save(&shapes, &file_path).expect("Failed to save");
        let loaded = load(&file_path).expect("Failed to load");

        assert_eq!(loaded, shapes);
        assert_eq!(loaded[0].id, ShapeId::from("line-1"));

        std::fs::remove_file(&file_path).ok();
    }

    #[test]
    fn test_wire_format() {
        let json = r##"[
            {"id": "r", "type": "rectangle", "x": 1, "y": 2, "width": 3, "height": 4,
             "properties": {"color": "#00FF00", "strokeWidth": 2, "lineType": "dash-dot"},
             "layer": "ignored"},
            {"id": "p", "type": "line", "p1": {"x": 0, "y": 0}, "p2": {"x": 5, "y": 0}}
        ]"##;

        let shapes = from_json_str(json).expect("Failed to parse");
        assert_eq!(shapes.len(), 2);
        assert_eq!(
            shapes[0].geometry,
            Geometry::Rectangle(Rectangle::new(1.0, 2.0, 3.0, 4.0))
        );
        assert_eq!(shapes[0].properties.stroke_width, 2.0);
        // 缺省属性回填
        assert_eq!(shapes[1].properties, Properties::default());
    }

    #[test]
    fn test_unreadable_entries_are_skipped() {
        let json = r#"[{"id": "a", "type": "hexagon"}, {"id": "b", "type": "circle", "cx": 0, "cy": 0, "r": 2}]"#;
        let shapes = from_json_str(json).expect("Failed to parse");
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].id, ShapeId::from("b"));
    }

    #[test]
    fn test_not_an_array() {
        let result = from_json_str(r#"{"shapes": []}"#);
        assert!(matches!(result, Err(FileError::InvalidFormat(_))));
    }

    #[test]
    fn test_load_into_resets_history() {
        let file_path = std::env::temp_dir().join("draftcad_test_load_into.json");
        save(&sample(), &file_path).expect("Failed to save");

        let mut store = DocumentStore::default();
        store.add_shape(
            Geometry::Line(Line::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0))),
            Properties::default(),
        );
        let count = load_into(&mut store, &file_path).expect("Failed to load");

        assert_eq!(count, 2);
        assert!(!store.can_undo());
        assert!(store.contains(&ShapeId::from("arc-1")));

        std::fs::remove_file(&file_path).ok();
    }

    #[test]
    fn test_normalize_shapes() {
        let json = r#"[
            {"id": "a", "type": "rectangle", "x": 10, "y": 10, "width": -4, "height": 2},
            {"id": "a", "type": "circle", "cx": 0, "cy": 0, "r": 1}
        ]"#;
        let shapes = normalize_shapes(from_json_str(json).expect("Failed to parse"));

        assert_eq!(shapes.len(), 1);
        assert_eq!(
            shapes[0].geometry,
            Geometry::Rectangle(Rectangle::new(6.0, 10.0, 4.0, 2.0))
        );
    }
}
