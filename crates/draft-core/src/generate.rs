//! 外部图形生成服务的接入边界
//!
//! 生成服务根据自然语言提示返回一组宽松的图形描述（JSON）。
//! 这里负责补全缺省字段、校验，并且只在整个列表成功返回后才写入文档。

use crate::document::DocumentStore;
use crate::geometry::Geometry;
use crate::properties::Properties;
use crate::shape::ShapeId;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

/// 文本缺省字高
pub const DEFAULT_TEXT_FONT_SIZE: f64 = 12.0;

/// 符号缺省尺寸
pub const DEFAULT_SYMBOL_SIZE: f64 = 24.0;

/// 生成错误
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// 生成服务调用失败
    #[error("generation failed: {0}")]
    Failed(String),

    /// 生成服务没有返回任何图形
    #[error("generator returned no shapes")]
    Empty,

    /// 返回的描述全部无法解析
    #[error("no valid shape descriptors in response ({0} rejected)")]
    Malformed(usize),
}

/// 图形生成服务
#[async_trait::async_trait]
pub trait ShapeGenerator: Send + Sync {
    /// 根据提示生成图形描述
    async fn generate(&self, prompt: &str) -> Result<Vec<Value>, GenerateError>;
}

#[derive(Deserialize)]
struct Descriptor {
    #[serde(flatten)]
    geometry: Geometry,
    #[serde(default)]
    properties: Properties,
}

fn backfill(obj: &mut Map<String, Value>, key: &str, value: f64) {
    let missing = obj.get(key).map_or(true, Value::is_null);
    if missing {
        obj.insert(key.to_string(), Value::from(value));
    }
}

/// 规范化单个图形描述：补全缺省值后解析，无法解析时返回 `None`
///
/// 描述中的 `id` 被忽略，插入时总是分配新 id。
pub fn normalize_descriptor(value: &Value) -> Option<(Geometry, Properties)> {
    let mut obj = value.as_object()?.clone();
    obj.remove("id");
    match obj.get("type").and_then(Value::as_str) {
        Some("text") => backfill(&mut obj, "fontSize", DEFAULT_TEXT_FONT_SIZE),
        Some("symbol") => backfill(&mut obj, "size", DEFAULT_SYMBOL_SIZE),
        _ => {}
    }
    if obj.get("properties").is_some_and(Value::is_null) {
        obj.remove("properties");
    }

    match serde_json::from_value::<Descriptor>(Value::Object(obj)) {
        Ok(d) => Some((d.geometry, d.properties)),
        Err(err) => {
            warn!(%err, "skipping malformed shape descriptor");
            None
        }
    }
}

/// 调用生成服务并规范化结果，不修改文档
pub async fn fetch_shapes<G: ShapeGenerator + ?Sized>(
    generator: &G,
    prompt: &str,
) -> Result<Vec<(Geometry, Properties)>, GenerateError> {
    let values = generator.generate(prompt).await.map_err(|err| {
        warn!(%err, "shape generation failed");
        err
    })?;
    if values.is_empty() {
        warn!("shape generation returned nothing");
        return Err(GenerateError::Empty);
    }

    let items: Vec<_> = values.iter().filter_map(normalize_descriptor).collect();
    if items.is_empty() {
        return Err(GenerateError::Malformed(values.len()));
    }
    Ok(items)
}

/// 生成并插入图形（一个历史快照）
///
/// 失败时文档保持不变。
pub async fn generate_shapes<G: ShapeGenerator + ?Sized>(
    store: &mut DocumentStore,
    generator: &G,
    prompt: &str,
) -> Result<Vec<ShapeId>, GenerateError> {
    let items = fetch_shapes(generator, prompt).await?;
    let ids = store.add_shapes(items);
    info!(count = ids.len(), "inserted generated shapes");
    Ok(ids)
}
