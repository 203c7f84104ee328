//! 查询列表加载 - 支持 JSON 与 TOML 两种格式
//!
//! JSON 接受两种形状：顶层数组，或带 `queries` 字段的对象。
//! TOML 使用 `[[queries]]` 表数组。
//! 缺少 keyword 或 city 的条目会被静默跳过。

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::query::{default_queries, QuerySpec};

/// 文件中的原始查询条目（字段均可缺省，加载时校验）
#[derive(Debug, Deserialize)]
struct RawQuery {
    #[serde(default)]
    keyword: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    max: Option<usize>,
}

/// 带 `queries` 字段的文件形状
#[derive(Debug, Deserialize)]
struct QueriesFile {
    #[serde(default)]
    queries: Vec<RawQuery>,
}

/// 加载查询列表
///
/// # 参数
/// - `path`: 查询文件路径，为空时使用内置列表
/// - `fallback_max`: 条目未指定 `max` 时的默认上限
pub fn load_queries(path: &str, fallback_max: usize) -> AppResult<Vec<QuerySpec>> {
    if path.is_empty() {
        return Ok(default_queries(fallback_max));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::file_read_failed(path, e))?;

    let raw = parse_raw_queries(path, &content)?;

    let mut parsed = Vec::new();
    for item in raw {
        let keyword = item.keyword.trim();
        let city = item.city.trim();
        if keyword.is_empty() || city.is_empty() {
            debug!("跳过无效查询条目 (keyword: {:?}, city: {:?})", keyword, city);
            continue;
        }
        parsed.push(QuerySpec::new(
            keyword,
            city,
            item.max.unwrap_or(fallback_max),
        ));
    }
    Ok(parsed)
}

/// 按扩展名解析查询文件
fn parse_raw_queries(path: &str, content: &str) -> AppResult<Vec<RawQuery>> {
    let is_toml = Path::new(path)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    if is_toml {
        let file: QueriesFile = toml::from_str(content)
            .map_err(|e| AppError::file_parse_failed(path, e))?;
        Ok(file.queries)
    } else {
        // JSON: 先尝试顶层数组，再尝试 { "queries": [...] }
        if let Ok(items) = serde_json::from_str::<Vec<RawQuery>>(content) {
            return Ok(items);
        }
        let file: QueriesFile = serde_json::from_str(content)
            .map_err(|e| AppError::file_parse_failed(path, e))?;
        Ok(file.queries)
    }
}
