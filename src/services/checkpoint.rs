//! 本地结果存档 - 业务能力层
//!
//! 每完成一条查询就把累计结果整体重写到本地 JSON 文件，
//! 后续查询或最终写入失败时，已完成的进度不会丢失。
//! 存档可以完整加载回内存（字段逐一还原），用于回放模式。

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::BusinessRecord;

/// 存档文件布局
#[derive(Debug, Serialize, Deserialize)]
struct Checkpoint {
    /// 写档时间（ISO-8601 UTC）
    timestamp: String,
    /// 记录总数
    total_records: usize,
    /// 完整字段的记录列表
    records: Vec<BusinessRecord>,
}

/// 把累计结果整体写入本地文件（幂等覆盖）
pub fn save_checkpoint(records: &[BusinessRecord], path: &str) -> AppResult<()> {
    let checkpoint = Checkpoint {
        timestamp: chrono::Utc::now().to_rfc3339(),
        total_records: records.len(),
        records: records.to_vec(),
    };
    let json = serde_json::to_string_pretty(&checkpoint)
        .map_err(|e| AppError::file_parse_failed(path, e))?;
    std::fs::write(path, json).map_err(|e| AppError::file_write_failed(path, e))?;
    info!("✅ 已保存 {} 条记录到 {}", records.len(), path);
    Ok(())
}

/// 从本地文件加载记录
pub fn load_checkpoint(path: &str) -> AppResult<Vec<BusinessRecord>> {
    let content =
        std::fs::read_to_string(path).map_err(|e| AppError::file_read_failed(path, e))?;
    let checkpoint: Checkpoint =
        serde_json::from_str(&content).map_err(|e| AppError::file_parse_failed(path, e))?;
    info!("✅ 已从 {} 加载 {} 条记录", path, checkpoint.records.len());
    Ok(checkpoint.records)
}
