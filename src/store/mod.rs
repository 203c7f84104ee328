//! 记录存储：接受成行写入的外部表格
//!
//! 存储端的错误按是否暂时性分类（见 `StoreError`），
//! 写入端据此决定重试还是立即失败。

pub mod sheets;
pub mod writer;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::StoreError;

/// 一行的单元格值，布局见 `BusinessRecord::to_row`
pub type Row = Vec<String>;

/// 可追加写入的表格存储
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 确保表头行存在（必要时补写）
    async fn ensure_header(&self) -> Result<(), StoreError>;

    /// 读取已存在的网站列（去重键集合）
    async fn read_existing_keys(&self) -> Result<HashSet<String>, StoreError>;

    /// 批量追加行
    async fn append_rows(&self, rows: Vec<Row>) -> Result<(), StoreError>;

    /// 当前行数（含表头），仅用于写入后的尽力核对
    async fn count_rows(&self) -> Result<usize, StoreError>;
}

pub use sheets::SheetsStore;
pub use writer::BatchWriter;
