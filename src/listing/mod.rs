//! 列表源：按查询产出候选卡片
//!
//! 列表源是单个有状态的浏览器会话，只能串行驱动；
//! 它合法地可以返回少于请求数量的卡片。

pub mod maps;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CandidateCard, QuerySpec};

/// 候选卡片的来源
#[async_trait]
pub trait ListingSource {
    /// 执行一条查询，最多返回 `min(query.max, cap)` 张卡片
    async fn fetch_cards(&self, query: &QuerySpec, cap: usize) -> Result<Vec<CandidateCard>>;
}

pub use maps::MapsListingSource;
