//! 并行网站分析 - 编排层
//!
//! 对一个批次的所有卡片并行运行网站分析，用 Semaphore 限制
//! 同时在途的数量。单个任务的失败在任务边界被捕获并记录，
//! 只丢弃该候选，不影响兄弟任务。

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use crate::models::{BusinessRecord, CandidateCard};
use crate::services::SiteEnricher;

/// 并行分析编排器
pub struct EnrichmentOrchestrator {
    enricher: Arc<SiteEnricher>,
    max_concurrent: usize,
}

impl EnrichmentOrchestrator {
    pub fn new(enricher: Arc<SiteEnricher>, max_concurrent: usize) -> Self {
        Self {
            enricher,
            max_concurrent,
        }
    }

    /// 分析一个批次的全部卡片
    ///
    /// 完成顺序不确定；返回前按卡片的提取顺序重排，
    /// 下游去重因此有确定的遍历顺序。
    pub async fn enrich_batch(&self, cards: Vec<CandidateCard>) -> Vec<BusinessRecord> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles = Vec::new();

        for (idx, card) in cards.into_iter().enumerate() {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                // 信号量在本函数内不会被关闭
                Err(_) => break,
            };
            let enricher = self.enricher.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let record = enricher.enrich(card).await;
                (idx, record)
            });
            handles.push((idx, handle));
        }

        let mut indexed: Vec<(usize, BusinessRecord)> = Vec::new();
        for (idx, handle) in handles {
            match handle.await {
                Ok((i, record)) => {
                    log_record(&record);
                    indexed.push((i, record));
                }
                Err(e) => {
                    // 任务崩溃只丢弃该候选
                    error!("  ✗ 卡片 {} 分析任务失败: {}", idx + 1, e);
                }
            }
        }

        indexed.sort_by_key(|(i, _)| *i);
        indexed.into_iter().map(|(_, record)| record).collect()
    }
}

fn log_record(record: &BusinessRecord) {
    if record.website.is_empty() {
        debug!("      {} - 无网站", record.name);
        return;
    }
    if record.email.is_empty() {
        info!("      {} - 未找到邮箱", record.name);
    } else {
        info!("      {} - 邮箱: {}", record.name, record.email);
    }
    if record.migliorabile {
        info!("      网站可改进: {}", record.note);
    } else {
        debug!("      网站状况良好");
    }
}
