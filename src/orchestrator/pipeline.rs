//! 主流程 - 编排层
//!
//! ## 职责
//!
//! 驱动完整的一次运行：加载查询 → 逐条查询抓取并并行分析 →
//! 每条查询后保存本地存档 → 全部查询结束后执行过滤与表格写入。
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有 Browser 的模块
//! - **串行查询**：列表源是单个有状态会话，不可并行
//! - **进度不丢**：每条查询后整体重写本地存档，后续失败可回放
//! - **共享状态收口**：去重键集合与存储句柄只在本模块被修改，
//!   且都在并行分析结束之后

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::JsExecutor;
use crate::listing::{ListingSource, MapsListingSource};
use crate::models::{load_queries, BusinessRecord, QuerySpec};
use crate::orchestrator::enrichment::EnrichmentOrchestrator;
use crate::services::{
    accept_records, apply_filters, load_checkpoint, save_checkpoint, HttpFetcher, SiteClassifier,
    SiteEnricher,
};
use crate::store::{BatchWriter, RecordStore, SheetsStore};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    /// 初始化应用：校验配置并输出启动信息
    ///
    /// 配置错误在这里快速失败，不产生任何副作用。
    pub fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;
        logging::log_startup(&config);
        Ok(Self { config })
    }

    /// 运行主流程
    pub async fn run(&self) -> Result<()> {
        let queries = load_queries(&self.config.queries_file, self.config.max_per_query)?;
        info!("待处理查询: {} 条", queries.len());
        for (i, q) in queries.iter().enumerate() {
            info!("  {}. {} - {} (max: {})", i + 1, q.keyword, q.city, q.max);
        }

        let save_path = self.config.resolve_save_path();

        // 回放模式：从本地存档加载，跳过抓取
        let all_records = if !self.config.load_from.is_empty() {
            info!("从本地文件回放: {}", self.config.load_from);
            load_checkpoint(&self.config.load_from)?
        } else if queries.is_empty() {
            warn!("没有可执行的查询");
            Vec::new()
        } else {
            let records = self.scrape_phase(&queries, &save_path).await?;
            if !records.is_empty() {
                save_checkpoint(&records, &save_path)?;
            }
            records
        };

        logging::log_processing_banner(all_records.len());
        if all_records.is_empty() {
            warn!("没有找到任何业务");
            return Ok(());
        }

        self.finalize(all_records, &save_path).await
    }

    /// 抓取阶段：启动浏览器，逐条查询执行
    async fn scrape_phase(
        &self,
        queries: &[QuerySpec],
        save_path: &str,
    ) -> Result<Vec<BusinessRecord>> {
        let fetcher = Arc::new(HttpFetcher::new(self.config.fetch_timeout_secs)?);
        let classifier = SiteClassifier::new(
            self.config.positive_threshold,
            self.config.problem_threshold,
        );
        let enricher = Arc::new(SiteEnricher::new(fetcher, classifier));
        let orchestrator = EnrichmentOrchestrator::new(enricher, self.config.max_concurrent);

        let (mut browser, page) = browser::launch_browser(self.config.headful).await?;
        let listing = MapsListingSource::new(
            JsExecutor::new(page),
            self.config.min_delay_ms,
            self.config.max_delay_ms,
        );

        let result = self
            .scrape_all(&listing, &orchestrator, queries, save_path)
            .await;

        if let Err(e) = browser.close().await {
            warn!("关闭浏览器失败（忽略）: {}", e);
        } else {
            info!("浏览器已关闭");
        }
        result
    }

    /// 逐条查询：抓卡片 → 并行分析 → 聚合 → 存档
    async fn scrape_all(
        &self,
        listing: &impl ListingSource,
        orchestrator: &EnrichmentOrchestrator,
        queries: &[QuerySpec],
        save_path: &str,
    ) -> Result<Vec<BusinessRecord>> {
        let mut all_records: Vec<BusinessRecord> = Vec::new();

        for (query_idx, query) in queries.iter().enumerate() {
            logging::log_query_start(query_idx + 1, queries.len(), query);

            let records = self.scrape_query(listing, orchestrator, query).await?;
            info!("本条查询找到 {} 条业务", records.len());
            all_records.extend(records);

            // 每条查询后整体重写存档，后续失败不丢进度
            if !all_records.is_empty() {
                save_checkpoint(&all_records, save_path)?;
                info!("进度已保存: 共 {} 条记录在 {}", all_records.len(), save_path);
            }

            if query_idx + 1 < queries.len() {
                sleep(Duration::from_millis(self.config.query_pause_ms)).await;
            }
        }

        Ok(all_records)
    }

    /// 单条查询：导航 → 等待结果 → 提取卡片 → 并行分析
    async fn scrape_query(
        &self,
        listing: &impl ListingSource,
        orchestrator: &EnrichmentOrchestrator,
        query: &QuerySpec,
    ) -> Result<Vec<BusinessRecord>> {
        let cards = listing
            .fetch_cards(query, self.config.max_per_query)
            .await?;
        if cards.is_empty() {
            return Ok(Vec::new());
        }

        info!(
            "并行分析 {} 个网站 (最多 {} 个同时进行)...",
            cards.len(),
            self.config.max_concurrent
        );
        Ok(orchestrator.enrich_batch(cards).await)
    }

    /// 收尾阶段：过滤 + 写入表格
    async fn finalize(&self, all_records: Vec<BusinessRecord>, save_path: &str) -> Result<()> {
        let checkpointed = all_records.len();

        // 未配置表格目标：只报告验收数量，本地存档即最终产物
        if self.config.sheet_id.is_empty() {
            let accepted = accept_records(all_records);
            warn!(
                "未配置 SHEET_ID: {} 条业务待上传 (已保存在 {})",
                accepted.len(),
                save_path
            );
            logging::log_run_complete(save_path);
            return Ok(());
        }

        info!("连接表格存储...");
        let store = SheetsStore::from_config(&self.config)?;
        store.ensure_header().await.context("初始化表头失败")?;

        let mut seen: HashSet<String> = store
            .read_existing_keys()
            .await
            .context("读取已有网站列失败")?;
        info!("表格中已有网站: {} 个", seen.len());

        let final_records = apply_filters(all_records, &mut seen, self.config.filter_order);
        if final_records.is_empty() {
            warn!("没有业务需要写入（全部被过滤或重复）");
            logging::log_run_complete(save_path);
            return Ok(());
        }

        info!("");
        info!("🔄 写入表格 (工作表 '{}')...", self.config.worksheet);
        let writer = BatchWriter::new(
            self.config.max_write_retries,
            self.config.write_base_delay_ms,
        );
        if let Err(e) = writer.write_records(&store, &final_records).await {
            error!(
                "❌ 写入最终失败，本地已保存 {} 条记录 ({}), 可用 LOAD_FROM 回放重试",
                checkpointed, save_path
            );
            return Err(e).context("表格写入失败");
        }

        info!("✅ 已写入 {} 条业务", final_records.len());
        logging::log_run_complete(save_path);
        Ok(())
    }
}
