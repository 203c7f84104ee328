//! # Maps Lead Scraper
//!
//! 从地图式列表源发现候选商家，抓取其网站提取联系邮箱并评估
//! 质量，过滤去重后把合格线索写入外部表格的 Rust 应用程序。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() / wait_until() 能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单张卡片/单个页面
//! - `SiteEnricher` - 单张卡片的网站分析能力
//! - `SiteClassifier` - 网站质量评估能力
//! - `extract_emails_from_html` / `choose_best_email` - 邮箱提取与挑选
//! - `filters` / `checkpoint` - 过滤与本地存档能力
//!
//! ### ③ 外部接口层（Listing / Store）
//! - `listing/` - 列表源：按查询产出候选卡片（浏览器驱动）
//! - `store/` - 记录存储：表格读键、补表头、带重试的批量追加
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/pipeline` - 主流程，串行查询、存档、收尾写入
//! - `orchestrator/enrichment` - 并行网站分析，Semaphore 限流
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod listing;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod store;
pub mod utils;

// 重新导出常用类型
pub use browser::launch_browser;
pub use config::Config;
pub use error::{AppError, AppResult, StoreError};
pub use infrastructure::JsExecutor;
pub use listing::{ListingSource, MapsListingSource};
pub use models::{BusinessRecord, CandidateCard, QuerySpec};
pub use orchestrator::{App, EnrichmentOrchestrator};
pub use services::{SiteClassifier, SiteEnricher};
pub use store::{BatchWriter, RecordStore, SheetsStore};
