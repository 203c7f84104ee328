//! 业务能力层（Services）
//!
//! 描述"我能做什么"，每个模块只提供一种能力：
//! - `city` - 从地址提取城市
//! - `email_extractor` - 从 HTML 提取邮箱候选
//! - `email_selector` - 按域名亲和度挑选邮箱
//! - `classifier` - 网站质量评估
//! - `fetcher` - 抓取单个页面
//! - `enricher` - 单张卡片的网站分析
//! - `filters` - 验收与去重
//! - `checkpoint` - 本地结果存档
//!
//! 本层不出现批次（Vec<CandidateCard>），不关心流程顺序。

pub mod checkpoint;
pub mod city;
pub mod classifier;
pub mod email_extractor;
pub mod email_selector;
pub mod enricher;
pub mod fetcher;
pub mod filters;

pub use checkpoint::{load_checkpoint, save_checkpoint};
pub use city::extract_city_from_address;
pub use classifier::{SiteClassifier, Verdict};
pub use email_extractor::extract_emails_from_html;
pub use email_selector::choose_best_email;
pub use enricher::SiteEnricher;
pub use fetcher::{HttpFetcher, PageFetcher};
pub use filters::{
    accept_records, apply_filters, dedup_records, filter_improvable, filter_with_email,
    FilterOrder,
};
