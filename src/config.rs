use crate::error::{AppResult, ConfigError};
use crate::services::filters::FilterOrder;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 每条查询最多抓取的卡片数量
    pub max_per_query: usize,
    /// 卡片之间的最小延迟（毫秒）
    pub min_delay_ms: u64,
    /// 卡片之间的最大延迟（毫秒）
    pub max_delay_ms: u64,
    /// 查询之间的固定停顿（毫秒）
    pub query_pause_ms: u64,
    /// 是否以可见窗口启动浏览器
    pub headful: bool,
    /// 网站分析的最大并发数
    pub max_concurrent: usize,
    /// 单页抓取超时（秒）
    pub fetch_timeout_secs: u64,
    // --- 分类阈值（两个来源版本不一致，保持可配置） ---
    /// 现代特征数达到该值时强制判定"不可改进"
    pub positive_threshold: usize,
    /// 问题数达到该值时判定"可改进"
    pub problem_threshold: usize,
    /// 过滤顺序（先验收后去重 / 先去重后验收）
    pub filter_order: FilterOrder,
    // --- 文件 ---
    /// 查询列表文件路径（JSON 或 TOML，留空使用内置列表）
    pub queries_file: String,
    /// 本地结果文件路径（留空则按时间戳生成）
    pub save_to: String,
    /// 从本地结果文件回放（跳过抓取阶段）
    pub load_from: String,
    // --- 表格存储 ---
    /// 目标表格 ID（留空则只保存本地结果）
    pub sheet_id: String,
    /// 工作表名称
    pub worksheet: String,
    /// 表格 API 访问令牌
    pub sheets_token: String,
    /// 写入最大尝试次数
    pub max_write_retries: usize,
    /// 写入重试基础延迟（毫秒）
    pub write_base_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_per_query: 8,
            min_delay_ms: 100,
            max_delay_ms: 300,
            query_pause_ms: 200,
            headful: false,
            max_concurrent: 10,
            fetch_timeout_secs: 8,
            positive_threshold: 3,
            problem_threshold: 1,
            filter_order: FilterOrder::AcceptThenDedup,
            queries_file: String::new(),
            save_to: String::new(),
            load_from: String::new(),
            sheet_id: String::new(),
            worksheet: "Sheet1".to_string(),
            sheets_token: String::new(),
            max_write_retries: 5,
            write_base_delay_ms: 2000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_per_query: std::env::var("MAX_PER_QUERY").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_per_query),
            min_delay_ms: std::env::var("MIN_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.min_delay_ms),
            max_delay_ms: std::env::var("MAX_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_delay_ms),
            query_pause_ms: std::env::var("QUERY_PAUSE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.query_pause_ms),
            headful: std::env::var("HEADFUL").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headful),
            max_concurrent: std::env::var("MAX_CONCURRENT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent),
            fetch_timeout_secs: std::env::var("FETCH_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.fetch_timeout_secs),
            positive_threshold: std::env::var("POSITIVE_THRESHOLD").ok().and_then(|v| v.parse().ok()).unwrap_or(default.positive_threshold),
            problem_threshold: std::env::var("PROBLEM_THRESHOLD").ok().and_then(|v| v.parse().ok()).unwrap_or(default.problem_threshold),
            filter_order: std::env::var("FILTER_ORDER").ok().and_then(|v| v.parse().ok()).unwrap_or(default.filter_order),
            queries_file: std::env::var("QUERIES_FILE").unwrap_or(default.queries_file),
            save_to: std::env::var("SAVE_TO").unwrap_or(default.save_to),
            load_from: std::env::var("LOAD_FROM").unwrap_or(default.load_from),
            sheet_id: std::env::var("SHEET_ID").unwrap_or(default.sheet_id),
            worksheet: std::env::var("WORKSHEET").unwrap_or(default.worksheet),
            sheets_token: std::env::var("SHEETS_TOKEN").unwrap_or(default.sheets_token),
            max_write_retries: std::env::var("MAX_WRITE_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_write_retries),
            write_base_delay_ms: std::env::var("WRITE_BASE_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.write_base_delay_ms),
        }
    }

    /// 校验配置，在任何工作开始之前快速失败
    pub fn validate(&self) -> AppResult<()> {
        if self.min_delay_ms > self.max_delay_ms {
            return Err(ConfigError::InvalidDelayRange {
                min_ms: self.min_delay_ms,
                max_ms: self.max_delay_ms,
            }
            .into());
        }
        if self.max_concurrent == 0 {
            return Err(ConfigError::InvalidConcurrency {
                value: self.max_concurrent,
            }
            .into());
        }
        // 不回放也没有表格目标时仍可运行（只保存本地结果），
        // 但配置了表格 ID 就必须有令牌
        if !self.sheet_id.is_empty() && self.sheets_token.is_empty() {
            return Err(ConfigError::MissingStoreToken.into());
        }
        Ok(())
    }

    /// 结果文件路径（未配置时按时间戳生成）
    pub fn resolve_save_path(&self) -> String {
        if self.save_to.is_empty() {
            format!(
                "results_{}.json",
                chrono::Local::now().format("%Y%m%d_%H%M%S")
            )
        } else {
            self.save_to.clone()
        }
    }
}
