//! 日志工具模块
//!
//! 提供日志初始化和格式化输出的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::QuerySpec;

/// 初始化 tracing 日志（RUST_LOG 可覆盖，默认 info）
///
/// 重复调用无副作用，测试里可以随意调用。
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 启动地图业务抓取");
    info!("{}", "=".repeat(60));
    if config.sheet_id.is_empty() {
        info!("表格目标: (未配置，仅保存本地结果)");
    } else {
        info!("表格目标: {} / '{}'", config.sheet_id, config.worksheet);
    }
    info!("每条查询上限: {}", config.max_per_query);
    info!(
        "卡片延迟: {}-{} 毫秒",
        config.min_delay_ms, config.max_delay_ms
    );
    info!("网站分析最大并发: {}", config.max_concurrent);
    info!("Headless: {}", !config.headful);
}

/// 记录单条查询开始
pub fn log_query_start(idx: usize, total: usize, query: &QuerySpec) {
    info!("");
    info!(
        "🔄 查询 {}/{}: {} - {}",
        idx, total, query.keyword, query.city
    );
}

/// 记录抓取结束、进入结果处理阶段
pub fn log_processing_banner(total: usize) {
    info!("");
    info!("{}", "=".repeat(60));
    info!("🔄 处理结果");
    info!("{}", "=".repeat(60));
    info!("共找到业务: {} 条", total);
}

/// 记录整次运行完成
pub fn log_run_complete(save_path: &str) {
    info!("");
    info!("{}", "=".repeat(60));
    info!("✅ 运行完成!");
    info!("{}", "=".repeat(60));
    info!("本地结果: {}", save_path);
}
