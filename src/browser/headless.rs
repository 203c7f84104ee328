use anyhow::Result;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::{AppError, BrowserError};

/// 浏览器 UA，与网站抓取端保持一致
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) \
    Chrome/120.0.0.0 Safari/537.36";

/// 启动浏览器并创建空白页面
///
/// # 参数
/// - `headful`: 是否以可见窗口启动（调试用）
pub async fn launch_browser(headful: bool) -> Result<(Browser, Page)> {
    info!("🚀 启动浏览器 (headless: {})...", !headful);

    let mut builder = BrowserConfig::builder();
    if !headful {
        builder = builder.new_headless_mode();
    }
    let config = builder
        .window_size(1300, 900)
        .args(vec![
            "--disable-gpu".to_string(),           // 无头模式下禁用 GPU
            "--no-sandbox".to_string(),            // 禁用沙盒，防止权限问题导致的崩溃
            "--disable-dev-shm-usage".to_string(), // 防止共享内存不足
            "--disable-blink-features=AutomationControlled".to_string(),
            format!("--user-agent={}", USER_AGENT),
        ])
        .build()
        .map_err(|e| {
            error!("配置浏览器失败: {}", e);
            anyhow::anyhow!("配置浏览器失败: {}", e)
        })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        AppError::Browser(BrowserError::LaunchFailed {
            source: Box::new(e),
        })
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建页面失败: {}", e);
        AppError::Browser(BrowserError::PageCreationFailed {
            source: Box::new(e),
        })
    })?;

    info!("✅ 浏览器就绪");
    Ok((browser, page))
}
