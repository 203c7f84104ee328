//! 页面抓取 - 业务能力层
//!
//! 只负责"抓一个 URL 返回 HTML"。暂时性错误（不可达、超时、
//! 非成功状态）在这里吸收为 None，不向上传播。

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

/// 浏览器风格的 User-Agent，降低被简单反爬规则拦截的概率
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) \
    Chrome/120.0.0.0 Safari/537.36";

/// 页面抓取能力
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 抓取 URL 并返回 HTML；任何失败都折叠为 None
    async fn fetch_html(&self, url: &str) -> Option<String>;
}

/// 基于 reqwest 的抓取器
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// 创建抓取器
    ///
    /// # 参数
    /// - `timeout_secs`: 单页抓取超时（秒）
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                .parse()
                .context("Accept 头非法")?,
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            "it-IT,it;q=0.8,en;q=0.5".parse().context("语言头非法")?,
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("创建 HTTP 客户端失败")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_html(&self, url: &str) -> Option<String> {
        let resp = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                debug!("抓取失败 {}: {}", url, e);
                return None;
            }
        };
        let status = resp.status();
        if status.is_client_error() || status.is_server_error() {
            debug!("抓取 {} 返回 HTTP {}", url, status);
            return None;
        }
        match resp.text().await {
            Ok(text) if !text.is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                debug!("读取响应体失败 {}: {}", url, e);
                None
            }
        }
    }
}
