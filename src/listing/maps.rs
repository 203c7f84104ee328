//! 地图列表源 - 通过浏览器驱动地图搜索页
//!
//! 流程：导航到搜索页 → 关闭同意弹窗 → 滚动结果列表直到数量
//! 达标 → 逐张点开卡片提取字段。单张卡片失败只跳过该卡片，
//! 不中断整个批次。

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, ListingError};
use crate::infrastructure::JsExecutor;
use crate::listing::ListingSource;
use crate::models::{CandidateCard, QuerySpec};

/// 结果列表滚动的最大尝试次数
const MAX_SCROLL_ATTEMPTS: usize = 15;
/// 结果列表出现的等待上限（毫秒）
const FEED_TIMEOUT_MS: u64 = 15_000;

static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d.,]+").expect("数字正则非法"));
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("数字正则非法"));

/// 详情面板里读出的原始字段
#[derive(Debug, Default, Deserialize)]
struct RawCard {
    #[serde(default)]
    name: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    website: String,
    #[serde(default)]
    rating_label: String,
    #[serde(default)]
    reviews_text: String,
}

/// 地图列表源
///
/// 持有 JsExecutor（间接持有唯一的 Page），串行驱动。
pub struct MapsListingSource {
    executor: JsExecutor,
    min_delay_ms: u64,
    max_delay_ms: u64,
}

impl MapsListingSource {
    pub fn new(executor: JsExecutor, min_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            executor,
            min_delay_ms,
            max_delay_ms,
        }
    }

    /// 导航到查询的搜索页并等待结果列表出现
    async fn navigate(&self, term: &str) -> Result<()> {
        let url = format!(
            "https://www.google.com/maps/search/{}?hl=it",
            urlencoding::encode(term)
        );
        info!("  加载页面: {}", url);
        self.executor
            .page()
            .goto(url.as_str())
            .await
            .map_err(|e| AppError::navigation_failed(url.as_str(), e))?;

        self.dismiss_consent().await;

        let found = self
            .executor
            .wait_until(
                r#"document.querySelector("div[role='feed']") !== null"#,
                FEED_TIMEOUT_MS,
                200,
            )
            .await?;
        if !found {
            return Err(AppError::Listing(ListingError::FeedNotFound {
                query: term.to_string(),
            })
            .into());
        }
        info!("  ✅ 页面就绪");
        Ok(())
    }

    /// 关闭 Cookie 同意弹窗（没有弹窗时无事发生）
    async fn dismiss_consent(&self) {
        let js = r#"
            (() => {
                const labels = /Accetta tutto|Accetta|I agree|Rifiuta tutto|Rifiuta/i;
                const buttons = Array.from(document.querySelectorAll('button'));
                const target = buttons.find(b => labels.test(b.textContent || ''));
                if (target) { target.click(); return true; }
                return false;
            })()
        "#;
        match self.executor.eval(js).await {
            Ok(value) if value.as_bool().unwrap_or(false) => {
                debug!("  已关闭同意弹窗");
                sleep(Duration::from_millis(100)).await;
            }
            Ok(_) => {}
            Err(e) => debug!("  同意弹窗处理失败（忽略）: {}", e),
        }
    }

    /// 滚动结果列表，直到卡片数量达标或尝试次数用尽
    async fn ensure_results_loaded(&self, target: usize) -> Result<()> {
        for _ in 0..MAX_SCROLL_ATTEMPTS {
            if self.count_cards().await? >= target {
                break;
            }
            let scroll_js = r#"
                (() => {
                    const el = document.querySelector("div[role='feed']");
                    if (el) { el.scrollBy(0, el.scrollHeight * 2); }
                    return true;
                })()
            "#;
            if let Err(e) = self.executor.eval(scroll_js).await {
                debug!("  滚动失败（忽略）: {}", e);
            }
            sleep(Duration::from_millis(50)).await;
        }
        Ok(())
    }

    /// 当前已加载的卡片数量
    async fn count_cards(&self) -> Result<usize> {
        let value = self
            .executor
            .eval(r#"document.querySelectorAll("div[role='article']").length"#)
            .await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    /// 点开第 idx 张卡片并提取字段
    async fn extract_card(&self, idx: usize, query: &QuerySpec) -> Result<Option<CandidateCard>> {
        let click_js = format!(
            r#"
            (() => {{
                const cards = document.querySelectorAll("div[role='article']");
                if ({idx} >= cards.length) {{ return false; }}
                cards[{idx}].scrollIntoView();
                cards[{idx}].click();
                return true;
            }})()
            "#
        );
        let clicked = self.executor.eval(click_js).await?;
        if !clicked.as_bool().unwrap_or(false) {
            return Ok(None);
        }
        // 给详情面板留出渲染时间
        sleep(Duration::from_millis(50)).await;

        let read_js = r#"
            (() => {
                const text = (sel) => {
                    const el = document.querySelector(sel);
                    return el && el.textContent ? el.textContent.trim() : "";
                };
                const attr = (sel, name) => {
                    const el = document.querySelector(sel);
                    return (el && el.getAttribute(name)) || "";
                };
                return {
                    name: text("h1.DUwDvf"),
                    category: text("button.DkEaL"),
                    address: text("button[data-item-id*='address']"),
                    phone: text("button[data-item-id*='phone']"),
                    website: attr("a[data-item-id*='authority']", "href"),
                    rating_label: attr("span[aria-label*='stelle']", "aria-label"),
                    reviews_text: text("button[jsaction*='pane.rating.moreReviews']"),
                };
            })()
        "#;
        let raw: RawCard = self.executor.eval_as(read_js).await.map_err(|e| {
            AppError::Listing(ListingError::CardExtractionFailed {
                index: idx,
                source: e.into(),
            })
        })?;

        let (rating, _) = parse_rating(&raw.rating_label);
        let reviews = parse_reviews(&raw.reviews_text);

        Ok(Some(CandidateCard {
            query: query.search_term(),
            business_keyword: query.keyword.clone(),
            city: query.city.clone(),
            name: raw.name,
            category: raw.category,
            address: raw.address,
            phone: raw.phone,
            website: raw.website,
            rating,
            reviews,
        }))
    }

    /// 卡片之间的随机延迟，避免触发频率限制
    async fn pause_between_cards(&self) {
        let delay_ms = {
            let mut rng = rand::thread_rng();
            rng.gen_range(self.min_delay_ms..=self.max_delay_ms)
        };
        sleep(Duration::from_millis(delay_ms)).await;
    }
}

#[async_trait]
impl ListingSource for MapsListingSource {
    async fn fetch_cards(&self, query: &QuerySpec, cap: usize) -> Result<Vec<CandidateCard>> {
        let term = query.search_term();
        let target = query.max.min(cap);

        info!("导航到: {}", term);
        self.navigate(&term).await?;

        info!("加载结果 (目标: {})...", target);
        self.ensure_results_loaded(target).await?;

        let available = self.count_cards().await?;
        info!("找到 {} 张卡片", available);

        let total = target.min(available);
        let mut cards = Vec::new();
        for idx in 0..total {
            info!("  处理卡片 {}/{}...", idx + 1, total);
            match self.extract_card(idx, query).await {
                Ok(Some(card)) => {
                    info!("    ✓ {} - {}", display_name(&card), card.city);
                    cards.push(card);
                }
                Ok(None) => {
                    warn!("    ✗ 卡片 {} 不存在，跳过", idx + 1);
                }
                Err(e) => {
                    // 单张卡片失败只影响自己，批次继续
                    error!("    ✗ 卡片 {} 提取失败: {}", idx + 1, e);
                }
            }
            if idx + 1 < total {
                self.pause_between_cards().await;
            }
        }
        Ok(cards)
    }
}

fn display_name(card: &CandidateCard) -> &str {
    if card.name.is_empty() {
        "(无名称)"
    } else {
        &card.name
    }
}

/// 从评分标签（如 "4,5 stelle 32 recensioni"）解析评分和评论数
pub fn parse_rating(text: &str) -> (String, String) {
    let mut rating = String::new();
    let mut reviews = String::new();
    let mut matches = NUMERIC_RE.find_iter(text);
    if let Some(first) = matches.next() {
        rating = first.as_str().replace(',', ".");
    }
    if let Some(second) = matches.next() {
        reviews = second.as_str().to_string();
    }
    (rating, reviews)
}

/// 从评论数文本（如 "1.234 recensioni"）解析数字
pub fn parse_reviews(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let cleaned = text.replace('.', "");
    DIGITS_RE
        .find(&cleaned)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
