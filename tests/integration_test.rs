//! 真实环境集成测试
//!
//! 默认忽略，需要手动运行：cargo test -- --ignored
//! 浏览器测试需要本机有 Chromium；表格测试需要配置
//! SHEET_ID 和 SHEETS_TOKEN 环境变量。

use maps_lead_scraper::browser::launch_browser;
use maps_lead_scraper::config::Config;
use maps_lead_scraper::infrastructure::JsExecutor;
use maps_lead_scraper::listing::{ListingSource, MapsListingSource};
use maps_lead_scraper::models::QuerySpec;
use maps_lead_scraper::services::{HttpFetcher, PageFetcher};
use maps_lead_scraper::store::{RecordStore, SheetsStore};
use maps_lead_scraper::utils::logging;

#[tokio::test]
#[ignore] // 需要本机浏览器
async fn test_browser_launch() {
    logging::init();

    let result = launch_browser(false).await;
    assert!(result.is_ok(), "应该能够启动浏览器");

    let (mut browser, _page) = result.unwrap();
    browser.close().await.expect("关闭浏览器失败");
}

#[tokio::test]
#[ignore] // 需要本机浏览器和网络
async fn test_fetch_cards_single_query() {
    logging::init();

    let config = Config::from_env();
    let (mut browser, page) = launch_browser(config.headful)
        .await
        .expect("启动浏览器失败");

    let listing = MapsListingSource::new(
        JsExecutor::new(page),
        config.min_delay_ms,
        config.max_delay_ms,
    );
    let query = QuerySpec::new("pasticceria artigianale", "Milano", 3);

    let cards = listing
        .fetch_cards(&query, config.max_per_query)
        .await
        .expect("抓取卡片失败");
    println!("找到 {} 张卡片", cards.len());
    for card in &cards {
        println!("  {} | {} | {}", card.name, card.address, card.website);
    }

    browser.close().await.expect("关闭浏览器失败");
}

#[tokio::test]
#[ignore] // 需要网络
async fn test_http_fetcher_real_site() {
    logging::init();

    let fetcher = HttpFetcher::new(8).expect("创建抓取器失败");
    let html = fetcher.fetch_html("https://example.com").await;
    assert!(html.is_some(), "应该能抓到 example.com");
}

#[tokio::test]
#[ignore] // 需要 SHEET_ID / SHEETS_TOKEN
async fn test_sheets_store_read_keys() {
    logging::init();

    let config = Config::from_env();
    assert!(!config.sheet_id.is_empty(), "需要设置 SHEET_ID");
    assert!(!config.sheets_token.is_empty(), "需要设置 SHEETS_TOKEN");

    let store = SheetsStore::from_config(&config).expect("创建存储失败");
    store.ensure_header().await.expect("初始化表头失败");
    let keys = store.read_existing_keys().await.expect("读取网站列失败");
    println!("表格中已有 {} 个网站", keys.len());
}
