//! 流程级测试：过滤、存档、重试写入、端到端场景

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use maps_lead_scraper::error::StoreError;
use maps_lead_scraper::models::{BusinessRecord, CandidateCard};
use maps_lead_scraper::orchestrator::EnrichmentOrchestrator;
use maps_lead_scraper::services::checkpoint::{load_checkpoint, save_checkpoint};
use maps_lead_scraper::services::fetcher::PageFetcher;
use maps_lead_scraper::services::filters::{
    accept_records, apply_filters, dedup_records, FilterOrder,
};
use maps_lead_scraper::services::{SiteClassifier, SiteEnricher};
use maps_lead_scraper::store::{BatchWriter, RecordStore, Row};

// ========== 测试替身 ==========

/// 固定映射的页面抓取器：不认识的 URL 一律抓取失败
struct MapFetcher {
    pages: HashMap<String, String>,
}

#[async_trait]
impl PageFetcher for MapFetcher {
    async fn fetch_html(&self, url: &str) -> Option<String> {
        self.pages.get(url).cloned()
    }
}

/// 可编程失败的表格存储
struct MockStore {
    /// 前多少次 append 返回暂时性错误
    fail_times: usize,
    attempts: AtomicUsize,
    rows: Mutex<Vec<Row>>,
}

impl MockStore {
    fn new(fail_times: usize) -> Self {
        Self {
            fail_times,
            attempts: AtomicUsize::new(0),
            rows: Mutex::new(Vec::new()),
        }
    }

    fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn stored_rows(&self) -> Vec<Row> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for MockStore {
    async fn ensure_header(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn read_existing_keys(&self) -> Result<HashSet<String>, StoreError> {
        Ok(HashSet::new())
    }

    async fn append_rows(&self, rows: Vec<Row>) -> Result<(), StoreError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.fail_times {
            return Err(StoreError::Transient("connessione interrotta".to_string()));
        }
        self.rows.lock().unwrap().extend(rows);
        Ok(())
    }

    async fn count_rows(&self) -> Result<usize, StoreError> {
        Ok(self.rows.lock().unwrap().len())
    }
}

fn record(website: &str, email: &str, migliorabile: bool) -> BusinessRecord {
    BusinessRecord {
        query: "centro estetico Milano".to_string(),
        business_keyword: "centro estetico".to_string(),
        city: "Milano".to_string(),
        name: "Test".to_string(),
        website: website.to_string(),
        email: email.to_string(),
        migliorabile,
        ..Default::default()
    }
}

// ========== 存档往返 ==========

#[test]
fn test_checkpoint_round_trip() {
    let records: Vec<BusinessRecord> = (0..4)
        .map(|i| {
            let mut r = record(&format!("https://sito{}.it", i), "info@sito.it", i % 2 == 0);
            r.name = format!("Business {}", i);
            r.note = "assenza https; contenuti scarsi".to_string();
            r.timestamp = "2025-05-01T10:00:00+00:00".to_string();
            r
        })
        .collect();

    let path = std::env::temp_dir().join(format!("scraper_checkpoint_{}.json", std::process::id()));
    let path_str = path.to_string_lossy().to_string();

    save_checkpoint(&records, &path_str).expect("保存存档失败");
    let loaded = load_checkpoint(&path_str).expect("加载存档失败");
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, records, "往返后每个字段都应该相等");
}

// ========== 去重 ==========

#[test]
fn test_dedup_is_idempotent_on_saturated_keys() {
    let records = vec![
        record("https://a.it", "a@a.it", true),
        record("https://b.it", "b@b.it", true),
    ];
    let mut seen = HashSet::new();
    let first = dedup_records(records.clone(), &mut seen);
    assert_eq!(first.len(), 2);

    // 用第一轮产出的键集合再跑一轮，产出必须为空
    let second = dedup_records(records, &mut seen);
    assert!(second.is_empty(), "饱和键集合上的第二轮应该为空");
}

#[test]
fn test_dedup_catches_in_batch_duplicates() {
    let records = vec![
        record("https://a.it", "a@a.it", true),
        record("https://a.it", "altro@a.it", true),
    ];
    let mut seen = HashSet::new();
    let unique = dedup_records(records, &mut seen);
    assert_eq!(unique.len(), 1, "同批次内靠后的重复也要拦下");
}

#[test]
fn test_dedup_keeps_empty_website() {
    let records = vec![
        record("", "a@a.it", true),
        record("", "b@b.it", true),
    ];
    let mut seen = HashSet::new();
    let unique = dedup_records(records, &mut seen);
    assert_eq!(unique.len(), 2, "无网站的记录不能按网站去重");
}

#[test]
fn test_dedup_respects_existing_store_keys() {
    let mut seen: HashSet<String> = ["https://a.it".to_string()].into_iter().collect();
    let records = vec![record("https://a.it", "a@a.it", true)];
    let unique = dedup_records(records, &mut seen);
    assert!(unique.is_empty(), "表格里已有的网站应该被去掉");
}

// ========== 验收 ==========

#[test]
fn test_acceptance_rejects_empty_email() {
    // 邮箱为空的记录无论是否可改进都被拒绝
    let accepted = accept_records(vec![record("https://a.it", "", true)]);
    assert!(accepted.is_empty());
}

#[test]
fn test_acceptance_rejects_not_improvable() {
    let accepted = accept_records(vec![record("https://a.it", "info@a.it", false)]);
    assert!(accepted.is_empty());
}

#[test]
fn test_acceptance_keeps_qualified() {
    let accepted = accept_records(vec![record("https://a.it", "info@a.it", true)]);
    assert_eq!(accepted.len(), 1);
}

#[test]
fn test_filter_order_variants_agree_on_simple_input() {
    let records = vec![
        record("https://a.it", "info@a.it", true),
        record("https://a.it", "info@a.it", true),
        record("https://b.it", "", true),
    ];
    let mut seen1 = HashSet::new();
    let out1 = apply_filters(records.clone(), &mut seen1, FilterOrder::AcceptThenDedup);
    let mut seen2 = HashSet::new();
    let out2 = apply_filters(records, &mut seen2, FilterOrder::DedupThenAccept);
    assert_eq!(out1.len(), 1);
    assert_eq!(out2.len(), 1);
}

// ========== 批量写入重试 ==========

#[tokio::test]
async fn test_writer_retries_transient_then_succeeds() {
    // 模拟 2 次暂时性失败后成功：恰好 3 次尝试，行不丢不重
    let store = MockStore::new(2);
    let writer = BatchWriter::new(5, 1);
    let records = vec![
        record("https://a.it", "info@a.it", true),
        record("https://b.it", "info@b.it", true),
    ];

    writer
        .write_records(&store, &records)
        .await
        .expect("写入应该最终成功");

    assert_eq!(store.attempts(), 3, "应该恰好尝试 3 次");
    let rows = store.stored_rows();
    assert_eq!(rows.len(), 2, "行不能丢也不能重复");
    assert_eq!(rows[0][2], "https://a.it", "第 3 列是网站");
    assert_eq!(rows[0][6], "no", "末列是未联系标记");
}

#[tokio::test]
async fn test_writer_gives_up_after_max_retries() {
    let store = MockStore::new(usize::MAX);
    let writer = BatchWriter::new(3, 1);
    let records = vec![record("https://a.it", "info@a.it", true)];

    let result = writer.write_records(&store, &records).await;
    assert!(result.is_err(), "重试耗尽后应该报错");
    assert_eq!(store.attempts(), 3);
    assert!(store.stored_rows().is_empty());
}

#[tokio::test]
async fn test_writer_empty_batch_is_noop() {
    let store = MockStore::new(0);
    let writer = BatchWriter::new(5, 1);
    writer
        .write_records(&store, &[])
        .await
        .expect("空批次应该直接成功");
    assert_eq!(store.attempts(), 0, "空批次不应该调用存储");
}

// ========== 端到端场景 ==========

/// 3 张卡片的完整流程：
/// - 无网站（email 空、不可改进）
/// - 现代 https 网站（5 个现代特征，永远不标记）
/// - 有问题的 http 网站 + 同域邮箱（唯一被接受）
#[tokio::test]
async fn test_end_to_end_three_cards() {
    let modern_html = r#"<html><head>
        <meta property="og:title" content="Moderno">
        <link rel="canonical" href="https://moderno.it/">
        <meta name="robots" content="index">
        <script src="/assets/react.production.min.js"></script>
        </head><body itemscope><div>sito moderno</div></body></html>"#;
    let old_html = r#"<html><body>
        <p>Siamo una bottega storica. Scrivici: info@vecchiosito.it</p>
        </body></html>"#;

    let mut pages = HashMap::new();
    pages.insert("https://moderno.it".to_string(), modern_html.to_string());
    pages.insert("http://vecchiosito.it".to_string(), old_html.to_string());
    let fetcher = Arc::new(MapFetcher { pages });

    let enricher = Arc::new(SiteEnricher::new(fetcher, SiteClassifier::new(3, 1)));
    let orchestrator = EnrichmentOrchestrator::new(enricher, 2);

    let card = |name: &str, website: &str| CandidateCard {
        query: "centro estetico Milano".to_string(),
        business_keyword: "centro estetico".to_string(),
        city: "Milano".to_string(),
        name: name.to_string(),
        website: website.to_string(),
        ..Default::default()
    };
    let cards = vec![
        card("Senza Sito", ""),
        card("Moderno", "https://moderno.it"),
        card("Vecchio", "http://vecchiosito.it"),
    ];

    let records = orchestrator.enrich_batch(cards).await;
    assert_eq!(records.len(), 3, "三张卡片都应该产出记录");

    // 无网站的记录：不发请求、不标记
    let senza = records.iter().find(|r| r.name == "Senza Sito").unwrap();
    assert!(senza.email.is_empty());
    assert!(!senza.migliorabile);
    assert!(senza.note.is_empty());

    // 现代网站：有问题也不标记
    let moderno = records.iter().find(|r| r.name == "Moderno").unwrap();
    assert!(!moderno.migliorabile);

    // 老网站：同域邮箱 + 可改进
    let vecchio = records.iter().find(|r| r.name == "Vecchio").unwrap();
    assert_eq!(vecchio.email, "info@vecchiosito.it");
    assert!(vecchio.migliorabile);
    assert!(vecchio.note.contains("assenza https"));

    // 过滤 + 写入
    let mut seen = HashSet::new();
    let accepted = apply_filters(records, &mut seen, FilterOrder::AcceptThenDedup);
    assert_eq!(accepted.len(), 1, "完整流程后应该只接受 1 条");
    assert_eq!(accepted[0].name, "Vecchio");

    let store = MockStore::new(0);
    let writer = BatchWriter::new(5, 1);
    writer
        .write_records(&store, &accepted)
        .await
        .expect("写入失败");
    let rows = store.stored_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "info@vecchiosito.it");
    assert_eq!(rows[0][2], "http://vecchiosito.it");
}

// ========== 查询加载 ==========

#[test]
fn test_load_queries_json_array() {
    let path = std::env::temp_dir().join(format!("queries_{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"[
            {"keyword": "parrucchiere", "city": "Milano", "max": 5},
            {"keyword": "", "city": "Milano"},
            {"keyword": "psicologo", "city": "Varese"}
        ]"#,
    )
    .unwrap();
    let queries =
        maps_lead_scraper::models::load_queries(&path.to_string_lossy(), 8).expect("加载失败");
    std::fs::remove_file(&path).ok();

    // 缺关键词的条目被跳过
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].keyword, "parrucchiere");
    assert_eq!(queries[0].max, 5);
    assert_eq!(queries[1].max, 8, "未指定 max 时使用默认上限");
}

#[test]
fn test_load_queries_toml() {
    let path = std::env::temp_dir().join(format!("queries_{}.toml", std::process::id()));
    std::fs::write(
        &path,
        r#"
[[queries]]
keyword = "centro estetico"
city = "Milano"
max = 3
"#,
    )
    .unwrap();
    let queries =
        maps_lead_scraper::models::load_queries(&path.to_string_lossy(), 8).expect("加载失败");
    std::fs::remove_file(&path).ok();

    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].search_term(), "centro estetico Milano");
    assert_eq!(queries[0].max, 3);
}

#[test]
fn test_load_queries_defaults_when_no_file() {
    let queries = maps_lead_scraper::models::load_queries("", 8).expect("加载失败");
    assert!(!queries.is_empty(), "空路径应该回落到内置查询列表");
    assert!(queries.iter().all(|q| q.max == 8));
}

// ========== 网站分析细节 ==========

#[test]
fn test_enricher_empty_website_makes_no_network_call() {
    // 空网站：不发请求，字段全空
    let fetcher = Arc::new(MapFetcher {
        pages: HashMap::new(),
    });
    let enricher = SiteEnricher::new(fetcher, SiteClassifier::new(3, 1));

    let card = CandidateCard {
        query: "estetista Gallarate".to_string(),
        business_keyword: "estetista".to_string(),
        city: "Gallarate".to_string(),
        name: "Nessun Sito".to_string(),
        ..Default::default()
    };
    let record = tokio_test::block_on(enricher.enrich(card));
    assert!(record.email.is_empty());
    assert!(!record.migliorabile);
    assert!(record.note.is_empty());
    assert_eq!(record.city, "Gallarate");
}

#[tokio::test]
async fn test_enricher_falls_back_to_contact_page() {
    // 首页抓取失败，联系页才有邮箱
    let contact_html = "<html><body><p>email: titolare@bottega.it</p></body></html>";
    let mut pages = HashMap::new();
    pages.insert(
        "https://bottega.it/contatti".to_string(),
        contact_html.to_string(),
    );
    let fetcher = Arc::new(MapFetcher { pages });
    let enricher = SiteEnricher::new(fetcher, SiteClassifier::new(3, 1));

    let card = CandidateCard {
        name: "Bottega".to_string(),
        city: "Milano".to_string(),
        website: "https://bottega.it".to_string(),
        ..Default::default()
    };
    let record = enricher.enrich(card).await;
    assert_eq!(record.email, "titolare@bottega.it");
}

#[tokio::test]
async fn test_enricher_resolves_city_from_address() {
    let fetcher = Arc::new(MapFetcher {
        pages: HashMap::new(),
    });
    let enricher = SiteEnricher::new(fetcher, SiteClassifier::new(3, 1));

    let card = CandidateCard {
        name: "Con Indirizzo".to_string(),
        city: "Milano".to_string(),
        address: "Via Manzoni 10, 21013 Gallarate VA".to_string(),
        ..Default::default()
    };
    let record = enricher.enrich(card).await;
    assert_eq!(record.city, "Gallarate", "地址里的城市优先于查询城市");
}
