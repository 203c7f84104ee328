//! 纯能力层测试：邮箱提取/挑选、质量评估、城市解析

use maps_lead_scraper::listing::maps::{parse_rating, parse_reviews};
use maps_lead_scraper::services::city::extract_city_from_address;
use maps_lead_scraper::services::classifier::SiteClassifier;
use maps_lead_scraper::services::email_extractor::extract_emails_from_html;
use maps_lead_scraper::services::email_selector::choose_best_email;
use maps_lead_scraper::services::filters::FilterOrder;

// ========== 邮箱提取 ==========

#[test]
fn test_extract_no_emails() {
    // 没有邮箱形状的文本返回空集合
    let html = "<html><body><p>Benvenuti nel nostro sito</p></body></html>";
    assert!(extract_emails_from_html(html).is_empty(), "应该没有邮箱");
}

#[test]
fn test_extract_literal_email() {
    let html = "scrivici a a@b.co per informazioni";
    let emails = extract_emails_from_html(html);
    assert!(
        emails.contains(&"a@b.co".to_string()),
        "应该提取到 a@b.co"
    );
}

#[test]
fn test_extract_dedup_and_sorted() {
    let html = "b@example.com a@example.com b@example.com";
    let emails = extract_emails_from_html(html);
    assert_eq!(emails.len(), 2, "重复邮箱应该去重");
    assert_eq!(emails[0], "a@example.com", "输出应该有序");
}

#[test]
fn test_extract_percent_decoded() {
    // 本地部分允许 %，匹配后整体做百分号解码
    let html = "contatto: info%2Bnewsletter@esempio.it";
    let emails = extract_emails_from_html(html);
    assert_eq!(emails, vec!["info+newsletter@esempio.it".to_string()]);
}

// ========== 邮箱挑选 ==========

#[test]
fn test_choose_prefers_same_domain_over_tracker() {
    let candidates = vec![
        "x@trackerdomain.com".to_string(),
        "info@example.com".to_string(),
    ];
    let chosen = choose_best_email(&candidates, "https://example.com");
    assert_eq!(chosen, "info@example.com", "应该优先同域邮箱");
}

#[test]
fn test_choose_drops_blacklisted_suffix() {
    let candidates = vec!["alert@errors.sentry.io".to_string()];
    assert_eq!(choose_best_email(&candidates, "https://example.com"), "");
}

#[test]
fn test_choose_drops_js_markers_and_long_local_part() {
    let candidates = vec![
        "bundle.min.js@cdn.example.com".to_string(),
        format!("{}@example.com", "a".repeat(41)),
    ];
    assert_eq!(choose_best_email(&candidates, "https://example.com"), "");
}

#[test]
fn test_choose_falls_back_to_common_provider() {
    let candidates = vec![
        "info@altrodominio.it".to_string(),
        "mario@gmail.com".to_string(),
    ];
    // 与网站不同域时，常见服务商优先于任意其他域
    let chosen = choose_best_email(&candidates, "https://esempio.it");
    assert_eq!(chosen, "mario@gmail.com");
}

#[test]
fn test_choose_first_survivor_when_no_preference() {
    let candidates = vec![
        "a@dominio-a.it".to_string(),
        "b@dominio-b.it".to_string(),
    ];
    let chosen = choose_best_email(&candidates, "https://esempio.it");
    assert_eq!(chosen, "a@dominio-a.it", "无偏好时取第一个幸存者");
}

#[test]
fn test_choose_empty_candidates() {
    assert_eq!(choose_best_email(&[], "https://example.com"), "");
}

// ========== 网站质量评估 ==========

#[test]
fn test_minimal_http_page_is_improvable() {
    let classifier = SiteClassifier::new(3, 1);
    let verdict = classifier.assess("<html><body></body></html>", "http://vecchio.it");
    assert!(verdict.migliorabile, "极简 http 页面应该可改进");
    assert!(
        verdict.note.contains("assenza https"),
        "原因里应该有 https 缺失: {}",
        verdict.note
    );
}

#[test]
fn test_modern_page_never_flagged() {
    // og + canonical + robots + itemscope + react 共 5 个现代特征，
    // 即使存在问题（http、内容少）也不标记
    let html = r#"<html><head>
        <meta property="og:title" content="x">
        <link rel="canonical" href="https://moderno.it/">
        <meta name="robots" content="index">
        <script src="/static/react.production.min.js"></script>
        </head><body itemscope></body></html>"#;
    let classifier = SiteClassifier::new(3, 1);
    let verdict = classifier.assess(html, "http://moderno.it");
    assert!(!verdict.migliorabile, "现代网站永远不标记");
}

#[test]
fn test_strict_problem_threshold_variant() {
    // 另一个来源版本的阈值：问题数要达到 5 才标记
    let classifier = SiteClassifier::new(3, 5);
    let html = r#"<html><head>
        <meta name="viewport" content="width=device-width">
        <meta name="description" content="descrizione del sito">
        <link rel="icon" href="/favicon.ico">
        <title>Pasticceria Artigianale Milano</title>
        </head><body><div>contenuto</div></body></html>"#;
    // 问题只有 http 和内容少，不到 5 个
    let verdict = classifier.assess(html, "http://quasiok.it");
    assert!(!verdict.migliorabile, "问题数低于阈值时不标记");
}

#[test]
fn test_note_capped_at_five_reasons() {
    let classifier = SiteClassifier::new(3, 1);
    let verdict = classifier.assess("<html><body></body></html>", "http://vuoto.it");
    assert!(verdict.migliorabile);
    assert!(
        verdict.note.matches("; ").count() <= 4,
        "原因最多 5 条: {}",
        verdict.note
    );
}

#[test]
fn test_table_layout_detected() {
    let tables = "<table></table>".repeat(6);
    let html = format!("<html><body>{}</body></html>", tables);
    let classifier = SiteClassifier::new(3, 1);
    let verdict = classifier.assess(&html, "https://tabelle.it");
    assert!(verdict.note.contains("layout a tabelle"), "{}", verdict.note);
}

#[test]
fn test_legacy_jquery_detected() {
    let html = r#"<html><head>
        <script src="/js/jquery-1.8.3.min.js"></script>
        </head><body></body></html>"#;
    let classifier = SiteClassifier::new(3, 1);
    let verdict = classifier.assess(html, "https://datato.it");
    assert!(verdict.note.contains("usa jquery 1.x"), "{}", verdict.note);
}

#[test]
fn test_malformed_html_does_not_panic() {
    let classifier = SiteClassifier::new(3, 1);
    let verdict = classifier.assess("<html><div><<<>>><p unclosed", "https://rotto.it");
    // 不崩溃，且 https 的页面不会出现 https 缺失的原因
    assert!(!verdict.note.contains("assenza https"));
}

// ========== 城市解析 ==========

#[test]
fn test_city_from_cap_pattern() {
    assert_eq!(
        extract_city_from_address("Via Roma, 123, 20100 Milano MI"),
        "Milano"
    );
}

#[test]
fn test_city_from_trailing_pattern() {
    assert_eq!(extract_city_from_address("Via Verdi 4, Gallarate VA"), "Gallarate");
}

#[test]
fn test_city_multi_word() {
    assert_eq!(
        extract_city_from_address("Viale Rinascita 8, 20092 Cinisello Balsamo MI"),
        "Cinisello Balsamo"
    );
}

#[test]
fn test_city_fallback_last_capitalized_word() {
    assert_eq!(extract_city_from_address("Via Dante 12 Legnano"), "Legnano");
}

#[test]
fn test_city_empty_address() {
    assert_eq!(extract_city_from_address(""), "");
}

// ========== 评分解析 ==========

#[test]
fn test_parse_rating_and_reviews() {
    let (rating, reviews) = parse_rating("4,5 stelle 32 recensioni");
    assert_eq!(rating, "4.5");
    assert_eq!(reviews, "32");
}

#[test]
fn test_parse_reviews_with_thousands_separator() {
    assert_eq!(parse_reviews("1.234 recensioni"), "1234");
}

#[test]
fn test_parse_rating_empty() {
    let (rating, reviews) = parse_rating("");
    assert_eq!(rating, "");
    assert_eq!(reviews, "");
}

// ========== 过滤顺序配置 ==========

#[test]
fn test_filter_order_from_str() {
    assert_eq!(
        "accept_then_dedup".parse::<FilterOrder>().unwrap(),
        FilterOrder::AcceptThenDedup
    );
    assert_eq!(
        "DEDUP_THEN_ACCEPT".parse::<FilterOrder>().unwrap(),
        FilterOrder::DedupThenAccept
    );
    assert!("boh".parse::<FilterOrder>().is_err());
}
