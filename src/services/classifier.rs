//! 网站质量评估 - 业务能力层
//!
//! 对一张已抓取的 HTML 页面按评分表打分，输出"是否可改进"的结论
//! 和人类可读的原因列表。容忍畸形 HTML：解析器尽力而为，
//! 信号检测只会减少，永远不会报错。

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

/// 低代码建站平台标记，出现即视为业余站点的信号
static FREE_PLATFORM_MARKERS: phf::Set<&'static str> = phf::phf_set! {
    "wix.com",
    "weebly.com",
    "squarespace.com",
};

/// 现代前端框架标记（script 标签内出现即算）
const MODERN_FRAMEWORK_MARKERS: [&str; 4] = ["react", "vue", "angular", "next"];

static VIEWPORT_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="viewport"]"#).expect("选择器非法"));
static DESCRIPTION_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="description"]"#).expect("选择器非法"));
static ICON_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"link[rel*="icon"]"#).expect("选择器非法"));
static SCRIPT_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("script").expect("选择器非法"));
static TABLE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("选择器非法"));
static DIV_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("div").expect("选择器非法"));
static TITLE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("选择器非法"));
static ITEMTYPE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[itemtype]").expect("选择器非法"));
static ITEMSCOPE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[itemscope]").expect("选择器非法"));
static OG_META_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property^="og:"]"#).expect("选择器非法"));
static CANONICAL_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"link[rel="canonical"]"#).expect("选择器非法"));
static ROBOTS_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="robots"]"#).expect("选择器非法"));

/// 评估结论
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Verdict {
    /// 网站是否值得外联（问题足够多且不够现代）
    pub migliorabile: bool,
    /// 问题说明（最多 5 条，以 "; " 连接）
    pub note: String,
}

/// 网站质量评估器
///
/// 两个阈值在两个来源版本中取值不同，保持可配置：
/// - `positive_threshold`: 现代特征数达到该值时强制判定"不可改进"
/// - `problem_threshold`: 问题数达到该值时判定"可改进"
pub struct SiteClassifier {
    positive_threshold: usize,
    problem_threshold: usize,
}

impl SiteClassifier {
    pub fn new(positive_threshold: usize, problem_threshold: usize) -> Self {
        Self {
            positive_threshold,
            problem_threshold,
        }
    }

    /// 评估一张页面
    ///
    /// # 参数
    /// - `html`: 页面原始 HTML
    /// - `url`: 该页面的实际抓取地址（用于判断协议）
    pub fn assess(&self, html: &str, url: &str) -> Verdict {
        let mut reasons: Vec<&'static str> = Vec::new();
        let document = Html::parse_document(html);

        // 基础检查
        if !url.starts_with("https://") {
            reasons.push("assenza https");
        }
        if document.select(&VIEWPORT_SEL).next().is_none() {
            reasons.push("non responsive (viewport mancante)");
        }
        if document.select(&DESCRIPTION_SEL).next().is_none() {
            reasons.push("meta description mancante");
        }
        if document.select(&ICON_SEL).next().is_none() {
            reasons.push("favicon assente");
        }

        // 过时的技术栈（脚本 URL 上做模式匹配，最多记一条）
        let script_srcs: Vec<String> = document
            .select(&SCRIPT_SEL)
            .filter_map(|s| s.value().attr("src"))
            .map(|src| src.to_lowercase())
            .collect();
        for src in &script_srcs {
            if src.contains("jquery-1.") || src.contains("jquery1.") {
                reasons.push("usa jquery 1.x");
                break;
            }
            if src.contains("bootstrap") && (src.contains("3.") || src.contains("2.")) {
                reasons.push("bootstrap datato");
                break;
            }
        }

        // 表格布局
        let tables = document.select(&TABLE_SEL).count();
        let divs = document.select(&DIV_SEL).count();
        if tables > 5 && divs < 30 {
            reasons.push("layout a tabelle");
        }

        // 体积与内容量
        if html.len() > 400_000 {
            reasons.push("pagina pesante >400KB");
        }
        let text_content = visible_text(&document);
        if text_content.chars().count() < 200 {
            reasons.push("contenuti scarsi");
        }

        // 标题
        let title_text = document
            .select(&TITLE_SEL)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        if title_text.is_empty() {
            reasons.push("titolo mancante");
        } else if title_text.chars().count() < 10 {
            reasons.push("titolo troppo corto");
        }

        // 低代码建站平台
        let html_lower = html.to_lowercase();
        if FREE_PLATFORM_MARKERS
            .iter()
            .any(|marker| html_lower.contains(marker))
        {
            reasons.push("usa servizio gratuito");
        }

        // 现代特征（做得好的网站会有这些）
        let has_modern_framework = document.select(&SCRIPT_SEL).any(|s| {
            let serialized = s.html().to_lowercase();
            MODERN_FRAMEWORK_MARKERS
                .iter()
                .any(|marker| serialized.contains(marker))
        });
        let has_structured_data = document.select(&ITEMTYPE_SEL).next().is_some()
            || document.select(&ITEMSCOPE_SEL).next().is_some();
        let has_og_tags = document.select(&OG_META_SEL).next().is_some();
        let has_canonical = document.select(&CANONICAL_SEL).next().is_some();
        let has_robots_meta = document.select(&ROBOTS_SEL).next().is_some();

        let positive_indicators = [
            has_modern_framework,
            has_structured_data,
            has_og_tags,
            has_canonical,
            has_robots_meta,
        ]
        .iter()
        .filter(|b| **b)
        .count();

        // 现代特征足够多的网站永远不标记；
        // 否则问题数达到阈值即视为可改进
        let migliorabile = if positive_indicators >= self.positive_threshold {
            false
        } else {
            reasons.len() >= self.problem_threshold
        };

        let note = reasons
            .iter()
            .take(5)
            .copied()
            .collect::<Vec<_>>()
            .join("; ");

        Verdict { migliorabile, note }
    }
}

/// 可见文本内容（各文本节点去除首尾空白后以空格连接）
fn visible_text(document: &Html) -> String {
    document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
