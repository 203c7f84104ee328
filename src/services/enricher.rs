//! 网站分析 - 业务能力层
//!
//! 对单个候选卡片：抓取网站首页和少量可能的联系页，
//! 聚合邮箱提取与质量评估结果；一旦"有邮箱 + 判定可改进"
//! 同时满足就提前停止，减少抓取开销。
//!
//! 只处理单张卡片，不出现批次，不关心并发。

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use url::Url;

use crate::models::{BusinessRecord, CandidateCard};
use crate::services::city::extract_city_from_address;
use crate::services::classifier::SiteClassifier;
use crate::services::email_extractor::extract_emails_from_html;
use crate::services::email_selector::choose_best_email;
use crate::services::fetcher::PageFetcher;

/// 网站根之外要尝试的联系页路径，按顺序抓取
const CONTACT_PATHS: [&str; 4] = ["/contatti", "/contact", "/about", "/chi-siamo"];

/// 抓取循环的显式状态，每抓完一页检查一次
#[derive(Clone, Copy, Debug, Default)]
struct EnrichState {
    email_found: bool,
    migliorabile: bool,
}

impl EnrichState {
    /// 两个信号都满足时无需再抓后续页面
    fn is_satisfied(&self) -> bool {
        self.email_found && self.migliorabile
    }
}

/// 网站分析器
pub struct SiteEnricher {
    fetcher: Arc<dyn PageFetcher>,
    classifier: SiteClassifier,
}

impl SiteEnricher {
    pub fn new(fetcher: Arc<dyn PageFetcher>, classifier: SiteClassifier) -> Self {
        Self {
            fetcher,
            classifier,
        }
    }

    /// 分析一张卡片，产出最终业务记录
    ///
    /// 网站为空时不发起任何网络请求，直接返回
    /// (email="", migliorabile=false, note="")。
    pub async fn enrich(&self, card: CandidateCard) -> BusinessRecord {
        let resolved_city = {
            let extracted = extract_city_from_address(&card.address);
            if extracted.is_empty() {
                card.city.clone()
            } else {
                extracted
            }
        };
        let timestamp = Utc::now().to_rfc3339();

        if card.website.is_empty() {
            debug!("      [{}] 无网站，跳过分析", card.name);
            let mut record =
                BusinessRecord::from_card(card, String::new(), false, String::new(), timestamp);
            record.city = resolved_city;
            return record;
        }

        let website = normalize_website(&card.website);
        let (email, migliorabile, note) = self.analyze_site(&website).await;

        let mut record = BusinessRecord::from_card(card, email, migliorabile, note, timestamp);
        record.city = resolved_city;
        record
    }

    /// 抓取候选页面并聚合信号
    async fn analyze_site(&self, website: &str) -> (String, bool, String) {
        let mut emails: Vec<String> = Vec::new();
        let mut state = EnrichState::default();
        let mut note = String::new();

        for url in candidate_pages(website) {
            let html = match self.fetcher.fetch_html(&url).await {
                Some(html) => html,
                None => continue, // 单页失败不致命，试下一个候选页
            };

            // 邮箱只从第一张有产出的页面提取一次
            if emails.is_empty() {
                emails = extract_emails_from_html(&html);
                if !emails.is_empty() {
                    debug!("        找到 {} 个候选邮箱 ({})", emails.len(), url);
                    state.email_found = true;
                }
            }

            // 每张抓到的页面都评估；一旦判定可改进就保持该结论
            let verdict = self.classifier.assess(&html, &url);
            if verdict.migliorabile {
                state.migliorabile = true;
                note = verdict.note;
            } else if !state.migliorabile {
                note = verdict.note;
            }

            if state.is_satisfied() {
                break;
            }
        }

        let email = choose_best_email(&emails, website);
        (email, state.migliorabile, note)
    }
}

/// 规范化网站地址：缺少协议时默认 https
fn normalize_website(website: &str) -> String {
    if website.contains("://") {
        website.to_string()
    } else {
        format!("https://{}", website)
    }
}

/// 候选页面列表：网站本身 + 按根地址解析出的联系页
fn candidate_pages(website: &str) -> Vec<String> {
    let mut pages = vec![website.to_string()];
    if let Ok(parsed) = Url::parse(website) {
        if let Some(host) = parsed.host_str() {
            let base = format!("{}://{}", parsed.scheme(), host);
            for path in CONTACT_PATHS {
                pages.push(format!("{}{}", base, path));
            }
        }
    }
    pages
}
