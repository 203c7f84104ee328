//! 邮箱挑选 - 业务能力层
//!
//! 对提取出的候选邮箱按域名亲和度排序，输入相同则输出相同
//! （候选列表按提取端的排序传入，先遇到者优先）。

use url::Url;

/// 追踪/监控类 SaaS 域名，这类地址不是商家联系方式
static BLACKLIST_DOMAINS: phf::Set<&'static str> = phf::phf_set! {
    "wixpress.com",
    "sentry-next.wixpress.com",
    "sentry.io",
};

/// 常见公共邮箱服务商
static COMMON_PROVIDERS: phf::Set<&'static str> = phf::phf_set! {
    "gmail.com",
    "outlook.com",
    "hotmail.com",
    "yahoo.it",
    "yahoo.com",
    "virgilio.it",
};

/// 取邮箱的域名部分（小写），格式非法时返回空
fn domain_of(email: &str) -> String {
    let lower = email.to_lowercase();
    let mut parts = lower.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(domain), None) => domain.to_string(),
        _ => String::new(),
    }
}

/// 按策略挑选最佳邮箱，依次为：
/// 1. 过滤：本地部分超长、域名为空、黑名单域名（含后缀匹配）、携带 .js 标记
/// 2. 优先与网站同域的地址
/// 3. 其次常见公共服务商
/// 4. 否则取过滤后的第一个
///
/// 没有幸存者时返回空字符串。
pub fn choose_best_email(candidates: &[String], website: &str) -> String {
    if candidates.is_empty() {
        return String::new();
    }

    let site_domain = if website.is_empty() {
        String::new()
    } else {
        Url::parse(website)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
            .unwrap_or_default()
    };

    let mut filtered: Vec<&String> = Vec::new();
    for e in candidates {
        if e.is_empty() {
            continue;
        }
        let user = e.split('@').next().unwrap_or("");
        let dom = domain_of(e);
        if dom.is_empty() {
            continue;
        }
        if user.chars().count() > 40 {
            continue;
        }
        if BLACKLIST_DOMAINS.contains(dom.as_str())
            || dom.ends_with("wixpress.com")
            || dom.ends_with("sentry.io")
        {
            continue;
        }
        if dom.contains(".js") || user.contains(".js") {
            continue;
        }
        filtered.push(e);
    }

    if let Some(same_domain) = filtered
        .iter()
        .find(|e| !site_domain.is_empty() && site_domain.contains(&domain_of(e.as_str())))
    {
        return (*same_domain).clone();
    }

    if let Some(common) = filtered
        .iter()
        .find(|e| COMMON_PROVIDERS.contains(domain_of(e.as_str()).as_str()))
    {
        return (*common).clone();
    }

    filtered
        .first()
        .map(|e| (*e).clone())
        .unwrap_or_default()
}
