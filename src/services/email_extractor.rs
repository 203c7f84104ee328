//! 邮箱提取 - 业务能力层
//!
//! 只负责"在原始 HTML/文本中找出邮箱形状的 token"，
//! 无网络、无状态，找不到时返回空集合而不报错。

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// 邮箱形状：本地部分 + @ + 域名 + 顶级域（至少 2 个字母）
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("邮箱正则非法")
});

/// 从原始 HTML/文本中提取去重且排序后的邮箱候选
pub fn extract_emails_from_html(html: &str) -> Vec<String> {
    let mut emails = BTreeSet::new();
    for m in EMAIL_RE.find_iter(html) {
        // 页面中常见 %40 之类的百分号编码形式
        let decoded = urlencoding::decode(m.as_str())
            .map(|cow| cow.into_owned())
            .unwrap_or_else(|_| m.as_str().to_string());
        emails.insert(decoded);
    }
    emails.into_iter().collect()
}
