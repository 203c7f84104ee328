//! 城市解析 - 业务能力层
//!
//! 从自由格式的意大利邮政地址中提取城市名。常见格式：
//! - Via X, 123, 20100 Milano MI
//! - Via X, Milano
//! - Piazza X, 20100 Milano MI

use once_cell::sync::Lazy;
use regex::Regex;

/// 字面 \uXXXX 转义（图标字符残留）
static ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\u[0-9a-fA-F]{4}").expect("转义正则非法"));

/// 邮编（5 位）后跟城市和省份缩写（2 个大写字母），如 "20100 Milano MI"
static CAP_CITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{5}\s+([A-ZÀ-Ö][a-zà-ö]+(?:\s+[A-ZÀ-Ö][a-zà-ö]+)*)\s+[A-Z]{2}\b")
        .expect("邮编城市正则非法")
});

/// 末尾的城市加省份缩写，如 "Via X, Milano MI"
static TRAILING_CITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r",\s*([A-ZÀ-Ö][a-zà-ö]+(?:\s+[A-ZÀ-Ö][a-zà-ö]+)*)\s+[A-Z]{2}\s*$")
        .expect("末尾城市正则非法")
});

/// 从地址中提取城市名，失败时返回空字符串
pub fn extract_city_from_address(address: &str) -> String {
    if address.is_empty() {
        return String::new();
    }
    let address = ESCAPE_RE.replace_all(address, "");
    let address = address.trim();

    if let Some(caps) = CAP_CITY_RE.captures(address) {
        if let Some(city) = caps.get(1) {
            return city.as_str().trim().to_string();
        }
    }

    if let Some(caps) = TRAILING_CITY_RE.captures(address) {
        if let Some(city) = caps.get(1) {
            return city.as_str().trim().to_string();
        }
    }

    // 兜底：从后往前找首字母大写的词（多半是城市），
    // 排除省份缩写（2 个大写字母）和邮编（5 位数字）
    for word in address.split_whitespace().rev() {
        let mut chars = word.chars();
        let starts_upper = chars.next().map(|c| c.is_uppercase()).unwrap_or(false);
        if !starts_upper || word.chars().count() <= 2 || word.ends_with(',') {
            continue;
        }
        if word.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        return word.trim().to_string();
    }

    String::new()
}
