//! 过滤器 - 业务能力层
//!
//! 验收过滤（先邮箱后可改进，顺序固定）和按网站去重。
//! 两者的先后顺序在两个来源版本中不一致，保持可配置。

use std::collections::HashSet;
use std::str::FromStr;

use tracing::info;

use crate::models::BusinessRecord;

/// 验收与去重的先后顺序
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterOrder {
    /// 先验收（邮箱 + 可改进）再去重
    #[default]
    AcceptThenDedup,
    /// 先去重再验收
    DedupThenAccept,
}

impl FromStr for FilterOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accept_then_dedup" => Ok(FilterOrder::AcceptThenDedup),
            "dedup_then_accept" => Ok(FilterOrder::DedupThenAccept),
            other => Err(format!("未知过滤顺序: {}", other)),
        }
    }
}

/// 按网站去重，按输入顺序稳定遍历
///
/// 网站非空且已出现在键集合中的记录被丢弃；保留的记录把自己的
/// 网站加入集合，因此同批次内靠后的重复也会被拦下。
/// 网站为空的记录无法按网站去重，始终保留。
pub fn dedup_records(
    records: Vec<BusinessRecord>,
    seen: &mut HashSet<String>,
) -> Vec<BusinessRecord> {
    let mut unique = Vec::new();
    for record in records {
        let website = record.website.trim().to_string();
        if !website.is_empty() {
            if seen.contains(&website) {
                continue;
            }
            seen.insert(website);
        }
        unique.push(record);
    }
    unique
}

/// 验收第一阶段：只留有邮箱的记录
pub fn filter_with_email(records: Vec<BusinessRecord>) -> Vec<BusinessRecord> {
    records
        .into_iter()
        .filter(|r| !r.email.trim().is_empty())
        .collect()
}

/// 验收第二阶段：只留网站判定"可改进"的记录
pub fn filter_improvable(records: Vec<BusinessRecord>) -> Vec<BusinessRecord> {
    records.into_iter().filter(|r| r.migliorabile).collect()
}

/// 完整验收过滤：邮箱在前（更便宜，先缩小集合），可改进在后
///
/// 两个阶段在功能上可交换，但该顺序是日志/统计口径的契约。
pub fn accept_records(records: Vec<BusinessRecord>) -> Vec<BusinessRecord> {
    let total = records.len();
    let with_email = filter_with_email(records);
    info!(
        "邮箱过滤后: {} 条 (移除 {} 条无邮箱)",
        with_email.len(),
        total - with_email.len()
    );
    let email_count = with_email.len();
    let improvable = filter_improvable(with_email);
    info!(
        "可改进过滤后: {} 条 (移除 {} 条网站状况良好)",
        improvable.len(),
        email_count - improvable.len()
    );
    improvable
}

/// 按配置顺序执行验收与去重
pub fn apply_filters(
    records: Vec<BusinessRecord>,
    seen: &mut HashSet<String>,
    order: FilterOrder,
) -> Vec<BusinessRecord> {
    match order {
        FilterOrder::AcceptThenDedup => {
            let accepted = accept_records(records);
            let before = accepted.len();
            let unique = dedup_records(accepted, seen);
            info!(
                "去重后: {} 条 (移除 {} 条重复)",
                unique.len(),
                before - unique.len()
            );
            unique
        }
        FilterOrder::DedupThenAccept => {
            let before = records.len();
            let unique = dedup_records(records, seen);
            info!(
                "去重后: {} 条 (移除 {} 条重复)",
                unique.len(),
                before - unique.len()
            );
            accept_records(unique)
        }
    }
}
