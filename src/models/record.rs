use serde::{Deserialize, Serialize};

/// 候选卡片：列表源提取出的原始条目
///
/// 提取后不可变；在批次内以位置标识，尚无稳定主键。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CandidateCard {
    /// 完整查询字符串（关键词 + 城市）
    pub query: String,
    /// 业务关键词（如 "centro estetico"）
    pub business_keyword: String,
    /// 查询所请求的城市
    pub city: String,
    pub name: String,
    pub category: String,
    pub address: String,
    pub phone: String,
    /// 网站 URL（可能为空）
    pub website: String,
    pub rating: String,
    pub reviews: String,
}

/// 业务记录：完成网站分析与分类的最终单元
///
/// 由网站分析器创建后不可变；终态为"已写入存储"或"被过滤丢弃"。
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub query: String,
    #[serde(default)]
    pub business_keyword: String,
    /// 解析后的城市（地址提取，失败时回退为查询城市）
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    /// 选定的联系邮箱（可能为空）
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub reviews: String,
    /// 网站是否"可改进"（外联目标判定）
    #[serde(default)]
    pub migliorabile: bool,
    /// 质量问题说明（最多 5 条，以 "; " 连接）
    #[serde(default)]
    pub note: String,
    /// 分析完成时间（ISO-8601 UTC）
    #[serde(default)]
    pub timestamp: String,
}

impl BusinessRecord {
    /// 由候选卡片和分析结果构建记录
    pub fn from_card(
        card: CandidateCard,
        email: String,
        migliorabile: bool,
        note: String,
        timestamp: String,
    ) -> Self {
        Self {
            query: card.query,
            business_keyword: card.business_keyword,
            city: card.city,
            name: card.name,
            category: card.category,
            address: card.address,
            phone: card.phone,
            website: card.website,
            email,
            rating: card.rating,
            reviews: card.reviews,
            migliorabile,
            note,
            timestamp,
        }
    }

    /// 表格行布局：
    /// (email, phone, website, keyword, 所有者姓名, city, 已联系标记)
    ///
    /// 所有者姓名从地图数据不可得，固定留空；
    /// 末列 "no" 表示尚未联系，供下游邮件程序消费。
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.email.clone(),
            self.phone.clone(),
            self.website.clone(),
            self.business_keyword.clone(),
            String::new(),
            self.city.clone(),
            "no".to_string(),
        ]
    }
}
