use serde::{Deserialize, Serialize};

/// 查询规格：关键词 + 城市 + 本条查询的结果上限
///
/// 纯输入配置，运行期间不会被修改。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub keyword: String,
    pub city: String,
    pub max: usize,
}

impl QuerySpec {
    pub fn new(keyword: impl Into<String>, city: impl Into<String>, max: usize) -> Self {
        Self {
            keyword: keyword.into(),
            city: city.into(),
            max,
        }
    }

    /// 提交给列表源的搜索词
    pub fn search_term(&self) -> String {
        format!("{} {}", self.keyword, self.city)
    }
}

/// 未配置查询文件时使用的内置查询列表
pub fn default_queries(fallback_max: usize) -> Vec<QuerySpec> {
    [
        ("centro estetico", "Milano"),
        ("beauty studio", "Milano"),
        ("beauty saloon", "Milano"),
        ("estetista", "Gallarate"),
        ("pasticceria artigianale", "Milano"),
        ("parrucchiere", "Milano"),
        ("psicologo", "Milano"),
    ]
    .into_iter()
    .map(|(keyword, city)| QuerySpec::new(keyword, city, fallback_max))
    .collect()
}
