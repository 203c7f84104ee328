//! 表格存储 - Google Sheets REST 实现
//!
//! 通过 values:get / values:update / values:append 三个端点
//! 覆盖读键、补表头、追加行。连接类错误（网络、超时、限流、
//! 服务端 5xx）归类为暂时性，交由写入端重试。

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::StoreError;
use crate::store::{RecordStore, Row};

const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// 固定表头，与下游邮件程序约定的列布局
const HEADER: [&str; 7] = [
    "Email",
    "Phone",
    "Website",
    "Keyword",
    "Nome proprietario",
    "Location",
    "Inviata",
];

/// values:get / values:update 的响应体
#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Google Sheets 表格存储
pub struct SheetsStore {
    client: reqwest::Client,
    sheet_id: String,
    worksheet: String,
    token: String,
}

impl SheetsStore {
    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Transient(format!("创建 HTTP 客户端失败: {}", e)))?;
        Ok(Self {
            client,
            sheet_id: config.sheet_id.clone(),
            worksheet: config.worksheet.clone(),
            token: config.sheets_token.clone(),
        })
    }

    /// 范围地址，如 `Sheet1!A1:G1`（工作表名需编码）
    fn range_url(&self, range: &str) -> String {
        format!(
            "{}/{}/values/{}",
            API_BASE,
            self.sheet_id,
            urlencoding::encode(&format!("{}!{}", self.worksheet, range))
        )
    }

    /// 把 reqwest 层的失败归类为暂时性错误
    fn transient(e: reqwest::Error) -> StoreError {
        StoreError::Transient(e.to_string())
    }

    /// 把非成功响应归类为暂时性（限流/5xx）或拒绝
    async fn classify_response(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        if status.as_u16() == 429 || status.is_server_error() {
            Err(StoreError::Transient(format!(
                "HTTP {}: {}",
                status, message
            )))
        } else {
            Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// 创建缺失的工作表
    async fn add_worksheet(&self) -> Result<(), StoreError> {
        info!("工作表 '{}' 不存在，创建中...", self.worksheet);
        let url = format!("{}/{}:batchUpdate", API_BASE, self.sheet_id);
        let body = json!({
            "requests": [{
                "addSheet": { "properties": { "title": self.worksheet } }
            }]
        });
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(Self::transient)?;
        Self::classify_response(resp).await?;
        info!("✅ 工作表 '{}' 已创建", self.worksheet);
        Ok(())
    }

    /// 读取一个范围的值（范围为空时返回空表）
    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let resp = self
            .client
            .get(self.range_url(range))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(Self::transient)?;
        let resp = Self::classify_response(resp).await?;
        let body: ValueRange = resp
            .json()
            .await
            .map_err(|e| StoreError::BadResponse(e.to_string()))?;
        Ok(body.values)
    }
}

#[async_trait]
impl RecordStore for SheetsStore {
    async fn ensure_header(&self) -> Result<(), StoreError> {
        // 范围读取对不存在的工作表返回 400，此时先创建工作表
        let existing = match self.get_values("A1:G1").await {
            Ok(values) => values,
            Err(StoreError::Rejected { status: 400, .. }) => {
                self.add_worksheet().await?;
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        let expected: Vec<String> = HEADER.iter().map(|s| s.to_string()).collect();
        if existing.first() == Some(&expected) {
            info!("表头已存在 (工作表 '{}')", self.worksheet);
            return Ok(());
        }

        info!("写入表头到工作表 '{}'...", self.worksheet);
        let url = format!("{}?valueInputOption=RAW", self.range_url("A1:G1"));
        let resp = self
            .client
            .put(url)
            .bearer_auth(&self.token)
            .json(&json!({ "values": [expected] }))
            .send()
            .await
            .map_err(Self::transient)?;
        Self::classify_response(resp).await?;
        info!("✅ 表头写入完成");
        Ok(())
    }

    async fn read_existing_keys(&self) -> Result<HashSet<String>, StoreError> {
        // 网站列是第 3 列；读取失败视为空集合，与首次写入场景一致
        let values = match self.get_values("C:C").await {
            Ok(values) => values,
            Err(StoreError::Rejected { status, message }) => {
                warn!("读取网站列失败 (HTTP {}): {}，按空集合处理", status, message);
                return Ok(HashSet::new());
            }
            Err(e) => return Err(e),
        };
        // 跳过表头
        Ok(values
            .into_iter()
            .skip(1)
            .filter_map(|mut row| {
                if row.is_empty() {
                    None
                } else {
                    Some(row.remove(0))
                }
            })
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect())
    }

    async fn append_rows(&self, rows: Vec<Row>) -> Result<(), StoreError> {
        let url = format!(
            "{}:append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS",
            self.range_url("A:G")
        );
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&json!({ "values": rows }))
            .send()
            .await
            .map_err(Self::transient)?;
        Self::classify_response(resp).await?;
        Ok(())
    }

    async fn count_rows(&self) -> Result<usize, StoreError> {
        Ok(self.get_values("A:A").await?.len())
    }
}
