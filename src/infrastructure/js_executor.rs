//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS / 等待条件"的能力，
//! 不认识卡片，不处理业务流程。

use anyhow::Result;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tokio::time::sleep;

/// JS 执行器
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于导航等其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 轮询执行 JS 谓词直到为真或超时
    ///
    /// # 参数
    /// - `js_predicate`: 求值为布尔的 JS 表达式
    /// - `timeout_ms`: 总超时（毫秒）
    /// - `poll_ms`: 轮询间隔（毫秒）
    ///
    /// # 返回
    /// 超时前谓词是否变为真
    pub async fn wait_until(
        &self,
        js_predicate: &str,
        timeout_ms: u64,
        poll_ms: u64,
    ) -> Result<bool> {
        let mut waited = 0u64;
        loop {
            let value = self.eval(js_predicate).await?;
            if value.as_bool().unwrap_or(false) {
                return Ok(true);
            }
            if waited >= timeout_ms {
                return Ok(false);
            }
            sleep(Duration::from_millis(poll_ms)).await;
            waited += poll_ms;
        }
    }
}
