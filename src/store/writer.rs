//! 批量写入 - 带指数退避的重试
//!
//! 暂时性错误按 base * 2^n 加随机抖动重试（真实等待，
//! 不忙等）；重试耗尽或遇到拒绝类错误时向上层报告致命失败。
//! 写入成功后的行数核对只是尽力而为的诊断，不影响结果。

use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::error::StoreError;
use crate::models::BusinessRecord;
use crate::store::RecordStore;

/// 批量写入器
pub struct BatchWriter {
    max_retries: usize,
    base_delay: Duration,
}

impl BatchWriter {
    /// # 参数
    /// - `max_retries`: 最大尝试次数（含首次）
    /// - `base_delay_ms`: 首次重试前的基础延迟（毫秒）
    pub fn new(max_retries: usize, base_delay_ms: u64) -> Self {
        Self {
            max_retries: max_retries.max(1),
            base_delay: Duration::from_millis(base_delay_ms),
        }
    }

    /// 把记录整批追加到存储
    ///
    /// 整批一次调用；部分成功不存在（端点语义为原子追加）。
    pub async fn write_records(
        &self,
        store: &dyn RecordStore,
        records: &[BusinessRecord],
    ) -> Result<(), StoreError> {
        let rows: Vec<Vec<String>> = records.iter().map(BusinessRecord::to_row).collect();
        if rows.is_empty() {
            warn!("没有行需要写入");
            return Ok(());
        }
        info!("准备写入: {} 行", rows.len());

        let before = match store.count_rows().await {
            Ok(n) => Some(n),
            Err(e) => {
                warn!("读取当前行数失败（忽略）: {}", e);
                None
            }
        };

        for attempt in 1..=self.max_retries {
            match store.append_rows(rows.clone()).await {
                Ok(()) => {
                    info!("✅ 写入完成: 追加 {} 行", rows.len());
                    self.verify_row_count(store, before, rows.len()).await;
                    return Ok(());
                }
                Err(StoreError::Transient(msg)) if attempt < self.max_retries => {
                    let delay = self.backoff_delay(attempt);
                    warn!(
                        "⚠️ 暂时性写入错误 (尝试 {}/{}), {:.1}s 后重试: {}",
                        attempt,
                        self.max_retries,
                        delay.as_secs_f64(),
                        msg
                    );
                    sleep(delay).await;
                }
                Err(e) => {
                    error!("❌ 写入失败 (尝试 {}/{}): {}", attempt, self.max_retries, e);
                    return Err(e);
                }
            }
        }
        unreachable!("重试循环总是在最后一次尝试返回")
    }

    /// 第 n 次尝试后的退避时长：base * 2^(n-1) + 0..1s 抖动
    fn backoff_delay(&self, attempt: usize) -> Duration {
        let exp = self.base_delay * 2u32.saturating_pow(attempt as u32 - 1);
        let jitter_ms = {
            let mut rng = rand::thread_rng();
            rng.gen_range(0..1000)
        };
        exp + Duration::from_millis(jitter_ms)
    }

    /// 写入后的行数核对，失败只记日志
    async fn verify_row_count(
        &self,
        store: &dyn RecordStore,
        before: Option<usize>,
        appended: usize,
    ) {
        match store.count_rows().await {
            Ok(after) => {
                if let Some(before) = before {
                    info!(
                        "核对: 写入后共 {} 行 (期望 {})",
                        after,
                        before + appended
                    );
                } else {
                    info!("核对: 写入后共 {} 行", after);
                }
            }
            Err(e) => warn!("无法核对写入结果（忽略）: {}", e),
        }
    }
}
