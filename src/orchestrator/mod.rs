//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `pipeline` - 主流程
//! - 管理应用生命周期（初始化、运行、收尾）
//! - 串行驱动各条查询，每条查询后保存本地存档
//! - 最终执行过滤与表格写入
//! - 管理浏览器资源（Browser、JsExecutor）
//!
//! ### `enrichment` - 并行网站分析
//! - 对一个批次的卡片并行运行分析（Semaphore 限流）
//! - 在任务边界捕获单个任务的失败
//! - 按提取顺序重排输出
//!
//! ## 层次关系
//!
//! ```text
//! pipeline (整次运行, Vec<QuerySpec>)
//!     ↓
//! enrichment (单个批次, Vec<CandidateCard>)
//!     ↓
//! services (能力层：enricher / classifier / filters / checkpoint)
//!     ↓
//! infrastructure (基础设施：JsExecutor)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：pipeline 管整次运行，enrichment 管单个批次
//! 2. **资源隔离**：只有编排层持有 Browser 和存储句柄
//! 3. **共享状态收口**：去重键集合只在并行分析结束后被修改

pub mod enrichment;
pub mod pipeline;

pub use enrichment::EnrichmentOrchestrator;
pub use pipeline::App;
