// ==========================================
// 运营计划对账系统 - 引擎层
// ==========================================
// 职责: 身份解析与月度对账
//   映射索引 → 身份解析 → 期间提取 → 聚合 → 主表构建 → 异常标记
// 红线: 引擎不读文件、不做展示；映射索引构建后只读
// ==========================================

pub mod aggregator;
pub mod discrepancy_flagger;
pub mod error;
pub mod mapping_index;
pub mod master_builder;
pub mod orchestrator;
pub mod period_extractor;
pub mod resolver;

// 重导出核心引擎
pub use aggregator::{SourceAggregate, SourceAggregator};
pub use discrepancy_flagger::DiscrepancyFlagger;
pub use error::{ReconcileError, ReconcileResult};
pub use mapping_index::{MappingIndex, MappingIndexStats};
pub use master_builder::{MasterBuildResult, MasterTableBuilder};
pub use orchestrator::{ReconcileOrchestrator, ReconcileOutput};
pub use period_extractor::PeriodExtractor;
pub use resolver::{IdentityResolver, ReplacementLog, Resolution, ResolvedSource};
