// ==========================================
// 运营计划对账系统 - 核心库
// ==========================================
// 职责: 预测/未交订单/出货三源的身份解析与月度对账
// 输出: 稠密主表 + 有预测无订单的异常标记
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 身份/期间/记录/主表
pub mod domain;

// 引擎层 - 解析与对账
pub mod engine;

// 导入层 - 外部表格
pub mod importer;

// 配置层 - 运行配置
pub mod config;

// 展示层 - 主表输出
pub mod render;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    FlaggedCell, Identity, MappingEntry, MasterRow, MasterTable, Period, RunDiagnostics,
    SourceKind, SourceRecord,
};

// 引擎
pub use engine::{
    DiscrepancyFlagger, IdentityResolver, MappingIndex, MasterTableBuilder, PeriodExtractor,
    ReconcileError, ReconcileOrchestrator, ReconcileOutput, ReconcileResult, SourceAggregator,
};

// 配置
pub use config::{ConfigManager, RunConfig};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "运营计划对账系统";
