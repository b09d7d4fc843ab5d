// ==========================================
// 运营计划对账系统 - 领域模型层
// ==========================================
// 职责: 定义身份、期间、数据源记录、主表、诊断报告
// 红线: 不含文件读取逻辑，不含对账引擎逻辑
// ==========================================

pub mod identity;
pub mod master;
pub mod period;
pub mod record;
pub mod report;

// 重导出核心类型
pub use identity::{Identity, MappingEntry, SUBSTITUTE_SLOTS};
pub use master::{value_column_name, FlaggedCell, MasterRow, MasterTable, PeriodCells, IDENTITY_COLUMNS};
pub use period::{ForecastCalendar, Period};
pub use record::{InputResource, SourceKind, SourceRecord};
pub use report::{
    CoercionStats, Replacement, ReplacementKind, RunDiagnostics, SourceDiagnostics,
    UnmatchedSummary,
};
