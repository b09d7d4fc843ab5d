// ==========================================
// 运营计划对账系统 - 配置层
// ==========================================
// 职责: 运行配置读取（参考年份、列名、工作表、解析策略）
// 存储: JSON 键值文件，缺省键使用默认值
// ==========================================

pub mod config_manager;
pub mod reconcile_config_trait;
pub mod run_config;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use reconcile_config_trait::ReconcileConfigReader;
pub use run_config::{
    DatedColumns, ForecastColumns, IdentityColumns, MappingColumns, RunConfig,
    SemiFinishedPrecedence,
};
