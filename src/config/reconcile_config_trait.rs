// ==========================================
// 运营计划对账系统 - 对账配置读取 Trait
// ==========================================
// 职责: 定义对账运行所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::run_config::{
    DatedColumns, ForecastColumns, IdentityColumns, MappingColumns, SemiFinishedPrecedence,
};
use crate::domain::record::InputResource;
use crate::importer::error::ImportResult;

// ==========================================
// ReconcileConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 JSON 键值文件读取）
pub trait ReconcileConfigReader: Send + Sync {
    // ===== 期间配置 =====

    /// 获取预测月份列的参考年份
    ///
    /// # 默认值
    /// - 2025
    ///
    /// # 说明
    /// - 该值是显式配置，不从数据推断年份
    fn get_forecast_reference_year(&self) -> ImportResult<i32>;

    /// 获取预测跨年起始月
    ///
    /// # 返回
    /// - Some(m): 月份 < m 的预测列归属参考年份 + 1
    /// - None: 所有预测列都归属参考年份
    ///
    /// # 默认值
    /// - None
    fn get_forecast_rollover_month(&self) -> ImportResult<Option<u32>>;

    // ===== 列名配置 =====

    /// 预测表列名（生产料号 + 月份列后缀）
    fn get_forecast_columns(&self) -> ImportResult<ForecastColumns>;

    /// 未交订单列名（品名/订单日期/未交订单数量）
    fn get_order_columns(&self) -> ImportResult<DatedColumns>;

    /// 出货明细列名（品名/交易日期/数量）
    fn get_shipment_columns(&self) -> ImportResult<DatedColumns>;

    /// 主计划模板身份列名（晶圆/规格/品名）
    fn get_base_columns(&self) -> ImportResult<IdentityColumns>;

    /// 新旧料号映射表列名
    fn get_mapping_columns(&self) -> ImportResult<MappingColumns>;

    /// 资源对应的工作表名（None = 第一个工作表）
    fn get_sheet_name(&self, resource: InputResource) -> ImportResult<Option<String>>;

    // ===== 解析策略 =====

    /// 半成品归并相对替代料的执行顺序
    ///
    /// # 默认值
    /// - before_substitute
    fn get_semi_finished_precedence(&self) -> ImportResult<SemiFinishedPrecedence>;
}
