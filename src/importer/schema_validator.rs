// ==========================================
// 运营计划对账系统 - 表结构校验器
// ==========================================
// 职责: 每个输入资源的必需列检查，缺列立即失败并指明资源与列名
// 说明: 单元格级缺失不在此处理（由字段映射计入诊断）
// ==========================================

use crate::config::run_config::RunConfig;
use crate::domain::record::InputResource;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::raw_table::RawTable;
use tracing::debug;

pub struct SchemaValidator<'a> {
    config: &'a RunConfig,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    /// 校验必需列，返回第一个缺失列
    pub fn require(
        &self,
        table: &RawTable,
        resource: InputResource,
        columns: &[&str],
    ) -> ImportResult<()> {
        for column in columns {
            if !table.has_column(column) {
                return Err(ImportError::MissingColumn {
                    resource,
                    column: column.to_string(),
                });
            }
        }
        debug!(resource = %resource, columns = columns.len(), "必需列校验通过");
        Ok(())
    }

    /// 主计划模板: 晶圆/规格/品名
    pub fn validate_template(&self, table: &RawTable) -> ImportResult<()> {
        let cols = &self.config.base_columns;
        self.require(
            table,
            InputResource::Template,
            &[cols.wafer_code.as_str(), cols.spec.as_str(), cols.part_name.as_str()],
        )
    }

    /// 预测数据: 生产料号（月份列可以一个都没有）
    pub fn validate_forecast(&self, table: &RawTable) -> ImportResult<()> {
        self.require(
            table,
            InputResource::Forecast,
            &[self.config.forecast_columns.identity.as_str()],
        )
    }

    /// 未交订单: 品名/日期/数量
    pub fn validate_order(&self, table: &RawTable) -> ImportResult<()> {
        let cols = &self.config.order_columns;
        self.require(
            table,
            InputResource::Order,
            &[cols.identity.as_str(), cols.date.as_str(), cols.quantity.as_str()],
        )
    }

    /// 出货明细: 品名/日期/数量
    pub fn validate_shipment(&self, table: &RawTable) -> ImportResult<()> {
        let cols = &self.config.shipment_columns;
        self.require(
            table,
            InputResource::Shipment,
            &[cols.identity.as_str(), cols.date.as_str(), cols.quantity.as_str()],
        )
    }

    /// 映射表: 旧/新身份三列 + 半成品列
    ///
    /// 替代槽位列为可选（缺失时视为该槽位全空）
    pub fn validate_mapping(&self, table: &RawTable) -> ImportResult<()> {
        let cols = &self.config.mapping_columns;
        self.require(
            table,
            InputResource::Mapping,
            &[
                cols.old.wafer_code.as_str(),
                cols.old.spec.as_str(),
                cols.old.part_name.as_str(),
                cols.new.wafer_code.as_str(),
                cols.new.spec.as_str(),
                cols.new.part_name.as_str(),
                cols.semi_finished.as_str(),
            ],
        )
    }
}
