// ==========================================
// 运营计划对账系统 - 单次运行配置快照
// ==========================================
// 用途: 运行开始时从 ReconcileConfigReader 组装一次，之后只读
// ==========================================

use crate::config::reconcile_config_trait::ReconcileConfigReader;
use crate::domain::period::ForecastCalendar;
use crate::domain::record::InputResource;
use crate::importer::error::ImportResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// SemiFinishedPrecedence - 半成品归并与替代料的先后
// ==========================================
// 历史实现中两者的先后顺序不一致，这里显式配置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemiFinishedPrecedence {
    #[default]
    BeforeSubstitute,
    AfterSubstitute,
}

impl SemiFinishedPrecedence {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "before_substitute" | "before" => Some(SemiFinishedPrecedence::BeforeSubstitute),
            "after_substitute" | "after" => Some(SemiFinishedPrecedence::AfterSubstitute),
            _ => None,
        }
    }
}

// ==========================================
// 列名配置
// ==========================================

/// 身份三元组列名（晶圆品名/规格/品名）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityColumns {
    pub wafer_code: String,
    pub spec: String,
    pub part_name: String,
}

impl IdentityColumns {
    pub fn new(wafer_code: &str, spec: &str, part_name: &str) -> Self {
        Self {
            wafer_code: wafer_code.to_string(),
            spec: spec.to_string(),
            part_name: part_name.to_string(),
        }
    }
}

/// 预测表列配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastColumns {
    pub identity: String,     // 生产料号
    pub month_suffix: String, // “N月预测” 中的后缀
}

impl Default for ForecastColumns {
    fn default() -> Self {
        Self {
            identity: "生产料号".to_string(),
            month_suffix: "月预测".to_string(),
        }
    }
}

/// 带日期数据源（订单/出货）列配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedColumns {
    pub identity: String,
    pub date: String,
    pub quantity: String,
}

impl DatedColumns {
    pub fn new(identity: &str, date: &str, quantity: &str) -> Self {
        Self {
            identity: identity.to_string(),
            date: date.to_string(),
            quantity: quantity.to_string(),
        }
    }

    pub fn default_order() -> Self {
        Self::new("品名", "订单日期", "未交订单数量")
    }

    pub fn default_shipment() -> Self {
        Self::new("品名", "交易日期", "数量")
    }
}

/// 映射表列配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingColumns {
    pub old: IdentityColumns,
    pub new: IdentityColumns,
    pub semi_finished: String,
    /// 替代 1..=4，按槽位顺序
    pub substitutes: Vec<IdentityColumns>,
}

impl Default for MappingColumns {
    fn default() -> Self {
        Self {
            old: IdentityColumns::new("旧晶圆品名", "旧规格", "旧品名"),
            new: IdentityColumns::new("新晶圆品名", "新规格", "新品名"),
            semi_finished: "半成品".to_string(),
            substitutes: (1..=4)
                .map(|n| {
                    IdentityColumns::new(
                        &format!("替代晶圆{}", n),
                        &format!("替代规格{}", n),
                        &format!("替代品名{}", n),
                    )
                })
                .collect(),
        }
    }
}

// ==========================================
// RunConfig - 运行配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// 预测月份列对应的参考年份（显式配置，不从数据推断）
    pub forecast_reference_year: i32,
    /// 跨年起始月：月份 < 该值的预测列归属 reference_year + 1
    pub forecast_rollover_month: Option<u32>,
    pub forecast_columns: ForecastColumns,
    pub order_columns: DatedColumns,
    pub shipment_columns: DatedColumns,
    pub base_columns: IdentityColumns,
    pub mapping_columns: MappingColumns,
    /// 资源 → 工作表名（未配置时取第一个工作表）
    pub sheet_names: BTreeMap<InputResource, String>,
    pub semi_finished_precedence: SemiFinishedPrecedence,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            forecast_reference_year: 2025,
            forecast_rollover_month: None,
            forecast_columns: ForecastColumns::default(),
            order_columns: DatedColumns::default_order(),
            shipment_columns: DatedColumns::default_shipment(),
            base_columns: IdentityColumns::new("晶圆", "规格", "品名"),
            mapping_columns: MappingColumns::default(),
            sheet_names: BTreeMap::new(),
            semi_finished_precedence: SemiFinishedPrecedence::default(),
        }
    }
}

impl RunConfig {
    /// 从配置读取器组装快照
    pub fn from_reader(reader: &dyn ReconcileConfigReader) -> ImportResult<Self> {
        let mut sheet_names = BTreeMap::new();
        for resource in [
            InputResource::Template,
            InputResource::Forecast,
            InputResource::Order,
            InputResource::Shipment,
            InputResource::Mapping,
        ] {
            if let Some(sheet) = reader.get_sheet_name(resource)? {
                sheet_names.insert(resource, sheet);
            }
        }

        Ok(Self {
            forecast_reference_year: reader.get_forecast_reference_year()?,
            forecast_rollover_month: reader.get_forecast_rollover_month()?,
            forecast_columns: reader.get_forecast_columns()?,
            order_columns: reader.get_order_columns()?,
            shipment_columns: reader.get_shipment_columns()?,
            base_columns: reader.get_base_columns()?,
            mapping_columns: reader.get_mapping_columns()?,
            sheet_names,
            semi_finished_precedence: reader.get_semi_finished_precedence()?,
        })
    }

    /// 预测月份列头日历
    pub fn forecast_calendar(&self) -> ForecastCalendar {
        ForecastCalendar::new(
            self.forecast_reference_year,
            self.forecast_rollover_month,
            &self.forecast_columns.month_suffix,
        )
    }

    pub fn sheet_name(&self, resource: InputResource) -> Option<&str> {
        self.sheet_names.get(&resource).map(String::as_str)
    }
}
