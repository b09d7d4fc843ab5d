// ==========================================
// 运营计划对账系统 - 数据源记录
// ==========================================
// 用途: 预测/订单/出货三类输入经字段映射后的统一中间结构
// 生命周期: 仅在单次运行内，只读输入（仅身份可被解析器改写）
// ==========================================

use crate::domain::period::Period;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// SourceKind - 数据源类别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceKind {
    Forecast, // 预测
    Order,    // 未交订单
    Shipment, // 出货明细
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::Forecast, SourceKind::Order, SourceKind::Shipment];

    /// 主表列名后缀
    pub fn column_suffix(&self) -> &'static str {
        match self {
            SourceKind::Forecast => "forecast",
            SourceKind::Order => "order",
            SourceKind::Shipment => "shipment",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Forecast => write!(f, "FORECAST"),
            SourceKind::Order => write!(f, "ORDER"),
            SourceKind::Shipment => write!(f, "SHIPMENT"),
        }
    }
}

// ==========================================
// InputResource - 输入表格资源
// ==========================================
// 用途: 配置（工作表名）与错误报告（缺列时指明资源）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputResource {
    Template, // 主计划模板（基础身份列表）
    Forecast, // 预测数据
    Order,    // 未交订单
    Shipment, // 出货明细
    Mapping,  // 新旧料号映射表
}

impl InputResource {
    /// 配置键片段
    pub fn key(&self) -> &'static str {
        match self {
            InputResource::Template => "template",
            InputResource::Forecast => "forecast",
            InputResource::Order => "order",
            InputResource::Shipment => "shipment",
            InputResource::Mapping => "mapping",
        }
    }
}

impl fmt::Display for InputResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputResource::Template => write!(f, "主计划模板"),
            InputResource::Forecast => write!(f, "预测数据"),
            InputResource::Order => write!(f, "未交订单"),
            InputResource::Shipment => write!(f, "出货明细"),
            InputResource::Mapping => write!(f, "新旧料号映射表"),
        }
    }
}

impl From<SourceKind> for InputResource {
    fn from(source: SourceKind) -> Self {
        match source {
            SourceKind::Forecast => InputResource::Forecast,
            SourceKind::Order => InputResource::Order,
            SourceKind::Shipment => InputResource::Shipment,
        }
    }
}

// ==========================================
// SourceRecord - 数据源记录
// ==========================================
// 预测记录: period_label 来自 “N月预测” 列头，date 为空
// 订单/出货记录: date 来自日期列（宽松解析，失败为 None）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub source: SourceKind,
    pub identity: String,              // 品名（已去空白，可能为空）
    pub period_label: Option<Period>,  // 列头月份（仅预测）
    pub date: Option<NaiveDate>,       // 业务日期（订单/出货）
    pub quantity: f64,                 // 数量（非法值已强制为 0）
    pub row_number: usize,             // 源表行号
}

impl SourceRecord {
    /// 预测记录（按月份列展开）
    pub fn forecast(identity: String, period: Period, quantity: f64, row_number: usize) -> Self {
        Self {
            source: SourceKind::Forecast,
            identity,
            period_label: Some(period),
            date: None,
            quantity,
            row_number,
        }
    }

    /// 带日期的记录（订单/出货）
    pub fn dated(
        source: SourceKind,
        identity: String,
        date: Option<NaiveDate>,
        quantity: f64,
        row_number: usize,
    ) -> Self {
        Self {
            source,
            identity,
            period_label: None,
            date,
            quantity,
            row_number,
        }
    }

    /// 记录所属期间：列头月份优先，否则取日期所在自然月
    pub fn period(&self) -> Option<Period> {
        self.period_label.or_else(|| self.date.map(Period::from_date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_from_date() {
        let record = SourceRecord::dated(
            SourceKind::Order,
            "XYZ-9".to_string(),
            NaiveDate::from_ymd_opt(2025, 3, 2),
            10.0,
            1,
        );
        assert_eq!(record.period(), Some(Period::new(2025, 3).unwrap()));
    }

    #[test]
    fn test_period_missing_date() {
        let record = SourceRecord::dated(SourceKind::Shipment, "XYZ-9".to_string(), None, 10.0, 1);
        assert_eq!(record.period(), None);
    }

    #[test]
    fn test_column_suffix() {
        assert_eq!(SourceKind::Forecast.column_suffix(), "forecast");
        assert_eq!(SourceKind::Order.column_suffix(), "order");
        assert_eq!(SourceKind::Shipment.column_suffix(), "shipment");
    }
}
