// ==========================================
// 运营计划对账系统 - 主表模型
// ==========================================
// 不变量:
// - 每个基础身份恰好一行，保持模板顺序
// - 每个期间 × 每个数据源都有显式数值（缺失为 0，不为空）
// - 标记信息附着在输出上，不写回数量
// ==========================================

use crate::domain::identity::Identity;
use crate::domain::period::Period;
use crate::domain::record::SourceKind;
use serde::{Deserialize, Serialize};

/// 三个固定身份展示列
pub const IDENTITY_COLUMNS: [&str; 3] = ["晶圆品名", "规格", "品名"];

// ==========================================
// PeriodCells - 单期间三列数值
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodCells {
    pub forecast: f64,
    pub order: f64,
    pub shipment: f64,
}

impl PeriodCells {
    pub fn get(&self, source: SourceKind) -> f64 {
        match source {
            SourceKind::Forecast => self.forecast,
            SourceKind::Order => self.order,
            SourceKind::Shipment => self.shipment,
        }
    }

    pub fn set(&mut self, source: SourceKind, value: f64) {
        match source {
            SourceKind::Forecast => self.forecast = value,
            SourceKind::Order => self.order = value,
            SourceKind::Shipment => self.shipment = value,
        }
    }
}

// ==========================================
// MasterRow - 主表行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterRow {
    pub identity: Identity,
    /// 与 MasterTable::periods 一一对应
    pub cells: Vec<PeriodCells>,
}

impl MasterRow {
    /// 创建全零行
    pub fn zeroed(identity: Identity, period_count: usize) -> Self {
        Self {
            identity,
            cells: vec![PeriodCells::default(); period_count],
        }
    }
}

// ==========================================
// MasterTable - 稠密主表
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasterTable {
    pub periods: Vec<Period>,
    pub rows: Vec<MasterRow>,
}

impl MasterTable {
    /// 列名：三个身份列 + 每期间 {period}-forecast/order/shipment
    pub fn column_names(&self) -> Vec<String> {
        let mut columns: Vec<String> = IDENTITY_COLUMNS.iter().map(|c| c.to_string()).collect();
        for period in &self.periods {
            for source in SourceKind::ALL {
                columns.push(value_column_name(period, source));
            }
        }
        columns
    }

    /// 期间在列序中的下标
    pub fn period_index(&self, period: &Period) -> Option<usize> {
        self.periods.binary_search(period).ok()
    }

    /// 读取单元格；越界返回 None
    pub fn cell(&self, row_index: usize, period: &Period, source: SourceKind) -> Option<f64> {
        let idx = self.period_index(period)?;
        self.rows
            .get(row_index)
            .and_then(|row| row.cells.get(idx))
            .map(|cells| cells.get(source))
    }

    /// 某数据源全表合计
    pub fn source_total(&self, source: SourceKind) -> f64 {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .map(|cells| cells.get(source))
            .sum()
    }
}

/// 数值列名，例如 `2025-03-forecast`
pub fn value_column_name(period: &Period, source: SourceKind) -> String {
    format!("{}-{}", period, source.column_suffix())
}

// ==========================================
// FlaggedCell - 异常单元格（有预测无订单）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlaggedCell {
    pub row_index: usize,
    pub period: Period,
}
