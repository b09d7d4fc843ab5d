// ==========================================
// 运营计划对账系统 - 异常标记
// ==========================================
// 规则: 预测 > 0 且同期间订单 == 0 → 标记 (行, 期间)
// 只读扫描，不改动任何数量
// ==========================================

use crate::domain::master::{FlaggedCell, MasterTable};
use tracing::info;

pub struct DiscrepancyFlagger;

impl DiscrepancyFlagger {
    /// 单元格对是否异常（有预测无订单）
    pub fn is_forecast_without_order(forecast: f64, order: f64) -> bool {
        forecast > 0.0 && order == 0.0
    }

    /// 扫描主表，按 (行, 期间) 升序返回异常单元格
    pub fn flag(&self, table: &MasterTable) -> Vec<FlaggedCell> {
        let mut flagged = Vec::new();

        for (row_index, row) in table.rows.iter().enumerate() {
            for (period, cells) in table.periods.iter().zip(row.cells.iter()) {
                if Self::is_forecast_without_order(cells.forecast, cells.order) {
                    flagged.push(FlaggedCell {
                        row_index,
                        period: *period,
                    });
                }
            }
        }

        info!(flagged = flagged.len(), "异常标记完成");
        flagged
    }
}
