// ==========================================
// 运营计划对账系统 - 展示层接口
// ==========================================
// 职责: 只消费稠密主表与异常单元格集合
// 红线: 不参与解析/聚合；样式（字体/填充/合并单元格）属于具体实现
// ==========================================

pub mod csv_renderer;

pub use csv_renderer::CsvRenderer;

use crate::domain::master::{FlaggedCell, MasterTable};
use crate::engine::error::ReconcileResult;

/// 主表输出接口
pub trait TableRenderer {
    /// 输出主表与异常标记
    fn render(&mut self, table: &MasterTable, flagged: &[FlaggedCell]) -> ReconcileResult<()>;
}
