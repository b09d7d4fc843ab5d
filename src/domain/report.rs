// ==========================================
// 运营计划对账系统 - 运行诊断报告
// ==========================================
// 用途: 可恢复问题（数量强制、日期无法解析、身份无法解析）的计数
// 说明: 可恢复问题不向调用方报错，但必须可统计
// ==========================================

use crate::domain::record::SourceKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// CoercionStats - 字段映射阶段强制转换计数
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoercionStats {
    pub rows: usize,                // 读取行数
    pub records: usize,             // 产出记录数（预测按月份列展开）
    pub quantities_coerced: usize,  // 非法数量强制为 0
    pub dates_unparseable: usize,   // 日期无法解析（不参与期间推导）
    pub identities_empty: usize,    // 身份单元格为空
}

impl CoercionStats {
    pub fn merge(&mut self, other: &CoercionStats) {
        self.rows += other.rows;
        self.records += other.records;
        self.quantities_coerced += other.quantities_coerced;
        self.dates_unparseable += other.dates_unparseable;
        self.identities_empty += other.identities_empty;
    }
}

// ==========================================
// ReplacementKind / Replacement - 身份改写日志
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplacementKind {
    Primary,      // 新旧料号替换
    SemiFinished, // 半成品归并
    Substitute,   // 替代料（槽位 1..=4）
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Replacement {
    pub source: SourceKind,
    pub original: String,
    pub canonical: String,
    pub kind: ReplacementKind,
}

// ==========================================
// UnmatchedSummary - 未匹配基础身份的聚合量
// ==========================================
// 用途: 保证汇总守恒可审计（排除在主表外的数量必须报告）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedSummary {
    /// 品名 → 合计数量
    pub by_identity: BTreeMap<String, f64>,
    pub total_quantity: f64,
}

impl UnmatchedSummary {
    pub fn add(&mut self, identity: &str, quantity: f64) {
        *self.by_identity.entry(identity.to_string()).or_insert(0.0) += quantity;
        self.total_quantity += quantity;
    }

    pub fn identity_count(&self) -> usize {
        self.by_identity.len()
    }
}

// ==========================================
// SourceDiagnostics / RunDiagnostics - 运行诊断
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDiagnostics {
    pub coercion: CoercionStats,
    pub replaced_rows: usize,        // 身份被改写的记录数
    pub undated_records: usize,      // 无期间记录（不参与聚合）
    pub undated_quantity: f64,       // 无期间记录的数量合计
    pub raw_quantity_total: f64,     // 强制转换后的原始数量合计
    pub aggregated_total: f64,       // 聚合后合计（仅有期间的记录）
    pub unmatched: UnmatchedSummary, // 无基础行的聚合量
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunDiagnostics {
    pub run_id: String,
    pub base_rows: usize,
    pub duplicate_base_rows: usize,
    pub mapping_entries: usize,
    pub invalid_mapping_entries: usize,
    pub mapping_cycles: usize,
    pub period_count: usize,
    pub flagged_cells: usize,
    pub sources: BTreeMap<SourceKind, SourceDiagnostics>,
}

impl RunDiagnostics {
    pub fn source(&self, source: SourceKind) -> Option<&SourceDiagnostics> {
        self.sources.get(&source)
    }

    pub fn source_mut(&mut self, source: SourceKind) -> &mut SourceDiagnostics {
        self.sources.entry(source).or_default()
    }

    /// 全部数据源的强制转换计数
    pub fn total_coercions(&self) -> CoercionStats {
        let mut total = CoercionStats::default();
        for diag in self.sources.values() {
            total.merge(&diag.coercion);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_accumulates() {
        let mut summary = UnmatchedSummary::default();
        summary.add("GHOST", 5.0);
        summary.add("GHOST", 2.5);
        summary.add("OTHER", 1.0);

        assert_eq!(summary.identity_count(), 2);
        assert_eq!(summary.by_identity["GHOST"], 7.5);
        assert_eq!(summary.total_quantity, 8.5);
    }

    #[test]
    fn test_total_coercions_merges_sources() {
        let mut diag = RunDiagnostics::default();
        diag.source_mut(SourceKind::Order).coercion.quantities_coerced = 2;
        diag.source_mut(SourceKind::Shipment).coercion.quantities_coerced = 3;
        diag.source_mut(SourceKind::Shipment).coercion.dates_unparseable = 1;

        let total = diag.total_coercions();
        assert_eq!(total.quantities_coerced, 5);
        assert_eq!(total.dates_unparseable, 1);
    }
}
