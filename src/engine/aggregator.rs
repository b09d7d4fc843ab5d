// ==========================================
// 运营计划对账系统 - 数据源聚合
// ==========================================
// 职责: 按 (规范品名, 期间) 分组求和
// 稀疏: 只有出现过的 (品名, 期间) 才有键；补零由主表构建负责
// 数量已在字段映射阶段强制为数值（非法值为 0，行不丢弃）
// ==========================================

use crate::domain::period::Period;
use crate::domain::record::{SourceKind, SourceRecord};
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

// ==========================================
// SourceAggregate - 单数据源聚合结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct SourceAggregate {
    pub source: SourceKind,
    /// (品名, 期间) → 合计数量
    pub cells: BTreeMap<(String, Period), f64>,
    /// 参与聚合的记录数
    pub observed_rows: usize,
    /// 无期间的记录数（不参与聚合）
    pub skipped_undated: usize,
    /// 无期间记录的数量合计（保证守恒可审计）
    pub skipped_quantity: f64,
}

impl SourceAggregate {
    pub fn new(source: SourceKind) -> Self {
        Self {
            source,
            cells: BTreeMap::new(),
            observed_rows: 0,
            skipped_undated: 0,
            skipped_quantity: 0.0,
        }
    }

    /// 读取聚合值；未出现的键返回 None（区别于合计恰为 0）
    pub fn get(&self, identity: &str, period: &Period) -> Option<f64> {
        self.cells.get(&(identity.to_string(), *period)).copied()
    }

    /// 全部聚合值合计
    pub fn total(&self) -> f64 {
        self.cells.values().sum()
    }
}

pub struct SourceAggregator;

impl SourceAggregator {
    /// 聚合一个数据源
    ///
    /// # 参数
    /// - `source`: 数据源类别
    /// - `records`: 已解析的记录
    /// - `period_key`: 记录 → 期间（返回 None 的记录跳过并计数）
    #[instrument(skip(self, records, period_key), fields(source = %source, records = records.len()))]
    pub fn aggregate<F>(
        &self,
        source: SourceKind,
        records: &[SourceRecord],
        period_key: F,
    ) -> SourceAggregate
    where
        F: Fn(&SourceRecord) -> Option<Period>,
    {
        let mut aggregate = SourceAggregate::new(source);

        for record in records {
            match period_key(record) {
                Some(period) => {
                    *aggregate
                        .cells
                        .entry((record.identity.clone(), period))
                        .or_insert(0.0) += record.quantity;
                    aggregate.observed_rows += 1;
                }
                None => {
                    aggregate.skipped_undated += 1;
                    aggregate.skipped_quantity += record.quantity;
                }
            }
        }

        if aggregate.skipped_undated > 0 {
            warn!(
                skipped = aggregate.skipped_undated,
                quantity = aggregate.skipped_quantity,
                "部分记录无期间，未参与聚合"
            );
        }

        info!(
            keys = aggregate.cells.len(),
            observed = aggregate.observed_rows,
            "聚合完成"
        );
        aggregate
    }

    /// 以记录自身期间聚合（预测取列头月份，订单/出货取日期所在月）
    pub fn aggregate_by_record_period(
        &self,
        source: SourceKind,
        records: &[SourceRecord],
    ) -> SourceAggregate {
        self.aggregate(source, records, SourceRecord::period)
    }
}
